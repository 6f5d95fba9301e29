//! Full-text search tokenizers
//!
//! Tokenizers are looked up by name from a `tokenize=` clause. `simple` and
//! `sublatin` are registered up front.

pub mod sublatin;
pub mod tokenizer;

pub use sublatin::{is_stop_word, SublatinTokenizer};
pub use tokenizer::{
    create_tokenizer, parse_tokenize_arg, register_tokenizer, tokenizer_names, Delimiters,
    Fts3Cursor, Fts3Token, Fts3Tokenizer, SimpleTokenizer, TokenizerFactory,
};
