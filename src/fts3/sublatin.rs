//! The `sublatin` FTS3 tokenizer
//!
//! Splits on delimiters like `simple`, but keeps `/`, `.` and `,` inside a
//! token when both neighbours are ASCII digits (so `2.456` and `234/987`
//! stay whole), folds case and accents, and drops one-byte tokens and
//! Spanish stop words. Dropped tokens do not consume a position.

use super::tokenizer::{Delimiters, Fts3Cursor, Fts3Token, Fts3Tokenizer};
use crate::error::Result;
use crate::sublatin::to_lower_deaccent_sl;

/// Sorted for binary search
const STOP_WORDS: &[&str] = &[
    "al", "ante", "asi", "cl", "como", "con", "cuyo", "de", "del", "desde", "don", "dt", "el",
    "en", "es", "esta", "este", "fin", "ha", "la", "las", "le", "lo", "los", "ma", "misma", "no",
    "para", "por", "pz", "que", "se", "ser", "si", "sido", "siguientes", "sin", "sl", "su", "sus",
    "todos", "un", "una", "y",
];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

#[derive(Debug, Clone)]
pub struct SublatinTokenizer {
    delim: Delimiters,
}

impl SublatinTokenizer {
    /// `args[1]`, when present, lists the delimiter characters
    pub fn new(args: &[&str]) -> Result<Self> {
        Ok(Self {
            delim: Delimiters::from_args(args)?,
        })
    }
}

impl Fts3Tokenizer for SublatinTokenizer {
    fn open<'a>(&'a self, text: &'a str) -> Box<dyn Fts3Cursor + 'a> {
        Box::new(SublatinCursor {
            delim: &self.delim,
            input: text,
            offset: 0,
            position: 0,
        })
    }
}

pub struct SublatinCursor<'a> {
    delim: &'a Delimiters,
    input: &'a str,
    offset: usize,
    position: i32,
}

impl SublatinCursor<'_> {
    fn is_numeric_separator(&self, at: usize) -> bool {
        let bytes = self.input.as_bytes();
        matches!(bytes[at], b'/' | b'.' | b',')
            && at > 0
            && bytes[at - 1].is_ascii_digit()
            && bytes.get(at + 1).is_some_and(u8::is_ascii_digit)
    }
}

impl Fts3Cursor for SublatinCursor<'_> {
    fn next_token(&mut self) -> Result<Option<Fts3Token>> {
        let len = self.input.len();
        while self.offset < len {
            let bytes = self.input.as_bytes();
            while self.offset < len && self.delim.is_delim(bytes[self.offset]) {
                self.offset += 1;
            }

            let start = self.offset;
            while self.offset < len {
                let b = bytes[self.offset];
                if self.delim.is_delim(b) && !self.is_numeric_separator(self.offset) {
                    break;
                }
                self.offset += 1;
            }
            if self.offset == start {
                continue;
            }

            // delimiters are ASCII, so both ends sit on char boundaries
            let folded: String = self.input[start..self.offset]
                .chars()
                .map(to_lower_deaccent_sl)
                .collect();
            if folded.len() == 1 || is_stop_word(&folded) {
                continue;
            }

            let token = Fts3Token {
                text: folded,
                position: self.position,
                start,
                end: self.offset,
            };
            self.position += 1;
            return Ok(Some(token));
        }
        Ok(None)
    }
}
