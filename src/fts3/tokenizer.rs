//! FTS3 tokenizer interface and registry
//!
//! A tokenizer is created from the arguments of a `tokenize=` clause and
//! hands out cursors over individual documents. The registry maps names to
//! factories the way `fts3_tokenizer()` does.

use std::collections::HashMap;
use std::sync::RwLock;

use lazy_static::lazy_static;

use super::sublatin::SublatinTokenizer;
use crate::error::{Error, ErrorCode, Result};

/// A token with its byte offsets in the original input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fts3Token {
    pub text: String,
    pub position: i32,
    pub start: usize,
    pub end: usize,
}

/// Incremental tokenization of one document (xOpen/xNext/xClose)
pub trait Fts3Cursor {
    /// Next token, or `None` once the input is exhausted
    fn next_token(&mut self) -> Result<Option<Fts3Token>>;
}

pub trait Fts3Tokenizer: Send + Sync {
    fn open<'a>(&'a self, text: &'a str) -> Box<dyn Fts3Cursor + 'a>;

    fn tokenize(&self, text: &str) -> Result<Vec<Fts3Token>> {
        let mut cursor = self.open(text);
        let mut tokens = Vec::new();
        while let Some(token) = cursor.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}

// ============================================================================
// Delimiter Set
// ============================================================================

/// ASCII delimiter flags; bytes at or above 0x80 never delimit
#[derive(Debug, Clone)]
pub struct Delimiters([bool; 128]);

impl Delimiters {
    /// Every non-alphanumeric ASCII character
    pub fn non_alnum() -> Self {
        let mut flags = [false; 128];
        for (i, flag) in flags.iter_mut().enumerate().skip(1) {
            *flag = !(i as u8).is_ascii_alphanumeric();
        }
        Delimiters(flags)
    }

    /// Exactly the characters of `chars`, which must all be ASCII
    pub fn from_chars(chars: &str) -> Result<Self> {
        let mut flags = [false; 128];
        for b in chars.bytes() {
            if b >= 0x80 {
                return Err(Error::with_message(
                    ErrorCode::Error,
                    "tokenizer delimiters must be ASCII",
                ));
            }
            flags[b as usize] = true;
        }
        Ok(Delimiters(flags))
    }

    /// Delimiters from tokenizer arguments: `args[1]` if present
    pub fn from_args(args: &[&str]) -> Result<Self> {
        match args.get(1) {
            Some(chars) => Self::from_chars(chars),
            None => Ok(Self::non_alnum()),
        }
    }

    pub fn is_delim(&self, b: u8) -> bool {
        b < 0x80 && self.0[b as usize]
    }
}

// ============================================================================
// Simple Tokenizer
// ============================================================================

/// The `simple` tokenizer: split on delimiters, lowercase ASCII
#[derive(Debug, Clone)]
pub struct SimpleTokenizer {
    delim: Delimiters,
}

impl SimpleTokenizer {
    pub fn new(args: &[&str]) -> Result<Self> {
        Ok(Self {
            delim: Delimiters::from_args(args)?,
        })
    }
}

pub struct SimpleCursor<'a> {
    delim: &'a Delimiters,
    input: &'a str,
    offset: usize,
    position: i32,
}

impl Fts3Cursor for SimpleCursor<'_> {
    fn next_token(&mut self) -> Result<Option<Fts3Token>> {
        let bytes = self.input.as_bytes();
        while self.offset < bytes.len() && self.delim.is_delim(bytes[self.offset]) {
            self.offset += 1;
        }
        let start = self.offset;
        while self.offset < bytes.len() && !self.delim.is_delim(bytes[self.offset]) {
            self.offset += 1;
        }
        if self.offset == start {
            return Ok(None);
        }
        let token = Fts3Token {
            text: self.input[start..self.offset].to_ascii_lowercase(),
            position: self.position,
            start,
            end: self.offset,
        };
        self.position += 1;
        Ok(Some(token))
    }
}

impl Fts3Tokenizer for SimpleTokenizer {
    fn open<'a>(&'a self, text: &'a str) -> Box<dyn Fts3Cursor + 'a> {
        Box::new(SimpleCursor {
            delim: &self.delim,
            input: text,
            offset: 0,
            position: 0,
        })
    }
}

// ============================================================================
// Registry
// ============================================================================

pub type TokenizerFactory = fn(&[&str]) -> Result<Box<dyn Fts3Tokenizer>>;

lazy_static! {
    static ref TOKENIZERS: RwLock<HashMap<String, TokenizerFactory>> = {
        let mut map: HashMap<String, TokenizerFactory> = HashMap::new();
        map.insert("simple".to_string(), |args| {
            Ok(Box::new(SimpleTokenizer::new(args)?) as Box<dyn Fts3Tokenizer>)
        });
        map.insert("sublatin".to_string(), |args| {
            Ok(Box::new(SublatinTokenizer::new(args)?) as Box<dyn Fts3Tokenizer>)
        });
        RwLock::new(map)
    };
}

fn registry_poisoned() -> Error {
    Error::with_message(ErrorCode::Internal, "tokenizer registry lock poisoned")
}

pub fn register_tokenizer(name: &str, factory: TokenizerFactory) -> Result<()> {
    let mut registry = TOKENIZERS.write().map_err(|_| registry_poisoned())?;
    registry.insert(name.to_ascii_lowercase(), factory);
    Ok(())
}

pub fn create_tokenizer(name: &str, args: &[&str]) -> Result<Box<dyn Fts3Tokenizer>> {
    let registry = TOKENIZERS.read().map_err(|_| registry_poisoned())?;
    let key = name.to_ascii_lowercase();
    let factory = registry.get(&key).ok_or_else(|| {
        Error::with_message(ErrorCode::Error, format!("unknown tokenizer: {}", name))
    })?;
    tracing::debug!(tokenizer = %key, n_args = args.len(), "create tokenizer");
    factory(args)
}

/// Names of every registered tokenizer, sorted
pub fn tokenizer_names() -> Vec<String> {
    let mut names: Vec<String> = TOKENIZERS
        .read()
        .map(|registry| registry.keys().cloned().collect())
        .unwrap_or_default();
    names.sort();
    names
}

/// Split a `tokenize=name arg ...` clause into the name and its arguments
///
/// Arguments may be quoted with `"` or `'`; a doubled quote stands for itself.
pub fn parse_tokenize_arg(arg: &str) -> Option<(String, Vec<String>)> {
    let trimmed = arg.trim();
    let (key, clause) = trimmed.split_once('=')?;
    if !key.trim().eq_ignore_ascii_case("tokenize") {
        return None;
    }
    let mut tokens = split_tokenize_args(clause).into_iter();
    let name = tokens.next()?;
    Some((name, tokens.collect()))
}

fn split_tokenize_args(clause: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut chars = clause.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch.is_ascii_whitespace() {
            continue;
        }
        let mut value = String::new();
        if ch == '"' || ch == '\'' {
            while let Some(next) = chars.next() {
                if next == ch {
                    if chars.peek() == Some(&ch) {
                        chars.next();
                        value.push(ch);
                        continue;
                    }
                    break;
                }
                value.push(next);
            }
        } else {
            value.push(ch);
            while let Some(&peek) = chars.peek() {
                if peek.is_ascii_whitespace() {
                    break;
                }
                value.push(peek);
                chars.next();
            }
        }
        args.push(value);
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Fts3Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_simple_tokenizer() {
        let tok = SimpleTokenizer::new(&[]).unwrap();
        let tokens = tok.tokenize("Hello, World-wide web!").unwrap();
        assert_eq!(texts(&tokens), vec!["hello", "world", "wide", "web"]);
        assert_eq!((tokens[1].start, tokens[1].end), (7, 12));
        assert_eq!(tokens[3].position, 3);
    }

    #[test]
    fn test_simple_custom_delimiters() {
        let tok = SimpleTokenizer::new(&["simple", ";"]).unwrap();
        let tokens = tok.tokenize("a b;C").unwrap();
        assert_eq!(texts(&tokens), vec!["a b", "c"]);
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        assert!(SimpleTokenizer::new(&["x", "é"]).is_err());
    }

    #[test]
    fn test_registry() {
        assert!(create_tokenizer("SIMPLE", &[]).is_ok());
        assert!(create_tokenizer("sublatin", &[]).is_ok());
        let err = create_tokenizer("missing", &[]).err().unwrap();
        assert_eq!(err.to_string(), "unknown tokenizer: missing");
        assert!(tokenizer_names().contains(&"sublatin".to_string()));
    }

    #[test]
    fn test_parse_tokenize_arg() {
        let (name, args) = parse_tokenize_arg("tokenize=sublatin \"x\" ';,'").unwrap();
        assert_eq!(name, "sublatin");
        assert_eq!(args, vec!["x".to_string(), ";,".to_string()]);
        let (name, args) = parse_tokenize_arg("TOKENIZE = simple 'it''s'").unwrap();
        assert_eq!(name, "simple");
        assert_eq!(args, vec!["it's".to_string()]);
        assert!(parse_tokenize_arg("content=foo").is_none());
        assert!(parse_tokenize_arg("tokenize=").is_none());
    }
}
