//! Error types and Result aliases for rustql-ext
//!
//! Codes follow SQLite's primary result codes so a host engine can surface
//! function and codec failures the same way `sqlite3_result_error_code` would.

use thiserror::Error as ThisError;

/// SQLite primary result codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    Error = 1,
    Internal = 2,
    Perm = 3,
    Abort = 4,
    Busy = 5,
    Locked = 6,
    NoMem = 7,
    ReadOnly = 8,
    IoErr = 10,
    Corrupt = 11,
    NotFound = 12,
    Full = 13,
    CantOpen = 14,
    TooBig = 18,
    Constraint = 19,
    Mismatch = 20,
    Misuse = 21,
    Format = 24,
    Range = 25,
    NotADb = 26,
}

/// Get error string for code (sqlite3_errstr).
pub fn errstr(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::Ok => "not an error",
        ErrorCode::Error => "SQL logic error",
        ErrorCode::Internal => "internal error",
        ErrorCode::Perm => "access permission denied",
        ErrorCode::Abort => "query aborted",
        ErrorCode::Busy => "database is locked",
        ErrorCode::Locked => "database table is locked",
        ErrorCode::NoMem => "out of memory",
        ErrorCode::ReadOnly => "attempt to write a readonly database",
        ErrorCode::IoErr => "disk I/O error",
        ErrorCode::Corrupt => "database disk image is malformed",
        ErrorCode::NotFound => "unknown operation",
        ErrorCode::Full => "database or disk is full",
        ErrorCode::CantOpen => "unable to open database file",
        ErrorCode::TooBig => "string or blob too big",
        ErrorCode::Constraint => "constraint failed",
        ErrorCode::Mismatch => "datatype mismatch",
        ErrorCode::Misuse => "bad parameter or other API misuse",
        ErrorCode::Format => "auxiliary database format error",
        ErrorCode::Range => "column index out of range",
        ErrorCode::NotADb => "file is not a database",
    }
}

fn describe<'a>(code: &ErrorCode, message: &'a Option<String>) -> &'a str {
    match message {
        Some(msg) => msg.as_str(),
        None => errstr(*code),
    }
}

/// Error raised by an extension callback
#[derive(Debug, Clone, PartialEq, ThisError)]
#[error("{}", describe(.code, .message))]
pub struct Error {
    pub code: ErrorCode,
    pub message: Option<String>,
}

impl Error {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    /// `sqlite3_result_error_toobig`
    pub fn too_big() -> Self {
        Self::new(ErrorCode::TooBig)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_message(ErrorCode::IoErr, err.to_string())
    }
}

/// Result type alias for rustql-ext operations
pub type Result<T> = std::result::Result<T, Error>;
