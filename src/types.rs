//! Core value types and flag sets shared by every extension module

use bitflags::bitflags;

// ============================================================================
// SQLite Value Type
// ============================================================================

/// Column data types (SQLITE_INTEGER, SQLITE_FLOAT, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ColumnType {
    /// SQLITE_INTEGER = 1
    Integer = 1,
    /// SQLITE_FLOAT = 2
    Float = 2,
    /// SQLITE_TEXT = 3
    Text = 3,
    /// SQLITE_BLOB = 4
    Blob = 4,
    /// SQLITE_NULL = 5
    Null = 5,
}

/// Dynamic SQLite value (sqlite3_value)
///
/// Arguments handed to extension callbacks and the values they return.
/// Coercions follow SQLite's `sqlite3_value_*` accessors.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// NULL value
    #[default]
    Null,
    /// Integer value (64-bit signed)
    Integer(i64),
    /// Real/float value (64-bit IEEE 754)
    Real(f64),
    /// Text value (UTF-8 string)
    Text(String),
    /// Binary large object
    Blob(Vec<u8>),
}

impl Value {
    /// Storage class of this value (sqlite3_value_type)
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Null => ColumnType::Null,
            Value::Integer(_) => ColumnType::Integer,
            Value::Real(_) => ColumnType::Float,
            Value::Text(_) => ColumnType::Text,
            Value::Blob(_) => ColumnType::Blob,
        }
    }

    /// Storage class after numeric affinity (sqlite3_value_numeric_type)
    ///
    /// Text that reads as an integer or a real reports that class; any
    /// other text stays Text.
    pub fn numeric_type(&self) -> ColumnType {
        match self {
            Value::Text(s) => {
                let t = s.trim();
                if t.parse::<i64>().is_ok() {
                    ColumnType::Integer
                } else if parse_real(t).is_some() {
                    ColumnType::Float
                } else {
                    ColumnType::Text
                }
            }
            other => other.column_type(),
        }
    }

    /// Convert to i64 with SQLite coercion rules
    ///
    /// - NULL -> 0
    /// - Integer -> value
    /// - Real -> truncated to integer
    /// - Text -> parsed as integer (or real, truncated), or 0 if invalid
    /// - Blob -> 0
    pub fn to_i64(&self) -> i64 {
        match self {
            Value::Null => 0,
            Value::Integer(i) => *i,
            Value::Real(f) => *f as i64,
            Value::Text(s) => {
                let t = s.trim();
                t.parse::<i64>()
                    .ok()
                    .or_else(|| parse_real(t).map(|f| f as i64))
                    .unwrap_or(0)
            }
            Value::Blob(_) => 0,
        }
    }

    /// Convert to f64 with SQLite coercion rules
    pub fn to_f64(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Integer(i) => *i as f64,
            Value::Real(f) => *f,
            Value::Text(s) => parse_real(s.trim()).unwrap_or(0.0),
            Value::Blob(_) => 0.0,
        }
    }

    /// Convert to string with SQLite coercion rules
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Integer(i) => i.to_string(),
            Value::Real(f) => {
                // SQLite displays floats with decimal point even for whole numbers
                let s = f.to_string();
                if !s.contains('.') && !s.contains('e') && !s.contains("inf") && !s.contains("NaN")
                {
                    format!("{}.0", s)
                } else {
                    s
                }
            }
            Value::Text(s) => s.clone(),
            Value::Blob(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }

    /// Check if value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Real literal in text; words like `nan` or `inf` are not numbers
fn parse_real(t: &str) -> Option<f64> {
    if !t.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    t.parse().ok()
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

// ============================================================================
// Registration Flags
// ============================================================================

bitflags! {
    /// Function flags passed at registration (SQLITE_UTF8, SQLITE_DETERMINISTIC, ...)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FuncFlags: u32 {
        const UTF8          = 0x0000_0001;
        const DETERMINISTIC = 0x0000_0800;
        /// Candidate for the LIKE optimization (SQLITE_FUNC_LIKE)
        const LIKE          = 0x0000_0004;
    }

    /// Open flags selecting which built-ins the sub-Latin module overrides
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SubLatinFlags: u32 {
        /// Replace NOCASE/upper/lower and make `like` case-fold Latin letters
        const LIKE    = 0x1000_0000;
        /// Same, but `like` also ignores accents
        const NA_LIKE = 0x2000_0000;
    }
}
