//! Case and accent folding for ASCII plus the Latin-1 letters used in
//! Spanish and Portuguese text.
//!
//! Characters outside that subset pass through every map unchanged.

use std::collections::HashMap;

use lazy_static::lazy_static;

const ACCENTED: &str = "ÇçÑñÀÁÂÃÄÅàáâãäåÈÉÊËèéêëÌÍÎÏìíîïÒÓÔÕÖØòóôõöøÙÚÛÜùúûüÝÿý";
const DEACCENTED: &str = "CcNnAAAAAAaaaaaaEEEEeeeeIIIIiiiiOOOOOOooooooUUUUuuuuYyy";

const UPPER_ACCENTED: &str = "ÀÁÂÃÄÅÈÉÊËÌÍÎÏÒÓÔÕÖØÙÚÛÜÝÑÇ";
const LOWER_ACCENTED: &str = "àáâãäåèéêëìíîïòóôõöøùúûüýñç";

lazy_static! {
    static ref DEACCENT: HashMap<char, char> =
        ACCENTED.chars().zip(DEACCENTED.chars()).collect();
    static ref TO_LOWER: HashMap<char, char> =
        UPPER_ACCENTED.chars().zip(LOWER_ACCENTED.chars()).collect();
    static ref TO_UPPER: HashMap<char, char> =
        LOWER_ACCENTED.chars().zip(UPPER_ACCENTED.chars()).collect();
}

pub fn to_upper_sl(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_uppercase();
    }
    TO_UPPER.get(&c).copied().unwrap_or(c)
}

pub fn to_lower_sl(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    TO_LOWER.get(&c).copied().unwrap_or(c)
}

pub fn deaccent_sl(c: char) -> char {
    DEACCENT.get(&c).copied().unwrap_or(c)
}

pub fn to_lower_deaccent_sl(c: char) -> char {
    deaccent_sl(c).to_ascii_lowercase()
}

pub fn is_upper_sl(c: char) -> bool {
    c.is_ascii_uppercase() || TO_LOWER.contains_key(&c)
}

pub fn is_lower_sl(c: char) -> bool {
    c.is_ascii_lowercase() || TO_UPPER.contains_key(&c)
}

/// Apply a character map to a whole string
pub fn map_str(s: &str, map: fn(char) -> char) -> String {
    s.chars().map(map).collect()
}
