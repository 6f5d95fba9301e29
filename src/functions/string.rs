//! String scalar functions
//!
//! Lengths and positions are measured in characters, not bytes.

use crate::error::{Error, ErrorCode, Result};
use crate::types::Value;

use super::context::FunctionContext;

fn arg<'a>(args: &'a [Value], i: usize, name: &str) -> Result<&'a Value> {
    args.get(i).ok_or_else(|| {
        Error::with_message(
            ErrorCode::Error,
            format!("wrong number of arguments to function {}()", name),
        )
    })
}

fn domain_error() -> Error {
    Error::with_message(ErrorCode::Error, "domain error")
}

fn text(ctx: &FunctionContext, s: String) -> Result<Value> {
    ctx.check_length(s.len())?;
    Ok(Value::Text(s))
}

/// Byte offset of the `n`th character, or the end of `s`
fn char_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

// ============================================================================
// Repetition and Search
// ============================================================================

/// replicate(S, N) - S concatenated N times
pub fn func_replicate(ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let s = arg(args, 0, "replicate")?;
    if s.is_null() {
        return Ok(Value::Null);
    }
    let n = arg(args, 1, "replicate")?.to_i64();
    if n < 0 {
        return Err(domain_error());
    }
    let s = s.to_text();
    let total = (s.len() as u64)
        .checked_mul(n as u64)
        .ok_or_else(Error::too_big)?;
    if total > ctx.max_length().max(0) as u64 {
        return Err(Error::too_big());
    }
    Ok(Value::Text(s.repeat(n as usize)))
}

/// 1-based character position of `needle` in `hay` at or after `start`
///
/// Returns 0 when there is no match or the needle is empty.
pub fn char_index(needle: &str, hay: &str, start: usize) -> usize {
    if needle.is_empty() {
        return 0;
    }
    hay.char_indices()
        .enumerate()
        .skip(start)
        .find(|(_, (offset, _))| hay[*offset..].starts_with(needle))
        .map_or(0, |(pos, _)| pos + 1)
}

/// charindex(S1, S2[, START])
pub fn func_charindex(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let needle = arg(args, 0, "charindex")?;
    let hay = arg(args, 1, "charindex")?;
    if needle.is_null() || hay.is_null() {
        return Ok(Value::Null);
    }
    let start = args.get(2).map_or(0, |v| v.to_i64().saturating_sub(1).max(0)) as usize;
    Ok(Value::Integer(
        char_index(&needle.to_text(), &hay.to_text(), start) as i64,
    ))
}

// ============================================================================
// Substrings
// ============================================================================

/// leftstr(S, N) - first N characters of S
pub fn func_leftstr(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let (s, n) = (arg(args, 0, "leftstr")?, arg(args, 1, "leftstr")?);
    if s.is_null() || n.is_null() {
        return Ok(Value::Null);
    }
    let s = s.to_text();
    let n = n.to_i64();
    if n <= 0 {
        return Ok(Value::Text(String::new()));
    }
    Ok(Value::Text(s[..char_offset(&s, n as usize)].to_string()))
}

/// Last `n` characters of `s`
pub fn right_chars(s: &str, n: i64) -> &str {
    if n <= 0 {
        return "";
    }
    let len = s.chars().count();
    if n as usize >= len {
        return s;
    }
    &s[char_offset(s, len - n as usize)..]
}

/// rightstr(S, N) - last N characters of S
pub fn func_rightstr(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let (s, n) = (arg(args, 0, "rightstr")?, arg(args, 1, "rightstr")?);
    if s.is_null() || n.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::Text(right_chars(&s.to_text(), n.to_i64()).to_string()))
}

// ============================================================================
// Trimming and Rewriting
// ============================================================================

fn trim_with(args: &[Value], name: &str, op: fn(&str) -> &str) -> Result<Value> {
    let s = arg(args, 0, name)?;
    if s.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::Text(op(&s.to_text()).to_string()))
}

/// ltrim(S) - strip leading spaces
pub fn func_ltrim(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    trim_with(args, "ltrim", |s| s.trim_start_matches(' '))
}

/// rtrim(S) - strip trailing spaces
pub fn func_rtrim(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    trim_with(args, "rtrim", |s| s.trim_end_matches(' '))
}

/// trim(S) - strip spaces on both ends
pub fn func_trim(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    trim_with(args, "trim", |s| s.trim_matches(' '))
}

/// replace(S, FROM, TO)
pub fn func_replace(ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let s = arg(args, 0, "replace")?;
    if s.is_null() {
        return Ok(Value::Null);
    }
    let s = s.to_text();
    let from = arg(args, 1, "replace")?.to_text();
    let to = arg(args, 2, "replace")?.to_text();
    if from.is_empty() {
        return Ok(Value::Text(s));
    }
    text(ctx, s.replace(&from, &to))
}

/// reverse(S)
pub fn func_reverse(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let s = arg(args, 0, "reverse")?;
    if s.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::Text(s.to_text().chars().rev().collect()))
}

/// proper(S) - capitalize the first letter of each blank-separated word
pub fn func_proper(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let s = arg(args, 0, "proper")?;
    if s.is_null() {
        return Ok(Value::Null);
    }
    let mut word_start = true;
    let out = s
        .to_text()
        .chars()
        .map(|c| {
            if c == ' ' || c == '\t' {
                word_start = true;
                c
            } else if std::mem::replace(&mut word_start, false) {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect();
    Ok(Value::Text(out))
}

// ============================================================================
// Padding
// ============================================================================

#[derive(Clone, Copy)]
enum Pad {
    Left,
    Right,
    Center,
}

fn pad(ctx: &FunctionContext, args: &[Value], name: &str, side: Pad) -> Result<Value> {
    let s = arg(args, 0, name)?;
    if s.is_null() {
        return Ok(Value::Null);
    }
    let width = arg(args, 1, name)?.to_i64();
    if width < 0 {
        return Err(domain_error());
    }
    let s = s.to_text();
    let len = s.chars().count() as i64;
    if len >= width {
        return Ok(Value::Text(s));
    }
    let fill = (width - len) as usize;
    ctx.check_length(s.len() + fill)?;
    let (left, right) = match side {
        Pad::Left => (fill, 0),
        Pad::Right => (0, fill),
        Pad::Center => (fill / 2, fill - fill / 2),
    };
    let mut out = String::with_capacity(s.len() + fill);
    out.extend(std::iter::repeat(' ').take(left));
    out.push_str(&s);
    out.extend(std::iter::repeat(' ').take(right));
    Ok(Value::Text(out))
}

/// padl(S, N) - right-align S in N characters
pub fn func_padl(ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    pad(ctx, args, "padl", Pad::Left)
}

/// padr(S, N) - left-align S in N characters
pub fn func_padr(ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    pad(ctx, args, "padr", Pad::Right)
}

/// padc(S, N) - center S in N characters
pub fn func_padc(ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    pad(ctx, args, "padc", Pad::Center)
}

/// strfilter(S, KEEP) - characters of S that also occur in KEEP
pub fn func_strfilter(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let (s, keep) = (arg(args, 0, "strfilter")?, arg(args, 1, "strfilter")?);
    if s.is_null() || keep.is_null() {
        return Ok(Value::Null);
    }
    let keep = keep.to_text();
    Ok(Value::Text(
        s.to_text().chars().filter(|c| keep.contains(*c)).collect(),
    ))
}

// ============================================================================
// Soundex
// ============================================================================

const SOUNDEX_CODES: [u8; 26] = [
    0, 1, 2, 3, 0, 1, 2, 0, 0, 2, 2, 4, 5, 5, 0, 1, 2, 6, 2, 3, 0, 1, 0, 2, 0, 2,
];

fn soundex_code(c: char) -> u8 {
    if c.is_ascii_alphabetic() {
        SOUNDEX_CODES[(c.to_ascii_uppercase() as u8 - b'A') as usize]
    } else {
        0
    }
}

/// Four-character soundex code, "?000" when `s` has no ASCII letter
pub fn soundex(s: &str) -> String {
    let mut chars = s.chars().skip_while(|c| !c.is_ascii_alphabetic());
    let Some(first) = chars.next() else {
        return "?000".to_string();
    };
    let mut out = String::with_capacity(4);
    out.push(first.to_ascii_uppercase());
    let mut prev = soundex_code(first);
    for c in chars {
        if out.len() == 4 {
            break;
        }
        let code = soundex_code(c);
        if code > 0 && code != prev {
            out.push((b'0' + code) as char);
        }
        prev = code;
    }
    while out.len() < 4 {
        out.push('0');
    }
    out
}

/// soundex(S)
pub fn func_soundex(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let s = arg(args, 0, "soundex")?;
    if s.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::Text(soundex(&s.to_text())))
}

/// difference(S1, S2) - matching positions of the two soundex codes
pub fn func_difference(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let (a, b) = (arg(args, 0, "difference")?, arg(args, 1, "difference")?);
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }
    let (a, b) = (soundex(&a.to_text()), soundex(&b.to_text()));
    let same = a.bytes().zip(b.bytes()).filter(|(x, y)| x == y).count();
    Ok(Value::Integer(same as i64))
}
