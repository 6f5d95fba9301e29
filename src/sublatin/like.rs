//! Case-insensitive LIKE over the folded character set
//!
//! `%` matches any run of characters, `_` exactly one. An optional escape
//! character makes the following pattern character literal.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Any,
    One,
    Lit(char),
}

/// Compile a pattern; `None` when it ends in a dangling escape
fn compile(pattern: &str, escape: Option<char>, fold: fn(char) -> char) -> Option<Vec<Token>> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        let token = if Some(c) == escape {
            Token::Lit(fold(chars.next()?))
        } else {
            match c {
                '%' => {
                    if tokens.last() == Some(&Token::Any) {
                        continue;
                    }
                    Token::Any
                }
                '_' => Token::One,
                c => Token::Lit(fold(c)),
            }
        };
        tokens.push(token);
    }
    Some(tokens)
}

/// Match `text` against a LIKE `pattern`, folding both sides with `fold`
///
/// Backtracks only to the most recent `%`, so the cost is bounded by
/// pattern length times text length.
pub fn like_compare(pattern: &str, text: &str, escape: Option<char>, fold: fn(char) -> char) -> bool {
    let Some(pat) = compile(pattern, escape, fold) else {
        return false;
    };
    let text: Vec<char> = text.chars().map(fold).collect();

    let (mut p, mut s) = (0, 0);
    let mut resume: Option<(usize, usize)> = None;
    while s < text.len() {
        match pat.get(p) {
            Some(Token::Any) => {
                resume = Some((p, s));
                p += 1;
                continue;
            }
            Some(Token::One) => {
                p += 1;
                s += 1;
                continue;
            }
            Some(Token::Lit(c)) if *c == text[s] => {
                p += 1;
                s += 1;
                continue;
            }
            _ => {}
        }
        match resume {
            Some((star, from)) => {
                p = star + 1;
                s = from + 1;
                resume = Some((star, from + 1));
            }
            None => return false,
        }
    }
    pat[p..].iter().all(|t| *t == Token::Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sublatin::fold::{to_lower_deaccent_sl, to_lower_sl};

    fn sl(p: &str, s: &str) -> bool {
        like_compare(p, s, None, to_lower_sl)
    }

    #[test]
    fn test_wildcards() {
        assert!(sl("a%", "abc"));
        assert!(sl("%c", "abc"));
        assert!(sl("a_c", "abc"));
        assert!(sl("%", ""));
        assert!(sl("%%b%%", "abc"));
        assert!(!sl("a_", "abc"));
        assert!(!sl("", "a"));
        assert!(sl("%a%b%c%", "xxaxxbxxcxx"));
        assert!(!sl("%a%b%c%", "xxcxxbxxaxx"));
    }

    #[test]
    fn test_case_folding() {
        assert!(sl("ÑANDÚ", "ñandú"));
        assert!(!sl("nandu", "ñandú"));
        assert!(like_compare("nandu", "ÑANDÚ", None, to_lower_deaccent_sl));
    }

    #[test]
    fn test_escape() {
        assert!(like_compare("10!%", "10%", Some('!'), to_lower_sl));
        assert!(!like_compare("10!%", "100", Some('!'), to_lower_sl));
        assert!(like_compare("a!_%", "a_bc", Some('!'), to_lower_sl));
        // dangling escape never matches
        assert!(!like_compare("abc!", "abc", Some('!'), to_lower_sl));
    }
}
