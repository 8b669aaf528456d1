//! Inline tag scanning and lookup.
//!
//! # Responsibility
//! - Tokenize note text into hashtags (`#name`) and parametric mentions
//!   (`@name(payload)`).
//! - Provide first-match lookups used by project derivation.
//!
//! # Invariants
//! - Token order follows document order; duplicates are kept.
//! - A tag only starts at the beginning of a line or after whitespace.
//! - Malformed fragments (empty names, unterminated payloads) are skipped,
//!   never reported as errors.
//! - Lookups never validate payload content; callers own that.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One inline tag recognized by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    /// `#name`
    Hashtag(String),
    /// `@name` or `@name(payload)`.
    Mention {
        name: String,
        payload: Option<String>,
    },
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hashtag(name) => write!(f, "#{name}"),
            Self::Mention {
                name,
                payload: Some(payload),
            } => write!(f, "@{name}({payload})"),
            Self::Mention {
                name,
                payload: None,
            } => write!(f, "@{name}"),
        }
    }
}

/// Ordered tag collections of one note, in the shape hosts hand them over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    /// Rendered hashtags, e.g. `#project`.
    pub hashtags: Vec<String>,
    /// Rendered mentions, e.g. `@review(2w)`.
    pub mentions: Vec<String>,
}

impl TagSet {
    /// Scans every line in order and collects rendered tokens.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set = Self::default();
        for line in lines {
            for token in scan_line(line) {
                match token {
                    Token::Hashtag(_) => set.hashtags.push(token.to_string()),
                    Token::Mention { .. } => set.mentions.push(token.to_string()),
                }
            }
        }
        set
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '/')
}

/// Tokenizes a single line of note text.
pub fn scan_line(text: &str) -> Vec<Token> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut tokens = Vec::new();
    let mut idx = 0;

    while idx < chars.len() {
        let (_, sigil) = chars[idx];
        let at_boundary = idx == 0 || chars[idx - 1].1.is_whitespace();
        if !at_boundary || !matches!(sigil, '#' | '@') {
            idx += 1;
            continue;
        }

        let name_start = idx + 1;
        let mut name_end = name_start;
        while name_end < chars.len() && is_name_char(chars[name_end].1) {
            name_end += 1;
        }
        if name_end == name_start {
            idx += 1;
            continue;
        }
        let name = slice_chars(text, &chars, name_start, name_end).to_string();

        if sigil == '#' {
            tokens.push(Token::Hashtag(name));
            idx = name_end;
            continue;
        }

        if name_end < chars.len() && chars[name_end].1 == '(' {
            match matching_close(&chars, name_end) {
                Some(close) => {
                    let payload = slice_chars(text, &chars, name_end + 1, close).to_string();
                    tokens.push(Token::Mention {
                        name,
                        payload: Some(payload),
                    });
                    idx = close + 1;
                }
                // Unterminated payload: drop the fragment.
                None => idx = name_end + 1,
            }
        } else {
            tokens.push(Token::Mention {
                name,
                payload: None,
            });
            idx = name_end;
        }
    }

    tokens
}

fn slice_chars<'a>(text: &'a str, chars: &[(usize, char)], start: usize, end: usize) -> &'a str {
    let byte_start = chars.get(start).map_or(text.len(), |(pos, _)| *pos);
    let byte_end = chars.get(end).map_or(text.len(), |(pos, _)| *pos);
    &text[byte_start..byte_end]
}

fn matching_close(chars: &[(usize, char)], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, (_, c)) in chars.iter().enumerate().skip(open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Returns the first tag of the form `{tag_name}(...)`.
///
/// `@review` does not match `@reviewed(...)` because the opening bracket is
/// part of the prefix.
pub fn first_matching_tag<'a, S: AsRef<str>>(tags: &'a [S], tag_name: &str) -> Option<&'a str> {
    let prefix = format!("{tag_name}(");
    tags.iter()
        .map(AsRef::as_ref)
        .find(|tag| tag.starts_with(prefix.as_str()))
}

/// Returns the text between the first `(` and its matching `)`.
pub fn content_within_brackets(tag: &str) -> Option<&str> {
    let chars: Vec<(usize, char)> = tag.char_indices().collect();
    let open = chars.iter().position(|(_, c)| *c == '(')?;
    let close = matching_close(&chars, open)?;
    Some(slice_chars(tag, &chars, open + 1, close))
}

/// Exact (ASCII case-insensitive) membership check for flag tokens.
pub fn contains_token<'a, S: AsRef<str>>(tags: &'a [S], token: &str) -> Option<&'a str> {
    tags.iter()
        .map(AsRef::as_ref)
        .find(|tag| tag.eq_ignore_ascii_case(token))
}
