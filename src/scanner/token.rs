//! Token matching for inline timestamp syntaxes
//!
//! Two grammars, each wrapped in a single pair of backticks:
//! - RFC 3339: `` `YYYY-MM-DD` `` or `` `YYYY-MM-DDTHH:MM[:SS[.fff]](Z|±HH:MM)` ``
//! - Epoch tag: `` `<t:SECONDS[:FLAG]>` `` with FLAG one of `t T d D f F R`
//!
//! The delimiters must touch the token. Matching is leftmost-first and
//! non-overlapping; every call to [`TokenMatcher::matches`] starts a fresh
//! scan with no state carried over from earlier calls.

use regex::{CaptureMatches, Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::scanner::buffer::TextBuffer;

// ==================== PATTERNS ====================

// ASCII digits only; `\d` would also accept other scripts' digits.
// Group 1: date, Group 2: optional time part starting at 'T'
const RFC3339_BODY: &str =
    r"([0-9]{4}-[0-9]{2}-[0-9]{2})(T[0-9]{2}:[0-9]{2}(?::[0-9]{2}(?:\.[0-9]+)?)?(?:Z|[+-][0-9]{2}:[0-9]{2}))?";

// Group 1: seconds, Group 2: optional style flag
const EPOCH_TAG_BODY: &str = r"<t:([0-9]+)(?::([tTdDfFR]))?>";

// ==================== TYPE DEFINITIONS ====================

/// Which token grammar a pipeline recognizes
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Syntax {
    Rfc3339,
    EpochTag,
}

impl Syntax {
    pub const ALL: [Syntax; 2] = [Syntax::Rfc3339, Syntax::EpochTag];

    pub fn as_str(&self) -> &'static str {
        match self {
            Syntax::Rfc3339 => "rfc3339",
            Syntax::EpochTag => "epoch_tag",
        }
    }

    fn body(&self) -> &'static str {
        match self {
            Syntax::Rfc3339 => RFC3339_BODY,
            Syntax::EpochTag => EPOCH_TAG_BODY,
        }
    }
}

/// Whether an RFC 3339 token carries a time of day
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DatePrecision {
    DateOnly,
    DateTime,
}

/// Epoch tag style flag. Parsed and carried, not used for rendering.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleFlag {
    /// `t`
    ShortTime,
    /// `T`
    LongTime,
    /// `d`
    ShortDate,
    /// `D`
    LongDate,
    /// `f`
    ShortDateTime,
    /// `F`
    LongDateTime,
    /// `R`
    Relative,
}

impl StyleFlag {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            't' => Some(StyleFlag::ShortTime),
            'T' => Some(StyleFlag::LongTime),
            'd' => Some(StyleFlag::ShortDate),
            'D' => Some(StyleFlag::LongDate),
            'f' => Some(StyleFlag::ShortDateTime),
            'F' => Some(StyleFlag::LongDateTime),
            'R' => Some(StyleFlag::Relative),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            StyleFlag::ShortTime => 't',
            StyleFlag::LongTime => 'T',
            StyleFlag::ShortDate => 'd',
            StyleFlag::LongDate => 'D',
            StyleFlag::ShortDateTime => 'f',
            StyleFlag::LongDateTime => 'F',
            StyleFlag::Relative => 'R',
        }
    }
}

/// Semantic fields pulled out of a token, per syntax
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "syntax", rename_all = "snake_case")]
pub enum TokenFields {
    Rfc3339 {
        /// `YYYY-MM-DD`
        date: String,
        /// `THH:MM...` including the zone designator
        time: Option<String>,
    },
    EpochTag {
        /// Decimal digits, unvalidated
        seconds: String,
        style: Option<StyleFlag>,
    },
}

impl TokenFields {
    pub fn syntax(&self) -> Syntax {
        match self {
            TokenFields::Rfc3339 { .. } => Syntax::Rfc3339,
            TokenFields::EpochTag { .. } => Syntax::EpochTag,
        }
    }

    /// Only meaningful for RFC 3339 tokens; epoch tags always count as date-time.
    pub fn precision(&self) -> DatePrecision {
        match self {
            TokenFields::Rfc3339 { time: None, .. } => DatePrecision::DateOnly,
            _ => DatePrecision::DateTime,
        }
    }

    fn from_captures(syntax: Syntax, cap: &Captures<'_>) -> Option<Self> {
        match syntax {
            Syntax::Rfc3339 => Some(TokenFields::Rfc3339 {
                date: cap.get(1)?.as_str().to_string(),
                time: cap.get(2).map(|m| m.as_str().to_string()),
            }),
            Syntax::EpochTag => Some(TokenFields::EpochTag {
                seconds: cap.get(1)?.as_str().to_string(),
                style: cap
                    .get(2)
                    .and_then(|m| m.as_str().chars().next())
                    .and_then(StyleFlag::from_char),
            }),
        }
    }
}

/// A token found in the buffer. Offsets are absolute buffer units and cover
/// the wrapping backticks.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CandidateMatch {
    pub start: usize,
    pub end: usize,
    pub raw: String,
    pub fields: TokenFields,
}

// ==================== MAIN IMPLEMENTATION ====================

/// Compiled patterns for one token syntax
#[derive(Debug, Clone)]
pub struct TokenMatcher {
    syntax: Syntax,
    // Backtick-wrapped, found anywhere in a slice
    delimited_re: Regex,
    // Bare token, anchored at both ends
    exact_re: Regex,
}

impl TokenMatcher {
    pub fn new(syntax: Syntax) -> Self {
        let body = syntax.body();
        let delimited_re = Regex::new(&format!("`{}`", body)).unwrap();
        let exact_re = Regex::new(&format!("^{}$", body)).unwrap();

        Self {
            syntax,
            delimited_re,
            exact_re,
        }
    }

    /// Process-wide compiled matcher for `syntax`.
    pub fn shared(syntax: Syntax) -> &'static TokenMatcher {
        static RFC3339: OnceLock<TokenMatcher> = OnceLock::new();
        static EPOCH_TAG: OnceLock<TokenMatcher> = OnceLock::new();

        let cell = match syntax {
            Syntax::Rfc3339 => &RFC3339,
            Syntax::EpochTag => &EPOCH_TAG,
        };
        cell.get_or_init(|| TokenMatcher::new(syntax))
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// Lazily scan `slice`, which starts at `base` in `buffer`.
    pub fn matches<'a, B>(&'a self, slice: &'a str, base: usize, buffer: &'a B) -> TokenMatches<'a, B>
    where
        B: TextBuffer + ?Sized,
    {
        TokenMatches {
            syntax: self.syntax,
            captures: self.delimited_re.captures_iter(slice),
            slice,
            buffer,
            last_byte: 0,
            last_offset: base,
        }
    }

    /// Match a whole string as a bare token (no backticks).
    pub fn match_exact(&self, text: &str) -> Option<TokenFields> {
        let cap = self.exact_re.captures(text)?;
        TokenFields::from_captures(self.syntax, &cap)
    }
}

/// Iterator over the tokens of one slice, left to right.
pub struct TokenMatches<'a, B: TextBuffer + ?Sized> {
    syntax: Syntax,
    captures: CaptureMatches<'a, 'a>,
    slice: &'a str,
    buffer: &'a B,
    // Byte position in `slice` and the buffer offset it maps to, so each
    // stretch of text between tokens is measured once.
    last_byte: usize,
    last_offset: usize,
}

impl<B: TextBuffer + ?Sized> Iterator for TokenMatches<'_, B> {
    type Item = CandidateMatch;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let cap = self.captures.next()?;
            let Some(full) = cap.get(0) else { continue };
            let Some(fields) = TokenFields::from_captures(self.syntax, &cap) else {
                continue;
            };

            let start = self.last_offset + self.buffer.measure(&self.slice[self.last_byte..full.start()]);
            let end = start + self.buffer.measure(full.as_str());
            self.last_byte = full.end();
            self.last_offset = end;

            return Some(CandidateMatch {
                start,
                end,
                raw: full.as_str().to_string(),
                fields,
            });
        }
    }
}

// ==================== TESTS ====================
