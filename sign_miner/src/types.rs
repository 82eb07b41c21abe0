// Core token types shared by every stage of the miner.
//
// The type hierarchy is:
// - `Sign`: a canonical content symbol (prefix letters + 1-3 digits, uppercase)
// - `TokenKind`: the five-way classification tag
// - `Token`: a classified unit of text carrying its canonical payload
// - `Segment`: a non-empty run of signs, the miner's candidate "word"
//
// Every consumer dispatches on `Token` instead of re-matching raw strings;
// classification itself lives in `tokenizer.rs`.
//
// Determinism constraint: statistics are keyed by these types in ordered
// maps, so `Ord` must stay a pure function of the canonical text.

use crate::error::MinerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A canonical content sign, e.g. `AB81`.
///
/// Leading zeros are significant: `AB02` and `AB2` are distinct signs, as in
/// the transcriptions themselves.
///
/// Deserialization canonicalizes the same way as `Sign::new`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Sign(String);

impl Sign {
    /// Build a sign from text, canonicalizing to uppercase. Does not check
    /// the sign grammar; use `Tokenizer::classify` for untrusted input.
    pub fn new(text: &str) -> Self {
        Sign(text.to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Sign {
    fn from(text: String) -> Self {
        Sign::new(&text)
    }
}

impl From<Sign> for String {
    fn from(sign: Sign) -> Self {
        sign.0
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification tag for a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Sign,
    Ideogram,
    Number,
    Label,
    Other,
}

/// A classified unit of transcription text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Token {
    /// Content sign, canonical uppercase.
    Sign(Sign),
    /// Commodity ideogram such as `*201VAS`, canonical uppercase.
    Ideogram(String),
    /// Bare decimal quantity.
    Number(u64),
    /// Line identifier (metadata, never analyzed).
    Label(String),
    /// Anything unrecognized; kept verbatim, ignored by analysis.
    Other(String),
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Sign(_) => TokenKind::Sign,
            Token::Ideogram(_) => TokenKind::Ideogram,
            Token::Number(_) => TokenKind::Number,
            Token::Label(_) => TokenKind::Label,
            Token::Other(_) => TokenKind::Other,
        }
    }

    pub fn as_sign(&self) -> Option<&Sign> {
        match self {
            Token::Sign(sign) => Some(sign),
            _ => None,
        }
    }

    /// Ideograms and numbers close the current segment.
    pub fn is_boundary(&self) -> bool {
        matches!(self, Token::Ideogram(_) | Token::Number(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Sign(sign) => write!(f, "{sign}"),
            Token::Ideogram(text) | Token::Label(text) | Token::Other(text) => f.write_str(text),
            Token::Number(n) => write!(f, "{n}"),
        }
    }
}

/// An ordered, non-empty run of signs drawn from one line.
///
/// Constructed only through `Segment::new`, which rejects empty input, so
/// `first()`/`last()` are infallible. Deserializing an empty list fails.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<Sign>", into = "Vec<Sign>")]
pub struct Segment(Vec<Sign>);

impl Segment {
    /// Returns `None` for an empty sign list.
    pub fn new(signs: Vec<Sign>) -> Option<Self> {
        if signs.is_empty() {
            None
        } else {
            Some(Segment(signs))
        }
    }

    pub fn signs(&self) -> &[Sign] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> &Sign {
        &self.0[0]
    }

    pub fn last(&self) -> &Sign {
        &self.0[self.0.len() - 1]
    }
}

impl TryFrom<Vec<Sign>> for Segment {
    type Error = MinerError;

    fn try_from(signs: Vec<Sign>) -> Result<Self, Self::Error> {
        Segment::new(signs).ok_or(MinerError::EmptySegment)
    }
}

impl From<Segment> for Vec<Sign> {
    fn from(segment: Segment) -> Self {
        segment.0
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sign) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{sign}")?;
        }
        Ok(())
    }
}
