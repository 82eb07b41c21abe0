// Line tokenizer: raw transcription line in, `LineRecord` out.
//
// A line is one of:
// - a pure label (`.3`, `Line 4`, `HT 13a`) with no content,
// - a labelled line (`Line 4: AB81 AB02 AB22 AB67 12`),
// - a bare token line (`AB81 AB02 *201VAS 5`).
//
// Processing order:
// 1. Commas, brackets, bullets and semicolons become spaces; the line is trimmed.
// 2. If the line opens with a label pattern, the text before the first colon
//    is the label and the rest is the tail. Without a colon the whole line is
//    a label and the tail is empty.
// 3. The tail is split on whitespace and every raw token is classified by
//    `Tokenizer::classify` into exactly one `Token` variant.
//
// Label pattern (ASCII case-insensitive), followed by a word boundary:
//   `.?DIGITS[letter]`  |  `line` WS+ DIGITS  |  one of the site codes
//
// The classifier is a hand-written matcher over ASCII bytes; the grammars
// are all fixed-prefix and need no backtracking. Other tokens are kept in
// the tail verbatim so trailing-number extraction (`segmenter.rs`) sees the
// literal last token, but nothing downstream analyzes them.

use crate::config::TokenizerConfig;
use crate::types::{Sign, Token};

/// Characters that separate tokens in addition to whitespace.
const SEPARATORS: &[char] = &[',', '[', ']', '•', '·', ';'];

/// One tokenized input line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineRecord {
    /// Line identifier, whitespace-collapsed.
    pub label: Option<String>,
    /// Classified tokens after the label, in line order.
    pub tail: Vec<Token>,
    /// Line-final quantity, once extracted by
    /// `segmenter::extract_trailing_number`.
    pub trailing_number: Option<u64>,
}

impl LineRecord {
    /// Every token of the line in order: label, tail, trailing number.
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.label
            .iter()
            .map(|l| Token::Label(l.clone()))
            .chain(self.tail.iter().cloned())
            .chain(self.trailing_number.map(Token::Number))
    }

    /// Cleaned rendering: the label, then `: ` and the recognized tail
    /// tokens (signs, ideograms, numbers) in canonical form.
    pub fn render_normalized(&self) -> String {
        let tail: Vec<String> = self
            .tail
            .iter()
            .chain(self.trailing_number.map(Token::Number).as_ref())
            .filter(|t| !matches!(t, Token::Other(_) | Token::Label(_)))
            .map(|t| t.to_string())
            .collect();
        match (&self.label, tail.is_empty()) {
            (Some(label), true) => label.clone(),
            (Some(label), false) => format!("{label}: {}", tail.join(" ")),
            (None, _) => tail.join(" "),
        }
    }
}

/// Classifies raw text under a configured sign grammar.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    sign_prefix: String,
    site_codes: Vec<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(&TokenizerConfig::default())
    }
}

impl Tokenizer {
    pub fn new(config: &TokenizerConfig) -> Self {
        Self {
            sign_prefix: config.sign_prefix.to_ascii_uppercase(),
            site_codes: config
                .site_codes
                .iter()
                .map(|c| c.to_ascii_uppercase())
                .collect(),
        }
    }

    /// Tokenize one raw line into its label and classified tail.
    pub fn tokenize_line(&self, line: &str) -> LineRecord {
        let cleaned: String = line
            .chars()
            .map(|c| if SEPARATORS.contains(&c) { ' ' } else { c })
            .collect();
        let trimmed = cleaned.trim();
        if trimmed.is_empty() {
            return LineRecord::default();
        }

        if !self.starts_with_label(trimmed) {
            return LineRecord {
                label: None,
                tail: self.tokenize_tail(trimmed),
                trailing_number: None,
            };
        }

        match trimmed.split_once(':') {
            Some((label, tail)) => LineRecord {
                label: Some(collapse_whitespace(label)),
                tail: self.tokenize_tail(tail),
                trailing_number: None,
            },
            None => LineRecord {
                label: Some(collapse_whitespace(trimmed)),
                tail: Vec::new(),
                trailing_number: None,
            },
        }
    }

    /// Classify every whitespace-separated token of an unlabelled tail.
    ///
    /// Re-tokenizing the rendered output of this function yields the same
    /// tokens: canonical forms classify to themselves.
    pub fn tokenize_tail(&self, tail: &str) -> Vec<Token> {
        tail.split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
            .filter(|raw| !raw.is_empty())
            .map(|raw| self.classify(raw))
            .collect()
    }

    /// Cleaned form of a raw line; see `LineRecord::render_normalized`.
    pub fn normalize_line(&self, line: &str) -> String {
        self.tokenize_line(line).render_normalized()
    }

    /// Classify one raw token. Total and deterministic: every input maps to
    /// exactly one of Sign, Ideogram, Number or Other.
    pub fn classify(&self, raw: &str) -> Token {
        let upper = raw.to_ascii_uppercase();
        if self.is_sign(&upper) {
            Token::Sign(Sign::new(&upper))
        } else if is_ideogram(&upper) {
            Token::Ideogram(upper)
        } else if is_digits(raw) {
            // Digit runs too long for u64 are not quantities.
            match raw.parse::<u64>() {
                Ok(n) => Token::Number(n),
                Err(_) => Token::Other(raw.to_string()),
            }
        } else {
            Token::Other(raw.to_string())
        }
    }

    /// Prefix letters followed by 1-3 ASCII digits, nothing else.
    fn is_sign(&self, upper: &str) -> bool {
        upper
            .strip_prefix(self.sign_prefix.as_str())
            .is_some_and(|digits| (1..=3).contains(&digits.len()) && is_digits(digits))
    }

    fn starts_with_label(&self, line: &str) -> bool {
        numeric_label_end(line).is_some_and(|end| at_word_boundary(line, end))
            || line_keyword_end(line).is_some_and(|end| at_word_boundary(line, end))
            || self.site_codes.iter().any(|code| {
                line.get(..code.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(code))
                    && at_word_boundary(line, code.len())
            })
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `*` + digits + letters.
fn is_ideogram(upper: &str) -> bool {
    let Some(rest) = upper.strip_prefix('*') else {
        return false;
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let letters = &rest[digits..];
    digits > 0 && !letters.is_empty() && letters.bytes().all(|b| b.is_ascii_alphabetic())
}

/// End offset of `.?DIGITS[letter]`, or `None` if the line does not open
/// with it. The optional letter is taken greedily; a letter right after the
/// digits can never sit on a word boundary, so there is nothing to retry.
fn numeric_label_end(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let start = usize::from(bytes.first() == Some(&b'.'));
    let digits = bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let end = start + digits;
    if bytes.get(end).is_some_and(u8::is_ascii_alphabetic) {
        Some(end + 1)
    } else {
        Some(end)
    }
}

/// End offset of `line` WS+ DIGITS.
fn line_keyword_end(line: &str) -> Option<usize> {
    let head = line.get(..4)?;
    if !head.eq_ignore_ascii_case("line") {
        return None;
    }
    let rest = &line[4..];
    let after_ws = rest.trim_start();
    let ws = rest.len() - after_ws.len();
    let digits = after_ws.bytes().take_while(u8::is_ascii_digit).count();
    if ws == 0 || digits == 0 {
        return None;
    }
    Some(4 + ws + digits)
}

/// True when `offset` is the end of the line or the next character is not a
/// word character (alphanumeric or underscore).
fn at_word_boundary(line: &str, offset: usize) -> bool {
    match line.get(offset..).and_then(|rest| rest.chars().next()) {
        None => line.len() == offset,
        Some(c) => !(c.is_alphanumeric() || c == '_'),
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
