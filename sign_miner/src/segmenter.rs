// Segmenter: classified tail tokens in, ordered `Segment`s out.
//
// One buffer is scanned left to right:
// - Sign → appended to the buffer (unless it is the configured link
//   boundary, see below).
// - Ideogram / Number → closes the buffer if non-empty; the boundary token
//   itself is never stored.
// - Other / Label → ignored, does not close the buffer.
// At end of line a non-empty buffer is emitted. Segments never straddle a
// boundary and never cross a line edge.
//
// Trailing-number extraction is a separate, optional pre-pass: a line-final
// Number is moved into `LineRecord::trailing_number`. The segmenter treats
// every remaining Number as a boundary either way.
//
// With a link boundary configured (`treat_ab22_as_boundary`), the link sign
// behaves like an ideogram: it closes the buffer and is dropped. Segment
// conservation then holds over the non-link signs only.

use crate::config::MinerConfig;
use crate::error::Result;
use crate::tokenizer::LineRecord;
use crate::types::{Segment, Sign, Token};

/// Move a line-final Number token into `trailing_number`.
///
/// Looks at the literal last tail token, whatever its kind; an Other token
/// at the end blocks extraction. Idempotent: once a number has been
/// extracted, further calls return it without touching the tail.
pub fn extract_trailing_number(record: &mut LineRecord) -> Option<u64> {
    if record.trailing_number.is_some() {
        return record.trailing_number;
    }
    if let Some(&Token::Number(n)) = record.tail.last() {
        record.tail.pop();
        record.trailing_number = Some(n);
    }
    record.trailing_number
}

/// The trailing quantity of a line whether or not extraction ran.
pub fn trailing_quantity(record: &LineRecord) -> Option<u64> {
    record.trailing_number.or(match record.tail.last() {
        Some(&Token::Number(n)) => Some(n),
        _ => None,
    })
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Segmenter {
    link_boundary: Option<Sign>,
}

impl Segmenter {
    /// Segmenter that treats every sign as content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Segmenter that additionally splits on (and drops) `link`.
    pub fn with_link_boundary(link: Sign) -> Self {
        Self {
            link_boundary: Some(link),
        }
    }

    pub fn from_config(config: &MinerConfig) -> Result<Self> {
        if config.treat_ab22_as_boundary {
            Ok(Self::with_link_boundary(config.link_sign()?))
        } else {
            Ok(Self::new())
        }
    }

    pub fn link_boundary(&self) -> Option<&Sign> {
        self.link_boundary.as_ref()
    }

    /// Split a token stream into segments, in first-appearance order.
    pub fn segment(&self, tokens: &[Token]) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut buffer: Vec<Sign> = Vec::new();

        for token in tokens {
            match token {
                Token::Sign(sign) if self.link_boundary.as_ref() == Some(sign) => {
                    close(&mut buffer, &mut segments);
                }
                Token::Sign(sign) => buffer.push(sign.clone()),
                t if t.is_boundary() => close(&mut buffer, &mut segments),
                _ => {}
            }
        }
        close(&mut buffer, &mut segments);
        segments
    }

    /// Segment a line's tail (after any trailing-number extraction).
    pub fn segment_line(&self, record: &LineRecord) -> Vec<Segment> {
        self.segment(&record.tail)
    }
}

fn close(buffer: &mut Vec<Sign>, segments: &mut Vec<Segment>) {
    if let Some(segment) = Segment::new(std::mem::take(buffer)) {
        segments.push(segment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;

    fn signs(text: &str) -> Vec<Sign> {
        text.split_whitespace().map(Sign::new).collect()
    }

    #[test]
    fn scenario_labelled_line_with_quantity() {
        let mut record = Tokenizer::default().tokenize_line("Line 4: AB81 AB02 AB22 AB67 12");
        assert_eq!(extract_trailing_number(&mut record), Some(12));
        assert_eq!(record.tail.len(), 4);
        assert!(record.tail.iter().all(|t| t.as_sign().is_some()));

        let segments = Segmenter::new().segment_line(&record);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].signs(), signs("AB81 AB02 AB22 AB67").as_slice());
    }

    #[test]
    fn scenario_pure_label_has_no_segments() {
        let record = Tokenizer::default().tokenize_line(".3");
        assert!(Segmenter::new().segment_line(&record).is_empty());
    }

    #[test]
    fn scenario_ideograms_only_has_no_segments() {
        let record = Tokenizer::default().tokenize_line("*201VAS *305GRA");
        assert!(Segmenter::new().segment_line(&record).is_empty());
    }

    #[test]
    fn boundaries_split_and_are_dropped() {
        let record = Tokenizer::default().tokenize_line("AB01 AB02 *201VAS AB03 5 AB04 AB05");
        let segments = Segmenter::new().segment_line(&record);
        let rendered: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
        assert_eq!(rendered, vec!["AB01 AB02", "AB03", "AB04 AB05"]);
    }

    #[test]
    fn other_tokens_do_not_close_segment() {
        let record = Tokenizer::default().tokenize_line("AB01 ?? AB02");
        let segments = Segmenter::new().segment_line(&record);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].signs(), signs("AB01 AB02").as_slice());
    }

    #[test]
    fn internal_numbers_stay_boundaries_after_extraction() {
        let mut record = Tokenizer::default().tokenize_line("AB01 3 AB02 7");
        extract_trailing_number(&mut record);
        assert_eq!(record.trailing_number, Some(7));
        assert_eq!(Segmenter::new().segment_line(&record).len(), 2);
    }

    #[test]
    fn extraction_requires_literal_last_number() {
        let mut record = Tokenizer::default().tokenize_line("AB01 12 ??");
        assert_eq!(extract_trailing_number(&mut record), None);
        assert_eq!(record.tail.len(), 3);
    }

    #[test]
    fn extraction_is_idempotent() {
        let mut record = Tokenizer::default().tokenize_line("AB01 3 7");
        assert_eq!(extract_trailing_number(&mut record), Some(7));
        assert_eq!(extract_trailing_number(&mut record), Some(7));
        assert_eq!(record.tail.len(), 2);
    }

    #[test]
    fn trailing_quantity_without_extraction() {
        let record = Tokenizer::default().tokenize_line("AB01 9");
        assert_eq!(trailing_quantity(&record), Some(9));
        assert_eq!(record.trailing_number, None);
    }

    #[test]
    fn link_boundary_splits_on_link_sign() {
        let record = Tokenizer::default().tokenize_line("AB81 AB02 AB22 AB67");
        let segmenter = Segmenter::with_link_boundary(Sign::new("AB22"));
        let rendered: Vec<String> = segmenter
            .segment_line(&record)
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(rendered, vec!["AB81 AB02", "AB67"]);
    }

    #[test]
    fn from_config_respects_link_switch() {
        let mut config = MinerConfig::default();
        assert_eq!(Segmenter::from_config(&config).unwrap().link_boundary(), None);
        config.treat_ab22_as_boundary = true;
        assert_eq!(
            Segmenter::from_config(&config).unwrap().link_boundary(),
            Some(&Sign::new("AB22"))
        );
    }

    #[test]
    fn segmentation_conserves_signs() {
        let tok = Tokenizer::default();
        let lines = [
            "AB01 AB02 *201VAS AB03 5 AB04",
            "Line 2: *5GRA AB10 ?? AB11 12 13 AB12",
            "AB01",
            "3 4 5",
            "HT 9: AB07 AB07 AB07 *100OLE",
        ];
        for line in lines {
            let record = tok.tokenize_line(line);
            let expected: Vec<Sign> =
                record.tail.iter().filter_map(|t| t.as_sign().cloned()).collect();
            let segments = Segmenter::new().segment_line(&record);
            let joined: Vec<Sign> = segments.iter().flat_map(|s| s.signs().to_vec()).collect();
            assert_eq!(joined, expected, "conservation for {line:?}");
            assert!(segments.iter().all(|s| !s.is_empty()));
        }
    }

    #[test]
    fn segments_interleaved_with_boundaries_rebuild_tail() {
        // Rebuild the tail from segments + the boundary tokens that closed
        // them; Other tokens are not part of the analyzed stream.
        let record = Tokenizer::default().tokenize_line("AB01 AB02 *201VAS 4 AB03 7");
        let segments = Segmenter::new().segment_line(&record);
        let mut rebuilt: Vec<Token> = Vec::new();
        let mut seg_iter = segments.iter();
        let mut in_segment = false;
        for token in &record.tail {
            match token {
                Token::Sign(_) if !in_segment => {
                    let seg = seg_iter.next().unwrap();
                    rebuilt.extend(seg.signs().iter().cloned().map(Token::Sign));
                    in_segment = true;
                }
                Token::Sign(_) => {}
                other => {
                    rebuilt.push(other.clone());
                    in_segment = false;
                }
            }
        }
        assert!(seg_iter.next().is_none());
        assert_eq!(rebuilt, record.tail);
    }
}
