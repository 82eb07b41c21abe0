// Link-sign probe: stems and endings around a linking sign.
//
// Reads the link sign (AB22 by default) as a structural joint between a stem
// and an ending. For every occurrence at position `i` of a segment:
// - stem   = the signs before `i` (needs `i >= min_stem_len` and `i >= 1`)
// - ending = the sign at `i + 1`
// Occurrences with both parts count toward stems, endings and
// (stem, ending) pairs; the first such occurrence of each pair is kept as an
// example. Independently, every occurrence followed by a sign records the
// line's trailing quantity (if any) under its ending.
//
// Segments are rebuilt from the line tails with the link kept as an ordinary
// sign, whatever `treat_ab22_as_boundary` says for the main statistics.

use crate::config::LinkProbeConfig;
use crate::corpus::Corpus;
use crate::segmenter::{Segmenter, trailing_quantity};
use crate::types::{Segment, Sign};
use std::collections::BTreeMap;

/// Count of one (stem, ending) pair and where it was first seen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairOccurrences {
    pub count: u64,
    /// `"file: stem LINK ending"`.
    pub example: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkProbe {
    pub link: Sign,
    pub stems: BTreeMap<Segment, u64>,
    pub endings: BTreeMap<Sign, u64>,
    pub pairs: BTreeMap<(Segment, Sign), PairOccurrences>,
    /// Trailing quantities of the lines each ending occurs on, in corpus
    /// order.
    pub ending_numbers: BTreeMap<Sign, Vec<u64>>,
}

impl LinkProbe {
    pub fn run(corpus: &Corpus, link: &Sign, config: &LinkProbeConfig) -> Self {
        let mut probe = LinkProbe {
            link: link.clone(),
            stems: BTreeMap::new(),
            endings: BTreeMap::new(),
            pairs: BTreeMap::new(),
            ending_numbers: BTreeMap::new(),
        };
        let segmenter = Segmenter::new();
        for file in &corpus.files {
            for line in &file.lines {
                let quantity = trailing_quantity(&line.record);
                for segment in segmenter.segment_line(&line.record) {
                    probe.scan(&file.name, &segment, quantity, config.min_stem_len);
                }
            }
        }
        log::debug!(
            "link probe {link}: {} stems, {} endings, {} pairs",
            probe.stems.len(),
            probe.endings.len(),
            probe.pairs.len()
        );
        probe
    }

    fn scan(&mut self, file: &str, segment: &Segment, quantity: Option<u64>, min_stem_len: usize) {
        let link = &self.link;
        let signs = segment.signs();
        for (i, sign) in signs.iter().enumerate() {
            if sign != link {
                continue;
            }
            let Some(ending) = signs.get(i + 1) else {
                continue;
            };
            if let Some(n) = quantity {
                self.ending_numbers.entry(ending.clone()).or_default().push(n);
            }
            if i < min_stem_len {
                continue;
            }
            let Some(stem) = Segment::new(signs[..i].to_vec()) else {
                continue;
            };
            *self.stems.entry(stem.clone()).or_insert(0) += 1;
            *self.endings.entry(ending.clone()).or_insert(0) += 1;
            self.pairs
                .entry((stem.clone(), ending.clone()))
                .or_insert_with(|| PairOccurrences {
                    count: 0,
                    example: format!("{file}: {stem} {link} {ending}"),
                })
                .count += 1;
        }
    }

    /// Mean trailing quantity for `ending`, if any were recorded.
    pub fn mean_number(&self, ending: &Sign) -> Option<f64> {
        let numbers = self.ending_numbers.get(ending)?;
        if numbers.is_empty() {
            return None;
        }
        Some(numbers.iter().sum::<u64>() as f64 / numbers.len() as f64)
    }
}
