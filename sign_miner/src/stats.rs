// Corpus statistics aggregator.
//
// Consumes segments (and, for the ideogram/number tables, whole line
// records) and accumulates:
// - unigram, bigram and trigram counts (n-grams never cross a segment edge)
// - segment-initial / segment-final counts
// - prefix-pair / suffix-pair counts for segments of length >= 2
// - an undirected adjacency map of distinct neighbor signs
// - ideogram and number frequencies, a segment-length histogram and
//   whole-segment frequencies
//
// Aggregation is purely additive: `merge` sums counts and unions neighbor
// sets, so per-file partials computed on separate workers combine into the
// same result as a single serial pass. All maps are `BTreeMap`/`BTreeSet`
// so iteration order (and therefore every derived table) is a function of
// the data alone.
//
// The one order-sensitive field is `first_seen`, the order in which signs
// were first observed. It backs the vowel ranking's tie-break. `merge`
// appends the other side's unseen signs in its own order, so merging
// partials in file order reproduces the serial observation order exactly.

use crate::tokenizer::LineRecord;
use crate::types::{Segment, Sign, Token};
use std::collections::{BTreeMap, BTreeSet};

pub type SignPair = (Sign, Sign);
pub type SignTriple = (Sign, Sign, Sign);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CorpusStats {
    pub unigrams: BTreeMap<Sign, u64>,
    pub bigrams: BTreeMap<SignPair, u64>,
    pub trigrams: BTreeMap<SignTriple, u64>,
    pub initials: BTreeMap<Sign, u64>,
    pub finals: BTreeMap<Sign, u64>,
    pub prefix_pairs: BTreeMap<SignPair, u64>,
    pub suffix_pairs: BTreeMap<SignPair, u64>,
    pub adjacency: BTreeMap<Sign, BTreeSet<Sign>>,
    pub ideograms: BTreeMap<String, u64>,
    pub numbers: BTreeMap<u64, u64>,
    pub segment_lengths: BTreeMap<usize, u64>,
    pub segment_frequencies: BTreeMap<Segment, u64>,
    /// Number of segments observed.
    pub segment_count: u64,
    first_seen: Vec<Sign>,
}

impl CorpusStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate a sequence of segments in order.
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a Segment>) -> Self {
        let mut stats = Self::new();
        for segment in segments {
            stats.add_segment(segment);
        }
        stats
    }

    /// Record one segment.
    pub fn add_segment(&mut self, segment: &Segment) {
        let s = segment.signs();
        let n = s.len();

        for sign in s {
            let count = self.unigrams.entry(sign.clone()).or_insert(0);
            if *count == 0 {
                self.first_seen.push(sign.clone());
            }
            *count += 1;
        }

        for w in s.windows(2) {
            *self.bigrams.entry((w[0].clone(), w[1].clone())).or_insert(0) += 1;
            self.adjacency.entry(w[0].clone()).or_default().insert(w[1].clone());
            self.adjacency.entry(w[1].clone()).or_default().insert(w[0].clone());
        }

        for w in s.windows(3) {
            *self
                .trigrams
                .entry((w[0].clone(), w[1].clone(), w[2].clone()))
                .or_insert(0) += 1;
        }

        *self.initials.entry(segment.first().clone()).or_insert(0) += 1;
        *self.finals.entry(segment.last().clone()).or_insert(0) += 1;

        if n >= 2 {
            *self
                .prefix_pairs
                .entry((s[0].clone(), s[1].clone()))
                .or_insert(0) += 1;
            *self
                .suffix_pairs
                .entry((s[n - 2].clone(), s[n - 1].clone()))
                .or_insert(0) += 1;
        }

        *self.segment_lengths.entry(n).or_insert(0) += 1;
        *self.segment_frequencies.entry(segment.clone()).or_insert(0) += 1;
        self.segment_count += 1;
    }

    /// Record one line: its ideograms and numbers (including an extracted
    /// trailing number), then its segments.
    pub fn add_line(&mut self, record: &LineRecord, segments: &[Segment]) {
        for token in &record.tail {
            match token {
                Token::Ideogram(text) => *self.ideograms.entry(text.clone()).or_insert(0) += 1,
                Token::Number(n) => *self.numbers.entry(*n).or_insert(0) += 1,
                _ => {}
            }
        }
        if let Some(n) = record.trailing_number {
            *self.numbers.entry(n).or_insert(0) += 1;
        }
        for segment in segments {
            self.add_segment(segment);
        }
    }

    /// Fold `other` into `self` by elementwise addition.
    pub fn merge(&mut self, other: CorpusStats) {
        for sign in other.first_seen {
            if !self.unigrams.contains_key(&sign) {
                self.first_seen.push(sign);
            }
        }
        add_counts(&mut self.unigrams, other.unigrams);
        add_counts(&mut self.bigrams, other.bigrams);
        add_counts(&mut self.trigrams, other.trigrams);
        add_counts(&mut self.initials, other.initials);
        add_counts(&mut self.finals, other.finals);
        add_counts(&mut self.prefix_pairs, other.prefix_pairs);
        add_counts(&mut self.suffix_pairs, other.suffix_pairs);
        add_counts(&mut self.ideograms, other.ideograms);
        add_counts(&mut self.numbers, other.numbers);
        add_counts(&mut self.segment_lengths, other.segment_lengths);
        add_counts(&mut self.segment_frequencies, other.segment_frequencies);
        for (sign, neighbors) in other.adjacency {
            self.adjacency.entry(sign).or_default().extend(neighbors);
        }
        self.segment_count += other.segment_count;
    }

    /// Signs in the order they were first observed.
    pub fn first_seen(&self) -> &[Sign] {
        &self.first_seen
    }

    pub fn frequency(&self, sign: &Sign) -> u64 {
        self.unigrams.get(sign).copied().unwrap_or(0)
    }

    /// Distinct co-occurring neighbors of `sign`.
    pub fn neighbor_count(&self, sign: &Sign) -> usize {
        self.adjacency.get(sign).map_or(0, BTreeSet::len)
    }

    /// Segment-initial plus segment-final occurrences of `sign`.
    pub fn edge_hits(&self, sign: &Sign) -> u64 {
        self.initials.get(sign).copied().unwrap_or(0) + self.finals.get(sign).copied().unwrap_or(0)
    }

    /// Total sign tokens across all segments.
    pub fn sign_tokens(&self) -> u64 {
        self.unigrams.values().sum()
    }

    pub fn bigram_total(&self) -> u64 {
        self.bigrams.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segment_count == 0 && self.ideograms.is_empty() && self.numbers.is_empty()
    }
}

fn add_counts<K: Ord>(into: &mut BTreeMap<K, u64>, from: BTreeMap<K, u64>) {
    for (key, count) in from {
        *into.entry(key).or_insert(0) += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::{Segmenter, extract_trailing_number};
    use crate::tokenizer::Tokenizer;

    fn seg(text: &str) -> Segment {
        Segment::new(text.split_whitespace().map(Sign::new).collect()).unwrap()
    }

    fn s(text: &str) -> Sign {
        Sign::new(text)
    }

    #[test]
    fn counts_for_single_segment() {
        let stats = CorpusStats::from_segments(&[seg("AB01 AB02 AB03 AB02")]);
        assert_eq!(stats.frequency(&s("AB02")), 2);
        assert_eq!(stats.bigrams[&(s("AB01"), s("AB02"))], 1);
        assert_eq!(stats.bigrams[&(s("AB03"), s("AB02"))], 1);
        assert_eq!(stats.trigrams.len(), 2);
        assert_eq!(stats.initials[&s("AB01")], 1);
        assert_eq!(stats.finals[&s("AB02")], 1);
        assert_eq!(stats.prefix_pairs[&(s("AB01"), s("AB02"))], 1);
        assert_eq!(stats.suffix_pairs[&(s("AB03"), s("AB02"))], 1);
        // AB02 neighbors AB01 and AB03; the repeat adds nothing.
        assert_eq!(stats.neighbor_count(&s("AB02")), 2);
        assert_eq!(stats.neighbor_count(&s("AB01")), 1);
        assert_eq!(stats.segment_lengths[&4], 1);
        assert_eq!(stats.sign_tokens(), 4);
    }

    #[test]
    fn single_sign_segment_contributes_only_unigram_and_edges() {
        let stats = CorpusStats::from_segments(&[seg("AB07")]);
        assert_eq!(stats.frequency(&s("AB07")), 1);
        assert!(stats.bigrams.is_empty());
        assert!(stats.trigrams.is_empty());
        assert!(stats.prefix_pairs.is_empty());
        assert!(stats.suffix_pairs.is_empty());
        assert!(stats.adjacency.is_empty());
        assert_eq!(stats.edge_hits(&s("AB07")), 2);
    }

    #[test]
    fn adjacency_is_undirected() {
        let stats = CorpusStats::from_segments(&[seg("AB01 AB02")]);
        assert!(stats.adjacency[&s("AB01")].contains(&s("AB02")));
        assert!(stats.adjacency[&s("AB02")].contains(&s("AB01")));
    }

    #[test]
    fn bigrams_never_exceed_segment_internal_pairs() {
        let segments = [seg("AB01 AB02 AB03"), seg("AB04"), seg("AB05 AB06")];
        let stats = CorpusStats::from_segments(&segments);
        let bound: u64 = segments.iter().map(|s| s.len() as u64 - 1).sum();
        assert!(stats.bigram_total() <= bound);
        assert_eq!(stats.bigram_total(), 3);
    }

    #[test]
    fn no_bigram_spans_a_boundary() {
        let tok = Tokenizer::default();
        let record = tok.tokenize_line("AB01 AB02 *201VAS AB03 4 AB04");
        let segments = Segmenter::new().segment_line(&record);
        let stats = CorpusStats::from_segments(&segments);
        assert!(!stats.bigrams.contains_key(&(s("AB02"), s("AB03"))));
        assert!(!stats.bigrams.contains_key(&(s("AB03"), s("AB04"))));
        assert_eq!(stats.bigram_total(), 1);
    }

    #[test]
    fn add_line_counts_ideograms_and_numbers() {
        let tok = Tokenizer::default();
        let mut record = tok.tokenize_line("AB01 *201VAS 3 AB02 *201vas 12");
        extract_trailing_number(&mut record);
        let segments = Segmenter::new().segment_line(&record);
        let mut stats = CorpusStats::new();
        stats.add_line(&record, &segments);
        assert_eq!(stats.ideograms["*201VAS"], 2);
        assert_eq!(stats.numbers[&3], 1);
        assert_eq!(stats.numbers[&12], 1);
        assert_eq!(stats.segment_count, 2);
    }

    #[test]
    fn first_seen_follows_observation_order() {
        let stats = CorpusStats::from_segments(&[seg("AB09 AB01"), seg("AB01 AB05 AB09")]);
        let order: Vec<&str> = stats.first_seen().iter().map(Sign::as_str).collect();
        assert_eq!(order, vec!["AB09", "AB01", "AB05"]);
    }

    #[test]
    fn merge_matches_serial_aggregation() {
        let part_a = [seg("AB01 AB02 AB03"), seg("AB02")];
        let part_b = [seg("AB04 AB02"), seg("AB01 AB02 AB03"), seg("AB05")];
        let serial = CorpusStats::from_segments(part_a.iter().chain(part_b.iter()));

        let mut merged = CorpusStats::from_segments(&part_a);
        merged.merge(CorpusStats::from_segments(&part_b));
        assert_eq!(merged, serial);
        assert_eq!(merged.segment_frequencies[&seg("AB01 AB02 AB03")], 2);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let stats = CorpusStats::from_segments(&[seg("AB01 AB02")]);
        let mut merged = stats.clone();
        merged.merge(CorpusStats::new());
        assert_eq!(merged, stats);

        let mut from_empty = CorpusStats::new();
        from_empty.merge(stats.clone());
        assert_eq!(from_empty, stats);
    }

    #[test]
    fn deserialized_segments_count_under_canonical_signs() {
        let segments: Vec<Segment> = serde_json::from_str(r#"[["ab01","AB02"],["AB01"]]"#).unwrap();
        let stats = CorpusStats::from_segments(&segments);
        assert_eq!(stats.frequency(&s("AB01")), 2);
        assert_eq!(stats.initials[&s("AB01")], 2);
        assert!(serde_json::from_str::<Vec<Segment>>(r#"[["AB01"],[]]"#).is_err());
    }

    #[test]
    fn empty_stats() {
        let stats = CorpusStats::new();
        assert!(stats.is_empty());
        assert_eq!(stats.sign_tokens(), 0);
        assert_eq!(stats.neighbor_count(&s("AB01")), 0);
    }
}
