// Tabular output records.
//
// Flat, serializable rows built from the aggregated statistics, the coverage
// sweep, the link probe and the masked-stem recount. The engine never writes
// them anywhere: callers pick the format (JSON, CSV via serde, ...) and
// destination.
//
// Row order is fixed so output is reproducible: count tables sort by count
// descending, ties by key ascending; histograms and maps sort by key; segment
// patterns keep corpus order.

use crate::coverage::{CoverageResult, CoverageSweep, cv_pattern};
use crate::error::CorpusWarning;
use crate::link_probe::LinkProbe;
use crate::stats::CorpusStats;
use crate::stem_mask::MaskedStems;
use crate::types::{Segment, Sign};
use crate::vowel::VowelAssignment;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FrequencyRow {
    pub symbol: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BigramRow {
    pub sign1: Sign,
    pub sign2: Sign,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrigramRow {
    pub sign1: Sign,
    pub sign2: Sign,
    pub sign3: Sign,
    pub count: u64,
}

/// Prefix or suffix pair, rendered `"AB01 AB02"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PairRow {
    pub sign_pair: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AdjacencyRow {
    pub sign: Sign,
    pub neighbors: Vec<Sign>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SegmentRow {
    pub segment: String,
    pub length: usize,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LengthRow {
    pub length: usize,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoverageRow {
    pub k: usize,
    pub coverage_ratio: f64,
    pub vowel_set: Vec<Sign>,
    pub avg_chunk_length: f64,
}

impl From<&CoverageResult> for CoverageRow {
    fn from(result: &CoverageResult) -> Self {
        Self {
            k: result.k,
            coverage_ratio: result.coverage_ratio,
            vowel_set: result.vowel_set.clone(),
            avg_chunk_length: result.avg_chunk_length,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StemRow {
    pub stem: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StemEndingRow {
    pub stem: String,
    pub ending: Sign,
    pub count: u64,
    pub example: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EndingNumberRow {
    pub ending: Sign,
    pub count: usize,
    pub avg_number: f64,
    pub numbers: Vec<u64>,
}

/// A segment with its C/V shape, e.g. `"AB01 AB02"` / `"CV"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SegmentPatternRow {
    pub segment: String,
    pub pattern: String,
    pub length: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MaskedStemRow {
    pub stem: String,
    pub count: u64,
    pub example_file: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WarningRow {
    pub file: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Entries of a count map, count descending then key ascending.
fn by_count<K: Ord>(map: &BTreeMap<K, u64>) -> Vec<(&K, u64)> {
    let mut rows: Vec<(&K, u64)> = map.iter().map(|(k, &c)| (k, c)).collect();
    // Stable over the map's ascending key order.
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}

fn frequency_rows<K: Ord + ToString>(map: &BTreeMap<K, u64>) -> Vec<FrequencyRow> {
    by_count(map)
        .into_iter()
        .map(|(k, count)| FrequencyRow {
            symbol: k.to_string(),
            count,
        })
        .collect()
}

pub fn unigram_table(stats: &CorpusStats) -> Vec<FrequencyRow> {
    frequency_rows(&stats.unigrams)
}

pub fn ideogram_table(stats: &CorpusStats) -> Vec<FrequencyRow> {
    frequency_rows(&stats.ideograms)
}

/// Ties among equal counts are broken by numeric value, not by text.
pub fn number_table(stats: &CorpusStats) -> Vec<FrequencyRow> {
    frequency_rows(&stats.numbers)
}

pub fn initial_table(stats: &CorpusStats) -> Vec<FrequencyRow> {
    frequency_rows(&stats.initials)
}

pub fn final_table(stats: &CorpusStats) -> Vec<FrequencyRow> {
    frequency_rows(&stats.finals)
}

fn bigram_rows(map: &BTreeMap<(Sign, Sign), u64>) -> Vec<BigramRow> {
    by_count(map)
        .into_iter()
        .map(|((a, b), count)| BigramRow {
            sign1: a.clone(),
            sign2: b.clone(),
            count,
        })
        .collect()
}

pub fn bigram_table(stats: &CorpusStats) -> Vec<BigramRow> {
    bigram_rows(&stats.bigrams)
}

pub fn trigram_table(stats: &CorpusStats) -> Vec<TrigramRow> {
    by_count(&stats.trigrams)
        .into_iter()
        .map(|((a, b, c), count)| TrigramRow {
            sign1: a.clone(),
            sign2: b.clone(),
            sign3: c.clone(),
            count,
        })
        .collect()
}

fn pair_rows(map: &BTreeMap<(Sign, Sign), u64>) -> Vec<PairRow> {
    by_count(map)
        .into_iter()
        .map(|((a, b), count)| PairRow {
            sign_pair: format!("{a} {b}"),
            count,
        })
        .collect()
}

pub fn prefix_pair_table(stats: &CorpusStats) -> Vec<PairRow> {
    pair_rows(&stats.prefix_pairs)
}

pub fn suffix_pair_table(stats: &CorpusStats) -> Vec<PairRow> {
    pair_rows(&stats.suffix_pairs)
}

/// One row per sign, neighbors in sign order.
pub fn adjacency_table(stats: &CorpusStats) -> Vec<AdjacencyRow> {
    stats
        .adjacency
        .iter()
        .map(|(sign, neighbors)| AdjacencyRow {
            sign: sign.clone(),
            neighbors: neighbors.iter().cloned().collect(),
        })
        .collect()
}

/// Whole segments of at least `min_len` signs with their frequencies.
pub fn segment_table(stats: &CorpusStats, min_len: usize) -> Vec<SegmentRow> {
    by_count(&stats.segment_frequencies)
        .into_iter()
        .filter(|(segment, _)| segment.len() >= min_len)
        .map(|(segment, count)| SegmentRow {
            segment: segment.to_string(),
            length: segment.len(),
            count,
        })
        .collect()
}

/// Segment-length histogram, shortest first.
pub fn length_table(stats: &CorpusStats) -> Vec<LengthRow> {
    stats
        .segment_lengths
        .iter()
        .map(|(&length, &count)| LengthRow { length, count })
        .collect()
}

/// One row per tested k, in sweep order.
pub fn coverage_table(sweep: &CoverageSweep) -> Vec<CoverageRow> {
    sweep.results.iter().map(CoverageRow::from).collect()
}

pub fn best_row(sweep: &CoverageSweep) -> Option<CoverageRow> {
    sweep.best.as_ref().map(CoverageRow::from)
}

pub fn stem_table(probe: &LinkProbe) -> Vec<StemRow> {
    by_count(&probe.stems)
        .into_iter()
        .map(|(stem, count)| StemRow {
            stem: stem.to_string(),
            count,
        })
        .collect()
}

pub fn ending_table(probe: &LinkProbe) -> Vec<FrequencyRow> {
    frequency_rows(&probe.endings)
}

pub fn stem_ending_table(probe: &LinkProbe) -> Vec<StemEndingRow> {
    let mut rows: Vec<StemEndingRow> = probe
        .pairs
        .iter()
        .map(|((stem, ending), pair)| StemEndingRow {
            stem: stem.to_string(),
            ending: ending.clone(),
            count: pair.count,
            example: pair.example.clone(),
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Endings with at least one recorded quantity, by sign.
pub fn ending_number_table(probe: &LinkProbe) -> Vec<EndingNumberRow> {
    probe
        .ending_numbers
        .iter()
        .filter_map(|(ending, numbers)| {
            let avg_number = probe.mean_number(ending)?;
            Some(EndingNumberRow {
                ending: ending.clone(),
                count: numbers.len(),
                avg_number,
                numbers: numbers.clone(),
            })
        })
        .collect()
}

/// One row per segment, in corpus order, shaped under `vowels`.
pub fn segment_pattern_table<'a>(
    segments: impl IntoIterator<Item = &'a Segment>,
    vowels: &VowelAssignment,
) -> Vec<SegmentPatternRow> {
    segments
        .into_iter()
        .map(|segment| SegmentPatternRow {
            segment: segment.to_string(),
            pattern: cv_pattern(segment.signs(), vowels),
            length: segment.len(),
        })
        .collect()
}

pub fn masked_stem_table(masked: &MaskedStems) -> Vec<MaskedStemRow> {
    by_count(&masked.stems)
        .into_iter()
        .map(|(stem, count)| MaskedStemRow {
            stem: stem.to_string(),
            count,
            example_file: masked.examples.get(stem).cloned().unwrap_or_default(),
        })
        .collect()
}

pub fn masked_bigram_table(masked: &MaskedStems) -> Vec<BigramRow> {
    bigram_rows(&masked.bigrams)
}

pub fn warning_table(warnings: &[CorpusWarning]) -> Vec<WarningRow> {
    warnings
        .iter()
        .map(|w| WarningRow {
            file: w.file.display().to_string(),
            message: w.error.to_string(),
        })
        .collect()
}
