// Template coverage scorer and vowel-assignment search.
//
// A template is a short consonant/vowel pattern (`CV`, `CVC`, ...). Given a
// vowel assignment, each segment is parsed greedily left to right: at every
// cursor position the catalogue is tried in its listed order and the first
// template whose window matches the C/V classes exactly is taken; the cursor
// jumps past it. If nothing matches, the cursor advances by one and that sign
// stays uncovered.
//
// Catalogue order is the matching priority. The default catalogue lists the
// two-slot patterns and `CVC` before the single-slot fallbacks, so those win
// whenever they fit at the cursor; the scan is not globally length-sorted and
// reordering the catalogue changes results.
//
// The sweep scores the top-k ranked signs as vowels for each configured k
// over a bounded sample (the first `sample_size` corpus segments) and
// selects the k with the highest coverage ratio, ties going to the smaller k.

use crate::config::CoverageConfig;
use crate::error::MinerError;
use crate::types::{Segment, Sign};
use crate::vowel::{VowelAssignment, VowelRankingEntry};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One position of a template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Consonant,
    Vowel,
}

impl Slot {
    fn symbol(self) -> char {
        match self {
            Slot::Consonant => 'C',
            Slot::Vowel => 'V',
        }
    }
}

/// A fixed consonant/vowel pattern of length 1-3, written as e.g. `"CVC"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Template(Vec<Slot>);

impl Template {
    pub const MAX_LEN: usize = 3;

    /// Parse a pattern over `C`/`V` (case-insensitive).
    pub fn parse(pattern: &str) -> Result<Self, MinerError> {
        let slots: Option<Vec<Slot>> = pattern
            .chars()
            .map(|c| match c.to_ascii_uppercase() {
                'C' => Some(Slot::Consonant),
                'V' => Some(Slot::Vowel),
                _ => None,
            })
            .collect();
        match slots {
            Some(slots) if (1..=Self::MAX_LEN).contains(&slots.len()) => Ok(Template(slots)),
            _ => Err(MinerError::InvalidTemplate(pattern.to_string())),
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a parsed template.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `window` has exactly this template's C/V shape.
    pub fn matches(&self, window: &[Sign], vowels: &VowelAssignment) -> bool {
        window.len() == self.0.len()
            && window.iter().zip(&self.0).all(|(sign, slot)| {
                let is_vowel = vowels.is_vowel(sign);
                match slot {
                    Slot::Vowel => is_vowel,
                    Slot::Consonant => !is_vowel,
                }
            })
    }
}

impl TryFrom<String> for Template {
    type Error = MinerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Template::parse(&value)
    }
}

impl From<Template> for String {
    fn from(template: Template) -> Self {
        template.to_string()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in &self.0 {
            write!(f, "{}", slot.symbol())?;
        }
        Ok(())
    }
}

/// `CV, VC, CVC, V, C`, in matching-priority order.
pub fn default_catalogue() -> Vec<Template> {
    use Slot::{Consonant as C, Vowel as V};
    vec![
        Template(vec![C, V]),
        Template(vec![V, C]),
        Template(vec![C, V, C]),
        Template(vec![V]),
        Template(vec![C]),
    ]
}

/// The C/V shape of `signs` under `vowels`, e.g. `"CVC"`.
pub fn cv_pattern(signs: &[Sign], vowels: &VowelAssignment) -> String {
    signs
        .iter()
        .map(|sign| if vowels.is_vowel(sign) { 'V' } else { 'C' })
        .collect()
}

/// Covered-sign and chunk counts of one greedy parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParseTally {
    pub covered: usize,
    pub chunks: usize,
}

/// Greedy left-to-right parse of one segment.
pub fn parse_segment(
    signs: &[Sign],
    vowels: &VowelAssignment,
    catalogue: &[Template],
) -> ParseTally {
    let mut tally = ParseTally::default();
    let mut i = 0;
    while i < signs.len() {
        let matched = catalogue.iter().find(|t| {
            signs
                .get(i..i + t.len())
                .is_some_and(|window| t.matches(window, vowels))
        });
        match matched {
            Some(template) => {
                tally.covered += template.len();
                tally.chunks += 1;
                i += template.len();
            }
            None => i += 1,
        }
    }
    tally
}

/// A sample segment kept with its parse, for inspection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleParse {
    pub segment: Segment,
    pub covered: usize,
    pub chunks: usize,
}

/// Coverage of one vowel assignment over the sample.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoverageResult {
    /// Requested vowel-set size.
    pub k: usize,
    /// The vowels actually used, sorted; may be shorter than `k` after
    /// clamping.
    pub vowel_set: Vec<Sign>,
    pub covered: usize,
    pub chunks: usize,
    /// Sign tokens in the sample.
    pub total_tokens: usize,
    /// `covered / total_tokens`, 0 for an empty sample.
    pub coverage_ratio: f64,
    /// `covered / chunks`, 0 when nothing matched.
    pub avg_chunk_length: f64,
    pub samples: Vec<SampleParse>,
}

impl CoverageResult {
    /// The vowel set of this row as an assignment.
    pub fn vowels(&self) -> VowelAssignment {
        self.vowel_set.iter().cloned().collect()
    }
}

/// Parse every sample segment under `vowels` and total the results.
pub fn score_assignment(
    k: usize,
    vowels: &VowelAssignment,
    sample: &[&Segment],
    catalogue: &[Template],
    sample_parses: usize,
) -> CoverageResult {
    let mut covered = 0;
    let mut chunks = 0;
    let mut total_tokens = 0;
    let mut samples = Vec::new();

    for (idx, segment) in sample.iter().enumerate() {
        let tally = parse_segment(segment.signs(), vowels, catalogue);
        covered += tally.covered;
        chunks += tally.chunks;
        total_tokens += segment.len();
        if idx < sample_parses {
            samples.push(SampleParse {
                segment: (*segment).clone(),
                covered: tally.covered,
                chunks: tally.chunks,
            });
        }
    }

    CoverageResult {
        k,
        vowel_set: vowels.signs().cloned().collect(),
        covered,
        chunks,
        total_tokens,
        coverage_ratio: ratio(covered, total_tokens),
        avg_chunk_length: ratio(covered, chunks),
        samples,
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Per-k results of a sweep plus the selected best row.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CoverageSweep {
    pub results: Vec<CoverageResult>,
    pub best: Option<CoverageResult>,
}

/// Score the top-k ranked signs as vowels for every configured k.
pub fn sweep<'a>(
    segments: impl IntoIterator<Item = &'a Segment>,
    ranking: &[VowelRankingEntry],
    config: &CoverageConfig,
    candidate_pool: usize,
) -> CoverageSweep {
    let sample: Vec<&Segment> = segments.into_iter().take(config.sample_size).collect();

    let results: Vec<CoverageResult> = config
        .k_values
        .iter()
        .map(|&k| {
            let vowels = VowelAssignment::top_k(ranking, k, candidate_pool);
            let result = score_assignment(
                k,
                &vowels,
                &sample,
                &config.templates,
                config.sample_parses,
            );
            log::debug!(
                "k={k}: coverage {:.4} ({}/{} signs, {} chunks)",
                result.coverage_ratio,
                result.covered,
                result.total_tokens,
                result.chunks
            );
            result
        })
        .collect();

    let best = select_best(&results).cloned();
    CoverageSweep { results, best }
}

/// Highest coverage ratio; ties go to the smaller k.
fn select_best(results: &[CoverageResult]) -> Option<&CoverageResult> {
    results.iter().reduce(|best, candidate| {
        match candidate.coverage_ratio.total_cmp(&best.coverage_ratio) {
            std::cmp::Ordering::Greater => candidate,
            std::cmp::Ordering::Equal if candidate.k < best.k => candidate,
            _ => best,
        }
    })
}
