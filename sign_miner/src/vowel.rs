// Vowel candidate scorer.
//
// Ranks every observed sign by a "vowelishness" heuristic:
//
//   score = (neighbors + 1) / (frequency + 1) * neighbor_scale
//           - edge_penalty * edge_hits
//
// where `neighbors` is the number of distinct signs it co-occurs with inside
// segments, and `edge_hits` counts segment-initial plus segment-final
// occurrences. A sign that glues together many different partners relative
// to its own frequency behaves like a vowel; signs that mostly sit at
// segment edges are discounted as likely consonantal or affixal.
//
// The ranking is sorted descending by the unrounded score. Ties keep the
// order in which signs were first observed in the corpus (stable sort over
// `CorpusStats::first_seen`).
//
// `VowelAssignment` is the top-k slice of a ranking, frozen for one scoring
// run. Every observed sign outside it is implicitly a consonant.

use crate::config::VowelParams;
use crate::stats::CorpusStats;
use crate::types::Sign;
use serde::Serialize;
use std::collections::BTreeSet;

/// One row of the vowel ranking table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VowelRankingEntry {
    pub sign: Sign,
    pub frequency: u64,
    pub neighbor_count: usize,
    pub edge_hits: u64,
    pub score: f64,
}

pub fn vowelish_score(
    frequency: u64,
    neighbor_count: usize,
    edge_hits: u64,
    params: &VowelParams,
) -> f64 {
    (neighbor_count as f64 + 1.0) / (frequency as f64 + 1.0) * params.neighbor_scale
        - params.edge_penalty * edge_hits as f64
}

/// Rank all observed signs, most vowel-like first.
pub fn rank_vowel_candidates(stats: &CorpusStats, params: &VowelParams) -> Vec<VowelRankingEntry> {
    let mut ranking: Vec<VowelRankingEntry> = stats
        .first_seen()
        .iter()
        .map(|sign| {
            let frequency = stats.frequency(sign);
            let neighbor_count = stats.neighbor_count(sign);
            let edge_hits = stats.edge_hits(sign);
            VowelRankingEntry {
                sign: sign.clone(),
                frequency,
                neighbor_count,
                edge_hits,
                score: vowelish_score(frequency, neighbor_count, edge_hits, params),
            }
        })
        .collect();
    // Stable: equal scores keep first-observation order.
    ranking.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranking
}

/// A hypothesized set of vowel signs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VowelAssignment(BTreeSet<Sign>);

impl VowelAssignment {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The top `k` signs of `ranking`, clamped to the candidate pool and to
    /// the number of ranked signs.
    pub fn top_k(ranking: &[VowelRankingEntry], k: usize, candidate_pool: usize) -> Self {
        let take = k.min(candidate_pool).min(ranking.len());
        ranking[..take].iter().map(|e| e.sign.clone()).collect()
    }

    pub fn is_vowel(&self, sign: &Sign) -> bool {
        self.0.contains(sign)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Vowel signs in sorted order.
    pub fn signs(&self) -> impl Iterator<Item = &Sign> {
        self.0.iter()
    }
}

impl FromIterator<Sign> for VowelAssignment {
    fn from_iter<I: IntoIterator<Item = Sign>>(iter: I) -> Self {
        VowelAssignment(iter.into_iter().collect())
    }
}
