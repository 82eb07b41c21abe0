// Masked-stem recount: strip known affix pairs, then count what is left.
//
// For every segment of the corpus:
// - if it has at least two signs and ends with one of the suffix pairs, the
//   first such pair (in configured order) is removed;
// - then, if what remains starts with one of the prefix pairs, the first such
//   pair is removed;
// - the remainder is a stem if it has at least `min_len` signs.
// Stems are counted together with the first file each was seen in, and the
// adjacent sign pairs inside stems are counted as stem bigrams.
//
// Segments come from the main segmentation, so the link-sign switch applies.

use crate::config::MinerConfig;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::types::{Segment, Sign};
use std::collections::BTreeMap;

/// Remove the first matching suffix pair, then the first matching prefix
/// pair, from `signs`.
pub fn strip_affixes<'a>(
    signs: &'a [Sign],
    suffixes: &[(Sign, Sign)],
    prefixes: &[(Sign, Sign)],
) -> &'a [Sign] {
    let has_pair = |pairs: &[(Sign, Sign)], a: &Sign, b: &Sign| {
        pairs.iter().any(|(x, y)| x == a && y == b)
    };
    let rest = match signs {
        [head @ .., a, b] if has_pair(suffixes, a, b) => head,
        _ => signs,
    };
    match rest {
        [a, b, tail @ ..] if has_pair(prefixes, a, b) => tail,
        _ => rest,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaskedStems {
    pub stems: BTreeMap<Segment, u64>,
    /// First file each stem was seen in.
    pub examples: BTreeMap<Segment, String>,
    pub bigrams: BTreeMap<(Sign, Sign), u64>,
}

impl MaskedStems {
    pub fn run(
        corpus: &Corpus,
        suffixes: &[(Sign, Sign)],
        prefixes: &[(Sign, Sign)],
        min_len: usize,
    ) -> Self {
        let mut masked = MaskedStems::default();
        for file in &corpus.files {
            for segment in file.segments() {
                let rest = strip_affixes(segment.signs(), suffixes, prefixes);
                if rest.len() < min_len {
                    continue;
                }
                let Some(stem) = Segment::new(rest.to_vec()) else {
                    continue;
                };
                for pair in rest.windows(2) {
                    *masked
                        .bigrams
                        .entry((pair[0].clone(), pair[1].clone()))
                        .or_insert(0) += 1;
                }
                masked
                    .examples
                    .entry(stem.clone())
                    .or_insert_with(|| file.name.clone());
                *masked.stems.entry(stem).or_insert(0) += 1;
            }
        }
        log::debug!(
            "masked stems: {} distinct, {} bigrams",
            masked.stems.len(),
            masked.bigrams.len()
        );
        masked
    }

    /// Run with the pairs and length threshold from `config.stem_mask`.
    pub fn from_config(corpus: &Corpus, config: &MinerConfig) -> Result<Self> {
        let suffixes = config.sign_pairs(&config.stem_mask.suffix_pairs)?;
        let prefixes = config.sign_pairs(&config.stem_mask.prefix_pairs)?;
        Ok(Self::run(corpus, &suffixes, &prefixes, config.stem_mask.min_len))
    }
}
