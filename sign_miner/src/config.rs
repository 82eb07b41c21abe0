// Data-driven miner configuration.
//
// Every tunable of the pipeline lives in `MinerConfig`, loaded from JSON or
// taken from `Default`. The engine never hardcodes the sign grammar, the
// scoring constants, the template catalogue, or the coverage sample cap: it
// reads them from here. Defaults reproduce the literal constants of the
// published analysis, so `MinerConfig::default()` is the reference run.
//
// Every struct is `#[serde(default)]`, so a JSON file only needs to name the
// fields it overrides.
//
// The link-sign switch (`treat_ab22_as_boundary`) selects between the two
// readings of AB22 found in the transcriptions:
// - ordinary sign (default): AB22 is counted, paired and ranked like any
//   other sign, and segments run through it;
// - structural link: AB22 joins a stem to an ending, so it closes the current
//   segment exactly like an ideogram or number and is not stored.
// The link-sign probe (`link_probe.rs`) always reads the first way, since it
// needs AB22 inside its segments.

use crate::coverage::{Template, default_catalogue};
use crate::error::{MinerError, Result};
use crate::tokenizer::Tokenizer;
use crate::types::{Sign, Token};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sign grammar and label detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// The two fixed letters every sign starts with.
    pub sign_prefix: String,
    /// Two-letter site codes that mark a line as labelled (e.g. `HT 13:`).
    pub site_codes: Vec<String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            sign_prefix: "AB".into(),
            site_codes: vec!["HT".into(), "KH".into(), "ZA".into(), "PK".into()],
        }
    }
}

/// Constants of the vowelishness score and candidate selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VowelParams {
    /// Multiplier on `(neighbors + 1) / (frequency + 1)`.
    pub neighbor_scale: f64,
    /// Penalty per segment-initial or segment-final occurrence.
    pub edge_penalty: f64,
    /// Only this many top-ranked signs are eligible as vowels.
    pub candidate_pool: usize,
}

impl Default for VowelParams {
    fn default() -> Self {
        Self {
            neighbor_scale: 100.0,
            edge_penalty: 0.1,
            candidate_pool: 25,
        }
    }
}

/// The vowel-assignment search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Vowel-set sizes to try, in order.
    pub k_values: Vec<usize>,
    /// Only the first `sample_size` segments of the corpus are parsed. The
    /// cap keeps each sweep at a fixed, reproducible cost.
    pub sample_size: usize,
    /// Template catalogue in matching-priority order.
    pub templates: Vec<Template>,
    /// How many leading sample segments to keep with their parse tallies.
    pub sample_parses: usize,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            k_values: vec![3, 4, 5, 6, 7],
            sample_size: 200,
            templates: default_catalogue(),
            sample_parses: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkProbeConfig {
    /// Minimum number of signs before the link sign for a stem to count.
    pub min_stem_len: usize,
}

impl Default for LinkProbeConfig {
    fn default() -> Self {
        Self { min_stem_len: 1 }
    }
}

/// Affix masking before stem recounting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StemMaskConfig {
    /// Segment-final sign pairs to strip, e.g. `"AB22 AB67"`. The first
    /// matching pair in list order is removed.
    pub suffix_pairs: Vec<String>,
    /// Segment-initial sign pairs to strip after the suffix.
    pub prefix_pairs: Vec<String>,
    /// Stems shorter than this after stripping are not counted.
    pub min_len: usize,
}

impl Default for StemMaskConfig {
    fn default() -> Self {
        Self {
            suffix_pairs: Vec::new(),
            prefix_pairs: Vec::new(),
            min_len: 2,
        }
    }
}

/// Complete configuration for one mining run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    pub tokenizer: TokenizerConfig,
    /// Treat `link_sign` as a segment boundary instead of an ordinary sign.
    pub treat_ab22_as_boundary: bool,
    /// The sign playing the stem/ending linking role (AB22 in Linear A).
    pub link_sign: String,
    /// Strip a line-final number into `LineRecord::trailing_number` before
    /// segmentation.
    pub extract_trailing_number: bool,
    /// Only files with this extension are read from a corpus directory.
    pub file_extension: String,
    /// Read and aggregate files on the rayon pool.
    pub parallel: bool,
    pub vowel: VowelParams,
    pub coverage: CoverageConfig,
    pub link_probe: LinkProbeConfig,
    pub stem_mask: StemMaskConfig,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerConfig::default(),
            treat_ab22_as_boundary: false,
            link_sign: "AB22".into(),
            extract_trailing_number: true,
            file_extension: "txt".into(),
            parallel: true,
            vowel: VowelParams::default(),
            coverage: CoverageConfig::default(),
            link_probe: LinkProbeConfig::default(),
            stem_mask: StemMaskConfig::default(),
        }
    }
}

impl MinerConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|source| MinerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    /// The configured link sign, validated against the sign grammar.
    pub fn link_sign(&self) -> Result<Sign> {
        match Tokenizer::new(&self.tokenizer).classify(&self.link_sign) {
            Token::Sign(sign) => Ok(sign),
            _ => Err(MinerError::InvalidSign(self.link_sign.clone())),
        }
    }

    /// Parse pair strings such as `"AB22 AB67"` into sign pairs.
    pub fn sign_pairs(&self, pairs: &[String]) -> Result<Vec<(Sign, Sign)>> {
        let tokenizer = Tokenizer::new(&self.tokenizer);
        pairs
            .iter()
            .map(|pair| {
                let parts: Vec<&str> = pair.split_whitespace().collect();
                let [first, second] = parts[..] else {
                    return Err(MinerError::InvalidPair(pair.clone()));
                };
                match (tokenizer.classify(first), tokenizer.classify(second)) {
                    (Token::Sign(a), Token::Sign(b)) => Ok((a, b)),
                    (Token::Sign(_), _) => Err(MinerError::InvalidSign(second.to_string())),
                    _ => Err(MinerError::InvalidSign(first.to_string())),
                }
            })
            .collect()
    }
}
