// sign_miner: segmentation and statistical pattern mining for transcribed
// sign sequences (Linear A style corpora).
//
// Raw transcription lines go in; frequency tables, a ranked list of
// vowel-like signs, and a best-fitting consonant/vowel assignment come out.
//
// Module overview:
// - `types.rs`:      `Sign`, `Token` (tagged classification), `Segment`.
// - `error.rs`:      `MinerError` for aborting failures, `FileError` and
//                    `CorpusWarning` for skipped corpus files.
// - `config.rs`:     `MinerConfig`, JSON-loadable, defaults for every knob.
// - `tokenizer.rs`:  Line cleaning, label detection, token classification,
//                    line normalization.
// - `segmenter.rs`:  Boundary-driven segmentation and trailing-number
//                    extraction.
// - `corpus.rs`:     Directory ingestion with per-file isolation; per-file
//                    statistics on the rayon pool; sign-run context search.
// - `stats.rs`:      `CorpusStats` aggregator (n-grams, edges, adjacency) with
//                    an associative `merge`.
// - `vowel.rs`:      Vowelishness scoring and ranking, `VowelAssignment`.
// - `coverage.rs`:   C/V template catalogue, greedy parse, k sweep, C/V
//                    shapes of segments.
// - `link_probe.rs`: Stem/ending miner around the link sign (AB22).
// - `stem_mask.rs`:  Affix-pair stripping and stem recount.
// - `tables.rs`:     Serializable output rows.
// - `pipeline.rs`:   `analyze_dir` / `analyze_corpus` running every stage.
//
// Determinism constraint: every map is ordered, files are processed in name
// order, and parallel work only ever produces partials that are merged in a
// fixed order. The same directory and config always give the same output.

pub mod config;
pub mod corpus;
pub mod coverage;
pub mod error;
pub mod link_probe;
pub mod pipeline;
pub mod segmenter;
pub mod stats;
pub mod stem_mask;
pub mod tables;
pub mod tokenizer;
pub mod types;
pub mod vowel;

pub use config::MinerConfig;
pub use corpus::{ContextLine, Corpus};
pub use coverage::{CoverageResult, CoverageSweep, Template};
pub use error::{CorpusWarning, FileError, MinerError, Result};
pub use pipeline::{Analysis, analyze_corpus, analyze_dir};
pub use stats::CorpusStats;
pub use stem_mask::MaskedStems;
pub use tokenizer::{LineRecord, Tokenizer};
pub use types::{Segment, Sign, Token, TokenKind};
pub use vowel::{VowelAssignment, VowelRankingEntry};
