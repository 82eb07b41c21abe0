// Error types for the miner.
//
// Two tiers: `MinerError` aborts a call (unreadable corpus directory, bad
// configuration), while `FileError` describes a single corpus file that
// could not be ingested. File errors are wrapped in `CorpusWarning` and
// collected alongside the results instead of being propagated; see
// `corpus.rs`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MinerError>;

#[derive(Debug, Error)]
pub enum MinerError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid template {0:?}: expected 1-3 slots of C/V")]
    InvalidTemplate(String),
    #[error("{0:?} is not a sign under the configured grammar")]
    InvalidSign(String),
    #[error("invalid sign pair {0:?}: expected two signs")]
    InvalidPair(String),
    #[error("a segment needs at least one sign")]
    EmptySegment,
}

/// Why a single corpus file was skipped.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("read failed: {0}")]
    Read(#[from] io::Error),
    #[error("not valid UTF-8 (valid up to byte {valid_up_to})")]
    NotUtf8 { valid_up_to: usize },
}

/// A skipped corpus file, surfaced in the final warnings list.
#[derive(Debug, Error)]
#[error("skipped {}: {error}", .file.display())]
pub struct CorpusWarning {
    pub file: PathBuf,
    #[source]
    pub error: FileError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_display_names_file() {
        let warning = CorpusWarning {
            file: PathBuf::from("HT13.txt"),
            error: FileError::NotUtf8 { valid_up_to: 7 },
        };
        assert_eq!(
            warning.to_string(),
            "skipped HT13.txt: not valid UTF-8 (valid up to byte 7)"
        );
    }

    #[test]
    fn config_error_wraps_serde() {
        let err: MinerError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
