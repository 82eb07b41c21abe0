// Corpus ingestion: a directory of transcription files in, parsed lines and
// per-file warnings out.
//
// Files are the unit of isolation. Every file matching the configured
// extension is read, decoded as UTF-8, tokenized and segmented on its own;
// a file that fails to read or decode is dropped from the corpus and
// recorded as a `CorpusWarning`. The run itself only fails when the
// directory cannot be listed.
//
// Determinism constraint: files are sorted by name before any work starts,
// and rayon's `par_iter().collect()` preserves input order, so the parallel
// and serial paths produce the same `Corpus`. Statistics are computed per
// file into independent partials and merged in file order afterwards; no
// counter is shared between workers.

use crate::config::MinerConfig;
use crate::error::{CorpusWarning, FileError, MinerError, Result};
use crate::segmenter::{Segmenter, extract_trailing_number};
use crate::stats::CorpusStats;
use crate::tokenizer::{LineRecord, Tokenizer};
use crate::types::{Segment, Sign, Token};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Tokenizer + segmenter + trailing-number switch, built once per run.
#[derive(Clone, Debug, Default)]
pub struct LineParser {
    tokenizer: Tokenizer,
    segmenter: Segmenter,
    extract_trailing_number: bool,
}

impl LineParser {
    pub fn from_config(config: &MinerConfig) -> Result<Self> {
        Ok(Self {
            tokenizer: Tokenizer::new(&config.tokenizer),
            segmenter: Segmenter::from_config(config)?,
            extract_trailing_number: config.extract_trailing_number,
        })
    }

    pub fn parse(&self, line: &str) -> ParsedLine {
        let mut record = self.tokenizer.tokenize_line(line);
        if self.extract_trailing_number {
            extract_trailing_number(&mut record);
        }
        let segments = self.segmenter.segment_line(&record);
        ParsedLine { record, segments }
    }
}

/// One line after tokenization and segmentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedLine {
    pub record: LineRecord,
    pub segments: Vec<Segment>,
}

/// One transcription file (one artifact).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    /// File name, without directory.
    pub name: String,
    pub lines: Vec<ParsedLine>,
}

impl FileRecord {
    pub fn parse(name: impl Into<String>, text: &str, parser: &LineParser) -> Self {
        Self {
            name: name.into(),
            lines: text.lines().map(|line| parser.parse(line)).collect(),
        }
    }

    /// Segments of this file in line order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.lines.iter().flat_map(|line| line.segments.iter())
    }

    /// Partial statistics for this file alone.
    pub fn stats(&self) -> CorpusStats {
        let mut stats = CorpusStats::new();
        for line in &self.lines {
            stats.add_line(&line.record, &line.segments);
        }
        stats
    }

    /// The file re-rendered line by line in cleaned form. Blank lines stay
    /// blank so line numbering is preserved.
    pub fn normalized_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.record.render_normalized())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A line matched by `Corpus::contexts`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContextLine {
    pub file: String,
    /// 1-based line number within the file.
    pub line: usize,
    /// The line in cleaned form.
    pub text: String,
}

/// The parsed corpus plus the files that had to be skipped.
#[derive(Debug, Default)]
pub struct Corpus {
    /// Successfully parsed files, sorted by name.
    pub files: Vec<FileRecord>,
    pub warnings: Vec<CorpusWarning>,
}

impl Corpus {
    /// Load every `*.{file_extension}` file directly under `dir`.
    pub fn load_dir(dir: &Path, config: &MinerConfig) -> Result<Self> {
        let parser = LineParser::from_config(config)?;
        let paths = list_files(dir, &config.file_extension)?;

        type Loaded = (PathBuf, std::result::Result<FileRecord, FileError>);
        let results: Vec<Loaded> = if config.parallel {
            paths
                .into_par_iter()
                .map(|path| {
                    let result = load_file(&path, &parser);
                    (path, result)
                })
                .collect()
        } else {
            paths
                .into_iter()
                .map(|path| {
                    let result = load_file(&path, &parser);
                    (path, result)
                })
                .collect()
        };

        let mut corpus = Corpus::default();
        for (path, result) in results {
            match result {
                Ok(file) => {
                    log::debug!(
                        "{}: {} lines, {} segments",
                        file.name,
                        file.lines.len(),
                        file.segments().count()
                    );
                    corpus.files.push(file);
                }
                Err(error) => {
                    let warning = CorpusWarning { file: path, error };
                    log::warn!("{warning}");
                    corpus.warnings.push(warning);
                }
            }
        }
        Ok(corpus)
    }

    /// Build a corpus from in-memory `(name, text)` pairs. Files are sorted
    /// by name, as on disk.
    pub fn from_texts<N, T>(
        texts: impl IntoIterator<Item = (N, T)>,
        config: &MinerConfig,
    ) -> Result<Self>
    where
        N: Into<String>,
        T: AsRef<str>,
    {
        let parser = LineParser::from_config(config)?;
        let mut files: Vec<FileRecord> = texts
            .into_iter()
            .map(|(name, text)| FileRecord::parse(name, text.as_ref(), &parser))
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self {
            files,
            warnings: Vec::new(),
        })
    }

    /// Every segment of the corpus: files by name, lines in order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.files.iter().flat_map(FileRecord::segments)
    }

    pub fn file(&self, name: &str) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Aggregate statistics. Partials are built per file (on the rayon pool
    /// when `parallel`) and merged in file order.
    pub fn stats(&self, parallel: bool) -> CorpusStats {
        let partials: Vec<CorpusStats> = if parallel {
            self.files.par_iter().map(FileRecord::stats).collect()
        } else {
            self.files.iter().map(FileRecord::stats).collect()
        };
        let mut stats = CorpusStats::new();
        for partial in partials {
            stats.merge(partial);
        }
        stats
    }

    /// Cleaned rendering of the named file.
    pub fn normalized_text(&self, name: &str) -> Option<String> {
        self.file(name).map(FileRecord::normalized_text)
    }

    /// Every line whose tokens contain `query` as a contiguous run of signs,
    /// files by name, lines in order. An empty query matches nothing.
    pub fn contexts(&self, query: &[Sign]) -> Vec<ContextLine> {
        if query.is_empty() {
            return Vec::new();
        }
        let mut found = Vec::new();
        for file in &self.files {
            for (index, line) in file.lines.iter().enumerate() {
                if contains_run(&line.record.tail, query) {
                    found.push(ContextLine {
                        file: file.name.clone(),
                        line: index + 1,
                        text: line.record.render_normalized(),
                    });
                }
            }
        }
        log::debug!("{} lines contain {query:?}", found.len());
        found
    }
}

fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let io_err = |source: std::io::Error| MinerError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

fn contains_run(tokens: &[Token], query: &[Sign]) -> bool {
    tokens.windows(query.len()).any(|window| {
        window
            .iter()
            .zip(query)
            .all(|(token, wanted)| matches!(token, Token::Sign(sign) if sign == wanted))
    })
}

fn load_file(path: &Path, parser: &LineParser) -> std::result::Result<FileRecord, FileError> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|e| FileError::NotUtf8 {
        valid_up_to: e.utf8_error().valid_up_to(),
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(FileRecord::parse(name, &text, parser))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[(&str, &str)]) -> Corpus {
        Corpus::from_texts(texts.iter().copied(), &MinerConfig::default()).unwrap()
    }

    #[test]
    fn parser_extracts_trailing_number_by_default() {
        let parser = LineParser::from_config(&MinerConfig::default()).unwrap();
        let line = parser.parse("Line 4: AB81 AB02 AB22 AB67 12");
        assert_eq!(line.record.trailing_number, Some(12));
        assert_eq!(line.segments.len(), 1);
        assert_eq!(line.segments[0].len(), 4);
    }

    #[test]
    fn parser_can_leave_trailing_number_in_tail() {
        let config = MinerConfig {
            extract_trailing_number: false,
            ..Default::default()
        };
        let parser = LineParser::from_config(&config).unwrap();
        let line = parser.parse("AB01 AB02 12");
        assert_eq!(line.record.trailing_number, None);
        assert_eq!(line.record.tail.len(), 3);
        assert_eq!(line.segments.len(), 1);
    }

    #[test]
    fn files_are_sorted_by_name() {
        let c = corpus(&[("b.txt", "AB02"), ("a.txt", "AB01")]);
        let names: Vec<&str> = c.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        let first: Vec<&Sign> = c.segments().map(|s| s.first()).collect();
        assert_eq!(first, vec![&Sign::new("AB01"), &Sign::new("AB02")]);
    }

    #[test]
    fn segments_do_not_cross_lines() {
        let c = corpus(&[("a.txt", "AB01 AB02\nAB03")]);
        assert_eq!(c.segments().count(), 2);
    }

    #[test]
    fn parallel_and_serial_stats_agree() {
        let c = corpus(&[
            ("a.txt", "AB01 AB02 AB03 *201VAS 4\nAB03 AB02"),
            ("b.txt", "HT 1: AB07 AB02 AB09 12\n.3\nAB01 AB07"),
            ("c.txt", "*305GRA *201VAS"),
        ]);
        let parallel = c.stats(true);
        let serial = c.stats(false);
        assert_eq!(parallel, serial);
        assert_eq!(parallel.first_seen(), serial.first_seen());
        assert_eq!(parallel.numbers.get(&12), Some(&1));
        assert_eq!(parallel.ideograms.get("*201VAS"), Some(&2));
    }

    #[test]
    fn normalized_text_keeps_line_structure() {
        let c = corpus(&[("a.txt", "Line 1: AB01, ?? AB02 [5]\n\n.3\n*201vas ab07")]);
        assert_eq!(
            c.normalized_text("a.txt").unwrap(),
            "Line 1: AB01 AB02 5\n\n.3\n*201VAS AB07"
        );
        assert_eq!(c.normalized_text("missing.txt"), None);
    }

    #[test]
    fn empty_corpus_has_empty_stats() {
        let c = corpus(&[]);
        assert!(c.stats(true).is_empty());
        assert_eq!(c.segments().count(), 0);
    }

    #[test]
    fn contexts_find_contiguous_sign_runs() {
        let c = corpus(&[
            ("b.txt", "AB81 AB02 *201VAS AB22"),
            ("a.txt", "Line 1: ab81 ab02 AB22 12
AB81, AB03 AB02
AB02 AB81"),
        ]);
        let query = [Sign::new("AB81"), Sign::new("AB02")];
        let found = c.contexts(&query);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].file, "a.txt");
        assert_eq!(found[0].line, 1);
        assert_eq!(found[0].text, "Line 1: AB81 AB02 AB22 12");
        assert_eq!(found[1].file, "b.txt");
        assert_eq!(found[1].line, 1);
    }

    #[test]
    fn contexts_do_not_skip_over_other_tokens() {
        let c = corpus(&[("a.txt", "AB81 *201VAS AB02
AB81 7 AB02")]);
        assert!(c.contexts(&[Sign::new("AB81"), Sign::new("AB02")]).is_empty());
        assert_eq!(c.contexts(&[Sign::new("AB02")]).len(), 2);
        assert!(c.contexts(&[]).is_empty());
    }
}
