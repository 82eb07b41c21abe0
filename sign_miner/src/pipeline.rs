// End-to-end run: corpus directory in, ranked vowel assignment out.
//
// Stages, each a pure function of the previous one's output:
//   Corpus::load_dir -> Corpus::stats -> rank_vowel_candidates -> sweep
// plus the link-sign probe and the masked-stem recount over the same corpus.
// Nothing here holds global state; two runs over the same directory and
// config give identical results.

use crate::config::MinerConfig;
use crate::corpus::Corpus;
use crate::coverage::{CoverageResult, CoverageSweep, sweep};
use crate::error::{CorpusWarning, Result};
use crate::link_probe::LinkProbe;
use crate::stats::CorpusStats;
use crate::stem_mask::MaskedStems;
use crate::tables::{SegmentPatternRow, segment_pattern_table};
use crate::vowel::{VowelRankingEntry, rank_vowel_candidates};
use std::path::Path;

/// Everything one run produces.
#[derive(Debug)]
pub struct Analysis {
    pub corpus: Corpus,
    pub stats: CorpusStats,
    pub ranking: Vec<VowelRankingEntry>,
    pub sweep: CoverageSweep,
    pub link_probe: LinkProbe,
    pub masked_stems: MaskedStems,
}

impl Analysis {
    /// Files skipped during ingestion.
    pub fn warnings(&self) -> &[CorpusWarning] {
        &self.corpus.warnings
    }

    /// The best-assignment record, `None` only when no k was configured.
    pub fn best(&self) -> Option<&CoverageResult> {
        self.sweep.best.as_ref()
    }

    /// Every corpus segment shaped under the best vowel set.
    pub fn segment_patterns(&self) -> Vec<SegmentPatternRow> {
        let vowels = self.best().map(CoverageResult::vowels).unwrap_or_default();
        segment_pattern_table(self.corpus.segments(), &vowels)
    }
}

/// Load `dir` and run the full analysis.
pub fn analyze_dir(dir: &Path, config: &MinerConfig) -> Result<Analysis> {
    let corpus = Corpus::load_dir(dir, config)?;
    analyze_corpus(corpus, config)
}

/// Run the analysis over an already-loaded corpus.
pub fn analyze_corpus(corpus: Corpus, config: &MinerConfig) -> Result<Analysis> {
    let link = config.link_sign()?;
    let stats = corpus.stats(config.parallel);
    let ranking = rank_vowel_candidates(&stats, &config.vowel);
    let sweep = sweep(
        corpus.segments(),
        &ranking,
        &config.coverage,
        config.vowel.candidate_pool,
    );
    let link_probe = LinkProbe::run(&corpus, &link, &config.link_probe);
    let masked_stems = MaskedStems::from_config(&corpus, config)?;

    match &sweep.best {
        Some(best) => log::info!(
            "{} files ({} skipped), {} segments, {} distinct signs; best k={} coverage {:.4}",
            corpus.files.len(),
            corpus.warnings.len(),
            stats.segment_count,
            stats.unigrams.len(),
            best.k,
            best.coverage_ratio
        ),
        None => log::info!(
            "{} files ({} skipped), {} segments; no k values configured",
            corpus.files.len(),
            corpus.warnings.len(),
            stats.segment_count
        ),
    }

    Ok(Analysis {
        corpus,
        stats,
        ranking,
        sweep,
        link_probe,
        masked_stems,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sign;

    fn corpus(texts: &[(&str, &str)], config: &MinerConfig) -> Corpus {
        Corpus::from_texts(texts.iter().copied(), config).unwrap()
    }

    #[test]
    fn runs_all_stages() {
        let config = MinerConfig::default();
        let analysis = analyze_corpus(
            corpus(
                &[
                    ("HT1.txt", "Line 1: AB81 AB02 AB22 AB67 12\nLine 2: AB01 AB02 *201VAS 3"),
                    ("HT2.txt", ".3\nAB08 AB59 AB22 AB67 5"),
                ],
                &config,
            ),
            &config,
        )
        .unwrap();
        assert_eq!(analysis.stats.segment_count, 3);
        assert_eq!(analysis.ranking.len(), analysis.stats.unigrams.len());
        assert_eq!(analysis.sweep.results.len(), 5);
        assert!(analysis.best().is_some());
        assert_eq!(analysis.link_probe.endings.get(&Sign::new("AB67")), Some(&2));
        assert!(analysis.warnings().is_empty());
        // No affix pairs configured: every segment of two or more signs.
        assert_eq!(analysis.masked_stems.stems.len(), 3);
    }

    #[test]
    fn segment_patterns_use_best_vowels() {
        let config = MinerConfig::default();
        let analysis = analyze_corpus(
            corpus(&[("a.txt", "AB01 AB02 AB03
AB02 AB04 *201VAS AB05")], &config),
            &config,
        )
        .unwrap();
        let best = analysis.best().unwrap().vowels();
        let rows = analysis.segment_patterns();
        assert_eq!(rows.len(), 3);
        for (row, segment) in rows.iter().zip(analysis.corpus.segments()) {
            assert_eq!(row.segment, segment.to_string());
            assert_eq!(row.pattern, crate::coverage::cv_pattern(segment.signs(), &best));
        }
    }

    #[test]
    fn masked_stems_follow_config() {
        let mut config = MinerConfig::default();
        config.stem_mask.suffix_pairs = vec!["AB22 AB67".into()];
        let analysis = analyze_corpus(
            corpus(&[("a.txt", "AB81 AB02 AB22 AB67
AB08 AB59 AB22 AB67")], &config),
            &config,
        )
        .unwrap();
        let stems: Vec<String> =
            analysis.masked_stems.stems.keys().map(|s| s.to_string()).collect();
        assert_eq!(stems, vec!["AB08 AB59", "AB81 AB02"]);

        config.stem_mask.suffix_pairs = vec!["AB22".into()];
        assert!(analyze_corpus(Corpus::default(), &config).is_err());
    }

    #[test]
    fn empty_corpus_is_not_an_error() {
        let config = MinerConfig::default();
        let analysis = analyze_corpus(Corpus::default(), &config).unwrap();
        assert!(analysis.stats.is_empty());
        assert!(analysis.ranking.is_empty());
        assert!(analysis.sweep.results.iter().all(|r| r.coverage_ratio == 0.0));
    }

    #[test]
    fn bad_link_sign_is_rejected() {
        let config = MinerConfig {
            link_sign: "XY22".into(),
            ..Default::default()
        };
        assert!(analyze_corpus(Corpus::default(), &config).is_err());
    }

    #[test]
    fn no_k_values_means_no_best() {
        let mut config = MinerConfig::default();
        config.coverage.k_values.clear();
        let analysis = analyze_corpus(corpus(&[("a.txt", "AB01 AB02")], &config), &config).unwrap();
        assert!(analysis.best().is_none());
    }
}
