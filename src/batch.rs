//! Parallel batch analysis
//!
//! Words are independent, so a batch is mapped over a rayon thread pool with
//! one task per word. Every task ends in a [`WordReport`]: a failed word
//! carries its error instead of aborting the batch. Reports come back in
//! input order regardless of completion order.

use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use crate::analyzer::{AnalysisError, analyze};
use crate::config::{BatchConfig, Limits};
use crate::corpus::CompoundEntry;

/// Error setting up a batch run
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Outcome of analyzing one word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordReport {
    pub index: usize,
    pub annotated: String,
    pub result: Result<Vec<String>, AnalysisError>,
}

impl WordReport {
    /// Analyze one entry, turning failure into a report
    pub fn analyze(entry: CompoundEntry, limits: &Limits) -> Self {
        let result = analyze(&entry.annotated, limits);
        if let Err(e) = &result {
            warn!(index = entry.index, word = %entry.annotated, error = %e, "analysis failed");
        }
        Self {
            index: entry.index,
            annotated: entry.annotated,
            result,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Trees of a successful analysis, empty for a failure
    pub fn trees(&self) -> &[String] {
        self.result.as_deref().unwrap_or(&[])
    }
}

/// Summary counts over a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub words: usize,
    pub failed: usize,
    pub trees: usize,
}

impl BatchSummary {
    pub fn from_reports(reports: &[WordReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            summary.words += 1;
            summary.trees += report.trees().len();
            if !report.is_ok() {
                summary.failed += 1;
            }
            summary
        })
    }
}

/// Analyze a batch of entries in parallel
///
/// `batch.workers == 0` uses one thread per core; a single worker runs on
/// the calling thread without a pool.
pub fn analyze_batch(
    entries: Vec<CompoundEntry>,
    limits: &Limits,
    batch: &BatchConfig,
) -> Result<Vec<WordReport>, BatchError> {
    let reports: Vec<WordReport> = if batch.workers == 1 {
        analyze_sequential(entries, limits)
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(batch.workers)
            .build()?;
        pool.install(|| {
            entries
                .into_par_iter()
                .map(|entry| WordReport::analyze(entry, limits))
                .collect()
        })
    };

    let summary = BatchSummary::from_reports(&reports);
    info!(
        words = summary.words,
        failed = summary.failed,
        trees = summary.trees,
        "batch analyzed"
    );
    Ok(reports)
}

/// Analyze entries one after another on the calling thread
fn analyze_sequential(
    entries: impl IntoIterator<Item = CompoundEntry>,
    limits: &Limits,
) -> Vec<WordReport> {
    entries
        .into_iter()
        .map(|entry| WordReport::analyze(entry, limits))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorError;

    fn entries() -> Vec<CompoundEntry> {
        vec![
            CompoundEntry::new(1, "Haus#Tür"),
            CompoundEntry::new(2, "#"),
            CompoundEntry::new(3, "Haus#Tür#Schloss"),
            CompoundEntry::new(4, "Haus$"),
            CompoundEntry::new(5, "Wort"),
        ]
    }

    #[test]
    fn test_failures_do_not_abort_batch() {
        let batch = BatchConfig {
            workers: 2,
            ..BatchConfig::default()
        };
        let reports = analyze_batch(entries(), &Limits::default(), &batch).unwrap();

        assert_eq!(reports.len(), 5);
        assert_eq!(reports[0].trees().len(), 1);
        assert_eq!(
            reports[1].result,
            Err(AnalysisError::Generator(GeneratorError::EmptyGroup {
                position: 0
            }))
        );
        assert_eq!(reports[2].trees().len(), 2);
        assert!(!reports[3].is_ok());
        assert!(reports[3].trees().is_empty());
        assert_eq!(reports[4].trees(), ["(noun (nbase Wort))"]);
    }

    #[test]
    fn test_reports_keep_input_order() {
        let many: Vec<_> = (1..=200)
            .map(|i| CompoundEntry::new(i, "Haus#Tür#Schloss#Tor"))
            .collect();
        let reports =
            analyze_batch(many, &Limits::default(), &BatchConfig::default()).unwrap();

        let indices: Vec<_> = reports.iter().map(|r| r.index).collect();
        assert_eq!(indices, (1..=200).collect::<Vec<_>>());
        assert!(reports.iter().all(|r| r.trees().len() == 5));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let limits = Limits::default();
        let parallel = analyze_batch(entries(), &limits, &BatchConfig::default()).unwrap();
        let sequential = analyze_sequential(entries(), &limits);
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_single_worker_runs_inline() {
        let limits = Limits::default();
        let batch = BatchConfig {
            workers: 1,
            ..BatchConfig::default()
        };
        let inline = analyze_batch(entries(), &limits, &batch).unwrap();
        let pooled = analyze_batch(entries(), &limits, &BatchConfig::default()).unwrap();
        assert_eq!(inline, pooled);
        assert_eq!(inline.len(), 5);
    }

    #[test]
    fn test_summary() {
        let reports = analyze_sequential(entries(), &Limits::default());
        assert_eq!(
            BatchSummary::from_reports(&reports),
            BatchSummary {
                words: 5,
                failed: 2,
                trees: 4,
            }
        );
    }
}
