//! Parallel parsing of several documents.

use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use texskel_core::{ParsedDocument, StructureError, Vocabulary, parse_file};

/// Options for batch processing.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Maximum number of threads to use. Defaults to number of CPU cores.
    pub max_threads: Option<usize>,
    /// Whether to report documents after the first failure.
    pub continue_on_error: bool,
}

/// Result for a single document in a batch.
#[derive(Debug)]
pub struct BatchResult {
    /// Path as given on the command line.
    pub path: PathBuf,
    /// Parsed document or the error that stopped it.
    pub outcome: Result<ParsedDocument, StructureError>,
}

/// Statistics for batch processing.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStats {
    /// Total number of documents processed.
    pub total: u32,
    /// Number of documents parsed successfully.
    pub succeeded: u32,
    /// Number of failed documents.
    pub failed: u32,
    /// Wall-clock processing time.
    pub elapsed: Duration,
}

/// Results in argument order plus statistics.
#[derive(Debug)]
pub struct BatchProcessingResult {
    /// Individual results, in the order the paths were given.
    pub results: Vec<BatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

/// Parses every path in parallel, each with its own builder.
///
/// Without `continue_on_error`, results after the first failing document (in
/// argument order) are dropped so the report stops where a sequential run
/// would have stopped.
pub fn parse_all(
    paths: &[PathBuf],
    vocabulary: &Vocabulary,
    options: &BatchOptions,
) -> BatchProcessingResult {
    let start = Instant::now();

    let pool = options.max_threads.and_then(|max_threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads)
            .build()
            .map_err(|err| log::warn!("Falling back to the global thread pool: {}", err))
            .ok()
    });

    let total = paths.len() as u32;
    let succeeded = AtomicU32::new(0);
    let failed = AtomicU32::new(0);

    let process_path = |path: &PathBuf| -> BatchResult {
        let outcome = parse_file(path, vocabulary);
        match &outcome {
            Ok(_) => succeeded.fetch_add(1, Ordering::Relaxed),
            Err(_) => failed.fetch_add(1, Ordering::Relaxed),
        };
        BatchResult {
            path: path.clone(),
            outcome,
        }
    };

    let mut results: Vec<BatchResult> = if let Some(pool) = pool {
        pool.install(|| paths.par_iter().map(process_path).collect())
    } else {
        paths.par_iter().map(process_path).collect()
    };

    if !options.continue_on_error
        && let Some(first_error) = results.iter().position(|result| result.outcome.is_err())
    {
        let dropped = results.len() - first_error - 1;
        if dropped > 0 {
            log::info!(
                "Stopping after {}: {} more document(s) not reported",
                results[first_error].path.display(),
                dropped
            );
        }
        results.truncate(first_error + 1);
    }

    let stats = BatchStats {
        total,
        succeeded: succeeded.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
        elapsed: start.elapsed(),
    };
    log::debug!(
        "Parsed {} document(s): {} ok, {} failed in {:.1} ms",
        stats.total,
        stats.succeeded,
        stats.failed,
        stats.elapsed.as_secs_f64() * 1000.0
    );

    BatchProcessingResult { results, stats }
}
