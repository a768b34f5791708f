use super::cache::OutputCache;
use super::config::EngineConfig;
use super::error::EngineError;
use super::progress::{FileOutcome, Progress, ProgressReporter};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// Tally of one stage run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub computed: usize,
    pub cached: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.computed + self.cached
    }
}

/// Maps a per-file task over a directory listing on a bounded worker pool.
pub struct BatchScheduler<'a> {
    pool: rayon::ThreadPool,
    cache: OutputCache,
    reporter: &'a ProgressReporter<'a>,
}

impl<'a> BatchScheduler<'a> {
    pub fn new(
        config: &EngineConfig,
        reporter: &'a ProgressReporter<'a>,
    ) -> Result<Self, EngineError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("mirsight-worker-{i}"))
            .build()
            .map_err(|e| EngineError::WorkerPool(e.to_string()))?;

        Ok(Self {
            pool,
            cache: OutputCache::new(config.use_caching),
            reporter,
        })
    }

    /// Runs `task(file_name, output_path)` for every file whose output is not cached.
    ///
    /// Every file is attempted even after a failure. The stage fails afterwards with the
    /// number of failed files and the first failure in listing order.
    pub fn run<F>(
        &self,
        stage: &'static str,
        files: &[String],
        output_dir: &Path,
        task: F,
    ) -> Result<BatchReport, EngineError>
    where
        F: Fn(&str, &Path) -> Result<(), EngineError> + Sync,
    {
        self.reporter.report(Progress::StageStart {
            stage,
            files: files.len(),
        });

        let results: Vec<Result<FileOutcome, EngineError>> = self.pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    let output = output_dir.join(file);
                    let outcome = if self.cache.is_cached(&output) {
                        Ok(FileOutcome::Cached)
                    } else {
                        task(file, &output).map(|()| FileOutcome::Computed)
                    };

                    let reported = outcome.as_ref().map_or(FileOutcome::Failed, |o| *o);
                    self.reporter.file_finished(file, reported);

                    outcome.map_err(|source| EngineError::Task {
                        file: file.clone(),
                        source: Box::new(source),
                    })
                })
                .collect()
        });

        let mut report = BatchReport::default();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(FileOutcome::Computed) => report.computed += 1,
                Ok(FileOutcome::Cached) => report.cached += 1,
                Ok(FileOutcome::Failed) => {}
                Err(e) => {
                    error!(stage, error = %e, "File failed.");
                    failures.push(e);
                }
            }
        }

        self.reporter.report(Progress::StageFinish { stage });

        if !failures.is_empty() {
            let count = failures.len();
            return Err(EngineError::Stage {
                stage,
                count,
                first: Box::new(failures.swap_remove(0)),
            });
        }

        info!(
            stage,
            computed = report.computed,
            cached = report.cached,
            "Stage finished."
        );
        Ok(report)
    }
}

/// Regular files directly under `dir`, by name, sorted.
pub fn list_files(dir: &Path) -> Result<Vec<String>, EngineError> {
    let dir_error = |source| EngineError::Directory {
        path: dir.to_string_lossy().to_string(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(dir_error)? {
        let entry = entry.map_err(dir_error)?;
        if !entry.file_type().map_err(dir_error)?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => warn!(file = ?name, "Skipping file with a non UTF-8 name."),
        }
    }
    names.sort();
    Ok(names)
}

/// Creates `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<(), EngineError> {
    fs::create_dir_all(dir).map_err(|source| EngineError::Directory {
        path: dir.to_string_lossy().to_string(),
        source,
    })
}
