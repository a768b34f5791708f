//! Per-file progress events for batch stages.
//!
//! The engine reports raw facts only (which stage started, which file finished and how).
//! Counting and rendering are left to the consumer.

/// How one candidate file left a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Computed,
    Cached,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    StageStart { stage: &'static str, files: usize },
    FileFinished { file: String, outcome: FileOutcome },
    StageFinish { stage: &'static str },
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional callback. Workers share it by reference.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    /// A reporter that drops every event.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub fn report(&self, event: Progress) {
        if let Some(callback) = &self.callback {
            callback(event);
        }
    }

    /// Reports a finished file. The name is only copied when someone is listening.
    pub fn file_finished(&self, file: &str, outcome: FileOutcome) {
        if let Some(callback) = &self.callback {
            callback(Progress::FileFinished {
                file: file.to_string(),
                outcome,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn silent_reporter_accepts_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::StageStart {
            stage: "Shape extraction",
            files: 2,
        });
        reporter.file_finished("a.tsv", FileOutcome::Cached);
    }

    #[test]
    fn events_reach_the_callback_in_order() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p: Progress| {
            events.lock().unwrap().push(p);
        }));

        reporter.report(Progress::StageStart {
            stage: "Shape extraction",
            files: 1,
        });
        reporter.file_finished("a.tsv", FileOutcome::Computed);
        reporter.report(Progress::StageFinish {
            stage: "Shape extraction",
        });
        drop(reporter);

        assert_eq!(
            events.into_inner().unwrap(),
            vec![
                Progress::StageStart {
                    stage: "Shape extraction",
                    files: 1
                },
                Progress::FileFinished {
                    file: "a.tsv".to_string(),
                    outcome: FileOutcome::Computed
                },
                Progress::StageFinish {
                    stage: "Shape extraction"
                },
            ]
        );
    }
}
