use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use mirsight::engine::progress::{FileOutcome, Progress, ProgressCallback};
use tokio::sync::{mpsc, watch};
use tracing::warn;

const EVENT_BUFFER: usize = 1024;

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// Counters and bar for the stage currently running.
struct StageView {
    name: &'static str,
    total: usize,
    computed: usize,
    cached: usize,
    failed: usize,
    bar: ProgressBar,
}

impl StageView {
    fn new(name: &'static str, total: usize, bar: ProgressBar) -> Self {
        bar.set_style(file_bar_style());
        bar.set_message(name);
        Self {
            name,
            total,
            computed: 0,
            cached: 0,
            failed: 0,
            bar,
        }
    }

    fn finished(&self) -> usize {
        self.computed + self.cached + self.failed
    }

    /// Counts one file and returns its log line, e.g. `Shape extraction 2/5 - done.`.
    fn record(&mut self, file: &str, outcome: FileOutcome) -> String {
        let status = match outcome {
            FileOutcome::Computed => {
                self.computed += 1;
                "done.".to_string()
            }
            FileOutcome::Cached => {
                self.cached += 1;
                "loaded from cache.".to_string()
            }
            FileOutcome::Failed => {
                self.failed += 1;
                format!("failed ({file}).")
            }
        };
        self.bar.inc(1);
        format!("{} {}/{} - {}", self.name, self.finished(), self.total, status)
    }

    fn summary(&self) -> String {
        if self.failed > 0 {
            format!(
                "✗ {}: {} of {} files failed",
                self.name, self.failed, self.total
            )
        } else {
            format!(
                "✓ {}: {} computed, {} from cache",
                self.name, self.computed, self.cached
            )
        }
    }
}

fn file_bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos}/{len} files")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸ ")
}

/// Renders engine progress on stderr while commands run on the blocking pool.
pub struct UiManager {
    mp: MultiProgress,
    stage: Option<StageView>,
    events: mpsc::Receiver<UiEvent>,
    shutdown: watch::Receiver<bool>,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, events) = mpsc::channel(EVENT_BUFFER);
        let (shutdown_sender, shutdown) = watch::channel(false);
        let manager = Self {
            mp: MultiProgress::with_draw_target(ProgressDrawTarget::stderr_with_hz(12)),
            stage: None,
            events,
            shutdown,
        };
        (manager, event_sender, shutdown_sender)
    }

    /// Handles events until shutdown is signalled, then drains whatever is still queued.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.handle_event(event),
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
        if let Some(view) = self.stage.take() {
            view.bar.finish_and_clear();
        }
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(line) => self.print(line),
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::StageStart { stage, files } => {
                if let Some(previous) = self.stage.take() {
                    previous.bar.finish_and_clear();
                }
                let bar = self.mp.add(ProgressBar::new(files as u64));
                self.stage = Some(StageView::new(stage, files, bar));
            }
            Progress::FileFinished { file, outcome } => {
                let Some(view) = self.stage.as_mut() else {
                    warn!(%file, "File progress received outside of a stage.");
                    return;
                };
                let line = view.record(&file, outcome);
                self.print(format!("  {line}"));
            }
            Progress::StageFinish { .. } => {
                if let Some(view) = self.stage.take() {
                    view.bar.finish_and_clear();
                    self.print(view.summary());
                }
            }
        }
    }

    fn print(&self, line: String) {
        if self.mp.println(line).is_err() {
            warn!("Failed to write to the terminal.");
        }
    }
}

/// Bridges the engine's synchronous callback onto the UI channel.
#[derive(Clone)]
pub struct ProgressForwarder {
    sender: mpsc::Sender<UiEvent>,
}

impl ProgressForwarder {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                warn!("Dropped progress event: {}", e);
            }
        })
    }
}
