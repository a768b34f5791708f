use super::{log_config, log_report};
use crate::cli::StageArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::ui::{ProgressForwarder, UiEvent};
use mirsight::engine::progress::ProgressReporter;
use mirsight::workflows::augment::{self, Stage};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn run(
    args: StageArgs,
    threads: Option<usize>,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    let app = build_config(&args, threads)?;
    log_config(&app);

    let forwarder = ProgressForwarder::new(ui_sender.clone());
    let reporter = ProgressReporter::with_callback(forwarder.callback());

    info!("Invoking the feature augmentation workflow...");
    let report = tokio::task::block_in_place(|| augment::run(&app.engine, &reporter))?;

    log_report(Stage::Conservation, &report.conservation);
    log_report(Stage::Shape, &report.shape);
    log_report(Stage::Aggregation, &report.aggregation);

    let output_dir = &app.engine.directories.features_cons_shape;
    let line = format!("Augmented features written to {}", output_dir.display());
    if ui_sender.send(UiEvent::Log(line)).await.is_err() {
        warn!("UI channel closed before the final message.");
    }
    Ok(())
}
