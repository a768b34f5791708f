use super::{log_config, log_report};
use crate::cli::StageArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::ui::{ProgressForwarder, UiEvent};
use mirsight::engine::progress::ProgressReporter;
use mirsight::workflows::augment::{self, Stage};
use tokio::sync::mpsc;
use tracing::info;

pub async fn run(
    stage: Stage,
    args: StageArgs,
    threads: Option<usize>,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    let app = build_config(&args, threads)?;
    log_config(&app);

    let forwarder = ProgressForwarder::new(ui_sender);
    let reporter = ProgressReporter::with_callback(forwarder.callback());

    info!(%stage, "Invoking a single stage...");
    let report = tokio::task::block_in_place(|| augment::run_stage(stage, &app.engine, &reporter))?;

    log_report(stage, &report);
    Ok(())
}
