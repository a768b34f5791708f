pub mod run;
pub mod stage;

use crate::config::AppConfig;
use mirsight::engine::scheduler::BatchReport;
use mirsight::workflows::augment::Stage;
use tracing::info;

fn log_config(app: &AppConfig) {
    let cfg = &app.engine;
    match &app.config_file {
        Some(path) => info!(config = %path.display(), "Loaded configuration file."),
        None => info!("No configuration file given; using defaults."),
    }
    info!(
        workers = cfg.workers,
        caching = cfg.use_caching,
        pairing = ?cfg.pairing,
        features = %cfg.directories.features.display(),
        "Engine configuration ready."
    );
}

fn log_report(stage: Stage, report: &BatchReport) {
    info!(
        %stage,
        files = report.total(),
        computed = report.computed,
        cached = report.cached,
        "Stage complete."
    );
}
