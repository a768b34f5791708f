use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::StageArgs;
use crate::error::{CliError, Result};
use mirsight::engine::config::{EngineConfigBuilder, PairingMode, StageDirectories};
use std::path::PathBuf;
use tracing::debug;

pub fn build_config(args: &StageArgs, threads: Option<usize>) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let settings = file_config.settings.take().unwrap_or_default();
    let use_caching = !args.no_cache && settings.use_caching.unwrap_or(defaults.use_caching);
    let pairing = if args.strict_pairing {
        PairingMode::Strict
    } else {
        settings.pairing.unwrap_or(defaults.pairing)
    };

    let workers = match threads {
        Some(0) => {
            return Err(CliError::Argument(
                "--threads must be at least 1".to_string(),
            ));
        }
        Some(n) => n,
        None => resolve_workers(
            settings.max_cores.unwrap_or(defaults.max_cores),
            num_cpus::get(),
        )?,
    };
    debug!(workers, use_caching, ?pairing, "Resolved execution settings.");

    let directories = merge_directories(&file_config, &defaults);
    let columns = file_config.columns.take().unwrap_or_default();

    let engine = EngineConfigBuilder::new()
        .directories(directories)
        .use_caching(use_caching)
        .workers(workers)
        .columns(columns)
        .pairing(pairing)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        config_file: args.config.clone(),
        engine,
    })
}

/// Turns a `max-cores` setting into a worker count. `-1` keeps one core free.
pub fn resolve_workers(max_cores: i64, available: usize) -> Result<usize> {
    match max_cores {
        -1 => Ok(available.saturating_sub(1).max(1)),
        n if n >= 1 => usize::try_from(n)
            .map_err(|_| CliError::Config(format!("max-cores value {} is too large", n))),
        n => Err(CliError::Config(format!(
            "max-cores must be -1 or a positive integer, got {}",
            n
        ))),
    }
}

fn merge_directories(file_config: &FileConfig, defaults: &DefaultsConfig) -> StageDirectories {
    let dirs = file_config.directories.clone().unwrap_or_default();
    let pick = |value: Option<PathBuf>, default: &str| {
        value
            .map(|path| file_config.resolve(path))
            .unwrap_or_else(|| PathBuf::from(default))
    };

    StageDirectories {
        features: pick(dirs.features, defaults.features_dir),
        conservation: pick(dirs.conservation, defaults.conservation_dir),
        features_conservation: pick(
            dirs.features_conservation,
            defaults.features_conservation_dir,
        ),
        shape_data: pick(dirs.shape_data, defaults.shape_data_dir),
        parsed_shape: pick(dirs.parsed_shape, defaults.parsed_shape_dir),
        features_cons_shape: pick(dirs.features_cons_shape, defaults.features_cons_shape_dir),
    }
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "settings.use-caching" => {
                config
                    .settings
                    .get_or_insert_with(Default::default)
                    .use_caching = Some(value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid boolean value for {}: {}", key, value_str))
                })?);
            }
            "settings.max-cores" => {
                config.settings.get_or_insert_with(Default::default).max_cores =
                    Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid integer value for {}: {}",
                            key, value_str
                        ))
                    })?);
            }
            "settings.pairing" => {
                config.settings.get_or_insert_with(Default::default).pairing =
                    Some(match value_str {
                        "positional" => PairingMode::Positional,
                        "strict" => PairingMode::Strict,
                        _ => {
                            return Err(CliError::Config(format!(
                                "Invalid pairing mode for {}: {} (expected 'positional' or 'strict')",
                                key, value_str
                            )));
                        }
                    });
            }
            _ => {
                if let Some(dir_key) = key.strip_prefix("directories.") {
                    let dirs = config.directories.get_or_insert_with(Default::default);
                    let slot = match dir_key {
                        "features" => &mut dirs.features,
                        "conservation" => &mut dirs.conservation,
                        "features-conservation" => &mut dirs.features_conservation,
                        "shape-data" => &mut dirs.shape_data,
                        "parsed-shape" => &mut dirs.parsed_shape,
                        "features-cons-shape" => &mut dirs.features_cons_shape,
                        _ => return Err(unsupported_key(key)),
                    };
                    *slot = Some(PathBuf::from(value_str));
                } else if let Some(column_key) = key.strip_prefix("columns.") {
                    let columns = config.columns.get_or_insert_with(Default::default);
                    let slot = match column_key {
                        "transcript-id" => &mut columns.transcript_id,
                        "utr-length" => &mut columns.utr_length,
                        "binding-site-pos" => &mut columns.binding_site_pos,
                        "site-abundance" => &mut columns.site_abundance,
                        _ => return Err(unsupported_key(key)),
                    };
                    *slot = value_str.to_string();
                } else {
                    return Err(unsupported_key(key));
                }
            }
        }
    }
    Ok(config)
}

fn unsupported_key(key: &str) -> CliError {
    CliError::Config(format!("Unsupported configuration key for --set: '{}'", key))
}
