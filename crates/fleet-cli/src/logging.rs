// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config;

/// Routes `tracing` output to the log file; the terminal belongs to the TUI.
pub fn init(config: &Config) -> Result<PathBuf> {
    let path = config.log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter(config)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("install log subscriber")?;
    Ok(path)
}

/// `FLEET_LOG` wins over `[log].level`.
fn filter(config: &Config) -> Result<EnvFilter> {
    match env::var("FLEET_LOG") {
        Ok(directive) if !directive.trim().is_empty() => {
            EnvFilter::try_new(&directive).with_context(|| format!("invalid FLEET_LOG {directive:?}"))
        }
        _ => EnvFilter::try_new(config.log_level())
            .with_context(|| format!("invalid [log].level {:?}", config.log_level())),
    }
}

#[cfg(test)]
mod tests {
    use super::filter;
    use crate::config::Config;
    use anyhow::Result;

    #[test]
    fn filter_falls_back_to_config_level() -> Result<()> {
        // SAFETY: test-only process-local env mutation; no other test reads FLEET_LOG.
        unsafe {
            std::env::remove_var("FLEET_LOG");
        }
        let mut config = Config::default();
        config.log.level = Some("debug".to_owned());
        let filter = filter(&config)?;
        assert!(filter.to_string().contains("debug"));
        Ok(())
    }
}
