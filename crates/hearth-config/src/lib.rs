// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for Hearth.
//!
//! TOML files are layered with `HEARTH_*` environment overrides, rejected on
//! unknown keys, then validated. Failures come back as [`ConfigError`]
//! diagnostics ready for [`render_errors`].
//!
//! ```no_run
//! let config = hearth_config::load_and_validate().unwrap_or_else(|errors| {
//!     hearth_config::render_errors(&errors);
//!     std::process::exit(1);
//! });
//! println!("tick every {}s", config.scheduler.tick_interval_secs);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    HearthConfig, HubConfig, JanitorConfig, LoggingConfig, RateLimitConfig, SchedulerConfig,
};

/// Loads the standard file hierarchy plus environment, then validates.
pub fn load_and_validate() -> Result<HearthConfig, Vec<ConfigError>> {
    finish(loader::load_config(), loader::search_paths())
}

/// Loads a single file plus environment, then validates.
pub fn load_and_validate_path(path: &Path) -> Result<HearthConfig, Vec<ConfigError>> {
    finish(
        loader::load_config_from_path(path),
        vec![path.to_path_buf()],
    )
}

/// Parses inline TOML over the defaults, then validates. No environment.
pub fn load_and_validate_str(toml_content: &str) -> Result<HearthConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => validation::validate_config(&config).map(|()| config),
        Err(err) => {
            let sources = [("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

fn finish(
    loaded: Result<HearthConfig, figment::Error>,
    paths: Vec<PathBuf>,
) -> Result<HearthConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => validation::validate_config(&config).map(|()| config),
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &read_sources(&paths),
        )),
    }
}

/// Reads whichever config files exist, for source spans in diagnostics.
fn read_sources(paths: &[PathBuf]) -> Vec<(String, String)> {
    paths
        .iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(path).ok()?;
            let absolute = std::path::absolute(path).unwrap_or_else(|_| path.clone());
            Some((absolute.display().to_string(), content))
        })
        .collect()
}
