// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment layering.
//!
//! Later layers override earlier ones:
//! 1. compiled defaults
//! 2. `/etc/hearth/hearth.toml`
//! 3. `$XDG_CONFIG_HOME/hearth/hearth.toml`
//! 4. `./hearth.toml`
//! 5. `HEARTH_*` environment variables

#![allow(clippy::result_large_err)]

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::HearthConfig;

const SECTIONS: &[&str] = &["logging", "hub", "scheduler", "rate_limit", "janitor"];

/// Config files consulted by [`load_config`], lowest precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/hearth/hearth.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("hearth").join("hearth.toml"));
    }
    paths.push(PathBuf::from("hearth.toml"));
    paths
}

/// The full layered figment, before extraction.
pub fn build_figment() -> Figment {
    search_paths()
        .into_iter()
        .fold(defaults(), |figment, path| figment.merge(Toml::file(path)))
        .merge(env_provider())
}

pub fn load_config() -> Result<HearthConfig, figment::Error> {
    build_figment().extract()
}

/// Defaults, one explicit file, then the environment.
pub fn load_config_from_path(path: &Path) -> Result<HearthConfig, figment::Error> {
    defaults()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Defaults and inline TOML only.
pub fn load_config_from_str(toml_content: &str) -> Result<HearthConfig, figment::Error> {
    defaults().merge(Toml::string(toml_content)).extract()
}

fn defaults() -> Figment {
    Figment::new().merge(Serialized::defaults(HearthConfig::default()))
}

/// `HEARTH_RATE_LIMIT_GROCERY_LIMIT` must land on `rate_limit.grocery_limit`,
/// so sections are matched by name instead of splitting on `_`.
fn env_provider() -> Env {
    Env::prefixed("HEARTH_").map(|key| env_key_to_path(key.as_str()).into())
}

fn env_key_to_path(key: &str) -> String {
    for section in SECTIONS {
        if let Some(field) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{field}");
        }
    }
    key.to_string()
}
