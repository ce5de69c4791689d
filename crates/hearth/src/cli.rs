// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line interface.
//!
//! Commands render to a `String` so they can be exercised without a process.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, TimeZone};
use clap::{Args, Parser, Subcommand};
use hearth_config::{ConfigError, HearthConfig};
use hearth_core::RuleParseError;
use hearth_recurrence::{RecurrenceRule, occurrences};
use thiserror::Error;

/// Hearth household core.
#[derive(Parser, Debug)]
#[command(name = "hearth", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect recurrence rules.
    #[command(subcommand)]
    Rule(RuleCommand),
    /// Inspect configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum RuleCommand {
    /// Print the canonical form and a human-readable description.
    Describe {
        /// Rule text, e.g. `FREQ=WEEKLY;BYDAY=MO,WE`.
        rule: String,
    },
    /// List the occurrences of a rule inside a window.
    Expand(ExpandArgs),
}

#[derive(Args, Debug)]
pub struct ExpandArgs {
    pub rule: String,
    /// Start of the base event (RFC 3339).
    #[arg(long)]
    pub start: String,
    /// End of the base event (RFC 3339). Defaults to `--start`.
    #[arg(long)]
    pub end: Option<String>,
    /// Window start, inclusive (RFC 3339).
    #[arg(long)]
    pub from: String,
    /// Window end, exclusive (RFC 3339).
    #[arg(long)]
    pub to: String,
    /// IANA zone the event repeats in, e.g. `America/New_York`.
    /// Defaults to the fixed offset of `--start`.
    #[arg(long)]
    pub tz: Option<String>,
    /// Stop after this many occurrences.
    #[arg(long, default_value_t = 100)]
    pub limit: usize,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Load and validate the configuration, then print the effective values.
    Check {
        /// Read only this file (plus `HEARTH_*` overrides) instead of the search path.
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Rule(#[from] RuleParseError),

    #[error("invalid timestamp `{value}`: {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },

    #[error("unknown time zone `{0}`")]
    TimeZone(String),

    #[error("configuration is invalid ({} problem(s))", .0.len())]
    Config(Vec<ConfigError>),

    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Runs one command and returns what it would print.
pub fn run(command: Commands) -> Result<String, CliError> {
    match command {
        Commands::Rule(RuleCommand::Describe { rule }) => describe(&rule),
        Commands::Rule(RuleCommand::Expand(args)) => expand(&args),
        Commands::Config(ConfigCommand::Check { path }) => {
            let loaded = match path {
                Some(path) => hearth_config::load_and_validate_path(&path),
                None => hearth_config::load_and_validate(),
            };
            render_config(&loaded.map_err(CliError::Config)?)
        }
    }
}

pub fn describe(text: &str) -> Result<String, CliError> {
    let rule = RecurrenceRule::parse(text)?;
    Ok(format!("{rule}\n{}\n", rule.describe()))
}

pub fn expand(args: &ExpandArgs) -> Result<String, CliError> {
    let rule = RecurrenceRule::parse(&args.rule)?;
    let start = parse_timestamp(&args.start)?;
    let end = match &args.end {
        Some(end) => parse_timestamp(end)?,
        None => start,
    };
    let from = parse_timestamp(&args.from)?;
    let to = parse_timestamp(&args.to)?;

    match &args.tz {
        Some(name) => {
            let tz: chrono_tz::Tz = name
                .parse()
                .map_err(|_| CliError::TimeZone(name.clone()))?;
            Ok(list(
                &rule,
                &start.with_timezone(&tz),
                &end.with_timezone(&tz),
                &from,
                &to,
                args.limit,
            ))
        }
        None => Ok(list(&rule, &start, &end, &from, &to, args.limit)),
    }
}

fn list<Tz>(
    rule: &RecurrenceRule,
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
    from: &DateTime<FixedOffset>,
    to: &DateTime<FixedOffset>,
    limit: usize,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    for occurrence in occurrences(rule, start, end, from, to).take(limit) {
        let _ = writeln!(
            out,
            "{}  {}",
            occurrence.start.to_rfc3339(),
            occurrence.end.to_rfc3339()
        );
    }
    out
}

fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, CliError> {
    DateTime::parse_from_rfc3339(value).map_err(|source| CliError::Timestamp {
        value: value.to_string(),
        source,
    })
}

fn render_config(config: &HearthConfig) -> Result<String, CliError> {
    Ok(format!(
        "configuration ok\n\n{}",
        toml::to_string_pretty(config)?
    ))
}
