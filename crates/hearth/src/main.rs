// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hearth` command-line entry point.

use std::process::ExitCode;

use clap::Parser;
use hearth::cli::{self, Cli, CliError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    hearth::init_tracing("warn");

    match cli::run(cli.command) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(CliError::Config(errors)) => {
            hearth_config::render_errors(&errors);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("hearth: {e}");
            ExitCode::FAILURE
        }
    }
}
