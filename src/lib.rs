//! # swquery
//!
//! Command-line front end for the `swquery-spacewalk` client: reads
//! options, runs one listing, and reports a JSON result.

pub mod cli;
pub mod config;
pub mod logging;
pub mod operations;
pub mod output;

use cli::Command;
use config::RawArgs;
use output::ModuleResult;

/// Merge every option source for `command`.
pub fn resolve(command: &Command) -> swquery_spacewalk::SpacewalkResult<operations::Invocation> {
    let op = command.operation();
    let from_file = match &command.connection().args_file {
        Some(path) => {
            log::debug!("Reading options from {}", path.display());
            RawArgs::from_file(op, path)?
        }
        None => RawArgs::default(),
    };
    from_file.overlay(command.overrides()).resolve(op)
}

/// Resolve options and run the query.
pub async fn run(command: &Command) -> ModuleResult {
    match resolve(command) {
        Ok(inv) => operations::execute(&inv).await,
        Err(e) => {
            log::error!("{}: {}", command.operation().name(), e.message);
            ModuleResult::invalid_arguments(&e)
        }
    }
}
