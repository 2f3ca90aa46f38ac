use anyhow::Context;
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use swquery_lib::{cli::Cli, logging};
use tracing::Instrument;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.log_format)?;

    let op = cli.command.operation();
    let span = tracing::info_span!("invocation", operation = op.name());
    let result = swquery_lib::run(&cli.command).instrument(span).await;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &result.to_json()).context("Failed to write result")?;
    writeln!(stdout).context("Failed to write result")?;

    Ok(result.exit_code())
}
