mod cli;
mod dispatcher;

use cdi_calc::config::Config;
use cdi_calc::error::ErrorReport;
use clap::Parser;
use cli::formatters::format_error;
use cli::Cli;
use dispatcher::AppContext;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    if !use_color {
        colored::control::set_override(false);
    }

    // Initialize logging (stderr, RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(use_color)
        .init();

    let json = cli.json;
    let outcome = match Config::load(cli.config.as_deref()) {
        Ok(config) => {
            let ctx = AppContext::new(json, config);
            dispatcher::dispatch_command(cli.command, &ctx).await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let report = ErrorReport::from_anyhow(&err);
            if json {
                println!("{}", format_error(&report, true));
            } else {
                eprintln!("{}", format_error(&report, false));
            }
            ExitCode::FAILURE
        }
    }
}
