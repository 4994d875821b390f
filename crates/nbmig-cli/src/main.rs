//! nbmig - NetBox config context and local context migration tool

mod cli;
mod commands;
mod logging;

use clap::ArgMatches;
use nbmig_core::MigrationConfig;
use std::path::PathBuf;
use std::process::ExitCode;

async fn load_config(matches: &ArgMatches) -> anyhow::Result<MigrationConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => Ok(MigrationConfig::load(path).await?),
        None => Ok(MigrationConfig::default()),
    }
}

async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let file_config = load_config(matches).await?;

    match matches.subcommand() {
        Some(("config-context", args)) => {
            let config = cli::apply_flags(file_config, matches, args)?;
            commands::config_context(
                &config,
                args.get_one::<PathBuf>("export-file").map(PathBuf::as_path),
                args.get_one::<PathBuf>("import-file").map(PathBuf::as_path),
            )
            .await
        }
        Some(("local-context", local)) => match local.subcommand() {
            Some(("export", args)) => {
                let config = cli::apply_flags(file_config, matches, args)?;
                let output = args
                    .get_one::<PathBuf>("output")
                    .ok_or_else(|| anyhow::anyhow!("--output is required"))?;
                commands::local_context_export(&config, output).await
            }
            Some(("import", args)) => {
                let config = cli::apply_flags(file_config, matches, args)?;
                let input = args
                    .get_one::<PathBuf>("input")
                    .ok_or_else(|| anyhow::anyhow!("--input is required"))?;
                commands::local_context_import(&config, input).await
            }
            Some(("transfer", args)) => {
                let config = cli::apply_flags(file_config, matches, args)?;
                commands::local_context_transfer(&config).await
            }
            _ => unreachable!("clap enforces a local-context subcommand"),
        },
        _ => unreachable!("clap enforces a subcommand"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli::command().get_matches();

    if let Err(e) = logging::init(&matches) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    match run(&matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
