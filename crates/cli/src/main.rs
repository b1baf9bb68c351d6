use crate::{commands::Cli, env::EnvManager, error::CliError, shutdown::ExitCode};
use clap::Parser;
use engine_runtime::{
    execution::{executor::ImportExecutor, summary::ImportSummary},
    shutdown::os_interrupt,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;
mod shutdown;

#[tokio::main]
async fn main() {
    // Initialize logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match run(&cli).await {
        Ok(summary) => match output::print_summary(&summary, cli.json) {
            Ok(()) if summary.is_interrupted() => ExitCode::ShutdownRequested,
            Ok(()) => ExitCode::Success,
            Err(err) => {
                eprintln!("Error: {err}");
                ExitCode::GeneralError
            }
        },
        Err(err) if err.is_shutdown() => {
            info!("Import stopped before it started");
            ExitCode::ShutdownRequested
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::GeneralError
        }
    };

    std::process::exit(code.as_i32());
}

async fn run(cli: &Cli) -> Result<ImportSummary, CliError> {
    let mut env = EnvManager::from_system();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }

    let settings = cli.settings(&env)?;
    info!(
        archive = %cli.archive_dir.display(),
        from = settings.from,
        count = settings.count,
        "Importing headers"
    );

    let mut executor = ImportExecutor::new(settings);
    if let Some(dir) = &cli.scratch_dir {
        executor = executor.with_scratch_parent(dir.clone());
    }

    Ok(executor.run(&cli.archive_dir, os_interrupt()).await?)
}
