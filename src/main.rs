use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    let cli = interleaved_doc::cli::Cli::parse();
    interleaved_doc::logging::init(&cli.log_level).context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        interleaved_doc::cli::Command::Assemble(args) => {
            tokio::task::spawn_blocking(move || interleaved_doc::assemble::run(args))
                .await
                .context("join assemble")?
                .context("assemble")?;
        }
        interleaved_doc::cli::Command::Key(args) => {
            let key = interleaved_doc::assemble::key(args).context("key")?;
            println!("{key}");
        }
        interleaved_doc::cli::Command::TwBook(args) => {
            interleaved_doc::tw::run(args).context("tw-book")?;
        }
        interleaved_doc::cli::Command::Batch(args) => {
            interleaved_doc::batch::run(args).await.context("batch")?;
        }
    }

    Ok(())
}
