//! pushlatest - push a container image as :latest only when its content changed
//!
//! This is the main entry point for the pushlatest command-line interface.

mod cli;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use pushlatest_core::{ImageReference, PromotionDecision, Verbosity};
use pushlatest_image::{resolve_target, validate_source, DockerCli, PromoteOptions, Promoter};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbosity(), cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let source = ImageReference::parse(&cli.source)?;
    let target = cli
        .target
        .as_deref()
        .map(ImageReference::parse)
        .transpose()?;

    // Reject bad input before touching the container runtime.
    validate_source(&source)?;
    let resolved_target = resolve_target(&source, target.as_ref())?;

    let mut options = PromoteOptions {
        dry_run: cli.dry_run,
        verbosity: cli.verbosity(),
        ..PromoteOptions::default()
    };
    if let Some(command) = cli
        .package_list_command()
        .context("Invalid --package-list-command")?
    {
        options.package_list_command = command;
    }
    options.validate()?;

    let docker = DockerCli::locate(&cli.docker)?;
    debug!("Using container runtime at {:?}", docker.docker_path());

    let decision = Promoter::new(docker, options)
        .promote(&source, target.as_ref())
        .await?;

    output::success(&summary(decision, &source, &resolved_target, cli.dry_run));
    Ok(())
}

/// One-line outcome of a run
fn summary(
    decision: PromotionDecision,
    source: &ImageReference,
    target: &ImageReference,
    dry_run: bool,
) -> String {
    let message = match decision {
        PromotionDecision::TagAndPushTargetNew => {
            format!("{} did not exist and was created from {}", target, source)
        }
        PromotionDecision::TagAndPushTarget => {
            format!("{} changed and was promoted to {}", source, target)
        }
        PromotionDecision::Skip => {
            format!("{} is unchanged, only {} was pushed", target, source)
        }
    };
    if dry_run {
        format!("[dry run] {} ({})", message, decision)
    } else {
        format!("{} ({})", message, decision)
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbosity: Verbosity, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::new(verbosity.filter_directive())
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
