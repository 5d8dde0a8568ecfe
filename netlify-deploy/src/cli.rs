///
/// This module implements the CLI interface for netlify-deploy: command parsing,
/// the two entry points and the user-visible output around them.
///
/// All deploy logic (file collection, orchestration, polling) lives in the
/// [`netlify-deploy-core`] crate. This module only wires the real collaborators
/// (Netlify client, process build runner, tokio sleeper) into it.
///
/// ## Commands
/// - `deploy`: create a site, build the frontend, upload and wait until live.
/// - `setup`: store a token in `.env`, then optionally run `deploy` with it.
///
/// [`netlify-deploy-core`]: ../../netlify-deploy-core/
use crate::load_config::{config_path, load_config, load_credentials, Credentials};
use crate::netlify::NetlifyClient;
use crate::setup::{run_setup, SetupOutcome, TerminalPrompt, ENV_FILE};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use netlify_deploy_core::build_step::CommandBuildRunner;
use netlify_deploy_core::deploy::{DeployReport, Deployer, TokioSleeper};
use std::path::Path;

/// CLI for netlify-deploy: publish a static frontend and its functions to Netlify.
#[derive(Parser)]
#[clap(
    name = "netlify-deploy",
    version,
    about = "Create a Netlify site, build the frontend, upload it and wait until it is live"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a site, build and upload the frontend, then wait for the deploy to go live
    Deploy,
    /// Save a Netlify personal access token to .env, then optionally deploy
    Setup,
}

/// Async CLI entrypoint shared by main() and integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Deploy => {
            let credentials = load_credentials()?;
            deploy(credentials).await.map(|_| ())
        }
        Commands::Setup => match run_setup(&TerminalPrompt, Path::new(ENV_FILE))? {
            SetupOutcome::NoToken => Ok(()),
            SetupOutcome::Saved {
                credentials,
                deploy_now: true,
            } => {
                println!("Starting deployment...");
                deploy(credentials).await.map(|_| ())
            }
            SetupOutcome::Saved {
                deploy_now: false, ..
            } => {
                println!("To deploy later, run: netlify-deploy deploy");
                Ok(())
            }
        },
    }
}

/// Runs the full create → deploy → wait sequence with the given credential.
pub async fn deploy(credentials: Credentials) -> Result<DeployReport> {
    let config = load_config(config_path())?;
    let api = NetlifyClient::from_env(&credentials)?;
    let build = CommandBuildRunner::new(config.build.commands.clone());
    let deployer = Deployer::new(config, api, build, TokioSleeper);

    tracing::info!(command = "deploy", "Starting deploy");
    let report = deployer.run().await.context("Deployment failed")?;

    println!("Deploy complete. Your site is live.");
    println!(
        "URL: {}",
        report
            .deploy
            .live_url()
            .or(report.site.public_url())
            .unwrap_or("(not reported)")
    );
    println!("Site ID: {}", report.site.id);
    Ok(report)
}
