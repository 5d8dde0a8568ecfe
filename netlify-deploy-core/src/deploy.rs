//! Deploy orchestration: create site → build → upload → wait until live.
//!
//! [`Deployer`] sequences the provider calls around the two pieces of real
//! behaviour in this crate, the file collector ([`crate::collect`]) and the
//! status polling loop ([`Deployer::wait_for_deploy`]).
//!
//! # Collaborators
//! All side effects go through injected traits from [`crate::contract`]:
//! - [`HostingApi`] for the provider (it owns the credential),
//! - [`BuildRunner`] for the frontend build,
//! - [`Sleeper`] for the pause between status checks.
//!
//! # Error Handling
//! Every step is fail-fast and returns the first [`DeployError`] it meets.
//! Nothing is rolled back: a site created before a failing build stays on the provider.
//! A failed status check ends the wait immediately with that error; it is not retried.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::build_step::BuildStep;
use crate::collect::{collect, ManifestRoot};
use crate::contract::{BuildRunner, Deploy, DeployState, HostingApi, Site, SiteSettings, Sleeper};
use crate::error::DeployError;

/// How often and how many times deploy status is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 30,
        }
    }
}

/// Everything a deploy run needs apart from its collaborators.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub site: SiteSettings,
    pub build: BuildStep,
    pub roots: Vec<ManifestRoot>,
    pub poll: PollPolicy,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            site: SiteSettings::default(),
            build: BuildStep::default(),
            roots: vec![
                ManifestRoot::new(PathBuf::from("frontend").join("build"), ""),
                ManifestRoot::new(PathBuf::from("netlify").join("functions"), "functions"),
            ],
            poll: PollPolicy::default(),
        }
    }
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub site: Site,
    pub deploy: Deploy,
}

/// Real [`Sleeper`] backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub struct Deployer<A, B, S> {
    config: DeployConfig,
    api: A,
    build: B,
    sleeper: S,
}

impl<A, B, S> Deployer<A, B, S>
where
    A: HostingApi,
    B: BuildRunner,
    S: Sleeper,
{
    pub fn new(config: DeployConfig, api: A, build: B, sleeper: S) -> Self {
        Self {
            config,
            api,
            build,
            sleeper,
        }
    }

    /// Create → deploy → wait. Stops at the first failing step.
    pub async fn run(&self) -> Result<DeployReport, DeployError> {
        info!("[DEPLOY] Starting deploy sequence");
        let site = self.create_site().await?;
        let deploy = self.deploy_site(&site).await?;
        let deploy = self.wait_for_deploy(&site, &deploy).await?;
        info!(site_id = %site.id, deploy_id = %deploy.id, "[DEPLOY] Deploy sequence complete");
        Ok(DeployReport { site, deploy })
    }

    pub async fn create_site(&self) -> Result<Site, DeployError> {
        info!(name = ?self.config.site.name, "[DEPLOY] Creating site");
        match self.api.create_site(&self.config.site).await {
            Ok(site) => {
                info!(
                    site_id = %site.id,
                    url = site.public_url().unwrap_or(""),
                    "[DEPLOY] Site created"
                );
                Ok(site)
            }
            Err(e) => {
                error!(error = %e, "[DEPLOY][ERROR] Site creation failed");
                Err(e)
            }
        }
    }

    /// Builds the frontend, collects the upload roots and submits them as a new deploy.
    pub async fn deploy_site(&self, site: &Site) -> Result<Deploy, DeployError> {
        let working_dir = &self.config.build.working_dir;
        info!(working_dir = %working_dir.display(), "[DEPLOY] Building frontend");
        let outcome = self.build.run(working_dir)?;
        if !outcome.success() {
            let status = outcome
                .code
                .map(|c| format!("exit code {c}"))
                .unwrap_or_else(|| "a signal".to_string());
            error!(code = ?outcome.code, "[DEPLOY][ERROR] Build failed");
            return Err(DeployError::Build(format!(
                "build in {} terminated with {status}",
                working_dir.display()
            )));
        }

        let files = collect(&self.config.roots)?;
        if files.is_empty() {
            warn!("[DEPLOY] No files collected, submitting an empty deploy");
        }
        info!(site_id = %site.id, files = files.len(), "[DEPLOY] Submitting deploy");

        match self.api.create_deploy(&site.id, &files).await {
            Ok(deploy) => {
                info!(deploy_id = %deploy.id, state = %deploy.state, "[DEPLOY] Deploy submitted");
                Ok(deploy)
            }
            Err(e) => {
                error!(error = %e, site_id = %site.id, "[DEPLOY][ERROR] Deploy submission failed");
                Err(e)
            }
        }
    }

    /// Checks the deploy until it is `ready` or `error`, sleeping between checks.
    ///
    /// Gives up with [`DeployError::Timeout`] after `max_attempts` checks. There is no sleep
    /// after the last check, so the worst case waits `max_attempts - 1` intervals (29 × 10 s
    /// with the default policy). Any error from a status check ends the wait right away.
    pub async fn wait_for_deploy(&self, site: &Site, deploy: &Deploy) -> Result<Deploy, DeployError> {
        let PollPolicy {
            interval,
            max_attempts,
        } = self.config.poll;
        info!(deploy_id = %deploy.id, max_attempts, "[POLL] Waiting for deploy to complete");

        for attempt in 1..=max_attempts {
            let current = match self.api.get_deploy(&site.id, &deploy.id).await {
                Ok(current) => current,
                Err(e) => {
                    error!(attempt, error = %e, "[POLL][ERROR] Status check failed, giving up");
                    return Err(e);
                }
            };

            if current.state == DeployState::Ready {
                info!(attempt, url = current.live_url().unwrap_or(""), "[POLL] Deploy is live");
                return Ok(current);
            }
            if current.state == DeployState::Error {
                let message = current
                    .error_message
                    .unwrap_or_else(|| "no error message reported".to_string());
                error!(attempt, message = %message, "[POLL][ERROR] Provider reported deploy error");
                return Err(DeployError::Deployment(message));
            }
            info!(attempt, state = %current.state, "[POLL] Deploy not ready yet");

            if attempt < max_attempts {
                self.sleeper.sleep(interval).await;
            }
        }

        error!(max_attempts, "[POLL][ERROR] Deploy did not finish in time");
        Err(DeployError::Timeout {
            attempts: max_attempts,
        })
    }
}
