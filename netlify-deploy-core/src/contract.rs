#![allow(unused)]

//! # contract: data model and collaborator traits for a deploy
//!
//! This module holds the plain data exchanged with the hosting provider
//! ([`Site`], [`Deploy`], [`SiteSettings`], [`FileManifest`]) and the three
//! seams the orchestrator is built on:
//!
//! - [`HostingApi`]: the provider's HTTP API (site creation, deploy creation, deploy status).
//! - [`BuildRunner`]: the external frontend build, run synchronously in a directory.
//! - [`Sleeper`]: the pause between two status checks.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`; the generated `MockHostingApi`,
//!   `MockBuildRunner` and `MockSleeper` are exported with the
//!   `test-export-mocks` feature so integration tests can drive the
//!   orchestrator without network, processes or real waiting.
//!
//! ## Implementations
//! - The reqwest client lives in the CLI crate (`netlify-deploy`).
//! - [`crate::build_step::CommandBuildRunner`] and [`crate::deploy::TokioSleeper`] live in this crate.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use mockall::{automock, predicate::*};
use serde::{Deserialize, Serialize};

use crate::error::DeployError;

/// Relative upload path (always `/` separated) to base64 file content.
///
/// Ordered so that the request body is the same for the same tree.
pub type FileManifest = BTreeMap<String, String>;

/// A site as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ssl_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Site {
    /// Public URL of the site, preferring the https one.
    pub fn public_url(&self) -> Option<&str> {
        self.ssl_url.as_deref().or(self.url.as_deref())
    }
}

/// Deploy status as reported by the provider.
///
/// Only `ready` and `error` are terminal. Every other status string
/// (`new`, `uploading`, `processing`, `enqueued`, ...) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeployState {
    Ready,
    Error,
    Pending(String),
}

impl DeployState {
    pub fn as_str(&self) -> &str {
        match self {
            DeployState::Ready => "ready",
            DeployState::Error => "error",
            DeployState::Pending(s) => s,
        }
    }
}

impl From<String> for DeployState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ready" => DeployState::Ready,
            "error" => DeployState::Error,
            _ => DeployState::Pending(s),
        }
    }
}

impl From<&str> for DeployState {
    fn from(s: &str) -> Self {
        DeployState::from(s.to_string())
    }
}

impl From<DeployState> for String {
    fn from(state: DeployState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One upload-and-publish attempt belonging to a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deploy {
    pub id: String,
    #[serde(default)]
    pub site_id: String,
    pub state: DeployState,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub deploy_url: Option<String>,
    #[serde(default)]
    pub ssl_url: Option<String>,
}

impl Deploy {
    /// Live URL once the deploy is ready.
    pub fn live_url(&self) -> Option<&str> {
        self.ssl_url.as_deref().or(self.deploy_url.as_deref())
    }
}

/// Default site name sent on creation.
pub const DEFAULT_SITE_NAME: &str = "trendmaster-app";
/// Default team (account slug) that owns the created site.
pub const DEFAULT_ACCOUNT_SLUG: &str = "kingivthe1st";

/// Payload for site creation.
///
/// The default carries the fixed site name and account; configuration may override either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_slug: Option<String>,
    pub custom_domain: Option<String>,
    pub force_ssl: bool,
    pub processing_settings: ProcessingSettings,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            name: Some(DEFAULT_SITE_NAME.to_string()),
            account_slug: Some(DEFAULT_ACCOUNT_SLUG.to_string()),
            custom_domain: None,
            force_ssl: true,
            processing_settings: ProcessingSettings::default(),
        }
    }
}

/// Post-processing the provider applies to uploaded assets. All enabled by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSettings {
    pub skip: bool,
    pub css: AssetProcessing,
    pub js: AssetProcessing,
    pub html: HtmlProcessing,
    pub images: ImageProcessing,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            skip: false,
            css: AssetProcessing { bundle: true, minify: true },
            js: AssetProcessing { bundle: true, minify: true },
            html: HtmlProcessing { pretty_urls: true },
            images: ImageProcessing { compress: true },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetProcessing {
    pub bundle: bool,
    pub minify: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtmlProcessing {
    pub pretty_urls: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageProcessing {
    pub compress: bool,
}

/// Exit status of a finished build. `code` is `None` when the process was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOutcome {
    pub code: Option<i32>,
}

impl BuildOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// The hosting provider's HTTP API.
///
/// The implementor owns the endpoint and the credential; callers only pass ids and payloads.
/// Non-success responses must come back as [`DeployError::Provider`] with the body untouched,
/// anything that never produced a response as [`DeployError::Transport`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// `POST /sites`
    async fn create_site(&self, settings: &SiteSettings) -> Result<Site, DeployError>;

    /// `POST /sites/{site_id}/deploys` with the manifest as `files`.
    async fn create_deploy(
        &self,
        site_id: &str,
        files: &FileManifest,
    ) -> Result<Deploy, DeployError>;

    /// `GET /sites/{site_id}/deploys/{deploy_id}`
    async fn get_deploy(&self, site_id: &str, deploy_id: &str) -> Result<Deploy, DeployError>;
}

/// Runs the frontend build in `working_dir` and reports how it exited.
///
/// Failing to launch at all is an error; a non-zero exit is an outcome the caller judges.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait BuildRunner: Send + Sync {
    fn run(&self, working_dir: &Path) -> Result<BuildOutcome, DeployError>;
}

/// Pause between two status checks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
