//! Netlify API client.
//!
//! Async HTTP client using `reqwest` with Bearer token authentication, implementing
//! the core [`HostingApi`] trait. Non-success responses become
//! [`DeployError::Provider`] carrying the status and the untouched body; requests
//! that never got a response become [`DeployError::Transport`].

use async_trait::async_trait;
use netlify_deploy_core::contract::{Deploy, FileManifest, HostingApi, Site, SiteSettings};
use netlify_deploy_core::DeployError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::load_config::Credentials;

pub const DEFAULT_BASE_URL: &str = "https://api.netlify.com/api/v1";
/// Overrides [`DEFAULT_BASE_URL`]; used to point the binary at a local server.
pub const API_URL_ENV: &str = "NETLIFY_API_URL";

#[derive(Serialize)]
struct NewDeploy<'a> {
    files: &'a FileManifest,
}

pub struct NetlifyClient {
    http: reqwest::Client,
    base_url: String,
}

impl NetlifyClient {
    /// Creates a client sending `Authorization: Bearer <token>` on every request.
    pub fn new(credentials: &Credentials) -> Result<Self, DeployError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", credentials.token()))
            .map_err(|_| DeployError::Config("token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| DeployError::Transport(e.to_string()))?;

        tracing::info!(
            token_len = credentials.token().len(),
            "Initialized NetlifyClient"
        );
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Like [`NetlifyClient::new`], honouring `NETLIFY_API_URL` when set.
    pub fn from_env(credentials: &Credentials) -> Result<Self, DeployError> {
        let client = Self::new(credentials)?;
        Ok(match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => client.with_base_url(url),
            _ => client,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, DeployError> {
        let resp = req
            .send()
            .await
            .map_err(|e| DeployError::Transport(e.to_string()))?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "Netlify API returned an error");
            return Err(DeployError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| DeployError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| DeployError::Transport(format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl HostingApi for NetlifyClient {
    async fn create_site(&self, settings: &SiteSettings) -> Result<Site, DeployError> {
        tracing::info!(name = ?settings.name, account = ?settings.account_slug, "POST /sites");
        let url = format!("{}/sites", self.base_url);
        self.send(self.http.post(&url).json(settings)).await
    }

    async fn create_deploy(
        &self,
        site_id: &str,
        files: &FileManifest,
    ) -> Result<Deploy, DeployError> {
        tracing::info!(site_id, files = files.len(), "POST /sites/{{id}}/deploys");
        let url = format!("{}/sites/{site_id}/deploys", self.base_url);
        self.send(self.http.post(&url).json(&NewDeploy { files }))
            .await
    }

    async fn get_deploy(&self, site_id: &str, deploy_id: &str) -> Result<Deploy, DeployError> {
        tracing::debug!(site_id, deploy_id, "GET /sites/{{id}}/deploys/{{id}}");
        let url = format!("{}/sites/{site_id}/deploys/{deploy_id}", self.base_url);
        self.send(self.http.get(&url)).await
    }
}
