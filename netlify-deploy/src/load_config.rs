/// `load_config` module: loads the optional YAML deploy file and the credential from the environment.
///
/// This is the only place where user-supplied YAML is parsed and mapped onto the
/// strongly-typed [`DeployConfig`] of `netlify-deploy-core`.
///
/// # Responsibilities
/// - Locate the config file (`netlify-deploy.yaml`, or the path in `NETLIFY_DEPLOY_CONFIG`)
/// - Fall back to the built-in defaults for every missing section or field
/// - Read the bearer token from `NETLIFY_TOKEN` (a `.env` file is loaded by `main` beforehand)
///
/// # Errors
/// Everything here fails with [`DeployError::Config`], wrapped in `anyhow` for the CLI boundary.
/// The token check runs before any network call is attempted.
use anyhow::Result;
use netlify_deploy_core::build_step::{BuildCommand, BuildStep};
use netlify_deploy_core::collect::ManifestRoot;
use netlify_deploy_core::deploy::{DeployConfig, PollPolicy};
use netlify_deploy_core::DeployError;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_CONFIG_FILE: &str = "netlify-deploy.yaml";
pub const CONFIG_PATH_ENV: &str = "NETLIFY_DEPLOY_CONFIG";
pub const TOKEN_ENV: &str = "NETLIFY_TOKEN";
pub const TOKEN_HELP_URL: &str =
    "https://app.netlify.com/user/settings/applications#personal-access-tokens";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    site: SiteSection,
    #[serde(default)]
    build: BuildSection,
    #[serde(default)]
    publish: Option<Vec<PublishSection>>,
    #[serde(default)]
    poll: PollSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SiteSection {
    name: Option<String>,
    account_slug: Option<String>,
    force_ssl: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BuildSection {
    working_dir: Option<PathBuf>,
    commands: Option<Vec<Vec<String>>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PublishSection {
    source: PathBuf,
    #[serde(default)]
    prefix: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PollSection {
    interval_secs: Option<u64>,
    max_attempts: Option<u32>,
}

/// Bearer token for the provider. `Debug` never prints the value.
#[derive(Clone)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token_len", &self.token.len())
            .finish()
    }
}

/// Path of the deploy file: `NETLIFY_DEPLOY_CONFIG` if set, else `netlify-deploy.yaml` in the working directory.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Reads the token from `NETLIFY_TOKEN`. Missing or blank is a configuration error.
pub fn load_credentials() -> Result<Credentials, DeployError> {
    match std::env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => {
            info!(token_len = token.trim().len(), "{TOKEN_ENV} found in env");
            Ok(Credentials::new(token.trim()))
        }
        _ => {
            error!("{TOKEN_ENV} environment variable not set");
            Err(DeployError::Config(format!(
                "{TOKEN_ENV} environment variable is required. Get a token from {TOKEN_HELP_URL} or run `netlify-deploy setup`"
            )))
        }
    }
}

/// Loads the deploy file at `path`, or the defaults when it does not exist.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<DeployConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading deploy configuration");

    let raw: RawConfig = match fs::read_to_string(path_ref) {
        Ok(content) => match serde_yaml::from_str::<Option<RawConfig>>(&content) {
            Ok(conf) => {
                info!(config_path = ?path_ref, "Parsed config YAML successfully");
                conf.unwrap_or_default()
            }
            Err(e) => {
                error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
                return Err(DeployError::Config(format!(
                    "failed to parse config YAML {}: {e}",
                    path_ref.display()
                ))
                .into());
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(config_path = ?path_ref, "No config file found, using defaults");
            RawConfig::default()
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(DeployError::Config(format!(
                "failed to read config file {}: {e}",
                path_ref.display()
            ))
            .into());
        }
    };

    into_deploy_config(raw)
}

fn into_deploy_config(raw: RawConfig) -> Result<DeployConfig> {
    let mut config = DeployConfig::default();

    if let Some(name) = raw.site.name {
        config.site.name = Some(name);
    }
    if let Some(account_slug) = raw.site.account_slug {
        config.site.account_slug = Some(account_slug);
    }
    if let Some(force_ssl) = raw.site.force_ssl {
        config.site.force_ssl = force_ssl;
    }

    let default_build = BuildStep::default();
    let commands = match raw.build.commands {
        Some(argvs) => argvs
            .iter()
            .map(|argv| {
                BuildCommand::from_argv(argv).ok_or_else(|| {
                    DeployError::Config("build.commands entries must not be empty".to_string())
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => default_build.commands,
    };
    config.build = BuildStep {
        working_dir: raw.build.working_dir.unwrap_or(default_build.working_dir),
        commands,
    };

    if let Some(publish) = raw.publish {
        config.roots = publish
            .into_iter()
            .map(|p| ManifestRoot::new(p.source, &p.prefix))
            .collect();
    }

    let default_poll = PollPolicy::default();
    let max_attempts = raw.poll.max_attempts.unwrap_or(default_poll.max_attempts);
    if max_attempts == 0 {
        return Err(DeployError::Config("poll.max_attempts must be at least 1".to_string()).into());
    }
    config.poll = PollPolicy {
        interval: raw
            .poll
            .interval_secs
            .map(Duration::from_secs)
            .unwrap_or(default_poll.interval),
        max_attempts,
    };

    info!(
        site_name = ?config.site.name,
        build_dir = %config.build.working_dir.display(),
        roots = config.roots.len(),
        "Config loaded and merged successfully"
    );
    Ok(config)
}
