//! Interactive token setup: asks for a personal access token, stores it in `.env`
//! and optionally hands over to the deploy sequence.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input};
use tracing::info;

use crate::load_config::{Credentials, TOKEN_ENV, TOKEN_HELP_URL};

pub const ENV_FILE: &str = ".env";

/// Questions asked during setup. The terminal implementation uses dialoguer.
pub trait Prompt {
    fn token(&self) -> Result<String>;
    fn confirm_deploy(&self) -> Result<bool>;
}

pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn token(&self) -> Result<String> {
        let token: String = Input::new()
            .with_prompt("Paste your Netlify token here")
            .allow_empty(true)
            .interact_text()?;
        Ok(token)
    }

    fn confirm_deploy(&self) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt("Deploy now?")
            .default(false)
            .interact()?)
    }
}

#[derive(Debug)]
pub enum SetupOutcome {
    /// Nothing was entered; the env file is untouched.
    NoToken,
    Saved {
        credentials: Credentials,
        deploy_now: bool,
    },
}

/// Runs the setup questions against `prompt`, writing the token to `env_file`.
pub fn run_setup<P: Prompt>(prompt: &P, env_file: &Path) -> Result<SetupOutcome> {
    println!("Netlify Token Setup");
    println!("===================");
    println!();
    println!("To deploy automatically you need a Netlify personal access token.");
    println!("  1. Go to: {TOKEN_HELP_URL}");
    println!("  2. Click \"New access token\" and give it a name");
    println!("  3. Copy the token");
    println!();

    let token = prompt.token()?;
    let token = token.trim();
    if token.is_empty() {
        println!("No token provided. Run `netlify-deploy setup` again with a valid token.");
        return Ok(SetupOutcome::NoToken);
    }

    save_token(env_file, token)?;
    info!(env_file = %env_file.display(), token_len = token.len(), "Token saved");
    println!("Token saved to {}", env_file.display());
    println!("Deploy any time with: netlify-deploy deploy");

    let deploy_now = prompt.confirm_deploy()?;
    Ok(SetupOutcome::Saved {
        credentials: Credentials::new(token),
        deploy_now,
    })
}

/// Writes `NETLIFY_TOKEN=<token>` into a key=value file, replacing an existing
/// entry and keeping every other line.
pub fn save_token(env_file: &Path, token: &str) -> Result<()> {
    let existing = match fs::read_to_string(env_file) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", env_file.display()))
        }
    };

    let entry = format!("{TOKEN_ENV}={token}");
    let mut replaced = false;
    let mut lines: Vec<String> = existing
        .lines()
        .map(|line| {
            if is_token_line(line) {
                replaced = true;
                entry.clone()
            } else {
                line.to_string()
            }
        })
        .collect();
    if !replaced {
        lines.push(entry);
    }

    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(env_file, content).with_context(|| format!("failed to write {}", env_file.display()))
}

fn is_token_line(line: &str) -> bool {
    let line = line.trim_start();
    let line = line.strip_prefix("export ").unwrap_or(line);
    line.split_once('=')
        .is_some_and(|(key, _)| key.trim() == TOKEN_ENV)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::tempdir;

    struct ScriptedPrompt {
        token: &'static str,
        deploy: bool,
        confirm_asked: Cell<bool>,
    }

    impl Prompt for ScriptedPrompt {
        fn token(&self) -> Result<String> {
            Ok(self.token.to_string())
        }

        fn confirm_deploy(&self) -> Result<bool> {
            self.confirm_asked.set(true);
            Ok(self.deploy)
        }
    }

    #[test]
    fn save_token_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        save_token(&path, "abc").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "NETLIFY_TOKEN=abc\n");
    }

    #[test]
    fn save_token_replaces_entry_and_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "API_URL=http://x\nNETLIFY_TOKEN=old\nOTHER=1\n").unwrap();

        save_token(&path, "new").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "API_URL=http://x\nNETLIFY_TOKEN=new\nOTHER=1\n"
        );
    }

    #[test]
    fn save_token_does_not_touch_similar_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "NETLIFY_TOKEN_OLD=keep").unwrap();

        save_token(&path, "t").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "NETLIFY_TOKEN_OLD=keep\nNETLIFY_TOKEN=t\n"
        );
    }

    #[test]
    fn blank_token_writes_nothing_and_skips_deploy_question() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        let prompt = ScriptedPrompt {
            token: "   ",
            deploy: true,
            confirm_asked: Cell::new(false),
        };

        let outcome = run_setup(&prompt, &path).unwrap();

        assert!(matches!(outcome, SetupOutcome::NoToken));
        assert!(!path.exists());
        assert!(!prompt.confirm_asked.get());
    }

    #[test]
    fn token_is_trimmed_saved_and_returned() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        let prompt = ScriptedPrompt {
            token: "  tok-123 \n",
            deploy: true,
            confirm_asked: Cell::new(false),
        };

        let outcome = run_setup(&prompt, &path).unwrap();

        match outcome {
            SetupOutcome::Saved {
                credentials,
                deploy_now,
            } => {
                assert_eq!(credentials.token(), "tok-123");
                assert!(deploy_now);
            }
            other => panic!("expected saved outcome, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "NETLIFY_TOKEN=tok-123\n");
    }
}
