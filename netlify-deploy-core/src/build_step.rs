use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, error, info};

use crate::contract::{BuildOutcome, BuildRunner};
use crate::error::DeployError;

/// One command of the build: a program and its arguments, run without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl BuildCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Builds a command from `[program, arg, ...]`. Returns `None` for an empty list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Where and what to build before collecting files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    pub working_dir: PathBuf,
    pub commands: Vec<BuildCommand>,
}

impl Default for BuildStep {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("frontend"),
            commands: vec![
                BuildCommand::new("npm", &["install"]),
                BuildCommand::new("npm", &["run", "build"]),
            ],
        }
    }
}

/// Runs each command in turn with inherited stdio, stopping at the first unsuccessful exit.
pub struct CommandBuildRunner {
    commands: Vec<BuildCommand>,
}

impl CommandBuildRunner {
    pub fn new(commands: Vec<BuildCommand>) -> Self {
        Self { commands }
    }
}

impl BuildRunner for CommandBuildRunner {
    fn run(&self, working_dir: &Path) -> Result<BuildOutcome, DeployError> {
        for command in &self.commands {
            let line = command.display();
            info!(command = %line, working_dir = %working_dir.display(), "[BUILD] Running build command");

            let status = Command::new(&command.program)
                .args(&command.args)
                .current_dir(working_dir)
                .status()
                .map_err(|e| {
                    error!(command = %line, error = ?e, "[BUILD] Failed to launch build command");
                    DeployError::Build(format!("failed to launch `{line}`: {e}"))
                })?;

            let outcome = BuildOutcome {
                code: status.code(),
            };
            if !outcome.success() {
                error!(command = %line, code = ?outcome.code, "[BUILD] Build command exited unsuccessfully");
                return Ok(outcome);
            }
            debug!(command = %line, "[BUILD] Build command finished");
        }
        Ok(BuildOutcome { code: Some(0) })
    }
}
