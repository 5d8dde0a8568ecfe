//! Error type shared by every deploy step.

/// Everything that can stop a deploy.
///
/// None of these are retried automatically; the orchestrator returns the
/// first one it meets and the CLI turns it into exit status 1.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Missing credential or unusable configuration. Raised before any work starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// The build command could not be launched or exited unsuccessfully.
    #[error("build failed: {0}")]
    Build(String),

    /// The hosting API answered with a non-success status. `body` is the
    /// provider's payload, untouched.
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    /// The request never produced an HTTP response, or the response could not be decoded.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider reported the deploy in state `error`.
    #[error("deployment failed: {0}")]
    Deployment(String),

    /// The deploy never reached a terminal state within the attempt ceiling.
    #[error("deployment timed out after {attempts} status checks")]
    Timeout { attempts: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
