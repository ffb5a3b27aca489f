use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutopilotError {
    #[error("targets config not found: {0}")]
    TargetsNotFound(String),

    #[error("invalid targets config: {0}")]
    InvalidTargetsConfig(String),

    #[error("invalid target at index {index}: {reason}")]
    InvalidTarget { index: usize, reason: String },

    #[error("no targets configured: the 'targets' array is empty")]
    NoTargets,

    #[error("unknown service '{0}': expected one of coderabbit, claude, cursor")]
    UnknownService(String),

    #[error("missing credential: set the {0} environment variable")]
    MissingCredential(&'static str),

    #[error("dispatch rejected with status {status}: {body}")]
    DispatchRejected { status: u16, body: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AutopilotError>;
