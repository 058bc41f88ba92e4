use std::time::Duration;

use thiserror::Error;

/// Failure taxonomy for a QA session.
///
/// Credential and backend errors are fatal and reported before any network
/// call. Agent and report failures are recovered locally (the session still
/// produces an evidence bundle). I/O failures while writing evidence are
/// fatal: losing the bundle defeats the point of the run.
#[derive(Debug, Error)]
pub enum QaError {
    #[error("credential for backend '{backend}' is missing or a placeholder")]
    MissingCredential { backend: String },

    #[error("unknown backend '{0}' (supported: gemini, gpt, deepseek)")]
    UnknownBackend(String),

    #[error("agent execution failed: {0}")]
    AgentExecution(String),

    #[error("report generation failed: {0}")]
    ReportGeneration(String),

    #[error("agent run timed out after {0:?}")]
    Timeout(Duration),

    #[error("evidence I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl QaError {
    /// Process exit code for this failure kind, distinct per kind so CI can
    /// tell selection errors from runtime ones.
    pub fn exit_code(&self) -> i32 {
        match self {
            QaError::MissingCredential { .. } | QaError::UnknownBackend(_) => 2,
            QaError::AgentExecution(_) => 3,
            QaError::Timeout(_) => 4,
            QaError::ReportGeneration(_) => 5,
            QaError::Io(_) => 6,
        }
    }
}
