use chrono::{DateTime, Local};

/// The natural-language test task handed to the automation agent.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    /// Free-form instructions, including the target URL and credentials.
    pub description: String,
    /// The application URL embedded in the description, kept separately for
    /// banners and evidence headers.
    pub target_url: String,
}

impl TaskSpec {
    pub fn new(description: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            target_url: target_url.into(),
        }
    }
}

/// Outcome of one best-effort agent run.
///
/// The transcript is opaque: whatever the external agent printed. Its
/// structure is never interpreted here, only persisted and forwarded to the
/// report prompt.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub raw_transcript: String,
    pub success: bool,
    pub error: Option<String>,
}

impl RunResult {
    pub fn success(raw_transcript: String) -> Self {
        Self {
            raw_transcript,
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            raw_transcript: String::new(),
            success: false,
            error: Some(error.into()),
        }
    }

    /// The text that stands in for the execution result: the transcript on
    /// success, the error message otherwise.
    pub fn transcript_or_error(&self) -> &str {
        if self.success {
            &self.raw_transcript
        } else {
            self.error.as_deref().unwrap_or("unknown failure")
        }
    }
}

/// A synthesized prose test report. Written to disk, never re-read.
#[derive(Debug, Clone)]
pub struct Report {
    pub body: String,
    pub generated_at: DateTime<Local>,
}

impl Report {
    pub fn new(body: String) -> Self {
        Self {
            body,
            generated_at: Local::now(),
        }
    }
}
