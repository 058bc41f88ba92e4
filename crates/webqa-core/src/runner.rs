//! Single best-effort execution of the automation agent.
//!
//! One attempt per session: no retries, no backoff. Every failure mode is
//! folded into a `RunResult` so the session always reaches the evidence
//! writer with something to persist.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::agent::AutomationAgent;
use crate::error::QaError;
use crate::types::{RunResult, TaskSpec};

pub struct AgentRunner {
    timeout: Duration,
}

impl AgentRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run the agent once. Never returns an error: agent failures, timeouts
    /// and cancellation all become a failed `RunResult`.
    pub async fn run(
        &self,
        agent: &dyn AutomationAgent,
        task: &TaskSpec,
        cancellation_token: CancellationToken,
    ) -> RunResult {
        debug!(
            "Running agent '{}' with {}s timeout",
            agent.name(),
            self.timeout.as_secs()
        );
        let start = Instant::now();

        let result = tokio::select! {
            result = tokio::time::timeout(self.timeout, agent.run(&task.description)) => {
                match result {
                    Ok(Ok(transcript)) => RunResult::success(transcript),
                    Ok(Err(e)) => {
                        warn!("Agent run failed: {}", e);
                        RunResult::failure(QaError::AgentExecution(e.to_string()).to_string())
                    }
                    Err(_) => {
                        warn!("Agent run timed out after {:?}", self.timeout);
                        RunResult::failure(QaError::Timeout(self.timeout).to_string())
                    }
                }
            }
            _ = cancellation_token.cancelled() => {
                warn!("Agent run cancelled by user");
                RunResult::failure("agent run cancelled by user")
            }
        };

        debug!(
            "Agent run finished in {:.1}s (success: {})",
            start.elapsed().as_secs_f64(),
            result.success
        );
        result
    }
}
