//! Capability interface to the external browser-automation agent.
//!
//! All browsing, page inspection and step planning live in an external
//! program. This module only knows how to hand it a task and collect the
//! textual transcript it produces.

use anyhow::Result;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;
use webqa_config::AgentConfig;

/// An autonomous agent that executes a natural-language task and returns a
/// free-form transcript. Single call, no cancellation support of its own and
/// no partial-progress checkpointing; the runner layers timeout and
/// cancellation on top.
#[async_trait]
pub trait AutomationAgent: Send + Sync {
    async fn run(&self, task: &str) -> Result<String>;

    fn name(&self) -> &str;
}

/// Runs the configured agent executable as a subprocess, passing the task as
/// the final argument and reading the transcript from stdout.
pub struct CommandAgent {
    command: String,
    args: Vec<String>,
}

impl CommandAgent {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            command: shellexpand::tilde(&config.command).into_owned(),
            args: config.args.clone(),
        }
    }
}

#[async_trait]
impl AutomationAgent for CommandAgent {
    async fn run(&self, task: &str) -> Result<String> {
        debug!(
            "Spawning automation agent: {} ({} args)",
            self.command,
            self.args.len()
        );

        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(task)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| anyhow::anyhow!("failed to spawn agent '{}': {}", self.command, e))?;

        let transcript = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = last_lines(&stderr, 10);
            anyhow::bail!(
                "agent '{}' exited with {:?}: {}",
                self.command,
                output.status.code(),
                detail
            );
        }

        if transcript.trim().is_empty() {
            anyhow::bail!("agent '{}' produced an empty transcript", self.command);
        }

        debug!("Agent transcript: {} bytes", transcript.len());
        Ok(transcript)
    }

    fn name(&self) -> &str {
        &self.command
    }
}

/// Keep only the tail of the agent's stderr for error messages; the full
/// stream can be megabytes of browser noise.
fn last_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(count);
    let tail = lines[start..].join("\n");
    if tail.trim().is_empty() {
        "(no stderr)".to_string()
    } else {
        tail
    }
}
