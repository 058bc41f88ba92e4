pub mod agent;
pub mod backends;
pub mod error;
pub mod evidence;
pub mod report;
pub mod runner;
pub mod session;
pub mod tasks;
pub mod types;

pub use agent::{AutomationAgent, CommandAgent};
pub use backends::{build_provider, build_registry, BackendKind};
pub use error::QaError;
pub use evidence::{decode_screenshot, EvidenceBundle};
pub use report::{build_report_prompt, synthesize_report, FallbackPolicy, REPORT_TEMPLATE};
pub use runner::AgentRunner;
pub use session::{run_session, SessionOutcome};
pub use tasks::{task_for, Scenario};
pub use types::{Report, RunResult, TaskSpec};
