//! The one orchestration path: run the agent, synthesize the report, write
//! the evidence bundle. Every backend goes through this same function.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use webqa_config::Config;
use webqa_providers::LLMProvider;

use crate::agent::AutomationAgent;
use crate::error::QaError;
use crate::evidence::EvidenceBundle;
use crate::report::{build_report_prompt, synthesize_report, FallbackPolicy};
use crate::runner::AgentRunner;
use crate::types::{Report, RunResult, TaskSpec};

/// Everything a finished session leaves behind, besides the files on disk.
#[derive(Debug)]
pub struct SessionOutcome {
    pub bundle_dir: PathBuf,
    pub run_result: RunResult,
    pub report: Report,
    pub report_path: PathBuf,
}

/// Run one QA session end to end.
///
/// Strictly linear: agent run → report call → evidence write, each awaited in
/// turn. Agent failures and (in best-effort mode) report failures do not
/// abort; the bundle is always written. Only credential resolution upstream,
/// strict-mode report failure and evidence I/O can return an error — and even
/// the strict failure writes the transcript first, so partial results are
/// never lost.
pub async fn run_session(
    config: &Config,
    provider: &dyn LLMProvider,
    agent: &dyn AutomationAgent,
    task: &TaskSpec,
    cancellation_token: CancellationToken,
) -> Result<SessionOutcome, QaError> {
    let backend = provider.name().to_string();

    let bundle = EvidenceBundle::create(&config.evidence.root_path(), &backend)?;
    let timestamp = bundle.timestamp().to_string();

    info!(
        "Starting QA session: backend={}, agent={}, target={}",
        backend,
        agent.name(),
        task.target_url
    );

    let runner = AgentRunner::new(Duration::from_secs(config.agent.timeout_secs));
    let run_result = runner.run(agent, task, cancellation_token).await;

    if let Some(ref error) = run_result.error {
        warn!("Agent run failed, recording error evidence: {}", error);
        let error_evidence = format!(
            "ERRO NO TESTE - {}\n\nTAREFA: {}\nERRO: {}\n",
            Local::now().format("%d/%m/%Y %H:%M:%S"),
            task.description,
            error,
        );
        bundle.write_text(&format!("erro_teste_{}", timestamp), &error_evidence)?;
    }

    let prompt = build_report_prompt(task, &run_result);
    let policy = if config.report.strict {
        FallbackPolicy::Strict
    } else {
        FallbackPolicy::BestEffort
    };

    let report = match synthesize_report(provider, &prompt, policy).await {
        Ok(report) => report,
        Err(e) => {
            // Strict mode: keep the transcript on disk before bailing out.
            let partial = format!(
                "TESTE INTERROMPIDO - {}\n\nTAREFA: {}\nRESULTADO: {}\n",
                Local::now().format("%d/%m/%Y %H:%M:%S"),
                task.description,
                run_result.transcript_or_error(),
            );
            bundle.write_text(&format!("evidencias_teste_{}", timestamp), &partial)?;
            return Err(e);
        }
    };

    let evidence_content = format!(
        "TESTE AUTOMATIZADO - {url}\n\
         Data/Hora: {now}\n\
         Timestamp: {timestamp}\n\
         Backend: {backend}\n\n\
         TAREFA EXECUTADA:\n{task}\n\n\
         RESULTADO DA EXECUÇÃO:\n{result}\n\n\
         RELATÓRIO DETALHADO:\n{report}\n\n\
         PROMPT DE RELATÓRIO ORIGINAL:\n{prompt}\n",
        url = task.target_url,
        now = report.generated_at.format("%d/%m/%Y %H:%M:%S"),
        timestamp = timestamp,
        backend = backend,
        task = task.description,
        result = run_result.transcript_or_error(),
        report = report.body,
        prompt = prompt,
    );

    bundle.write_text(&format!("evidencias_teste_{}", timestamp), &evidence_content)?;
    let report_path =
        bundle.write_text(&format!("relatorio_detalhado_{}", timestamp), &report.body)?;

    info!(
        "Session complete (success: {}), evidence in {}",
        run_result.success,
        bundle.dir().display()
    );

    Ok(SessionOutcome {
        bundle_dir: bundle.dir().to_path_buf(),
        run_result,
        report,
        report_path,
    })
}
