//! End-to-end behavior of `run_session` with scripted agent and provider
//! doubles: the bundle is always written, failures are recovered, and the
//! report file is never empty.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use webqa_config::Config;
use webqa_core::{run_session, AutomationAgent, TaskSpec};
use webqa_providers::{CompletionRequest, CompletionResponse, LLMProvider, Usage};

struct ScriptedAgent {
    outcome: Result<&'static str, &'static str>,
}

#[async_trait]
impl AutomationAgent for ScriptedAgent {
    async fn run(&self, _task: &str) -> anyhow::Result<String> {
        match self.outcome {
            Ok(transcript) => Ok(transcript.to_string()),
            Err(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedProvider {
    reply: Result<&'static str, &'static str>,
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, _request: CompletionRequest) -> anyhow::Result<CompletionResponse> {
        match self.reply {
            Ok(content) => Ok(CompletionResponse {
                content: content.to_string(),
                usage: Usage::default(),
                model: "scripted".to_string(),
            }),
            Err(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

fn provider(reply: Result<&'static str, &'static str>) -> ScriptedProvider {
    ScriptedProvider { reply }
}

fn config_in(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.evidence.root_dir = dir.join("evidencias").to_string_lossy().into_owned();
    config.agent.timeout_secs = 5;
    config
}

fn task() -> TaskSpec {
    TaskSpec::new(
        "Faça login em https://example.test/login e explore a aplicação",
        "https://example.test/login",
    )
}

fn read_bundle_file(dir: &std::path::Path, prefix: &str) -> Option<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .find(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with(prefix)
        })
        .map(|entry| std::fs::read_to_string(entry.path()).unwrap())
}

#[tokio::test]
async fn successful_session_writes_transcript_and_report() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let agent = ScriptedAgent {
        outcome: Ok("passo 1: login realizado com sucesso"),
    };

    let outcome = run_session(
        &config,
        &provider(Ok("RELATÓRIO: tudo funcionou, score 9/10")),
        &agent,
        &task(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(outcome.run_result.success);
    assert!(outcome.bundle_dir.is_dir());

    let evidence = read_bundle_file(&outcome.bundle_dir, "evidencias_teste_").unwrap();
    assert!(evidence.contains("TAREFA EXECUTADA"));
    assert!(evidence.contains("passo 1: login realizado com sucesso"));
    assert!(evidence.contains("RELATÓRIO: tudo funcionou"));
    assert!(evidence.contains("PROMPT DE RELATÓRIO ORIGINAL"));

    let report = read_bundle_file(&outcome.bundle_dir, "relatorio_detalhado_").unwrap();
    assert_eq!(report, "RELATÓRIO: tudo funcionou, score 9/10");
}

#[tokio::test]
async fn agent_failure_still_produces_a_bundle_with_the_error_text() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let agent = ScriptedAgent {
        outcome: Err("browser crashed on login page"),
    };

    let outcome = run_session(
        &config,
        &provider(Ok("RELATÓRIO: execução falhou")),
        &agent,
        &task(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(!outcome.run_result.success);

    // The error evidence file names the failure.
    let error_file = read_bundle_file(&outcome.bundle_dir, "erro_teste_").unwrap();
    assert!(error_file.contains("browser crashed on login page"));

    // Reporting still ran against the error text.
    let report = read_bundle_file(&outcome.bundle_dir, "relatorio_detalhado_").unwrap();
    assert!(!report.is_empty());
}

#[tokio::test]
async fn report_failure_in_best_effort_mode_writes_fallback_report() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let agent = ScriptedAgent {
        outcome: Ok("transcript"),
    };

    let outcome = run_session(
        &config,
        &provider(Err("503 Service Unavailable")),
        &agent,
        &task(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let report = read_bundle_file(&outcome.bundle_dir, "relatorio_detalhado_").unwrap();
    assert!(!report.is_empty());
    assert!(report.starts_with("Erro ao gerar relatório:"));
    assert!(report.contains("503"));
}

#[tokio::test]
async fn report_failure_in_strict_mode_aborts_but_keeps_the_transcript() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = config_in(tmp.path());
    config.report.strict = true;
    let agent = ScriptedAgent {
        outcome: Ok("transcript to preserve"),
    };

    let err = run_session(
        &config,
        &provider(Err("503 Service Unavailable")),
        &agent,
        &task(),
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.exit_code(), 5);

    // The bundle exists and holds the transcript even though the session
    // failed.
    let evidence_root = config.evidence.root_path();
    let bundle_dir = std::fs::read_dir(&evidence_root)
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    let partial = read_bundle_file(&bundle_dir, "evidencias_teste_").unwrap();
    assert!(partial.contains("transcript to preserve"));
}

#[tokio::test]
async fn two_sessions_in_the_same_second_get_distinct_bundles() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let agent = ScriptedAgent {
        outcome: Ok("transcript"),
    };
    let provider = provider(Ok("relatório"));

    let first = run_session(&config, &provider, &agent, &task(), CancellationToken::new())
        .await
        .unwrap();
    let second = run_session(&config, &provider, &agent, &task(), CancellationToken::new())
        .await
        .unwrap();

    assert_ne!(first.bundle_dir, second.bundle_dir);
}
