use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use webqa_config::Config;
use webqa_core::{
    backends, build_provider, build_registry, run_session, task_for, BackendKind, CommandAgent,
    QaError, Scenario, TaskSpec,
};
use webqa_providers::{mask_key, CompletionRequest};

/// Liveness prompt used by `check --probe`.
const PROBE_PROMPT: &str = "Olá! Você está funcionando? Responda apenas 'Sim, estou funcionando!'";

#[derive(Parser)]
#[command(
    name = "webqa",
    version,
    about = "Autonomous web-QA sessions: browser agent + LLM test report"
)]
struct Cli {
    /// Config file (default: ./webqa.yaml, then the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// LLM backend: gemini, gpt or deepseek
    #[arg(long, global = true)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one QA session and write an evidence bundle
    Run(RunArgs),
    /// Check which backends are configured
    Check(CheckArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Task preset: login, flows or full
    #[arg(long, default_value = "full")]
    scenario: String,

    /// Free-form task text (overrides --scenario)
    #[arg(long)]
    task: Option<String>,

    /// Evidence root directory (overrides config)
    #[arg(long)]
    evidence_dir: Option<String>,

    /// Agent timeout in seconds (overrides config)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Abort instead of writing a fallback report when the report call fails
    #[arg(long)]
    strict_report: bool,
}

#[derive(Args)]
struct CheckArgs {
    /// Send a liveness prompt through each configured backend
    #[arg(long)]
    probe: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {}", e);
            match e.downcast_ref::<QaError>() {
                Some(qa) => qa.exit_code(),
                None => 1,
            }
        }
    };
    std::process::exit(code);
}

async fn execute(cli: Cli) -> Result<i32> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let backend = cli
        .backend
        .as_deref()
        .map(str::parse::<BackendKind>)
        .transpose()?;

    match cli.command {
        Command::Run(args) => run_command(config, backend, args).await,
        Command::Check(args) => check_command(config, args).await,
    }
}

async fn run_command(
    mut config: Config,
    backend: Option<BackendKind>,
    args: RunArgs,
) -> Result<i32> {
    if let Some(dir) = args.evidence_dir {
        config.evidence.root_dir = dir;
    }
    if let Some(secs) = args.timeout_secs {
        config.agent.timeout_secs = secs;
    }
    if args.strict_report {
        config.report.strict = true;
    }

    let registry = build_registry(&config, backend)?;
    let provider = registry.get(None)?;

    let kind: BackendKind = provider.name().parse()?;
    let entry = backends::backend_entry(&config, kind);
    if let Some(key) = entry.effective_key() {
        println!("🤖 Usando {}: {}", provider.name(), provider.model());
        println!("🔑 Chave encontrada: {}", mask_key(key));
    }

    let task = match args.task {
        Some(text) => TaskSpec::new(text, config.target.url.clone()),
        None => {
            let scenario: Scenario = args
                .scenario
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            task_for(scenario, &config.target)
        }
    };
    println!("🎯 Tarefa: {}", preview(&task.description, 100));

    let agent = CommandAgent::new(&config.agent);
    let cancellation_token = CancellationToken::new();
    let ctrl_c_token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Ctrl-C received, cancelling agent run");
            ctrl_c_token.cancel();
        }
    });

    let outcome = run_session(&config, provider, &agent, &task, cancellation_token).await?;

    println!("📁 Evidências salvas em: {}", outcome.bundle_dir.display());
    println!("📄 Relatório: {}", preview(&outcome.report.body, 200));

    if outcome.run_result.success {
        println!("✅ Teste concluído com sucesso!");
        Ok(0)
    } else {
        let error = outcome
            .run_result
            .error
            .unwrap_or_else(|| "unknown failure".to_string());
        eprintln!("❌ Erro durante execução: {}", error);
        let code = if error.contains("timed out") {
            QaError::Timeout(std::time::Duration::ZERO).exit_code()
        } else {
            QaError::AgentExecution(error).exit_code()
        };
        Ok(code)
    }
}

async fn check_command(config: Config, args: CheckArgs) -> Result<i32> {
    let mut any_configured = false;

    for kind in BackendKind::ALL {
        let entry = backends::backend_entry(&config, kind);
        match entry.effective_key() {
            None => println!("❌ {}: não configurada", kind),
            Some(key) => {
                any_configured = true;
                let provider = build_provider(&config, kind)?;
                println!(
                    "✅ {}: chave {} (modelo {})",
                    kind,
                    mask_key(key),
                    provider.model()
                );

                if args.probe {
                    match provider
                        .complete(CompletionRequest::from_prompt(PROBE_PROMPT))
                        .await
                    {
                        Ok(response) => {
                            println!("   📝 Resposta: {}", preview(&response.content, 120))
                        }
                        Err(e) => println!("   ⚠️  Falha na chamada: {}", e),
                    }
                }
            }
        }
    }

    if any_configured {
        Ok(0)
    } else {
        println!("⚠️  Nenhuma API configurada corretamente!");
        Ok(QaError::MissingCredential {
            backend: config.default_backend.clone(),
        }
        .exit_code())
    }
}

/// First `max` characters of a string, with an ellipsis when truncated.
fn preview(text: &str, max: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(max).collect();
        format!("{}...", head)
    }
}
