//! Report synthesis: one LLM call turning the agent transcript into a prose
//! test report.

use chrono::Local;
use tracing::{debug, warn};
use webqa_providers::{CompletionRequest, LLMProvider};

use crate::error::QaError;
use crate::types::{Report, RunResult, TaskSpec};

/// Fixed section list every report request asks for. Kept in Portuguese to
/// match the evidence files consumed downstream.
pub const REPORT_TEMPLATE: &str = "\
1. **RESUMO DOS TESTES EXECUTADOS:** Lista de ações realizadas com status (sucesso/falha)
2. **FUNCIONALIDADES TESTADAS:** Descrição das funcionalidades exploradas
3. **PROBLEMAS IDENTIFICADOS:** Bugs ou falhas encontradas
4. **ANÁLISE DE USABILIDADE:** Facilidade de navegação e clareza
5. **ANÁLISE DE SEGURANÇA:** Funcionamento de login/logout e proteções
6. **RECOMENDAÇÕES:** Melhorias sugeridas
7. **SCORE GERAL:** Avaliação de 1-10 por aspecto e geral
8. **CENÁRIOS DE TESTE EM GHERKIN:** Cenários Given/When/Then, positivos e negativos, \
organizados por funcionalidade";

/// What to do when the report call fails. One policy, selectable per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Emit a default error report and keep going.
    BestEffort,
    /// Propagate the failure as `QaError::ReportGeneration`.
    Strict,
}

/// Build the single report prompt: template + task + raw transcript.
pub fn build_report_prompt(task: &TaskSpec, result: &RunResult) -> String {
    let now = Local::now().format("%d/%m/%Y %H:%M:%S");
    format!(
        "Gere um relatório detalhado sobre o teste realizado em {url} em {now}:\n\n\
         {template}\n\n\
         DADOS DA EXECUÇÃO:\n\
         - Tarefa: {task}\n\
         - Resultado: {result}\n\
         - Data/Hora: {now}\n\n\
         Por favor, gere um relatório completo baseado nos dados acima.",
        url = task.target_url,
        now = now,
        template = REPORT_TEMPLATE,
        task = task.description,
        result = result.transcript_or_error(),
    )
}

/// Send the report prompt once. On failure, either fall back to the default
/// error report (best-effort, body is never empty) or abort (strict).
pub async fn synthesize_report(
    provider: &dyn LLMProvider,
    prompt: &str,
    policy: FallbackPolicy,
) -> Result<Report, QaError> {
    debug!(
        "Requesting report from {} ({} chars of prompt)",
        provider.name(),
        prompt.len()
    );

    match provider.complete(CompletionRequest::from_prompt(prompt)).await {
        Ok(response) => {
            debug!(
                "Report generated: {} chars, {} tokens",
                response.content.len(),
                response.usage.completion_tokens
            );
            Ok(Report::new(response.content))
        }
        Err(e) => match policy {
            FallbackPolicy::Strict => Err(QaError::ReportGeneration(e.to_string())),
            FallbackPolicy::BestEffort => {
                warn!("Report generation failed, writing fallback report: {}", e);
                Ok(Report::new(format!("Erro ao gerar relatório: {}", e)))
            }
        },
    }
}
