//! Built-in task presets, parameterized by the target application and login
//! account from the config.

use std::fmt;
use std::str::FromStr;

use webqa_config::TargetConfig;

use crate::types::TaskSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    /// Smoke test: log in and confirm it worked.
    Login,
    /// Exercise the loan, return and reservation flows.
    Flows,
    /// Full exploration plus Gherkin scenario generation.
    #[default]
    Full,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Login => "login",
            Scenario::Flows => "flows",
            Scenario::Full => "full",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "login" => Ok(Scenario::Login),
            "flows" => Ok(Scenario::Flows),
            "full" => Ok(Scenario::Full),
            other => Err(format!(
                "unknown scenario '{}' (supported: login, flows, full)",
                other
            )),
        }
    }
}

/// Build the task text for a preset against the configured target.
pub fn task_for(scenario: Scenario, target: &TargetConfig) -> TaskSpec {
    let description = match scenario {
        Scenario::Login => format!(
            "Faça um login nesse site {url} e me diga se o login foi feito com sucesso. \
             Usuário é {email} e a senha é {password}.",
            url = target.url,
            email = target.email,
            password = target.password,
        ),
        Scenario::Flows => format!(
            "Execute login em {url} com email: {email} e senha: {password}. \
             Realize empréstimos de livros, devolva os livros e confirme se foi realizado com sucesso. \
             E reserve um livro para ver se foi realizado com sucesso. \
             Seja autônomo e tome decisões inteligentes durante a navegação. \
             Essa aplicação não é muito responsiva, talvez seja necessário realizar scroll \
             para baixo ou para o lado para encontrar o que deseja.",
            url = target.url,
            email = target.email,
            password = target.password,
        ),
        Scenario::Full => format!(
            "Analise completamente a aplicação em {url}. \
             Realize login com email: {email} e senha: {password}. \
             Explore todas as funcionalidades disponíveis: navegação, empréstimos, devoluções, \
             reservas, perfil do usuário, etc. \
             Teste diferentes cenários: buscar livros, filtrar, ordenar, paginar, etc. \
             Identifique todas as funcionalidades e fluxos da aplicação. \
             Gere cenários de teste em formato Gherkin (Given-When-Then) para cada \
             funcionalidade descoberta, incluindo cenários positivos e negativos. \
             Organize os cenários por funcionalidade e seja detalhado, cobrindo todos os \
             casos de uso possíveis.",
            url = target.url,
            email = target.email,
            password = target.password,
        ),
    };

    TaskSpec::new(description, target.url.clone())
}
