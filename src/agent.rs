//! Agent boundary and the SQL ReAct agent
//!
//! The session only sees `Agent::run(prompt, dataset) -> answer`. `SqlAgent` implements it
//! with a ReAct loop: the model alternates Pensamento / Ação / Entrada da Ação, each action
//! runs a SQL query against the active table (registered as `df`) and the result is fed
//! back as an Observação until the model produces a Resposta Final.

use crate::config::AgentConfig;
use crate::dataset::DatasetContext;
use crate::error::{AgentError, Result};
use crate::llm::{ChatMessage, LlmClient};
use crate::prompt::{agent_template, render_template, TABLE_NAME};
use crate::table::Table;
use async_trait::async_trait;
use lazy_static::lazy_static;
use polars::prelude::*;
use polars::sql::SQLContext;
use regex::Regex;
use tracing::{debug, info, warn};

pub const SQL_TOOL: &str = "sql_query";
const OBSERVATION_STOP: &str = "\nObservação:";

lazy_static! {
    static ref ACTION_RE: Regex = Regex::new(r"(?m)^\s*Ação\s*:\s*(.+?)\s*$").unwrap();
    static ref ACTION_INPUT_RE: Regex = Regex::new(r"(?s)Entrada da Ação\s*:\s*(.*)").unwrap();
    static ref FINAL_RE: Regex = Regex::new(r"(?s)Resposta Final\s*:\s*(.*)").unwrap();
}

/// Opaque question-answering capability over the active dataset
#[async_trait]
pub trait Agent: Send + Sync {
    async fn run(&self, prompt: &str, dataset: &DatasetContext) -> Result<String>;
}

/// Chat model seam, so the ReAct loop can run without the network
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], stop: &[&str]) -> Result<String>;
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, messages: &[ChatMessage], stop: &[&str]) -> Result<String> {
        self.call_llm(messages, stop).await
    }
}

/// One parsed model turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    Action { tool: String, input: String },
    Final(String),
}

pub fn parse_step(output: &str) -> Result<AgentStep> {
    let action = ACTION_RE.captures(output);
    let final_answer = FINAL_RE.captures(output);

    let action_start = action.as_ref().and_then(|c| c.get(0)).map(|m| m.start());
    let final_start = final_answer.as_ref().and_then(|c| c.get(0)).map(|m| m.start());

    let final_first = match (final_start, action_start) {
        (Some(f), Some(a)) => f < a,
        (Some(_), None) => true,
        _ => false,
    };

    if final_first {
        let answer = final_answer
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        return Ok(AgentStep::Final(answer));
    }

    if let Some(action) = action {
        let tool = action.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
        let input = ACTION_INPUT_RE
            .captures(output)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or("");
        // the model sometimes invents its own observation
        let input = input.split("Observação:").next().unwrap_or("");
        return Ok(AgentStep::Action {
            tool,
            input: clean_sql(input),
        });
    }

    Err(AgentError::AgentExecution(format!(
        "Could not parse agent output: {}",
        output.trim()
    )))
}

fn clean_sql(raw: &str) -> String {
    raw.trim()
        .trim_start_matches("```sql")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
        .trim_end_matches(';')
        .trim()
        .to_string()
}

/// Run a SQL query over the whole table
pub fn execute_sql(table: &Table, sql: &str) -> Result<DataFrame> {
    let mut ctx = SQLContext::new();
    ctx.register(TABLE_NAME, table.frame().clone().lazy());
    let result = ctx.execute(sql)?.collect()?;
    Ok(result)
}

fn observe(table: &Table, tool: &str, input: &str) -> String {
    if tool != SQL_TOOL {
        return format!("Ferramenta desconhecida '{}'. Use {}.", tool, SQL_TOOL);
    }
    match execute_sql(table, input) {
        Ok(df) => format!("{} linha(s)\n{}", df.height(), df),
        Err(e) => {
            warn!("SQL tool failed: {}", e);
            format!("Erro ao executar a consulta: {}", e)
        }
    }
}

pub fn tool_description() -> String {
    format!(
        "{}: executa uma consulta SQL sobre a tabela completa `{}` e devolve o resultado. \
         A entrada deve ser uma única consulta SELECT.",
        SQL_TOOL, TABLE_NAME
    )
}

pub struct SqlAgent<M: ChatModel = LlmClient> {
    model: M,
    max_steps: usize,
}

impl SqlAgent<LlmClient> {
    /// Checks the credential before any client is constructed
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let client = LlmClient::from_config(config)?;
        info!("Agent ready (model {}, max {} steps)", client.model(), config.max_steps);
        Ok(Self::new(client, config.max_steps))
    }
}

impl<M: ChatModel> SqlAgent<M> {
    pub fn new(model: M, max_steps: usize) -> Self {
        Self {
            model,
            max_steps: max_steps.max(1),
        }
    }
}

#[async_trait]
impl<M: ChatModel> Agent for SqlAgent<M> {
    async fn run(&self, prompt: &str, dataset: &DatasetContext) -> Result<String> {
        let template = agent_template(dataset.kind);
        let tools = tool_description();
        let mut scratchpad = String::new();

        for step in 1..=self.max_steps {
            let rendered = render_template(&template, &tools, prompt, &scratchpad);
            let output = self
                .model
                .complete(&[ChatMessage::user(rendered)], &[OBSERVATION_STOP])
                .await?;

            match parse_step(&output)? {
                AgentStep::Final(answer) => {
                    info!("Agent answered after {} step(s)", step);
                    return Ok(answer);
                }
                AgentStep::Action { tool, input } => {
                    debug!("Step {}: {} <- {}", step, tool, input);
                    let observation = observe(&dataset.table, &tool, &input);
                    scratchpad.push_str(output.trim_end());
                    scratchpad.push_str("\nObservação: ");
                    scratchpad.push_str(&observation);
                    scratchpad.push_str("\nPensamento: ");
                }
            }
        }

        Err(AgentError::AgentExecution(format!(
            "Agent stopped after {} steps without a final answer",
            self.max_steps
        )))
    }
}
