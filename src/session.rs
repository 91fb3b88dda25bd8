//! Session - one user's upload and conversation
//!
//! Owns the workspace, the active dataset and the agent handle. Loading new data replaces
//! the dataset wholesale. Questions are classified first: small talk never reaches the
//! agent, data questions are enriched before they do.

use crate::agent::Agent;
use crate::dataset::{assemble, load_upload, AssemblyReport, DatasetContext};
use crate::error::{AgentError, Result};
use crate::prompt::enrich_query;
use crate::query::{classify_query, CasualKind, QueryClass};
use crate::responder::CasualResponder;
use crate::workspace::Workspace;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Reply {
    /// Produced by the agent
    Answer(String),
    /// Canned small-talk reply
    Casual { kind: CasualKind, text: String },
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Answer(text) => text,
            Reply::Casual { text, .. } => text,
        }
    }
}

pub struct Session<R: Rng = StdRng> {
    id: Uuid,
    workspace: Workspace,
    dataset: Option<DatasetContext>,
    agent: Option<Box<dyn Agent>>,
    responder: CasualResponder<R>,
}

impl Session<StdRng> {
    pub fn new(workspace: Workspace) -> Self {
        Self::with_responder(workspace, CasualResponder::from_entropy())
    }
}

impl<R: Rng> Session<R> {
    pub fn with_responder(workspace: Workspace, responder: CasualResponder<R>) -> Self {
        let id = Uuid::new_v4();
        info!("Session {} using {}", id, workspace.dir().display());
        Self {
            id,
            workspace,
            dataset: None,
            agent: None,
            responder,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn dataset(&self) -> Option<&DatasetContext> {
        self.dataset.as_ref()
    }

    pub fn set_agent(&mut self, agent: Box<dyn Agent>) {
        self.agent = Some(agent);
    }

    /// Load a CSV or ZIP and make it the active dataset.
    /// On failure the previous dataset, if any, is kept.
    pub fn load(&mut self, path: &Path) -> Result<AssemblyReport> {
        let artifact = load_upload(&self.workspace, path)?;
        let assembly = assemble(artifact, &self.workspace)?;
        info!(
            "Session {} dataset ready: {} rows x {} cols ({:?})",
            self.id, assembly.context.total_rows, assembly.context.total_cols, assembly.context.kind
        );
        self.dataset = Some(assembly.context);
        Ok(assembly.report)
    }

    pub async fn ask(&mut self, question: &str) -> Result<Reply> {
        if question.trim().is_empty() {
            return Err(AgentError::EmptyQuestion);
        }
        let dataset = self.dataset.as_ref().ok_or(AgentError::NoDataset)?;

        match classify_query(question) {
            QueryClass::Casual(kind) => {
                let text = self.responder.respond(kind).to_string();
                Ok(Reply::Casual { kind, text })
            }
            QueryClass::DataQuery => {
                let agent = self.agent.as_ref().ok_or_else(|| {
                    AgentError::CredentialMissing("Agent not configured for this session".to_string())
                })?;
                let prompt = enrich_query(question, dataset);
                match agent.run(&prompt, dataset).await {
                    Ok(answer) => Ok(Reply::Answer(answer)),
                    Err(AgentError::AgentExecution(msg)) => Err(AgentError::AgentExecution(msg)),
                    Err(other) => {
                        warn!("Agent failed: {}", other);
                        Err(AgentError::AgentExecution(other.to_string()))
                    }
                }
            }
        }
    }

    /// Delete the workspace and forget the dataset
    pub fn cleanup(&mut self) -> Result<bool> {
        self.dataset = None;
        self.workspace.cleanup()
    }
}
