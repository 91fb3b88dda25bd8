use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Required cabeçalho/itens files not found among archive entries: {files:?}. Columns per file: {columns:?}")]
    ClassificationFailure {
        files: Vec<String>,
        /// Column names of every entry that loaded as a table
        columns: BTreeMap<String, Vec<String>>,
    },

    #[error(
        "No common column to merge on. Header columns: {header_columns:?}, items columns: {items_columns:?}"
    )]
    JoinKeyFailure {
        header_columns: Vec<String>,
        items_columns: Vec<String>,
    },

    #[error("Merge error: {0}")]
    Merge(String),

    #[error("Credential missing: {0}")]
    CredentialMissing(String),

    #[error("Agent execution error: {0}")]
    AgentExecution(String),

    #[error("Empty question")]
    EmptyQuestion,

    #[error("No dataset loaded")]
    NoDataset,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(String),
}

impl AgentError {
    /// Errors the user can recover from inside the same session, without re-uploading
    /// data or fixing credentials.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AgentError::AgentExecution(_) | AgentError::EmptyQuestion)
    }

    /// Short hint shown next to the error message.
    pub fn user_hint(&self) -> Option<&'static str> {
        match self {
            AgentError::AgentExecution(_) | AgentError::CredentialMissing(_) => {
                Some("Verifique se sua API key está correta no arquivo .env")
            }
            AgentError::EmptyQuestion => Some("Por favor, pergunte alguma coisa antes!"),
            AgentError::ClassificationFailure { .. } | AgentError::JoinKeyFailure { .. } => {
                Some("Envie um ZIP com um CSV de cabeçalho e um CSV de itens")
            }
            _ => None,
        }
    }
}

impl From<polars::error::PolarsError> for AgentError {
    fn from(err: polars::error::PolarsError) -> Self {
        AgentError::Polars(err.to_string())
    }
}

impl From<zip::result::ZipError> for AgentError {
    fn from(err: zip::result::ZipError) -> Self {
        AgentError::Archive(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_agent_and_empty_question_are_recoverable() {
        assert!(AgentError::AgentExecution("timeout".to_string()).is_recoverable());
        assert!(AgentError::EmptyQuestion.is_recoverable());
        assert!(!AgentError::CredentialMissing("GOOGLE_API_KEY".to_string()).is_recoverable());
        assert!(!AgentError::ClassificationFailure {
            files: vec![],
            columns: BTreeMap::new(),
        }
        .is_recoverable());
        assert!(!AgentError::Merge("key".to_string()).is_recoverable());
    }

    #[test]
    fn test_classification_failure_lists_files_and_columns() {
        let mut columns = BTreeMap::new();
        columns.insert("vendas.csv".to_string(), vec!["a".to_string(), "b".to_string()]);
        let err = AgentError::ClassificationFailure {
            files: vec!["vendas.csv".to_string()],
            columns,
        };
        let msg = err.to_string();
        assert!(msg.contains("vendas.csv"));
        assert!(msg.contains("\"a\""));
        assert!(msg.contains("\"b\""));
    }

    #[test]
    fn test_join_key_failure_lists_both_column_sets() {
        let err = AgentError::JoinKeyFailure {
            header_columns: vec!["a".to_string()],
            items_columns: vec!["b".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("\"a\""));
        assert!(msg.contains("\"b\""));
    }
}
