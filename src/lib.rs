pub mod agent;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod join_key;
pub mod llm;
pub mod merge;
pub mod prompt;
pub mod query;
pub mod responder;
pub mod session;
pub mod table;
pub mod workspace;

pub use agent::{Agent, SqlAgent};
pub use config::AgentConfig;
pub use dataset::{AssemblyReport, DatasetContext, DatasetKind, UploadedArtifact};
pub use error::{AgentError, Result};
pub use query::{classify_query, CasualKind, QueryClass};
pub use session::{Reply, Session};
pub use table::Table;
pub use workspace::Workspace;
