//! Dataset assembly
//!
//! Turns an upload into the table the agent will query:
//! - single CSV: used as-is
//! - ZIP: classify entries -> resolve join key -> inner join -> persist merged CSV
//!
//! Missing roles and missing common columns halt the upload; the errors carry the file
//! names or column lists the user needs to fix the archive.

use crate::classifier::{classify_files, ClassifiedFiles};
use crate::error::{AgentError, Result};
use crate::join_key::{resolve_join_key, JoinPlan};
use crate::merge::merge_tables;
use crate::table::Table;
use crate::workspace::Workspace;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub enum UploadedArtifact {
    SingleTable { name: String, table: Table },
    /// `names` keeps archive order; `tables` holds the entries that loaded as CSV
    Archive {
        names: Vec<String>,
        tables: BTreeMap<String, Table>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DatasetKind {
    Single,
    MergedInvoices,
}

/// The table currently answering questions. Replaced, never mutated, on a new upload.
#[derive(Debug, Clone)]
pub struct DatasetContext {
    pub table: Table,
    pub total_rows: usize,
    pub total_cols: usize,
    pub kind: DatasetKind,
    /// CSV backing the table, when it lives on disk
    pub source_path: Option<PathBuf>,
}

impl DatasetContext {
    pub fn new(table: Table, kind: DatasetKind) -> Self {
        Self {
            total_rows: table.row_count(),
            total_cols: table.col_count(),
            table,
            kind,
            source_path: None,
        }
    }

    pub fn with_source(mut self, path: PathBuf) -> Self {
        self.source_path = Some(path);
        self
    }
}

/// Shape of one input table, for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub rows: usize,
    pub columns: Vec<String>,
}

impl TableSummary {
    fn of(name: &str, table: &Table) -> Self {
        Self {
            name: name.to_string(),
            rows: table.row_count(),
            columns: table.columns(),
        }
    }
}

/// What the assembly step found, in the order it found it
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssemblyReport {
    pub files: Vec<String>,
    pub header: Option<TableSummary>,
    pub items: Option<TableSummary>,
    pub join_plan: Option<JoinPlan>,
    pub merged_rows: Option<usize>,
    pub merged_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub context: DatasetContext,
    pub report: AssemblyReport,
}

/// Copy an uploaded file into the workspace and load it. `.zip` files are extracted and
/// every `.csv` entry is loaded; anything else is read as a single CSV.
pub fn load_upload(workspace: &Workspace, path: &Path) -> Result<UploadedArtifact> {
    let stored = workspace.store_upload(path)?;
    let name = stored
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if !is_zip(&stored) {
        let table = Table::load_csv(&stored)?;
        info!("Loaded CSV {} ({} rows)", name, table.row_count());
        return Ok(UploadedArtifact::SingleTable { name, table });
    }

    let names = workspace.extract_archive(&stored)?;
    let mut tables = BTreeMap::new();
    for entry in &names {
        if !entry.to_lowercase().ends_with(".csv") {
            warn!("Skipping non-CSV archive entry {}", entry);
            continue;
        }
        let table = Table::load_csv(workspace.path_of(entry))?;
        tables.insert(entry.clone(), table);
    }

    Ok(UploadedArtifact::Archive { names, tables })
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

/// Build the dataset context for an upload
pub fn assemble(artifact: UploadedArtifact, workspace: &Workspace) -> Result<Assembly> {
    match artifact {
        UploadedArtifact::SingleTable { name, table } => {
            let report = AssemblyReport {
                files: vec![name.clone()],
                ..Default::default()
            };
            let context = DatasetContext::new(table, DatasetKind::Single).with_source(workspace.path_of(&name));
            Ok(Assembly { context, report })
        }
        UploadedArtifact::Archive { names, tables } => assemble_archive(names, tables, workspace),
    }
}

/// Failure carrying every entry name plus the columns of the entries that loaded
fn classification_failure(names: Vec<String>, tables: &BTreeMap<String, Table>) -> AgentError {
    let columns = tables
        .iter()
        .map(|(name, table)| (name.clone(), table.columns()))
        .collect();
    AgentError::ClassificationFailure { files: names, columns }
}

fn assemble_archive(
    names: Vec<String>,
    mut tables: BTreeMap<String, Table>,
    workspace: &Workspace,
) -> Result<Assembly> {
    let classified: ClassifiedFiles = classify_files(&names);
    let mut report = AssemblyReport {
        files: names.clone(),
        ..Default::default()
    };

    let (header_name, items_name) = match classified.pair() {
        Some((h, i)) => (h.to_string(), i.to_string()),
        None => {
            warn!("Archive lacks cabeçalho/itens entries: {:?}", names);
            return Err(classification_failure(names, &tables));
        }
    };

    if !tables.contains_key(&header_name) || !tables.contains_key(&items_name) {
        warn!("Classified entries {} / {} are not CSV tables", header_name, items_name);
        return Err(classification_failure(names, &tables));
    }
    let (header, items) = match (tables.remove(&header_name), tables.remove(&items_name)) {
        (Some(h), Some(i)) => (h, i),
        _ => return Err(classification_failure(names, &tables)),
    };

    report.header = Some(TableSummary::of(&header_name, &header));
    report.items = Some(TableSummary::of(&items_name, &items));

    let plan = resolve_join_key(&header.column_set(), &items.column_set());
    report.join_plan = Some(plan.clone());

    let key = match plan.key {
        Some(key) => key,
        None => {
            return Err(AgentError::JoinKeyFailure {
                header_columns: header.columns(),
                items_columns: items.columns(),
            })
        }
    };

    let merged = merge_tables(&header, &items, &key)?;
    let merged_path = workspace.save_merged(&merged.table)?;
    report.merged_rows = Some(merged.row_count);
    report.merged_path = Some(merged_path.clone());

    let context = DatasetContext::new(merged.table, DatasetKind::MergedInvoices).with_source(merged_path);
    Ok(Assembly { context, report })
}
