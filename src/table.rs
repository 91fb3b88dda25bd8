//! Table model - a thin, immutable wrapper around a polars `DataFrame`
//!
//! Every uploaded CSV becomes a `Table`. Components only look at its column names and
//! row count; the agent gets the full frame.

use crate::error::{AgentError, Result};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Rows shown in previews
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
}

impl Table {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Load a CSV file with a header row
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AgentError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("CSV file not found: {}", path.display()),
            )));
        }

        let frame = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .finish()
            .map_err(|e| AgentError::Polars(format!("Failed to scan CSV {}: {}", path.display(), e)))?
            .collect()
            .map_err(|e| AgentError::Polars(format!("Failed to collect CSV {}: {}", path.display(), e)))?;

        debug!("Loaded {} ({} rows x {} cols)", path.display(), frame.height(), frame.width());
        Ok(Self { frame })
    }

    /// Write the table back as CSV (header included)
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = std::fs::File::create(path.as_ref())?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut self.frame.clone())?;
        Ok(())
    }

    /// Column names in frame order
    pub fn columns(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|c| c.to_string())
            .collect()
    }

    /// Unique column names, sorted
    pub fn column_set(&self) -> BTreeSet<String> {
        self.columns().into_iter().collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_names().iter().any(|c| *c == name)
    }

    pub fn row_count(&self) -> usize {
        self.frame.height()
    }

    pub fn col_count(&self) -> usize {
        self.frame.width()
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// First rows for display; never used for computation
    pub fn preview(&self) -> DataFrame {
        self.frame.head(Some(PREVIEW_ROWS))
    }
}
