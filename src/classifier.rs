//! File Classifier - label archive entries as cabeçalho (header) or itens (line items)
//! by case-insensitive substring matching on the file name.

use serde::{Deserialize, Serialize};
use tracing::debug;

const HEADER_MARKERS: [&str; 2] = ["cabecalho", "cabeçalho"];
const ITEMS_MARKERS: [&str; 2] = ["itens", "item"];

/// Result of classifying a set of file names.
/// At most one file per role; the first qualifying name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedFiles {
    pub header: Option<String>,
    pub items: Option<String>,
}

impl ClassifiedFiles {
    /// Both roles found
    pub fn is_complete(&self) -> bool {
        self.header.is_some() && self.items.is_some()
    }

    /// `(header, items)` when both are present
    pub fn pair(&self) -> Option<(&str, &str)> {
        match (&self.header, &self.items) {
            (Some(h), Some(i)) => Some((h.as_str(), i.as_str())),
            _ => None,
        }
    }
}

/// Classify file names in input order. Header markers are checked before item markers,
/// so a name matching both is a header candidate.
pub fn classify_files<S: AsRef<str>>(filenames: &[S]) -> ClassifiedFiles {
    let mut classified = ClassifiedFiles::default();

    for name in filenames {
        let name = name.as_ref();
        let lower = name.to_lowercase();

        if HEADER_MARKERS.iter().any(|m| lower.contains(m)) {
            if classified.header.is_none() {
                debug!("Classified {} as header", name);
                classified.header = Some(name.to_string());
            }
        } else if ITEMS_MARKERS.iter().any(|m| lower.contains(m)) && classified.items.is_none() {
            debug!("Classified {} as items", name);
            classified.items = Some(name.to_string());
        }
    }

    classified
}
