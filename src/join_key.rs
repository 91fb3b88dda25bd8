//! Join-Key Resolver
//!
//! Picks the column used to merge the cabeçalho and itens tables:
//! 1. Intersect both column sets
//! 2. Walk the priority substrings in order; the first common column containing one wins
//! 3. Otherwise fall back to the first common column
//!
//! Common columns are scanned in lexicographic order, which makes the choice independent
//! of how the input sets were built.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Key substrings, highest priority first
pub const KEY_PRIORITY: [&str; 6] = ["id", "numero", "nf", "nota_fiscal", "documento", "chave"];

/// How the key was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeySource {
    /// Matched a priority substring
    Priority(&'static str),
    /// No substring matched; first common column taken
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinPlan {
    pub common_columns: BTreeSet<String>,
    /// Absent iff `common_columns` is empty
    pub key: Option<String>,
    pub source: Option<KeySource>,
}

impl JoinPlan {
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }
}

pub fn resolve_join_key(header_columns: &BTreeSet<String>, items_columns: &BTreeSet<String>) -> JoinPlan {
    let common_columns: BTreeSet<String> = header_columns.intersection(items_columns).cloned().collect();

    for needle in KEY_PRIORITY {
        if let Some(column) = common_columns.iter().find(|c| c.to_lowercase().contains(needle)) {
            info!("Join key '{}' matched priority '{}'", column, needle);
            let key = Some(column.clone());
            return JoinPlan {
                common_columns,
                key,
                source: Some(KeySource::Priority(needle)),
            };
        }
    }

    // Weak point: nothing guarantees the fallback column identifies rows
    match common_columns.iter().next().cloned() {
        Some(column) => {
            warn!("No key-like common column; falling back to '{}'", column);
            JoinPlan {
                common_columns,
                key: Some(column),
                source: Some(KeySource::Fallback),
            }
        }
        None => JoinPlan {
            common_columns,
            key: None,
            source: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(cols: &[&str]) -> BTreeSet<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_priority_order_beats_column_order() {
        // "chave_acesso" only matches the lowest priority, "numero" beats it
        let plan = resolve_join_key(
            &set(&["chave_acesso", "numero", "data_emissao"]),
            &set(&["numero", "chave_acesso", "produto"]),
        );
        assert_eq!(plan.key.as_deref(), Some("numero"));
        assert_eq!(plan.source, Some(KeySource::Priority("numero")));
        assert_eq!(plan.common_columns, set(&["chave_acesso", "numero"]));
    }

    #[test]
    fn test_id_substring_is_case_insensitive() {
        let plan = resolve_join_key(&set(&["NOTA_ID", "valor"]), &set(&["valor", "NOTA_ID"]));
        assert_eq!(plan.key.as_deref(), Some("NOTA_ID"));
    }

    #[test]
    fn test_csv_column_order_does_not_change_key() {
        use crate::table::Table;

        let tmp = tempfile::tempdir().unwrap();
        let write = |name: &str, content: &str| {
            let path = tmp.path().join(name);
            std::fs::write(&path, content).unwrap();
            Table::load_csv(&path).unwrap()
        };

        // both "id_*" columns tie on the top priority term
        let header_a = write("cab_a.csv", "id_emitente,uf,id_destinatario\n1,SP,2\n");
        let items_a = write("itens_a.csv", "id_emitente,id_destinatario,produto\n1,2,caneta\n");
        let header_b = write("cab_b.csv", "id_destinatario,uf,id_emitente\n2,SP,1\n");
        let items_b = write("itens_b.csv", "produto,id_destinatario,id_emitente\ncaneta,2,1\n");
        assert_ne!(header_a.columns(), header_b.columns());

        let a = resolve_join_key(&header_a.column_set(), &items_a.column_set());
        let b = resolve_join_key(&header_b.column_set(), &items_b.column_set());
        let b_swapped = resolve_join_key(&items_b.column_set(), &header_b.column_set());

        assert_eq!(a.key.as_deref(), Some("id_destinatario"));
        assert_eq!(a.key, b.key);
        assert_eq!(a.key, b_swapped.key);
    }

    #[test]
    fn test_tie_within_priority_is_lexicographic() {
        let plan = resolve_join_key(&set(&["nf_serie", "nf_numero"]), &set(&["nf_numero", "nf_serie"]));
        // "numero" outranks "nf"
        assert_eq!(plan.key.as_deref(), Some("nf_numero"));

        let plan = resolve_join_key(&set(&["nf_b", "nf_a"]), &set(&["nf_a", "nf_b"]));
        assert_eq!(plan.key.as_deref(), Some("nf_a"));
    }

    #[test]
    fn test_fallback_to_first_common_column() {
        let plan = resolve_join_key(&set(&["serie", "emitente", "uf"]), &set(&["uf", "serie"]));
        assert_eq!(plan.key.as_deref(), Some("serie"));
        assert_eq!(plan.source, Some(KeySource::Fallback));
    }

    #[test]
    fn test_empty_intersection_has_no_key() {
        let plan = resolve_join_key(&set(&["numero_nf", "valor"]), &set(&["codigo", "produto"]));
        assert!(plan.common_columns.is_empty());
        assert_eq!(plan.key, None);
        assert_eq!(plan.source, None);
        assert!(!plan.has_key());
    }
}
