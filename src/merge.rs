//! Table Merger - inner join of the cabeçalho and itens tables on the resolved key

use crate::error::{AgentError, Result};
use crate::table::Table;
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Suffix for non-key columns present in both tables; applied to the items copy
pub const ITEMS_SUFFIX: &str = "_itens";

#[derive(Debug, Clone)]
pub struct MergedTable {
    pub table: Table,
    pub key: String,
    pub row_count: usize,
}

/// `<name>_itens`, or `<name>_itens_2`, `_itens_3`, ... when that is already a column
fn suffixed_name(name: &str, taken: &BTreeSet<String>) -> String {
    let base = format!("{}{}", name, ITEMS_SUFFIX);
    if !taken.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(base)
}

/// Inner join on `key`. Rows without a match on the other side are dropped.
///
/// The key appears once in the output. Other shared columns keep the header's values
/// under the original name; the items values move to `<name>_itens`.
pub fn merge_tables(header: &Table, items: &Table, key: &str) -> Result<MergedTable> {
    if !header.has_column(key) || !items.has_column(key) {
        return Err(AgentError::Merge(format!(
            "Key '{}' missing (header has it: {}, items has it: {})",
            key,
            header.has_column(key),
            items.has_column(key)
        )));
    }

    let mut left = header.frame().clone();
    let mut right = items.frame().clone();

    let mut taken: BTreeSet<String> = header.column_set().union(&items.column_set()).cloned().collect();
    for name in items.columns() {
        if name != key && header.has_column(&name) {
            let renamed = suffixed_name(&name, &taken);
            debug!("Renaming shared items column {} -> {}", name, renamed);
            right
                .rename(&name, &renamed)
                .map_err(|e| AgentError::Merge(format!("Cannot rename '{}' to '{}': {}", name, renamed, e)))?;
            taken.insert(renamed);
        }
    }

    let left_dtype = left.column(key)?.dtype().clone();
    let right_dtype = right.column(key)?.dtype().clone();
    if left_dtype != right_dtype {
        debug!("Key dtypes differ ({:?} vs {:?}); comparing as strings", left_dtype, right_dtype);
        let left_key = left.column(key)?.cast(&DataType::String)?;
        let right_key = right.column(key)?.cast(&DataType::String)?;
        left.with_column(left_key)?;
        right.with_column(right_key)?;
    }

    // null keys match each other
    let mut args = JoinArgs::new(JoinType::Inner);
    args.join_nulls = true;

    let on = vec![col(key)];
    let joined = left
        .lazy()
        .join(right.lazy(), on.clone(), on, args)
        .collect()
        .map_err(|e| AgentError::Merge(format!("Join on '{}' failed: {}", key, e)))?;

    let row_count = joined.height();
    info!(
        "Merged {} header rows with {} item rows on '{}': {} rows",
        header.row_count(),
        items.row_count(),
        key,
        row_count
    );

    Ok(MergedTable {
        table: Table::new(joined),
        key: key.to_string(),
        row_count,
    })
}
