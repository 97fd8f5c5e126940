//! Row projection: turning the dataset into display-ready overlay rows.
//!
//! Rows are transient; they are recomputed on every overlay read from the
//! table and the current state, never stored.

use crate::table::{Table, Value};
use serde::Serialize;

/// A single display row in the overlay payload: either a group header or
/// an item line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Row {
    Group { label: String },
    Item { text: String },
}

/// Project the table into overlay rows for one display column and at most
/// one grouping column.
///
/// Records with a blank display value are dropped. With a valid grouping
/// column, records are ordered by `(group, display)` with a stable sort and
/// each distinct group value emits one header followed by its items;
/// records with a blank group value are dropped in this mode. A grouping
/// column that is unknown or equal to the display column degrades to the
/// ungrouped projection, which preserves the table's original record order.
pub fn grouped_rows(table: &Table, display_col: &str, group_col: Option<&str>) -> Vec<Row> {
    let Some(display_idx) = table.column_index(display_col) else {
        return Vec::new();
    };

    let group_idx = group_col
        .filter(|g| !g.is_empty() && *g != display_col)
        .and_then(|g| table.column_index(g));

    let Some(group_idx) = group_idx else {
        return (0..table.len())
            .filter_map(|record| table.value(record, display_idx))
            .map(|value| Row::Item {
                text: value.to_string(),
            })
            .collect();
    };

    let mut entries: Vec<(&Value, &Value)> = (0..table.len())
        .filter_map(|record| {
            let display = table.value(record, display_idx)?;
            let group = table.value(record, group_idx)?;
            Some((group, display))
        })
        .collect();

    // Stable sort: ties keep the table's original relative order.
    entries.sort_by(|a, b| a.0.total_cmp(b.0).then_with(|| a.1.total_cmp(b.1)));

    let mut rows = Vec::with_capacity(entries.len());
    let mut current: Option<&Value> = None;
    for (group, display) in entries {
        if current != Some(group) {
            rows.push(Row::Group {
                label: group.to_string(),
            });
            current = Some(group);
        }
        rows.push(Row::Item {
            text: display.to_string(),
        });
    }
    rows
}
