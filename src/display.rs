//! What a command hands back to the caller.
//!
//! `DISP` and `APPLY` are the two commands that produce user-facing
//! output; everything else returns `()` through [`crate::error::Result`].
//! Every display-producing command runs the same dedup/empty-row cleanup
//! before handing its result to the caller.

use crate::store::Row;

/// The result handed back by `DISP` or `APPLY`.
#[derive(Debug, Clone, PartialEq)]
pub enum Display {
    /// A tabular result: ordered column names plus deduplicated rows.
    Table { columns: Vec<String>, rows: Vec<Row> },
    /// A single free-form message, e.g. from an analytics workflow that
    /// has nothing tabular to show.
    Message(String),
    /// A pre-rendered HTML fragment, e.g. the execution-tracking display
    /// (`DISP _`).
    Html(String),
}

impl Display {
    /// Builds a table display with duplicate rows collapsed and rows that
    /// are entirely empty dropped.
    pub fn table(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Display::Table {
            columns,
            rows: remove_empty_rows(dedup_ordered_rows(rows)),
        }
    }
}

/// Collapses consecutive-or-not duplicate rows, keeping the first
/// occurrence's position (order-preserving dedup, not a sort).
pub fn dedup_ordered_rows(rows: Vec<Row>) -> Vec<Row> {
    let mut seen = std::collections::BTreeSet::new();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let key = serde_json::to_string(&row).unwrap_or_default();
        if seen.insert(key) {
            out.push(row);
        }
    }
    out
}

/// Drops rows whose every value is JSON `null` or an empty string — the
/// shape a left-joined attribute that never resolved leaves behind.
pub fn remove_empty_rows(rows: Vec<Row>) -> Vec<Row> {
    rows.into_iter()
        .filter(|row| {
            row.values().any(|v| match v {
                serde_json::Value::Null => false,
                serde_json::Value::String(s) => !s.is_empty(),
                _ => true,
            })
        })
        .collect()
}
