//! An in-process [`Store`] implementation used by tests and benches.
//!
//! A hand-rolled stand-in for an external collaborator, just complete
//! enough that the rest of the crate can be exercised without a real
//! backend. It is not a STIX-conformant query engine — the pattern
//! strings produced by [`crate::codegen::pattern`] are this store's own
//! textual convention (`[type:attr = 'value' AND ...] OR [...]  START
//! t'...' STOP t'...'`), not general STIX-2 pattern grammar.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{store_err, AssignOp, Query, QueryStage, Row, Store, ViewSummary};
use crate::error::Result;

#[derive(Debug, Clone, Default)]
struct ViewData {
    entity_type: Option<String>,
    rows: Vec<Row>,
    data_source: Option<String>,
}

/// An in-memory stand-in for the relational store. Rows are STIX-object-ish
/// maps; a global per-type pool (`entities`) backs `extract` calls with no
/// `query_id`, while `views` holds named materializations (including
/// datasource-manager staging areas keyed by query id).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    views: BTreeMap<String, ViewData>,
    entities: BTreeMap<String, Vec<Row>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows_of(&self, view: &str) -> Vec<Row> {
        self.views.get(view).map(|v| v.rows.clone()).unwrap_or_default()
    }

    fn row_dedup_key(row: &Row) -> String {
        serde_json::to_string(row).unwrap_or_default()
    }

    fn dedup(rows: Vec<Row>) -> Vec<Row> {
        let mut seen = std::collections::BTreeSet::new();
        let mut out = Vec::new();
        for row in rows {
            let key = Self::row_dedup_key(&row);
            if seen.insert(key) {
                out.push(row);
            }
        }
        out
    }
}

fn get_path<'a>(row: &'a Row, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = row.get(first)?;
    for seg in segments {
        current = current.as_object()?.get(seg)?;
    }
    Some(current)
}

fn value_as_comparable(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_literal(text: &str) -> String {
    let text = text.trim();
    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        text[1..text.len() - 1].to_string()
    } else {
        text.to_string()
    }
}

fn eval_comparison(row: &Row, comparison: &str) -> bool {
    let comparison = comparison.trim();
    let Some(colon) = comparison.find(':') else {
        return false;
    };
    let rest = &comparison[colon + 1..];
    if let Some(eq) = rest.find(" = ") {
        let attr = rest[..eq].trim();
        let value = parse_literal(&rest[eq + 3..]);
        return get_path(row, attr)
            .map(|v| value_as_comparable(v) == value)
            .unwrap_or(false);
    }
    if let Some(in_pos) = rest.find(" IN ") {
        let attr = rest[..in_pos].trim();
        let list = rest[in_pos + 4..].trim().trim_start_matches('(').trim_end_matches(')');
        let Some(actual) = get_path(row, attr).map(value_as_comparable) else {
            return false;
        };
        return list.split(',').any(|v| parse_literal(v) == actual);
    }
    false
}

/// Splits `s` on occurrences of `sep` that sit outside any `(`/`[`
/// grouping, so `AND`/`OR` bind correctly around parenthesized and
/// bracketed sub-expressions.
fn split_top_level<'a>(s: &'a str, sep: &str) -> Vec<&'a str> {
    let mut depth = 0i32;
    let mut start = 0;
    let mut parts = Vec::new();
    let mut i = 0;
    while i < s.len() {
        match s.as_bytes()[i] {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth -= 1,
            _ => {}
        }
        if depth == 0 && s[i..].starts_with(sep) {
            parts.push(&s[start..i]);
            i += sep.len();
            start = i;
            continue;
        }
        i += 1;
    }
    parts.push(&s[start..]);
    parts
}

fn eval_expr(row: &Row, expr: &str) -> bool {
    split_top_level(expr.trim(), " OR ")
        .iter()
        .any(|term| eval_term(row, term))
}

fn eval_term(row: &Row, term: &str) -> bool {
    split_top_level(term.trim(), " AND ")
        .iter()
        .all(|factor| eval_factor(row, factor))
}

fn eval_factor(row: &Row, factor: &str) -> bool {
    let factor = factor.trim();
    if (factor.starts_with('(') && factor.ends_with(')'))
        || (factor.starts_with('[') && factor.ends_with(']'))
    {
        eval_expr(row, &factor[1..factor.len() - 1])
    } else {
        eval_comparison(row, factor)
    }
}

/// Matches `row` against a pattern produced by [`crate::codegen::pattern`].
/// Time windows are accepted syntactically but not enforced — this store
/// has no notion of a row's observation time.
fn eval_pattern(pattern: &str, row: &Row) -> bool {
    let body = match pattern.find(" START ") {
        Some(pos) => &pattern[..pos],
        None => pattern,
    };
    eval_expr(row, body)
}

impl Store for MemoryStore {
    fn types(&self) -> Vec<String> {
        self.entities.keys().cloned().collect()
    }

    fn columns(&self, table: &str) -> Result<Vec<String>> {
        let rows = if let Some(view) = self.views.get(table) {
            &view.rows
        } else if let Some(rows) = self.entities.get(table) {
            rows
        } else {
            return Err(store_err(format!("unknown table '{table}'")));
        };
        let mut columns = std::collections::BTreeSet::new();
        for row in rows {
            columns.extend(row.keys().cloned());
        }
        Ok(columns.into_iter().collect())
    }

    fn view_exists(&self, view: &str) -> bool {
        self.views.contains_key(view)
    }

    fn view_summary(&self, view: &str) -> ViewSummary {
        let Some(data) = self.views.get(view) else {
            return ViewSummary::default();
        };
        let distinct: std::collections::BTreeSet<String> =
            data.rows.iter().map(Self::row_dedup_key).collect();
        ViewSummary {
            entity_type: data.entity_type.clone(),
            length: distinct.len() as u64,
            records_count: data.rows.len() as u64,
            data_source: data.data_source.clone(),
        }
    }

    fn extract(
        &mut self,
        view: &str,
        entity_type: &str,
        query_id: Option<&str>,
        pattern: Option<&str>,
    ) -> Result<()> {
        let (mut source, data_source) = if let Some(qid) = query_id {
            let data = self
                .views
                .get(qid)
                .ok_or_else(|| store_err(format!("unknown staging view '{qid}'")))?;
            (data.rows.clone(), data.data_source.clone())
        } else {
            (self.entities.get(entity_type).cloned().unwrap_or_default(), None)
        };
        source.retain(|row| {
            row.get("type")
                .and_then(Value::as_str)
                .map(|t| t == entity_type)
                .unwrap_or(true)
        });
        if let Some(pattern) = pattern {
            source.retain(|row| eval_pattern(pattern, row));
        }
        self.views.insert(
            view.to_string(),
            ViewData {
                entity_type: Some(entity_type.to_string()),
                rows: Self::dedup(source),
                data_source,
            },
        );
        Ok(())
    }

    fn insert_rows(
        &mut self,
        view: &str,
        entity_type: &str,
        rows: Vec<Row>,
        data_source: Option<&str>,
    ) -> Result<()> {
        self.entities
            .entry(entity_type.to_string())
            .or_default()
            .extend(rows.clone());
        self.views.insert(
            view.to_string(),
            ViewData {
                entity_type: Some(entity_type.to_string()),
                rows: Self::dedup(rows),
                data_source: data_source.map(str::to_string),
            },
        );
        Ok(())
    }

    fn merge(&mut self, view: &str, views: &[String]) -> Result<()> {
        let mut rows = Vec::new();
        let mut entity_type = None;
        for v in views {
            let data = self
                .views
                .get(v)
                .ok_or_else(|| store_err(format!("unknown view '{v}'")))?;
            entity_type = entity_type.or_else(|| data.entity_type.clone());
            rows.extend(data.rows.clone());
        }
        self.views.insert(
            view.to_string(),
            ViewData {
                entity_type,
                rows: Self::dedup(rows),
                data_source: None,
            },
        );
        Ok(())
    }

    fn filter(
        &mut self,
        view: &str,
        entity_type: &str,
        src_view: &str,
        pattern: Option<&str>,
    ) -> Result<()> {
        let src = self
            .views
            .get(src_view)
            .ok_or_else(|| store_err(format!("unknown view '{src_view}'")))?
            .clone();
        let mut rows: Vec<Row> = src
            .rows
            .into_iter()
            .filter(|row| {
                row.get("type")
                    .and_then(Value::as_str)
                    .map(|t| t == entity_type)
                    .unwrap_or(true)
            })
            .collect();
        if let Some(pattern) = pattern {
            rows.retain(|row| eval_pattern(pattern, row));
        }
        self.views.insert(
            view.to_string(),
            ViewData {
                entity_type: Some(entity_type.to_string()),
                rows: Self::dedup(rows),
                data_source: src.data_source,
            },
        );
        Ok(())
    }

    fn lookup(&self, view: &str, attrs: &[String], limit: Option<u64>) -> Result<Vec<Row>> {
        let rows = self.rows_of(view);
        let projected: Vec<Row> = rows
            .into_iter()
            .map(|row| {
                if attrs.is_empty() {
                    row
                } else {
                    attrs
                        .iter()
                        .filter_map(|attr| get_path(&row, attr).map(|v| (attr.clone(), v.clone())))
                        .collect()
                }
            })
            .collect();
        match limit {
            Some(n) => Ok(projected.into_iter().take(n as usize).collect()),
            None => Ok(projected),
        }
    }

    fn rename_view(&mut self, old: &str, new: &str) -> Result<()> {
        let data = self
            .views
            .remove(old)
            .ok_or_else(|| store_err(format!("unknown view '{old}'")))?;
        self.views.insert(new.to_string(), data);
        Ok(())
    }

    fn remove_view(&mut self, view: &str) -> Result<()> {
        self.views.remove(view);
        Ok(())
    }

    fn assign(&mut self, view: &str, src: &str, op: AssignOp) -> Result<()> {
        let mut rows = self.rows_of(src);
        match op {
            AssignOp::Sort { by, ascending } => {
                rows.sort_by(|a, b| {
                    let av = get_path(a, &by).map(value_as_comparable).unwrap_or_default();
                    let bv = get_path(b, &by).map(value_as_comparable).unwrap_or_default();
                    if ascending {
                        av.cmp(&bv)
                    } else {
                        bv.cmp(&av)
                    }
                });
            }
        }
        let entity_type = self.views.get(src).and_then(|v| v.entity_type.clone());
        self.views.insert(
            view.to_string(),
            ViewData {
                entity_type,
                rows,
                data_source: None,
            },
        );
        Ok(())
    }

    fn assign_query(&mut self, view: &str, query: Query) -> Result<()> {
        let mut rows: Vec<Row> = Vec::new();
        let mut entity_type: Option<String> = None;
        for stage in &query.stages {
            match stage {
                QueryStage::Table(table) => {
                    rows = if let Some(view) = self.views.get(&table.0) {
                        entity_type = view.entity_type.clone();
                        view.rows.clone()
                    } else {
                        entity_type = Some(table.0.clone());
                        self.entities.get(&table.0).cloned().unwrap_or_default()
                    };
                }
                QueryStage::Group(group) => {
                    let mut groups: BTreeMap<String, Row> = BTreeMap::new();
                    for row in &rows {
                        let key: Vec<String> = group
                            .0
                            .iter()
                            .map(|p| get_path(row, p).map(value_as_comparable).unwrap_or_default())
                            .collect();
                        groups.entry(key.join("\u{1f}")).or_insert_with(|| row.clone());
                    }
                    rows = groups.into_values().collect();
                }
                QueryStage::Aggregation(agg) => {
                    for (func, attr, alias) in &agg.0 {
                        let values: Vec<f64> = rows
                            .iter()
                            .filter_map(|r| get_path(r, attr))
                            .filter_map(|v| v.as_f64())
                            .collect();
                        let result = aggregate(func, &values);
                        for row in rows.iter_mut() {
                            row.insert(alias.clone(), result.clone());
                        }
                    }
                }
            }
        }
        self.views.insert(
            view.to_string(),
            ViewData {
                entity_type,
                rows: Self::dedup(rows),
                data_source: None,
            },
        );
        Ok(())
    }

    fn join(
        &mut self,
        view: &str,
        left: &str,
        left_path: &str,
        right: &str,
        right_path: &str,
    ) -> Result<()> {
        let left_rows = self.rows_of(left);
        let right_rows = self.rows_of(right);
        let mut joined = Vec::new();
        for lrow in &left_rows {
            let Some(lval) = get_path(lrow, left_path).map(value_as_comparable) else {
                continue;
            };
            for rrow in &right_rows {
                let Some(rval) = get_path(rrow, right_path).map(value_as_comparable) else {
                    continue;
                };
                if lval == rval {
                    let mut merged = lrow.clone();
                    for (k, v) in rrow {
                        merged.entry(k.clone()).or_insert_with(|| v.clone());
                    }
                    joined.push(merged);
                }
            }
        }
        let entity_type = self.views.get(left).and_then(|v| v.entity_type.clone());
        self.views.insert(
            view.to_string(),
            ViewData {
                entity_type,
                rows: Self::dedup(joined),
                data_source: None,
            },
        );
        Ok(())
    }
}

fn aggregate(func: &str, values: &[f64]) -> Value {
    if values.is_empty() {
        return Value::Null;
    }
    let result = match func {
        "sum" => values.iter().sum(),
        "avg" => values.iter().sum::<f64>() / values.len() as f64,
        "min" => values.iter().cloned().fold(f64::INFINITY, f64::min),
        "max" => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        "count" => values.len() as f64,
        "nunique" => {
            let mut seen = std::collections::BTreeSet::new();
            for v in values {
                seen.insert(v.to_bits());
            }
            seen.len() as f64
        }
        _ => return Value::Null,
    };
    serde_json::Number::from_f64(result)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(json: serde_json::Value) -> Row {
        json.as_object().unwrap().clone().into_iter().collect()
    }

    #[test]
    fn extract_filters_by_type_and_pattern() {
        let mut store = MemoryStore::new();
        store
            .insert_rows(
                "staging",
                "process",
                vec![
                    row(json!({"type": "process", "pid": 1, "name": "a.exe"})),
                    row(json!({"type": "process", "pid": 2, "name": "b.exe"})),
                ],
                None,
            )
            .unwrap();
        store
            .extract("out", "process", Some("staging"), Some("[process:pid = '1']"))
            .unwrap();
        let rows = store.lookup("out", &[], None).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn dedup_collapses_identical_rows() {
        let mut store = MemoryStore::new();
        store
            .insert_rows(
                "v",
                "process",
                vec![
                    row(json!({"type": "process", "pid": 1})),
                    row(json!({"type": "process", "pid": 1})),
                ],
                None,
            )
            .unwrap();
        let summary = store.view_summary("v");
        assert_eq!(summary.records_count, 2);
        assert_eq!(summary.length, 1);
    }
}
