//! Compiles bodies containing variable references into store-queryable
//! pattern strings.
//!
//! Two token forms are substituted inside a body before it is bracketed:
//! `<var>` expands to a parenthesized disjunction of complete comparisons
//! over `var`'s identity attributes (one disjunct per distinct row, each a
//! conjunction across the identity attribute set); `<var.attr>` expands to
//! a bare comma-separated literal list of `attr`'s distinct values across
//! `var`'s rows, meant to sit inside a caller-supplied `IN (...)`. Neither
//! form is STIX-2 pattern grammar — the store adapter is the only reader
//! of the resulting string (see `DESIGN.md` for why).

use chrono::Duration;
use smol_str::SmolStr;

use crate::error::Result;
use crate::statement::TimeRange;
use crate::store::Store;
use crate::symboltable::SymbolTable;

use super::relations::identity_attributes_for;

enum Token<'a> {
    Whole(&'a str),
    Attr(&'a str, &'a str),
}

fn find_tokens(body: &str) -> Vec<(usize, usize, Token<'_>)> {
    let mut tokens = Vec::new();
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'<' {
            if let Some(end) = body[i..].find('>') {
                let end = i + end;
                let inner = &body[i + 1..end];
                let token = match inner.split_once('.') {
                    Some((var, attr)) => Token::Attr(var, attr),
                    None => Token::Whole(inner),
                };
                tokens.push((i, end + 1, token));
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }
    tokens
}

fn quote(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}

fn resolve_whole(var: &str, symtable: &SymbolTable, store: &dyn Store) -> Option<String> {
    let v = symtable.get(var)?;
    let entity_table = v.entity_table.as_ref()?;
    let type_ = v.type_.as_ref()?;
    let identity_attrs = identity_attributes_for(type_, false);
    let rows = store.lookup(entity_table, &identity_attrs, None).ok()?;
    let mut disjuncts = Vec::new();
    for row in rows {
        let conjuncts: Vec<String> = identity_attrs
            .iter()
            .filter_map(|attr| row.get(attr).map(|val| format!("{type_}:{attr} = {}", quote(val))))
            .collect();
        if !conjuncts.is_empty() {
            disjuncts.push(conjuncts.join(" AND "));
        }
    }
    if disjuncts.is_empty() {
        return None;
    }
    Some(format!("({})", disjuncts.join(" OR ")))
}

fn resolve_attr(var: &str, attr: &str, symtable: &SymbolTable, store: &dyn Store) -> Option<String> {
    let v = symtable.get(var)?;
    let entity_table = v.entity_table.as_ref()?;
    let rows = store.lookup(entity_table, &[attr.to_string()], None).ok()?;
    let mut values = std::collections::BTreeSet::new();
    for row in rows {
        if let Some(val) = row.get(attr) {
            values.insert(quote(val));
        }
    }
    if values.is_empty() {
        return None;
    }
    Some(values.into_iter().collect::<Vec<_>>().join(", "))
}

/// Substitutes every `<var>`/`<var.attr>` reference in `body`, wraps it in
/// `[...]`, and appends the timerange window (expanded by the configured
/// offsets) if `timerange` is bounded. Returns `Ok(None)` when at least one
/// referenced variable resolves to no qualifying rows — the caller should
/// treat that the same as "this pattern matches nothing".
pub fn build_pattern(
    body: &str,
    timerange: &TimeRange,
    start_offset: i64,
    stop_offset: i64,
    symtable: &SymbolTable,
    store: &dyn Store,
) -> Result<Option<String>> {
    let tokens = find_tokens(body);
    if tokens.is_empty() {
        return Ok(Some(finish(body, timerange, start_offset, stop_offset)));
    }

    let mut resolved = Vec::with_capacity(tokens.len());
    for (_, _, token) in &tokens {
        let r = match token {
            Token::Whole(var) => resolve_whole(var, symtable, store),
            Token::Attr(var, attr) => resolve_attr(var, attr, symtable, store),
        };
        match r {
            Some(s) => resolved.push(s),
            None => return Ok(None),
        }
    }

    let mut out = String::with_capacity(body.len());
    let mut cursor = 0;
    for ((start, end, _), replacement) in tokens.iter().zip(resolved.into_iter()) {
        out.push_str(&body[cursor..*start]);
        out.push_str(&replacement);
        cursor = *end;
    }
    out.push_str(&body[cursor..]);

    Ok(Some(finish(&out, timerange, start_offset, stop_offset)))
}

fn finish(body: &str, timerange: &TimeRange, start_offset: i64, stop_offset: i64) -> String {
    let mut out = format!("[{body}]");
    if let (Some(start), Some(stop)) = (timerange.start, timerange.stop) {
        let start = start + Duration::seconds(start_offset);
        let stop = stop + Duration::seconds(stop_offset);
        out.push_str(&format!(
            " START t'{}' STOP t'{}'",
            start.to_rfc3339(),
            stop.to_rfc3339()
        ));
    }
    out
}

/// ORs together already-built patterns, dropping the ones that resolved
/// to `None`. Returns `None` if every alternative was empty.
pub fn or_patterns(patterns: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    let parts: Vec<String> = patterns.into_iter().flatten().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" OR "))
    }
}

/// Builds `[type:id IN (id1, id2, ...)]` directly from a literal id list,
/// used by prefetch once it already knows the remote ids it wants.
pub fn build_pattern_from_ids(entity_type: &str, ids: &[String]) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    let list = ids.iter().map(|id| format!("'{id}'")).collect::<Vec<_>>().join(", ");
    Some(format!("[{entity_type}:id IN ({list})]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{GetSource, Statement};
    use crate::store::memory::MemoryStore;
    use crate::store::Store as _;
    use crate::symboltable::new_var;
    use serde_json::json;

    fn setup() -> (MemoryStore, SymbolTable) {
        let mut store = MemoryStore::new();
        store
            .insert_rows(
                "procs",
                "process",
                vec![json!({"type": "process", "pid": 1, "name": "a.exe", "command_line": "a"})
                    .as_object()
                    .unwrap()
                    .clone()
                    .into_iter()
                    .collect()],
                None,
            )
            .unwrap();
        let mut symtable = SymbolTable::new();
        let stmt = Statement::Get {
            output: "x".into(),
            type_: "process".into(),
            patternbody: "".into(),
            timerange: TimeRange::unbounded(),
            source: GetSource::Datasource("ds".into()),
        };
        symtable.bind(new_var(&store, Some("procs"), vec![], &stmt, "x"));
        (store, symtable)
    }

    #[test]
    fn whole_token_builds_disjunction() {
        let (store, symtable) = setup();
        let pattern = build_pattern("<x>", &TimeRange::unbounded(), 0, 0, &symtable, &store)
            .unwrap()
            .unwrap();
        assert!(pattern.contains("process:pid = 1"));
    }

    #[test]
    fn unresolvable_reference_yields_none() {
        let (store, mut symtable) = setup();
        symtable.bind(crate::symboltable::VarStruct::empty(
            "y",
            Statement::Info { input: "x".into() },
        ));
        let pattern = build_pattern("<y>", &TimeRange::unbounded(), 0, 0, &symtable, &store).unwrap();
        assert!(pattern.is_none());
    }
}
