//! Expands a locally-known, remotely-sourced variable into its fuller
//! remote record set before `GET`/`FIND` hand control back to the user.
//!
//! Re-queries the variable's own datasource for everything matching its
//! current identity, then — for `process`, which STIX 2.0 gives no
//! stable id — keeps only the prefetched rows that plausibly are the
//! same process as a locally-known one, via weighted attribute agreement.

use crate::error::Result;
use crate::session::Session;
use crate::store::Row;
use crate::symboltable::VarStruct;

use super::pattern::build_pattern_from_ids;
use super::relations::{fine_grained_relational_process_filtering, get_entity_id_attribute};

/// Re-queries `var`'s datasource for everything sharing its rows'
/// identity, materializes the result under a fresh view, and — for
/// `process` — drops prefetched rows that don't plausibly match a local
/// one. Returns the new view's name, or `None` when prefetch does not
/// apply (no datasource, disabled, or nothing came back).
pub fn prefetch(session: &mut Session, var: &VarStruct, enabled: bool) -> Result<Option<String>> {
    if !enabled || !var.can_prefetch() {
        return Ok(None);
    }
    let (Some(entity_table), Some(type_), Some(datasource)) =
        (var.entity_table.clone(), var.type_.clone(), var.data_source.clone())
    else {
        return Ok(None);
    };

    let id_attr = get_entity_id_attribute(session.store.as_ref(), var)?;
    let local_rows = session.store.lookup(&entity_table, &[id_attr.clone()], None)?;
    let ids: Vec<String> = local_rows
        .iter()
        .filter_map(|r| r.get(&id_attr))
        .map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    let Some(pattern) = build_pattern_from_ids(&type_, &ids) else {
        return Ok(None);
    };

    let response = session
        .datasource_manager
        .query(&datasource, &pattern, &session.session_id)?;
    if response.rows.is_empty() {
        return Ok(None);
    }

    let view = format!("_prefetch_{}_{}", var.name, session.tracker_len());
    response.load_to_store(session.store.as_mut(), &view)?;
    session.store.extract(&view, &type_, Some(&view), None)?;

    if type_ == "process" {
        let local_full = session.store.lookup(&entity_table, &[], None)?;
        let weights = session.config.prefetch.attribute_weights.clone();
        let threshold = session.config.prefetch.process_match_threshold;
        let candidates = session.store.lookup(&view, &[], None)?;
        let kept = filter_prefetched_process(&local_full, &candidates, &weights, threshold);
        if kept.is_empty() {
            return Ok(None);
        }
        let kept_ids: Vec<String> = kept
            .iter()
            .filter_map(|r| r.get("id"))
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        if let Some(id_pattern) = build_pattern_from_ids(&type_, &kept_ids) {
            session.store.extract(&view, &type_, Some(&view), Some(&id_pattern))?;
        }
    }

    Ok(Some(view))
}

fn filter_prefetched_process(
    local_rows: &[Row],
    candidates: &[Row],
    weights: &std::collections::BTreeMap<String, f64>,
    threshold: f64,
) -> Vec<Row> {
    candidates
        .iter()
        .filter(|candidate| {
            local_rows.iter().any(|local| {
                fine_grained_relational_process_filtering(local, candidate, weights) >= threshold
            })
        })
        .cloned()
        .collect()
}
