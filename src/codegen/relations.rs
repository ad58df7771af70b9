//! Relation tables and the pattern bodies built from them.
//!
//! The relation tables below name the STIX reference-property
//! conventions directly (see `DESIGN.md` for how they were derived)
//! rather than transcribing any external relation-compiler source.

use crate::store::Store;
use crate::symboltable::VarStruct;

/// Per-type identity attribute sets used both by `GET`'s implicit
/// deduplication and by pattern compilation's `<var>` substitution.
/// `support_id` short-circuits to the datasource's own stable id when the
/// active connector exposes one.
pub fn identity_attributes_for(entity_type: &str, support_id: bool) -> Vec<String> {
    if support_id {
        return vec!["id".to_string()];
    }
    let attrs: &[&str] = match entity_type {
        "process" => &["pid", "name", "command_line"],
        "network-traffic" => &["src_ref.value", "dst_ref.value", "src_port", "dst_port"],
        "file" => &["hashes.MD5", "hashes.SHA-256", "name"],
        "ipv4-addr" | "ipv6-addr" => &["value"],
        "url" => &["value"],
        "domain-name" => &["value"],
        "user-account" => &["user_id", "account_login"],
        _ => &["id"],
    };
    attrs.iter().map(|s| s.to_string()).collect()
}

/// Whether the local view's identity attribute is the store's own stable
/// `id` column (a datasource that supports ids) rather than the type's
/// default identity set.
pub fn get_entity_id_attribute(store: &dyn Store, var: &VarStruct) -> crate::error::Result<String> {
    let Some(table) = var.entity_table.as_deref() else {
        return Ok("id".to_string());
    };
    let columns = store.columns(table)?;
    if columns.iter().any(|c| c == "id") {
        Ok("id".to_string())
    } else if let Some(type_) = &var.type_ {
        Ok(identity_attributes_for(type_, false)
            .into_iter()
            .next()
            .unwrap_or_else(|| "id".to_string()))
    } else {
        Ok("id".to_string())
    }
}

/// `relation -> (type_a, type_b, ref_attr_on_a)`: type `a` carries a
/// reference attribute pointing at (a) `b`. Forward (`reversed = false`)
/// starts from an `a` and returns the `b`s it references; reversed starts
/// from a `b` and returns the `a`s that reference it.
const SPECIFIC_RELATIONS: &[(&str, &str, &str, &str)] = &[
    ("parent", "process", "process", "parent_ref"),
    ("created", "process", "file", "x_created_files_refs"),
    ("loaded", "process", "file", "x_loaded_modules_refs"),
    ("opened", "process", "network-traffic", "opened_connection_refs"),
    ("owned_by", "process", "user-account", "creator_user_ref"),
];

/// Relation names resolved generically from type pairs rather than a
/// fixed relation vocabulary ("LINKED"-style relations).
const GENERIC_REFS: &[(&str, &str, &str)] = &[
    ("process", "network-traffic", "opened_connection_refs"),
    ("process", "file", "binary_ref"),
    ("network-traffic", "ipv4-addr", "dst_ref"),
    ("network-traffic", "ipv4-addr", "src_ref"),
    ("user-account", "process", "creator_user_ref"),
];

pub fn is_generic_relation(relation: &str) -> bool {
    relation.eq_ignore_ascii_case("linked") || relation.eq_ignore_ascii_case("contained")
}

/// Body (unbracketed) for `FIND <return_type> <relation> <input>`, when
/// `relation` is one of the fixed specific relations in
/// [`SPECIFIC_RELATIONS`]. `None` when no such relation connects the two
/// types.
pub fn compile_specific_relation_to_pattern(
    return_type: &str,
    relation: &str,
    input_type: &str,
    reversed: bool,
    input_var: &str,
) -> Option<String> {
    let (_, type_a, type_b, ref_attr) = SPECIFIC_RELATIONS.iter().find(|(name, a, b, _)| {
        name.eq_ignore_ascii_case(relation)
            && ((*a == input_type && *b == return_type) || (*a == return_type && *b == input_type))
    })?;

    if !reversed {
        if input_type == *type_a && return_type == *type_b {
            return Some(format!("{return_type}:id IN (<{input_var}.{ref_attr}>)"));
        }
    } else if input_type == *type_b && return_type == *type_a {
        return Some(format!("{return_type}:{ref_attr} IN (<{input_var}.id>)"));
    }
    None
}

/// Body for a generic (type-pair-driven) relation.
pub fn compile_generic_relation_to_pattern(
    return_type: &str,
    input_type: &str,
    input_var: &str,
) -> Option<String> {
    for (a, b, ref_attr) in GENERIC_REFS {
        if input_type == *a && return_type == *b {
            return Some(format!("{return_type}:id IN (<{input_var}.{ref_attr}>)"));
        }
        if input_type == *b && return_type == *a {
            return Some(format!("{return_type}:{ref_attr} IN (<{input_var}.id>)"));
        }
    }
    None
}

/// `FIND <type> <type> <input>` — the identical-entity-type search used
/// when `return_type == input_type` and no relation keyword narrows it;
/// it is just the input's own identity.
pub fn compile_identical_entity_search_pattern(input_var: &str) -> String {
    format!("<{input_var}>")
}

/// Entity types that flow through `x-oca-event` intermediate records.
const EVENT_ASSOCIATED_TYPES: &[&str] = &["process", "network-traffic", "file", "user-account"];

pub fn are_entities_associated_with_x_ibm_event(type_a: &str, type_b: &str) -> bool {
    EVENT_ASSOCIATED_TYPES.contains(&type_a) && EVENT_ASSOCIATED_TYPES.contains(&type_b)
}

/// Body for `return_type` reached by following an event *into* it from
/// `input`, e.g. "find the network-traffic this process's events flowed
/// through".
pub fn compile_x_ibm_event_search_flow_in_pattern(return_type: &str, input_var: &str) -> String {
    format!("{return_type}:id IN (<{input_var}.x_ibm_event_ref_out>)")
}

/// The reverse direction: events flowing *out of* `input` toward
/// `return_type`.
pub fn compile_x_ibm_event_search_flow_out_pattern(return_type: &str, input_var: &str) -> String {
    format!("{return_type}:id IN (<{input_var}.x_ibm_event_ref_in>)")
}

/// Weighted-attribute scoring between a locally-known process row and a
/// prefetched one, used to decide whether a remote `process` record is
/// "the same" process before admitting it — STIX 2.0 gives `process` no
/// stable id, so identity has to be inferred from attribute agreement.
pub fn fine_grained_relational_process_filtering(
    local_row: &crate::store::Row,
    candidate_row: &crate::store::Row,
    weights: &std::collections::BTreeMap<String, f64>,
) -> f64 {
    let mut score = 0.0;
    for (attr, weight) in weights {
        let lv = get_path(local_row, attr);
        let cv = get_path(candidate_row, attr);
        if let (Some(lv), Some(cv)) = (lv, cv) {
            if lv == cv {
                score += weight;
            }
        }
    }
    score
}

fn get_path<'a>(row: &'a crate::store::Row, path: &str) -> Option<&'a serde_json::Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = row.get(first)?;
    for seg in segments {
        current = current.as_object()?.get(seg)?;
    }
    Some(current)
}
