//! `INFO`: a one-row descriptor summary classifying a variable's columns.
//!
//! Every column name on the variable's entity table is sorted into one
//! of four buckets: `x_`-prefixed columns are "customized"; an exact
//! `_ref`/`_refs`/`_reference`/`_references` suffix marks a raw STIX
//! reference property (not displayed — not useful in this form);
//! `_ref.` or `_ref_` appearing mid-name marks an already-dereferenced
//! indirect attribute, grouped by the prefix left of its last dot;
//! everything else is a direct entity attribute.

use crate::display::Display;
use crate::error::Result;
use crate::semantics::get_var;
use crate::session::Session;
use crate::store::Row;

pub fn info(session: &mut Session, input: &str) -> Result<Display> {
    let var = get_var(&session.symtable, input)?.clone();

    let columns = match var.entity_table.as_deref() {
        Some(table) => session.store.columns(table)?,
        None => Vec::new(),
    };

    let mut direct_attrs = Vec::new();
    let mut indirect_attrs = Vec::new();
    let mut custom_attrs = Vec::new();

    for field in &columns {
        if field.starts_with("x_") {
            custom_attrs.push(field.clone());
        } else if field.ends_with("_ref")
            || field.ends_with("_refs")
            || field.ends_with("_reference")
            || field.ends_with("_references")
        {
            // A raw reference property; not useful in this display.
        } else if field.contains("_ref.") || field.contains("_ref_") {
            indirect_attrs.push(field.clone());
        } else {
            direct_attrs.push(field.clone());
        }
    }

    let indirect_groups = group_by_prefix(&indirect_attrs);

    let mut row: Row = Row::new();
    row.insert(
        "Entity Type".into(),
        var.type_
            .as_ref()
            .map(|t| serde_json::Value::String(t.to_string()))
            .unwrap_or(serde_json::Value::Null),
    );
    row.insert("Number of Entities".into(), serde_json::Value::from(var.length));
    row.insert("Number of Records".into(), serde_json::Value::from(var.records_count));
    row.insert("Entity Attributes".into(), serde_json::Value::String(direct_attrs.join(", ")));
    row.insert(
        "Indirect Attributes".into(),
        serde_json::Value::String(indirect_groups.join("; ")),
    );
    row.insert("Customized Attributes".into(), serde_json::Value::String(custom_attrs.join(", ")));
    row.insert(
        "Birth Command".into(),
        serde_json::Value::String(var.birth_statement.command_name().to_string()),
    );
    row.insert(
        "Associated Datasource".into(),
        var.data_source
            .as_ref()
            .map(|d| serde_json::Value::String(d.to_string()))
            .unwrap_or(serde_json::Value::Null),
    );
    row.insert(
        "Dependent Variables".into(),
        serde_json::Value::String(
            var.dependent_variables
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ),
    );

    Ok(Display::table(
        vec![
            "Entity Type".into(),
            "Number of Entities".into(),
            "Number of Records".into(),
            "Entity Attributes".into(),
            "Indirect Attributes".into(),
            "Customized Attributes".into(),
            "Birth Command".into(),
            "Associated Datasource".into(),
            "Dependent Variables".into(),
        ],
        vec![row],
    ))
}

/// Groups already-sorted indirect attribute names by the prefix left of
/// their last dot, and joins each group's members with `, `.
fn group_by_prefix(attrs: &[String]) -> Vec<String> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for attr in attrs {
        let prefix = attr.rsplit_once('.').map(|(p, _)| p).unwrap_or(attr.as_str()).to_string();
        match groups.last_mut() {
            Some((last_prefix, members)) if *last_prefix == prefix => members.push(attr.clone()),
            _ => groups.push((prefix, vec![attr.clone()])),
        }
    }
    groups.into_iter().map(|(_, members)| members.join(", ")).collect()
}
