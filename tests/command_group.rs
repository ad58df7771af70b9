mod common;

use kestrel_exec::statement::{AggFunc, Aggregation, Statement};
use serde_json::json;

#[test]
fn group_collapses_duplicates_on_a_ref_attribute() {
    let mut session = common::session();
    session
        .execute(&Statement::New {
            output: "procs".into(),
            type_: Some("process".into()),
            data: json!([
                {"type": "process", "pid": 1, "parent_ref": "p-1"},
                {"type": "process", "pid": 2, "parent_ref": "p-1"},
                {"type": "process", "pid": 3, "parent_ref": "p-2"},
            ]),
        })
        .unwrap();

    session
        .execute(&Statement::Group {
            output: "by_parent".into(),
            input: "procs".into(),
            paths: vec!["parent_ref".into()],
            aggregations: None,
        })
        .unwrap();

    let var = session.symtable.get("by_parent").unwrap();
    assert_eq!(var.length, 2);
}

#[test]
fn group_aggregation_defaults_alias_to_func_attr() {
    let agg = Aggregation::new(AggFunc::Count, "pid", None);
    assert_eq!(agg.alias.as_str(), "count_pid");

    let named = Aggregation::new(AggFunc::Sum, "pid", Some("total".into()));
    assert_eq!(named.alias.as_str(), "total");
}

#[test]
fn group_with_aggregation_binds_successfully() {
    let mut session = common::session();
    session
        .execute(&Statement::New {
            output: "procs".into(),
            type_: Some("process".into()),
            data: json!([
                {"type": "process", "pid": 1, "name": "a.exe"},
                {"type": "process", "pid": 2, "name": "a.exe"},
            ]),
        })
        .unwrap();

    session
        .execute(&Statement::Group {
            output: "by_name".into(),
            input: "procs".into(),
            paths: vec!["name".into()],
            aggregations: Some(vec![Aggregation::new(AggFunc::Count, "pid", None)]),
        })
        .unwrap();

    assert!(session.symtable.contains("by_name"));
}
