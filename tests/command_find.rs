mod common;

use kestrel_exec::statement::{Statement, TimeRange};
use serde_json::json;

#[test]
fn find_identical_entity_type_returns_the_same_rows() {
    let mut session = common::session();
    session
        .execute(&Statement::New {
            output: "x".into(),
            type_: Some("process".into()),
            data: json!([{"type": "process", "pid": 1, "name": "a.exe", "command_line": "a"}]),
        })
        .unwrap();

    session
        .execute(&Statement::Find {
            output: "y".into(),
            type_: "process".into(),
            input: "x".into(),
            relation: "".into(),
            reversed: false,
            timerange: TimeRange::unbounded(),
        })
        .unwrap();

    let var = session.symtable.get("y").unwrap();
    assert_eq!(var.length, 1);
}

#[test]
fn find_specific_relation_parent_follows_the_ref() {
    let mut session = common::session();
    session
        .execute(&Statement::New {
            output: "parents".into(),
            type_: Some("process".into()),
            data: json!([{"type": "process", "id": "p-1", "pid": 100, "name": "parent.exe"}]),
        })
        .unwrap();
    session
        .execute(&Statement::New {
            output: "children".into(),
            type_: Some("process".into()),
            data: json!([{"type": "process", "id": "c-1", "pid": 200, "name": "child.exe", "parent_ref": "p-1"}]),
        })
        .unwrap();

    session
        .execute(&Statement::Find {
            output: "found_parents".into(),
            type_: "process".into(),
            input: "children".into(),
            relation: "parent".into(),
            reversed: false,
            timerange: TimeRange::unbounded(),
        })
        .unwrap();

    let var = session.symtable.get("found_parents").unwrap();
    assert_eq!(var.length, 1);
}

#[test]
fn find_with_no_matching_relation_binds_an_empty_variable() {
    let mut session = common::session();
    session
        .execute(&Statement::New {
            output: "urls".into(),
            type_: Some("url".into()),
            data: json!([{"type": "url", "value": "http://example.com"}]),
        })
        .unwrap();

    session
        .execute(&Statement::Find {
            output: "nothing".into(),
            type_: "windows-registry-key".into(),
            input: "urls".into(),
            relation: "unrelated".into(),
            reversed: false,
            timerange: TimeRange::unbounded(),
        })
        .unwrap();

    let var = session.symtable.get("nothing").unwrap();
    assert_eq!(var.length, 0);
    assert!(var.type_.is_none());
}

#[test]
fn find_on_unbound_input_raises_variable_not_exist() {
    let mut session = common::session();
    let err = session
        .execute(&Statement::Find {
            output: "y".into(),
            type_: "process".into(),
            input: "missing".into(),
            relation: "".into(),
            reversed: false,
            timerange: TimeRange::unbounded(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        kestrel_exec::error::KestrelError::VariableNotExist(name) if name == "missing"
    ));
}
