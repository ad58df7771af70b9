mod common;

use kestrel_exec::error::KestrelError;
use kestrel_exec::statement::Statement;
use serde_json::json;

fn bind_two_process_vars(session: &mut kestrel_exec::session::Session) {
    session
        .execute(&Statement::New {
            output: "a".into(),
            type_: Some("process".into()),
            data: json!([
                {"type": "process", "pid": 2, "name": "b.exe"},
                {"type": "process", "pid": 1, "name": "a.exe"},
            ]),
        })
        .unwrap();
    session
        .execute(&Statement::New {
            output: "b".into(),
            type_: Some("network-traffic".into()),
            data: json!([{"type": "network-traffic", "src_port": 1}]),
        })
        .unwrap();
}

#[test]
fn sort_orders_rows_by_path() {
    let mut session = common::session();
    bind_two_process_vars(&mut session);

    session
        .execute(&Statement::Sort {
            output: "sorted".into(),
            input: "a".into(),
            path: "pid".into(),
            ascending: true,
        })
        .unwrap();

    let table = session.symtable.get("sorted").unwrap().entity_table.clone().unwrap();
    let rows = session.store.lookup(&table, &["pid".into()], None).unwrap();
    assert_eq!(rows[0].get("pid").unwrap(), &json!(1));
    assert_eq!(rows[1].get("pid").unwrap(), &json!(2));
}

#[test]
fn merge_of_different_entity_types_fails() {
    let mut session = common::session();
    bind_two_process_vars(&mut session);

    let err = session
        .execute(&Statement::Merge {
            output: "merged".into(),
            inputs: vec!["a".into(), "b".into()],
        })
        .unwrap_err();
    assert!(matches!(err, KestrelError::NonUniformEntityType(_)));
}

#[test]
fn merge_of_same_entity_type_unions_rows() {
    let mut session = common::session();
    session
        .execute(&Statement::New {
            output: "a".into(),
            type_: Some("process".into()),
            data: json!([{"type": "process", "pid": 1}]),
        })
        .unwrap();
    session
        .execute(&Statement::New {
            output: "b".into(),
            type_: Some("process".into()),
            data: json!([{"type": "process", "pid": 2}]),
        })
        .unwrap();

    session
        .execute(&Statement::Merge {
            output: "merged".into(),
            inputs: vec!["a".into(), "b".into()],
        })
        .unwrap();

    let var = session.symtable.get("merged").unwrap();
    assert_eq!(var.length, 2);
}

#[test]
fn join_matches_rows_on_equal_paths() {
    let mut session = common::session();
    session
        .execute(&Statement::New {
            output: "procs".into(),
            type_: Some("process".into()),
            data: json!([{"type": "process", "pid": 1, "id": "p-1"}]),
        })
        .unwrap();
    session
        .execute(&Statement::New {
            output: "conns".into(),
            type_: Some("network-traffic".into()),
            data: json!([{"type": "network-traffic", "process_ref": "p-1", "src_port": 80}]),
        })
        .unwrap();

    session
        .execute(&Statement::Join {
            output: "joined".into(),
            input: "procs".into(),
            path: "id".into(),
            input_2: "conns".into(),
            path_2: "process_ref".into(),
        })
        .unwrap();

    let var = session.symtable.get("joined").unwrap();
    assert_eq!(var.length, 1);
}

#[test]
fn sort_on_empty_input_raises_empty_input_variable() {
    let mut session = common::session();
    session
        .execute(&Statement::New {
            output: "empty".into(),
            type_: Some("process".into()),
            data: json!([]),
        })
        .unwrap();

    let err = session
        .execute(&Statement::Sort {
            output: "sorted".into(),
            input: "empty".into(),
            path: "pid".into(),
            ascending: true,
        })
        .unwrap_err();
    assert!(matches!(err, KestrelError::EmptyInputVariable(_)));
}
