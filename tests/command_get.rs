mod common;

use kestrel_exec::error::KestrelError;
use kestrel_exec::statement::{GetSource, Statement, TimeRange};
use serde_json::json;

#[test]
fn get_from_datasource_with_prefetch_binds_a_process_variable() {
    let mut session = common::session_with_datasource(common::FixedDataSource {
        entity_type: "process".into(),
        rows: vec![json!({
            "type": "process",
            "id": "p-1",
            "pid": 1,
            "name": "a.exe",
            "command_line": "a",
        })],
    });

    session
        .execute(&Statement::Get {
            output: "procs".into(),
            type_: "process".into(),
            patternbody: "process:pid = 1".into(),
            timerange: TimeRange::unbounded(),
            source: GetSource::Datasource("local:///ds".into()),
        })
        .unwrap();

    let var = session.symtable.get("procs").unwrap();
    assert_eq!(var.length, 1);
    assert_eq!(var.data_source.as_deref(), Some("local:///ds"));
}

#[test]
fn get_from_variablesource_filters_an_existing_variable() {
    let mut session = common::session();
    session
        .execute(&Statement::New {
            output: "procs".into(),
            type_: Some("process".into()),
            data: json!([
                {"type": "process", "pid": 1, "name": "a.exe"},
                {"type": "process", "pid": 2, "name": "b.exe"},
            ]),
        })
        .unwrap();

    session
        .execute(&Statement::Get {
            output: "subset".into(),
            type_: "process".into(),
            patternbody: "process:pid = 1".into(),
            timerange: TimeRange::unbounded(),
            source: GetSource::Variablesource("procs".into()),
        })
        .unwrap();

    let var = session.symtable.get("subset").unwrap();
    assert_eq!(var.length, 1);
}

#[test]
fn get_from_datasource_failure_propagates_as_datasource_error() {
    let mut session = common::session();
    let err = session
        .execute(&Statement::Get {
            output: "procs".into(),
            type_: "process".into(),
            patternbody: "process:pid = 1".into(),
            timerange: TimeRange::unbounded(),
            source: GetSource::Datasource("local:///ds".into()),
        })
        .unwrap_err();
    assert!(matches!(err, KestrelError::DataSource(_)));
}

#[test]
fn get_from_variablesource_on_unbound_variable_raises_variable_not_exist() {
    let mut session = common::session();
    let err = session
        .execute(&Statement::Get {
            output: "subset".into(),
            type_: "process".into(),
            patternbody: "process:pid = 1".into(),
            timerange: TimeRange::unbounded(),
            source: GetSource::Variablesource("missing".into()),
        })
        .unwrap_err();
    assert!(matches!(err, KestrelError::VariableNotExist(name) if name == "missing"));
}
