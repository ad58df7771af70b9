mod common;

use std::collections::BTreeMap;

use kestrel_exec::display::Display;
use kestrel_exec::error::KestrelError;
use kestrel_exec::statement::Statement;
use serde_json::json;

#[test]
fn apply_on_unbound_variable_raises_variable_not_exist() {
    let mut session = common::session();
    let err = session
        .execute(&Statement::Apply {
            inputs: vec!["missing".into()],
            workflow: "local:///noop".into(),
            parameter: BTreeMap::new(),
        })
        .unwrap_err();
    assert!(matches!(err, KestrelError::VariableNotExist(name) if name == "missing"));
}

#[test]
fn apply_on_empty_input_raises_empty_input_variable() {
    let mut session = common::session();
    session
        .execute(&Statement::New {
            output: "empty".into(),
            type_: Some("process".into()),
            data: json!([]),
        })
        .unwrap();

    let err = session
        .execute(&Statement::Apply {
            inputs: vec!["empty".into()],
            workflow: "local:///noop".into(),
            parameter: BTreeMap::new(),
        })
        .unwrap_err();
    assert!(matches!(err, KestrelError::EmptyInputVariable(_)));
}

#[test]
fn apply_with_no_analytics_manager_surfaces_analytics_error() {
    let mut session = common::session();
    session
        .execute(&Statement::New {
            output: "procs".into(),
            type_: Some("process".into()),
            data: json!([{"type": "process", "pid": 1}]),
        })
        .unwrap();

    let err = session
        .execute(&Statement::Apply {
            inputs: vec!["procs".into()],
            workflow: "local:///noop".into(),
            parameter: BTreeMap::new(),
        })
        .unwrap_err();
    assert!(matches!(err, KestrelError::Analytics(_)));
}

#[test]
fn disp_command_returns_none_not_apply() {
    // Sanity check that APPLY is the only command threading Display back
    // through a non-None executor path without a prior bound output.
    let mut session = common::session();
    session
        .execute(&Statement::New {
            output: "procs".into(),
            type_: Some("process".into()),
            data: json!([{"type": "process", "pid": 1}]),
        })
        .unwrap();
    let result = session
        .execute(&Statement::Info {
            input: "procs".into(),
        })
        .unwrap();
    assert!(matches!(result, Some(Display::Message(_)) | Some(Display::Table { .. })));
}
