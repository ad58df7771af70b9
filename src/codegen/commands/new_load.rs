//! `NEW` and `LOAD`: bind a fresh variable over literal or file-backed data.

use smol_str::SmolStr;

use crate::codegen::data::{infer_entity_type, load_data, load_data_file};
use crate::error::Result;
use crate::session::Session;
use crate::statement::Statement;
use crate::symboltable::new_var;

pub fn new(session: &mut Session, output: &str, type_: Option<&str>, data: &serde_json::Value) -> Result<()> {
    let entity_type = match type_ {
        Some(t) => t.to_string(),
        None => infer_entity_type(data)?,
    };
    let rows = load_data(data)?;
    session
        .store
        .insert_rows(output, &entity_type, rows, None)?;
    let stmt = Statement::New {
        output: SmolStr::from(output),
        type_: type_.map(SmolStr::from),
        data: data.clone(),
    };
    let var = new_var(session.store.as_ref(), Some(output), vec![], &stmt, output);
    session.symtable.bind(var);
    Ok(())
}

pub fn load(session: &mut Session, output: &str, type_: Option<&str>, path: &str) -> Result<()> {
    let data = load_data_file(std::path::Path::new(path))?;
    let entity_type = match type_ {
        Some(t) => t.to_string(),
        None => infer_entity_type(&data)?,
    };
    let rows = load_data(&data)?;
    session
        .store
        .insert_rows(output, &entity_type, rows, None)?;
    let stmt = Statement::Load {
        output: SmolStr::from(output),
        type_: type_.map(SmolStr::from),
        path: SmolStr::from(path),
    };
    let var = new_var(session.store.as_ref(), Some(output), vec![], &stmt, output);
    session.symtable.bind(var);
    Ok(())
}
