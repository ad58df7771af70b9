//! `MERGE`: unions two or more variables of the same entity type.

use smol_str::SmolStr;

use crate::error::{KestrelError, Result};
use crate::semantics::get_var;
use crate::session::Session;
use crate::statement::Statement;
use crate::symboltable::new_var;

pub fn merge(session: &mut Session, output: &str, inputs: &[SmolStr]) -> Result<()> {
    let vars: Vec<_> = inputs
        .iter()
        .map(|name| get_var(&session.symtable, name).cloned())
        .collect::<Result<_>>()?;

    let types: Vec<String> = vars
        .iter()
        .filter_map(|v| v.type_.as_ref().map(|t| t.to_string()))
        .collect();
    let mut distinct = types.clone();
    distinct.sort();
    distinct.dedup();
    if distinct.len() > 1 {
        return Err(KestrelError::NonUniformEntityType(types));
    }

    let tables: Vec<String> = vars
        .iter()
        .filter_map(|v| v.entity_table.as_ref().map(|t| t.to_string()))
        .collect();
    session.store.merge(output, &tables)?;

    let stmt = Statement::Merge {
        output: SmolStr::from(output),
        inputs: inputs.to_vec(),
    };
    let var = new_var(session.store.as_ref(), Some(output), inputs.to_vec(), &stmt, output);
    session.symtable.bind(var);
    Ok(())
}
