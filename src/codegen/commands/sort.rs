//! `SORT`: orders a variable's rows by a dotted attribute path.

use smol_str::SmolStr;

use super::guard_empty_input;
use crate::error::{KestrelError, Result};
use crate::semantics::get_var;
use crate::session::Session;
use crate::statement::Statement;
use crate::store::AssignOp;
use crate::symboltable::new_var;

pub fn sort(session: &mut Session, output: &str, input: &str, path: &str, ascending: bool) -> Result<()> {
    let var = get_var(&session.symtable, input)?.clone();
    guard_empty_input(&var)?;
    let Some(table) = &var.entity_table else {
        return Err(KestrelError::Internal(format!(
            "SORT given an input variable with no backing view: '{input}'"
        )));
    };

    session.store.assign(
        output,
        table,
        AssignOp::Sort {
            by: path.to_string(),
            ascending,
        },
    )?;

    let stmt = Statement::Sort {
        output: SmolStr::from(output),
        input: SmolStr::from(input),
        path: SmolStr::from(path),
        ascending,
    };
    let var = new_var(
        session.store.as_ref(),
        Some(output),
        vec![SmolStr::from(input)],
        &stmt,
        output,
    );
    session.symtable.bind(var);
    Ok(())
}
