//! `JOIN`: an equi-join of two variables on a dotted attribute path each.

use super::guard_empty_input;
use crate::error::{KestrelError, Result};
use crate::semantics::get_var;
use crate::session::Session;
use crate::statement::Statement;
use crate::symboltable::new_var;
use smol_str::SmolStr;

pub fn join(
    session: &mut Session,
    output: &str,
    input: &str,
    path: &str,
    input_2: &str,
    path_2: &str,
) -> Result<()> {
    let left = get_var(&session.symtable, input)?.clone();
    let right = get_var(&session.symtable, input_2)?.clone();
    guard_empty_input(&left)?;
    guard_empty_input(&right)?;
    let (Some(left_table), Some(right_table)) = (&left.entity_table, &right.entity_table) else {
        return Err(KestrelError::Internal(format!(
            "JOIN given an input variable with no backing view: '{input}' or '{input_2}'"
        )));
    };

    session
        .store
        .join(output, left_table, path, right_table, path_2)?;

    let stmt = Statement::Join {
        output: SmolStr::from(output),
        input: SmolStr::from(input),
        path: SmolStr::from(path),
        input_2: SmolStr::from(input_2),
        path_2: SmolStr::from(path_2),
    };
    let var = new_var(
        session.store.as_ref(),
        Some(output),
        vec![SmolStr::from(input), SmolStr::from(input_2)],
        &stmt,
        output,
    );
    session.symtable.bind(var);
    Ok(())
}
