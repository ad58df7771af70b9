//! `APPLY`: dispatches a set of variables to an external analytics
//! workflow and returns whatever it chooses to display.

use std::collections::BTreeMap;

use smol_str::SmolStr;

use super::guard_empty_input;
use crate::display::Display;
use crate::error::Result;
use crate::semantics::get_var;
use crate::session::Session;
use crate::statement::ParamValue;

pub fn apply(
    session: &mut Session,
    inputs: &[SmolStr],
    workflow: &str,
    parameter: &BTreeMap<SmolStr, ParamValue>,
) -> Result<Display> {
    let vars: Vec<_> = inputs
        .iter()
        .map(|name| get_var(&session.symtable, name).cloned())
        .collect::<Result<_>>()?;
    for var in &vars {
        guard_empty_input(var)?;
    }
    session
        .analytics_manager
        .execute(workflow, &vars, &session.session_id, parameter)
}
