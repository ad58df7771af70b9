//! `FIND`: the relation compiler's main consumer.
//!
//! Resolves `<return_type> <relation> [REVERSED] <input>` to a pattern
//! body through, in order: identical-entity-type search, a fixed specific
//! relation, a generic type-pair relation, and — for a generic relation
//! between two distinct types that both pass through `x-oca-event`
//! records — an event-mediated flow search OR-combined with the raw
//! generic pattern. The event search runs two hops: an event-in pattern
//! extracts matching events into a temporary `<output>_asso_event` view,
//! then an event-out pattern is compiled against that view to reach
//! `return_type`. If no branch yields a pattern, `output` is bound empty
//! rather than erroring — "no such relation on this data" is not a user
//! mistake.

use super::{guard_empty_input, TempViewGuard};
use crate::codegen::pattern::{build_pattern, or_patterns};
use crate::codegen::relations::{
    are_entities_associated_with_x_ibm_event, compile_generic_relation_to_pattern,
    compile_identical_entity_search_pattern, compile_specific_relation_to_pattern,
    compile_x_ibm_event_search_flow_in_pattern, compile_x_ibm_event_search_flow_out_pattern,
    is_generic_relation,
};
use crate::error::{KestrelError, Result};
use crate::session::Session;
use crate::statement::Statement;
use crate::symboltable::{new_var, SymbolTable};

const EVENT_TYPE: &str = "x-oca-event";

pub fn find(session: &mut Session, stmt: &Statement) -> Result<()> {
    let Statement::Find {
        output,
        type_,
        input,
        relation,
        reversed,
        timerange,
    } = stmt
    else {
        return Err(KestrelError::Internal("find() called with a non-Find statement".into()));
    };

    let input_var = session
        .symtable
        .get(input)
        .ok_or_else(|| KestrelError::VariableNotExist(input.to_string()))?
        .clone();
    guard_empty_input(&input_var)?;

    if !session.store.types().iter().any(|t| t == type_.as_str()) {
        return bind_empty(session, stmt, output);
    }

    let Some(input_type) = input_var.type_.clone() else {
        return bind_empty(session, stmt, output);
    };
    let input_type = input_type.as_str();

    let start_offset = session.config.stixquery.timerange_start_offset;
    let stop_offset = session.config.stixquery.timerange_stop_offset;

    // Pattern compilation here only ever needs to see `input` (and, once
    // extracted, the event-flow temp view) — not every bound variable.
    let mut local_symtable = SymbolTable::new();
    local_symtable.bind(input_var.clone());

    let mut event_pattern = None;

    let raw_body = if relation.is_empty() && type_.as_str() == input_type {
        Some(compile_identical_entity_search_pattern(input))
    } else if is_generic_relation(relation) {
        let generic = compile_generic_relation_to_pattern(type_, input_type, input);

        let has_event_type = session.store.types().iter().any(|t| t == EVENT_TYPE);
        if has_event_type
            && are_entities_associated_with_x_ibm_event(input_type, type_)
            && input_type != type_.as_str()
        {
            let event_var = format!("{output}_asso_event");
            let event_in_body = compile_x_ibm_event_search_flow_in_pattern(EVENT_TYPE, input);
            if let Some(event_in_pattern) = build_pattern(
                &event_in_body,
                timerange,
                start_offset,
                stop_offset,
                &local_symtable,
                session.store.as_ref(),
            )? {
                session.store.extract(&event_var, EVENT_TYPE, None, Some(&event_in_pattern))?;
                let event_var_struct = new_var(session.store.as_ref(), Some(&event_var), vec![], stmt, &event_var);
                local_symtable.bind(event_var_struct);

                let event_out_body = compile_x_ibm_event_search_flow_out_pattern(type_, &event_var);
                event_pattern = build_pattern(
                    &event_out_body,
                    timerange,
                    start_offset,
                    stop_offset,
                    &local_symtable,
                    session.store.as_ref(),
                )?;

                if !session.debug_mode {
                    let _ = session.store.remove_view(&event_var);
                }
            }
        }
        generic
    } else {
        compile_specific_relation_to_pattern(type_, relation, input_type, *reversed, input)
    };

    let local_pattern = match &raw_body {
        Some(body) => build_pattern(body, timerange, start_offset, stop_offset, &local_symtable, session.store.as_ref())?,
        None => None,
    };

    let Some(pattern) = or_patterns([local_pattern, event_pattern]) else {
        return bind_empty(session, stmt, output);
    };

    {
        let temp = format!("_find_tmp_{output}_{}", session.tracker_len());
        let mut guard = TempViewGuard::new(session.store.as_mut(), temp.clone());
        guard.store().extract(&temp, type_, None, Some(&pattern))?;
        guard.store().rename_view(&temp, output)?;
    }

    let var = new_var(
        session.store.as_ref(),
        Some(output),
        vec![input.clone()],
        stmt,
        output,
    );
    session.symtable.bind(var);

    if session.config.prefetch.on_find {
        if let Some(var) = session.symtable.get(output).cloned() {
            if let Some(prefetched) = crate::codegen::prefetch::prefetch(session, &var, true)? {
                let table = var.entity_table.clone().unwrap().to_string();
                session.store.merge(output, &[table, prefetched])?;
                let var = new_var(
                    session.store.as_ref(),
                    Some(output),
                    var.dependent_variables.into_iter().collect(),
                    stmt,
                    output,
                );
                session.symtable.bind(var);
            }
        }
    }

    Ok(())
}

fn bind_empty(session: &mut Session, stmt: &Statement, output: &str) -> Result<()> {
    let var = crate::symboltable::VarStruct::empty(output, stmt.clone());
    session.symtable.bind(var);
    Ok(())
}
