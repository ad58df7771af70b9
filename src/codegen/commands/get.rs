//! `GET`: binds a variable from either a remote datasource or a pattern
//! evaluated against an already-bound variable.

use crate::codegen::pattern::build_pattern;
use crate::codegen::prefetch::prefetch;
use crate::error::{KestrelError, Result};
use crate::session::Session;
use crate::statement::{GetSource, Statement};
use crate::symboltable::new_var;

pub fn get(session: &mut Session, stmt: &Statement) -> Result<()> {
    let Statement::Get {
        output,
        type_,
        patternbody,
        timerange,
        source,
    } = stmt
    else {
        return Err(KestrelError::Internal("get() called with a non-Get statement".into()));
    };

    let start_offset = session.config.stixquery.timerange_start_offset;
    let stop_offset = session.config.stixquery.timerange_stop_offset;

    let pattern = build_pattern(
        patternbody,
        timerange,
        start_offset,
        stop_offset,
        &session.symtable,
        session.store.as_ref(),
    )?;

    match source {
        GetSource::Datasource(datasource) => {
            let Some(pattern) = &pattern else {
                session.store.insert_rows(output, type_, vec![], None)?;
                bind(session, stmt, output, vec![])?;
                return Ok(());
            };
            let response = session
                .datasource_manager
                .query(datasource, pattern, &session.session_id)?;
            let query_id = format!("_get_{}_{}", output, session.tracker_len());
            response.load_to_store(session.store.as_mut(), &query_id)?;
            session.store.extract(output, type_, Some(&query_id), Some(pattern))?;
            bind(session, stmt, output, vec![])?;

            if session.config.prefetch.on_get {
                if let Some(var) = session.symtable.get(output).cloned() {
                    if let Some(prefetched) = prefetch(session, &var, true)? {
                        session
                            .store
                            .merge(output, &[var.entity_table.clone().unwrap().to_string(), prefetched])?;
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
        }
        GetSource::Variablesource(var) => {
            let Some(pattern) = &pattern else {
                session.store.insert_rows(output, type_, vec![], None)?;
                bind(session, stmt, output, vec![var.clone()])?;
                return Ok(());
            };
            let src_table = session
                .symtable
                .get(var)
                .and_then(|v| v.entity_table.clone())
                .ok_or_else(|| KestrelError::VariableNotExist(var.to_string()))?;
            session.store.filter(output, type_, &src_table, Some(pattern))?;
            bind(session, stmt, output, vec![var.clone()])?;
        }
    }

    Ok(())
}

fn bind(
    session: &mut Session,
    stmt: &Statement,
    output: &str,
    dependent: Vec<smol_str::SmolStr>,
) -> Result<()> {
    let var = new_var(session.store.as_ref(), Some(output), dependent, stmt, output);
    session.symtable.bind(var);
    Ok(())
}
