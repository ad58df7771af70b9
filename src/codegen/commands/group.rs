//! `GROUP`: collapses a variable's rows by one or more attribute paths,
//! optionally computing aggregations per group.

use smol_str::SmolStr;

use super::guard_empty_input;
use crate::error::{KestrelError, Result};
use crate::semantics::get_var;
use crate::session::Session;
use crate::statement::{Aggregation, Statement};
use crate::store::{Aggregation as StoreAggregation, Group as StoreGroup, Query, QueryStage, Table};
use crate::symboltable::new_var;

pub fn group(
    session: &mut Session,
    output: &str,
    input: &str,
    paths: &[SmolStr],
    aggregations: Option<&[Aggregation]>,
) -> Result<()> {
    let var = get_var(&session.symtable, input)?.clone();
    guard_empty_input(&var)?;
    let Some(table) = &var.entity_table else {
        return Err(KestrelError::Internal(format!(
            "GROUP given an input variable with no backing view: '{input}'"
        )));
    };

    let mut query = Query::new(vec![QueryStage::Table(Table(table.to_string()))]);
    query.append(QueryStage::Group(StoreGroup(
        paths.iter().map(|p| p.to_string()).collect(),
    )));
    if let Some(aggs) = aggregations {
        query.append(QueryStage::Aggregation(StoreAggregation(
            aggs.iter()
                .map(|a| (a.func.as_str().to_string(), a.attr.to_string(), a.alias.to_string()))
                .collect(),
        )));
    }
    session.store.assign_query(output, query)?;

    let stmt = Statement::Group {
        output: SmolStr::from(output),
        input: SmolStr::from(input),
        paths: paths.to_vec(),
        aggregations: aggregations.map(|a| a.to_vec()),
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
