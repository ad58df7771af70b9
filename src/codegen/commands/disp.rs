//! `DISP`: renders a variable's rows, or — for the `_` sentinel — the
//! execution-tracking graph.

use smol_str::SmolStr;

use crate::display::Display;
use crate::error::Result;
use crate::semantics::get_var;
use crate::session::Session;
use crate::statement::TRACKING_SENTINEL;

pub fn disp(session: &mut Session, input: &str, attrs: &[SmolStr], limit: Option<u64>) -> Result<Display> {
    if input == TRACKING_SENTINEL {
        return Ok(Display::Html(session.tracker.to_html()));
    }

    let var = get_var(&session.symtable, input)?;
    let Some(table) = &var.entity_table else {
        return Ok(Display::table(vec![], vec![]));
    };
    let attrs: Vec<String> = attrs.iter().map(|a| a.to_string()).collect();
    let columns = if attrs.is_empty() {
        session.store.columns(table)?
    } else {
        attrs.clone()
    };
    let rows = session.store.lookup(table, &attrs, limit)?;
    Ok(Display::table(columns, rows))
}
