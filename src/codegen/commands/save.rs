//! `SAVE`: dumps a variable's rows to a file.

use crate::codegen::data::dump_data_to_file;
use crate::error::Result;
use crate::semantics::get_var;
use crate::session::Session;

pub fn save(session: &mut Session, input: &str, path: &str) -> Result<()> {
    let var = get_var(&session.symtable, input)?;
    let rows = match &var.entity_table {
        Some(table) => session.store.lookup(table, &[], None)?,
        None => Vec::new(),
    };
    dump_data_to_file(std::path::Path::new(path), &rows)
}
