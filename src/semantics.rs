//! Small symbol-table resolution helpers shared across command executors.
//!
//! Every command that reads a variable starts by resolving it through
//! these two functions rather than indexing `SymbolTable` directly, so the
//! `VariableNotExist` error is raised in exactly one place.

use crate::error::{KestrelError, Result};
use crate::symboltable::{SymbolTable, VarStruct};

pub fn get_var<'a>(symtable: &'a SymbolTable, name: &str) -> Result<&'a VarStruct> {
    symtable
        .get(name)
        .ok_or_else(|| KestrelError::VariableNotExist(name.to_string()))
}

/// The store view backing `name`, or `None` for an empty variable.
pub fn get_entity_table<'a>(symtable: &'a SymbolTable, name: &str) -> Result<Option<&'a str>> {
    Ok(get_var(symtable, name)?.entity_table.as_deref())
}

/// The STIX entity type bound to `name`, or `None` for an empty variable.
pub fn get_entity_type<'a>(symtable: &'a SymbolTable, name: &str) -> Result<Option<&'a str>> {
    Ok(get_var(symtable, name)?.type_.as_deref())
}
