//! The error taxonomy surfaced by command execution.
//!
//! Every variant corresponds to a row in the failure taxonomy: some are
//! always surfaced to the caller, `InvalidAttribute` is recovered locally
//! by the event-flow branch of `FIND` and surfaced everywhere else, and
//! `Internal` indicates a parser/executor contract violation rather than
//! a user-facing mistake.

use miette::Diagnostic;
use thiserror::Error;

use crate::symboltable::VarStruct;

/// Errors raised while executing a parsed [`crate::statement::Statement`].
#[derive(Debug, Error, Diagnostic)]
pub enum KestrelError {
    /// Reference to a variable name that was never bound in the symbol table.
    #[error("variable '{0}' does not exist")]
    #[diagnostic(code(kestrel::variable_not_exist))]
    VariableNotExist(String),

    /// A guarded command was given an input variable with no rows at all.
    #[error("input variable '{}' is empty", .0.name)]
    #[diagnostic(code(kestrel::empty_input_variable))]
    EmptyInputVariable(VarStruct),

    /// `MERGE` was given inputs of more than one entity type.
    #[error("cannot merge variables of different entity types: {0:?}")]
    #[diagnostic(code(kestrel::non_uniform_entity_type))]
    NonUniformEntityType(Vec<String>),

    /// Pattern compilation referenced a column absent from the store schema.
    #[error("attribute '{attribute}' does not exist on entity type '{entity_type}'")]
    #[diagnostic(code(kestrel::invalid_attribute))]
    InvalidAttribute {
        entity_type: String,
        attribute: String,
    },

    /// A `GET` statement carried neither `datasource` nor `variablesource`.
    ///
    /// This can only happen if the parser/executor contract is violated —
    /// it is never a consequence of user input.
    #[error("internal error: {0}")]
    #[diagnostic(code(kestrel::internal))]
    Internal(String),

    /// Failure propagated from the backing relational store.
    #[error("store error: {0}")]
    #[diagnostic(code(kestrel::store))]
    Store(String),

    /// Failure propagated from the datasource-manager.
    #[error("datasource error: {0}")]
    #[diagnostic(code(kestrel::datasource))]
    DataSource(String),

    /// Failure propagated from the analytics-manager.
    #[error("analytics error: {0}")]
    #[diagnostic(code(kestrel::analytics))]
    Analytics(String),
}

pub type Result<T> = std::result::Result<T, KestrelError>;
