//! Variable bindings tracked across a session.
//!
//! Variable binding metadata keyed by name, one flat table rather than
//! nested scopes — this crate has no lexical scoping, every DSL variable
//! lives in one session-wide table.

use std::collections::{BTreeMap, BTreeSet};

use smol_str::SmolStr;

use crate::statement::Statement;

/// The first-class variable descriptor bound to a DSL identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct VarStruct {
    /// DSL identifier this descriptor is bound to.
    pub name: SmolStr,
    /// STIX entity type, or `None` for an empty variable.
    pub type_: Option<SmolStr>,
    /// The view name in the store, or `None` when the variable is empty.
    pub entity_table: Option<SmolStr>,
    /// Distinct entity count.
    pub length: u64,
    /// Underlying observation/record count.
    pub records_count: u64,
    /// Origin URI if fetched remotely; `None` for synthetic data.
    pub data_source: Option<SmolStr>,
    /// The statement that produced this variable.
    pub birth_statement: Statement,
    /// Upstream variable names referenced by `birth_statement`.
    pub dependent_variables: BTreeSet<SmolStr>,
}

impl VarStruct {
    /// An empty variable with no backing view, as bound by e.g. `FIND`
    /// against an unrecognized return type.
    pub fn empty(name: impl Into<SmolStr>, birth_statement: Statement) -> Self {
        let dependent_variables = birth_statement_deps(&birth_statement);
        Self {
            name: name.into(),
            type_: None,
            entity_table: None,
            length: 0,
            records_count: 0,
            data_source: None,
            birth_statement,
            dependent_variables,
        }
    }

    /// Whether this variable participates in prefetch: non-empty and
    /// carrying a remote origin.
    pub fn can_prefetch(&self) -> bool {
        self.data_source.is_some() && (self.length > 0 || self.records_count > 0)
    }

    /// Guard-empty-input predicate shared by several executors.
    pub fn is_empty_input(&self) -> bool {
        self.length + self.records_count == 0
    }
}

fn birth_statement_deps(stmt: &Statement) -> BTreeSet<SmolStr> {
    stmt.input_var_names()
        .into_iter()
        .map(SmolStr::from)
        .collect()
}

/// The session's flat map from variable name to its current descriptor.
///
/// Rebinding a name replaces its entry; the previous [`VarStruct`] is
/// simply dropped, so there are never dangling references into an old
/// binding (see the design note on avoiding back-pointers).
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    vars: BTreeMap<SmolStr, VarStruct>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&VarStruct> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &SmolStr> {
        self.vars.keys()
    }

    /// Binds (or rebinds) `var` under its own name.
    pub fn bind(&mut self, var: VarStruct) {
        self.vars.insert(var.name.clone(), var);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &VarStruct)> {
        self.vars.iter()
    }
}

/// Constructs the [`VarStruct`] for a freshly-created or freshly-opened
/// store view and binds it into `symtable`.
///
/// The store is queried for the view's current row/record counts and
/// entity type so the descriptor always reflects the store's present
/// state at bind time.
pub fn new_var(
    store: &dyn crate::store::Store,
    entity_table: Option<&str>,
    dependent_variables: Vec<SmolStr>,
    stmt: &Statement,
    name: &str,
) -> VarStruct {
    let (type_, length, records_count, data_source) = match entity_table {
        Some(table) if store.types().iter().any(|t| t == table) || store.view_exists(table) => {
            let summary = store.view_summary(table);
            (
                summary.entity_type.map(SmolStr::from),
                summary.length,
                summary.records_count,
                summary.data_source.map(SmolStr::from),
            )
        }
        _ => (None, 0, 0, None),
    };

    let mut deps: BTreeSet<SmolStr> = dependent_variables.into_iter().collect();
    deps.extend(birth_statement_deps(stmt));

    VarStruct {
        name: SmolStr::from(name),
        type_,
        entity_table: entity_table.map(SmolStr::from),
        length,
        records_count,
        data_source,
        birth_statement: stmt.clone(),
        dependent_variables: deps,
    }
}
