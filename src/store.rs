//! The backing relational store contract.
//!
//! The store itself is an external collaborator — this module only
//! defines the trait command executors program against, plus a small
//! query-builder (`Query`/`Table`/`Group`/`Aggregation`, used by `GROUP`)
//! and an in-memory reference implementation used by the test suite: a
//! hand-rolled stand-in for an external collaborator that exists purely
//! so the rest of the crate can be exercised without a real backend.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{KestrelError, Result};

/// One row as returned by [`Store::lookup`]: attribute name to JSON value.
pub type Row = BTreeMap<String, Value>;

/// Per-view metadata consulted by [`crate::symboltable::new_var`].
#[derive(Debug, Clone, Default)]
pub struct ViewSummary {
    pub entity_type: Option<String>,
    pub length: u64,
    pub records_count: u64,
    pub data_source: Option<String>,
}

/// `store.assign`'s supported operators, currently just `sort` (used by
/// `SORT`); kept as an enum rather than a bare string so new assign
/// operators are a compile-time-visible addition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOp {
    Sort { by: String, ascending: bool },
}

/// A table reference in a [`Query`] pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table(pub String);

/// `Group(paths)` — the `GROUP BY` stage of a [`Query`] pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group(pub Vec<String>);

/// `Aggregation([(func, attr, alias), ...])` — the optional `WITH` stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation(pub Vec<(String, String, String)>);

/// One stage of a store query pipeline, built up the way `GROUP`
/// composes `Table(input) -> Group(paths) -> Aggregation(aggs?)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStage {
    Table(Table),
    Group(Group),
    Aggregation(Aggregation),
}

/// A query to be materialized into a view via [`Store::assign_query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub stages: Vec<QueryStage>,
}

impl Query {
    pub fn new(stages: Vec<QueryStage>) -> Self {
        Self { stages }
    }

    pub fn append(&mut self, stage: QueryStage) {
        self.stages.push(stage);
    }
}

/// The fixed SQL-like API the relational store exposes to command
/// executors. Implementations are free to be a thin shim over a real
/// database; this crate's command executors never issue SQL directly.
pub trait Store {
    /// All known entity-type names, e.g. from `store.types()`.
    fn types(&self) -> Vec<String>;

    /// Ordered column names of `table`.
    fn columns(&self, table: &str) -> Result<Vec<String>>;

    /// Whether a view by this name currently exists.
    fn view_exists(&self, view: &str) -> bool;

    /// Metadata used to populate a freshly-bound [`crate::symboltable::VarStruct`].
    fn view_summary(&self, view: &str) -> ViewSummary;

    /// Materializes `view` as the subset of `entity_type` rows loaded by
    /// `query_id` (if given) matching `pattern` (if given). At least one
    /// of `query_id`/`pattern` must be present.
    fn extract(
        &mut self,
        view: &str,
        entity_type: &str,
        query_id: Option<&str>,
        pattern: Option<&str>,
    ) -> Result<()>;

    /// Bulk-loads `rows` of `entity_type` into the store, either as a new
    /// named view (`NEW`/`LOAD`) or as a staging area later consumed by
    /// [`Store::extract`] under the same name (a datasource-manager
    /// response). `data_source` is recorded when the rows originate
    /// remotely.
    fn insert_rows(
        &mut self,
        view: &str,
        entity_type: &str,
        rows: Vec<Row>,
        data_source: Option<&str>,
    ) -> Result<()>;

    /// Unions `views` into `view`.
    fn merge(&mut self, view: &str, views: &[String]) -> Result<()>;

    /// Materializes `view` as the `entity_type` rows of `src_view` matching
    /// `pattern`.
    fn filter(
        &mut self,
        view: &str,
        entity_type: &str,
        src_view: &str,
        pattern: Option<&str>,
    ) -> Result<()>;

    /// Reads up to `limit` rows of `attrs` (all columns if empty) from `view`.
    fn lookup(&self, view: &str, attrs: &[String], limit: Option<u64>) -> Result<Vec<Row>>;

    fn rename_view(&mut self, old: &str, new: &str) -> Result<()>;

    fn remove_view(&mut self, view: &str) -> Result<()>;

    fn assign(&mut self, view: &str, src: &str, op: AssignOp) -> Result<()>;

    fn assign_query(&mut self, view: &str, query: Query) -> Result<()>;

    fn join(
        &mut self,
        view: &str,
        left: &str,
        left_path: &str,
        right: &str,
        right_path: &str,
    ) -> Result<()>;
}

pub(crate) fn store_err<E: std::fmt::Display>(e: E) -> KestrelError {
    KestrelError::Store(e.to_string())
}

pub mod memory;
pub use memory::MemoryStore;
