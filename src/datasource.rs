//! The datasource-manager contract consulted by `GET` and by prefetch.
//!
//! A real datasource manager dispatches to a data-connector framework;
//! this crate only defines the seam it is called through.

use crate::error::Result;
use crate::store::{Row, Store};

/// The raw rows returned by a remote query, not yet materialized into a
/// store view.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub entity_type: String,
    pub rows: Vec<Row>,
    pub datasource_uri: String,
}

impl Response {
    /// Materializes the response into `store` under a fresh view named
    /// `query_id`. The returned id is what `Store::extract` later
    /// consumes.
    pub fn load_to_store(&self, store: &mut dyn Store, query_id: &str) -> Result<()> {
        store.insert_rows(
            query_id,
            &self.entity_type,
            self.rows.clone(),
            Some(&self.datasource_uri),
        )
    }
}

/// External collaborator queried by `GET ... FROM <datasource_uri>` and by
/// prefetch when a bound variable's origin is remote.
pub trait DataSourceManager {
    /// Runs `stix_pattern` against `datasource_uri` and returns the raw
    /// rows, tagged with `session_id` for connector-side correlation.
    fn query(&self, datasource_uri: &str, stix_pattern: &str, session_id: &str) -> Result<Response>;
}
