use std::collections::BTreeMap;

use kestrel_exec::analytics::AnalyticsManager;
use kestrel_exec::datasource::{DataSourceManager, Response};
use kestrel_exec::display::Display;
use kestrel_exec::error::{KestrelError, Result};
use kestrel_exec::session::Session;
use kestrel_exec::statement::ParamValue;
use kestrel_exec::store::memory::MemoryStore;
use kestrel_exec::symboltable::VarStruct;
use serde_json::Value;
use smol_str::SmolStr;

pub struct NoDataSource;
impl DataSourceManager for NoDataSource {
    fn query(&self, _datasource_uri: &str, _pattern: &str, _session_id: &str) -> Result<Response> {
        Err(KestrelError::DataSource("no datasource configured in this test".into()))
    }
}

pub struct NoAnalytics;
impl AnalyticsManager for NoAnalytics {
    fn execute(
        &self,
        _workflow_uri: &str,
        _inputs: &[VarStruct],
        _session_id: &str,
        _parameters: &BTreeMap<SmolStr, ParamValue>,
    ) -> Result<Display> {
        Err(KestrelError::Analytics("no analytics manager configured in this test".into()))
    }
}

/// A fixed datasource that always returns the same canned rows,
/// regardless of the pattern asked for — enough to exercise prefetch
/// without a real connector.
pub struct FixedDataSource {
    pub entity_type: String,
    pub rows: Vec<Value>,
}

impl DataSourceManager for FixedDataSource {
    fn query(&self, datasource_uri: &str, _pattern: &str, _session_id: &str) -> Result<Response> {
        let rows = self
            .rows
            .iter()
            .map(|v| v.as_object().unwrap().clone().into_iter().collect())
            .collect();
        Ok(Response {
            entity_type: self.entity_type.clone(),
            rows,
            datasource_uri: datasource_uri.to_string(),
        })
    }
}

pub fn session() -> Session {
    Session::new(
        "test-session",
        Box::new(MemoryStore::new()),
        Box::new(NoDataSource),
        Box::new(NoAnalytics),
    )
}

pub fn session_with_datasource(ds: FixedDataSource) -> Session {
    Session::new("test-session", Box::new(MemoryStore::new()), Box::new(ds), Box::new(NoAnalytics))
}
