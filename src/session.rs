//! The execution context threaded through every command executor.
//!
//! An explicit, owned value rather than thread-/global-local state, so
//! nothing about command execution depends on being called from one
//! particular thread.

use chrono::Utc;
use smol_str::SmolStr;

use crate::analytics::AnalyticsManager;
use crate::config::Config;
use crate::datasource::DataSourceManager;
use crate::display::Display;
use crate::error::Result;
use crate::statement::Statement;
use crate::store::Store;
use crate::symboltable::SymbolTable;
use crate::tracking::ExecutionTracker;

/// Everything one DSL session owns: the backing store, the bound
/// variables, configuration, the execution-tracking graph, and the two
/// external collaborators (`GET`'s datasource manager, `APPLY`'s analytics
/// manager).
pub struct Session {
    pub session_id: SmolStr,
    pub store: Box<dyn Store>,
    pub symtable: SymbolTable,
    pub config: Config,
    pub tracker: ExecutionTracker,
    pub datasource_manager: Box<dyn DataSourceManager>,
    pub analytics_manager: Box<dyn AnalyticsManager>,
    pub debug_mode: bool,
}

impl Session {
    pub fn new(
        session_id: impl Into<SmolStr>,
        store: Box<dyn Store>,
        datasource_manager: Box<dyn DataSourceManager>,
        analytics_manager: Box<dyn AnalyticsManager>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            store,
            symtable: SymbolTable::new(),
            config: Config::default(),
            tracker: ExecutionTracker::new(),
            datasource_manager,
            analytics_manager,
            debug_mode: false,
        }
    }

    /// Number of statements executed so far, used to derive unique
    /// temporary view names.
    pub fn tracker_len(&self) -> usize {
        self.tracker.len()
    }

    /// Executes one statement through [`crate::codegen::commands::execute`],
    /// recording it in the tracking graph regardless of outcome so a
    /// failed statement still shows up in `DISP _`.
    pub fn execute(&mut self, stmt: &Statement) -> Result<Option<Display>> {
        if self.debug_mode {
            tracing::debug!(command = stmt.command_name(), "executing statement");
        }
        let result = crate::codegen::commands::execute(self, stmt);
        self.tracker.record(stmt, Utc::now());
        result
    }
}
