//! Command execution core for a threat-hunting query language over STIX
//! cyber-observable data.
//!
//! A [`session::Session`] owns the backing [`store::Store`], the
//! [`symboltable::SymbolTable`] of bound variables, [`config::Config`],
//! and the [`tracking::ExecutionTracker`] DAG. Feeding it parsed
//! [`statement::Statement`]s one at a time through [`session::Session::execute`]
//! runs the same command-dispatch loop a DSL interpreter's outer REPL
//! would, minus the grammar itself — parsing a source string into
//! `Statement`s is out of scope here.
//!
//! ```
//! use kestrel_exec::session::Session;
//! use kestrel_exec::store::memory::MemoryStore;
//! use kestrel_exec::statement::Statement;
//! # use kestrel_exec::analytics::AnalyticsManager;
//! # use kestrel_exec::datasource::DataSourceManager;
//! # use kestrel_exec::display::Display;
//! # use kestrel_exec::error::{KestrelError, Result};
//! # use kestrel_exec::statement::ParamValue;
//! # use kestrel_exec::symboltable::VarStruct;
//! # use smol_str::SmolStr;
//! # use std::collections::BTreeMap;
//! #
//! # struct NoDataSource;
//! # impl DataSourceManager for NoDataSource {
//! #     fn query(&self, _: &str, _: &str, _: &str) -> Result<kestrel_exec::datasource::Response> {
//! #         Err(KestrelError::DataSource("no datasource configured".into()))
//! #     }
//! # }
//! # struct NoAnalytics;
//! # impl AnalyticsManager for NoAnalytics {
//! #     fn execute(&self, _: &str, _: &[VarStruct], _: &str, _: &BTreeMap<SmolStr, ParamValue>) -> Result<Display> {
//! #         Err(KestrelError::Analytics("no analytics manager configured".into()))
//! #     }
//! # }
//! let mut session = Session::new(
//!     "demo-session",
//!     Box::new(MemoryStore::new()),
//!     Box::new(NoDataSource),
//!     Box::new(NoAnalytics),
//! );
//!
//! session
//!     .execute(&Statement::New {
//!         output: "procs".into(),
//!         type_: Some("process".into()),
//!         data: serde_json::json!([{"type": "process", "pid": 1, "name": "a.exe"}]),
//!     })
//!     .unwrap();
//!
//! assert!(session.symtable.contains("procs"));
//! ```

pub mod analytics;
pub mod codegen;
pub mod config;
pub mod datasource;
pub mod display;
pub mod error;
pub mod semantics;
pub mod session;
pub mod statement;
pub mod store;
pub mod symboltable;
pub mod tracking;

pub use error::{KestrelError, Result};
pub use session::Session;
pub use statement::Statement;
