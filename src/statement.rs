//! The statement data model produced by the grammar/parser.
//!
//! The grammar itself is an external collaborator: this module only
//! defines the shape of what it hands us. Rather than a dynamically-typed
//! mapping dispatched on a `command` string, a statement here is a tagged
//! union with one variant per command, dispatched exhaustively in
//! `codegen::commands`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use smol_str::SmolStr;

/// `START t'...' STOP t'...'` — both ends, or no window at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub stop: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_bounded(&self) -> bool {
        self.start.is_some() && self.stop.is_some()
    }
}

/// One `GROUP ... WITH func(attr) [AS alias]` aggregation term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub func: AggFunc,
    pub attr: SmolStr,
    pub alias: SmolStr,
}

impl Aggregation {
    /// Builds an aggregation, defaulting the alias to `func_attr` the way
    /// the grammar does when no `AS alias` is given.
    pub fn new(func: AggFunc, attr: impl Into<SmolStr>, alias: Option<SmolStr>) -> Self {
        let attr = attr.into();
        let alias = alias.unwrap_or_else(|| SmolStr::from(format!("{}_{}", func.as_str(), attr)));
        Self { func, attr, alias }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    Sum,
    Avg,
    Min,
    Max,
    Count,
    Nunique,
}

impl AggFunc {
    pub fn as_str(self) -> &'static str {
        match self {
            AggFunc::Sum => "sum",
            AggFunc::Avg => "avg",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
            AggFunc::Count => "count",
            AggFunc::Nunique => "nunique",
        }
    }
}

/// A value in an `APPLY ... WITH name=value, ...` parameter list.
/// `x=1` parses as [`ParamValue::Int`], `x=0.1` as [`ParamValue::Float`],
/// `y=a.value` as [`ParamValue::Str`], and `y=a,b,c` as [`ParamValue::List`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ParamValue>),
}

/// The sentinel input of `DISP _`, which asks for the execution-tracking
/// display rather than a bound variable's rows.
pub const TRACKING_SENTINEL: &str = "_";

/// One parsed DSL statement, tagged by command.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    New {
        output: SmolStr,
        type_: Option<SmolStr>,
        data: serde_json::Value,
    },
    Load {
        output: SmolStr,
        type_: Option<SmolStr>,
        path: SmolStr,
    },
    Save {
        input: SmolStr,
        path: SmolStr,
    },
    Info {
        input: SmolStr,
    },
    Disp {
        input: SmolStr,
        attrs: Vec<SmolStr>,
        limit: Option<u64>,
    },
    Get {
        output: SmolStr,
        type_: SmolStr,
        patternbody: SmolStr,
        timerange: TimeRange,
        source: GetSource,
    },
    Find {
        output: SmolStr,
        type_: SmolStr,
        input: SmolStr,
        relation: SmolStr,
        reversed: bool,
        timerange: TimeRange,
    },
    Join {
        output: SmolStr,
        input: SmolStr,
        path: SmolStr,
        input_2: SmolStr,
        path_2: SmolStr,
    },
    Group {
        output: SmolStr,
        input: SmolStr,
        paths: Vec<SmolStr>,
        aggregations: Option<Vec<Aggregation>>,
    },
    Sort {
        output: SmolStr,
        input: SmolStr,
        path: SmolStr,
        ascending: bool,
    },
    Apply {
        inputs: Vec<SmolStr>,
        workflow: SmolStr,
        parameter: BTreeMap<SmolStr, ParamValue>,
    },
    Merge {
        output: SmolStr,
        inputs: Vec<SmolStr>,
    },
}

/// `GET`'s two mutually-exclusive sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetSource {
    Datasource(SmolStr),
    Variablesource(SmolStr),
}

impl Statement {
    /// The destination variable name, absent for terminal commands
    /// (`SAVE`, `INFO`, `DISP`, `APPLY`).
    pub fn output(&self) -> Option<&str> {
        match self {
            Statement::New { output, .. }
            | Statement::Load { output, .. }
            | Statement::Get { output, .. }
            | Statement::Find { output, .. }
            | Statement::Join { output, .. }
            | Statement::Group { output, .. }
            | Statement::Sort { output, .. }
            | Statement::Merge { output, .. } => Some(output.as_str()),
            Statement::Save { .. }
            | Statement::Info { .. }
            | Statement::Disp { .. }
            | Statement::Apply { .. } => None,
        }
    }

    /// Every upstream variable name this statement reads, used both to
    /// populate `VarStruct::dependent_variables` and by the
    /// guard-empty-input middleware.
    pub fn input_var_names(&self) -> Vec<&str> {
        match self {
            Statement::New { .. } | Statement::Load { .. } => vec![],
            Statement::Save { input, .. }
            | Statement::Info { input }
            | Statement::Disp { input, .. } => vec![input.as_str()],
            Statement::Get { source, .. } => match source {
                GetSource::Variablesource(v) => vec![v.as_str()],
                GetSource::Datasource(_) => vec![],
            },
            Statement::Find { input, .. } => vec![input.as_str()],
            Statement::Join {
                input, input_2, ..
            } => vec![input.as_str(), input_2.as_str()],
            Statement::Group { input, .. } | Statement::Sort { input, .. } => {
                vec![input.as_str()]
            }
            Statement::Apply { inputs, .. } | Statement::Merge { inputs, .. } => {
                inputs.iter().map(|s| s.as_str()).collect()
            }
        }
    }

    pub fn command_name(&self) -> &'static str {
        match self {
            Statement::New { .. } => "NEW",
            Statement::Load { .. } => "LOAD",
            Statement::Save { .. } => "SAVE",
            Statement::Info { .. } => "INFO",
            Statement::Disp { .. } => "DISP",
            Statement::Get { .. } => "GET",
            Statement::Find { .. } => "FIND",
            Statement::Join { .. } => "JOIN",
            Statement::Group { .. } => "GROUP",
            Statement::Sort { .. } => "SORT",
            Statement::Apply { .. } => "APPLY",
            Statement::Merge { .. } => "MERGE",
        }
    }
}
