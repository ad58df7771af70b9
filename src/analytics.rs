//! The analytics-manager contract consulted by `APPLY`.
//!
//! A real analytics manager dispatches to a workflow runtime (notebooks,
//! containerized analytics, ...); this crate only defines the seam.

use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::display::Display;
use crate::error::Result;
use crate::statement::ParamValue;
use crate::symboltable::VarStruct;

/// External collaborator invoked by `APPLY workflow_uri ON var1, var2 WITH ...`.
pub trait AnalyticsManager {
    /// Runs `workflow_uri` against `inputs`, returning whatever the
    /// workflow chooses to display. Parameters are passed through
    /// uninterpreted; the analytics manager owns their meaning.
    fn execute(
        &self,
        workflow_uri: &str,
        inputs: &[VarStruct],
        session_id: &str,
        parameters: &BTreeMap<SmolStr, ParamValue>,
    ) -> Result<Display>;
}
