//! The execution-tracking DAG consulted by `DISP _`.
//!
//! Each executed statement becomes a node; edges wire a statement to the
//! most recent producer of each variable it reads, the same shape a
//! definition/usage dependency graph takes, backed by `petgraph` rather
//! than a hand-rolled adjacency structure.

use chrono::{DateTime, Utc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use smol_str::SmolStr;
use std::collections::BTreeMap;

use crate::statement::Statement;

/// One executed statement, as recorded in the tracking graph.
#[derive(Debug, Clone)]
pub struct Step {
    pub command: &'static str,
    pub output: Option<SmolStr>,
    pub inputs: Vec<SmolStr>,
    pub timestamp: DateTime<Utc>,
}

/// The DAG of statements (nodes) and their variable dependencies (edges),
/// one node per executed statement in session order.
#[derive(Debug, Default)]
pub struct ExecutionTracker {
    graph: DiGraph<Step, ()>,
    producer: BTreeMap<SmolStr, NodeIndex>,
}

impl ExecutionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `stmt` as the next executed step, wiring an edge from every
    /// upstream variable's most recent producing step, and records
    /// `output` (if any) as that variable's new producer.
    pub fn record(&mut self, stmt: &Statement, timestamp: DateTime<Utc>) -> NodeIndex {
        let inputs: Vec<SmolStr> = stmt.input_var_names().into_iter().map(SmolStr::from).collect();
        let output = stmt.output().map(SmolStr::from);
        let node = self.graph.add_node(Step {
            command: stmt.command_name(),
            output: output.clone(),
            inputs: inputs.clone(),
            timestamp,
        });
        for input in &inputs {
            if let Some(&producer) = self.producer.get(input) {
                self.graph.add_edge(producer, node, ());
            }
        }
        if let Some(output) = output {
            self.producer.insert(output, node);
        }
        node
    }

    pub fn step(&self, node: NodeIndex) -> &Step {
        &self.graph[node]
    }

    /// Number of statements recorded so far.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Steps with no upstream dependency.
    pub fn roots(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&n| self.graph.edges_directed(n, Direction::Incoming).next().is_none())
            .collect()
    }

    /// Steps nothing downstream depends on.
    pub fn leaves(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&n| self.graph.edges_directed(n, Direction::Outgoing).next().is_none())
            .collect()
    }

    /// Every simple path from `from` to `to`, for lineage queries such as
    /// "how did variable `y` derive from variable `x`".
    pub fn all_simple_paths(&self, from: NodeIndex, to: NodeIndex) -> Vec<Vec<NodeIndex>> {
        petgraph::algo::all_simple_paths(&self.graph, from, to, 0, None).collect()
    }

    /// A one-line summary of the step that most recently produced `name`,
    /// e.g. `"x <- GET (depends on: y)"`.
    pub fn variable_summary(&self, name: &str) -> Option<String> {
        let node = *self.producer.get(name)?;
        let step = &self.graph[node];
        if step.inputs.is_empty() {
            Some(format!("{name} <- {}", step.command))
        } else {
            Some(format!(
                "{name} <- {} (depends on: {})",
                step.command,
                step.inputs.join(", ")
            ))
        }
    }

    /// A short label for a step, used when rendering it as part of a
    /// dependency path rather than as its own table row.
    fn node_label(&self, node: NodeIndex) -> String {
        let step = &self.graph[node];
        match &step.output {
            Some(name) => format!("{name} ({})", step.command),
            None => step.command.to_string(),
        }
    }

    /// Renders the whole graph as the HTML fragment `DISP _` returns: a
    /// per-step table, followed by every simple path from a root step to
    /// a leaf step, since that lineage — how did this variable ultimately
    /// derive — is what the tracking display exists to answer.
    pub fn to_html(&self) -> String {
        let mut rows = String::new();
        for node in self.graph.node_indices() {
            let step = &self.graph[node];
            rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                step.timestamp.to_rfc3339(),
                step.command,
                step.output.as_deref().unwrap_or(""),
                step.inputs.join(", "),
            ));
        }

        let mut path_rows = String::new();
        let mut path_no = 0usize;
        for root in self.roots() {
            for &leaf in &self.leaves() {
                let paths: Vec<Vec<NodeIndex>> =
                    if root == leaf { vec![vec![root]] } else { self.all_simple_paths(root, leaf) };
                for path in paths {
                    path_no += 1;
                    let rendered =
                        path.iter().map(|&n| self.node_label(n)).collect::<Vec<_>>().join(" -> ");
                    path_rows.push_str(&format!("<tr><td>{path_no}</td><td>{rendered}</td></tr>\n"));
                }
            }
        }

        format!(
            "<table class=\"kestrel-execution-tracking\">\n\
             <thead><tr><th>time</th><th>command</th><th>output</th><th>inputs</th></tr></thead>\n\
             <tbody>\n{rows}</tbody>\n</table>\n\
             <table class=\"kestrel-execution-tracking-paths\">\n\
             <thead><tr><th>#</th><th>dependency path</th></tr></thead>\n\
             <tbody>\n{path_rows}</tbody>\n</table>"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{GetSource, TimeRange};

    fn get(output: &str) -> Statement {
        Statement::Get {
            output: output.into(),
            type_: "process".into(),
            patternbody: "".into(),
            timerange: TimeRange::unbounded(),
            source: GetSource::Datasource("ds".into()),
        }
    }

    #[test]
    fn records_edges_between_dependent_steps() {
        let mut tracker = ExecutionTracker::new();
        let t = Utc::now();
        let n1 = tracker.record(&get("x"), t);
        let n2 = tracker.record(
            &Statement::Info { input: "x".into() },
            t,
        );
        assert!(tracker.graph.contains_edge(n1, n2));
        assert_eq!(tracker.roots(), vec![n1]);
        assert_eq!(tracker.leaves(), vec![n2]);
    }
}
