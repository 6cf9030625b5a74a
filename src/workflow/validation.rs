/// Graph validation
///
/// Pure checks run before any write. A graph is either accepted untouched or
/// rejected with the first invariant it breaks; nothing is repaired.
///
/// Checks, in order:
/// 1. the workflow name is non-empty
/// 2. every node id is unique
/// 3. at most one node is a Start node
/// 4. every edge endpoint names a node of the same graph

use crate::workflow::{
    error::ValidationError,
    reconcile::{DanglingReference, Endpoint},
    submission::GraphSubmission,
    types::{NodeType, Workflow},
};
use std::collections::HashSet;

/// Validate a submitted graph
pub fn validate(submission: &GraphSubmission) -> Result<(), ValidationError> {
    check_graph(
        &submission.name,
        submission
            .nodes
            .iter()
            .map(|n| (n.local_id.as_str(), n.node_type())),
        submission
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str())),
    )
}

/// Validate a stored workflow against the same invariants
pub fn validate_workflow(workflow: &Workflow) -> Result<(), ValidationError> {
    check_graph(
        &workflow.name,
        workflow.nodes.iter().map(|n| (n.id.as_str(), n.node_type)),
        workflow
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str())),
    )
}

fn check_graph<'a>(
    name: &str,
    nodes: impl Iterator<Item = (&'a str, NodeType)>,
    edges: impl Iterator<Item = (&'a str, &'a str)>,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }

    let mut seen = HashSet::new();
    let mut start: Option<&str> = None;

    for (id, node_type) in nodes {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateNodeId(id.to_string()));
        }
        if node_type == NodeType::Start {
            if let Some(first) = start {
                return Err(ValidationError::MultipleStartNodes {
                    first: first.to_string(),
                    second: id.to_string(),
                });
            }
            start = Some(id);
        }
    }

    for (edge_index, (source, target)) in edges.enumerate() {
        for (local_id, endpoint) in [(source, Endpoint::Source), (target, Endpoint::Target)] {
            if !seen.contains(local_id) {
                return Err(DanglingReference {
                    edge_index,
                    endpoint,
                    local_id: local_id.to_string(),
                }
                .into());
            }
        }
    }

    Ok(())
}
