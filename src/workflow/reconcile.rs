/// Identifier reconciliation
///
/// Nodes are written first and receive durable ids; edges in the same submission
/// still point at the editor's local ids. The node writer hands back explicit
/// (local, durable) pairs and edges are rewritten by key lookup, never by
/// position. Create and Update share this path.

use crate::workflow::{error::ValidationError, submission::EdgeSubmission};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Which end of an edge failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => f.write_str("source"),
            Endpoint::Target => f.write_str("target"),
        }
    }
}

/// An edge names a node that is not part of the submission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("edge #{edge_index} {endpoint} references unknown node '{local_id}'")]
pub struct DanglingReference {
    pub edge_index: usize,
    pub endpoint: Endpoint,
    pub local_id: String,
}

/// One-to-one mapping from local node ids to durable node ids
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    durable_by_local: HashMap<String, String>,
}

impl IdMap {
    /// Build the map from the pairs returned by the node writer
    ///
    /// A local id appearing twice would make the mapping ambiguous and is rejected.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut durable_by_local = HashMap::new();
        for (local, durable) in pairs {
            if durable_by_local.contains_key(&local) {
                return Err(ValidationError::DuplicateNodeId(local));
            }
            durable_by_local.insert(local, durable);
        }
        Ok(Self { durable_by_local })
    }

    pub fn resolve(&self, local_id: &str) -> Option<&str> {
        self.durable_by_local.get(local_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.durable_by_local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durable_by_local.is_empty()
    }
}

/// An edge whose endpoints are durable node ids, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEdge {
    pub source: String,
    pub target: String,
    pub label: Option<String>,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

/// Rewrite every edge endpoint through the id map
///
/// Fails on the first edge that cannot be resolved; no partial result is returned.
pub fn reconcile_edges(map: &IdMap, edges: &[EdgeSubmission]) -> Result<Vec<ResolvedEdge>, DanglingReference> {
    edges
        .iter()
        .enumerate()
        .map(|(edge_index, edge)| {
            let lookup = |local_id: &str, endpoint: Endpoint| {
                map.resolve(local_id)
                    .map(str::to_string)
                    .ok_or_else(|| DanglingReference {
                        edge_index,
                        endpoint,
                        local_id: local_id.to_string(),
                    })
            };

            Ok(ResolvedEdge {
                source: lookup(&edge.source, Endpoint::Source)?,
                target: lookup(&edge.target, Endpoint::Target)?,
                label: edge.label.clone(),
                source_handle: edge.source_handle.clone(),
                target_handle: edge.target_handle.clone(),
            })
        })
        .collect()
}
