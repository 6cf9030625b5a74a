/// Core workflow type definitions
///
/// The canonical shape of a stored workflow: the workflow row, its nodes with
/// typed payloads and canvas positions, and the edges wiring them together.
/// These are the types returned by Read and by successful Create/Update calls.

use crate::workflow::payload::NodeData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A stored workflow together with its complete graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Durable workflow identifier (UUID)
    pub id: String,
    /// Human-readable workflow name, never empty
    pub name: String,
    pub description: Option<String>,
    /// User that owns this workflow
    pub owner_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Only ever set by an execution engine; this service leaves it untouched
    pub last_run_at: Option<DateTime<Utc>>,
    /// Nodes in submission order
    pub nodes: Vec<Node>,
    /// Edges in submission order
    pub edges: Vec<Edge>,
}

/// A single node on the workflow canvas
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Durable node identifier
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub position_x: f64,
    pub position_y: f64,
    pub data: NodeData,
}

impl Node {
    /// Build a node whose type tag is taken from its payload
    pub fn new(id: String, position_x: f64, position_y: f64, data: NodeData) -> Self {
        Self {
            id,
            node_type: data.node_type(),
            position_x,
            position_y,
            data,
        }
    }
}

/// Closed set of node types understood by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Entry point; at most one per workflow
    Start,
    /// Branches on an expression into true/false handles
    Condition,
    /// Waits for a duration
    Delay,
    /// Calls an HTTP endpoint
    Webhook,
    /// Writes a log line
    Logger,
    /// Terminal node
    End,
}

impl NodeType {
    /// Lowercase tag used on the wire and in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Start => "start",
            NodeType::Condition => "condition",
            NodeType::Delay => "delay",
            NodeType::Webhook => "webhook",
            NodeType::Logger => "logger",
            NodeType::End => "end",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    /// Tags are matched case-insensitively (the editor sends "START")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(NodeType::Start),
            "condition" => Ok(NodeType::Condition),
            "delay" => Ok(NodeType::Delay),
            "webhook" => Ok(NodeType::Webhook),
            "logger" => Ok(NodeType::Logger),
            "end" => Ok(NodeType::End),
            other => Err(format!("unknown node type: {other}")),
        }
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

/// Connection between two nodes of the same workflow
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Durable edge identifier
    pub id: String,
    /// Durable id of the source node
    pub source: String,
    /// Durable id of the target node
    pub target: String,
    pub label: Option<String>,
    /// Output port on the source node (e.g. "true"/"false" on a Condition)
    pub source_handle: Option<String>,
    /// Input port on the target node
    pub target_handle: Option<String>,
}

/// Listing entry for a workflow, without its graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub node_count: i64,
}

/// Dashboard totals over one owner's workflows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStats {
    pub workflow_count: i64,
    pub active_workflows: i64,
    /// Nodes across all of the owner's workflows
    pub total_nodes: i64,
}
