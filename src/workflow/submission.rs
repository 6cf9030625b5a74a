/// Create/Update request decoding
///
/// Request bodies deserialize straight into a `GraphSubmission`. Node ids in a
/// submission are local identifiers chosen by the editor; edges refer to nodes
/// through them. Decoding only checks shape and types; graph invariants are the
/// job of the validation layer.

use crate::workflow::{error::ValidationError, payload::NodeData, types::NodeType};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A complete desired graph as sent by the editor
///
/// Older editor builds send the owner as `userId`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSubmission {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Owner claimed by the request body; must match the caller when present
    #[serde(default, alias = "userId")]
    pub owner_id: Option<String>,
    pub nodes: Vec<NodeSubmission>,
    pub edges: Vec<EdgeSubmission>,
}

/// A node carrying a client-local identifier
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNode")]
pub struct NodeSubmission {
    pub local_id: String,
    pub position_x: f64,
    pub position_y: f64,
    pub data: NodeData,
}

impl NodeSubmission {
    pub fn node_type(&self) -> NodeType {
        self.data.node_type()
    }
}

/// Node as it appears on the wire, before its payload is typed
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(alias = "id")]
    local_id: String,
    #[serde(rename = "type")]
    node_type: NodeType,
    position_x: f64,
    position_y: f64,
    #[serde(default)]
    data: Value,
}

impl TryFrom<RawNode> for NodeSubmission {
    type Error = String;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        if raw.local_id.is_empty() {
            return Err("node id must not be empty".to_string());
        }

        let data = NodeData::decode(raw.node_type, raw.data)
            .map_err(|e| format!("node '{}' has an invalid {} payload: {}", raw.local_id, raw.node_type, e))?;

        Ok(Self {
            local_id: raw.local_id,
            position_x: raw.position_x,
            position_y: raw.position_y,
            data,
        })
    }
}

/// An edge whose endpoints are local node identifiers
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSubmission {
    pub source: String,
    pub target: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub source_handle: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub target_handle: Option<String>,
}

impl GraphSubmission {
    /// Parse a raw request body
    pub fn from_body(body: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(body).map_err(ValidationError::from_decode)
    }

    /// Decode an already-parsed JSON value
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        Self::deserialize(value).map_err(ValidationError::from_decode)
    }
}

/// The editor clears labels and handles to "" rather than dropping them
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::payload::{EndData, StartData};
    use serde_json::json;

    fn body(nodes: Value, edges: Value) -> Value {
        json!({ "name": "Onboarding", "nodes": nodes, "edges": edges })
    }

    fn invalid_body(value: Value) -> String {
        match GraphSubmission::from_json(&value) {
            Err(ValidationError::InvalidBody(reason)) => reason,
            other => panic!("expected InvalidBody, got {:?}", other),
        }
    }

    #[test]
    fn decodes_editor_payload() {
        let value = json!({
            "name": "Onboarding",
            "description": "welcome flow",
            "userId": "user-1",
            "nodes": [
                {"id": "a", "type": "START", "positionX": 0, "positionY": 0, "data": {"description": "go"}},
                {"localId": "b", "type": "end", "positionX": 100.5, "positionY": 100, "data": {"outcome": "done"}}
            ],
            "edges": [
                {"source": "a", "target": "b", "label": "", "sourceHandle": "output", "targetHandle": null}
            ]
        });

        let submission = GraphSubmission::from_json(&value).unwrap();
        assert_eq!(submission.owner_id.as_deref(), Some("user-1"));
        assert_eq!(submission.description.as_deref(), Some("welcome flow"));
        assert_eq!(submission.nodes.len(), 2);
        assert_eq!(submission.nodes[0].local_id, "a");
        assert_eq!(
            submission.nodes[0].data,
            NodeData::Start(StartData { description: "go".to_string() })
        );
        assert_eq!(submission.nodes[1].position_x, 100.5);
        assert_eq!(
            submission.nodes[1].data,
            NodeData::End(EndData { outcome: "done".to_string() })
        );
        assert_eq!(
            submission.edges[0],
            EdgeSubmission {
                source: "a".to_string(),
                target: "b".to_string(),
                label: None,
                source_handle: Some("output".to_string()),
                target_handle: None,
            }
        );
    }

    #[test]
    fn owner_id_is_optional() {
        let submission = GraphSubmission::from_json(&body(json!([]), json!([]))).unwrap();
        assert_eq!(submission.owner_id, None);

        let mut value = body(json!([]), json!([]));
        value["ownerId"] = json!("owner");
        let submission = GraphSubmission::from_json(&value).unwrap();
        assert_eq!(submission.owner_id.as_deref(), Some("owner"));
    }

    #[test]
    fn rejects_non_array_lists() {
        let reason = invalid_body(body(json!({}), json!([])));
        assert!(reason.contains("expected a sequence"), "{reason}");

        invalid_body(body(json!([]), json!("nope")));
    }

    #[test]
    fn rejects_missing_name() {
        let reason = invalid_body(json!({"nodes": [], "edges": []}));
        assert!(reason.contains("name"), "{reason}");

        invalid_body(json!({"name": 3, "nodes": [], "edges": []}));
        invalid_body(json!(["not", "an", "object"]));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = GraphSubmission::from_body("{ not json").unwrap_err();
        assert!(matches!(err, ValidationError::MalformedBody(_)));

        let err = GraphSubmission::from_body(r#"{"name": "x", "nodes": {}, "edges": []}"#).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidBody(_)));
    }

    #[test]
    fn rejects_unknown_node_type() {
        let nodes = json!([{"id": "a", "type": "cron", "positionX": 0, "positionY": 0}]);
        let reason = invalid_body(body(nodes, json!([])));
        assert!(reason.contains("unknown node type: cron"), "{reason}");
    }

    #[test]
    fn rejects_missing_or_empty_node_id() {
        let nodes = json!([{"type": "start", "positionX": 0, "positionY": 0}]);
        invalid_body(body(nodes, json!([])));

        let nodes = json!([{"id": "", "type": "start", "positionX": 0, "positionY": 0}]);
        let reason = invalid_body(body(nodes, json!([])));
        assert!(reason.contains("must not be empty"), "{reason}");
    }

    #[test]
    fn rejects_missing_position() {
        let nodes = json!([{"id": "a", "type": "start", "positionX": 0}]);
        let reason = invalid_body(body(nodes, json!([])));
        assert!(reason.contains("positionY"), "{reason}");

        let nodes = json!([{"id": "a", "type": "start", "positionX": "0", "positionY": 0}]);
        invalid_body(body(nodes, json!([])));
    }

    #[test]
    fn rejects_mistyped_payload() {
        let nodes = json!([{"id": "a", "type": "logger", "positionX": 0, "positionY": 0, "data": {"level": "debug"}}]);
        let reason = invalid_body(body(nodes, json!([])));
        assert!(reason.contains("invalid logger payload"), "{reason}");
    }

    #[test]
    fn rejects_edge_without_target() {
        let nodes = json!([{"id": "a", "type": "start", "positionX": 0, "positionY": 0}]);
        let edges = json!([{"source": "a"}]);
        let reason = invalid_body(body(nodes, edges));
        assert!(reason.contains("target"), "{reason}");
    }

    #[test]
    fn missing_data_uses_payload_defaults() {
        let nodes = json!([{"id": "d", "type": "delay", "positionX": 1, "positionY": 2}]);
        let submission = GraphSubmission::from_json(&body(nodes, json!([]))).unwrap();
        assert_eq!(submission.nodes[0].node_type(), NodeType::Delay);
        assert_eq!(serde_json::to_value(&submission.nodes[0].data).unwrap(), json!({"duration": 30, "unit": "seconds"}));
    }
}
