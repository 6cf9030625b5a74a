/// Typed node payloads
///
/// Each node type carries its own data shape. Payloads arrive and are stored as
/// loose JSON objects; decoding goes through the node's type tag so that a
/// payload can never disagree with its node type.

use crate::workflow::types::NodeType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Delay used when the submitted duration is absent or not a number
pub const DEFAULT_DELAY_DURATION: u32 = 30;
/// Smallest accepted delay duration
pub const MIN_DELAY_DURATION: u32 = 1;
/// Largest accepted delay duration
pub const MAX_DELAY_DURATION: u32 = 9999;

/// Payload of a node, one variant per node type
///
/// Serialized untagged: the type tag lives on the owning node, so the JSON form
/// is just the inner object (e.g. `{"description": "go"}` for Start).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeData {
    Start(StartData),
    Condition(ConditionData),
    Delay(DelayData),
    Webhook(WebhookData),
    Logger(LoggerData),
    End(EndData),
}

impl NodeData {
    /// Decode a raw JSON payload according to the node type tag
    ///
    /// `null` is treated as an empty object so every field takes its default.
    pub fn decode(node_type: NodeType, raw: Value) -> Result<Self, serde_json::Error> {
        let raw = match raw {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        };

        Ok(match node_type {
            NodeType::Start => NodeData::Start(serde_json::from_value(raw)?),
            NodeType::Condition => NodeData::Condition(serde_json::from_value(raw)?),
            NodeType::Delay => NodeData::Delay(serde_json::from_value(raw)?),
            NodeType::Webhook => NodeData::Webhook(serde_json::from_value(raw)?),
            NodeType::Logger => NodeData::Logger(serde_json::from_value(raw)?),
            NodeType::End => NodeData::End(serde_json::from_value(raw)?),
        })
    }

    /// The node type this payload belongs to
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeData::Start(_) => NodeType::Start,
            NodeData::Condition(_) => NodeType::Condition,
            NodeData::Delay(_) => NodeType::Delay,
            NodeData::Webhook(_) => NodeType::Webhook,
            NodeData::Logger(_) => NodeType::Logger,
            NodeData::End(_) => NodeType::End,
        }
    }
}

/// Start node: entry point of the workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartData {
    pub description: String,
}

/// Condition node with labelled true/false branches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionData {
    /// Expression text, not evaluated by this service
    pub condition: String,
    /// Simulated outcome toggled from the editor
    pub is_true: bool,
    pub true_label: String,
    pub false_label: String,
}

impl Default for ConditionData {
    fn default() -> Self {
        Self {
            condition: String::new(),
            is_true: false,
            true_label: "True".to_string(),
            false_label: "False".to_string(),
        }
    }
}

/// Unit of a delay duration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
}

/// Delay node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DelayData {
    /// Always within [MIN_DELAY_DURATION, MAX_DELAY_DURATION]
    #[serde(deserialize_with = "deserialize_duration")]
    pub duration: u32,
    pub unit: DelayUnit,
}

impl Default for DelayData {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DELAY_DURATION,
            unit: DelayUnit::Seconds,
        }
    }
}

/// Normalize a raw duration value
///
/// Numbers and numeric strings are truncated and clamped into range; anything
/// else (missing, null, text, non-finite) falls back to the default.
pub fn normalize_duration(raw: Option<&Value>) -> u32 {
    let number = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => {
            let clamped = n.trunc().clamp(MIN_DELAY_DURATION as f64, MAX_DELAY_DURATION as f64);
            clamped as u32
        }
        _ => DEFAULT_DELAY_DURATION,
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(normalize_duration(raw.as_ref()))
}

/// HTTP method of a webhook node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    #[serde(rename = "GET", alias = "get")]
    Get,
    #[default]
    #[serde(rename = "POST", alias = "post")]
    Post,
}

/// Webhook node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookData {
    pub url: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    /// Only sent when method is POST
    pub body: String,
    /// Status of the last manual test call, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_status: Option<u16>,
}

/// Severity of a logger node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    Warn,
    Error,
}

/// Logger node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerData {
    pub message: String,
    pub level: LogLevel,
    /// Time of the last manual test log, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_logged: Option<DateTime<Utc>>,
}

/// End node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndData {
    #[serde(alias = "description")]
    pub outcome: String,
}
