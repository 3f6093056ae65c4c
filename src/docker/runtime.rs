//! The runtime client seam
//!
//! Everything the console asks of the container runtime goes through
//! [`RuntimeClient`]. [`DockerClient`](crate::docker::DockerClient) is the
//! bollard-backed implementation; tests substitute fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{ContainerSummary, ImageSummary, RuntimeError};

/// Result of a single runtime call
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;

/// Kind of filesystem change reported by `diff`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Modified,
    Added,
    Deleted,
}

impl ChangeKind {
    /// Single-letter code used by `docker diff`
    pub fn code(&self) -> &'static str {
        match self {
            ChangeKind::Modified => "C",
            ChangeKind::Added => "A",
            ChangeKind::Deleted => "D",
        }
    }
}

/// One entry of a container diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub path: String,
}

/// Process table of a running container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopResult {
    pub titles: Vec<String>,
    pub processes: Vec<Vec<String>>,
}

/// One layer of an image history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub created_by: String,
}

/// A status or error line from a push stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PushMessage {
    Status(String),
    Error(String),
}

impl PushMessage {
    pub fn text(&self) -> &str {
        match self {
            PushMessage::Status(s) | PushMessage::Error(s) => s,
        }
    }
}

/// Structured inspect output, flattened to `(key, value)` lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectRecord {
    pub title: String,
    pub items: Vec<(String, String)>,
}

impl InspectRecord {
    /// Flatten a JSON document into dotted keys, skipping empty values
    pub fn from_json(title: impl Into<String>, value: &serde_json::Value) -> Self {
        let mut items = Vec::new();
        flatten_json("", value, &mut items);
        Self {
            title: title.into(),
            items,
        }
    }
}

fn flatten_json(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
    use serde_json::Value;

    let key_for = |k: &str| {
        if prefix.is_empty() {
            k.to_string()
        } else {
            format!("{}.{}", prefix, k)
        }
    };

    match value {
        Value::Null => {}
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for k in keys {
                flatten_json(&key_for(k.as_str()), &map[k.as_str()], out);
            }
        }
        Value::Array(items) => {
            if items.iter().all(|v| !v.is_object() && !v.is_array()) {
                let joined: Vec<String> = items.iter().map(scalar_text).collect();
                if !joined.is_empty() {
                    out.push((prefix.to_string(), joined.join(" ")));
                }
            } else {
                for (idx, item) in items.iter().enumerate() {
                    flatten_json(&key_for(idx.to_string().as_str()), item, out);
                }
            }
        }
        Value::String(s) if s.is_empty() => {}
        scalar => out.push((prefix.to_string(), scalar_text(scalar))),
    }
}

fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Operations the console needs from a container runtime
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuntimeClient: Send + Sync {
    async fn list_containers(&self, all: bool) -> RuntimeResult<Vec<ContainerSummary>>;

    async fn list_images(&self, all: bool) -> RuntimeResult<Vec<ImageSummary>>;

    async fn inspect_container(&self, id: &str) -> RuntimeResult<InspectRecord>;

    async fn inspect_image(&self, id: &str) -> RuntimeResult<InspectRecord>;

    async fn remove_container(&self, id: &str) -> RuntimeResult<()>;

    async fn remove_image(&self, id: &str) -> RuntimeResult<()>;

    async fn start(&self, id: &str) -> RuntimeResult<()>;

    async fn stop(&self, id: &str) -> RuntimeResult<()>;

    async fn pause(&self, id: &str) -> RuntimeResult<()>;

    async fn unpause(&self, id: &str) -> RuntimeResult<()>;

    async fn kill(&self, id: &str) -> RuntimeResult<()>;

    async fn restart(&self, id: &str) -> RuntimeResult<()>;

    async fn rename(&self, id: &str, new_name: &str) -> RuntimeResult<()>;

    async fn commit(&self, id: &str, repo: &str, tag: &str) -> RuntimeResult<()>;

    async fn tag_image(&self, id: &str, repo: &str, tag: &str) -> RuntimeResult<()>;

    async fn diff(&self, id: &str) -> RuntimeResult<Vec<Change>>;

    async fn top(&self, id: &str) -> RuntimeResult<TopResult>;

    async fn history(&self, id: &str) -> RuntimeResult<Vec<HistoryEntry>>;

    async fn push(&self, repo: &str, tag: &str) -> RuntimeResult<Vec<PushMessage>>;
}
