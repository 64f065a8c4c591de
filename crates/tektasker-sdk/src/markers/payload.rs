//! Typed marker payloads.
//!
//! Payloads are decoded once at the collector boundary. Downstream code matches on
//! [`MarkerPayload`] and never inspects raw marker values again.

use serde::{Deserialize, Serialize};

/// `+tektasker:task`: package-scoped, required for a package to be generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskMarker {
    /// Name of the Task resource.
    pub name: String,
    /// Version written to the `app.kubernetes.io/version` label.
    pub version: String,
}

/// `+tektasker:param`: type-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamMarker {
    /// Name of the parameter as it appears in the Task.
    pub name: String,
    /// Raw default value, parsed against the inferred type.
    #[serde(default)]
    pub default: Option<String>,
    /// Derive an `object` schema from the struct's json tags.
    #[serde(default)]
    pub strict: bool,
}

/// `+tektasker:result`: type-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultMarker {
    pub name: String,
}

/// `+tektasker:workspace`: package-scoped, repeatable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct WorkspaceMarker {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mount_path: Option<String>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub optional: bool,
}

/// Every payload a tektasker marker can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerPayload {
    Task(TaskMarker),
    Param(ParamMarker),
    Result(ResultMarker),
    Workspace(WorkspaceMarker),
}

/// Discriminant of [`MarkerPayload`], used by marker definitions to pick a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Task,
    Param,
    Result,
    Workspace,
}

impl PayloadKind {
    /// Decode a raw marker value into the payload variant of this kind.
    pub fn decode(self, value: &serde_json::Value) -> Result<MarkerPayload, serde_json::Error> {
        let payload = match self {
            PayloadKind::Task => MarkerPayload::Task(TaskMarker::deserialize(value)?),
            PayloadKind::Param => MarkerPayload::Param(ParamMarker::deserialize(value)?),
            PayloadKind::Result => MarkerPayload::Result(ResultMarker::deserialize(value)?),
            PayloadKind::Workspace => {
                MarkerPayload::Workspace(WorkspaceMarker::deserialize(value)?)
            }
        };
        Ok(payload)
    }
}
