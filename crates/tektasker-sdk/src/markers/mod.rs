//! Marker definitions for tektasker.
//!
//! The registry is an immutable definition set returned by [`MarkerRegistry::tektasker`].
//! It serves two purposes: decoding raw marker values handed over by a collector into
//! [`MarkerPayload`]s, and rendering marker help for the CLI.

mod payload;

use std::fmt;
use std::str::FromStr;

pub use payload::{
    MarkerPayload, ParamMarker, PayloadKind, ResultMarker, TaskMarker, WorkspaceMarker,
};

pub const MARKER_TASK: &str = "tektasker:task";
pub const MARKER_PARAM: &str = "tektasker:param";
pub const MARKER_RESULT: &str = "tektasker:result";
pub const MARKER_WORKSPACE: &str = "tektasker:workspace";

/// Which syntactic element a marker is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    Package,
    Type,
    Field,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Package => write!(f, "package"),
            TargetType::Type => write!(f, "type"),
            TargetType::Field => write!(f, "field"),
        }
    }
}

impl FromStr for TargetType {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "package" => Ok(TargetType::Package),
            "type" => Ok(TargetType::Type),
            "field" => Ok(TargetType::Field),
            _ => Err(MarkerError::UnknownTarget(s.to_string())),
        }
    }
}

/// Help for a single marker argument.
#[derive(Debug, Clone)]
pub struct FieldHelp {
    pub name: &'static str,
    pub type_name: &'static str,
    pub optional: bool,
    pub summary: &'static str,
}

/// Help for a marker definition.
#[derive(Debug, Clone)]
pub struct MarkerHelp {
    pub category: &'static str,
    pub summary: &'static str,
    pub details: &'static str,
    pub fields: Vec<FieldHelp>,
}

/// A registered marker: its name, what it describes and how to decode it.
#[derive(Debug, Clone)]
pub struct MarkerDefinition {
    pub name: &'static str,
    pub target: TargetType,
    pub kind: PayloadKind,
    /// Whether several values may be attached to the same element.
    pub repeatable: bool,
    pub help: MarkerHelp,
}

impl MarkerDefinition {
    /// Decode one raw value of this marker.
    pub fn decode(&self, value: &serde_json::Value) -> Result<MarkerPayload, MarkerError> {
        self.kind
            .decode(value)
            .map_err(|source| MarkerError::PayloadMismatch {
                marker: self.name.to_string(),
                source,
            })
    }

    /// Marker usage line, e.g. `+tektasker:result:name=<string>`.
    pub fn usage(&self) -> String {
        let args: Vec<String> = self
            .help
            .fields
            .iter()
            .map(|f| {
                if f.optional {
                    format!("[,{}=<{}>]", f.name, f.type_name)
                } else {
                    format!(",{}=<{}>", f.name, f.type_name)
                }
            })
            .collect();
        let args = args.concat();
        let args = args.strip_prefix(',').unwrap_or(&args);
        format!("+{}:{}", self.name, args)
    }
}

/// Errors raised while decoding marker values.
#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    #[error("unexpected payload for marker '{marker}': {source}")]
    PayloadMismatch {
        marker: String,
        source: serde_json::Error,
    },
    #[error("marker '{marker}' cannot be used on a {target}")]
    WrongTarget { marker: String, target: TargetType },
    #[error("unknown marker target '{0}' (expected package, type or field)")]
    UnknownTarget(String),
}

/// Immutable set of marker definitions.
#[derive(Debug, Clone)]
pub struct MarkerRegistry {
    definitions: Vec<MarkerDefinition>,
}

impl MarkerRegistry {
    /// Build the registry of every tektasker marker.
    pub fn tektasker() -> Self {
        let definitions = vec![
            MarkerDefinition {
                name: MARKER_TASK,
                target: TargetType::Package,
                kind: PayloadKind::Task,
                repeatable: false,
                help: MarkerHelp {
                    category: "task",
                    summary: "turns the package into a Tekton Task",
                    details: "Packages without this marker are skipped by every generator.",
                    fields: vec![
                        FieldHelp {
                            name: "name",
                            type_name: "string",
                            optional: false,
                            summary: "name of the Task resource",
                        },
                        FieldHelp {
                            name: "version",
                            type_name: "string",
                            optional: false,
                            summary: "version label of the Task",
                        },
                    ],
                },
            },
            MarkerDefinition {
                name: MARKER_PARAM,
                target: TargetType::Type,
                kind: PayloadKind::Param,
                repeatable: false,
                help: MarkerHelp {
                    category: "task",
                    summary: "exposes the type as a Task parameter",
                    details: "Arrays map to array params, strict structs to object params, \
                              everything else to string params holding the raw value or JSON.",
                    fields: vec![
                        FieldHelp {
                            name: "name",
                            type_name: "string",
                            optional: false,
                            summary: "name of the parameter in the Task",
                        },
                        FieldHelp {
                            name: "default",
                            type_name: "string",
                            optional: true,
                            summary: "default value, JSON for array and object params",
                        },
                        FieldHelp {
                            name: "strict",
                            type_name: "bool",
                            optional: true,
                            summary: "derive an object schema from the struct json tags",
                        },
                    ],
                },
            },
            MarkerDefinition {
                name: MARKER_RESULT,
                target: TargetType::Type,
                kind: PayloadKind::Result,
                repeatable: false,
                help: MarkerHelp {
                    category: "task",
                    summary: "exposes the type as a Task result",
                    details: "Arrays map to array results, everything else to string results.",
                    fields: vec![FieldHelp {
                        name: "name",
                        type_name: "string",
                        optional: false,
                        summary: "name of the result in the Task",
                    }],
                },
            },
            MarkerDefinition {
                name: MARKER_WORKSPACE,
                target: TargetType::Package,
                kind: PayloadKind::Workspace,
                repeatable: true,
                help: MarkerHelp {
                    category: "task",
                    summary: "declares a workspace of the Task",
                    details: "May be repeated; workspaces keep their declaration order.",
                    fields: vec![
                        FieldHelp {
                            name: "name",
                            type_name: "string",
                            optional: false,
                            summary: "name of the workspace",
                        },
                        FieldHelp {
                            name: "description",
                            type_name: "string",
                            optional: false,
                            summary: "what the workspace is used for",
                        },
                        FieldHelp {
                            name: "mountPath",
                            type_name: "string",
                            optional: true,
                            summary: "where the workspace is mounted in the step",
                        },
                        FieldHelp {
                            name: "readOnly",
                            type_name: "bool",
                            optional: true,
                            summary: "mount the workspace read-only",
                        },
                        FieldHelp {
                            name: "optional",
                            type_name: "bool",
                            optional: true,
                            summary: "the TaskRun may omit the workspace",
                        },
                    ],
                },
            },
        ];

        Self { definitions }
    }

    pub fn definitions(&self) -> &[MarkerDefinition] {
        &self.definitions
    }

    /// Find a definition by name and target. A leading `+` is ignored.
    pub fn lookup(&self, name: &str, target: TargetType) -> Option<&MarkerDefinition> {
        let name = name.strip_prefix('+').unwrap_or(name);
        self.definitions
            .iter()
            .find(|d| d.name == name && d.target == target)
    }

    /// Whether any definition carries this name, whatever its target.
    pub fn is_known(&self, name: &str) -> bool {
        let name = name.strip_prefix('+').unwrap_or(name);
        self.definitions.iter().any(|d| d.name == name)
    }

    /// Decode a raw marker value found on `target`.
    ///
    /// Returns `Ok(None)` for markers owned by other tools.
    pub fn decode(
        &self,
        name: &str,
        target: TargetType,
        value: &serde_json::Value,
    ) -> Result<Option<MarkerPayload>, MarkerError> {
        match self.lookup(name, target) {
            Some(definition) => definition.decode(value).map(Some),
            None if self.is_known(name) => Err(MarkerError::WrongTarget {
                marker: name.to_string(),
                target,
            }),
            None => Ok(None),
        }
    }

    /// Definitions grouped by help category, categories sorted by name.
    pub fn by_category(&self) -> Vec<(&'static str, Vec<&MarkerDefinition>)> {
        let mut groups: Vec<(&'static str, Vec<&MarkerDefinition>)> = Vec::new();
        for definition in &self.definitions {
            match groups
                .iter_mut()
                .find(|(category, _)| *category == definition.help.category)
            {
                Some((_, members)) => members.push(definition),
                None => groups.push((definition.help.category, vec![definition])),
            }
        }
        groups.sort_by_key(|(category, _)| *category);
        groups
    }
}

impl Default for MarkerRegistry {
    fn default() -> Self {
        Self::tektasker()
    }
}
