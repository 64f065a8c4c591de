//! Declared entities: marked type declarations as seen by the generators.
//!
//! A [`Package`] is produced by translating collector output at the boundary
//! (see [`crate::collector`]). Everything in here is read-only to the generators.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::markers::{ParamMarker, ResultMarker, TaskMarker, WorkspaceMarker};

/// A struct field and its raw struct tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    /// Raw struct tag, e.g. `json:"name,omitempty" yaml:"name"`.
    #[serde(default)]
    pub tag: Option<String>,
}

impl FieldDecl {
    /// Value of the `json` key of the struct tag, if present.
    pub fn json_tag(&self) -> Option<String> {
        self.tag.as_deref().and_then(|tag| lookup_tag(tag, "json"))
    }
}

/// Syntactic shape of the type underlying a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Scalar {
        /// The declaration is `type X string`.
        #[serde(default)]
        string_alias: bool,
    },
    Array,
    Map,
    Struct {
        #[serde(default)]
        fields: Vec<FieldDecl>,
    },
}

/// Classification shared by schema inference and code synthesis, so that the manifest
/// type and the generated codec can never be derived from diverging rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeClass {
    StringAlias,
    Scalar,
    Array,
    Map,
    Struct,
}

/// How generated code converts between the environment and the Go value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Direct conversion between bytes and the string alias.
    Raw,
    /// `encoding/json`.
    Json,
}

impl Shape {
    pub fn class(&self) -> ShapeClass {
        match self {
            Shape::Scalar { string_alias: true } => ShapeClass::StringAlias,
            Shape::Scalar { string_alias: false } => ShapeClass::Scalar,
            Shape::Array => ShapeClass::Array,
            Shape::Map => ShapeClass::Map,
            Shape::Struct { .. } => ShapeClass::Struct,
        }
    }

    /// Fields of a struct shape, empty for every other shape.
    pub fn fields(&self) -> &[FieldDecl] {
        match self {
            Shape::Struct { fields } => fields,
            _ => &[],
        }
    }
}

impl ShapeClass {
    pub fn codec(self) -> Codec {
        match self {
            ShapeClass::StringAlias => Codec::Raw,
            _ => Codec::Json,
        }
    }
}

/// Param or result, for logging and duplicate tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Param,
    Result,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Param => "param",
            EntityKind::Result => "result",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The type-scoped marker attached to an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityMarker {
    Param(ParamMarker),
    Result(ResultMarker),
}

impl EntityMarker {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityMarker::Param(_) => EntityKind::Param,
            EntityMarker::Result(_) => EntityKind::Result,
        }
    }

    /// Name declared in the marker, which is the name used in the Task.
    pub fn name(&self) -> &str {
        match self {
            EntityMarker::Param(p) => &p.name,
            EntityMarker::Result(r) => &r.name,
        }
    }
}

/// A type declaration carrying a param or result marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredEntity {
    /// Go type name.
    pub name: String,
    /// Doc comment of the declaration.
    pub doc: String,
    pub shape: Shape,
    pub marker: EntityMarker,
}

/// A translated package: metadata, package-scoped markers and its entities in
/// first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Package {
    /// Go package name (e.g. `main`).
    pub name: String,
    pub import_path: String,
    /// Directory holding the package sources.
    pub dir: PathBuf,
    /// File-level doc comments, in file order.
    pub file_docs: Vec<String>,
    pub task: Option<TaskMarker>,
    pub workspaces: Vec<WorkspaceMarker>,
    pub entities: Vec<DeclaredEntity>,
}

/// Look up `key` in a Go struct tag, following the `reflect.StructTag` conventions.
///
/// Tags are space separated `key:"value"` pairs; a malformed pair stops the scan.
pub fn lookup_tag(tag: &str, key: &str) -> Option<String> {
    let mut rest = tag;
    while !rest.is_empty() {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }

        let bytes = rest.as_bytes();
        let mut i = 0;
        while i < bytes.len()
            && bytes[i] > b' '
            && bytes[i] != b':'
            && bytes[i] != b'"'
            && bytes[i] != 0x7f
        {
            i += 1;
        }
        if i == 0 || i + 1 >= bytes.len() || bytes[i] != b':' || bytes[i + 1] != b'"' {
            break;
        }
        let name = &rest[..i];
        rest = &rest[i + 1..];

        // Scan the quoted value, honoring backslash escapes
        let bytes = rest.as_bytes();
        let mut i = 1;
        while i < bytes.len() && bytes[i] != b'"' {
            if bytes[i] == b'\\' {
                i += 1;
            }
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        let quoted = &rest[..=i];
        rest = &rest[i + 1..];

        if name == key {
            return serde_json::from_str::<String>(quoted).ok();
        }
    }
    None
}
