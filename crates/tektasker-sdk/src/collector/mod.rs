//! Collector seam and boundary translation.
//!
//! A [`Collector`] hands over packages exactly as they were collected: raw marker
//! values keyed by marker name. [`CollectedPackage::into_package`] decodes them against
//! the [`MarkerRegistry`] once, so generators only ever see typed payloads.
//!
//! The shipped collector, [`SnapshotCollector`], reads package snapshots (YAML or JSON)
//! produced ahead of time by a source loader.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::entity::{DeclaredEntity, EntityKind, EntityMarker, Package, Shape};
use crate::log_context::LogContext;
use crate::markers::{MarkerPayload, MarkerRegistry, TargetType};

/// Raw marker values keyed by marker name, in the order they were attached.
pub type RawMarkers = BTreeMap<String, Vec<serde_json::Value>>;

/// Supplies the packages of a generation run.
pub trait Collector {
    fn collect(&self) -> Result<Vec<CollectedPackage>, CollectorError>;
}

/// Top-level snapshot document.
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub packages: Vec<CollectedPackage>,
}

/// A package as described by a collector.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectedPackage {
    pub name: String,
    pub import_path: String,
    #[serde(default)]
    pub dir: PathBuf,
    #[serde(default)]
    pub file_docs: Vec<String>,
    #[serde(default)]
    pub markers: RawMarkers,
    #[serde(default)]
    pub types: Vec<CollectedType>,
}

/// An exported type declaration as described by a collector.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectedType {
    pub name: String,
    #[serde(default)]
    pub doc: String,
    pub shape: Shape,
    #[serde(default)]
    pub markers: RawMarkers,
}

/// Error while collecting packages.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("failed to read snapshot '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse snapshot '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Reads package snapshots from files, in the order the paths were given.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCollector {
    paths: Vec<PathBuf>,
}

impl SnapshotCollector {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }
}

impl Collector for SnapshotCollector {
    fn collect(&self) -> Result<Vec<CollectedPackage>, CollectorError> {
        let mut packages = Vec::new();
        for path in &self.paths {
            packages.extend(parse_snapshot(path)?.packages);
        }
        Ok(packages)
    }
}

/// Parse a single snapshot file.
pub fn parse_snapshot(path: &Path) -> Result<Snapshot, CollectorError> {
    let content = std::fs::read_to_string(path).map_err(|e| CollectorError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_snapshot_str(&content).map_err(|e| CollectorError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parse a snapshot from a YAML (or JSON) string.
pub fn parse_snapshot_str(content: &str) -> Result<Snapshot, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

impl CollectedPackage {
    /// Decode every raw marker value and keep the marked types.
    ///
    /// Undecodable values are logged and dropped; they never abort the run.
    pub fn into_package(self, registry: &MarkerRegistry) -> Package {
        let ctx = LogContext::package("collector", &self.name);

        let mut task = None;
        let mut workspaces = Vec::new();
        for payload in decode_all(registry, TargetType::Package, &self.markers, &ctx) {
            match payload {
                MarkerPayload::Task(marker) => {
                    if task.is_some() {
                        ctx.warn("task marker repeated, keeping the first one");
                    } else {
                        task = Some(marker);
                    }
                }
                MarkerPayload::Workspace(marker) => workspaces.push(marker),
                // Package-targeted definitions only decode to task or workspace payloads
                MarkerPayload::Param(_) | MarkerPayload::Result(_) => {}
            }
        }

        let entities = self
            .types
            .into_iter()
            .filter_map(|t| translate_type(registry, t, &ctx))
            .collect();

        Package {
            name: self.name,
            import_path: self.import_path,
            dir: self.dir,
            file_docs: self.file_docs,
            task,
            workspaces,
            entities,
        }
    }
}

fn translate_type(
    registry: &MarkerRegistry,
    collected: CollectedType,
    ctx: &LogContext,
) -> Option<DeclaredEntity> {
    let type_ctx = LogContext {
        entity: Some(collected.name.clone()),
        ..ctx.clone()
    };

    let mut marker: Option<EntityMarker> = None;
    let mut conflicting = false;
    for payload in decode_all(registry, TargetType::Type, &collected.markers, &type_ctx) {
        let candidate = match payload {
            MarkerPayload::Param(p) => EntityMarker::Param(p),
            MarkerPayload::Result(r) => EntityMarker::Result(r),
            MarkerPayload::Task(_) | MarkerPayload::Workspace(_) => continue,
        };
        match &marker {
            None => marker = Some(candidate),
            Some(existing) if existing.kind() == candidate.kind() => {
                type_ctx.warn(format!(
                    "{} marker repeated, keeping '{}'",
                    existing.kind(),
                    existing.name()
                ));
            }
            Some(_) => conflicting = true,
        }
    }

    if conflicting {
        type_ctx.warn("type carries both a param and a result marker, skipping it");
        return None;
    }

    let marker = marker?;
    let kind: EntityKind = marker.kind();
    type_ctx.debug(format!("{kind} '{}' collected", marker.name()));

    Some(DeclaredEntity {
        name: collected.name,
        doc: collected.doc,
        shape: collected.shape,
        marker,
    })
}

fn decode_all(
    registry: &MarkerRegistry,
    target: TargetType,
    markers: &RawMarkers,
    ctx: &LogContext,
) -> Vec<MarkerPayload> {
    let mut payloads = Vec::new();
    for (name, values) in markers {
        for value in values {
            match registry.decode(name, target, value) {
                Ok(Some(payload)) => payloads.push(payload),
                Ok(None) => {}
                Err(e) => ctx.warn(format!("skipping marker value: {e}")),
            }
        }
    }
    payloads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::{MARKER_PARAM, MARKER_RESULT, MARKER_TASK, MARKER_WORKSPACE};
    use serde_json::json;

    fn collected(types: Vec<CollectedType>) -> CollectedPackage {
        let mut markers = RawMarkers::new();
        markers.insert(
            MARKER_TASK.into(),
            vec![json!({"name": "example", "version": "0.1"})],
        );
        CollectedPackage {
            name: "examples".into(),
            import_path: "github.com/acme/examples".into(),
            dir: PathBuf::from("examples"),
            file_docs: vec![],
            markers,
            types,
        }
    }

    fn marked(name: &str, marker: &str, value: serde_json::Value) -> CollectedType {
        let mut markers = RawMarkers::new();
        markers.insert(marker.into(), vec![value]);
        CollectedType {
            name: name.into(),
            doc: String::new(),
            shape: Shape::Scalar { string_alias: true },
            markers,
        }
    }

    #[test]
    fn test_parse_snapshot_from_fixture() {
        let fixture = include_str!("../../../../tests/fixtures/snapshots/examples.yaml");
        let snapshot = parse_snapshot_str(fixture).unwrap();
        assert_eq!(snapshot.packages.len(), 2);

        let package = snapshot.packages[0]
            .clone()
            .into_package(&MarkerRegistry::tektasker());
        assert_eq!(package.task.as_ref().unwrap().name, "example");
        assert_eq!(package.workspaces.len(), 2);
        assert_eq!(package.entities.len(), 7);
        assert_eq!(package.entities[0].name, "Message");
    }

    #[test]
    fn test_parse_snapshot_file_not_found() {
        let result = parse_snapshot(Path::new("/nonexistent/snapshot.yaml"));
        assert!(matches!(result, Err(CollectorError::Io { .. })));
    }

    #[test]
    fn test_parse_snapshot_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "packages: [valid: yaml: for: snapshot").unwrap();
        let result = parse_snapshot(&path);
        assert!(matches!(result, Err(CollectorError::Parse { .. })));
    }

    #[test]
    fn test_snapshot_collector_concatenates_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.json");
        let second = dir.path().join("b.yaml");
        std::fs::write(
            &first,
            r#"{"packages": [{"name": "a", "import_path": "example.com/a"}]}"#,
        )
        .unwrap();
        std::fs::write(
            &second,
            "packages:\n  - name: b\n    import_path: example.com/b\n",
        )
        .unwrap();

        let packages = SnapshotCollector::new([first, second]).collect().unwrap();
        let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_mismatched_payload_skips_entity() {
        let package = collected(vec![
            marked("Good", MARKER_PARAM, json!({"name": "good"})),
            marked("Bad", MARKER_PARAM, json!({"name": "bad", "mountPath": "/x"})),
        ])
        .into_package(&MarkerRegistry::tektasker());

        let names: Vec<_> = package.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Good"]);
    }

    #[test]
    fn test_param_and_result_on_same_type_is_skipped() {
        let mut both = marked("Both", MARKER_PARAM, json!({"name": "both"}));
        both.markers
            .insert(MARKER_RESULT.into(), vec![json!({"name": "both"})]);

        let package = collected(vec![both]).into_package(&MarkerRegistry::tektasker());
        assert!(package.entities.is_empty());
    }

    #[test]
    fn test_unmarked_types_are_dropped() {
        let mut plain = marked("Plain", "kubebuilder:object:root", json!(true));
        plain.shape = Shape::Map;
        let package = collected(vec![plain]).into_package(&MarkerRegistry::tektasker());
        assert!(package.entities.is_empty());
    }

    #[test]
    fn test_workspaces_keep_order_and_task_first_wins() {
        let mut package = collected(vec![]);
        package.markers.get_mut(MARKER_TASK).unwrap().push(json!({
            "name": "other",
            "version": "9"
        }));
        package.markers.insert(
            MARKER_WORKSPACE.into(),
            vec![
                json!({"name": "source", "description": "sources"}),
                json!({"name": "cache", "description": "build cache", "optional": true}),
            ],
        );

        let package = package.into_package(&MarkerRegistry::tektasker());
        assert_eq!(package.task.unwrap().name, "example");
        let names: Vec<_> = package.workspaces.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["source", "cache"]);
    }
}
