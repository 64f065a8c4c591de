//! Tekton Task manifest assembly.
//!
//! [`ManifestBuilder::build`] turns a [`Package`] into a [`TaskManifest`]: package
//! docs become the description, workspace markers become workspaces, param and result
//! entities are classified by [`crate::schema`] and a single step runs the ko-built
//! binary with one environment variable per param and result.

mod command;
mod filters;

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

pub use command::{
    ko_app_name, CommandArgs, CommandError, CommandTemplate, DEFAULT_STEP_COMMAND,
    KO_APP_FALLBACK,
};

use crate::entity::{EntityMarker, Package};
use crate::log_context::LogContext;
use crate::markers::WorkspaceMarker;
use crate::schema::{self, ParameterSchema, ResultSchema, SchemaError, TypeTag};

pub const TEKTON_API_VERSION: &str = "tekton.dev/v1";
pub const KUBERNETES_VERSION_LABEL: &str = "app.kubernetes.io/version";
/// Scheme telling ko to build the image from a Go import path.
pub const IMAGE_SCHEME: &str = "ko://";

/// A workspace declared by the Task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSpec {
    pub name: String,
    pub description: String,
    pub read_only: bool,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,
}

impl From<&WorkspaceMarker> for WorkspaceSpec {
    fn from(marker: &WorkspaceMarker) -> Self {
        Self {
            name: marker.name.clone(),
            description: marker.description.clone(),
            read_only: marker.read_only,
            optional: marker.optional,
            mount_path: marker.mount_path.clone().filter(|p| !p.is_empty()),
        }
    }
}

/// An environment variable of the step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvBinding {
    pub name: String,
    pub value: String,
}

impl EnvBinding {
    /// `PARAM_<NAME>_VALUE`, bound to the param's value (spread for arrays).
    pub fn for_param(param: &ParameterSchema) -> Self {
        let spread = if param.type_tag == TypeTag::Array {
            "[*]"
        } else {
            ""
        };
        Self {
            name: param_env_name(&param.name),
            value: format!("$(params[{:?}]{spread})", param.name),
        }
    }

    /// `RESULT_<NAME>_PATH`, bound to the path the result must be written to.
    pub fn for_result(result: &ResultSchema) -> Self {
        Self {
            name: result_env_name(&result.name),
            value: format!("$(results[{:?}].path)", result.name),
        }
    }
}

pub fn param_env_name(name: &str) -> String {
    format!("PARAM_{}_VALUE", name.to_uppercase())
}

pub fn result_env_name(name: &str) -> String {
    format!("RESULT_{}_PATH", name.to_uppercase())
}

/// The single step of the Task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionStep {
    pub image: String,
    pub command: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvBinding>,
}

/// Everything generated for one task package.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskManifest {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub params: Vec<ParameterSchema>,
    pub results: Vec<ResultSchema>,
    pub workspaces: Vec<WorkspaceSpec>,
    pub step: ExecutionStep,
}

impl TaskManifest {
    /// Output file name, also referenced by the kustomization.
    pub fn file_name(&self) -> String {
        format!("{}-task.yaml", self.name)
    }

    /// The Kubernetes document for this manifest.
    pub fn document(&self) -> TaskDocument<'_> {
        TaskDocument {
            api_version: TEKTON_API_VERSION,
            kind: "Task",
            metadata: ObjectMeta {
                name: &self.name,
                labels: BTreeMap::from([(KUBERNETES_VERSION_LABEL, self.version.as_str())]),
            },
            spec: TaskSpec {
                description: self.description.as_deref(),
                params: &self.params,
                results: &self.results,
                workspaces: &self.workspaces,
                steps: std::slice::from_ref(&self.step),
            },
        }
    }

    /// Serialize as a YAML document.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.document())
    }
}

/// Serialized form of a [`TaskManifest`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDocument<'a> {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta<'a>,
    pub spec: TaskSpec<'a>,
}

#[derive(Debug, Serialize)]
pub struct ObjectMeta<'a> {
    pub name: &'a str,
    pub labels: BTreeMap<&'static str, &'a str>,
}

#[derive(Debug, Serialize)]
pub struct TaskSpec<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub params: &'a [ParameterSchema],
    pub results: &'a [ResultSchema],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub workspaces: &'a [WorkspaceSpec],
    pub steps: &'a [ExecutionStep],
}

/// Resource list referencing the generated manifests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Kustomization {
    pub resources: Vec<String>,
}

impl Kustomization {
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Builds one [`TaskManifest`] per task package.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    command: CommandTemplate,
}

impl ManifestBuilder {
    pub fn new(command: CommandTemplate) -> Self {
        Self { command }
    }

    /// Build the manifest of `package`.
    ///
    /// Returns `Ok(None)` for packages without a task marker.
    pub fn build(&self, package: &Package) -> Result<Option<TaskManifest>, ManifestError> {
        let ctx = LogContext::package("manifest", &package.name);
        ctx.debug("starting collecting");

        let Some(task) = &package.task else {
            ctx.info("skipping non-task package");
            return Ok(None);
        };

        let description = package_description(package);

        let workspaces: Vec<WorkspaceSpec> = package
            .workspaces
            .iter()
            .map(|ws| {
                ctx.info(format!("found workspace '{}'", ws.name));
                WorkspaceSpec::from(ws)
            })
            .collect();

        // name -> index, to keep the first of duplicated names
        let mut params_idx: HashMap<&str, usize> = HashMap::new();
        let mut params: Vec<ParameterSchema> = Vec::new();
        let mut results_idx: HashMap<&str, usize> = HashMap::new();
        let mut results: Vec<ResultSchema> = Vec::new();

        for entity in &package.entities {
            let entity_ctx = ctx.entity(entity.marker.kind(), entity.marker.name());
            match &entity.marker {
                EntityMarker::Param(marker) => {
                    entity_ctx.info("parameter found");
                    if params_idx.contains_key(marker.name.as_str()) {
                        entity_ctx.warn("parameter duplicated! ensure unique name");
                        continue;
                    }
                    let schema = schema::infer_param(entity, marker)?;
                    params_idx.insert(&marker.name, params.len());
                    params.push(schema);
                }
                EntityMarker::Result(marker) => {
                    entity_ctx.info("result found");
                    if results_idx.contains_key(marker.name.as_str()) {
                        entity_ctx.warn("result duplicated! ensure unique name");
                        continue;
                    }
                    results_idx.insert(&marker.name, results.len());
                    results.push(schema::infer_result(entity, marker));
                }
            }
        }

        let step = self.build_step(package, &params, &results)?;
        ctx.debug(format!(
            "task '{}' assembled with {} params, {} results and {} workspaces",
            task.name,
            params.len(),
            results.len(),
            workspaces.len()
        ));

        Ok(Some(TaskManifest {
            name: task.name.clone(),
            version: task.version.clone(),
            description,
            params,
            results,
            workspaces,
            step,
        }))
    }

    fn build_step(
        &self,
        package: &Package,
        params: &[ParameterSchema],
        results: &[ResultSchema],
    ) -> Result<ExecutionStep, CommandError> {
        let command = self.command.argv(&CommandArgs::for_package(package))?;

        let env = params
            .iter()
            .map(EnvBinding::for_param)
            .chain(results.iter().map(EnvBinding::for_result))
            .collect();

        Ok(ExecutionStep {
            image: format!("{IMAGE_SCHEME}{}", package.import_path),
            command,
            env,
        })
    }
}

/// Concatenate every file-level doc comment of the package.
fn package_description(package: &Package) -> Option<String> {
    if package.file_docs.is_empty() {
        return None;
    }
    let description = package.file_docs.join("\n");
    (!description.is_empty()).then_some(description)
}
