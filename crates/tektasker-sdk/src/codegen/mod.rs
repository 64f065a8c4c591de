//! Go binding synthesis.
//!
//! For every param of a task package, [`synthesize`] emits `Name()` and
//! `Unmarshal(buf []byte)` methods; for every result, `Name()` and `Marshal()`. String
//! aliases use a raw byte conversion, every other shape goes through `encoding/json`.
//! The codec is taken from [`ShapeClass::codec`], the classification schema inference
//! relies on, so the generated code always agrees with the manifest.
//!
//! Methods are grouped per [`FuncTemplate`], emitted in the fixed order of
//! [`FuncTemplate::ALL`], entities in first-seen order within each group.

mod header;
mod internal;
mod templates;

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

pub use header::LicenseHeader;
pub use internal::{support_files, SupportFile, PARAMETER_FILE, RESULT_FILE};

use crate::entity::{Codec, EntityKind, EntityMarker, Package};
use crate::log_context::LogContext;

/// Name of the generated file in each task package directory.
pub const GO_BINDINGS_FILE: &str = "zz_generated.tektasker.go";

const JSON_IMPORT: &str = "encoding/json";

#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("failed to read header file {}: {source}", path.display())]
    Header {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to render template '{template}': {source}")]
    Rendering {
        template: &'static str,
        source: askama::Error,
    },
    #[error("no renderer registered for template '{0}'")]
    UnknownTemplate(&'static str),
}

/// One method micro-template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FuncTemplate {
    ParamName,
    ParamUnmarshalSimple,
    ParamUnmarshalJson,
    ResultName,
    ResultMarshalSimple,
    ResultMarshalJson,
}

impl FuncTemplate {
    pub const ALL: [FuncTemplate; 6] = [
        FuncTemplate::ParamName,
        FuncTemplate::ParamUnmarshalSimple,
        FuncTemplate::ParamUnmarshalJson,
        FuncTemplate::ResultName,
        FuncTemplate::ResultMarshalSimple,
        FuncTemplate::ResultMarshalJson,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FuncTemplate::ParamName => "param.func.name",
            FuncTemplate::ParamUnmarshalSimple => "param.func.unmarshal.simple",
            FuncTemplate::ParamUnmarshalJson => "param.func.unmarshal.json",
            FuncTemplate::ResultName => "result.func.name",
            FuncTemplate::ResultMarshalSimple => "result.func.marshal.simple",
            FuncTemplate::ResultMarshalJson => "result.func.marshal.json",
        }
    }

    /// Whether the rendered method references `encoding/json`.
    pub fn uses_json(self) -> bool {
        matches!(
            self,
            FuncTemplate::ParamUnmarshalJson | FuncTemplate::ResultMarshalJson
        )
    }

    /// The templates an entity of `kind` is rendered with, given its codec.
    pub fn for_entity(kind: EntityKind, codec: Codec) -> [FuncTemplate; 2] {
        match (kind, codec) {
            (EntityKind::Param, Codec::Raw) => {
                [FuncTemplate::ParamName, FuncTemplate::ParamUnmarshalSimple]
            }
            (EntityKind::Param, Codec::Json) => {
                [FuncTemplate::ParamName, FuncTemplate::ParamUnmarshalJson]
            }
            (EntityKind::Result, Codec::Raw) => {
                [FuncTemplate::ResultName, FuncTemplate::ResultMarshalSimple]
            }
            (EntityKind::Result, Codec::Json) => {
                [FuncTemplate::ResultName, FuncTemplate::ResultMarshalJson]
            }
        }
    }
}

/// Render arguments of a single entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncArgs {
    /// Param or result name, as it appears in the manifest.
    pub name: String,
    /// Go type the methods are attached to.
    pub type_name: String,
}

/// Entities to render, grouped per micro-template. Built fresh for every package.
#[derive(Debug, Default)]
pub struct TemplateArgsIndex {
    args: BTreeMap<FuncTemplate, Vec<FuncArgs>>,
    params: HashSet<String>,
    results: HashSet<String>,
}

impl TemplateArgsIndex {
    pub fn from_package(package: &Package) -> Self {
        let ctx = LogContext::package("go-func", &package.name);
        let mut index = Self::default();

        for entity in &package.entities {
            let kind = entity.marker.kind();
            let name = entity.marker.name();
            let entity_ctx = ctx.entity(kind, name);

            let seen = match &entity.marker {
                EntityMarker::Param(_) => &mut index.params,
                EntityMarker::Result(_) => &mut index.results,
            };
            entity_ctx.info(format!("{kind} found"));
            if !seen.insert(name.to_string()) {
                entity_ctx.warn(format!("{kind} duplicated! ensure unique name"));
                continue;
            }

            let codec = entity.shape.class().codec();
            for template in FuncTemplate::for_entity(kind, codec) {
                index.push(
                    template,
                    FuncArgs {
                        name: name.to_string(),
                        type_name: entity.name.clone(),
                    },
                );
            }
        }

        index
    }

    pub fn push(&mut self, template: FuncTemplate, args: FuncArgs) {
        self.args.entry(template).or_default().push(args);
    }

    pub fn get(&self, template: FuncTemplate) -> &[FuncArgs] {
        self.args.get(&template).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn uses_json(&self) -> bool {
        self.args
            .iter()
            .any(|(template, args)| template.uses_json() && !args.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.args.values().all(Vec::is_empty)
    }
}

/// Render `zz_generated.tektasker.go` for `package`.
///
/// Returns `Ok(None)` for packages without a task marker.
pub fn synthesize(
    package: &Package,
    header: &LicenseHeader,
) -> Result<Option<String>, CodegenError> {
    let ctx = LogContext::package("go-func", &package.name);
    ctx.debug("starting collecting");

    if package.task.is_none() {
        ctx.info("skipping non-task package");
        return Ok(None);
    }

    let index = TemplateArgsIndex::from_package(package);

    let imports: Vec<&str> = if index.uses_json() {
        vec![JSON_IMPORT]
    } else {
        Vec::new()
    };

    let mut sections = vec![templates::render_header(
        header.text(),
        &package.name,
        &imports,
    )?];
    for template in FuncTemplate::ALL {
        for args in index.get(template) {
            sections.push(templates::render_func(template, args)?);
        }
    }

    let mut output = sections.join("\n\n");
    output.push('\n');
    Ok(Some(output))
}
