//! Generators and the generation run.
//!
//! A [`Generator`] renders artifacts for a set of root packages. A [`GenerationRun`]
//! renders every generator first and only then writes through each generator's
//! [`OutputRule`], so a fatal error leaves the filesystem untouched.

mod output;

use std::io::Write;
use std::path::{Path, PathBuf};

pub use output::{Artifact, OutputError, OutputRule};

use crate::codegen::{self, CodegenError, LicenseHeader, GO_BINDINGS_FILE};
use crate::collector::{Collector, CollectorError};
use crate::entity::Package;
use crate::manifest::{Kustomization, ManifestBuilder, ManifestError};
use crate::markers::MarkerRegistry;

/// Directory of the manifests, relative to the output root.
pub const MANIFEST_BASE_DIR: &str = "base";
pub const KUSTOMIZATION_FILE: &str = "kustomization.yaml";

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Collector(#[from] CollectorError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error("failed to serialize '{path}': {source}")]
    Serialize {
        path: String,
        source: serde_yaml::Error,
    },
}

/// Renders artifacts for the root packages of a run.
pub trait Generator: std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn generate(&self, roots: &[Package]) -> Result<Vec<Artifact>, GenerateError>;
}

/// Task manifests under `base/`, plus one kustomization listing all of them.
#[derive(Debug)]
pub struct ManifestGenerator {
    builder: ManifestBuilder,
    skip_kustomization: bool,
}

impl ManifestGenerator {
    pub fn new(builder: ManifestBuilder) -> Self {
        Self {
            builder,
            skip_kustomization: false,
        }
    }

    pub fn skip_kustomization(mut self, skip: bool) -> Self {
        self.skip_kustomization = skip;
        self
    }
}

impl Generator for ManifestGenerator {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn generate(&self, roots: &[Package]) -> Result<Vec<Artifact>, GenerateError> {
        let mut artifacts = Vec::new();
        let mut kustomization = Kustomization::default();

        for package in roots {
            let Some(manifest) = self.builder.build(package)? else {
                continue;
            };

            let file_name = manifest.file_name();
            let path = Path::new(MANIFEST_BASE_DIR).join(&file_name);
            let yaml = manifest.to_yaml().map_err(|e| GenerateError::Serialize {
                path: path.display().to_string(),
                source: e,
            })?;
            artifacts.push(Artifact::rooted(path, yaml_document(yaml)));
            kustomization.resources.push(file_name);
        }

        if !self.skip_kustomization && !kustomization.resources.is_empty() {
            let path = Path::new(MANIFEST_BASE_DIR).join(KUSTOMIZATION_FILE);
            let yaml = kustomization
                .to_yaml()
                .map_err(|e| GenerateError::Serialize {
                    path: path.display().to_string(),
                    source: e,
                })?;
            artifacts.push(Artifact::rooted(path, yaml_document(yaml)));
        }

        Ok(artifacts)
    }
}

fn yaml_document(yaml: String) -> String {
    format!("---\n{yaml}")
}

/// `zz_generated.tektasker.go` in every task package directory.
#[derive(Debug)]
pub struct GoBindingsGenerator {
    header: LicenseHeader,
}

impl GoBindingsGenerator {
    pub fn new(header: LicenseHeader) -> Self {
        Self { header }
    }
}

impl Generator for GoBindingsGenerator {
    fn name(&self) -> &'static str {
        "go-func"
    }

    fn generate(&self, roots: &[Package]) -> Result<Vec<Artifact>, GenerateError> {
        let mut artifacts = Vec::new();
        for package in roots {
            if let Some(source) = codegen::synthesize(package, &self.header)? {
                artifacts.push(Artifact::in_package(&package.dir, GO_BINDINGS_FILE, source));
            }
        }
        Ok(artifacts)
    }
}

/// `parameter.go` and `result.go`, rendered once for the run.
#[derive(Debug)]
pub struct GoSupportGenerator {
    package_name: String,
    header: LicenseHeader,
}

impl GoSupportGenerator {
    pub fn new(package_name: impl Into<String>, header: LicenseHeader) -> Self {
        Self {
            package_name: package_name.into(),
            header,
        }
    }
}

impl Generator for GoSupportGenerator {
    fn name(&self) -> &'static str {
        "go-internal"
    }

    fn generate(&self, _roots: &[Package]) -> Result<Vec<Artifact>, GenerateError> {
        Ok(codegen::support_files(&self.package_name, &self.header)?
            .into_iter()
            .map(|file| Artifact::rooted(file.file_name, file.content))
            .collect())
    }
}

/// Summary of a completed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Files written to disk, in write order.
    pub written: Vec<PathBuf>,
    /// Number of artifacts sent to stdout.
    pub printed: usize,
}

/// Generators bound to the root packages of one invocation.
#[derive(Debug)]
pub struct GenerationRun {
    roots: Vec<Package>,
    generators: Vec<(Box<dyn Generator>, OutputRule)>,
}

impl GenerationRun {
    pub fn new(roots: Vec<Package>) -> Self {
        Self {
            roots,
            generators: Vec::new(),
        }
    }

    /// Collect and decode the root packages.
    pub fn for_roots(
        collector: &dyn Collector,
        registry: &MarkerRegistry,
    ) -> Result<Self, GenerateError> {
        let roots = collector
            .collect()?
            .into_iter()
            .map(|pkg| pkg.into_package(registry))
            .collect();
        Ok(Self::new(roots))
    }

    pub fn with_generator(mut self, generator: impl Generator + 'static, rule: OutputRule) -> Self {
        self.generators.push((Box::new(generator), rule));
        self
    }

    pub fn roots(&self) -> &[Package] {
        &self.roots
    }

    /// Render everything, then write it.
    pub fn run(&self, stdout: &mut dyn Write) -> Result<RunSummary, GenerateError> {
        let mut rendered = Vec::with_capacity(self.generators.len());
        for (generator, rule) in &self.generators {
            tracing::debug!(generator = generator.name(), "rendering");
            let artifacts = generator.generate(&self.roots)?;
            // resolve every destination before the first write
            for artifact in &artifacts {
                rule.destination(artifact)?;
            }
            rendered.push((generator.name(), rule, artifacts));
        }

        let mut summary = RunSummary::default();
        for (name, rule, artifacts) in rendered {
            tracing::info!(generator = name, artifacts = artifacts.len(), "writing");
            if *rule == OutputRule::Stdout {
                summary.printed += artifacts.len();
            }
            summary.written.extend(rule.write(&artifacts, stdout)?);
        }
        Ok(summary)
    }
}
