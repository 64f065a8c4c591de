//! Step command rendering.
//!
//! The command of the Task step is a user-configurable Tera template rendered against
//! the package being generated. The result is split on single ASCII spaces without any
//! shell-style quoting: a value containing a space ends up split across two arguments.

use serde::Serialize;
use tera::{Context, Tera};

use super::filters;
use crate::entity::Package;

/// Default command: the entrypoint ko gives to a binary built from the package.
pub const DEFAULT_STEP_COMMAND: &str = "/ko-app/{{ ko_app_name }}";

/// Entrypoint name used by ko when the import path has no usable last segment.
pub const KO_APP_FALLBACK: &str = "ko-app";

const TEMPLATE_NAME: &str = "step_command";

/// Values available to the step command template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandArgs {
    /// Name of the Go package (e.g. `main`).
    pub pkg_name: String,
    pub import_path: String,
    /// Entrypoint name of the ko-built binary.
    pub ko_app_name: String,
}

impl CommandArgs {
    pub fn for_package(package: &Package) -> Self {
        Self {
            pkg_name: package.name.clone(),
            import_path: package.import_path.clone(),
            ko_app_name: ko_app_name(&package.import_path),
        }
    }
}

/// A parsed step command template.
#[derive(Debug, Clone)]
pub struct CommandTemplate {
    tera: Tera,
}

impl CommandTemplate {
    pub fn parse(source: &str) -> Result<Self, CommandError> {
        let mut tera = Tera::default();
        filters::register(&mut tera);

        tera.add_raw_template(TEMPLATE_NAME, source)
            .map_err(|e| CommandError::Parse {
                template: source.to_string(),
                source: e,
            })?;

        Ok(Self { tera })
    }

    pub fn render(&self, args: &CommandArgs) -> Result<String, CommandError> {
        let context = Context::from_serialize(args).map_err(CommandError::Render)?;
        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(CommandError::Render)
    }

    /// Render and split into the step's argv.
    pub fn argv(&self, args: &CommandArgs) -> Result<Vec<String>, CommandError> {
        let rendered = self.render(args)?;
        Ok(rendered.split(' ').map(String::from).collect())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("invalid step command template '{template}': {source}")]
    Parse {
        template: String,
        source: tera::Error,
    },
    #[error("failed to render step command: {0}")]
    Render(tera::Error),
}

/// Name ko gives to the entrypoint of a binary built from `import_path`.
pub fn ko_app_name(import_path: &str) -> String {
    match path_base(import_path) {
        "." | "/" => KO_APP_FALLBACK.to_string(),
        base => base.to_string(),
    }
}

/// Last element of a slash-separated path, with Go `path.Base` semantics.
fn path_base(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    match trimmed.rfind('/') {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}
