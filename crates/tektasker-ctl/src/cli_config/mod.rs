//! Project configuration for `tektasker`.
//!
//! Every key is optional. Command-line flags take precedence over the file, and the
//! file over built-in defaults.

pub(crate) mod loader;

pub(crate) use loader::{load_cli_config, load_config_file};

use std::path::PathBuf;

use serde::Deserialize;

/// Contents of `.tektasker.toml`.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct CliConfig {
    /// Snapshot files used when no `--input` is given.
    #[serde(default)]
    pub inputs: Vec<PathBuf>,

    /// Tera template of the Task step command.
    pub step_command: Option<String>,

    /// License header prepended to generated Go files.
    pub header_file: Option<PathBuf>,

    /// Parent directory of the generated support package. Default: `internal/`.
    pub internal_dir: Option<PathBuf>,

    /// Name of the generated support package. Default: `tekton`.
    pub internal_package: Option<String>,

    /// Output directory of `generate manifest`.
    pub manifest_dir: Option<PathBuf>,

    /// Do not emit `base/kustomization.yaml`.
    #[serde(default)]
    pub skip_kustomization: bool,
}
