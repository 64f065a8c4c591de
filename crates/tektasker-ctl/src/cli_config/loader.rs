//! Config file discovery and loading for `.tektasker.toml`.
//!
//! Without an explicit `--config`, two locations are checked in precedence order:
//! 1. `./.tektasker.toml` (project-local)
//! 2. `~/.config/tektasker.toml` (user-global)

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::CliConfig;

const CONFIG_FILENAME: &str = ".tektasker.toml";
const GLOBAL_CONFIG_DIR: &str = ".config";
const GLOBAL_CONFIG_FILENAME: &str = "tektasker.toml";

/// Load config from the first discovered location, or return defaults.
///
/// A discovered file that cannot be read or parsed is reported and ignored.
pub(crate) fn load_cli_config() -> CliConfig {
    let Some(path) = find_config_file(Path::new("."), home_dir().as_deref()) else {
        return CliConfig::default();
    };

    match load_config_file(&path) {
        Ok(config) => config,
        Err(e) => {
            let error = format!("{e:#}");
            tracing::warn!(?path, %error, "Failed to load config, using defaults");
            CliConfig::default()
        }
    }
}

/// Load an explicitly requested config file. Any failure is fatal.
pub(crate) fn load_config_file(path: &Path) -> anyhow::Result<CliConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    let config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
    tracing::debug!(?path, "Loaded config");
    Ok(config)
}

/// Search for the config file in precedence order.
fn find_config_file(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    let local = cwd.join(CONFIG_FILENAME);
    if local.is_file() {
        return Some(local);
    }

    let global = home?.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILENAME);
    global.is_file().then_some(global)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
