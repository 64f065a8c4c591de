//! Output rules: where rendered artifacts end up.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A rendered file, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Directory of the package the artifact belongs to, for per-package output.
    pub package_dir: Option<PathBuf>,
    /// Path relative to the output root (or to the package directory).
    pub path: PathBuf,
    pub content: String,
}

impl Artifact {
    /// An artifact laid out under the output root.
    pub fn rooted(path: impl Into<PathBuf>, content: String) -> Self {
        Self {
            package_dir: None,
            path: path.into(),
            content,
        }
    }

    /// An artifact written next to the package sources.
    pub fn in_package(package_dir: &Path, path: impl Into<PathBuf>, content: String) -> Self {
        Self {
            package_dir: Some(package_dir.to_path_buf()),
            path: path.into(),
            content,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("artifact '{}' has no package directory", path.display())]
    NoPackageDir { path: PathBuf },
    #[error("failed to write to stdout: {0}")]
    Stdout(#[source] io::Error),
}

/// Destination of a generator's artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputRule {
    /// Concatenate every artifact on the given writer.
    Stdout,
    /// Write every artifact under a root directory.
    Directory(PathBuf),
    /// Write every artifact into its package directory.
    Artifacts,
}

impl OutputRule {
    /// Resolve where `artifact` goes. `None` for stdout.
    pub fn destination(&self, artifact: &Artifact) -> Result<Option<PathBuf>, OutputError> {
        match self {
            OutputRule::Stdout => Ok(None),
            OutputRule::Directory(root) => Ok(Some(root.join(&artifact.path))),
            OutputRule::Artifacts => match &artifact.package_dir {
                Some(dir) => Ok(Some(dir.join(&artifact.path))),
                None => Err(OutputError::NoPackageDir {
                    path: artifact.path.clone(),
                }),
            },
        }
    }

    /// Write `artifacts`, returning the files created.
    pub fn write(
        &self,
        artifacts: &[Artifact],
        stdout: &mut dyn Write,
    ) -> Result<Vec<PathBuf>, OutputError> {
        let mut written = Vec::new();
        for artifact in artifacts {
            match self.destination(artifact)? {
                None => stdout
                    .write_all(artifact.content.as_bytes())
                    .map_err(OutputError::Stdout)?,
                Some(path) => {
                    write_file(&path, &artifact.content)?;
                    tracing::debug!(path = %path.display(), "wrote artifact");
                    written.push(path);
                }
            }
        }
        Ok(written)
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), OutputError> {
    let err = |e| OutputError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(err)?;
    }
    fs::write(path, content).map_err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stdout_concatenates() {
        let artifacts = vec![
            Artifact::rooted("a.yaml", "---\na: 1\n".into()),
            Artifact::rooted("b.yaml", "---\nb: 2\n".into()),
        ];
        let mut out = Vec::new();
        let written = OutputRule::Stdout.write(&artifacts, &mut out).unwrap();

        assert!(written.is_empty());
        assert_eq!(String::from_utf8(out).unwrap(), "---\na: 1\n---\nb: 2\n");
    }

    #[test]
    fn test_directory_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let rule = OutputRule::Directory(tmp.path().to_path_buf());
        let artifacts = vec![Artifact::rooted("base/kustomization.yaml", "resources: []\n".into())];

        let written = rule.write(&artifacts, &mut io::sink()).unwrap();

        let expected = tmp.path().join("base/kustomization.yaml");
        assert_eq!(written, vec![expected.clone()]);
        assert_eq!(fs::read_to_string(expected).unwrap(), "resources: []\n");
    }

    #[test]
    fn test_artifacts_go_to_package_dir() {
        let tmp = TempDir::new().unwrap();
        let pkg_dir = tmp.path().join("examples");
        let artifacts = vec![Artifact::in_package(
            &pkg_dir,
            "zz_generated.tektasker.go",
            "package examples\n".into(),
        )];

        OutputRule::Artifacts
            .write(&artifacts, &mut io::sink())
            .unwrap();
        assert!(pkg_dir.join("zz_generated.tektasker.go").exists());
    }

    #[test]
    fn test_artifacts_require_package_dir() {
        let artifact = Artifact::rooted("orphan.go", String::new());
        assert!(matches!(
            OutputRule::Artifacts.destination(&artifact),
            Err(OutputError::NoPackageDir { .. })
        ));
    }
}
