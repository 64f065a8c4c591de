//! Supporting Go files: the `Parameter` and `Result` contracts and their
//! environment-based helpers.

use super::templates;
use super::{CodegenError, LicenseHeader};

pub const PARAMETER_FILE: &str = "parameter.go";
pub const RESULT_FILE: &str = "result.go";

const SUPPORT_IMPORTS: [&str; 4] = ["errors", "fmt", "os", "strings"];

/// A rendered supporting file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportFile {
    pub file_name: &'static str,
    pub content: String,
}

/// Render `result.go` and `parameter.go` for the package `pkg_name`.
pub fn support_files(
    pkg_name: &str,
    header: &LicenseHeader,
) -> Result<Vec<SupportFile>, CodegenError> {
    let file_header = templates::render_header(header.text(), pkg_name, &SUPPORT_IMPORTS)?;
    tracing::debug!(generator = "go-internal", package = pkg_name, "generating header");

    let mut files = Vec::with_capacity(2);
    for (file_name, body) in [
        (RESULT_FILE, templates::render_result_type()?),
        (PARAMETER_FILE, templates::render_parameter_type()?),
    ] {
        tracing::info!(generator = "go-internal", file = file_name, "generating file");
        files.push(SupportFile {
            file_name,
            content: format!("{file_header}\n\n{body}\n"),
        });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_files_share_header() {
        let header = LicenseHeader::from_text("// Copyright YEAR", "2024");
        let files = support_files("tekton", &header).unwrap();

        let names: Vec<_> = files.iter().map(|f| f.file_name).collect();
        assert_eq!(names, vec![RESULT_FILE, PARAMETER_FILE]);

        for file in &files {
            assert!(file.content.starts_with("// Copyright 2024\n\n"));
            assert!(file.content.contains("package tekton\n"));
            assert!(file.content.contains("\t\"strings\"\n)"));
            assert!(file.content.ends_with("}\n"));
        }
        assert!(files[0].content.contains("func Write(r Result) error"));
        assert!(files[1].content.contains("func Read(v Parameter) error"));
    }
}
