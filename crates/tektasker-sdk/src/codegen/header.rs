//! License header prepended to every generated Go file.

use std::fs;
use std::path::Path;

use super::CodegenError;

/// Placeholder replaced by the configured year (the leading space is part of it).
const YEAR_PLACEHOLDER: &str = " YEAR";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseHeader {
    text: String,
}

impl LicenseHeader {
    pub fn none() -> Self {
        Self::default()
    }

    /// Use `text`, substituting every ` YEAR` with ` <year>`.
    pub fn from_text(text: &str, year: &str) -> Self {
        Self {
            text: text.replace(YEAR_PLACEHOLDER, &format!(" {year}")),
        }
    }

    pub fn load(path: &Path, year: &str) -> Result<Self, CodegenError> {
        let text = fs::read_to_string(path).map_err(|e| CodegenError::Header {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::from_text(&text, year))
    }

    /// Header text, empty when the header is blank.
    pub fn text(&self) -> &str {
        if self.is_empty() {
            ""
        } else {
            &self.text
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
