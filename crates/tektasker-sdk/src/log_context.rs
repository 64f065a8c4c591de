//! Structured logging context passed explicitly through each generation stage.

use std::fmt;

use crate::entity::EntityKind;

/// The `{package, entity, kind}` fields attached to every event of a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    pub generator: &'static str,
    pub package: String,
    pub entity: Option<String>,
    pub kind: Option<EntityKind>,
}

impl LogContext {
    pub fn package(generator: &'static str, package: impl Into<String>) -> Self {
        Self {
            generator,
            package: package.into(),
            entity: None,
            kind: None,
        }
    }

    /// Narrow the context to a single param or result.
    pub fn entity(&self, kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            generator: self.generator,
            package: self.package.clone(),
            entity: Some(name.into()),
            kind: Some(kind),
        }
    }

    fn entity_field(&self) -> &str {
        self.entity.as_deref().unwrap_or_default()
    }

    fn kind_field(&self) -> &'static str {
        self.kind.map(EntityKind::as_str).unwrap_or_default()
    }

    pub fn debug(&self, message: impl fmt::Display) {
        tracing::debug!(
            generator = self.generator,
            package = %self.package,
            entity = self.entity_field(),
            kind = self.kind_field(),
            "{message}"
        );
    }

    pub fn info(&self, message: impl fmt::Display) {
        tracing::info!(
            generator = self.generator,
            package = %self.package,
            entity = self.entity_field(),
            kind = self.kind_field(),
            "{message}"
        );
    }

    pub fn warn(&self, message: impl fmt::Display) {
        tracing::warn!(
            generator = self.generator,
            package = %self.package,
            entity = self.entity_field(),
            kind = self.kind_field(),
            "{message}"
        );
    }
}
