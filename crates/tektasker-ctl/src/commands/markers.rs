//! `tektasker markers`: marker reference.

use anyhow::{anyhow, Context};
use tektasker_sdk::markers::{MarkerDefinition, MarkerRegistry, TargetType};

use crate::output;

pub(crate) fn handle_markers_command(name: Option<&str>, target: &str) -> anyhow::Result<()> {
    let registry = MarkerRegistry::tektasker();

    match name {
        Some(name) => {
            let target: TargetType = target.parse().context("invalid marker target")?;
            let definition = registry
                .lookup(name, target)
                .ok_or_else(|| anyhow!("marker not found: {name} on a {target}"))?;
            show_marker(definition);
        }
        None => show_all_markers(&registry),
    }
    Ok(())
}

fn show_marker(definition: &MarkerDefinition) {
    output::header(definition.help.category);
    output::marker(0, definition.usage());
    output::label("Target", definition.target);
    output::label("Repeatable", definition.repeatable);
    output::blank();
    output::dim(definition.help.summary);
    if !definition.help.details.is_empty() {
        output::blank();
        output::dim(definition.help.details);
    }

    if !definition.help.fields.is_empty() {
        output::blank();
        output::header("Arguments");
        for field in &definition.help.fields {
            let optional = if field.optional { ", optional" } else { "" };
            output::item(format!(
                "{} ({}{optional}): {}",
                field.name, field.type_name, field.summary
            ));
        }
    }
}

fn show_all_markers(registry: &MarkerRegistry) {
    for (category, definitions) in registry.by_category() {
        output::header(category);
        for definition in definitions {
            output::marker(2, definition.usage());
            output::dim(format!("    {}", definition.help.summary));
        }
        output::blank();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_marker() {
        assert!(handle_markers_command(Some("+tektasker:param"), "type").is_ok());
        assert!(handle_markers_command(Some("tektasker:workspace"), "PACKAGE").is_ok());
    }

    #[test]
    fn test_marker_on_wrong_target() {
        let err = handle_markers_command(Some("tektasker:param"), "package").unwrap_err();
        assert!(err.to_string().contains("marker not found"));
    }

    #[test]
    fn test_unknown_target() {
        assert!(handle_markers_command(Some("tektasker:param"), "struct").is_err());
    }

    #[test]
    fn test_all_markers() {
        assert!(handle_markers_command(None, "type").is_ok());
    }
}
