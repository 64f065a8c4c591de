//! Style constants and clap help styling configuration.

use anstyle::{AnsiColor, Color, Effects, Style};

const fn fg(color: AnsiColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(color)))
}

/// Green: written files, completed runs.
pub(crate) const SUCCESS: Style = fg(AnsiColor::Green);

/// Red: fatal errors.
pub(crate) const ERROR: Style = fg(AnsiColor::Red);

/// Yellow: warnings.
pub(crate) const WARNING: Style = fg(AnsiColor::Yellow);

/// Bold: marker categories and section headers.
pub(crate) const HEADER: Style = Style::new().effects(Effects::BOLD);

/// Cyan: marker usage lines.
pub(crate) const MARKER: Style = fg(AnsiColor::Cyan);

/// Bold: label names in "Label: value" pairs.
pub(crate) const LABEL: Style = Style::new().effects(Effects::BOLD);

/// Dimmed: summaries and secondary information.
pub(crate) const DIM: Style = Style::new().effects(Effects::DIMMED);

/// Custom clap styles for help output, matching our CLI palette.
pub(crate) fn clap_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .header(fg(AnsiColor::Green).effects(Effects::BOLD))
        .usage(fg(AnsiColor::Green).effects(Effects::BOLD))
        .literal(fg(AnsiColor::Cyan))
        .placeholder(fg(AnsiColor::Cyan))
        .error(fg(AnsiColor::Red).effects(Effects::BOLD))
        .valid(fg(AnsiColor::Green))
        .invalid(fg(AnsiColor::Yellow))
}
