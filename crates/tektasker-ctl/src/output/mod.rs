//! Styled terminal output for `tektasker`.
//!
//! Styles come from `anstyle`; `anstream` strips them when the stream is not a
//! terminal. In dry-run mode stdout carries the generated artifacts, so handlers only
//! report through here on real runs; warnings and errors always go to stderr.

mod styles;

use std::fmt::Display;
use std::io::Write;

use anstyle::Style;

pub(crate) use styles::clap_styles;

use styles::{DIM, ERROR, HEADER, LABEL, MARKER, SUCCESS, WARNING};

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Write one line, `style` applied to everything after the indent.
fn line(stream: Stream, indent: usize, style: Style, msg: impl Display) {
    let text = format!("{:indent$}{style}{msg}{style:#}", "");
    // Output failures (closed pipe) are not worth aborting a generation for
    let _ = match stream {
        Stream::Stdout => writeln!(anstream::stdout().lock(), "{text}"),
        Stream::Stderr => writeln!(anstream::stderr().lock(), "{text}"),
    };
}

pub(crate) fn success(msg: impl Display) {
    line(Stream::Stdout, 0, SUCCESS, format_args!("✓ {msg}"));
}

pub(crate) fn error(msg: impl Display) {
    line(Stream::Stderr, 0, ERROR, format_args!("✗ {msg}"));
}

pub(crate) fn warning(msg: impl Display) {
    line(Stream::Stderr, 0, WARNING, format_args!("! {msg}"));
}

/// Section title, e.g. a marker category.
pub(crate) fn header(msg: impl Display) {
    line(Stream::Stdout, 0, HEADER, msg);
}

/// Marker usage line such as `+tektasker:param:name=<string>`.
pub(crate) fn marker(indent: usize, usage: impl Display) {
    line(Stream::Stdout, indent, MARKER, usage);
}

/// `  Name: value`, name in bold.
pub(crate) fn label(name: impl Display, value: impl Display) {
    line(
        Stream::Stdout,
        2,
        Style::new(),
        format_args!("{LABEL}{name}:{LABEL:#} {value}"),
    );
}

pub(crate) fn dim(msg: impl Display) {
    line(Stream::Stdout, 0, DIM, msg);
}

/// Bulleted entry, used for written files and marker arguments.
pub(crate) fn item(msg: impl Display) {
    line(Stream::Stdout, 2, Style::new(), format_args!("• {msg}"));
}

pub(crate) fn blank() {
    line(Stream::Stdout, 0, Style::new(), "");
}
