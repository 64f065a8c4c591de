//! Command handlers for the tektasker CLI.

pub(crate) mod generate;
pub(crate) mod markers;

pub(crate) use generate::handle_generate_command;
pub(crate) use markers::handle_markers_command;
