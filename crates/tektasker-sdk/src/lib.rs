//! Shared SDK for tektasker: marker registry, schema inference, Task manifest assembly
//! and Go binding synthesis.
//!
//! This crate is consumed by `tektasker-ctl` (CLI). It contains no source loader: packages
//! are handed over by a [`collector::Collector`] implementation.
//!
//! # Modules
//!
//! - [`markers`]: Marker definitions, help text and payload decoding
//! - [`collector`]: Collector seam, package snapshots and boundary translation
//! - [`entity`]: Declared entities, shapes and the shared shape classification
//! - [`schema`]: Parameter/result schema inference
//! - [`manifest`]: Tekton Task manifest assembly and step command rendering
//! - [`codegen`]: Askama-based Go binding synthesis
//! - [`generate`]: Generators, output rules and the generation run

pub mod codegen;
pub mod collector;
pub mod entity;
pub mod generate;
pub mod log_context;
pub mod manifest;
pub mod markers;
pub mod schema;
