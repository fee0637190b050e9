//! # mapkoord-service
//!
//! Composes the exporter and the extractor into the single operation the
//! CLI exposes: turn a map asset into a coordinate report.

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineReport, PipelineRequest};
