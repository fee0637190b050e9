//! # mapkoord-extract
//!
//! Pulls every 3D position out of an exported map XML document without
//! assuming a fixed schema, and condenses the result into a summary.

pub mod error;
pub mod extractor;
pub mod position;
pub mod summary;

pub use error::ExtractError;
pub use extractor::{CoordinateExtractor, ExtractReport, SkipReason, SkippedCandidate};
pub use position::{CoordinateSet, Position3D};
pub use summary::{Bounds, Summary, summarize};
