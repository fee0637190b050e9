//! # mapkoord-export
//!
//! Turns a binary map asset into an XML document by driving the external
//! CodeWalker executable.
//!
//! The tool's command-line surface differs between versions, so an export
//! is a sequence of attempts over an ordered list of argument conventions.
//! Each attempt runs the tool hidden, with the tool's own directory as the
//! working directory, and watches the destination file until it is written
//! or the attempt times out. Sources that already sniff as XML are passed
//! through without starting any process.

pub mod attempt;
pub mod convention;
pub mod error;
pub mod locator;
pub mod orchestrator;
pub mod runner;
pub mod source;

pub use attempt::{AttemptOutcome, AttemptRecord};
pub use error::ExportError;
pub use locator::{DiscoveryMethod, ToolInstallation, ToolLocator};
pub use orchestrator::{ExportOrchestrator, Provenance, XmlSource};
pub use runner::{HiddenProcessRunner, SilentRunner};
pub use source::{SourceAsset, SourceKind};
