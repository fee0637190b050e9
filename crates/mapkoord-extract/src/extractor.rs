//! Schema-tolerant coordinate extraction.
//!
//! Map exports nest positions in several ways depending on the entity type
//! and tool version. Rather than bind to one schema, the walk makes two
//! passes over the document:
//!
//! 1. every element whose local name is a position tag;
//! 2. every container element, taking its first position-tagged child.
//!
//! Both passes feed one list that is then deduplicated, so a position seen
//! by both passes counts once.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use mapkoord_core::config::extract::ExtractConfig;
use roxmltree::{Document, Node, ParsingOptions};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::ExtractError;
use crate::position::{CoordinateSet, Position3D};

const AXES: [&str; 3] = ["x", "y", "z"];

/// Why a candidate element produced no position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// An axis is absent in both encodings.
    MissingComponent { axis: String },
    /// An axis is present but not a finite number.
    Unparsable { axis: String, text: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingComponent { axis } => write!(f, "missing '{axis}' component"),
            Self::Unparsable { axis, text } => write!(f, "'{axis}' is not a number: {text:?}"),
        }
    }
}

/// A candidate element that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCandidate {
    /// Element name as written in the document.
    pub element: String,
    /// 1-based line of the element's start tag.
    pub line: u32,
    pub reason: SkipReason,
}

/// Everything one extraction observed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractReport {
    /// Deduplicated positions in encounter order.
    pub coordinates: CoordinateSet,
    /// Candidates that yielded no position.
    pub skipped: Vec<SkippedCandidate>,
    /// Positions discarded as duplicates.
    pub duplicates: usize,
}

/// Extracts positions using configurable tag sets.
#[derive(Debug, Clone)]
pub struct CoordinateExtractor {
    position_tags: HashSet<String>,
    container_tags: HashSet<String>,
}

impl CoordinateExtractor {
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            position_tags: lowered(&config.position_tags),
            container_tags: lowered(&config.container_tags),
        }
    }

    /// Extract the coordinate set of the document at `path`.
    pub async fn extract(&self, path: &Path) -> Result<CoordinateSet, ExtractError> {
        Ok(self.extract_report(path).await?.coordinates)
    }

    /// Extract with full skip and duplicate accounting.
    ///
    /// The file is decoded as UTF-8 with invalid sequences replaced. Parsing
    /// runs on the blocking pool.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn extract_report(&self, path: &Path) -> Result<ExtractReport, ExtractError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ExtractError::Io {
            path: PathBuf::from(path),
            source,
        })?;

        let extractor = self.clone();
        let report = tokio::task::spawn_blocking(move || {
            let text = String::from_utf8_lossy(&bytes);
            extractor.extract_str(&text)
        })
        .await??;

        info!(
            points = report.coordinates.len(),
            skipped = report.skipped.len(),
            duplicates = report.duplicates,
            "Extracted coordinates"
        );
        Ok(report)
    }

    /// Extract from an in-memory document.
    pub fn extract_str(&self, xml: &str) -> Result<ExtractReport, ExtractError> {
        let options = ParsingOptions {
            allow_dtd: false,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(xml, options)?;

        let mut found = Vec::new();
        let mut skipped = Vec::new();

        let mut visit = |node| match read_position(node) {
            Ok(p) => found.push(p),
            Err(reason) => {
                let line = doc.text_pos_at(node.range().start).row;
                debug!(element = node.tag_name().name(), line, %reason, "Skipping candidate");
                skipped.push(SkippedCandidate {
                    element: node.tag_name().name().to_string(),
                    line,
                    reason,
                });
            }
        };

        for node in doc.descendants().filter(|n| self.is_position(n)) {
            visit(node);
        }

        for container in doc.descendants().filter(|n| self.is_container(n)) {
            if let Some(child) = container.children().find(|c| self.is_position(c)) {
                visit(child);
            }
        }

        let (coordinates, duplicates) = CoordinateSet::dedup(found);
        Ok(ExtractReport {
            coordinates,
            skipped,
            duplicates,
        })
    }

    fn is_position(&self, node: &Node<'_, '_>) -> bool {
        node.is_element() && self.position_tags.contains(&local_name(node))
    }

    fn is_container(&self, node: &Node<'_, '_>) -> bool {
        node.is_element() && self.container_tags.contains(&local_name(node))
    }
}

impl Default for CoordinateExtractor {
    fn default() -> Self {
        Self::new(&ExtractConfig::default())
    }
}

fn lowered(tags: &[String]) -> HashSet<String> {
    tags.iter().map(|t| t.to_lowercase()).collect()
}

/// Lower-cased element name without namespace.
fn local_name(node: &Node<'_, '_>) -> String {
    node.tag_name().name().to_lowercase()
}

/// Attribute encoding first; child elements only if that is incomplete.
fn read_position(node: Node<'_, '_>) -> Result<Position3D, SkipReason> {
    let from_attrs = read_axes(|axis| node.attribute(axis).map(str::to_string));
    let has_attrs = AXES.iter().any(|a| node.attribute(*a).is_some());

    match from_attrs {
        Ok(p) => Ok(p),
        Err(attr_reason) => {
            let from_children = read_axes(|axis| {
                node.children()
                    .find(|c| c.is_element() && c.tag_name().name() == axis)
                    .map(|c| c.text().unwrap_or_default().to_string())
            });
            from_children.map_err(|child_reason| {
                if has_attrs { attr_reason } else { child_reason }
            })
        }
    }
}

fn read_axes(lookup: impl Fn(&str) -> Option<String>) -> Result<Position3D, SkipReason> {
    let mut values = [0f64; 3];
    for (slot, axis) in values.iter_mut().zip(AXES) {
        let raw = lookup(axis).ok_or_else(|| SkipReason::MissingComponent {
            axis: axis.to_string(),
        })?;
        *slot = parse_axis(axis, &raw)?;
    }
    Ok(Position3D::new(values[0], values[1], values[2]))
}

fn parse_axis(axis: &str, raw: &str) -> Result<f64, SkipReason> {
    let unparsable = || SkipReason::Unparsable {
        axis: axis.to_string(),
        text: raw.to_string(),
    };
    let value: f64 = raw.trim().parse().map_err(|_| unparsable())?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(unparsable())
    }
}
