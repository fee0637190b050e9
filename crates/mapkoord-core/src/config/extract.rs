//! Coordinate extraction configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Tag-name sets used by the heuristic XML walk.
///
/// Names are matched case-insensitively against the element's local name.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Elements that directly carry a position.
    #[validate(length(min = 1))]
    pub position_tags: Vec<String>,
    /// Elements that own at most one position child.
    pub container_tags: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            position_tags: ["position", "pos", "v3"].map(String::from).to_vec(),
            container_tags: ["centitydef", "ientitydef", "entity", "item"]
                .map(String::from)
                .to_vec(),
        }
    }
}
