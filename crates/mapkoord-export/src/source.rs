//! Source asset classification by content sniffing.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Leading bytes inspected when sniffing.
const SNIFF_LEN: u64 = 256;

/// UTF-8 byte order mark.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Format of a source asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Text XML; usable by the extractor as-is.
    Xml,
    /// Proprietary binary asset; needs the external exporter.
    Binary,
}

/// A classified source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAsset {
    path: PathBuf,
    kind: SourceKind,
}

impl SourceAsset {
    /// Classify `path`.
    ///
    /// An `.xml` suffix short-circuits to [`SourceKind::Xml`] without
    /// touching the file; otherwise the content decides.
    pub async fn classify(path: &Path) -> Self {
        let kind = if has_xml_suffix(path) || sniff_file(path).await {
            SourceKind::Xml
        } else {
            SourceKind::Binary
        };
        debug!(path = %path.display(), kind = ?kind, "Classified source");
        Self {
            path: path.to_path_buf(),
            kind,
        }
    }

    /// Source path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Classification.
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Whether the source is already XML.
    pub fn is_xml(&self) -> bool {
        self.kind == SourceKind::Xml
    }
}

/// `.xml` (including `.ymap.xml`), case-insensitive.
pub fn has_xml_suffix(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.to_ascii_lowercase().ends_with(".xml"))
}

/// First non-whitespace byte (after an optional UTF-8 BOM) is `<`.
pub fn looks_like_xml(bytes: &[u8]) -> bool {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    bytes.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'<')
}

/// Content-sniff the first [`SNIFF_LEN`] bytes of a file. Unreadable files
/// are not XML.
pub async fn sniff_file(path: &Path) -> bool {
    let file = match tokio::fs::File::open(path).await {
        Ok(f) => f,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Cannot open file for sniffing");
            return false;
        }
    };

    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    if let Err(e) = file.take(SNIFF_LEN).read_to_end(&mut head).await {
        debug!(path = %path.display(), error = %e, "Read failed while sniffing");
        return false;
    }

    looks_like_xml(&head)
}
