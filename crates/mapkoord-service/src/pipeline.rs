//! Map asset to coordinate report: `ensure_xml`, then `extract`, then
//! `summarize`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use mapkoord_core::config::AppConfig;
use mapkoord_core::settings::UserSettings;
use mapkoord_core::AppResult;
use mapkoord_export::{
    AttemptRecord, ExportOrchestrator, HiddenProcessRunner, Provenance, SilentRunner,
    ToolInstallation, XmlSource,
};
use mapkoord_extract::{
    CoordinateExtractor, CoordinateSet, ExtractReport, SkippedCandidate, Summary, summarize,
};

/// Input to one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    /// XML document or binary map asset.
    pub source: PathBuf,
    /// Tool location supplied for this run only.
    pub tool_hint: Option<PathBuf>,
}

impl PipelineRequest {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            tool_hint: None,
        }
    }

    pub fn with_tool_hint(mut self, hint: Option<PathBuf>) -> Self {
        self.tool_hint = hint;
        self
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Document the coordinates were read from.
    pub xml_path: PathBuf,
    pub provenance: Provenance,
    /// Export attempts, empty when the source was already XML.
    pub attempts: Vec<AttemptRecord>,
    pub coordinates: CoordinateSet,
    pub skipped: Vec<SkippedCandidate>,
    pub duplicates: usize,
    pub summary: Summary,
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "XML: {}", self.xml_path.display())?;
        writeln!(f, "{}", self.provenance.message())?;
        writeln!(f)?;
        write!(f, "{}", self.summary)
    }
}

/// Export plus extraction behind one call.
pub struct Pipeline<R = HiddenProcessRunner> {
    orchestrator: Arc<ExportOrchestrator<R>>,
    extractor: Arc<CoordinateExtractor>,
    saved_tool: Option<PathBuf>,
}

impl<R> Clone for Pipeline<R> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            extractor: Arc::clone(&self.extractor),
            saved_tool: self.saved_tool.clone(),
        }
    }
}

impl Pipeline<HiddenProcessRunner> {
    /// Pipeline wired from configuration and the persisted settings.
    pub fn from_config(config: &AppConfig) -> Self {
        let settings = UserSettings::load(&config.effective_settings_path());
        Self::new(
            ExportOrchestrator::new(config.export.clone()),
            CoordinateExtractor::new(&config.extract),
        )
        .with_saved_tool(settings.codewalker_path)
    }
}

impl<R: SilentRunner> Pipeline<R> {
    pub fn new(orchestrator: ExportOrchestrator<R>, extractor: CoordinateExtractor) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            extractor: Arc::new(extractor),
            saved_tool: None,
        }
    }

    /// Tool path remembered from an earlier session.
    pub fn with_saved_tool(mut self, path: Option<PathBuf>) -> Self {
        self.saved_tool = path;
        self
    }

    pub fn orchestrator(&self) -> &ExportOrchestrator<R> {
        &self.orchestrator
    }

    /// The per-run hint, else the saved tool path.
    pub fn tool_hint<'a>(&'a self, request_hint: Option<&'a Path>) -> Option<&'a Path> {
        request_hint.or(self.saved_tool.as_deref())
    }

    /// Resolve the tool the way an export would.
    pub fn locate(&self, request_hint: Option<&Path>) -> AppResult<ToolInstallation> {
        Ok(self.orchestrator.resolve_tool(self.tool_hint(request_hint))?)
    }

    /// Make the source available as XML.
    pub async fn export(&self, request: &PipelineRequest) -> AppResult<XmlSource> {
        let hint = self.tool_hint(request.tool_hint.as_deref());
        Ok(self.orchestrator.ensure_xml(&request.source, hint).await?)
    }

    /// Extract coordinates from an XML document.
    pub async fn extract(&self, xml_path: &Path) -> AppResult<ExtractReport> {
        Ok(self.extractor.extract_report(xml_path).await?)
    }

    /// Run the whole pipeline.
    #[instrument(skip(self), fields(source = %request.source.display()))]
    pub async fn process(&self, request: &PipelineRequest) -> AppResult<PipelineReport> {
        let xml = self.export(request).await?;
        let extracted = self.extract(&xml.path).await?;
        let summary = summarize(&extracted.coordinates);

        info!(
            xml = %xml.path.display(),
            points = extracted.coordinates.len(),
            "Pipeline finished"
        );

        Ok(PipelineReport {
            xml_path: xml.path,
            provenance: xml.provenance,
            attempts: xml.attempts,
            coordinates: extracted.coordinates,
            skipped: extracted.skipped,
            duplicates: extracted.duplicates,
            summary,
        })
    }
}
