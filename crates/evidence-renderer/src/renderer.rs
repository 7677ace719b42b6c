//! Artifact production

use crate::docx::DocxRenderer;
use crate::pdf::PdfRenderer;
use crate::report::EvidenceReport;
use scribe_core::{Result, ScribeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceFormat {
    Pdf,
    Docx,
}

impl EvidenceFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            EvidenceFormat::Pdf => "application/pdf",
            EvidenceFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl fmt::Display for EvidenceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidenceFormat::Pdf => f.write_str("pdf"),
            EvidenceFormat::Docx => f.write_str("docx"),
        }
    }
}

impl FromStr for EvidenceFormat {
    type Err = ScribeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(EvidenceFormat::Pdf),
            "docx" => Ok(EvidenceFormat::Docx),
            other => Err(ScribeError::ConfigError {
                reason: format!("unknown evidence format: {other}"),
            }),
        }
    }
}

/// One document format.
pub trait ArtifactRenderer: Send + Sync {
    fn format(&self) -> EvidenceFormat;

    /// Where the document for `report` goes under `root`.
    fn output_path(&self, root: &Path, report: &EvidenceReport) -> PathBuf;

    /// Writes the document. The parent directory already exists.
    fn write(&self, report: &EvidenceReport, path: &Path) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub format: EvidenceFormat,
    pub path: PathBuf,
}

pub struct EvidenceRenderer {
    output_root: PathBuf,
    renderers: Vec<Box<dyn ArtifactRenderer>>,
}

impl EvidenceRenderer {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            renderers: Vec::new(),
        }
    }

    /// Renderer set for the given formats. DOCX documents are filled from
    /// `template`.
    pub fn for_formats(
        output_root: impl Into<PathBuf>,
        formats: &[EvidenceFormat],
        template: impl Into<PathBuf>,
        project_name: impl Into<String>,
    ) -> Self {
        let template = template.into();
        let project_name = project_name.into();
        formats.iter().fold(Self::new(output_root), |renderer, format| match format {
            EvidenceFormat::Pdf => renderer.with_renderer(PdfRenderer::new()),
            EvidenceFormat::Docx => renderer.with_renderer(DocxRenderer::new(
                template.clone(),
                project_name.clone(),
            )),
        })
    }

    pub fn with_renderer(mut self, renderer: impl ArtifactRenderer + 'static) -> Self {
        self.renderers.push(Box::new(renderer));
        self
    }

    pub fn formats(&self) -> Vec<EvidenceFormat> {
        self.renderers.iter().map(|r| r.format()).collect()
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Produces one document per renderer. A renderer that fails is logged
    /// and skipped; the others still run.
    #[instrument(skip(self, report), fields(tag = %report.meta.tag, entries = report.entries.len()))]
    pub fn render(&self, report: &EvidenceReport) -> Vec<RenderedArtifact> {
        self.renderers
            .iter()
            .filter_map(|renderer| {
                let path = renderer.output_path(&self.output_root, report);
                match Self::produce(renderer.as_ref(), report, &path) {
                    Ok(()) => {
                        info!(format = %renderer.format(), path = %path.display(), "Evidence written");
                        Some(RenderedArtifact {
                            format: renderer.format(),
                            path,
                        })
                    }
                    Err(err) => {
                        error!(
                            format = %renderer.format(),
                            path = %path.display(),
                            error = %err,
                            "Evidence skipped"
                        );
                        None
                    }
                }
            })
            .collect()
    }

    fn produce(renderer: &dyn ArtifactRenderer, report: &EvidenceReport, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        renderer.write(report, path).inspect_err(|_| {
            let _ = fs::remove_file(path);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("PDF".parse::<EvidenceFormat>().unwrap(), EvidenceFormat::Pdf);
        assert_eq!(" docx ".parse::<EvidenceFormat>().unwrap(), EvidenceFormat::Docx);
        assert!("html".parse::<EvidenceFormat>().is_err());
    }
}
