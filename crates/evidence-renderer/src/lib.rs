//! # Evidence Renderer
//!
//! Turns the exchanges captured during a scenario into one document per
//! configured format.
//!
//! ## Formats
//! - PDF: a title, a coloured status line and one key/value table per request
//! - DOCX: a template whose `{{placeholder}}` paragraphs are rewritten
//!
//! Bodies are pretty-printed and then masked before they reach any document.
//! Rendering is best-effort: failures are logged and the artifact is skipped.

pub mod colors;
pub mod docx;
pub mod format;
pub mod naming;
pub mod pdf;
pub mod renderer;
pub mod report;
pub mod template;

pub use scribe_core::mask;

pub use docx::DocxRenderer;
pub use pdf::PdfRenderer;
pub use renderer::{ArtifactRenderer, EvidenceFormat, EvidenceRenderer, RenderedArtifact};
pub use report::{EvidenceReport, ExchangeView};
pub use template::write_default_template;
