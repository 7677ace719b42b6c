//! DOCX evidence from a template
//!
//! A `.docx` is a zip package; only `word/document.xml` is rewritten. Each
//! paragraph whose text contains a known `{{placeholder}}` is rebuilt: the
//! paragraph properties are kept, the font family and size of its first run
//! are sampled, and new runs carry the substituted text. Placeholders split
//! across several runs are handled because matching happens on the joined
//! paragraph text.

use crate::colors;
use crate::format::expand_tabs;
use crate::naming;
use crate::renderer::{ArtifactRenderer, EvidenceFormat};
use crate::report::{EvidenceReport, ExchangeView};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scribe_core::{Result, ScribeError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const DOCUMENT_PART: &str = "word/document.xml";

const DEFAULT_FONT: &str = "Arial";
/// Half-points, i.e. 10pt.
const DEFAULT_SIZE: u32 = 20;
const LOG_FONT: &str = "Courier New";

static PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(<w:p(?:\s[^>/]*)?>)(.*?)</w:p>").expect("valid regex"));
static TEXT_NODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").expect("valid regex"));
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid regex"));
static PARAGRAPH_PROPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:pPr>.*?</w:pPr>").expect("valid regex"));
static JUSTIFICATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"<w:jc\s[^>]*/>").expect("valid regex"));
static FONT_FAMILY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<w:rFonts\s[^>]*w:ascii="([^"]+)""#).expect("valid regex"));
static FONT_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<w:sz\s+w:val="(\d+)""#).expect("valid regex"));

/// A piece of formatted text. Newlines become line breaks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub underline: bool,
    pub color: Option<&'static str>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Self::default()
        }
    }

    pub fn colored(mut self, color: Option<&'static str>) -> Self {
        self.color = color;
        self
    }
}

/// What a placeholder turns into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replacement {
    pub spans: Vec<Span>,
    /// Paragraph alignment, e.g. `right`.
    pub align: Option<&'static str>,
    /// Font size in points for the whole paragraph.
    pub size: Option<u32>,
}

impl Replacement {
    pub fn text(text: impl Into<String>) -> Self {
        Self::spans(vec![Span::plain(text)])
    }

    pub fn spans(spans: Vec<Span>) -> Self {
        Self {
            spans,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocxRenderer {
    template: PathBuf,
    project_name: String,
}

impl DocxRenderer {
    pub fn new(template: impl Into<PathBuf>, project_name: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            project_name: project_name.into(),
        }
    }

    pub fn template(&self) -> &Path {
        &self.template
    }

    /// Placeholder values for `report`. The last captured exchange fills
    /// the request and response placeholders.
    pub fn replacements(&self, report: &EvidenceReport) -> HashMap<&'static str, Replacement> {
        let meta = &report.meta;
        let exchange = report.exchanges().pop().unwrap_or_default();
        let status_text = if report.entries.is_empty() {
            "-".to_string()
        } else {
            exchange.status.to_string()
        };

        let (outcome_color, status_code) = if report.passed() {
            (
                colors::PASSED,
                Span::bold(status_text).colored(colors::status_color(exchange.status)),
            )
        } else {
            (
                colors::FAILED,
                Span::bold(format!("Validation failed. Actual status: {status_text}"))
                    .colored(Some(colors::FAILED)),
            )
        };

        let mut values = HashMap::new();
        values.insert("projeto", Replacement::text(self.project_name.clone()));
        values.insert(
            "data",
            Replacement::spans(vec![
                Span::bold("Data: "),
                Span::plain(report.generated_at.format("%d/%m/%Y").to_string()),
            ]),
        );
        values.insert("feature", Replacement::text(meta.feature_name.clone()));
        values.insert("scenario", Replacement::text(report.title()));
        values.insert("inicio", Replacement::text(meta.started_at.clone()));
        values.insert(
            "fim",
            Replacement::text(meta.finished_at.clone().unwrap_or_default()),
        );
        values.insert(
            "status",
            Replacement::spans(vec![
                Span::bold("Status: "),
                Span::bold(report.outcome.label()).colored(Some(outcome_color)),
            ]),
        );
        values.insert(
            "requestMethod",
            Replacement::spans(vec![
                Span::bold(exchange.method.clone()).colored(colors::method_color(&exchange.method))
            ]),
        );
        values.insert("requestUri", Replacement::text(exchange.uri.clone()));
        values.insert("headers", Replacement::text(expand_tabs(&exchange.headers)));
        values.insert(
            "requestBody",
            Replacement::text(expand_tabs(&exchange.request_body)),
        );
        values.insert("statusCode", Replacement::spans(vec![status_code]));
        values.insert(
            "responseBody",
            Replacement::text(expand_tabs(&exchange.response_body)),
        );
        values.insert(
            "idExecucao",
            Replacement {
                spans: vec![Span::plain(format!("ID Execucao: {}", meta.feature_id))],
                align: Some("right"),
                size: Some(6),
            },
        );
        values
    }
}

impl ArtifactRenderer for DocxRenderer {
    fn format(&self) -> EvidenceFormat {
        EvidenceFormat::Docx
    }

    fn output_path(&self, root: &Path, report: &EvidenceReport) -> PathBuf {
        naming::docx_path(root, &report.meta, report.generated_at)
    }

    fn write(&self, report: &EvidenceReport, path: &Path) -> Result<()> {
        let mut parts = read_package(&self.template)?;
        let document = parts
            .iter_mut()
            .find(|(name, _)| name == DOCUMENT_PART)
            .ok_or_else(|| ScribeError::RenderError {
                reason: format!("{} has no {DOCUMENT_PART}", self.template.display()),
            })?;

        let xml = String::from_utf8(std::mem::take(&mut document.1)).map_err(|e| {
            ScribeError::RenderError {
                reason: format!("{DOCUMENT_PART} is not UTF-8: {e}"),
            }
        })?;

        let mut filled = fill_placeholders(&xml, &self.replacements(report));

        let mut appendix = String::new();
        let exchanges = report.exchanges();
        if exchanges.len() > 1 {
            appendix.push_str(&history_section(&exchanges));
        }
        if let Some(log) = report.failure_log() {
            appendix.push_str(&failure_log_section(&log));
        }
        if !appendix.is_empty() {
            filled = append_to_body(&filled, &appendix)?;
        }

        document.1 = filled.into_bytes();
        debug!(template = %self.template.display(), "Template filled");
        write_package(path, &parts)
    }
}

/// Substitutes every known placeholder in every paragraph, including the
/// paragraphs inside table cells.
pub fn fill_placeholders(xml: &str, values: &HashMap<&'static str, Replacement>) -> String {
    PARAGRAPH
        .replace_all(xml, |caps: &Captures| {
            fill_paragraph(&caps[1], &caps[2], values).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn fill_paragraph(
    open_tag: &str,
    inner: &str,
    values: &HashMap<&'static str, Replacement>,
) -> Option<String> {
    let text: String = TEXT_NODE
        .captures_iter(inner)
        .map(|c| unescape_xml(&c[1]))
        .collect();

    let used: Vec<&Replacement> = PLACEHOLDER
        .captures_iter(&text)
        .filter_map(|c| values.get(&c[1]))
        .collect();
    if used.is_empty() {
        return None;
    }

    let props = PARAGRAPH_PROPS
        .find(inner)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let runs = PARAGRAPH_PROPS.replace(inner, "");

    let font = FONT_FAMILY
        .captures(&runs)
        .or_else(|| FONT_FAMILY.captures(&props))
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| DEFAULT_FONT.to_string());
    let size = used
        .iter()
        .find_map(|r| r.size)
        .map(|points| points * 2)
        .or_else(|| {
            FONT_SIZE
                .captures(&runs)
                .or_else(|| FONT_SIZE.captures(&props))
                .and_then(|c| c[1].parse().ok())
        })
        .unwrap_or(DEFAULT_SIZE);

    let props = match used.iter().find_map(|r| r.align) {
        Some(align) => with_alignment(&props, align),
        None => props,
    };

    let mut xml = String::from(open_tag);
    xml.push_str(&props);
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(&text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(replacement) = values.get(&caps[1]) else {
            continue;
        };
        if whole.start() > last {
            xml.push_str(&run_xml(&Span::plain(&text[last..whole.start()]), &font, size));
        }
        for span in &replacement.spans {
            xml.push_str(&run_xml(span, &font, size));
        }
        last = whole.end();
    }
    if last < text.len() {
        xml.push_str(&run_xml(&Span::plain(&text[last..]), &font, size));
    }
    xml.push_str("</w:p>");
    Some(xml)
}

fn with_alignment(props: &str, align: &str) -> String {
    let jc = format!(r#"<w:jc w:val="{align}"/>"#);
    if props.is_empty() {
        return format!("<w:pPr>{jc}</w:pPr>");
    }
    let props = JUSTIFICATION.replace_all(props, "");
    match props.find("<w:rPr>") {
        Some(pos) => format!("{}{jc}{}", &props[..pos], &props[pos..]),
        None => props.replacen("</w:pPr>", &format!("{jc}</w:pPr>"), 1),
    }
}

/// One `<w:r>` with explicit font and size. Newlines become `<w:br/>`.
pub(crate) fn run_xml(span: &Span, font: &str, half_points: u32) -> String {
    let mut props = format!(r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>"#);
    if span.bold {
        props.push_str("<w:b/>");
    }
    if let Some(color) = span.color {
        props.push_str(&format!(r#"<w:color w:val="{color}"/>"#));
    }
    props.push_str(&format!(
        r#"<w:sz w:val="{half_points}"/><w:szCs w:val="{half_points}"/>"#
    ));
    if span.underline {
        props.push_str(r#"<w:u w:val="single"/>"#);
    }

    let body = span
        .text
        .split('\n')
        .map(|line| {
            format!(
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                escape_xml(line.trim_end_matches('\r'))
            )
        })
        .collect::<Vec<_>>()
        .join("<w:br/>");

    format!("<w:r><w:rPr>{props}</w:rPr>{body}</w:r>")
}

fn paragraph_xml(spans: &[Span], font: &str, half_points: u32) -> String {
    let runs: String = spans.iter().map(|s| run_xml(s, font, half_points)).collect();
    format!("<w:p>{runs}</w:p>")
}

fn history_section(exchanges: &[ExchangeView]) -> String {
    let mut xml = paragraph_xml(&[Span::plain("")], DEFAULT_FONT, DEFAULT_SIZE);
    xml.push_str(&paragraph_xml(
        &[Span {
            text: "Request history".to_string(),
            bold: true,
            underline: true,
            color: None,
        }],
        DEFAULT_FONT,
        DEFAULT_SIZE,
    ));
    for (index, exchange) in exchanges.iter().enumerate() {
        xml.push_str(&paragraph_xml(
            &[
                Span::plain(format!("{}. ", index + 1)),
                Span::bold(exchange.method.clone()).colored(colors::method_color(&exchange.method)),
                Span::plain(format!(" {} ", exchange.uri)),
                Span::bold(exchange.status.to_string()).colored(colors::status_color(exchange.status)),
            ],
            DEFAULT_FONT,
            DEFAULT_SIZE,
        ));
    }
    xml
}

fn failure_log_section(log: &str) -> String {
    let mut xml = String::from("<w:p><w:r><w:br/></w:r></w:p>");
    xml.push_str(&paragraph_xml(
        &[Span {
            text: "Failure log:".to_string(),
            bold: true,
            underline: true,
            color: None,
        }],
        DEFAULT_FONT,
        DEFAULT_SIZE,
    ));
    xml.push_str(&paragraph_xml(&[Span::plain(log)], LOG_FONT, 16));
    xml
}

/// Inserts paragraphs at the end of the body, before the section properties.
fn append_to_body(xml: &str, paragraphs: &str) -> Result<String> {
    let position = xml
        .rfind("<w:sectPr")
        .or_else(|| xml.rfind("</w:body>"))
        .ok_or_else(|| ScribeError::RenderError {
            reason: format!("{DOCUMENT_PART} has no body"),
        })?;
    let mut out = String::with_capacity(xml.len() + paragraphs.len());
    out.push_str(&xml[..position]);
    out.push_str(paragraphs);
    out.push_str(&xml[position..]);
    Ok(out)
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn zip_error(err: zip::result::ZipError) -> ScribeError {
    ScribeError::RenderError {
        reason: format!("docx package: {err}"),
    }
}

/// Every file of a zip package, in archive order.
pub fn read_package(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(zip_error)?;
    let mut parts = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(zip_error)?;
        if entry.is_dir() {
            continue;
        }
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        parts.push((entry.name().to_string(), bytes));
    }
    Ok(parts)
}

pub(crate) fn write_package(path: &Path, parts: &[(String, Vec<u8>)]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = ZipWriter::new(file);
    for (name, bytes) in parts {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        writer.start_file(name.as_str(), options).map_err(zip_error)?;
        writer.write_all(bytes)?;
    }
    writer.finish().map_err(zip_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values() -> HashMap<&'static str, Replacement> {
        let mut values = HashMap::new();
        values.insert("feature", Replacement::text("Users & Roles"));
        values.insert(
            "idExecucao",
            Replacement {
                spans: vec![Span::plain("ID Execucao: 42")],
                align: Some("right"),
                size: Some(6),
            },
        );
        values
    }

    #[test]
    fn test_split_runs_and_sampled_font() {
        let xml = concat!(
            r#"<w:body><w:p w:rsidR="1"><w:pPr><w:jc w:val="left"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:rFonts w:ascii="Calibri"/><w:sz w:val="24"/></w:rPr><w:t>Feature: {{fea</w:t></w:r>"#,
            r#"<w:r><w:t>ture}}!</w:t></w:r></w:p></w:body>"#
        );
        let filled = fill_placeholders(xml, &values());

        assert!(!filled.contains("{{"));
        assert!(filled.contains(r#"<w:p w:rsidR="1"><w:pPr><w:jc w:val="left"/></w:pPr>"#));
        assert!(filled.contains("Users &amp; Roles"));
        assert!(filled.contains(r#"<w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/>"#));
        assert!(filled.contains(r#"<w:sz w:val="24"/>"#));
        assert!(filled.contains(">Feature: </w:t>"));
        assert!(filled.contains(">!</w:t>"));
    }

    #[test]
    fn test_alignment_and_size_override() {
        let xml = r#"<w:p><w:r><w:t>{{idExecucao}}</w:t></w:r></w:p>"#;
        let filled = fill_placeholders(xml, &values());
        assert!(filled.starts_with(r#"<w:p><w:pPr><w:jc w:val="right"/></w:pPr>"#));
        assert!(filled.contains(r#"<w:sz w:val="12"/>"#));
        assert!(filled.contains(r#"<w:rFonts w:ascii="Arial""#));
    }

    #[test]
    fn test_unknown_placeholders_and_plain_paragraphs_untouched() {
        let xml = r#"<w:p><w:r><w:t>{{other}} text</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>plain</w:t></w:r></w:p>"#;
        assert_eq!(fill_placeholders(xml, &values()), xml);
    }

    #[test]
    fn test_multiline_run() {
        let run = run_xml(&Span::plain("a\n<b>"), "Arial", 20);
        assert!(run.contains(r#"<w:t xml:space="preserve">a</w:t><w:br/><w:t xml:space="preserve">&lt;b&gt;</w:t>"#));
    }

    #[test]
    fn test_append_before_section_properties() {
        let xml = "<w:body><w:p/><w:sectPr/></w:body>";
        let out = append_to_body(xml, "<X/>").unwrap();
        assert_eq!(out, "<w:body><w:p/><X/><w:sectPr/></w:body>");
        assert!(append_to_body("<nothing/>", "<X/>").is_err());
    }
}
