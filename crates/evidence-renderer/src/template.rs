//! Built-in evidence template

use crate::docx::{run_xml, write_package, Span, DOCUMENT_PART};
use scribe_core::Result;
use std::fs;
use std::path::Path;
use tracing::info;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const FONT: &str = "Arial";
const SIZE: u32 = 20;

/// Label/placeholder rows of the summary table.
const TABLE_ROWS: [(&str, &str); 11] = [
    ("Feature", "{{feature}}"),
    ("Scenario", "{{scenario}}"),
    ("Start", "{{inicio}}"),
    ("End", "{{fim}}"),
    ("Result", "{{status}}"),
    ("Request method", "{{requestMethod}}"),
    ("Request URI", "{{requestUri}}"),
    ("Headers", "{{headers}}"),
    ("Request body", "{{requestBody}}"),
    ("Status code", "{{statusCode}}"),
    ("Response body", "{{responseBody}}"),
];

fn paragraph(text: &str, bold: bool, size: u32) -> String {
    let span = Span {
        text: text.to_string(),
        bold,
        ..Span::default()
    };
    format!("<w:p>{}</w:p>", run_xml(&span, FONT, size))
}

fn cell(content: &str, bold: bool, width: u32) -> String {
    format!(
        r#"<w:tc><w:tcPr><w:tcW w:w="{width}" w:type="dxa"/></w:tcPr>{}</w:tc>"#,
        paragraph(content, bold, SIZE)
    )
}

/// `word/document.xml` with every supported placeholder.
pub fn default_document_xml() -> String {
    let border = r#"w:val="single" w:sz="4" w:space="0" w:color="808080""#;
    let rows: String = TABLE_ROWS
        .iter()
        .map(|(label, placeholder)| {
            format!(
                "<w:tr>{}{}</w:tr>",
                cell(label, true, 2400),
                cell(placeholder, false, 7200)
            )
        })
        .collect();

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
            "{title}{date}",
            r#"<w:tbl><w:tblPr><w:tblW w:w="9600" w:type="dxa"/><w:tblBorders>"#,
            r#"<w:top {b}/><w:left {b}/><w:bottom {b}/><w:right {b}/><w:insideH {b}/><w:insideV {b}/>"#,
            r#"</w:tblBorders></w:tblPr><w:tblGrid><w:gridCol w:w="2400"/><w:gridCol w:w="7200"/></w:tblGrid>"#,
            "{rows}</w:tbl>{id}",
            r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1134" w:header="709" w:footer="709" w:gutter="0"/></w:sectPr>"#,
            "</w:body></w:document>"
        ),
        title = paragraph("{{projeto}}", true, 28),
        date = paragraph("{{data}}", false, SIZE),
        b = border,
        rows = rows,
        id = paragraph("{{idExecucao}}", false, SIZE),
    )
}

/// Writes a minimal DOCX template containing every placeholder.
pub fn write_default_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let parts = vec![
        ("[Content_Types].xml".to_string(), CONTENT_TYPES.as_bytes().to_vec()),
        ("_rels/.rels".to_string(), PACKAGE_RELS.as_bytes().to_vec()),
        (DOCUMENT_PART.to_string(), default_document_xml().into_bytes()),
    ];
    write_package(path, &parts)?;
    info!(path = %path.display(), "Evidence template written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::read_package;

    #[test]
    fn test_template_contains_every_placeholder() {
        let xml = default_document_xml();
        for placeholder in [
            "{{projeto}}",
            "{{data}}",
            "{{idExecucao}}",
            "{{status}}",
            "{{statusCode}}",
            "{{responseBody}}",
        ] {
            assert!(xml.contains(placeholder), "missing {placeholder}");
        }
        assert!(xml.contains("<w:sectPr>"));
    }

    #[test]
    fn test_written_package_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources/template.docx");
        write_default_template(&path).unwrap();

        let parts = read_package(&path).unwrap();
        let names: Vec<_> = parts.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["[Content_Types].xml", "_rels/.rels", DOCUMENT_PART]);
    }
}
