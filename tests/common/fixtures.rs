//! Test fixtures: PDF and DOCX builders.

use anyhow::Result;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Builder for test PDFs: one `use_text` call per line, so each line is a
/// separate text line on the page.
#[derive(Debug, Clone)]
pub struct TestPdfBuilder {
    title: String,
    pages: Vec<Vec<String>>,
    font_size: f32,
}

impl TestPdfBuilder {
    pub fn new() -> Self {
        Self {
            title: "Test Document".to_string(),
            pages: vec![Vec::new()],
            font_size: 12.0,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Adds a line to the current page.
    pub fn with_line(mut self, line: &str) -> Self {
        if let Some(page) = self.pages.last_mut() {
            page.push(line.to_string());
        }
        self
    }

    /// Starts a new page.
    pub fn new_page(mut self) -> Self {
        self.pages.push(Vec::new());
        self
    }

    pub fn build(self, output_path: &Path) -> Result<PathBuf> {
        let (doc, first_page, first_layer) =
            PdfDocument::new(&self.title, Mm(210.0), Mm(297.0), "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

        for (index, lines) in self.pages.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) = doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
                doc.get_page(page).get_layer(layer)
            };
            for (row, line) in lines.iter().enumerate() {
                let y = 270.0 - row as f32 * 10.0;
                layer.use_text(line.as_str(), self.font_size, Mm(20.0), Mm(y), &font);
            }
        }

        doc.save(&mut BufWriter::new(fs::File::create(output_path)?))?;
        Ok(output_path.to_path_buf())
    }
}

impl Default for TestPdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub const W_NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

/// A paragraph with one plain run.
pub fn paragraph_xml(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(text)
    )
}

/// A single-row-per-slice table of plain paragraphs.
pub fn table_xml(rows: &[&[&str]]) -> String {
    let mut xml = String::from("<w:tbl>");
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in *row {
            xml.push_str("<w:tc>");
            xml.push_str(&paragraph_xml(cell));
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Builder for minimal but complete DOCX packages.
#[derive(Debug, Clone, Default)]
pub struct TestDocxBuilder {
    body: Vec<String>,
    header: Option<Vec<String>>,
    footer: Option<Vec<String>>,
}

impl TestDocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        self.body.push(paragraph_xml(text));
        self
    }

    /// Appends raw body XML (paragraphs with custom runs, tables, ...).
    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push(xml.to_string());
        self
    }

    pub fn table(mut self, rows: &[&[&str]]) -> Self {
        self.body.push(table_xml(rows));
        self
    }

    pub fn header(mut self, lines: &[&str]) -> Self {
        self.header = Some(lines.iter().map(|l| paragraph_xml(l)).collect());
        self
    }

    pub fn footer(mut self, lines: &[&str]) -> Self {
        self.footer = Some(lines.iter().map(|l| paragraph_xml(l)).collect());
        self
    }

    pub fn build(self, output_path: &Path) -> Result<PathBuf> {
        let mut rels = String::new();
        let mut overrides = String::new();
        let mut refs = String::new();

        if self.header.is_some() {
            rels.push_str(r#"<Relationship Id="rId10" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>"#);
            overrides.push_str(r#"<Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/>"#);
            refs.push_str(r#"<w:headerReference w:type="default" r:id="rId10"/>"#);
        }
        if self.footer.is_some() {
            rels.push_str(r#"<Relationship Id="rId11" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>"#);
            overrides.push_str(r#"<Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>"#);
            refs.push_str(r#"<w:footerReference w:type="default" r:id="rId11"/>"#);
        }

        let mut parts: Vec<(&str, String)> = vec![
            (
                "[Content_Types].xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>{overrides}</Types>"#
                ),
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#.to_string(),
            ),
            (
                "word/document.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {W_NS}><w:body>{}<w:sectPr>{refs}<w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body></w:document>"#,
                    self.body.concat()
                ),
            ),
            (
                "word/_rels/document.xml.rels",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
                ),
            ),
        ];
        if let Some(header) = &self.header {
            parts.push((
                "word/header1.xml",
                format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:hdr {W_NS}>{}</w:hdr>"#, header.concat()),
            ));
        }
        if let Some(footer) = &self.footer {
            parts.push((
                "word/footer1.xml",
                format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:ftr {W_NS}>{}</w:ftr>"#, footer.concat()),
            ));
        }

        let mut writer = ZipWriter::new(fs::File::create(output_path)?);
        for (name, body) in parts {
            writer.start_file(name, SimpleFileOptions::default())?;
            writer.write_all(body.as_bytes())?;
        }
        writer.finish()?;
        Ok(output_path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_xml_shape() {
        let xml = table_xml(&[&["a", "b"], &["c"]]);
        assert_eq!(xml.matches("<w:tr>").count(), 2);
        assert_eq!(xml.matches("<w:tc>").count(), 3);
    }

    #[test]
    fn test_paragraph_escapes_text() {
        assert!(paragraph_xml("A & B").contains("A &amp; B"));
    }
}
