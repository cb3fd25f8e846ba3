//! DOCX redaction.
//!
//! Paragraphs are visited in a fixed order: body paragraphs, then every table
//! cell (nested tables included), then block-level content controls, then the
//! headers and footers referenced by each section. A paragraph with matches is
//! collapsed into a single run holding its masked text. Parts without a
//! rewritten paragraph are left exactly as they were.
//!
//! Text boxes (`w:txbxContent` inside drawings) and footnotes are not
//! visited; their text passes through unredacted.

pub mod package;
pub mod paragraph;
pub mod xml;

pub use package::DocxPackage;
pub use paragraph::RunFormat;

use super::strategy::{RedactionStats, RedactionStrategy, UnitKind};
use super::write_atomically;
use crate::domain::{PatternCatalog, BLOCK_GLYPH};
use crate::error::{RedactorError, RedactorResult};
use paragraph::{paragraph_text, rewrite_paragraph};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};
use xml::Element;

const BODY: &str = "w:body";
const PARAGRAPH: &str = "w:p";
const TABLE: &str = "w:tbl";
const CONTENT_CONTROL: &str = "w:sdt";
const CONTENT_CONTROL_BODY: &str = "w:sdtContent";
const SECTION_PROPERTIES: &str = "w:sectPr";

/// Header/footer reference variants, in processing order.
const REFERENCE_TYPES: [&str; 3] = ["default", "first", "even"];

/// Redaction applier for Word documents.
#[derive(Debug, Clone)]
pub struct DocxRedactionApplier {
    mask_char: char,
    preserve_run_properties: bool,
}

impl DocxRedactionApplier {
    pub fn new() -> Self {
        Self {
            mask_char: BLOCK_GLYPH,
            preserve_run_properties: true,
        }
    }

    /// Sets the character that replaces every redacted character.
    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    /// With `false`, a rewritten run keeps only the font name, size, bold and
    /// italic of the paragraph's first run.
    pub fn with_preserve_run_properties(mut self, preserve: bool) -> Self {
        self.preserve_run_properties = preserve;
        self
    }

    pub fn mask_char(&self) -> char {
        self.mask_char
    }

    /// Redacts every paragraph of `package` and stages rewritten parts.
    pub fn redact_package(
        &self,
        package: &mut DocxPackage,
        catalog: &PatternCatalog,
    ) -> RedactorResult<RedactionStats> {
        let mut stats = RedactionStats::new(UnitKind::Paragraph);

        for part in text_parts(package)? {
            let mut doc = package.read_xml(&part)?;
            let before = stats.units_modified;

            for_each_paragraph(&mut doc.root, &mut |p| {
                self.redact_paragraph(p, catalog, &mut stats);
            });

            let rewritten = stats.units_modified - before;
            if rewritten > 0 {
                let bytes = doc.to_bytes().map_err(|e| RedactorError::docx(&part, e))?;
                package.replace_part(&part, bytes);
            }
            debug!(part = %part, paragraphs = rewritten, "part processed");
        }

        Ok(stats)
    }

    fn redact_paragraph(&self, paragraph: &mut Element, catalog: &PatternCatalog, stats: &mut RedactionStats) {
        stats.units_processed += 1;

        let text = paragraph_text(paragraph);
        if text.is_empty() {
            return;
        }
        let matches = catalog.find(&text);
        if matches.is_empty() {
            return;
        }

        let masked = matches.mask(&text, self.mask_char);
        rewrite_paragraph(paragraph, &masked, self.preserve_run_properties);
        for m in &matches {
            stats.record(&m.category);
        }
        stats.units_modified += 1;
    }
}

impl Default for DocxRedactionApplier {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole-document text: every visited paragraph, joined by `\n`.
pub fn package_text(package: &mut DocxPackage) -> RedactorResult<String> {
    let mut paragraphs = Vec::new();
    for part in text_parts(package)? {
        let mut doc = package.read_xml(&part)?;
        for_each_paragraph(&mut doc.root, &mut |p| paragraphs.push(paragraph_text(p)));
    }
    Ok(paragraphs.join("\n"))
}

/// The main document part followed by each referenced header and footer
/// part, each listed once.
fn text_parts(package: &mut DocxPackage) -> RedactorResult<Vec<String>> {
    let main = package.main_part()?;
    let doc = package.read_xml(&main)?;
    let rels = package.relationships(&main)?;

    let mut parts = vec![main];
    let mut seen: HashSet<String> = parts.iter().cloned().collect();
    for target in header_footer_targets(&doc.root, &rels) {
        if seen.insert(target.clone()) && package.has_part(&target) {
            parts.push(target);
        }
    }
    Ok(parts)
}

fn header_footer_targets(document: &Element, rels: &HashMap<String, String>) -> Vec<String> {
    let mut sections = Vec::new();
    document.descendants(SECTION_PROPERTIES, &mut sections);

    let mut targets = Vec::new();
    for section in sections {
        for reference in ["w:headerReference", "w:footerReference"] {
            for kind in REFERENCE_TYPES {
                let target = section
                    .elements()
                    .filter(|e| e.is(reference))
                    .find(|e| e.attr("w:type").as_deref().unwrap_or("default") == kind)
                    .and_then(|e| e.attr("r:id"))
                    .and_then(|id| rels.get(&id));
                targets.extend(target.cloned());
            }
        }
    }
    targets
}

/// Visits the paragraphs of a part root in processing order. For the main
/// document this is the body; headers and footers are their own container.
fn for_each_paragraph<F: FnMut(&mut Element)>(root: &mut Element, visit: &mut F) {
    if root.child(BODY).is_some() {
        if let Some(body) = root.child_mut(BODY) {
            visit_container(body, visit);
        }
    } else {
        visit_container(root, visit);
    }
}

/// Direct paragraphs first, then the paragraphs of each table, then those of
/// each block-level content control.
fn visit_container<F: FnMut(&mut Element)>(container: &mut Element, visit: &mut F) {
    for p in container.elements_mut().filter(|e| e.is(PARAGRAPH)) {
        visit(p);
    }
    for table in container.elements_mut().filter(|e| e.is(TABLE)) {
        visit_table(table, visit);
    }
    for sdt in container.elements_mut().filter(|e| e.is(CONTENT_CONTROL)) {
        if let Some(content) = sdt.child_mut(CONTENT_CONTROL_BODY) {
            visit_container(content, visit);
        }
    }
}

fn visit_table<F: FnMut(&mut Element)>(table: &mut Element, visit: &mut F) {
    for row in table.elements_mut().filter(|e| e.is("w:tr")) {
        for cell in row.elements_mut().filter(|e| e.is("w:tc")) {
            visit_container(cell, visit);
        }
    }
}

impl RedactionStrategy for DocxRedactionApplier {
    fn redact(
        &self,
        input: &Path,
        output: &Path,
        catalog: &PatternCatalog,
    ) -> RedactorResult<RedactionStats> {
        let mut package = DocxPackage::open(input)?;
        let stats = self.redact_package(&mut package, catalog)?;

        write_atomically(output, |path| package.save(path))?;

        info!(
            paragraphs = stats.units_processed,
            modified = stats.units_modified,
            redactions = stats.redactions,
            output = %output.display(),
            "DOCX redacted"
        );
        Ok(stats)
    }

    fn extract_text(&self, input: &Path) -> RedactorResult<String> {
        package_text(&mut DocxPackage::open(input)?)
    }

    fn name(&self) -> &str {
        "DocxRedaction"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

    fn para(text: &str) -> String {
        format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, text)
    }

    fn document(body: &str) -> String {
        format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {W}><w:body>{body}</w:body></w:document>"#)
    }

    fn write_docx(dir: &TempDir, parts: &[(&str, String)]) -> std::path::PathBuf {
        let path = dir.path().join("test.docx");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        for (name, body) in parts {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    fn catalog(keys: &[&str], terms: &[&str]) -> PatternCatalog {
        PatternCatalog::builder()
            .select(keys.iter().copied())
            .custom_terms(terms.iter().copied())
            .build()
            .unwrap()
    }

    fn with_headers(body: &str) -> Vec<(&'static str, String)> {
        vec![
            ("word/document.xml", document(body)),
            (
                "word/_rels/document.xml.rels",
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/></Relationships>"#.to_string(),
            ),
            ("word/header1.xml", format!("<w:hdr {W}>{}</w:hdr>", para("Header 555-123-4567"))),
            ("word/footer1.xml", format!("<w:ftr {W}>{}</w:ftr>", para("Footer only"))),
        ]
    }

    #[test]
    fn test_visit_order() {
        let body = format!(
            "{}<w:tbl><w:tr><w:tc>{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl></w:tc><w:tc>{}</w:tc></w:tr></w:tbl>{}<w:sectPr/>",
            para("one"),
            para("cell a"),
            para("nested"),
            para("cell b"),
            para("two"),
        );
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, &[("word/document.xml", document(&body))]);
        let text = package_text(&mut DocxPackage::open(&path).unwrap()).unwrap();
        assert_eq!(text, "one\ntwo\ncell a\nnested\ncell b");
    }

    #[test]
    fn test_block_content_controls_visited() {
        let body = format!(
            "<w:sdt><w:sdtPr/><w:sdtContent>{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl></w:sdtContent></w:sdt>{}<w:sectPr/>",
            para("ssn 123-45-6789"),
            para("cell a@b.io"),
            para("plain"),
        );
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, &[("word/document.xml", document(&body))]);

        let mut package = DocxPackage::open(&path).unwrap();
        assert_eq!(
            package_text(&mut package).unwrap(),
            "plain\nssn 123-45-6789\ncell a@b.io"
        );

        let stats = DocxRedactionApplier::new()
            .redact_package(&mut package, &catalog(&["ssn", "email"], &[]))
            .unwrap();
        assert_eq!(stats.units_processed, 3);
        assert_eq!(stats.redactions, 2);
        let document = String::from_utf8(package.read_part("word/document.xml").unwrap()).unwrap();
        assert!(document.contains("<w:sdtContent>"));
        assert!(!document.contains("123-45-6789"));
        assert!(!document.contains("a@b.io"));
    }

    #[test]
    fn test_redacts_body_and_counts() {
        let body = format!(
            "{}{}",
            para("Contact John Doe at john@x.com or 555-123-4567."),
            para("Nothing here")
        );
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, &[("word/document.xml", document(&body))]);

        let mut package = DocxPackage::open(&path).unwrap();
        let stats = DocxRedactionApplier::new()
            .redact_package(&mut package, &catalog(&["email", "phone"], &["John Doe"]))
            .unwrap();

        assert_eq!(stats.unit, UnitKind::Paragraph);
        assert_eq!(stats.units_processed, 2);
        assert_eq!(stats.units_modified, 1);
        assert_eq!(stats.redactions, 3);
        assert_eq!(stats.categories.values().sum::<usize>(), 3);

        let text = package_text(&mut package).unwrap();
        assert_eq!(
            text,
            "Contact ████████ at ██████████ or ████████████.\nNothing here"
        );
    }

    #[test]
    fn test_headers_and_footers() {
        let body = format!(
            r#"{}<w:sectPr><w:headerReference w:type="default" r:id="rId1"/><w:footerReference w:type="default" r:id="rId2"/><w:headerReference w:type="first" r:id="rId1"/></w:sectPr>"#,
            para("Body")
        );
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, &with_headers(&body));

        let mut package = DocxPackage::open(&path).unwrap();
        let stats = DocxRedactionApplier::new()
            .redact_package(&mut package, &catalog(&["phone"], &[]))
            .unwrap();

        // Shared header part counted once.
        assert_eq!(stats.units_processed, 3);
        assert_eq!(stats.redactions, 1);
        let header = String::from_utf8(package.read_part("word/header1.xml").unwrap()).unwrap();
        assert!(header.contains("Header ████████████"));
        assert!(!header.contains("555"));
    }

    #[test]
    fn test_unreferenced_header_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, &with_headers(&format!("{}<w:sectPr/>", para("Body"))));
        let text = package_text(&mut DocxPackage::open(&path).unwrap()).unwrap();
        assert_eq!(text, "Body");
    }

    #[test]
    fn test_no_match_leaves_package_untouched() {
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, &[("word/document.xml", document(&para("Public text")))]);
        let mut package = DocxPackage::open(&path).unwrap();
        let stats = DocxRedactionApplier::new()
            .redact_package(&mut package, &PatternCatalog::defaults())
            .unwrap();
        assert_eq!(stats.units_processed, 1);
        assert!(!stats.has_redactions());
        assert!(!package.is_modified());
    }

    #[test]
    fn test_custom_mask_char() {
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, &[("word/document.xml", document(&para("id 123-45-6789")))]);
        let mut package = DocxPackage::open(&path).unwrap();
        DocxRedactionApplier::new()
            .with_mask_char('X')
            .redact_package(&mut package, &catalog(&["ssn"], &[]))
            .unwrap();
        assert_eq!(package_text(&mut package).unwrap(), "id XXXXXXXXXXX");
    }

    #[test]
    fn test_redact_writes_output() {
        let dir = TempDir::new().unwrap();
        let input = write_docx(&dir, &[("word/document.xml", document(&para("mail a@b.io")))]);
        let output = dir.path().join("out.docx");

        let applier = DocxRedactionApplier::new();
        assert_eq!(applier.mask_char(), BLOCK_GLYPH);
        let stats = applier
            .redact(&input, &output, &catalog(&["email"], &[]))
            .unwrap();
        assert_eq!(stats.redactions, 1);
        assert_eq!(applier.extract_text(&output).unwrap(), "mail ██████");
        assert_eq!(applier.extract_text(&input).unwrap(), "mail a@b.io");
    }
}
