//! Assertions over redacted outputs.
//!
//! PDFs are read back with `pdf-extract` and `lopdf`, DOCX packages with
//! `zip`, so outputs are checked without going through the library.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Text of a PDF as seen by `pdf-extract`.
pub fn pdf_text(pdf_path: &Path) -> String {
    pdf_extract::extract_text(pdf_path)
        .unwrap_or_else(|e| panic!("Failed to extract text from PDF '{}': {}", pdf_path.display(), e))
}

/// Asserts that none of `patterns` can be found in the PDF text.
pub fn assert_pdf_redacted(pdf_path: &Path, patterns: &[&str]) {
    let text = pdf_text(pdf_path);
    let found: Vec<&str> = patterns.iter().copied().filter(|p| text.contains(p)).collect();
    assert!(
        found.is_empty(),
        "The following patterns should be redacted but were found in '{}': {:?}",
        pdf_path.display(),
        found
    );
}

/// Asserts that every one of `patterns` survived in the PDF text.
pub fn assert_pdf_preserved(pdf_path: &Path, patterns: &[&str]) {
    let text = pdf_text(pdf_path);
    for pattern in patterns {
        assert!(
            text.contains(pattern),
            "Pattern '{}' should be preserved but was not found in PDF at '{}'",
            pattern,
            pdf_path.display()
        );
    }
}

/// Asserts that a PDF is structurally valid and has `pages` pages.
pub fn assert_valid_pdf(pdf_path: &Path, pages: usize) {
    let doc = lopdf::Document::load(pdf_path)
        .unwrap_or_else(|e| panic!("PDF at '{}' is not loadable: {}", pdf_path.display(), e));
    assert_eq!(doc.get_pages().len(), pages, "page count of '{}'", pdf_path.display());
}

/// Every entry of a zip package, by name.
pub fn docx_parts(docx_path: &Path) -> BTreeMap<String, Vec<u8>> {
    let file = std::fs::File::open(docx_path)
        .unwrap_or_else(|e| panic!("Failed to open '{}': {}", docx_path.display(), e));
    let mut archive = zip::ZipArchive::new(file)
        .unwrap_or_else(|e| panic!("'{}' is not a zip package: {}", docx_path.display(), e));

    let mut parts = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).unwrap();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        parts.insert(entry.name().to_string(), bytes);
    }
    parts
}

/// One part of a DOCX package as text.
pub fn docx_part(docx_path: &Path, name: &str) -> String {
    let parts = docx_parts(docx_path);
    let bytes = parts
        .get(name)
        .unwrap_or_else(|| panic!("'{}' has no part '{}'", docx_path.display(), name));
    String::from_utf8(bytes.clone()).unwrap()
}

/// Asserts that none of `patterns` occurs in any XML part of the package.
pub fn assert_docx_redacted(docx_path: &Path, patterns: &[&str]) {
    for (name, bytes) in docx_parts(docx_path) {
        let xml = String::from_utf8_lossy(&bytes);
        for pattern in patterns {
            assert!(
                !xml.contains(pattern),
                "Pattern '{}' should be redacted but was found in part '{}' of '{}'",
                pattern,
                name,
                docx_path.display()
            );
        }
    }
}
