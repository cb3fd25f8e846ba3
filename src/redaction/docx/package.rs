//! The OPC zip package behind a `.docx` file.
//!
//! Parts are read on demand. Replaced parts are written back deflated; every
//! other entry is copied raw, compressed bytes and all, so untouched parts
//! come out byte-identical.

use super::xml::XmlDocument;
use crate::error::{RedactorError, RedactorResult};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const PACKAGE_RELS: &str = "_rels/.rels";
const DEFAULT_MAIN_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

pub struct DocxPackage {
    archive: ZipArchive<BufReader<File>>,
    replaced: BTreeMap<String, Vec<u8>>,
}

impl DocxPackage {
    pub fn open(path: &Path) -> RedactorResult<Self> {
        let file = File::open(path).map_err(|e| RedactorError::io(path, e))?;
        let archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| RedactorError::docx(path.display().to_string(), e))?;
        Ok(Self {
            archive,
            replaced: BTreeMap::new(),
        })
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.replaced.contains_key(name) || self.archive.index_for_name(name).is_some()
    }

    /// Current content of part `name`, replacements included.
    pub fn read_part(&mut self, name: &str) -> RedactorResult<Vec<u8>> {
        if let Some(bytes) = self.replaced.get(name) {
            return Ok(bytes.clone());
        }
        let mut entry = self
            .archive
            .by_name(name)
            .map_err(|e| RedactorError::docx(name, e))?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| RedactorError::docx(name, e))?;
        Ok(bytes)
    }

    pub fn read_xml(&mut self, name: &str) -> RedactorResult<XmlDocument> {
        let bytes = self.read_part(name)?;
        XmlDocument::parse(&bytes).map_err(|e| RedactorError::docx(name, e))
    }

    pub fn replace_part(&mut self, name: &str, bytes: Vec<u8>) {
        self.replaced.insert(name.to_string(), bytes);
    }

    pub fn is_modified(&self) -> bool {
        !self.replaced.is_empty()
    }

    /// Name of the main document part, from the package relationships.
    pub fn main_part(&mut self) -> RedactorResult<String> {
        if self.has_part(PACKAGE_RELS) {
            let rels = self.relationships_from(PACKAGE_RELS, "")?;
            if let Some(rel) = rels.iter().find(|r| r.kind.ends_with(OFFICE_DOCUMENT_REL)) {
                return Ok(rel.target.clone());
            }
        }
        if self.has_part(DEFAULT_MAIN_PART) {
            Ok(DEFAULT_MAIN_PART.to_string())
        } else {
            Err(RedactorError::docx(
                PACKAGE_RELS,
                "package has no main document part",
            ))
        }
    }

    /// Relationships of `part`, keyed by id, with targets resolved to part
    /// names. A part without a relationships part has none.
    pub fn relationships(&mut self, part: &str) -> RedactorResult<HashMap<String, String>> {
        let (dir, file) = match part.rsplit_once('/') {
            Some((dir, file)) => (dir, file),
            None => ("", part),
        };
        let rels_part = if dir.is_empty() {
            format!("_rels/{}.rels", file)
        } else {
            format!("{}/_rels/{}.rels", dir, file)
        };
        if !self.has_part(&rels_part) {
            return Ok(HashMap::new());
        }
        Ok(self
            .relationships_from(&rels_part, dir)?
            .into_iter()
            .map(|rel| (rel.id, rel.target))
            .collect())
    }

    fn relationships_from(&mut self, rels_part: &str, base: &str) -> RedactorResult<Vec<Relationship>> {
        let doc = self.read_xml(rels_part)?;
        Ok(doc
            .root
            .elements()
            .filter(|e| e.is("Relationship"))
            .filter(|e| e.attr("TargetMode").as_deref() != Some("External"))
            .filter_map(|e| {
                Some(Relationship {
                    id: e.attr("Id")?,
                    kind: e.attr("Type")?,
                    target: resolve_target(base, &e.attr("Target")?),
                })
            })
            .collect())
    }

    /// Writes the package to `path`.
    pub fn save(&mut self, path: &Path) -> RedactorResult<()> {
        let file = File::create(path).map_err(|e| RedactorError::io(path, e))?;
        let mut writer = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for index in 0..self.archive.len() {
            let entry = self.archive.by_index_raw(index)?;
            match self.replaced.get(entry.name()) {
                Some(bytes) => {
                    let name = entry.name().to_string();
                    drop(entry);
                    writer.start_file(name.as_str(), options)?;
                    writer
                        .write_all(bytes)
                        .map_err(|e| RedactorError::io(path, e))?;
                }
                None => writer.raw_copy_file(entry)?,
            }
        }

        let mut inner = writer.finish()?;
        inner.flush().map_err(|e| RedactorError::io(path, e))?;
        Ok(())
    }
}

#[derive(Debug)]
struct Relationship {
    id: String,
    kind: String,
    target: String,
}

/// Resolves a relationship target against the directory of its source part.
fn resolve_target(base: &str, target: &str) -> String {
    let mut segments: Vec<&str> = match target.strip_prefix('/') {
        Some(_) => Vec::new(),
        None => base.split('/').filter(|s| !s.is_empty()).collect(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}
