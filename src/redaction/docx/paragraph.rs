//! WordprocessingML paragraphs: plain text, run formatting, and rewriting.
//!
//! Elements are matched by their `w:` qualified names, the prefix Word and
//! every mainstream producer bind to the WordprocessingML namespace.

use super::xml::{Element, Node};

const PARAGRAPH_PROPERTIES: &str = "w:pPr";
const RUN: &str = "w:r";
const RUN_PROPERTIES: &str = "w:rPr";

/// Paragraph children whose runs contribute to the paragraph text.
const RUN_CONTAINERS: &[&str] = &[
    "w:hyperlink",
    "w:smartTag",
    "w:ins",
    "w:moveTo",
    "w:sdt",
    "w:sdtContent",
    "w:fldSimple",
    "w:customXml",
    "w:dir",
    "w:bdo",
];

/// Tracked-removal wrappers: not part of the text, dropped on rewrite.
const REMOVED_CONTENT: &[&str] = &["w:del", "w:moveFrom"];

/// Plain text of a paragraph: every run's text in document order.
pub fn paragraph_text(paragraph: &Element) -> String {
    let mut text = String::new();
    for run in runs(paragraph) {
        push_run_text(run, &mut text);
    }
    text
}

/// Runs of a paragraph in document order, including runs nested in
/// hyperlinks, content controls and other run containers.
pub fn runs(paragraph: &Element) -> Vec<&Element> {
    let mut out = Vec::new();
    collect_runs(paragraph, &mut out);
    out
}

fn collect_runs<'a>(parent: &'a Element, out: &mut Vec<&'a Element>) {
    for child in parent.elements() {
        if child.is(RUN) {
            out.push(child);
        } else if RUN_CONTAINERS.iter().any(|name| child.is(name)) {
            collect_runs(child, out);
        }
    }
}

fn push_run_text(run: &Element, text: &mut String) {
    for child in run.elements() {
        match child.name().as_str() {
            "w:t" => text.push_str(&child.text()),
            "w:tab" | "w:ptab" => text.push('\t'),
            "w:cr" => text.push('\n'),
            "w:br" => match child.attr("w:type").as_deref() {
                None | Some("textWrapping") => text.push('\n'),
                _ => {}
            },
            "w:noBreakHyphen" => text.push('-'),
            _ => {}
        }
    }
}

/// The basic font attributes of a run. `None` means inherited from the
/// paragraph or document style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFormat {
    pub font_name: Option<String>,
    /// Font size in half-points (`w:sz`)
    pub size_half_points: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
}

impl RunFormat {
    pub fn from_run(run: &Element) -> Self {
        let Some(props) = run.child(RUN_PROPERTIES) else {
            return Self::default();
        };
        Self {
            font_name: props.child("w:rFonts").and_then(|f| f.attr("w:ascii")),
            size_half_points: props
                .child("w:sz")
                .and_then(|s| s.attr("w:val"))
                .and_then(|v| v.parse().ok()),
            bold: props.child("w:b").map(toggle_value),
            italic: props.child("w:i").map(toggle_value),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// A `w:rPr` carrying exactly these attributes, or `None` when all are
    /// inherited.
    pub fn to_properties(&self) -> Option<Element> {
        if self.is_empty() {
            return None;
        }
        let mut props = Element::new(RUN_PROPERTIES);
        if let Some(font) = &self.font_name {
            props = props.with_child(
                Element::new("w:rFonts")
                    .with_attribute("w:ascii", font)
                    .with_attribute("w:hAnsi", font),
            );
        }
        if let Some(bold) = self.bold {
            props = props.with_child(toggle_element("w:b", bold));
        }
        if let Some(italic) = self.italic {
            props = props.with_child(toggle_element("w:i", italic));
        }
        if let Some(size) = self.size_half_points {
            props = props.with_child(Element::new("w:sz").with_attribute("w:val", &size.to_string()));
        }
        Some(props)
    }
}

fn toggle_value(element: &Element) -> bool {
    !matches!(
        element.attr("w:val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}

fn toggle_element(name: &str, on: bool) -> Element {
    let element = Element::new(name);
    if on {
        element
    } else {
        element.with_attribute("w:val", "0")
    }
}

/// Collapses `paragraph` into a single run carrying `text`.
///
/// Every run-bearing child is removed and the new run takes the position of
/// the first one. Paragraph properties, bookmarks and other non-run children
/// stay. The new run's properties come from the paragraph's first run: cloned
/// whole with `preserve_properties`, otherwise rebuilt from its
/// [`RunFormat`].
pub fn rewrite_paragraph(paragraph: &mut Element, text: &str, preserve_properties: bool) {
    let properties = runs(paragraph).first().and_then(|first| {
        if preserve_properties {
            first.child(RUN_PROPERTIES).cloned()
        } else {
            RunFormat::from_run(first).to_properties()
        }
    });

    let mut insert_at = None;
    let mut kept = Vec::with_capacity(paragraph.children.len());
    for node in std::mem::take(&mut paragraph.children) {
        let removable = matches!(&node, Node::Element(e) if is_run_bearing(e));
        if removable {
            insert_at.get_or_insert(kept.len());
        } else {
            kept.push(node);
        }
    }

    let position = insert_at.unwrap_or_else(|| {
        // After the paragraph properties, which must come first.
        kept.iter()
            .position(|n| !matches!(n, Node::Element(e) if e.is(PARAGRAPH_PROPERTIES)))
            .unwrap_or(kept.len())
    });
    kept.insert(position, Node::Element(build_run(text, properties)));
    paragraph.children = kept;
}

fn is_run_bearing(element: &Element) -> bool {
    element.is(RUN)
        || RUN_CONTAINERS.iter().any(|name| element.is(name))
        || REMOVED_CONTENT.iter().any(|name| element.is(name))
}

/// A run for `text`, turning tabs and line feeds into `w:tab` and `w:br`.
fn build_run(text: &str, properties: Option<Element>) -> Element {
    let mut run = Element::new(RUN);
    if let Some(props) = properties {
        run = run.with_child(props);
    }

    let mut pending = String::new();
    for c in text.chars() {
        let marker = match c {
            '\t' => "w:tab",
            '\n' => "w:br",
            _ => {
                pending.push(c);
                continue;
            }
        };
        run = flush_text(run, &mut pending);
        run = run.with_child(Element::new(marker));
    }
    flush_text(run, &mut pending)
}

fn flush_text(run: Element, pending: &mut String) -> Element {
    if pending.is_empty() {
        return run;
    }
    let text = std::mem::take(pending);
    run.with_child(
        Element::new("w:t")
            .with_attribute("xml:space", "preserve")
            .with_text(&text),
    )
}
