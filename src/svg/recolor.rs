//! Region recoloring of garment SVGs.
//!
//! Each configured layer id names an element in the view's SVG. Recoloring
//! writes the layer color into the `fill` attribute of that element and of
//! every `path`, `polygon` and `circle` below it, and strips `fill`
//! declarations from their inline `style` so the attribute wins.
//!
//! The document is streamed through quick-xml and written back event by
//! event. Only the start tags of recolored elements are rebuilt; everything
//! else is copied through unchanged.

use std::collections::{HashMap, HashSet};

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{DesignerError, DesignerResult};
use crate::svg::xml::{emit, into_string, xml_error};

/// Element names that receive the layer color inside a layer group.
const SHAPE_ELEMENTS: [&str; 3] = ["path", "polygon", "circle"];

// ============================================================================
// VectorDocument
// ============================================================================

/// A well-formed SVG document held as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorDocument {
    source: String,
}

/// Outcome of a recolor pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecolorReport {
    /// Layer ids that were found and recolored.
    pub applied: Vec<String>,
    /// Layer ids with no matching element, or with no color to apply.
    pub skipped: Vec<String>,
}

impl VectorDocument {
    /// Checks that `source` is well-formed XML and wraps it.
    pub fn parse(source: impl Into<String>) -> DesignerResult<Self> {
        let source = source.into();
        parse_document(&source)?;
        Ok(Self { source })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn into_string(self) -> String {
        self.source
    }

    /// Returns true if some element carries the given `id`.
    pub fn contains_id(&self, id: &str) -> bool {
        parse_document(&self.source)
            .map(|doc| find_by_id(&doc, id).is_some())
            .unwrap_or(false)
    }

    /// Returns the `fill` attribute of the element with the given `id`.
    pub fn fill_of(&self, id: &str) -> Option<String> {
        let doc = parse_document(&self.source).ok()?;
        find_by_id(&doc, id)?.attribute("fill").map(str::to_string)
    }

    /// Applies `(layer id, paint)` pairs and returns the rewritten document.
    ///
    /// Ids absent from the document and blank paints are skipped. A shape
    /// below several layer elements takes the color of the nearest one.
    #[tracing::instrument(skip_all)]
    pub fn recolor<'a, I>(&self, colors: I) -> DesignerResult<(Self, RecolorReport)>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut order: Vec<&'a str> = Vec::new();
        let mut fills: HashMap<&'a str, &'a str> = HashMap::new();
        for (layer_id, fill) in colors {
            if !order.contains(&layer_id) {
                order.push(layer_id);
            }
            if fill.trim().is_empty() {
                fills.remove(layer_id);
            } else {
                fills.insert(layer_id, fill);
            }
        }

        let mut reader = Reader::from_str(&self.source);
        let mut writer = Writer::new(Vec::with_capacity(self.source.len()));
        // Color each open element passes down to its shapes.
        let mut inherited: Vec<Option<&'a str>> = Vec::new();
        let mut found: HashSet<&'a str> = HashSet::new();

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(start) => {
                    let parent = inherited.last().copied().flatten();
                    let (rebuilt, layer) = restyle(&start, parent, &fills, &mut found)?;
                    inherited.push(layer.or(parent));
                    emit(&mut writer, Event::Start(rebuilt.unwrap_or(start)))?;
                }
                Event::Empty(start) => {
                    let parent = inherited.last().copied().flatten();
                    let (rebuilt, _) = restyle(&start, parent, &fills, &mut found)?;
                    emit(&mut writer, Event::Empty(rebuilt.unwrap_or(start)))?;
                }
                Event::End(end) => {
                    inherited.pop();
                    emit(&mut writer, Event::End(end))?;
                }
                Event::Eof => break,
                other => emit(&mut writer, other)?,
            }
        }

        let (applied, skipped): (Vec<&str>, Vec<&str>) =
            order.into_iter().partition(|id| found.contains(id));
        for layer_id in skipped.iter().copied() {
            tracing::debug!(layer_id, "layer not recolored");
        }
        let report = RecolorReport {
            applied: applied.into_iter().map(str::to_string).collect(),
            skipped: skipped.into_iter().map(str::to_string).collect(),
        };
        Ok((Self { source: into_string(writer)? }, report))
    }
}

/// Exported artwork often carries a DOCTYPE, so DTDs are allowed.
fn parse_document(source: &str) -> DesignerResult<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(source, options)
        .map_err(|e| DesignerError::InvalidSvg(e.to_string()))
}

fn find_by_id<'a, 'input>(doc: &'a Document<'input>, id: &str) -> Option<Node<'a, 'input>> {
    doc.descendants()
        .find(|n| n.is_element() && n.attribute("id") == Some(id))
}

// ============================================================================
// Start Tags
// ============================================================================

/// Recolors one start tag.
///
/// Returns the rebuilt tag (`None` when it stays as written) and the layer
/// color it introduces, if its `id` names a layer.
fn restyle<'a>(
    start: &BytesStart<'_>,
    inherited: Option<&'a str>,
    fills: &HashMap<&'a str, &'a str>,
    found: &mut HashSet<&'a str>,
) -> DesignerResult<(Option<BytesStart<'static>>, Option<&'a str>)> {
    let mut layer = None;
    if let Some(attr) = start.try_get_attribute("id").map_err(xml_error)? {
        let id = attr.unescape_value().map_err(xml_error)?;
        if let Some((&layer_id, &fill)) = fills.get_key_value(&*id) {
            found.insert(layer_id);
            layer = Some(fill);
        }
    }

    let is_shape = SHAPE_ELEMENTS
        .iter()
        .any(|name| name.as_bytes() == start.local_name().as_ref());
    let Some(fill) = layer.or(inherited.filter(|_| is_shape)) else {
        return Ok((None, layer));
    };

    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut rebuilt = BytesStart::new(name);
    let mut wrote_fill = false;
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        match attr.key.as_ref() {
            b"fill" => {
                rebuilt.push_attribute(("fill", fill));
                wrote_fill = true;
            }
            b"style" => {
                let style = attr.unescape_value().map_err(xml_error)?;
                if let Some(kept) = strip_fill(&style) {
                    rebuilt.push_attribute(("style", kept.as_str()));
                }
            }
            // Written back double-quoted, so an embedded quote needs escaping.
            _ if attr.value.contains(&b'"') => {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let value = attr.unescape_value().map_err(xml_error)?;
                rebuilt.push_attribute((key.as_str(), &*value));
            }
            _ => rebuilt.push_attribute(attr),
        }
    }
    if !wrote_fill {
        rebuilt.push_attribute(("fill", fill));
    }
    Ok((Some(rebuilt), layer))
}

// ============================================================================
// Style Handling
// ============================================================================

/// Removes `fill` declarations from an inline style.
///
/// Returns `None` when nothing else is left.
fn strip_fill(style: &str) -> Option<String> {
    let kept: Vec<&str> = style
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            let property = decl.split(':').next().unwrap_or("").trim();
            !property.eq_ignore_ascii_case("fill")
        })
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept.join(";"))
    }
}

// ============================================================================
// Tests
// ============================================================================
