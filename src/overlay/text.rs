//! Styled text overlays.
//!
//! Text is laid out as an SVG `<text>` element, one `<tspan>` per line,
//! and drawn with resvg using the session's [`FontBook`].

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use resvg::tiny_skia::{PixmapMut, Transform};
use serde::{Deserialize, Serialize};

use crate::color::HexColor;
use crate::error::{DesignerError, DesignerResult};
use crate::overlay::{OverlayId, OverlayKind, OverlayRecord, OverlayStore};
use crate::surface::{Drawable, ObjectHandle, Placement, Surface, SurfaceObject};
use crate::svg::FontBook;
use crate::svg::xml::{emit, into_string};

/// Font families offered by the text tools.
pub const AVAILABLE_FONTS: [&str; 15] = [
    "Arial",
    "Helvetica",
    "Times New Roman",
    "Georgia",
    "Verdana",
    "Tahoma",
    "Trebuchet MS",
    "Impact",
    "Comic Sans MS",
    "Courier New",
    "Lucida Console",
    "Palatino",
    "Garamond",
    "Bookman",
    "Avant Garde",
];

pub const MIN_FONT_SIZE: f32 = 8.0;
pub const MAX_FONT_SIZE: f32 = 200.0;
pub const MIN_LINE_HEIGHT: f32 = 0.5;
pub const MAX_LINE_HEIGHT: f32 = 3.0;

// Rough glyph metrics for layout before rasterization.
const AVG_CHAR_WIDTH: f32 = 0.6;
const BASELINE_SHIFT: f32 = 0.35;

// ============================================================================
// Style Vocabulary
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum FontWeight {
    #[default]
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "bold")]
    Bold,
    #[serde(rename = "100")]
    #[cfg_attr(feature = "clap", value(name = "100"))]
    W100,
    #[serde(rename = "200")]
    #[cfg_attr(feature = "clap", value(name = "200"))]
    W200,
    #[serde(rename = "300")]
    #[cfg_attr(feature = "clap", value(name = "300"))]
    W300,
    #[serde(rename = "400")]
    #[cfg_attr(feature = "clap", value(name = "400"))]
    W400,
    #[serde(rename = "500")]
    #[cfg_attr(feature = "clap", value(name = "500"))]
    W500,
    #[serde(rename = "600")]
    #[cfg_attr(feature = "clap", value(name = "600"))]
    W600,
    #[serde(rename = "700")]
    #[cfg_attr(feature = "clap", value(name = "700"))]
    W700,
    #[serde(rename = "800")]
    #[cfg_attr(feature = "clap", value(name = "800"))]
    W800,
    #[serde(rename = "900")]
    #[cfg_attr(feature = "clap", value(name = "900"))]
    W900,
}

impl FontWeight {
    /// The CSS `font-weight` keyword or number.
    pub fn as_css(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bold => "bold",
            Self::W100 => "100",
            Self::W200 => "200",
            Self::W300 => "300",
            Self::W400 => "400",
            Self::W500 => "500",
            Self::W600 => "600",
            Self::W700 => "700",
            Self::W800 => "800",
            Self::W900 => "900",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_css(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    fn anchor(&self) -> &'static str {
        match self {
            Self::Left | Self::Justify => "start",
            Self::Center => "middle",
            Self::Right => "end",
        }
    }
}

// ============================================================================
// TextStyle / TextProps
// ============================================================================

/// Everything about a text overlay except its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f32,
    pub fill: HexColor,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_align: TextAlign,
    pub line_height: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: AVAILABLE_FONTS[0].to_string(),
            font_size: 24.0,
            fill: HexColor::black(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_align: TextAlign::Left,
            line_height: 1.2,
        }
    }
}

impl TextStyle {
    /// Clamps size and line height into their ranges and fills in a blank
    /// font family.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        self.font_size = clamp_or(self.font_size, MIN_FONT_SIZE, MAX_FONT_SIZE, defaults.font_size);
        self.line_height = clamp_or(
            self.line_height,
            MIN_LINE_HEIGHT,
            MAX_LINE_HEIGHT,
            defaults.line_height,
        );
        if self.font_family.trim().is_empty() {
            self.font_family = defaults.font_family;
        }
        self
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Content plus style: what a text object draws.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub content: String,
    pub style: TextStyle,
}

impl TextProps {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: TextStyle::default(),
        }
    }

    pub fn with_style(content: impl Into<String>, style: TextStyle) -> Self {
        Self {
            content: content.into(),
            style,
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    /// Estimated unscaled size, used for hit testing and bounds.
    pub fn layout_size(&self) -> (f32, f32) {
        let size = self.style.font_size;
        let longest = self.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let count = self.lines().count();
        (
            (longest as f32 * size * AVG_CHAR_WIDTH).max(1.0),
            (count as f32 * size * self.style.line_height).max(1.0),
        )
    }

    /// SVG document drawing this text, sized to its layout box.
    pub fn to_svg(&self) -> DesignerResult<String> {
        let (width, height) = self.layout_size();
        let size = self.style.font_size;
        let advance = size * self.style.line_height;
        let x = match self.style.text_align {
            TextAlign::Left | TextAlign::Justify => 0.0,
            TextAlign::Center => width / 2.0,
            TextAlign::Right => width,
        };

        let mut writer = Writer::new(Vec::new());

        let mut svg = BytesStart::new("svg");
        svg.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
        svg.push_attribute(("width", width.to_string().as_str()));
        svg.push_attribute(("height", height.to_string().as_str()));
        svg.push_attribute(("viewBox", format!("0 0 {width} {height}").as_str()));
        emit(&mut writer, Event::Start(svg))?;

        let mut text = BytesStart::new("text");
        text.push_attribute(("font-family", self.style.font_family.as_str()));
        text.push_attribute(("font-size", size.to_string().as_str()));
        text.push_attribute(("font-weight", self.style.font_weight.as_css()));
        text.push_attribute(("font-style", self.style.font_style.as_css()));
        text.push_attribute(("fill", self.style.fill.as_str()));
        text.push_attribute(("text-anchor", self.style.text_align.anchor()));
        text.push_attribute(("xml:space", "preserve"));
        emit(&mut writer, Event::Start(text))?;

        for (i, line) in self.lines().enumerate() {
            let y = i as f32 * advance + advance / 2.0 + size * BASELINE_SHIFT;
            let mut tspan = BytesStart::new("tspan");
            tspan.push_attribute(("x", x.to_string().as_str()));
            tspan.push_attribute(("y", y.to_string().as_str()));
            emit(&mut writer, Event::Start(tspan))?;
            emit(&mut writer, Event::Text(BytesText::new(line)))?;
            emit(&mut writer, Event::End(BytesEnd::new("tspan")))?;
        }

        emit(&mut writer, Event::End(BytesEnd::new("text")))?;
        emit(&mut writer, Event::End(BytesEnd::new("svg")))?;
        into_string(writer)
    }
}

/// Draws text onto `canvas`, mapping its layout box through `transform`.
///
/// Glyphs outside the canvas are clipped, so long text costs no more
/// memory than the canvas itself.
pub fn draw_text(
    props: &TextProps,
    fonts: &FontBook,
    canvas: &mut PixmapMut<'_>,
    transform: Transform,
) -> DesignerResult<()> {
    let tree = fonts.parse_svg(&props.to_svg()?)?;
    resvg::render(&tree, transform, canvas);
    Ok(())
}

// ============================================================================
// TextOverlay
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub handle: ObjectHandle,
    pub props: TextProps,
}

impl OverlayRecord for TextOverlay {
    const KIND: OverlayKind = OverlayKind::Text;

    fn handle(&self) -> ObjectHandle {
        self.handle
    }
}

fn validate(props: TextProps) -> DesignerResult<TextProps> {
    if props.content.trim().is_empty() {
        return Err(DesignerError::EmptyText);
    }
    Ok(TextProps {
        content: props.content,
        style: props.style.normalized(),
    })
}

impl OverlayStore<TextOverlay> {
    /// Adds a text object centered on the surface.
    pub fn add_text(
        &mut self,
        surface: &mut Surface,
        content: &str,
        style: TextStyle,
    ) -> DesignerResult<OverlayId> {
        let props = validate(TextProps::with_style(content, style))?;
        let (cx, cy) = surface.size().center();
        let handle = surface.add(SurfaceObject::text(
            props.clone(),
            Placement::centered(cx, cy, 1.0),
        ));
        surface.select(Some(handle));

        let id = self.insert(TextOverlay { handle, props });
        tracing::debug!(%id, "text added");
        Ok(id)
    }

    /// Replaces a text overlay's content and style.
    ///
    /// This is the only way text overlays change: the record and its
    /// surface object are updated together, or neither is.
    pub fn update_text(
        &mut self,
        surface: &mut Surface,
        id: OverlayId,
        props: TextProps,
    ) -> DesignerResult<()> {
        let props = validate(props)?;
        let record = self.get_mut(id).ok_or(DesignerError::UnknownOverlay(id))?;
        let object = surface
            .get_mut(record.handle)
            .ok_or(DesignerError::UnknownOverlay(id))?;

        object.drawable = Drawable::Text(props.clone());
        record.props = props;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
