use std::fmt;
use std::sync::Arc;
use tiny_skia::PathBuilder;
use ttf_parser::{Face, GlyphId, OutlineBuilder, name_id};

use crate::error::{RenderError, RenderResult};

/// Ink extent of a piece of text, in whole pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

/// A font that has been fixed to one pixel size.
pub trait SizedFont {
    /// Ink box of a single line measured from the line origin (pen start,
    /// ascender line). `None` when the line draws nothing.
    fn line_ink(&self, line: &str) -> Option<TextExtent>;

    /// Distance below the baseline reserved for descenders, in pixels.
    fn descent(&self) -> u32;
}

/// Produces an independent font for every requested size.
pub trait FontFactory {
    type Font<'a>: SizedFont
    where
        Self: 'a;

    fn at_size(&self, size: u32) -> RenderResult<Self::Font<'_>>;
}

/// Multi-line ink extent: widest line, and each non-empty line's ink height
/// plus descent stacked.
pub fn measure<F: SizedFont>(font: &F, text: &str) -> TextExtent {
    let mut extent = TextExtent::default();
    for line in text.split('\n').filter(|line| !line.is_empty()) {
        let ink = font.line_ink(line).unwrap_or_default();
        extent.width = extent.width.max(ink.width);
        extent.height = extent
            .height
            .saturating_add(ink.height)
            .saturating_add(font.descent());
    }
    extent
}

/// Owned font data, validated once and shareable across threads.
#[derive(Clone)]
pub struct FontFace {
    data: Arc<Vec<u8>>,
    face_index: u32,
    family: Option<String>,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("face_index", &self.face_index)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl FontFace {
    /// Picks the first face in `data` that parses, collections included.
    pub fn from_data(data: Vec<u8>) -> RenderResult<Self> {
        let count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
        for index in 0..count {
            let Ok(face) = Face::parse(&data, index) else {
                continue;
            };
            if face.units_per_em() == 0 {
                continue;
            }
            let family = extract_family_name(&face);
            return Ok(Self {
                data: Arc::new(data),
                face_index: index,
                family,
            });
        }
        Err(RenderError::unrenderable(0, "failed to parse font data"))
    }

    /// Uses exactly face `index` of a collection.
    pub fn from_data_index(data: Vec<u8>, index: u32) -> RenderResult<Self> {
        let face = Face::parse(&data, index)
            .map_err(|err| RenderError::unrenderable(0, err.to_string()))?;
        if face.units_per_em() == 0 {
            return Err(RenderError::unrenderable(0, "units per em is zero"));
        }
        let family = extract_family_name(&face);
        Ok(Self {
            data: Arc::new(data),
            face_index: index,
            family,
        })
    }

    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }
}

impl FontFactory for FontFace {
    type Font<'a> = ScaledFont<'a>;

    fn at_size(&self, size: u32) -> RenderResult<ScaledFont<'_>> {
        if size == 0 {
            return Err(RenderError::unrenderable(size, "font size must be positive"));
        }
        let face = Face::parse(self.data(), self.face_index)
            .map_err(|err| RenderError::unrenderable(size, err.to_string()))?;
        let units_per_em = face.units_per_em();
        if units_per_em == 0 {
            return Err(RenderError::unrenderable(size, "units per em is zero"));
        }
        let scale = size as f32 / units_per_em as f32;
        Ok(ScaledFont { face, size, scale })
    }
}

/// A parsed face bound to one pixel size.
pub struct ScaledFont<'a> {
    face: Face<'a>,
    size: u32,
    scale: f32,
}

impl ScaledFont<'_> {
    pub fn ascent(&self) -> f32 {
        self.face.ascender() as f32 * self.scale
    }

    /// Nominal height of a line: ascent plus descent.
    pub fn line_height(&self) -> f32 {
        self.ascent() + self.descent() as f32
    }

    fn space_advance(&self) -> f32 {
        let advance = self
            .face
            .glyph_index(' ')
            .and_then(|id| self.face.glyph_hor_advance(id))
            .unwrap_or(self.face.units_per_em() / 2);
        advance as f32 * self.scale
    }

    fn advance(&self, glyph: Option<GlyphId>) -> f32 {
        glyph
            .and_then(|id| self.face.glyph_hor_advance(id))
            .map(|advance| advance as f32 * self.scale)
            .unwrap_or_else(|| self.space_advance())
    }

    /// Fails when none of the non-whitespace characters has an outline.
    pub fn ensure_drawable(&self, text: &str) -> RenderResult<()> {
        let mut visible = false;
        for ch in text.chars().filter(|ch| !ch.is_whitespace()) {
            visible = true;
            if let Some(id) = self.face.glyph_index(ch)
                && self.face.glyph_bounding_box(id).is_some()
            {
                return Ok(());
            }
        }
        if visible {
            return Err(RenderError::unrenderable(
                self.size,
                "no glyph outlines for the requested text",
            ));
        }
        Ok(())
    }

    /// Appends the outline of `line` to `builder` with the pen starting at
    /// `(x, baseline)`.
    pub fn append_line(&self, builder: &mut PathBuilder, line: &str, x: f32, baseline: f32) {
        let mut pen = x;
        for ch in line.chars() {
            let glyph = self.face.glyph_index(ch);
            if let Some(id) = glyph {
                let mut outline = PathOutline {
                    builder: &mut *builder,
                    origin_x: pen,
                    baseline,
                    scale: self.scale,
                };
                let _ = self.face.outline_glyph(id, &mut outline);
            }
            pen += self.advance(glyph);
        }
    }
}

impl SizedFont for ScaledFont<'_> {
    fn line_ink(&self, line: &str) -> Option<TextExtent> {
        let ascent = self.ascent();
        let mut pen = 0.0f32;
        let mut right = f32::MIN;
        let mut bottom = f32::MIN;
        for ch in line.chars() {
            let glyph = self.face.glyph_index(ch);
            if let Some(rect) = glyph.and_then(|id| self.face.glyph_bounding_box(id)) {
                right = right.max(pen + rect.x_max as f32 * self.scale);
                bottom = bottom.max(ascent - rect.y_min as f32 * self.scale);
            }
            pen += self.advance(glyph);
        }
        if right == f32::MIN {
            return None;
        }
        Some(TextExtent {
            width: right.max(0.0).ceil() as u32,
            height: bottom.max(0.0).ceil() as u32,
        })
    }

    fn descent(&self) -> u32 {
        (-(self.face.descender() as f32) * self.scale).max(0.0).round() as u32
    }
}

struct PathOutline<'b> {
    builder: &'b mut PathBuilder,
    origin_x: f32,
    baseline: f32,
    scale: f32,
}

impl PathOutline<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.baseline - y * self.scale)
    }
}

impl OutlineBuilder for PathOutline<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn extract_family_name(face: &Face<'_>) -> Option<String> {
    let mut fallback = None;
    for name in face.names() {
        if name.name_id == name_id::TYPOGRAPHIC_FAMILY {
            if let Some(value) = name.to_string() {
                return Some(value);
            }
        } else if name.name_id == name_id::FAMILY && fallback.is_none() {
            fallback = name.to_string();
        }
    }
    fallback
}
