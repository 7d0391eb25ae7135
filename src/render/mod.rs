mod font;
mod padding;
mod raster;

use image::{DynamicImage, GenericImageView};
use tiny_skia::PathBuilder;
use tracing::debug;

use crate::error::RenderResult;

pub use font::{FontFace, FontFactory, ScaledFont, SizedFont, TextExtent, measure};
pub use padding::Padding;

/// Step sizes of the font-size scan, coarse first.
pub const SIZE_STEPS: [u32; 6] = [100, 50, 25, 10, 5, 1];

/// Smallest size ever used; also the fallback when nothing larger fits.
pub const MIN_FONT_SIZE: u32 = 1;

pub struct FitResult {
    pub size: u32,
    pub image: DynamicImage,
}

/// Outline width drawn around the glyphs at `size`.
pub fn stroke_width(size: u32) -> u32 {
    (size / 50).max(1)
}

/// Largest font size whose ink box fits in the image minus padding on both axes.
///
/// Scans upward from the best size found so far with each step in
/// [`SIZE_STEPS`], stopping at the first candidate that overflows. This can
/// settle slightly below the true maximum; that is accepted.
pub fn fit_size<F: FontFactory>(
    fonts: &F,
    text: &str,
    width: u32,
    height: u32,
    padding: (u32, u32),
) -> RenderResult<u32> {
    let (pad_h, pad_v) = padding;
    let limit = width.max(height);
    let mut best = MIN_FONT_SIZE;

    for step in SIZE_STEPS {
        let mut size = best;
        while size < limit {
            let font = fonts.at_size(size)?;
            let extent = measure(&font, text);
            if (width as i64 - extent.width as i64) < 2 * pad_h as i64 {
                break;
            }
            if (height as i64 - extent.height as i64) < 2 * pad_v as i64 {
                break;
            }
            best = size;
            size += step;
        }
    }

    Ok(best)
}

/// Draws `text` as large as it fits on a copy of `image`, centered, white with
/// a black outline.
///
/// The text is never re-wrapped; explicit line breaks are kept as given.
/// Drawing happens on an 8-bit RGBA copy, so the result is `Rgba8` when the
/// input has alpha and `Rgb8` otherwise, whatever the input's channel depth.
pub fn render(
    image: &DynamicImage,
    text: &str,
    font: &FontFace,
    min_padding: Padding,
) -> RenderResult<FitResult> {
    let mut canvas = image.to_rgba8();
    let (width, height) = image.dimensions();
    let padding = min_padding.resolve(width, height);

    let size = fit_size(font, text, width, height, padding)?;
    let scaled = font.at_size(size)?;
    scaled.ensure_drawable(text)?;
    let stroke = stroke_width(size);
    debug!(
        "fit: size={} stroke={} padding={:?} image={}x{}",
        size, stroke, padding, width, height
    );

    let room = height.saturating_sub(2 * padding.1);
    if let Some(path) = layout_text(&scaled, text, width, height, room) {
        raster::draw_outlined(&mut canvas, &path, stroke as f32);
    }

    let image = if image.color().has_alpha() {
        DynamicImage::ImageRgba8(canvas)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
    };
    Ok(FitResult { size, image })
}

/// Empty lines are not measured, so they share whatever vertical room the
/// measured block leaves inside the padding, each capped at one line height.
fn blank_line_slot(font: &ScaledFont<'_>, text: &str, room: u32) -> f32 {
    let blanks = text.split('\n').filter(|line| line.is_empty()).count();
    if blanks == 0 {
        return 0.0;
    }
    let spare = room.saturating_sub(measure(font, text).height);
    (spare as f32 / blanks as f32).min(font.line_height())
}

fn layout_text(
    font: &ScaledFont<'_>,
    text: &str,
    width: u32,
    height: u32,
    room: u32,
) -> Option<tiny_skia::Path> {
    let ascent = font.ascent();
    let blank_slot = blank_line_slot(font, text, room);
    let slots: Vec<(&str, f32, f32)> = text
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                return (line, 0.0, blank_slot);
            }
            let ink = font.line_ink(line).unwrap_or_default();
            (line, ink.width as f32, (ink.height + font.descent()) as f32)
        })
        .collect();
    let block_height: f32 = slots.iter().map(|(_, _, slot)| slot).sum();

    let mut builder = PathBuilder::new();
    let mut top = (height as f32 - block_height) / 2.0;
    for (line, line_width, slot) in slots {
        if !line.is_empty() {
            let x = (width as f32 - line_width) / 2.0;
            font.append_line(&mut builder, line, x, top + ascent);
        }
        top += slot;
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use std::cell::RefCell;

    /// Monospace stand-in: every character is `size / 2` wide and `size` tall.
    struct BoxFont {
        size: u32,
    }

    impl SizedFont for BoxFont {
        fn line_ink(&self, line: &str) -> Option<TextExtent> {
            let chars = line.chars().filter(|ch| !ch.is_whitespace()).count() as u32;
            if chars == 0 {
                return None;
            }
            Some(TextExtent {
                width: line.chars().count() as u32 * self.size / 2,
                height: self.size,
            })
        }

        fn descent(&self) -> u32 {
            self.size / 5
        }
    }

    #[derive(Default)]
    struct BoxFonts {
        requested: RefCell<Vec<u32>>,
        broken_from: Option<u32>,
    }

    impl FontFactory for BoxFonts {
        type Font<'a> = BoxFont;

        fn at_size(&self, size: u32) -> RenderResult<BoxFont> {
            self.requested.borrow_mut().push(size);
            if self.broken_from.is_some_and(|from| size >= from) {
                return Err(RenderError::UnrenderableFont {
                    size,
                    reason: "broken".to_string(),
                });
            }
            Ok(BoxFont { size })
        }
    }

    fn fits(size: u32, text: &str, width: u32, height: u32, pad: (u32, u32)) -> bool {
        let extent = measure(&BoxFont { size }, text);
        extent.width + 2 * pad.0 <= width && extent.height + 2 * pad.1 <= height
    }

    /// Re-implements the stepped scan directly against `fits`.
    fn stepped(text: &str, width: u32, height: u32, pad: (u32, u32)) -> u32 {
        let mut best = 1;
        for step in SIZE_STEPS {
            let mut size = best;
            while size < width.max(height) && fits(size, text, width, height, pad) {
                best = size;
                size += step;
            }
        }
        best
    }

    #[test]
    fn single_character_converges() {
        let fonts = BoxFonts::default();
        let size = fit_size(&fonts, "A", 1000, 1000, (0, 0)).unwrap();
        // size + size / 5 <= 1000 binds first; 834 + 166 == 1000.
        assert_eq!(size, 834);
        assert_eq!(size, stepped("A", 1000, 1000, (0, 0)));
        assert_eq!(fit_size(&fonts, "A", 1000, 1000, (0, 0)).unwrap(), size);
    }

    #[test]
    fn scan_order_is_coarse_to_fine() {
        let fonts = BoxFonts::default();
        fit_size(&fonts, "A", 300, 300, (0, 0)).unwrap();
        let requested = fonts.requested.borrow();
        assert_eq!(&requested[..4], &[1, 101, 201, 201]);
        assert!(requested.windows(2).any(|pair| pair[1] == pair[0] + 1));
    }

    #[test]
    fn width_bound_text_matches_reference_scan() {
        // 10 chars * size / 2 <= 200
        let fonts = BoxFonts::default();
        let size = fit_size(&fonts, "0123456789", 200, 60, (0, 0)).unwrap();
        assert_eq!(size, stepped("0123456789", 200, 60, (0, 0)));
        assert_eq!(size, 40);
    }

    #[test]
    fn longer_text_never_gets_a_larger_size() {
        let fonts = BoxFonts::default();
        let texts = [
            "hi",
            "hello",
            "hello world",
            "hello world\nand more lines",
            "hello world\nand more lines\nand even more text here",
        ];
        let sizes: Vec<u32> = texts
            .iter()
            .map(|text| fit_size(&fonts, text, 800, 600, (40, 30)).unwrap())
            .collect();
        for pair in sizes.windows(2) {
            assert!(pair[1] <= pair[0], "{sizes:?}");
        }
    }

    #[test]
    fn falls_back_to_minimum_size() {
        let fonts = BoxFonts::default();
        assert_eq!(fit_size(&fonts, "too long", 10, 10, (4, 4)).unwrap(), 1);
        assert_eq!(fit_size(&fonts, "A", 1, 1, (0, 0)).unwrap(), 1);
        assert!(fonts.requested.borrow().iter().all(|size| *size >= 1));
    }

    #[test]
    fn padding_shrinks_the_size() {
        let fonts = BoxFonts::default();
        let loose = fit_size(&fonts, "padding", 500, 500, (0, 0)).unwrap();
        let tight = fit_size(&fonts, "padding", 500, 500, (100, 100)).unwrap();
        assert!(tight < loose);
        assert!(fits(tight, "padding", 500, 500, (100, 100)));
    }

    #[test]
    fn unrenderable_size_is_reported() {
        let fonts = BoxFonts {
            broken_from: Some(50),
            ..BoxFonts::default()
        };
        let err = fit_size(&fonts, "A", 1000, 1000, (0, 0)).unwrap_err();
        assert!(matches!(err, RenderError::UnrenderableFont { size: 101, .. }));
    }

    #[test]
    fn missing_glyphs_are_unrenderable() {
        use crate::test_util::{DEJAVU_SANS_MONO, test_font};

        let image = DynamicImage::ImageRgb8(image::RgbImage::new(300, 200));
        let err = render(&image, "שלום", &test_font(DEJAVU_SANS_MONO), Padding::Pixels(0))
            .err()
            .expect("mono face has no hebrew outlines");
        assert!(matches!(err, RenderError::UnrenderableFont { size, .. } if size > 1));
    }

    #[test]
    fn blank_lines_share_the_spare_room() {
        use crate::test_util::{DEJAVU_SANS, test_font};

        let face = test_font(DEJAVU_SANS);
        let font = face.at_size(40).unwrap();
        let measured = measure(&font, "top\n\nbottom").height;
        assert_eq!(blank_line_slot(&font, "top\nbottom", 400), 0.0);
        assert_eq!(blank_line_slot(&font, "top\n\nbottom", measured), 0.0);
        assert_eq!(
            blank_line_slot(&font, "top\n\nbottom", 10_000),
            font.line_height()
        );
        assert_eq!(blank_line_slot(&font, "a\n\n\nb", measure(&font, "a\nb").height + 30), 15.0);
    }

    #[test]
    fn stroke_width_scales_with_size() {
        assert_eq!(stroke_width(1), 1);
        assert_eq!(stroke_width(49), 1);
        assert_eq!(stroke_width(50), 1);
        assert_eq!(stroke_width(99), 1);
        assert_eq!(stroke_width(100), 2);
        assert_eq!(stroke_width(834), 16);
        for size in 1..2000 {
            assert_eq!(stroke_width(size), std::cmp::max(1, size / 50));
        }
    }
}
