use image::RgbaImage;
use tiny_skia::{ColorU8, FillRule, LineCap, LineJoin, Paint, Path, Pixmap, Stroke, Transform};

/// Fills `path` white over a black outline `stroke` pixels wide, in place.
pub(crate) fn draw_outlined(canvas: &mut RgbaImage, path: &Path, stroke: f32) {
    let Some(mut pixmap) = to_pixmap(canvas) else {
        return;
    };

    let mut paint = Paint::default();
    paint.anti_alias = true;

    // The stroke straddles the outline, so double it and let the fill cover
    // the inner half.
    paint.set_color_rgba8(0, 0, 0, 255);
    let outline = Stroke {
        width: stroke * 2.0,
        line_join: LineJoin::Round,
        line_cap: LineCap::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(path, &paint, &outline, Transform::identity(), None);

    paint.set_color_rgba8(255, 255, 255, 255);
    pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);

    copy_back(&pixmap, canvas);
}

fn to_pixmap(canvas: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(canvas.width(), canvas.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(canvas.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

// Untouched pixels keep their exact straight-alpha value.
fn copy_back(pixmap: &Pixmap, canvas: &mut RgbaImage) {
    for (src, dst) in pixmap.pixels().iter().zip(canvas.pixels_mut()) {
        let [r, g, b, a] = dst.0;
        if *src == ColorU8::from_rgba(r, g, b, a).premultiply() {
            continue;
        }
        let color = src.demultiply();
        dst.0 = [color.red(), color.green(), color.blue(), color.alpha()];
    }
}
