use anyhow::{Context, Result, anyhow};
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::RenderError;
use crate::fonts::FontSource;
use crate::render::{self, FontFace, Padding};
use crate::resize::limit_shortest_side;
use crate::wrap::wrap;

pub struct FrameRequest<'a> {
    pub text: &'a str,
    pub image: DynamicImage,
    pub fonts: &'a [FontSource],
    pub padding: Padding,
    pub max_line_length: usize,
    pub max_shortest_side: u32,
}

pub struct Framed {
    pub image: DynamicImage,
    pub font_size: u32,
    pub font: FontSource,
    pub attempts: usize,
}

/// Wraps the text, downsizes the image and renders it, moving on to the next
/// font candidate whenever one cannot be loaded or rendered.
pub fn frame_image<L>(request: FrameRequest<'_>, mut load: L) -> Result<Framed>
where
    L: FnMut(&FontSource) -> Result<FontFace>,
{
    let text = wrap(request.text, request.max_line_length);
    let image = limit_shortest_side(request.image, request.max_shortest_side);

    let mut attempts = 0;
    for source in request.fonts {
        attempts += 1;
        let font = match load(source) {
            Ok(font) => font,
            Err(err) => {
                warn!("skipping font {}: {:#}", source, err);
                continue;
            }
        };
        match render::render(&image, &text, &font, request.padding) {
            Ok(fit) => {
                info!(
                    "rendered with {} ({}) at size {} after {} attempt(s)",
                    source,
                    font.family().unwrap_or("unnamed"),
                    fit.size,
                    attempts
                );
                return Ok(Framed {
                    image: fit.image,
                    font_size: fit.size,
                    font: source.clone(),
                    attempts,
                });
            }
            Err(RenderError::UnrenderableFont { size, reason }) => {
                warn!("font {} unrenderable at size {}: {}", source, size, reason);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(anyhow!(
        "no usable font among {} candidate(s)",
        request.fonts.len()
    ))
}

/// `<stem>-framed.<ext>` next to the input, keeping its extension or `.jpg`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let extension = input
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .filter(|ext| ImageFormat::from_extension(ext).is_some())
        .unwrap_or_else(|| "jpg".to_string());
    input.with_file_name(format!("{}-framed.{}", stem, extension))
}

pub fn save_image(image: &DynamicImage, path: &Path) -> Result<()> {
    let format = ImageFormat::from_path(path)
        .with_context(|| format!("unsupported output image format: {}", path.display()))?;
    let encoded = if format == ImageFormat::Jpeg && image.color().has_alpha() {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        image.clone()
    };
    encoded
        .save_with_format(path, format)
        .with_context(|| format!("failed to write image: {}", path.display()))
}
