use anyhow::{Context, Result, anyhow};
use image::GenericImageView;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod error;
pub mod fonts;
pub mod frame;
pub mod logging;
mod paths;
pub mod render;
pub mod resize;
pub mod settings;
#[cfg(test)]
mod test_util;
pub mod wrap;

pub use error::{RenderError, RenderResult};
pub use render::{FitResult, FontFace, Padding, render};
pub use wrap::wrap;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub image: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub fonts: Vec<PathBuf>,
    pub font_family: Option<String>,
    pub padding: Option<String>,
    pub max_line_length: Option<usize>,
    pub max_shortest_side: Option<u32>,
    pub settings_path: Option<String>,
    pub report: bool,
    pub show_settings: bool,
}

#[derive(Debug, Serialize)]
struct FrameReport {
    output: PathBuf,
    width: u32,
    height: u32,
    font: String,
    font_size: u32,
    font_attempts: usize,
    lines: usize,
}

pub fn run(config: Config, input: Option<String>) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let mut settings = settings::load_settings(settings_path)?;
    apply_overrides(&mut settings, &config)?;

    if config.show_settings {
        return toml::to_string_pretty(&settings).with_context(|| "failed to format settings");
    }

    let image_path = config
        .image
        .as_deref()
        .ok_or_else(|| anyhow!("no input image given"))?;
    let text = input.unwrap_or_default();
    let text = text.trim_end_matches(['\r', '\n']);
    if text.trim().is_empty() {
        return Err(anyhow!("text is empty"));
    }

    let image = image::open(image_path)
        .with_context(|| format!("failed to open image: {}", image_path.display()))?;
    info!(
        "input image {} ({}x{})",
        image_path.display(),
        image.width(),
        image.height()
    );

    let mut font_files = config.fonts.clone();
    font_files.extend(settings.font_paths.iter().cloned());
    let family = config
        .font_family
        .as_deref()
        .or(settings.font_family.as_deref());
    let candidates = fonts::font_candidates(&font_files, family, &settings.fallback_families);
    if candidates.is_empty() {
        return Err(anyhow!("no font candidates configured"));
    }

    let mut loader = fonts::FontLoader::default();
    let framed = frame::frame_image(
        frame::FrameRequest {
            text,
            image,
            fonts: &candidates,
            padding: settings.padding,
            max_line_length: settings.max_line_length,
            max_shortest_side: settings.max_shortest_side,
        },
        |source| loader.load(source),
    )?;

    let output = config
        .output
        .clone()
        .unwrap_or_else(|| frame::default_output_path(image_path));
    frame::save_image(&framed.image, &output)?;
    info!("wrote {}", output.display());

    if !config.report {
        return Ok(output.display().to_string());
    }
    let (width, height) = framed.image.dimensions();
    let report = FrameReport {
        output,
        width,
        height,
        font: framed.font.to_string(),
        font_size: framed.font_size,
        font_attempts: framed.attempts,
        lines: wrap(text, settings.max_line_length).split('\n').count(),
    };
    serde_json::to_string_pretty(&report).with_context(|| "failed to format report")
}

fn apply_overrides(settings: &mut settings::Settings, config: &Config) -> Result<()> {
    if let Some(raw) = config.padding.as_deref() {
        settings.padding = raw.parse()?;
    }
    if let Some(length) = config.max_line_length {
        if length < 2 {
            return Err(anyhow!("max line length must be at least 2, got {}", length));
        }
        settings.max_line_length = length;
    }
    if let Some(side) = config.max_shortest_side {
        if side == 0 {
            return Err(anyhow!("max shortest side must be positive"));
        }
        settings.max_shortest_side = side;
    }
    Ok(())
}
