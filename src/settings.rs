use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::render::Padding;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub max_line_length: usize,
    pub max_shortest_side: u32,
    #[serde(serialize_with = "serialize_padding")]
    pub padding: Padding,
    pub font_paths: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    pub fallback_families: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_line_length: 40,
            max_shortest_side: 2160,
            padding: Padding::default(),
            font_paths: Vec::new(),
            font_family: None,
            fallback_families: vec![
                "DejaVu Sans".to_string(),
                "Liberation Sans".to_string(),
                "sans-serif".to_string(),
            ],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    text: Option<TextSettings>,
    image: Option<ImageSettings>,
    render: Option<RenderSettings>,
    fonts: Option<FontSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct TextSettings {
    max_line_length: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageSettings {
    max_shortest_side: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct RenderSettings {
    padding: Option<toml::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct FontSettings {
    paths: Option<Vec<String>>,
    family: Option<String>,
    fallback: Option<Vec<String>>,
}

/// Loads settings, later files overriding earlier ones:
/// `./settings.toml`, `./settings.local.toml`, the same two files in the
/// settings directory, then `extra_path`.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = paths::settings_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            settings
                .merge(parsed, base)
                .with_context(|| format!("invalid settings: {}", path.display()))?;
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile, base: &Path) -> Result<()> {
        if let Some(text) = incoming.text {
            if let Some(length) = text.max_line_length {
                if length < 2 {
                    return Err(anyhow!("max_line_length must be at least 2, got {}", length));
                }
                self.max_line_length = length;
            }
        }
        if let Some(image) = incoming.image {
            if let Some(side) = image.max_shortest_side {
                if side == 0 {
                    return Err(anyhow!("max_shortest_side must be positive"));
                }
                self.max_shortest_side = side;
            }
        }
        if let Some(render) = incoming.render {
            if let Some(value) = render.padding {
                self.padding = Padding::from_toml(&value)?;
            }
        }
        if let Some(fonts) = incoming.fonts {
            if let Some(paths) = fonts.paths {
                self.font_paths = paths
                    .iter()
                    .map(|path| path.trim())
                    .filter(|path| !path.is_empty())
                    .map(|path| base.join(path))
                    .collect();
            }
            if let Some(family) = fonts.family {
                if !family.trim().is_empty() {
                    self.font_family = Some(family);
                }
            }
            if let Some(fallback) = fonts.fallback {
                self.fallback_families = fallback
                    .into_iter()
                    .filter(|name| !name.trim().is_empty())
                    .collect();
            }
        }
        Ok(())
    }
}

fn serialize_padding<S: serde::Serializer>(padding: &Padding, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(padding)
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = paths::settings_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}
