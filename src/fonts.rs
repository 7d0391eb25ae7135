use anyhow::{Context, Result, anyhow};
use std::fmt;
use std::path::{Path, PathBuf};
use usvg::fontdb;

use crate::render::FontFace;

/// Where a candidate font comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    File(PathBuf),
    Family(String),
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Family(name) => write!(f, "family '{}'", name),
        }
    }
}

/// Orders candidates: explicit files, the requested family, then fallbacks.
pub fn font_candidates(
    files: &[PathBuf],
    family: Option<&str>,
    fallback: &[String],
) -> Vec<FontSource> {
    let mut candidates: Vec<FontSource> = files.iter().cloned().map(FontSource::File).collect();
    let families = family
        .into_iter()
        .chain(fallback.iter().map(String::as_str))
        .map(str::trim)
        .filter(|name| !name.is_empty());
    for name in families {
        let source = FontSource::Family(name.to_string());
        if !candidates.contains(&source) {
            candidates.push(source);
        }
    }
    candidates
}

/// Lazily loaded system font database, only touched for family lookups.
#[derive(Default)]
pub struct FontLoader {
    db: Option<fontdb::Database>,
}

impl FontLoader {
    pub fn load(&mut self, source: &FontSource) -> Result<FontFace> {
        match source {
            FontSource::File(path) => load_font_file(path),
            FontSource::Family(name) => load_font_family(self.database(), name),
        }
    }

    fn database(&mut self) -> &fontdb::Database {
        self.db.get_or_insert_with(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            db
        })
    }
}

pub fn load_font_file(path: &Path) -> Result<FontFace> {
    let data =
        std::fs::read(path).with_context(|| format!("failed to read font: {}", path.display()))?;
    FontFace::from_data(data).with_context(|| format!("failed to parse font: {}", path.display()))
}

fn load_font_family(db: &fontdb::Database, family: &str) -> Result<FontFace> {
    let is_sans =
        family.eq_ignore_ascii_case("sans-serif") || family.eq_ignore_ascii_case("sans");
    let families = if is_sans {
        vec![fontdb::Family::SansSerif]
    } else {
        vec![fontdb::Family::Name(family)]
    };
    let query = fontdb::Query {
        families: &families,
        ..Default::default()
    };
    let id = db
        .query(&query)
        .ok_or_else(|| anyhow!("font not found: {}", family))?;
    let (data, index) = db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .ok_or_else(|| anyhow!("failed to load font data: {}", family))?;
    FontFace::from_data_index(data, index)
        .with_context(|| format!("failed to parse font family: {}", family))
}
