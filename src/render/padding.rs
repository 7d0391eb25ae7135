use std::fmt;
use std::str::FromStr;

use crate::error::{RenderError, RenderResult};

/// Minimum margin kept between the text and the image border.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Padding {
    /// Same pixel margin on both axes.
    Pixels(u32),
    /// Percentage of the image width (horizontal) and height (vertical).
    Percent(f64),
}

impl Padding {
    /// Builds a percentage padding, rejecting negative and non-finite values.
    pub fn percent(value: f64) -> RenderResult<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(RenderError::InvalidPadding(format!(
                "percentage must be a finite non-negative number, got {}",
                value
            )));
        }
        Ok(Self::Percent(value))
    }

    /// Returns `(horizontal, vertical)` padding in pixels.
    pub fn resolve(&self, width: u32, height: u32) -> (u32, u32) {
        match *self {
            Self::Pixels(pixels) => (pixels, pixels),
            Self::Percent(pct) => (
                (pct * width as f64 / 100.0) as u32,
                (pct * height as f64 / 100.0) as u32,
            ),
        }
    }

    /// Interprets a TOML value: integers are pixels, floats are percentages.
    pub fn from_toml(value: &toml::Value) -> RenderResult<Self> {
        match value {
            toml::Value::Integer(pixels) => u32::try_from(*pixels)
                .map(Self::Pixels)
                .map_err(|_| RenderError::InvalidPadding(format!("pixels out of range: {}", pixels))),
            toml::Value::Float(pct) => Self::percent(*pct),
            toml::Value::String(raw) => raw.parse(),
            other => Err(RenderError::InvalidPadding(format!(
                "expected an integer (pixels) or a float (percent), got {}",
                other.type_str()
            ))),
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::Percent(10.0)
    }
}

impl FromStr for Padding {
    type Err = RenderError;

    /// Accepts `12`, `12px`, `10.0` and `10%`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim();
        let invalid = || RenderError::InvalidPadding(format!("unrecognized padding '{}'", raw));
        if let Some(pct) = value.strip_suffix('%') {
            let pct = pct.trim().parse::<f64>().map_err(|_| invalid())?;
            return Self::percent(pct);
        }
        if let Some(pixels) = value.strip_suffix("px") {
            let pixels = pixels.trim().parse::<u32>().map_err(|_| invalid())?;
            return Ok(Self::Pixels(pixels));
        }
        if let Ok(pixels) = value.parse::<u32>() {
            return Ok(Self::Pixels(pixels));
        }
        if value.contains('.') {
            let pct = value.parse::<f64>().map_err(|_| invalid())?;
            return Self::percent(pct);
        }
        Err(invalid())
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixels(pixels) => write!(f, "{}px", pixels),
            Self::Percent(pct) => write!(f, "{}%", pct),
        }
    }
}
