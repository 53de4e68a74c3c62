use crate::foundation::error::{SlidewrightError, SlidewrightResult};

pub use kurbo::{Point, Rect, Size, Vec2};

/// Page canvas in host points.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> SlidewrightResult<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(SlidewrightError::validation(
                "Canvas width and height must be finite and > 0",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn center(self) -> Point {
        self.rect().center()
    }
}

impl Default for Canvas {
    fn default() -> Self {
        // 16:9 widescreen page.
        Self {
            width: 960.0,
            height: 540.0,
        }
    }
}

/// Straight 8-bit RGB color as understood by every host version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`.
    pub fn parse_hex(s: &str) -> SlidewrightResult<Self> {
        let hex = s.strip_prefix('#').ok_or_else(|| {
            SlidewrightError::validation(format!("color '{s}' must start with '#'"))
        })?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(SlidewrightError::validation(format!(
                "color '{s}' must be #rrggbb"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| SlidewrightError::validation(format!("color '{s}': {e}")))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Packed `0xRRGGBB` value.
    pub fn to_u32(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }
}

/// Symbolic color slot (theme accent, background, text) resolved per host capability.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ColorTag(pub String);

impl ColorTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Accent slot cycling through the six theme accents.
    pub fn accent(index: usize) -> Self {
        Self(format!("accent{}", index % 6 + 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColorTag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
