use crate::{
    foundation::core::{ColorTag, Rgb},
    host::api::{Fill, FontSpec, HostCapabilities},
};

/// RGB stand-ins for theme slots on hosts without theme color support.
const FALLBACK_PALETTE: [(&str, Rgb); 9] = [
    ("accent1", Rgb::new(0x44, 0x72, 0xC4)),
    ("accent2", Rgb::new(0xED, 0x7D, 0x31)),
    ("accent3", Rgb::new(0xA5, 0xA5, 0xA5)),
    ("accent4", Rgb::new(0xFF, 0xC0, 0x00)),
    ("accent5", Rgb::new(0x5B, 0x9B, 0xD5)),
    ("accent6", Rgb::new(0x70, 0xAD, 0x47)),
    ("background", Rgb::new(0xF2, 0xF2, 0xF2)),
    ("text", Rgb::new(0x26, 0x26, 0x26)),
    ("muted", Rgb::new(0x7F, 0x7F, 0x7F)),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Primitive used to draw a diagram edge.
pub enum EdgePrimitive {
    /// Host straight connector.
    Connector,
    /// Thin rectangle spanning the two endpoints (hosts without connectors).
    ThinRectangle,
}

/// Style translation fixed once per generation run from the host's capabilities.
///
/// Callers ask for symbolic styles; the adapter decides what the host actually receives, so no
/// call site probes the host version.
#[derive(Clone, Debug)]
pub struct StyleAdapter {
    caps: HostCapabilities,
}

impl StyleAdapter {
    pub fn select(caps: HostCapabilities) -> Self {
        tracing::debug!(?caps, "selected style adapter");
        Self { caps }
    }

    pub fn capabilities(&self) -> HostCapabilities {
        self.caps
    }

    /// Fill for a color tag. Tags starting with `#` are literal colors.
    pub fn fill(&self, tag: &ColorTag) -> Fill {
        if tag.as_str().starts_with('#') {
            return match Rgb::parse_hex(tag.as_str()) {
                Ok(rgb) => Fill::Rgb(rgb),
                Err(err) => {
                    tracing::warn!(
                        tag = tag.as_str(),
                        error = %err,
                        "bad literal color; using accent1"
                    );
                    Fill::Rgb(fallback_rgb("accent1"))
                }
            };
        }
        if self.caps.theme_colors {
            Fill::Theme(tag.clone())
        } else {
            Fill::Rgb(fallback_rgb(tag.as_str()))
        }
    }

    /// Text color for a tag. Always literal: text colors are set through the font.
    pub fn text_color(&self, tag: &ColorTag) -> Rgb {
        match self.fill(tag) {
            Fill::Rgb(rgb) => rgb,
            Fill::Theme(t) => fallback_rgb(t.as_str()),
            Fill::None => fallback_rgb("text"),
        }
    }

    /// Font as the host can accept it.
    pub fn font(&self, size_pt: f64, bold: bool, color: &ColorTag) -> FontSpec {
        FontSpec {
            size_pt,
            bold: bold && self.caps.font_weight,
            color: self.text_color(color),
        }
    }

    pub fn edge_primitive(&self) -> EdgePrimitive {
        if self.caps.connectors {
            EdgePrimitive::Connector
        } else {
            EdgePrimitive::ThinRectangle
        }
    }
}

fn fallback_rgb(tag: &str) -> Rgb {
    FALLBACK_PALETTE
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, rgb)| *rgb)
        .unwrap_or(FALLBACK_PALETTE[0].1)
}
