use std::{fs::File, io::BufReader, path::Path};

use crate::{
    animation::effect::{AnimationDurations, EffectKind},
    foundation::core::{Canvas, Size},
    foundation::error::{SlidewrightError, SlidewrightResult},
    layout::diagram::GraphLayout,
    resources::budget::{DEFAULT_MAX_ANIMATIONS, DEFAULT_MAX_ELEMENTS},
    resources::tracker::DEFAULT_AUTO_RELEASE_THRESHOLD,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Engine tuning. Every field has a default, so a config file only lists what it changes.
pub struct EngineConfig {
    /// Page canvas in points.
    pub canvas: Canvas,
    /// Element ceiling per page.
    pub max_elements_per_page: u32,
    /// Animation-effect ceiling per page.
    pub max_animations_per_page: u32,
    /// Tracked-handle count that triggers releasing the oldest half. `0` disables it.
    pub auto_release_threshold: usize,
    /// Applied effects between two eviction passes of the sequencer.
    pub release_every: usize,
    /// Handles released by each sequencer eviction pass.
    pub release_batch: usize,
    /// Chunk size of the end-of-page flush. `0` flushes in one pass.
    pub flush_batch_size: usize,
    /// Diagram node size.
    pub node_size: Size,
    /// Preferred radius of the radial layout; shrunk to fit the content area.
    pub radial_radius: f64,
    /// Scale applied to the fixed triad offsets.
    pub triad_scale: f64,
    /// Default node placement.
    pub graph_layout: GraphLayout,
    /// Row height of two-column items.
    pub column_row_height: f64,
    /// Gap between two-column rows.
    pub column_row_gap: f64,
    /// Title font size.
    pub title_font_pt: f64,
    /// Body font size (nodes, column items).
    pub body_font_pt: f64,
    /// Label font size (edge badges, legend).
    pub label_font_pt: f64,
    /// Entrance effect used for diagram content.
    pub entrance_effect: EffectKind,
    /// Default effect durations.
    pub durations: AnimationDurations,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            max_elements_per_page: DEFAULT_MAX_ELEMENTS,
            max_animations_per_page: DEFAULT_MAX_ANIMATIONS,
            auto_release_threshold: DEFAULT_AUTO_RELEASE_THRESHOLD,
            release_every: 3,
            release_batch: 4,
            flush_batch_size: 0,
            node_size: Size::new(120.0, 56.0),
            radial_radius: 170.0,
            triad_scale: 1.0,
            graph_layout: GraphLayout::Auto,
            column_row_height: 34.0,
            column_row_gap: 8.0,
            title_font_pt: 30.0,
            body_font_pt: 16.0,
            label_font_pt: 11.0,
            entrance_effect: EffectKind::Fade,
            durations: AnimationDurations::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from a JSON reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> SlidewrightResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| SlidewrightError::config(format!("parse engine config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> SlidewrightResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SlidewrightError::config(format!("open engine config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> SlidewrightResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)
            .map_err(|e| SlidewrightError::config(e.to_string()))?;
        if self.release_every == 0 {
            return Err(SlidewrightError::config("release_every must be >= 1"));
        }
        if self.release_batch == 0 {
            return Err(SlidewrightError::config("release_batch must be >= 1"));
        }
        if self.auto_release_threshold == 1 {
            // Half of one handle is zero: the threshold would fire on every track and free nothing.
            return Err(SlidewrightError::config(
                "auto_release_threshold must be 0 (disabled) or >= 2",
            ));
        }
        let positive = [
            ("node_size.width", self.node_size.width),
            ("node_size.height", self.node_size.height),
            ("title_font_pt", self.title_font_pt),
            ("body_font_pt", self.body_font_pt),
            ("label_font_pt", self.label_font_pt),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(SlidewrightError::config(format!("{name} must be finite and > 0")));
            }
        }
        let non_negative = [
            ("radial_radius", self.radial_radius),
            ("triad_scale", self.triad_scale),
            ("column_row_height", self.column_row_height),
            ("column_row_gap", self.column_row_gap),
            ("durations.node_fade_s", self.durations.node_fade_s),
            ("durations.edge_fade_s", self.durations.edge_fade_s),
            ("durations.emphasis_s", self.durations.emphasis_s),
            ("durations.text_fade_s", self.durations.text_fade_s),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(SlidewrightError::config(format!("{name} must be finite and >= 0")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
