use std::path::Path;

use crate::{
    animation::effect::{EffectKind, TriggerKind},
    foundation::core::{ColorTag, Point, Rect, Rgb},
};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Live foreign reference issued by the host. Must be released exactly once.
pub struct HandleId(pub u64);

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Stable document-level identity of an element. Survives release of the handle it came with.
pub struct ElementId(pub u64);

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Stable identity of an effect on a page timeline.
pub struct EffectId(pub u64);

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Zero-based page index inside the host document.
pub struct PageId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Result of a successful creation call: the stable id plus the live handle that must be released.
pub struct Created<I> {
    /// Stable identity of the created object.
    pub id: I,
    /// Live reference acquired by the creation call.
    pub handle: HandleId,
}

/// Convenience result type for host calls.
pub type HostResult<T> = Result<T, HostError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Failures reported by a host collaborator.
pub enum HostError {
    /// A single creation or setter call failed. Recoverable at the calling step.
    #[error("host call '{op}' failed: {message}")]
    Call {
        /// Operation name.
        op: &'static str,
        /// Host-provided failure text.
        message: String,
    },

    /// The host refused to issue another handle.
    #[error("host handle pool exhausted ({live} of {limit} handles live)")]
    Exhausted {
        /// Live handles at the time of the refusal.
        live: usize,
        /// Host ceiling.
        limit: usize,
    },

    /// Release of a handle the host does not consider live.
    #[error("handle {0:?} is not live")]
    StaleHandle(HandleId),

    /// The host stopped answering. The only unrecoverable condition.
    #[error("host unavailable: {0}")]
    Unavailable(String),
}

impl HostError {
    /// Build a [`HostError::Call`] value.
    pub fn call(op: &'static str, message: impl Into<String>) -> Self {
        Self::Call {
            op,
            message: message.into(),
        }
    }

    /// Build a [`HostError::Unavailable`] value.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Whether this failure should abort the current page.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Primitive autoshape kinds the core asks for.
pub enum ShapeKind {
    /// Plain rectangle.
    Rectangle,
    /// Rectangle with rounded corners (diagram nodes, column panels).
    RoundedRectangle,
    /// Ellipse (edge label badges).
    Ellipse,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Fill request after capability resolution.
pub enum Fill {
    /// Theme color slot; only sent to hosts that support theme colors.
    Theme(ColorTag),
    /// Literal RGB color.
    Rgb(Rgb),
    /// Transparent fill.
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Outline style.
pub struct LineStyle {
    /// Line color.
    pub color: Rgb,
    /// Line weight in points.
    pub weight_pt: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Font request after capability resolution.
pub struct FontSpec {
    /// Size in points.
    pub size_pt: f64,
    /// Bold weight. Hosts without weight control never receive `true`.
    pub bold: bool,
    /// Text color.
    pub color: Rgb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Features that differ between host versions. Read once per generation run.
pub struct HostCapabilities {
    /// Fills can reference theme color slots.
    pub theme_colors: bool,
    /// Fonts accept an explicit weight.
    pub font_weight: bool,
    /// Straight connectors are available; otherwise edges are drawn as thin rectangles.
    pub connectors: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            theme_colors: true,
            font_weight: true,
            connectors: true,
        }
    }
}

/// Release side of the handle discipline.
pub trait HandleRelease {
    /// Release one live handle. Called at most once per handle by the tracker.
    fn release_handle(&mut self, handle: HandleId) -> HostResult<()>;

    /// Ask the host to reclaim released references before the next batch.
    fn reclaim(&mut self) {}
}

/// Element creation and styling.
pub trait ElementApi {
    /// Create an autoshape inside `frame`.
    fn add_shape(
        &mut self,
        page: PageId,
        shape: ShapeKind,
        frame: Rect,
    ) -> HostResult<Created<ElementId>>;

    /// Create a text box inside `frame`.
    fn add_text_box(&mut self, page: PageId, frame: Rect, text: &str)
    -> HostResult<Created<ElementId>>;

    /// Create a straight connector between two points.
    fn add_connector(
        &mut self,
        page: PageId,
        from: Point,
        to: Point,
    ) -> HostResult<Created<ElementId>>;

    /// Group existing elements of one page so they move together.
    fn group(&mut self, page: PageId, members: &[ElementId]) -> HostResult<Created<ElementId>>;

    /// Replace the text carried by an element.
    fn set_text(&mut self, element: ElementId, text: &str) -> HostResult<()>;

    /// Set the fill of an element.
    fn set_fill(&mut self, element: ElementId, fill: Fill) -> HostResult<()>;

    /// Set the outline of an element.
    fn set_line(&mut self, element: ElementId, line: LineStyle) -> HostResult<()>;

    /// Set the font of an element's text.
    fn set_font(&mut self, element: ElementId, font: &FontSpec) -> HostResult<()>;

    /// Move and resize an element.
    fn set_frame(&mut self, element: ElementId, frame: Rect) -> HostResult<()>;
}

/// Page animation timeline.
pub trait TimelineApi {
    /// Append an effect to the page's main sequence.
    fn append_effect(
        &mut self,
        page: PageId,
        target: ElementId,
        kind: EffectKind,
        trigger: TriggerKind,
    ) -> HostResult<Created<EffectId>>;

    /// Set an appended effect's duration.
    fn set_effect_duration(&mut self, effect: EffectId, secs: f64) -> HostResult<()>;
}

/// Document-level operations.
pub trait DocumentApi {
    /// Append a blank page.
    fn add_page(&mut self) -> HostResult<Created<PageId>>;

    /// Acquire the speaker-notes text region of a page.
    fn notes_region(&mut self, page: PageId) -> HostResult<Created<ElementId>>;

    /// Persist the document.
    fn save(&mut self, path: &Path) -> HostResult<()>;
}

/// Uniform host surface consumed by the engine.
pub trait Host: HandleRelease + ElementApi + TimelineApi + DocumentApi {
    /// Capabilities of the installed host version.
    fn capabilities(&self) -> HostCapabilities;
}
