//! Slidewright builds slide decks by driving a stateful presentation host.
//!
//! The host hands out handles from a shared, finite pool and caps how many elements and effects
//! a page may hold. Slidewright keeps both limits by construction:
//!
//! 1. **Budget**: every element and effect is reserved against the page budget before the host
//!    is asked to create it ([`ResourceBudgetEnforcer`]).
//! 2. **Tracking**: every handle the host returns is registered in insertion order and released
//!    oldest-first, periodically and when the page ends ([`HandleTracker`]).
//! 3. **Containment**: a failed creation skips that item and is recorded on the page
//!    ([`PageDescriptor::skipped`]); only a host that stops answering ends a page early.
//!
//! # Pipeline
//!
//! `ContentSpec -> DocumentAssembler -> PageDescriptor`, one page at a time, driven by
//! [`DeckGenerator`]. Layout ([`graph_positions`], [`column_layout`]) is pure and deterministic.
//!
//! The host is reached only through the [`Host`] traits. [`RecordingHost`] implements them in
//! memory for dry runs and tests.
#![forbid(unsafe_code)]

mod animation;
mod document;
mod foundation;
mod host;
mod layout;
mod resources;

pub use animation::effect::{
    AnimationDurations, AnimationEffectRequest, EffectKind, EffectRole, TriggerKind,
};
pub use animation::sequencer::{
    AnimationSequencer, AppliedEffect, DropReason, DroppedEffect, SequenceReport, TimelineSlot,
    schedule,
};
pub use document::assembler::DocumentAssembler;
pub use document::content::{
    ContentSpec, DeckSpec, EdgeSpec, GraphSpec, LegendItemSpec, NodeSpec, PageContent,
    TwoColumnSpec,
};
pub use document::context::GenerationContext;
pub use document::deck::{DeckGenerator, DeckReport, FailedPage};
pub use document::page::{
    AnimationOutcome, ColumnItem, ColumnSide, Completion, FlushSummary, GraphEdge, GraphNode,
    LegendEntry, PageDescriptor, PageState, SkipReason, SkippedElement, SkippedKind,
};
pub use document::session::{CreateError, PageSession};
pub use foundation::config::EngineConfig;
pub use foundation::core::{Canvas, ColorTag, Point, Rect, Rgb, Size, Vec2};
pub use foundation::error::{SlidewrightError, SlidewrightResult};
pub use host::api::{
    Created, DocumentApi, EffectId, ElementApi, ElementId, Fill, FontSpec, HandleId,
    HandleRelease, Host, HostCapabilities, HostError, HostResult, LineStyle, PageId, ShapeKind,
    TimelineApi,
};
pub use host::capability::{EdgePrimitive, StyleAdapter};
pub use host::recording::{
    RecordedDocument, RecordedEffect, RecordedElement, RecordedKind, RecordingHost,
};
pub use layout::diagram::{
    GraphLayout, PageRegions, TRIAD_OFFSETS, column_layout, edge_anchor, graph_positions,
    node_frame, radial_layout, triad_layout,
};
pub use resources::budget::{
    BudgetCounters, DEFAULT_MAX_ANIMATIONS, DEFAULT_MAX_ELEMENTS, ResourceBudgetEnforcer,
    ResourceKind,
};
pub use resources::tracker::{
    DEFAULT_AUTO_RELEASE_THRESHOLD, HandleTracker, ReleaseBatch, TrackedHandle, TrackerStats,
};
