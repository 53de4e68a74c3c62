use crate::{
    animation::sequencer::AppliedEffect,
    foundation::core::{ColorTag, Point, Rect, Size},
    host::api::{ElementId, PageId},
    resources::budget::{BudgetCounters, ResourceKind},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A node that exists on the page.
pub struct GraphNode {
    /// Node id from the content.
    pub id: String,
    /// Visible text.
    pub label: String,
    /// Center position.
    pub center: Point,
    /// Node size.
    pub size: Size,
    /// Fill tag.
    pub color: ColorTag,
    /// Host element.
    pub element: ElementId,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// An edge that exists on the page. Both endpoints are nodes of the same page.
pub struct GraphEdge {
    /// Source node id.
    pub from: String,
    /// Target node id.
    pub to: String,
    /// Badge text.
    pub label: String,
    /// Midpoint where the badge sits.
    pub anchor: Point,
    /// Line element.
    pub line: ElementId,
    /// Badge element, when the edge is labeled and the badge was created.
    pub badge: Option<ElementId>,
    /// Group holding the line and its badge.
    pub group: Option<ElementId>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A legend swatch that exists on the page.
pub struct LegendEntry {
    /// Visible text.
    pub label: String,
    /// Swatch tag.
    pub color: ColorTag,
    /// Host element.
    pub element: ElementId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Column of a two-column page.
pub enum ColumnSide {
    /// Left column.
    Left,
    /// Right column.
    Right,
}

impl ColumnSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A column item that exists on the page.
pub struct ColumnItem {
    /// Column.
    pub side: ColumnSide,
    /// Index within its column.
    pub index: usize,
    /// Visible text.
    pub text: String,
    /// Frame of the text box.
    pub frame: Rect,
    /// Host element.
    pub element: ElementId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// What a diagnostic refers to.
pub enum SkippedKind {
    Title,
    Subtitle,
    Legend,
    ColumnBackground,
    ColumnHeader,
    Node,
    ColumnItem,
    Edge,
    EdgeBadge,
    Animation,
    Notes,
    /// A setter on an element that was created.
    Style,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Why something was skipped.
pub enum SkipReason {
    /// The page budget for this kind was spent.
    Budget(ResourceKind),
    /// An edge endpoint was declared but not created.
    MissingEndpoint(String),
    /// An edge endpoint was never declared.
    UnknownNode(String),
    /// The host rejected the call.
    HostFailure(String),
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// One diagnostic entry.
pub struct SkippedElement {
    /// What was skipped.
    pub kind: SkippedKind,
    /// Human-readable name (`node:a`, `edge:a->b`, ...).
    pub name: String,
    /// Cause.
    pub reason: SkipReason,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Whether every requested item of a step was created.
pub enum Completion {
    Partial,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Animation step outcome.
pub enum AnimationOutcome {
    Partial,
    Complete,
    Skipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "detail")]
/// Page construction states, in the order a page passes through them.
pub enum PageState {
    Created,
    TitleAdded,
    ContentPopulated(Completion),
    AnimationsApplied(AnimationOutcome),
    NotesAttached,
    Finalized,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
/// What the end-of-page flush did.
pub struct FlushSummary {
    /// Release passes.
    pub batches: usize,
    /// Handles released.
    pub released: usize,
    /// Handles whose release failed (dropped from tracking anyway).
    pub failed: usize,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Everything that was built on one page, plus what was not and why.
pub struct PageDescriptor {
    /// Position of the page in the deck.
    pub index: usize,
    /// Host page.
    pub page: PageId,
    /// Title element.
    pub title: Option<ElementId>,
    /// Subtitle element.
    pub subtitle: Option<ElementId>,
    /// Notes region that received the notes text.
    pub notes: Option<ElementId>,
    /// Created nodes in declaration order.
    pub nodes: Vec<GraphNode>,
    /// Created edges in declaration order.
    pub edges: Vec<GraphEdge>,
    /// Created legend entries.
    pub legend: Vec<LegendEntry>,
    /// Created column items, left column first.
    pub columns: Vec<ColumnItem>,
    /// Column panels and headers.
    pub decorations: Vec<ElementId>,
    /// Applied effects in application order.
    pub animations: Vec<AppliedEffect>,
    /// End of the page timeline in seconds.
    pub timeline_end_s: f64,
    /// States visited.
    pub transitions: Vec<PageState>,
    /// Everything requested but not built.
    pub skipped: Vec<SkippedElement>,
    /// Budget use at the end of the page.
    pub budget: BudgetCounters,
    /// End-of-page release.
    pub flush: FlushSummary,
    /// Set when the host became unavailable mid-page; later steps were not attempted.
    pub fatal: Option<String>,
}

impl PageDescriptor {
    pub(crate) fn new(index: usize, page: PageId, budget: BudgetCounters) -> Self {
        Self {
            index,
            page,
            title: None,
            subtitle: None,
            notes: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            legend: Vec::new(),
            columns: Vec::new(),
            decorations: Vec::new(),
            animations: Vec::new(),
            timeline_end_s: 0.0,
            transitions: vec![PageState::Created],
            skipped: Vec::new(),
            budget,
            flush: FlushSummary::default(),
            fatal: None,
        }
    }

    /// Last state reached.
    pub fn state(&self) -> PageState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(PageState::Created)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Diagnostics of one kind.
    pub fn skipped_of(&self, kind: SkippedKind) -> impl Iterator<Item = &SkippedElement> {
        self.skipped.iter().filter(move |s| s.kind == kind)
    }

    /// Number of visual elements created on the page. Groups and the notes region do not count.
    pub fn element_count(&self) -> usize {
        usize::from(self.title.is_some())
            + usize::from(self.subtitle.is_some())
            + self.nodes.len()
            + self.edges.len()
            + self.edges.iter().filter(|e| e.badge.is_some()).count()
            + self.legend.len()
            + self.columns.len()
            + self.decorations.len()
    }
}
