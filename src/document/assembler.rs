use std::collections::{HashMap, HashSet};

use crate::{
    animation::effect::{AnimationEffectRequest, EffectRole},
    animation::sequencer::{AnimationSequencer, DropReason},
    document::content::{ContentSpec, GraphSpec, PageContent, TwoColumnSpec},
    document::context::GenerationContext,
    document::page::{
        AnimationOutcome, ColumnItem, ColumnSide, Completion, FlushSummary, GraphEdge, GraphNode,
        LegendEntry, PageDescriptor, PageState, SkipReason, SkippedElement, SkippedKind,
    },
    document::session::{CreateError, PageSession},
    foundation::config::EngineConfig,
    foundation::core::{ColorTag, Point, Rect, Size},
    foundation::error::{SlidewrightError, SlidewrightResult},
    host::api::{
        Created, ElementId, Host, HostCapabilities, HostError, HostResult, LineStyle, PageId,
        ShapeKind,
    },
    host::capability::{EdgePrimitive, StyleAdapter},
    layout::diagram::{PageRegions, column_layout, edge_anchor, graph_positions, node_frame},
    resources::budget::ResourceKind,
};

const LEGEND_ROW_HEIGHT: f64 = 26.0;
const LEGEND_ROW_GAP: f64 = 6.0;
const COLUMN_PADDING: f64 = 12.0;
const EDGE_WEIGHT_PT: f64 = 1.5;
const MIN_LINE_THICKNESS: f64 = 2.0;

/// Builds pages from content specs against a host.
///
/// Holds only immutable run settings; the mutable run state lives in [`GenerationContext`].
#[derive(Clone, Debug)]
pub struct DocumentAssembler {
    config: EngineConfig,
    style: StyleAdapter,
    sequencer: AnimationSequencer,
    regions: PageRegions,
}

impl DocumentAssembler {
    pub fn new(config: EngineConfig, caps: HostCapabilities) -> Self {
        let sequencer = AnimationSequencer::new(
            config.durations,
            config.release_every,
            config.release_batch,
        );
        let regions = PageRegions::for_canvas(config.canvas);
        Self {
            style: StyleAdapter::select(caps),
            sequencer,
            regions,
            config,
        }
    }

    /// Read the host's capabilities once and build an assembler for it.
    pub fn for_host<H: Host + ?Sized>(config: EngineConfig, host: &H) -> Self {
        Self::new(config, host.capabilities())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn regions(&self) -> &PageRegions {
        &self.regions
    }

    /// Build one page.
    ///
    /// Fails only when the page itself cannot be created. Every later failure is contained in
    /// the step where it happened and reported in the descriptor; a host that stops answering
    /// mid-page ends the page early with [`PageDescriptor::fatal`] set. Tracked handles are
    /// released before returning on every path.
    #[tracing::instrument(skip(self, host, ctx, spec), fields(title = %spec.title))]
    pub fn assemble_page<H: Host + ?Sized>(
        &self,
        host: &mut H,
        ctx: &mut GenerationContext,
        index: usize,
        spec: &ContentSpec,
    ) -> SlidewrightResult<PageDescriptor> {
        let session = PageSession::open(host, ctx).map_err(|err| {
            tracing::error!(error = %err, "page could not be created");
            SlidewrightError::Host(err)
        })?;
        let counters = session.context().budget().counters();
        let desc = PageDescriptor::new(index, session.page(), counters);
        let mut build = PageBuild { session, desc };

        if let Err(err) = self.run_steps(&mut build, spec) {
            tracing::error!(error = %err, "host unavailable; abandoning remaining page steps");
            build.desc.fatal = Some(err.to_string());
        }

        let PageBuild { session, mut desc } = build;
        desc.budget = session.context().budget().counters();
        let batches = session.finish();
        desc.flush = FlushSummary {
            batches: batches.len(),
            released: batches.iter().map(|b| b.released.len()).sum(),
            failed: batches.iter().map(|b| b.failed.len()).sum(),
        };
        desc.transitions.push(PageState::Finalized);

        tracing::info!(
            elements = desc.element_count(),
            animations = desc.animations.len(),
            skipped = desc.skipped.len(),
            "page finalized"
        );
        Ok(desc)
    }

    fn run_steps<H: Host + ?Sized>(
        &self,
        b: &mut PageBuild<'_, H>,
        spec: &ContentSpec,
    ) -> Result<(), HostError> {
        self.add_headings(b, spec)?;
        b.advance(PageState::TitleAdded);

        let before = b.desc.skipped.len();
        let targets = match &spec.content {
            PageContent::Graph(g) => self.populate_graph(b, g)?,
            PageContent::TwoColumn(c) => self.populate_columns(b, c)?,
        };
        let partial = b.desc.skipped[before..]
            .iter()
            .any(|s| s.kind != SkippedKind::Style);
        b.advance(PageState::ContentPopulated(if partial {
            Completion::Partial
        } else {
            Completion::Complete
        }));

        let outcome = if spec.animate && !targets.is_empty() {
            self.animate(b, targets)?
        } else {
            AnimationOutcome::Skipped
        };
        b.advance(PageState::AnimationsApplied(outcome));

        if let Some(notes) = spec.notes.as_deref().filter(|n| !n.trim().is_empty())
            && self.attach_notes(b, notes)?
        {
            b.advance(PageState::NotesAttached);
        }
        Ok(())
    }

    fn add_headings<H: Host + ?Sized>(
        &self,
        b: &mut PageBuild<'_, H>,
        spec: &ContentSpec,
    ) -> Result<(), HostError> {
        if !spec.title.trim().is_empty() {
            let frame = self.regions.title;
            if let Attempt::Created(id) = b.attempt(SkippedKind::Title, "title", 1, |h, p| {
                h.add_text_box(p, frame, &spec.title)
            })? {
                b.desc.title = Some(id);
                let font = self
                    .style
                    .font(self.config.title_font_pt, true, &ColorTag::new("text"));
                let r = b.session.host().set_font(id, &font);
                b.styled("title", "font", r)?;
                // Hosts autofit text boxes on font changes; keep the title in its band.
                let r = b.session.host().set_frame(id, frame);
                b.styled("title", "frame", r)?;
            }
        }

        if let Some(sub) = spec.subtitle.as_deref().filter(|s| !s.trim().is_empty()) {
            let frame = self.regions.subtitle;
            if let Attempt::Created(id) = b.attempt(SkippedKind::Subtitle, "subtitle", 1, |h, p| {
                h.add_text_box(p, frame, sub)
            })? {
                b.desc.subtitle = Some(id);
                let font = self
                    .style
                    .font(self.config.body_font_pt, false, &ColorTag::new("muted"));
                let r = b.session.host().set_font(id, &font);
                b.styled("subtitle", "font", r)?;
                let r = b.session.host().set_frame(id, frame);
                b.styled("subtitle", "frame", r)?;
            }
        }
        Ok(())
    }

    fn populate_graph<H: Host + ?Sized>(
        &self,
        b: &mut PageBuild<'_, H>,
        g: &GraphSpec,
    ) -> Result<Vec<(ElementId, EffectRole)>, HostError> {
        // Legend.
        let rows = column_layout(
            self.regions.legend,
            g.legend.len(),
            LEGEND_ROW_HEIGHT,
            LEGEND_ROW_GAP,
        );
        let mut exhausted = false;
        for (i, (item, frame)) in g.legend.iter().zip(rows).enumerate() {
            let name = format!("legend:{}", item.label);
            if exhausted {
                b.skip(SkippedKind::Legend, name, SkipReason::Budget(ResourceKind::Element));
                continue;
            }
            match b.attempt(SkippedKind::Legend, &name, 1, |h, p| {
                h.add_shape(p, ShapeKind::Rectangle, frame)
            })? {
                Attempt::Created(id) => {
                    let color = item.color.clone().unwrap_or_else(|| ColorTag::accent(i));
                    self.label_shape(b, id, &name, &color, &item.label, self.config.label_font_pt)?;
                    b.desc.legend.push(LegendEntry {
                        label: item.label.clone(),
                        color,
                        element: id,
                    });
                }
                Attempt::OverBudget => exhausted = true,
                Attempt::Failed => {}
            }
        }

        // Nodes, positioned for the declared count so placement never depends on the budget.
        let layout = g.layout.unwrap_or(self.config.graph_layout);
        let size = self.config.node_size;
        let radius = self.regions.fitted_radius(self.config.radial_radius, size);
        let positions = graph_positions(
            layout,
            self.regions.content.center(),
            radius,
            self.config.triad_scale,
            g.nodes.len(),
        );

        let mut created = HashMap::<&str, (Point, ElementId)>::new();
        let mut targets = Vec::new();
        let mut exhausted = false;
        for (i, (node, center)) in g.nodes.iter().zip(positions).enumerate() {
            let name = format!("node:{}", node.id);
            if exhausted {
                b.skip(SkippedKind::Node, name, SkipReason::Budget(ResourceKind::Element));
                continue;
            }
            let frame = node_frame(center, size);
            match b.attempt(SkippedKind::Node, &name, 1, |h, p| {
                h.add_shape(p, ShapeKind::RoundedRectangle, frame)
            })? {
                Attempt::Created(id) => {
                    let color = node.color.clone().unwrap_or_else(|| ColorTag::accent(i));
                    self.label_shape(b, id, &name, &color, &node.label, self.config.body_font_pt)?;
                    created.entry(node.id.as_str()).or_insert((center, id));
                    targets.push((id, EffectRole::Node));
                    b.desc.nodes.push(GraphNode {
                        id: node.id.clone(),
                        label: node.label.clone(),
                        center,
                        size,
                        color,
                        element: id,
                    });
                }
                Attempt::OverBudget => exhausted = true,
                Attempt::Failed => {}
            }
        }

        // Edges, only between nodes that exist.
        let declared: HashSet<&str> = g.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut exhausted = false;
        let mut edge_targets = Vec::new();
        for e in &g.edges {
            let name = format!("edge:{}->{}", e.from, e.to);
            let missing = [e.from.as_str(), e.to.as_str()]
                .into_iter()
                .find(|id| !created.contains_key(id));
            if let Some(id) = missing {
                let reason = if declared.contains(id) {
                    SkipReason::MissingEndpoint(id.to_string())
                } else {
                    SkipReason::UnknownNode(id.to_string())
                };
                b.skip(SkippedKind::Edge, name, reason);
                continue;
            }
            let labeled = !e.label.trim().is_empty();
            if exhausted || !b.session.reserve(ResourceKind::Element, 1 + u32::from(labeled)) {
                exhausted = true;
                b.skip(SkippedKind::Edge, name, SkipReason::Budget(ResourceKind::Element));
                continue;
            }

            let (from, _) = created[e.from.as_str()];
            let (to, _) = created[e.to.as_str()];
            let primitive = self.style.edge_primitive();
            let line = match b
                .session
                .create_reserved(|h, p| draw_edge(h, p, primitive, from, to))
            {
                Ok(id) => id,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    b.skip(SkippedKind::Edge, name, SkipReason::HostFailure(err.to_string()));
                    continue;
                }
            };
            let stroke = LineStyle {
                color: self.style.text_color(&ColorTag::new("muted")),
                weight_pt: EDGE_WEIGHT_PT,
            };
            let r = b.session.host().set_line(line, stroke);
            b.styled(&name, "line", r)?;

            let anchor = edge_anchor(from, to);
            let (badge, group) = if labeled {
                match self.add_badge(b, &name, anchor, &e.label)? {
                    Some(badge) => (Some(badge), b.group(&name, &[line, badge])?),
                    None => (None, None),
                }
            } else {
                (None, None)
            };
            edge_targets.push((line, EffectRole::Edge));
            b.desc.edges.push(GraphEdge {
                from: e.from.clone(),
                to: e.to.clone(),
                label: e.label.clone(),
                anchor,
                line,
                badge,
                group,
            });
        }

        targets.extend(edge_targets);
        Ok(targets)
    }

    fn add_badge<H: Host + ?Sized>(
        &self,
        b: &mut PageBuild<'_, H>,
        edge_name: &str,
        anchor: Point,
        label: &str,
    ) -> Result<Option<ElementId>, HostError> {
        let pt = self.config.label_font_pt;
        let size = Size::new(
            (label.chars().count() as f64 * pt * 0.6 + 16.0).max(36.0),
            pt * 2.0,
        );
        let frame = Rect::from_center_size(anchor, size);
        let name = format!("{edge_name} badge");
        match b
            .session
            .create_reserved(|h, p| h.add_shape(p, ShapeKind::Ellipse, frame))
        {
            Ok(id) => {
                self.label_shape(b, id, &name, &ColorTag::new("background"), label, pt)?;
                Ok(Some(id))
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                b.skip(SkippedKind::EdgeBadge, name, SkipReason::HostFailure(err.to_string()));
                Ok(None)
            }
        }
    }

    fn populate_columns<H: Host + ?Sized>(
        &self,
        b: &mut PageBuild<'_, H>,
        c: &TwoColumnSpec,
    ) -> Result<Vec<(ElementId, EffectRole)>, HostError> {
        let columns = [
            (
                ColumnSide::Left,
                self.regions.left_column,
                c.left_header.as_deref(),
                &c.left_items,
            ),
            (
                ColumnSide::Right,
                self.regions.right_column,
                c.right_header.as_deref(),
                &c.right_items,
            ),
        ];
        let row_h = self.config.column_row_height;

        // Panels and headers.
        let mut bodies = Vec::with_capacity(2);
        for (side, region, header, items) in columns {
            let header = header.filter(|h| !h.trim().is_empty());
            let inner = region.inset(-COLUMN_PADDING);
            if items.is_empty() && header.is_none() {
                bodies.push(inner);
                continue;
            }

            let panel_name = format!("column:{}", side.as_str());
            let panel = b.attempt(SkippedKind::ColumnBackground, &panel_name, 1, |h, p| {
                h.add_shape(p, ShapeKind::RoundedRectangle, region)
            })?;
            if let Attempt::Created(id) = panel {
                let r = b
                    .session
                    .host()
                    .set_fill(id, self.style.fill(&ColorTag::new("background")));
                b.styled(&panel_name, "fill", r)?;
                b.desc.decorations.push(id);
            }

            let mut body = inner;
            if let Some(text) = header {
                let frame = Rect::new(inner.x0, inner.y0, inner.x1, inner.y0 + row_h);
                body.y0 = (frame.y1 + self.config.column_row_gap).min(inner.y1);
                let name = format!("header:{}", side.as_str());
                let created = b.attempt(SkippedKind::ColumnHeader, &name, 1, |h, p| {
                    h.add_text_box(p, frame, text)
                })?;
                if let Attempt::Created(id) = created {
                    let font = self
                        .style
                        .font(self.config.body_font_pt, true, &ColorTag::new("text"));
                    let r = b.session.host().set_font(id, &font);
                    b.styled(&name, "font", r)?;
                    b.desc.decorations.push(id);
                }
            }
            bodies.push(body);
        }

        // Items, left column first, each column top-down.
        let mut targets = Vec::new();
        let mut exhausted = false;
        for ((side, _, _, items), body) in columns.into_iter().zip(bodies) {
            let rows = column_layout(body, items.len(), row_h, self.config.column_row_gap);
            for (index, (text, frame)) in items.iter().zip(rows).enumerate() {
                let name = format!("{}:{index}", side.as_str());
                if exhausted {
                    b.skip(
                        SkippedKind::ColumnItem,
                        name,
                        SkipReason::Budget(ResourceKind::Element),
                    );
                    continue;
                }
                match b.attempt(SkippedKind::ColumnItem, &name, 1, |h, p| {
                    h.add_text_box(p, frame, text)
                })? {
                    Attempt::Created(id) => {
                        let font = self
                            .style
                            .font(self.config.body_font_pt, false, &ColorTag::new("text"));
                        let r = b.session.host().set_font(id, &font);
                        b.styled(&name, "font", r)?;
                        targets.push((id, EffectRole::Text));
                        b.desc.columns.push(ColumnItem {
                            side,
                            index,
                            text: text.clone(),
                            frame,
                            element: id,
                        });
                    }
                    Attempt::OverBudget => exhausted = true,
                    Attempt::Failed => {}
                }
            }
        }
        Ok(targets)
    }

    fn animate<H: Host + ?Sized>(
        &self,
        b: &mut PageBuild<'_, H>,
        targets: Vec<(ElementId, EffectRole)>,
    ) -> Result<AnimationOutcome, HostError> {
        let requests = AnimationEffectRequest::chain(targets, self.config.entrance_effect);
        let report = self.sequencer.apply(&mut b.session, &requests);

        for dropped in &report.dropped {
            let reason = match &dropped.reason {
                DropReason::Budget => SkipReason::Budget(ResourceKind::Animation),
                DropReason::HostFailure(msg) => SkipReason::HostFailure(msg.clone()),
            };
            b.skip(
                SkippedKind::Animation,
                format!("effect:{}", dropped.target.0),
                reason,
            );
        }
        b.desc.timeline_end_s = report.timeline_end_s;
        let complete = report.dropped.is_empty() && report.fatal.is_none();
        b.desc.animations = report.applied;

        if let Some(err) = report.fatal {
            return Err(err);
        }
        Ok(if complete {
            AnimationOutcome::Complete
        } else {
            AnimationOutcome::Partial
        })
    }

    fn attach_notes<H: Host + ?Sized>(
        &self,
        b: &mut PageBuild<'_, H>,
        notes: &str,
    ) -> Result<bool, HostError> {
        // The notes region lives outside the page canvas and is not budgeted.
        let region = match b.session.create_reserved(|h, p| h.notes_region(p)) {
            Ok(id) => id,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                b.skip(
                    SkippedKind::Notes,
                    "notes".to_string(),
                    SkipReason::HostFailure(err.to_string()),
                );
                return Ok(false);
            }
        };
        match b.session.host().set_text(region, notes) {
            Ok(()) => {
                b.desc.notes = Some(region);
                Ok(true)
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                b.skip(
                    SkippedKind::Notes,
                    "notes".to_string(),
                    SkipReason::HostFailure(err.to_string()),
                );
                Ok(false)
            }
        }
    }

    fn label_shape<H: Host + ?Sized>(
        &self,
        b: &mut PageBuild<'_, H>,
        id: ElementId,
        name: &str,
        color: &ColorTag,
        text: &str,
        size_pt: f64,
    ) -> Result<(), HostError> {
        let r = b.session.host().set_fill(id, self.style.fill(color));
        b.styled(name, "fill", r)?;
        let r = b.session.host().set_text(id, text);
        b.styled(name, "text", r)?;
        let font = self.style.font(size_pt, false, &ColorTag::new("text"));
        let r = b.session.host().set_font(id, &font);
        b.styled(name, "font", r)
    }
}

fn draw_edge<H: Host + ?Sized>(
    host: &mut H,
    page: PageId,
    primitive: EdgePrimitive,
    from: Point,
    to: Point,
) -> HostResult<Created<ElementId>> {
    match primitive {
        EdgePrimitive::Connector => host.add_connector(page, from, to),
        EdgePrimitive::ThinRectangle => {
            let r = Rect::from_points(from, to);
            let grow_x = ((MIN_LINE_THICKNESS - r.width()) / 2.0).max(0.0);
            let grow_y = ((MIN_LINE_THICKNESS - r.height()) / 2.0).max(0.0);
            host.add_shape(page, ShapeKind::Rectangle, r.inflate(grow_x, grow_y))
        }
    }
}

enum Attempt<I> {
    Created(I),
    OverBudget,
    Failed,
}

/// In-progress page: the open session plus the descriptor being filled.
struct PageBuild<'a, H: Host + ?Sized> {
    session: PageSession<'a, H>,
    desc: PageDescriptor,
}

impl<H: Host + ?Sized> PageBuild<'_, H> {
    fn advance(&mut self, state: PageState) {
        tracing::debug!(?state, "page state");
        self.desc.transitions.push(state);
    }

    fn skip(&mut self, kind: SkippedKind, name: String, reason: SkipReason) {
        tracing::warn!(?kind, name = %name, ?reason, "skipped");
        self.desc.skipped.push(SkippedElement { kind, name, reason });
    }

    /// Reserve, create and track one element, recording a diagnostic when nothing was created.
    /// Only a fatal host failure is returned as an error.
    fn attempt<I, F>(
        &mut self,
        kind: SkippedKind,
        name: &str,
        units: u32,
        create: F,
    ) -> Result<Attempt<I>, HostError>
    where
        F: FnOnce(&mut H, PageId) -> HostResult<Created<I>>,
    {
        match self.session.create(units, create) {
            Ok(id) => Ok(Attempt::Created(id)),
            Err(CreateError::Budget(res)) => {
                self.skip(kind, name.to_string(), SkipReason::Budget(res));
                Ok(Attempt::OverBudget)
            }
            Err(CreateError::Host(err)) if err.is_fatal() => Err(err),
            Err(CreateError::Host(err)) => {
                self.skip(kind, name.to_string(), SkipReason::HostFailure(err.to_string()));
                Ok(Attempt::Failed)
            }
        }
    }

    /// Group an edge's parts. The group is tracked but not budgeted; a rejected group leaves the
    /// parts ungrouped.
    fn group(&mut self, name: &str, members: &[ElementId]) -> Result<Option<ElementId>, HostError> {
        match self.session.create_reserved(|h, p| h.group(p, members)) {
            Ok(id) => Ok(Some(id)),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                self.skip(
                    SkippedKind::Style,
                    format!("{name} group"),
                    SkipReason::HostFailure(err.to_string()),
                );
                Ok(None)
            }
        }
    }

    /// Record a failed setter on an existing element. Only a fatal failure is returned.
    fn styled(&mut self, name: &str, what: &str, result: HostResult<()>) -> Result<(), HostError> {
        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                self.skip(
                    SkippedKind::Style,
                    format!("{name} {what}"),
                    SkipReason::HostFailure(err.to_string()),
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/assembler.rs"]
mod tests;
