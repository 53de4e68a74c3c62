use std::{
    collections::{BTreeSet, HashMap},
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use crate::{
    animation::effect::{EffectKind, TriggerKind},
    foundation::core::{Point, Rect},
    host::api::{
        Created, DocumentApi, EffectId, ElementApi, ElementId, Fill, FontSpec, HandleId,
        HandleRelease, Host, HostCapabilities, HostError, HostResult, LineStyle, PageId,
        ShapeKind, TimelineApi,
    },
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// What kind of element a creation call produced.
pub enum RecordedKind {
    /// Autoshape.
    Shape(ShapeKind),
    /// Text box.
    TextBox,
    /// Straight connector.
    Connector {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
    },
    /// Group of earlier elements.
    Group {
        /// Grouped elements.
        members: Vec<ElementId>,
    },
    /// Speaker-notes region of a page.
    Notes,
}

impl RecordedKind {
    /// Whether the element is drawn on the page canvas (groups and notes are not).
    pub fn is_visual(&self) -> bool {
        !matches!(self, Self::Group { .. } | Self::Notes)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// An element as the host last saw it.
pub struct RecordedElement {
    /// Element id.
    pub id: ElementId,
    /// Owning page.
    pub page: PageId,
    /// Creation kind.
    pub kind: RecordedKind,
    /// Frame for shapes and text boxes.
    pub frame: Option<Rect>,
    /// Carried text.
    pub text: String,
    /// Last fill set.
    pub fill: Option<Fill>,
    /// Last outline set.
    pub line: Option<LineStyle>,
    /// Last font set.
    pub font: Option<FontSpec>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// An appended timeline effect.
pub struct RecordedEffect {
    /// Effect id.
    pub id: EffectId,
    /// Owning page.
    pub page: PageId,
    /// Animated element.
    pub target: ElementId,
    /// Effect kind.
    pub kind: EffectKind,
    /// Trigger.
    pub trigger: TriggerKind,
    /// Duration, once set.
    pub duration_s: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
/// Everything the host was asked to build. This is what [`DocumentApi::save`] writes.
pub struct RecordedDocument {
    /// Pages in creation order.
    pub pages: Vec<PageId>,
    /// Elements in creation order.
    pub elements: Vec<RecordedElement>,
    /// Effects in append order.
    pub effects: Vec<RecordedEffect>,
}

#[derive(Clone, Copy, Debug)]
enum FailurePlan {
    Always,
    /// Fail only the n-th call (1-based) of the operation.
    Nth(u64),
}

/// In-memory host that records every call.
///
/// Enforces a live-handle ceiling the way a real automation host exhausts its reference pool,
/// rejects double releases, and supports failure injection per operation. Used for dry runs and
/// tests.
#[derive(Debug)]
pub struct RecordingHost {
    caps: HostCapabilities,
    pool_limit: Option<usize>,
    doc: RecordedDocument,
    next_handle: u64,
    live: BTreeSet<HandleId>,
    released: Vec<HandleId>,
    peak_live: usize,
    reclaims: usize,
    calls: HashMap<&'static str, u64>,
    total_calls: u64,
    failures: HashMap<&'static str, FailurePlan>,
    unavailable_after: Option<u64>,
    saved_to: Option<PathBuf>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new(HostCapabilities::default())
    }
}

impl RecordingHost {
    pub fn new(caps: HostCapabilities) -> Self {
        Self {
            caps,
            pool_limit: None,
            doc: RecordedDocument::default(),
            next_handle: 0,
            live: BTreeSet::new(),
            released: Vec::new(),
            peak_live: 0,
            reclaims: 0,
            calls: HashMap::new(),
            total_calls: 0,
            failures: HashMap::new(),
            unavailable_after: None,
            saved_to: None,
        }
    }

    /// Refuse new handles while `limit` are live.
    pub fn with_pool_limit(mut self, limit: usize) -> Self {
        self.pool_limit = Some(limit);
        self
    }

    /// Make every call of `op` fail.
    pub fn fail_always(&mut self, op: &'static str) {
        self.failures.insert(op, FailurePlan::Always);
    }

    /// Make only the `n`-th call (1-based) of `op` fail.
    pub fn fail_nth(&mut self, op: &'static str, n: u64) {
        self.failures.insert(op, FailurePlan::Nth(n));
    }

    /// Stop answering once `calls` host calls have been made.
    pub fn go_unavailable_after(&mut self, calls: u64) {
        self.unavailable_after = Some(calls);
    }

    pub fn document(&self) -> &RecordedDocument {
        &self.doc
    }

    pub fn element(&self, id: ElementId) -> Option<&RecordedElement> {
        self.doc.elements.iter().find(|e| e.id == id)
    }

    pub fn elements_on(&self, page: PageId) -> impl Iterator<Item = &RecordedElement> {
        self.doc.elements.iter().filter(move |e| e.page == page)
    }

    pub fn effects_on(&self, page: PageId) -> impl Iterator<Item = &RecordedEffect> {
        self.doc.effects.iter().filter(move |e| e.page == page)
    }

    /// Elements drawn on `page`, leaving out groups and the notes region.
    pub fn visual_elements_on(&self, page: PageId) -> impl Iterator<Item = &RecordedElement> {
        self.elements_on(page).filter(|e| e.kind.is_visual())
    }

    /// Handles issued and not yet released.
    pub fn live_handles(&self) -> usize {
        self.live.len()
    }

    pub fn peak_live_handles(&self) -> usize {
        self.peak_live
    }

    /// Released handles in release order.
    pub fn released(&self) -> &[HandleId] {
        &self.released
    }

    pub fn reclaim_passes(&self) -> usize {
        self.reclaims
    }

    /// How many times `op` was called (including failed calls).
    pub fn call_count(&self, op: &str) -> u64 {
        self.calls.get(op).copied().unwrap_or(0)
    }

    pub fn saved_to(&self) -> Option<&Path> {
        self.saved_to.as_deref()
    }

    fn enter(&mut self, op: &'static str) -> HostResult<()> {
        if let Some(limit) = self.unavailable_after
            && self.total_calls >= limit
        {
            return Err(HostError::unavailable(format!("no response to '{op}'")));
        }
        self.total_calls += 1;
        let n = {
            let c = self.calls.entry(op).or_insert(0);
            *c += 1;
            *c
        };
        match self.failures.get(op) {
            Some(FailurePlan::Always) => Err(HostError::call(op, "injected failure")),
            Some(FailurePlan::Nth(k)) if *k == n => Err(HostError::call(op, "injected failure")),
            _ => Ok(()),
        }
    }

    fn issue_handle(&mut self) -> HostResult<HandleId> {
        if let Some(limit) = self.pool_limit
            && self.live.len() >= limit
        {
            return Err(HostError::Exhausted {
                live: self.live.len(),
                limit,
            });
        }
        self.next_handle += 1;
        let h = HandleId(self.next_handle);
        self.live.insert(h);
        self.peak_live = self.peak_live.max(self.live.len());
        Ok(h)
    }

    fn create_element(
        &mut self,
        page: PageId,
        kind: RecordedKind,
        frame: Option<Rect>,
        text: &str,
    ) -> HostResult<Created<ElementId>> {
        if !self.doc.pages.contains(&page) {
            return Err(HostError::call("create", format!("no page {}", page.0)));
        }
        let handle = self.issue_handle()?;
        let id = ElementId(self.doc.elements.len() as u64 + 1);
        self.doc.elements.push(RecordedElement {
            id,
            page,
            kind,
            frame,
            text: text.to_string(),
            fill: None,
            line: None,
            font: None,
        });
        Ok(Created { id, handle })
    }

    fn element_mut(&mut self, op: &'static str, id: ElementId) -> HostResult<&mut RecordedElement> {
        self.doc
            .elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| HostError::call(op, format!("no element {}", id.0)))
    }
}

impl HandleRelease for RecordingHost {
    fn release_handle(&mut self, handle: HandleId) -> HostResult<()> {
        self.enter("release")?;
        if !self.live.remove(&handle) {
            return Err(HostError::StaleHandle(handle));
        }
        self.released.push(handle);
        Ok(())
    }

    fn reclaim(&mut self) {
        self.reclaims += 1;
    }
}

impl ElementApi for RecordingHost {
    fn add_shape(
        &mut self,
        page: PageId,
        shape: ShapeKind,
        frame: Rect,
    ) -> HostResult<Created<ElementId>> {
        self.enter("add_shape")?;
        self.create_element(page, RecordedKind::Shape(shape), Some(frame), "")
    }

    fn add_text_box(
        &mut self,
        page: PageId,
        frame: Rect,
        text: &str,
    ) -> HostResult<Created<ElementId>> {
        self.enter("add_text_box")?;
        self.create_element(page, RecordedKind::TextBox, Some(frame), text)
    }

    fn add_connector(
        &mut self,
        page: PageId,
        from: Point,
        to: Point,
    ) -> HostResult<Created<ElementId>> {
        self.enter("add_connector")?;
        self.create_element(page, RecordedKind::Connector { from, to }, None, "")
    }

    fn group(&mut self, page: PageId, members: &[ElementId]) -> HostResult<Created<ElementId>> {
        self.enter("group")?;
        if members.len() < 2 {
            return Err(HostError::call("group", "a group needs at least two members"));
        }
        if let Some(m) = members
            .iter()
            .find(|m| !self.doc.elements.iter().any(|e| e.id == **m && e.page == page))
        {
            return Err(HostError::call(
                "group",
                format!("no element {} on page {}", m.0, page.0),
            ));
        }
        self.create_element(
            page,
            RecordedKind::Group {
                members: members.to_vec(),
            },
            None,
            "",
        )
    }

    fn set_text(&mut self, element: ElementId, text: &str) -> HostResult<()> {
        self.enter("set_text")?;
        self.element_mut("set_text", element)?.text = text.to_string();
        Ok(())
    }

    fn set_fill(&mut self, element: ElementId, fill: Fill) -> HostResult<()> {
        self.enter("set_fill")?;
        if matches!(fill, Fill::Theme(_)) && !self.caps.theme_colors {
            return Err(HostError::call("set_fill", "theme colors unsupported"));
        }
        self.element_mut("set_fill", element)?.fill = Some(fill);
        Ok(())
    }

    fn set_line(&mut self, element: ElementId, line: LineStyle) -> HostResult<()> {
        self.enter("set_line")?;
        self.element_mut("set_line", element)?.line = Some(line);
        Ok(())
    }

    fn set_font(&mut self, element: ElementId, font: &FontSpec) -> HostResult<()> {
        self.enter("set_font")?;
        if font.bold && !self.caps.font_weight {
            return Err(HostError::call("set_font", "font weight unsupported"));
        }
        self.element_mut("set_font", element)?.font = Some(font.clone());
        Ok(())
    }

    fn set_frame(&mut self, element: ElementId, frame: Rect) -> HostResult<()> {
        self.enter("set_frame")?;
        self.element_mut("set_frame", element)?.frame = Some(frame);
        Ok(())
    }
}

impl TimelineApi for RecordingHost {
    fn append_effect(
        &mut self,
        page: PageId,
        target: ElementId,
        kind: EffectKind,
        trigger: TriggerKind,
    ) -> HostResult<Created<EffectId>> {
        self.enter("append_effect")?;
        if !self.doc.elements.iter().any(|e| e.id == target && e.page == page) {
            return Err(HostError::call(
                "append_effect",
                format!("no element {} on page {}", target.0, page.0),
            ));
        }
        let handle = self.issue_handle()?;
        let id = EffectId(self.doc.effects.len() as u64 + 1);
        self.doc.effects.push(RecordedEffect {
            id,
            page,
            target,
            kind,
            trigger,
            duration_s: None,
        });
        Ok(Created { id, handle })
    }

    fn set_effect_duration(&mut self, effect: EffectId, secs: f64) -> HostResult<()> {
        self.enter("set_effect_duration")?;
        let e = self
            .doc
            .effects
            .iter_mut()
            .find(|e| e.id == effect)
            .ok_or_else(|| {
                HostError::call("set_effect_duration", format!("no effect {}", effect.0))
            })?;
        e.duration_s = Some(secs);
        Ok(())
    }
}

impl DocumentApi for RecordingHost {
    fn add_page(&mut self) -> HostResult<Created<PageId>> {
        self.enter("add_page")?;
        let handle = self.issue_handle()?;
        let id = PageId(self.doc.pages.len() as u32);
        self.doc.pages.push(id);
        Ok(Created { id, handle })
    }

    fn notes_region(&mut self, page: PageId) -> HostResult<Created<ElementId>> {
        self.enter("notes_region")?;
        self.create_element(page, RecordedKind::Notes, None, "")
    }

    fn save(&mut self, path: &Path) -> HostResult<()> {
        self.enter("save")?;
        let f = File::create(path)
            .map_err(|e| HostError::call("save", format!("create '{}': {e}", path.display())))?;
        serde_json::to_writer_pretty(BufWriter::new(f), &self.doc)
            .map_err(|e| HostError::call("save", format!("write '{}': {e}", path.display())))?;
        self.saved_to = Some(path.to_path_buf());
        Ok(())
    }
}

impl Host for RecordingHost {
    fn capabilities(&self) -> HostCapabilities {
        self.caps
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/recording.rs"]
mod tests;
