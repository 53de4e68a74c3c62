use crate::host::api::ElementId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Host effect kinds the engine requests.
pub enum EffectKind {
    /// Entrance fade.
    Fade,
    /// Emphasis grow/shrink pulse.
    GrowShrink,
    /// Entrance wipe.
    Wipe,
    /// Instant appear.
    Appear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// When an effect starts relative to the page timeline.
pub enum TriggerKind {
    /// Starts a new advance step that waits for user interaction.
    OnClick,
    /// Starts together with the previous effect.
    WithPrevious,
    /// Starts when the previous effect ends.
    AfterPrevious,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// What the animated element is, used to pick a default duration.
pub enum EffectRole {
    /// Diagram node or column item.
    Node,
    /// Diagram edge.
    Edge,
    /// Emphasis on an already visible element.
    Emphasis,
    /// Explanatory text block.
    Text,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Default effect durations in seconds.
pub struct AnimationDurations {
    /// Node entrance fade.
    pub node_fade_s: f64,
    /// Edge entrance fade.
    pub edge_fade_s: f64,
    /// Emphasis grow/shrink.
    pub emphasis_s: f64,
    /// Explanatory text fade.
    pub text_fade_s: f64,
}

impl Default for AnimationDurations {
    fn default() -> Self {
        Self {
            node_fade_s: 0.5,
            edge_fade_s: 0.4,
            emphasis_s: 0.5,
            text_fade_s: 0.7,
        }
    }
}

impl AnimationDurations {
    /// Default duration for an effect of `kind` on an element playing `role`.
    pub fn for_effect(&self, kind: EffectKind, role: EffectRole) -> f64 {
        match (kind, role) {
            (EffectKind::Appear, _) => 0.0,
            (EffectKind::GrowShrink, _) | (_, EffectRole::Emphasis) => self.emphasis_s,
            (_, EffectRole::Node) => self.node_fade_s,
            (_, EffectRole::Edge) => self.edge_fade_s,
            (_, EffectRole::Text) => self.text_fade_s,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One effect to append to a page timeline.
pub struct AnimationEffectRequest {
    /// Element the effect animates.
    pub target: ElementId,
    /// Effect kind.
    pub kind: EffectKind,
    /// Trigger relative to the previous effect.
    pub trigger: TriggerKind,
    /// Role of the target, used when `duration_s` is absent.
    pub role: EffectRole,
    /// Explicit duration; `None` uses [`AnimationDurations::for_effect`].
    pub duration_s: Option<f64>,
}

impl AnimationEffectRequest {
    /// Build a request with the role's default duration.
    pub fn new(
        target: ElementId,
        kind: EffectKind,
        trigger: TriggerKind,
        role: EffectRole,
    ) -> Self {
        Self {
            target,
            kind,
            trigger,
            role,
            duration_s: None,
        }
    }

    /// Override the duration.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_s = Some(secs);
        self
    }

    /// Resolve the duration against `defaults`. Negative or non-finite overrides fall back.
    pub fn resolved_duration(&self, defaults: &AnimationDurations) -> f64 {
        match self.duration_s {
            Some(d) if d.is_finite() && d >= 0.0 => d,
            _ => defaults.for_effect(self.kind, self.role),
        }
    }

    /// Conventional diagram chain: the first target starts on click, the rest follow after the
    /// previous effect.
    pub fn chain(
        targets: impl IntoIterator<Item = (ElementId, EffectRole)>,
        kind: EffectKind,
    ) -> Vec<Self> {
        targets
            .into_iter()
            .enumerate()
            .map(|(i, (target, role))| {
                let trigger = if i == 0 {
                    TriggerKind::OnClick
                } else {
                    TriggerKind::AfterPrevious
                };
                Self::new(target, kind, trigger, role)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/effect.rs"]
mod tests;
