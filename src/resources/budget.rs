/// Default ceiling on elements per page.
pub const DEFAULT_MAX_ELEMENTS: u32 = 25;
/// Default ceiling on animation effects per page.
pub const DEFAULT_MAX_ANIMATIONS: u32 = 25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Budgeted resource kinds.
pub enum ResourceKind {
    /// Visual elements (shapes, text boxes, connectors).
    Element,
    /// Animation effects on the page timeline.
    Animation,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Element => f.write_str("element"),
            Self::Animation => f.write_str("animation"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Per-page counters.
pub struct BudgetCounters {
    /// Elements reserved on the current page.
    pub elements: u32,
    /// Element ceiling.
    pub max_elements: u32,
    /// Animations reserved on the current page.
    pub animations: u32,
    /// Animation ceiling.
    pub max_animations: u32,
}

impl BudgetCounters {
    fn slot(&mut self, kind: ResourceKind) -> (&mut u32, u32) {
        match kind {
            ResourceKind::Element => (&mut self.elements, self.max_elements),
            ResourceKind::Animation => (&mut self.animations, self.max_animations),
        }
    }
}

/// Hard per-page ceilings on element and animation counts.
///
/// A denied reservation is not an error: callers skip the creation it guarded.
#[derive(Clone, Debug)]
pub struct ResourceBudgetEnforcer {
    counters: BudgetCounters,
}

impl Default for ResourceBudgetEnforcer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ELEMENTS, DEFAULT_MAX_ANIMATIONS)
    }
}

impl ResourceBudgetEnforcer {
    pub fn new(max_elements: u32, max_animations: u32) -> Self {
        Self {
            counters: BudgetCounters {
                elements: 0,
                max_elements,
                animations: 0,
                max_animations,
            },
        }
    }

    /// Zero all counters. Called once per page.
    pub fn reset(&mut self) {
        self.counters.elements = 0;
        self.counters.animations = 0;
    }

    /// Reserve `count` units of `kind` if that keeps the counter within its maximum.
    pub fn try_reserve(&mut self, kind: ResourceKind, count: u32) -> bool {
        let (current, max) = self.counters.slot(kind);
        match current.checked_add(count) {
            Some(next) if next <= max => {
                *current = next;
                true
            }
            _ => {
                tracing::debug!(%kind, requested = count, used = *current, max, "budget denied");
                false
            }
        }
    }

    /// Units of `kind` still available on this page.
    pub fn remaining(&self, kind: ResourceKind) -> u32 {
        let c = self.counters;
        match kind {
            ResourceKind::Element => c.max_elements.saturating_sub(c.elements),
            ResourceKind::Animation => c.max_animations.saturating_sub(c.animations),
        }
    }

    /// Snapshot of the counters.
    pub fn counters(&self) -> BudgetCounters {
        self.counters
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resources/budget.rs"]
mod tests;
