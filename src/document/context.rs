use crate::{
    foundation::config::EngineConfig,
    resources::budget::ResourceBudgetEnforcer,
    resources::tracker::HandleTracker,
};

/// Mutable state of one generation run: the handle tracker and the per-page budget.
///
/// Created once per run and handed to each page in turn. Nothing else holds these; pages borrow
/// the context exclusively through [`crate::PageSession`], so two pages can never interleave.
#[derive(Debug)]
pub struct GenerationContext {
    pub(crate) tracker: HandleTracker,
    pub(crate) budget: ResourceBudgetEnforcer,
    pub(crate) flush_batch_size: usize,
}

impl GenerationContext {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tracker: HandleTracker::new(config.auto_release_threshold),
            budget: ResourceBudgetEnforcer::new(
                config.max_elements_per_page,
                config.max_animations_per_page,
            ),
            flush_batch_size: config.flush_batch_size,
        }
    }

    pub fn tracker(&self) -> &HandleTracker {
        &self.tracker
    }

    pub fn budget(&self) -> &ResourceBudgetEnforcer {
        &self.budget
    }
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
