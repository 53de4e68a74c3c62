use crate::{
    animation::effect::{AnimationDurations, AnimationEffectRequest, EffectKind, TriggerKind},
    document::session::PageSession,
    host::api::{EffectId, ElementId, Host, HostError},
    resources::budget::ResourceKind,
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Position of one effect on the page timeline.
pub struct TimelineSlot {
    /// Click step the effect belongs to. Step 0 plays without a click.
    pub click_step: u32,
    /// Start time in seconds, assuming each click arrives as soon as the previous step ends.
    pub start_s: f64,
    /// End time in seconds.
    pub end_s: f64,
}

/// Place effects on a timeline from their triggers and durations.
///
/// `on-click` opens a new step that starts when everything before it has finished,
/// `with-previous` shares the previous start, `after-previous` starts at the previous end. A
/// leading non-click effect plays in step 0 at time 0.
pub fn schedule(effects: &[(TriggerKind, f64)]) -> Vec<TimelineSlot> {
    let mut slots = Vec::<TimelineSlot>::with_capacity(effects.len());
    let mut step = 0u32;
    let mut horizon = 0.0f64;

    for &(trigger, duration) in effects {
        let duration = duration.max(0.0);
        let start = match (trigger, slots.last()) {
            (TriggerKind::OnClick, _) => {
                step += 1;
                horizon
            }
            (TriggerKind::WithPrevious, Some(prev)) => prev.start_s,
            (TriggerKind::AfterPrevious, Some(prev)) => prev.end_s,
            (_, None) => 0.0,
        };
        let end = start + duration;
        horizon = horizon.max(end);
        slots.push(TimelineSlot {
            click_step: step,
            start_s: start,
            end_s: end,
        });
    }
    slots
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// An effect the host accepted.
pub struct AppliedEffect {
    /// Index of the request in the submitted list.
    pub request_index: usize,
    /// Effect id on the host timeline.
    pub effect: EffectId,
    /// Animated element.
    pub target: ElementId,
    /// Effect kind.
    pub kind: EffectKind,
    /// Trigger as submitted.
    pub trigger: TriggerKind,
    /// Resolved duration.
    pub duration_s: f64,
    /// Whether the host accepted the duration; otherwise the host default applies.
    pub duration_set: bool,
    /// Timeline placement among applied effects.
    pub slot: TimelineSlot,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Why a request produced no effect.
pub enum DropReason {
    /// The page's animation budget was spent.
    Budget,
    /// The host rejected the append.
    HostFailure(String),
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// A request that produced no effect.
pub struct DroppedEffect {
    /// Index of the request in the submitted list.
    pub request_index: usize,
    /// Element the request targeted.
    pub target: ElementId,
    /// Cause.
    pub reason: DropReason,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
/// Result of sequencing one list of requests.
pub struct SequenceReport {
    /// Applied effects in application order.
    pub applied: Vec<AppliedEffect>,
    /// Dropped requests in submission order.
    pub dropped: Vec<DroppedEffect>,
    /// Number of click steps among applied effects.
    pub click_steps: u32,
    /// End of the last applied effect, in seconds.
    pub timeline_end_s: f64,
    /// Handles released by periodic eviction.
    pub evicted_handles: usize,
    /// Set when the host became unavailable; remaining requests were not attempted.
    #[serde(skip)]
    pub fatal: Option<HostError>,
}

/// Applies effect requests to a page in submission order under the page's animation budget.
#[derive(Clone, Debug)]
pub struct AnimationSequencer {
    durations: AnimationDurations,
    release_every: usize,
    release_batch: usize,
}

impl Default for AnimationSequencer {
    fn default() -> Self {
        Self::new(AnimationDurations::default(), 3, 4)
    }
}

impl AnimationSequencer {
    /// `release_every` applied effects trigger a release of the `release_batch` oldest handles.
    pub fn new(durations: AnimationDurations, release_every: usize, release_batch: usize) -> Self {
        Self {
            durations,
            release_every: release_every.max(1),
            release_batch,
        }
    }

    pub fn durations(&self) -> &AnimationDurations {
        &self.durations
    }

    /// Apply `requests` to the session's page.
    ///
    /// Never fails: over-budget and host-rejected requests are dropped and reported. A
    /// host-unavailable failure stops the sequence and is returned in [`SequenceReport::fatal`].
    pub fn apply<H: Host + ?Sized>(
        &self,
        session: &mut PageSession<'_, H>,
        requests: &[AnimationEffectRequest],
    ) -> SequenceReport {
        let mut report = SequenceReport::default();
        let mut timing = Vec::<(TriggerKind, f64)>::with_capacity(requests.len());
        let page = session.page();

        for (index, req) in requests.iter().enumerate() {
            if !session.reserve(ResourceKind::Animation, 1) {
                tracing::warn!(
                    request = index,
                    target = req.target.0,
                    "animation budget exhausted; dropping effect"
                );
                report.dropped.push(DroppedEffect {
                    request_index: index,
                    target: req.target,
                    reason: DropReason::Budget,
                });
                continue;
            }

            let effect = match session
                .create_reserved(|h, _| h.append_effect(page, req.target, req.kind, req.trigger))
            {
                Ok(id) => id,
                Err(err) if err.is_fatal() => {
                    report.fatal = Some(err);
                    break;
                }
                Err(err) => {
                    tracing::warn!(
                        request = index,
                        target = req.target.0,
                        error = %err,
                        "effect append failed"
                    );
                    report.dropped.push(DroppedEffect {
                        request_index: index,
                        target: req.target,
                        reason: DropReason::HostFailure(err.to_string()),
                    });
                    continue;
                }
            };

            let duration = req.resolved_duration(&self.durations);
            let duration_set = match session.host().set_effect_duration(effect, duration) {
                Ok(()) => true,
                Err(err) if err.is_fatal() => {
                    report.fatal = Some(err);
                    false
                }
                Err(err) => {
                    tracing::warn!(effect = effect.0, error = %err, "effect duration rejected");
                    false
                }
            };

            timing.push((req.trigger, duration));
            report.applied.push(AppliedEffect {
                request_index: index,
                effect,
                target: req.target,
                kind: req.kind,
                trigger: req.trigger,
                duration_s: duration,
                duration_set,
                slot: TimelineSlot {
                    click_step: 0,
                    start_s: 0.0,
                    end_s: 0.0,
                },
            });
            if report.fatal.is_some() {
                break;
            }

            if report.applied.len() % self.release_every == 0 {
                let batch = session.release_oldest(self.release_batch);
                report.evicted_handles += batch.len();
            }
        }

        let slots = schedule(&timing);
        for (applied, slot) in report.applied.iter_mut().zip(slots) {
            applied.slot = slot;
        }
        report.click_steps = report
            .applied
            .iter()
            .map(|a| a.slot.click_step)
            .max()
            .unwrap_or(0);
        report.timeline_end_s = report
            .applied
            .iter()
            .map(|a| a.slot.end_s)
            .fold(0.0, f64::max);

        tracing::debug!(
            applied = report.applied.len(),
            dropped = report.dropped.len(),
            evicted = report.evicted_handles,
            "animation sequence applied"
        );
        report
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/sequencer.rs"]
mod tests;
