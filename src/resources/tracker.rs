use std::collections::{HashSet, VecDeque};

use crate::host::api::{HandleId, HandleRelease, HostError};

/// Auto-release kicks in when this many handles are tracked at once.
pub const DEFAULT_AUTO_RELEASE_THRESHOLD: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A handle together with its logical creation timestamp.
pub struct TrackedHandle {
    /// The live foreign reference.
    pub handle: HandleId,
    /// Value of the tracker clock when the handle was registered.
    pub created_at: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Outcome of one release pass. Every handle appears in exactly one of the two lists.
pub struct ReleaseBatch {
    /// Handles the host released.
    pub released: Vec<HandleId>,
    /// Handles whose release failed. They are no longer tracked either.
    pub failed: Vec<(HandleId, HostError)>,
}

impl ReleaseBatch {
    /// Number of handles removed from tracking by this pass.
    pub fn len(&self) -> usize {
        self.released.len() + self.failed.len()
    }

    /// Whether the pass touched no handle.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All handles removed by this pass, released ones first.
    pub fn handles(&self) -> impl Iterator<Item = HandleId> + '_ {
        self.released
            .iter()
            .copied()
            .chain(self.failed.iter().map(|(h, _)| *h))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
/// Running counters for a tracker.
pub struct TrackerStats {
    /// Handles tracked right now.
    pub tracked: usize,
    /// Largest tracked set observed.
    pub peak_tracked: usize,
    /// Handles released successfully.
    pub released: u64,
    /// Handles whose release failed and were dropped from tracking.
    pub failed_releases: u64,
    /// Auto-release passes triggered by the threshold.
    pub auto_releases: u64,
    /// Registrations ignored because the handle was already tracked.
    pub duplicate_tracks: u64,
    /// Oldest age (in clock ticks) any handle reached before release.
    pub max_age_at_release: u64,
}

/// Owns every live handle created during a generation run and releases them oldest-first.
///
/// The clock is a logical counter, not wall time: each registration takes the next tick, so
/// insertion order is creation order and the internal queue is always sorted.
#[derive(Debug)]
pub struct HandleTracker {
    entries: VecDeque<TrackedHandle>,
    live: HashSet<HandleId>,
    clock: u64,
    auto_release_threshold: usize,
    stats: TrackerStats,
}

impl Default for HandleTracker {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_RELEASE_THRESHOLD)
    }
}

impl HandleTracker {
    /// Create a tracker. A threshold of `0` disables auto-release.
    pub fn new(auto_release_threshold: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            live: HashSet::new(),
            clock: 0,
            auto_release_threshold,
            stats: TrackerStats::default(),
        }
    }

    /// Number of tracked handles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `handle` is currently tracked.
    pub fn contains(&self, handle: HandleId) -> bool {
        self.live.contains(&handle)
    }

    /// Current logical time.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Snapshot of the running counters.
    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            tracked: self.entries.len(),
            ..self.stats.clone()
        }
    }

    /// Tracked handles, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedHandle> {
        self.entries.iter()
    }

    /// Register a freshly created handle.
    ///
    /// Returns the auto-release batch when registration pushed the tracked count to the threshold.
    pub fn track<R>(&mut self, handle: HandleId, host: &mut R) -> Option<ReleaseBatch>
    where
        R: HandleRelease + ?Sized,
    {
        if !self.live.insert(handle) {
            self.stats.duplicate_tracks = self.stats.duplicate_tracks.saturating_add(1);
            tracing::warn!(handle = handle.0, "handle already tracked; ignoring registration");
            return None;
        }

        self.clock = self.clock.saturating_add(1);
        self.entries.push_back(TrackedHandle {
            handle,
            created_at: self.clock,
        });
        self.stats.peak_tracked = self.stats.peak_tracked.max(self.entries.len());

        if self.auto_release_threshold > 0 && self.entries.len() >= self.auto_release_threshold {
            let n = self.entries.len() / 2;
            tracing::debug!(
                tracked = self.entries.len(),
                releasing = n,
                "auto-release threshold reached"
            );
            self.stats.auto_releases = self.stats.auto_releases.saturating_add(1);
            return Some(self.release_oldest(n, host));
        }
        None
    }

    /// Release the `n` oldest handles (all of them when fewer are tracked).
    pub fn release_oldest<R>(&mut self, n: usize, host: &mut R) -> ReleaseBatch
    where
        R: HandleRelease + ?Sized,
    {
        debug_assert!(
            self.entries
                .iter()
                .zip(self.entries.iter().skip(1))
                .all(|(a, b)| a.created_at < b.created_at)
        );

        let take = n.min(self.entries.len());
        let mut batch = ReleaseBatch::default();
        for entry in self.entries.drain(..take).collect::<Vec<_>>() {
            self.release_entry(entry, host, &mut batch);
        }
        batch
    }

    /// Release one specific handle. Returns `None` if it is not tracked.
    pub fn release<R>(&mut self, handle: HandleId, host: &mut R) -> Option<ReleaseBatch>
    where
        R: HandleRelease + ?Sized,
    {
        let pos = self.entries.iter().position(|e| e.handle == handle)?;
        let entry = self.entries.remove(pos)?;
        let mut batch = ReleaseBatch::default();
        self.release_entry(entry, host, &mut batch);
        Some(batch)
    }

    /// Release everything.
    ///
    /// With `batch_size > 0` and more than `batch_size` handles tracked, handles go in oldest-first
    /// chunks and the host gets a reclamation pass between chunks. Afterwards nothing is tracked.
    pub fn release_all<R>(&mut self, batch_size: usize, host: &mut R) -> Vec<ReleaseBatch>
    where
        R: HandleRelease + ?Sized,
    {
        let mut batches = Vec::new();
        if self.entries.is_empty() {
            return batches;
        }

        if batch_size > 0 && self.entries.len() > batch_size {
            while !self.entries.is_empty() {
                if !batches.is_empty() {
                    host.reclaim();
                }
                batches.push(self.release_oldest(batch_size, host));
            }
        } else {
            let n = self.entries.len();
            batches.push(self.release_oldest(n, host));
        }

        debug_assert!(self.entries.is_empty() && self.live.is_empty());
        tracing::debug!(
            batches = batches.len(),
            released = batches.iter().map(ReleaseBatch::len).sum::<usize>(),
            "released all tracked handles"
        );
        batches
    }

    fn release_entry<R>(&mut self, entry: TrackedHandle, host: &mut R, batch: &mut ReleaseBatch)
    where
        R: HandleRelease + ?Sized,
    {
        self.live.remove(&entry.handle);
        let age = self.clock.saturating_sub(entry.created_at);
        self.stats.max_age_at_release = self.stats.max_age_at_release.max(age);

        match host.release_handle(entry.handle) {
            Ok(()) => {
                self.stats.released = self.stats.released.saturating_add(1);
                batch.released.push(entry.handle);
            }
            Err(err) => {
                // Dropped from tracking regardless; a second attempt could double-release.
                tracing::warn!(handle = entry.handle.0, error = %err, "handle release failed");
                self.stats.failed_releases = self.stats.failed_releases.saturating_add(1);
                batch.failed.push((entry.handle, err));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resources/tracker.rs"]
mod tests;
