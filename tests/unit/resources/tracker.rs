use std::collections::HashSet;

use super::*;
use crate::host::api::HostResult;

#[derive(Default)]
struct FakeReleaser {
    released: Vec<HandleId>,
    fail: HashSet<HandleId>,
    reclaims: usize,
}

impl HandleRelease for FakeReleaser {
    fn release_handle(&mut self, handle: HandleId) -> HostResult<()> {
        if self.fail.contains(&handle) {
            return Err(HostError::call("release", "refused"));
        }
        assert!(
            !self.released.contains(&handle),
            "handle {handle:?} released twice"
        );
        self.released.push(handle);
        Ok(())
    }

    fn reclaim(&mut self) {
        self.reclaims += 1;
    }
}

fn tracker_with(n: u64, host: &mut FakeReleaser) -> HandleTracker {
    let mut t = HandleTracker::new(0);
    for i in 1..=n {
        assert!(t.track(HandleId(i), host).is_none());
    }
    t
}

#[test]
fn release_oldest_goes_in_creation_order() {
    let mut host = FakeReleaser::default();
    let mut t = tracker_with(5, &mut host);

    let batch = t.release_oldest(2, &mut host);
    assert_eq!(batch.released, vec![HandleId(1), HandleId(2)]);
    assert_eq!(t.len(), 3);
    assert!(!t.contains(HandleId(1)));
    assert!(t.contains(HandleId(3)));

    let rest = t.release_oldest(10, &mut host);
    assert_eq!(rest.released, vec![HandleId(3), HandleId(4), HandleId(5)]);
    assert!(t.is_empty());
}

#[test]
fn failed_release_is_dropped_and_never_retried() {
    let mut host = FakeReleaser::default();
    host.fail.insert(HandleId(2));
    let mut t = tracker_with(3, &mut host);

    let batch = t.release_oldest(3, &mut host);
    assert_eq!(batch.released, vec![HandleId(1), HandleId(3)]);
    assert_eq!(batch.failed.len(), 1);
    assert_eq!(batch.failed[0].0, HandleId(2));
    assert!(t.is_empty());

    let again = t.release_all(0, &mut host);
    assert!(again.is_empty());
    let st = t.stats();
    assert_eq!(st.released, 2);
    assert_eq!(st.failed_releases, 1);
}

#[test]
fn auto_release_frees_the_oldest_half_at_threshold() {
    let mut host = FakeReleaser::default();
    let mut t = HandleTracker::new(4);
    for i in 1..=3 {
        assert!(t.track(HandleId(i), &mut host).is_none());
    }
    let batch = t.track(HandleId(4), &mut host).expect("threshold reached");
    assert_eq!(batch.released, vec![HandleId(1), HandleId(2)]);
    assert_eq!(t.len(), 2);
    assert_eq!(t.stats().auto_releases, 1);
    assert_eq!(t.stats().peak_tracked, 4);
}

#[test]
fn duplicate_registration_is_ignored() {
    let mut host = FakeReleaser::default();
    let mut t = HandleTracker::new(0);
    t.track(HandleId(7), &mut host);
    t.track(HandleId(7), &mut host);
    assert_eq!(t.len(), 1);
    assert_eq!(t.stats().duplicate_tracks, 1);
    t.release_all(0, &mut host);
    assert_eq!(host.released, vec![HandleId(7)]);
}

#[test]
fn release_all_in_chunks_reclaims_between_chunks() {
    let mut host = FakeReleaser::default();
    let mut t = tracker_with(7, &mut host);

    let batches = t.release_all(3, &mut host);
    let sizes: Vec<_> = batches.iter().map(ReleaseBatch::len).collect();
    assert_eq!(sizes, vec![3, 3, 1]);
    assert_eq!(host.reclaims, 2);
    assert!(t.is_empty());
    assert_eq!(host.released, (1..=7).map(HandleId).collect::<Vec<_>>());
}

#[test]
fn release_all_without_batching_is_one_pass() {
    let mut host = FakeReleaser::default();
    let mut t = tracker_with(3, &mut host);
    let batches = t.release_all(5, &mut host);
    assert_eq!(batches.len(), 1);
    assert_eq!(host.reclaims, 0);
}

#[test]
fn individual_release_leaves_others_tracked() {
    let mut host = FakeReleaser::default();
    let mut t = tracker_with(3, &mut host);
    let batch = t.release(HandleId(2), &mut host).unwrap();
    assert_eq!(batch.released, vec![HandleId(2)]);
    assert!(t.release(HandleId(2), &mut host).is_none());
    let order: Vec<_> = t.iter().map(|e| e.handle).collect();
    assert_eq!(order, vec![HandleId(1), HandleId(3)]);
}

#[test]
fn mixed_operations_never_release_a_handle_twice() {
    let mut host = FakeReleaser::default();
    let mut t = HandleTracker::new(6);
    let mut seen = HashSet::new();
    let mut next = 1u64;

    for round in 0..20u64 {
        for _ in 0..(round % 4 + 1) {
            if let Some(batch) = t.track(HandleId(next), &mut host) {
                for h in batch.handles() {
                    assert!(seen.insert(h), "{h:?} in two batches");
                }
            }
            next += 1;
        }
        if round % 3 == 0 {
            for h in t.release_oldest(2, &mut host).handles() {
                assert!(seen.insert(h), "{h:?} in two batches");
            }
        }
    }
    for batch in t.release_all(0, &mut host) {
        for h in batch.handles() {
            assert!(seen.insert(h), "{h:?} in two batches");
        }
    }

    assert_eq!(t.len(), 0);
    assert_eq!(seen.len() as u64, next - 1);
}

#[test]
fn age_at_release_is_bounded_by_oldest_first_order() {
    let mut host = FakeReleaser::default();
    let mut t = HandleTracker::new(0);
    for i in 1..=10 {
        t.track(HandleId(i), &mut host);
        if i % 2 == 0 {
            t.release_oldest(2, &mut host);
        }
    }
    assert!(t.is_empty());
    assert_eq!(t.stats().max_age_at_release, 1);
    assert_eq!(t.clock(), 10);
}
