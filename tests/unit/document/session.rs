use super::*;
use crate::{
    EngineConfig, Rect, RecordingHost,
    host::api::{ElementApi, ShapeKind}, resources::budget::ResourceKind,
};

fn ctx_with(max_elements: u32) -> GenerationContext {
    GenerationContext::new(&EngineConfig {
        max_elements_per_page: max_elements,
        ..EngineConfig::default()
    })
}

fn square() -> Rect {
    Rect::new(0.0, 0.0, 20.0, 20.0)
}

#[test]
fn dropping_a_session_releases_every_handle() {
    let mut host = RecordingHost::default();
    let mut ctx = ctx_with(10);
    {
        let mut s = PageSession::open(&mut host, &mut ctx).unwrap();
        for _ in 0..3 {
            s.create(1, |h, p| h.add_shape(p, ShapeKind::Rectangle, square()))
                .unwrap();
        }
        assert_eq!(s.context().tracker().len(), 4);
    }
    assert!(ctx.tracker().is_empty());
    assert_eq!(host.live_handles(), 0);
    assert_eq!(host.released().len(), 4);
}

#[test]
fn creation_is_refused_once_the_budget_is_spent() {
    let mut host = RecordingHost::default();
    let mut ctx = ctx_with(2);
    let mut s = PageSession::open(&mut host, &mut ctx).unwrap();
    assert!(s.create(2, |h, p| h.add_shape(p, ShapeKind::Rectangle, square())).is_ok());
    let err = s
        .create(1, |h, p| h.add_shape(p, ShapeKind::Rectangle, square()))
        .unwrap_err();
    assert_eq!(err, CreateError::Budget(ResourceKind::Element));
    assert!(!err.is_fatal());
    let batches = s.finish();
    assert_eq!(batches.iter().map(|b| b.len()).sum::<usize>(), 2);
}

#[test]
fn host_failures_are_reported_not_tracked() {
    let mut host = RecordingHost::default();
    host.fail_always("add_text_box");
    let mut ctx = ctx_with(5);
    let mut s = PageSession::open(&mut host, &mut ctx).unwrap();
    let err = s
        .create(1, |h, p| h.add_text_box(p, square(), "x"))
        .unwrap_err();
    assert!(matches!(err, CreateError::Host(HostError::Call { .. })));
    assert_eq!(s.context().tracker().len(), 1);
    assert_eq!(s.context().budget().counters().elements, 1);
}

#[test]
fn opening_resets_the_budget_for_each_page() {
    let mut host = RecordingHost::default();
    let mut ctx = ctx_with(1);
    for _ in 0..3 {
        let mut s = PageSession::open(&mut host, &mut ctx).unwrap();
        assert!(s.create(1, |h, p| h.add_shape(p, ShapeKind::Ellipse, square())).is_ok());
        assert!(!s.reserve(ResourceKind::Element, 1));
    }
    assert_eq!(host.document().pages.len(), 3);
    assert_eq!(host.live_handles(), 0);
}

#[test]
fn unreachable_host_fails_to_open() {
    let mut host = RecordingHost::default();
    host.go_unavailable_after(0);
    let mut ctx = ctx_with(1);
    let err = PageSession::open(&mut host, &mut ctx).err().unwrap();
    assert!(err.is_fatal());
}

#[test]
fn chunked_flush_reclaims_between_batches() {
    let mut host = RecordingHost::default();
    let mut ctx = GenerationContext::new(&EngineConfig {
        flush_batch_size: 2,
        ..EngineConfig::default()
    });
    let mut s = PageSession::open(&mut host, &mut ctx).unwrap();
    for _ in 0..4 {
        s.create(1, |h, p| h.add_shape(p, ShapeKind::Rectangle, square()))
            .unwrap();
    }
    let batches = s.finish();
    assert_eq!(batches.len(), 3);
    assert_eq!(host.reclaim_passes(), 2);
}
