use super::*;
use crate::{
    RecordedKind, RecordingHost,
    animation::effect::{EffectKind, TriggerKind},
    host::api::Fill,
};

fn config(max_elements: u32, max_animations: u32) -> EngineConfig {
    EngineConfig {
        max_elements_per_page: max_elements,
        max_animations_per_page: max_animations,
        ..EngineConfig::default()
    }
}

fn triangle(labels: [&str; 3]) -> GraphSpec {
    let mut g = GraphSpec::default();
    g.node("a", "A")
        .node("b", "B")
        .node("c", "C")
        .edge("a", "b", labels[0])
        .edge("b", "c", labels[1])
        .edge("c", "a", labels[2]);
    g
}

fn build(
    host: &mut RecordingHost,
    cfg: EngineConfig,
    spec: &ContentSpec,
) -> (PageDescriptor, GenerationContext) {
    let mut ctx = GenerationContext::new(&cfg);
    let assembler = DocumentAssembler::for_host(cfg, &*host);
    let desc = assembler.assemble_page(host, &mut ctx, 0, spec).unwrap();
    (desc, ctx)
}

fn visual_count(host: &RecordingHost, page: PageId) -> usize {
    host.visual_elements_on(page).count()
}

#[test]
fn triangle_with_labels_fills_a_ten_element_page_exactly() {
    let mut host = RecordingHost::default();
    let spec = ContentSpec::graph("Cycle", triangle(["x", "y", "z"]));
    let (desc, ctx) = build(&mut host, config(10, 25), &spec);

    assert_eq!(desc.nodes.len(), 3);
    assert_eq!(desc.edges.len(), 3);
    assert!(desc.edges.iter().all(|e| e.badge.is_some()));
    assert!(desc.skipped.is_empty());
    assert_eq!(desc.budget.elements, 10);
    assert_eq!(desc.element_count(), 10);
    assert_eq!(visual_count(&host, desc.page), 10);
    assert_eq!(
        desc.transitions,
        vec![
            PageState::Created,
            PageState::TitleAdded,
            PageState::ContentPopulated(Completion::Complete),
            PageState::AnimationsApplied(AnimationOutcome::Skipped),
            PageState::Finalized,
        ]
    );
    assert!(ctx.tracker().is_empty());
    assert_eq!(host.live_handles(), 0);
}

#[test]
fn over_budget_graph_keeps_legend_and_first_nodes() {
    let mut host = RecordingHost::default();
    let mut g = triangle(["", "", ""]);
    g.legend_item("input").legend_item("output");
    let spec = ContentSpec::graph("", g);
    let (desc, _) = build(&mut host, config(4, 25), &spec);

    assert_eq!(desc.legend.len(), 2);
    let ids: Vec<_> = desc.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(desc.edges.is_empty());
    assert_eq!(visual_count(&host, desc.page), 4);

    let skipped: Vec<_> = desc
        .skipped
        .iter()
        .map(|s| (s.name.as_str(), s.reason.clone()))
        .collect();
    assert_eq!(
        skipped,
        vec![
            ("node:c", SkipReason::Budget(ResourceKind::Element)),
            ("edge:a->b", SkipReason::Budget(ResourceKind::Element)),
            ("edge:b->c", SkipReason::MissingEndpoint("c".to_string())),
            ("edge:c->a", SkipReason::MissingEndpoint("c".to_string())),
        ]
    );
    assert_eq!(
        desc.transitions[2],
        PageState::ContentPopulated(Completion::Partial)
    );
}

#[test]
fn every_edge_joins_two_nodes_of_the_page() {
    let mut host = RecordingHost::default();
    let mut g = triangle(["", "", ""]);
    g.edge("a", "zz", "");
    let spec = ContentSpec::graph("Edges", g);
    let (desc, _) = build(&mut host, EngineConfig::default(), &spec);

    for e in &desc.edges {
        assert!(desc.node(&e.from).is_some());
        assert!(desc.node(&e.to).is_some());
    }
    let unknown: Vec<_> = desc.skipped_of(SkippedKind::Edge).collect();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].reason, SkipReason::UnknownNode("zz".to_string()));
}

#[test]
fn badge_sits_at_the_edge_midpoint() {
    let mut host = RecordingHost::default();
    let spec = ContentSpec::graph("Badge", triangle(["uses", "", ""]));
    let (desc, _) = build(&mut host, EngineConfig::default(), &spec);

    let edge = &desc.edges[0];
    let a = desc.node("a").unwrap().center;
    let b = desc.node("b").unwrap().center;
    assert_eq!(edge.anchor, a.midpoint(b));

    let badge = host.element(edge.badge.unwrap()).unwrap();
    assert_eq!(badge.kind, RecordedKind::Shape(ShapeKind::Ellipse));
    assert_eq!(badge.text, "uses");
    let c = badge.frame.unwrap().center();
    assert!((c - edge.anchor).hypot() < 1e-9);
    assert!(desc.edges[1].badge.is_none());

    let line = host.element(edge.line).unwrap();
    assert_eq!(line.kind, RecordedKind::Connector { from: a, to: b });

    let group = host.element(edge.group.unwrap()).unwrap();
    assert_eq!(
        group.kind,
        RecordedKind::Group {
            members: vec![edge.line, edge.badge.unwrap()]
        }
    );
    assert!(desc.edges[1].group.is_none());
}

#[test]
fn three_nodes_use_the_triad_and_others_the_circle() {
    let mut host = RecordingHost::default();
    let spec = ContentSpec::graph("Triad", triangle(["", "", ""]));
    let (desc, _) = build(&mut host, EngineConfig::default(), &spec);
    let center = PageRegions::for_canvas(EngineConfig::default().canvas)
        .content
        .center();
    assert_eq!(desc.nodes[0].center, center + crate::TRIAD_OFFSETS[0]);

    let mut g = GraphSpec::default();
    g.node("a", "A").node("b", "B").node("c", "C").node("d", "D");
    let mut host = RecordingHost::default();
    let (desc, _) = build(&mut host, EngineConfig::default(), &ContentSpec::graph("Ring", g));
    let radii: Vec<f64> = desc
        .nodes
        .iter()
        .map(|n| (n.center - center).hypot())
        .collect();
    assert!(radii.iter().all(|r| (r - radii[0]).abs() < 1e-9));
    assert!(radii[0] > 0.0);
}

#[test]
fn animations_chain_nodes_then_edges() {
    let mut host = RecordingHost::default();
    let mut spec = ContentSpec::graph("Flow", triangle(["", "", ""]));
    spec.animate = true;
    let (desc, _) = build(&mut host, EngineConfig::default(), &spec);

    let targets: Vec<_> = desc.animations.iter().map(|a| a.target).collect();
    let mut expected: Vec<_> = desc.nodes.iter().map(|n| n.element).collect();
    expected.extend(desc.edges.iter().map(|e| e.line));
    assert_eq!(targets, expected);

    assert_eq!(desc.animations[0].trigger, TriggerKind::OnClick);
    assert!(
        desc.animations[1..]
            .iter()
            .all(|a| a.trigger == TriggerKind::AfterPrevious)
    );
    assert!(desc.animations.iter().all(|a| a.kind == EffectKind::Fade));
    // 3 node fades of 0.5s and 3 edge fades of 0.4s back to back
    assert!((desc.timeline_end_s - 2.7).abs() < 1e-9);
    assert_eq!(
        desc.transitions[3],
        PageState::AnimationsApplied(AnimationOutcome::Complete)
    );
    assert_eq!(host.effects_on(desc.page).count(), 6);
}

#[test]
fn animation_budget_caps_effects() {
    let mut host = RecordingHost::default();
    let mut spec = ContentSpec::graph("Flow", triangle(["", "", ""]));
    spec.animate = true;
    let (desc, _) = build(&mut host, config(25, 2), &spec);

    assert_eq!(desc.animations.len(), 2);
    assert_eq!(host.effects_on(desc.page).count(), 2);
    assert_eq!(desc.skipped_of(SkippedKind::Animation).count(), 4);
    assert_eq!(desc.budget.animations, 2);
    assert_eq!(
        desc.transitions[3],
        PageState::AnimationsApplied(AnimationOutcome::Partial)
    );
}

#[test]
fn legacy_host_gets_literal_colors_and_thin_rectangles() {
    let mut host = RecordingHost::new(HostCapabilities {
        theme_colors: false,
        font_weight: false,
        connectors: false,
    });
    let spec = ContentSpec::graph("Legacy", triangle(["", "", ""]));
    let (desc, _) = build(&mut host, EngineConfig::default(), &spec);

    assert!(desc.skipped.is_empty());
    let node = host.element(desc.nodes[0].element).unwrap();
    assert!(matches!(node.fill, Some(Fill::Rgb(_))));
    let title = host.element(desc.title.unwrap()).unwrap();
    assert!(!title.font.as_ref().unwrap().bold);
    for e in &desc.edges {
        let line = host.element(e.line).unwrap();
        assert_eq!(line.kind, RecordedKind::Shape(ShapeKind::Rectangle));
        let frame = line.frame.unwrap();
        assert!(frame.width() >= 2.0 && frame.height() >= 2.0);
    }
}

#[test]
fn two_columns_fill_left_then_right() {
    let mut host = RecordingHost::default();
    let mut spec = ContentSpec::two_column(
        "Before / after",
        TwoColumnSpec {
            left_items: vec!["one".into(), "two".into(), "three".into()],
            right_items: vec!["uno".into(), "dos".into()],
            left_header: Some("Before".into()),
            right_header: Some("After".into()),
        },
    );
    spec.animate = true;
    let (desc, _) = build(&mut host, EngineConfig::default(), &spec);

    assert_eq!(desc.decorations.len(), 4);
    let sides: Vec<_> = desc.columns.iter().map(|c| (c.side, c.index)).collect();
    assert_eq!(
        sides,
        vec![
            (ColumnSide::Left, 0),
            (ColumnSide::Left, 1),
            (ColumnSide::Left, 2),
            (ColumnSide::Right, 0),
            (ColumnSide::Right, 1),
        ]
    );
    assert!(desc.columns[0].frame.y1 <= desc.columns[1].frame.y0);
    assert!(desc.columns[2].frame.x1 < desc.columns[3].frame.x0);

    let effects: Vec<_> = host.effects_on(desc.page).collect();
    assert_eq!(effects.len(), 5);
    assert!(effects.iter().all(|e| e.duration_s == Some(0.7)));
    assert_eq!(effects[0].target, desc.columns[0].element);
    assert_eq!(desc.element_count(), visual_count(&host, desc.page));
}

#[test]
fn notes_attach_even_when_the_budget_is_spent() {
    let mut host = RecordingHost::default();
    let mut g = GraphSpec::default();
    g.node("a", "A");
    let mut spec = ContentSpec::graph("Title only", g);
    spec.notes = Some("say hello".into());
    let (desc, _) = build(&mut host, config(1, 25), &spec);

    assert!(desc.title.is_some());
    assert!(desc.nodes.is_empty());
    let notes = host.element(desc.notes.unwrap()).unwrap();
    assert_eq!(notes.kind, RecordedKind::Notes);
    assert_eq!(notes.text, "say hello");
    let n = desc.transitions.len();
    assert_eq!(
        desc.transitions[n - 2..],
        [PageState::NotesAttached, PageState::Finalized]
    );
}

#[test]
fn rejected_creation_skips_only_that_item() {
    let mut host = RecordingHost::default();
    host.fail_nth("add_shape", 2);
    let spec = ContentSpec::graph("Gap", triangle(["", "", ""]));
    let (desc, _) = build(&mut host, EngineConfig::default(), &spec);

    let ids: Vec<_> = desc.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    let node_skip: Vec<_> = desc.skipped_of(SkippedKind::Node).collect();
    assert_eq!(node_skip.len(), 1);
    assert!(matches!(node_skip[0].reason, SkipReason::HostFailure(_)));
    // a->b and b->c lose an endpoint; c->a survives
    assert_eq!(desc.edges.len(), 1);
    assert_eq!(desc.skipped_of(SkippedKind::Edge).count(), 2);
    assert_eq!(desc.state(), PageState::Finalized);
}

#[test]
fn rejected_setters_are_recorded_as_style() {
    let mut host = RecordingHost::default();
    host.fail_always("set_line");
    let spec = ContentSpec::graph("Lines", triangle(["", "", ""]));
    let (desc, _) = build(&mut host, EngineConfig::default(), &spec);

    assert_eq!(desc.edges.len(), 3);
    assert_eq!(desc.skipped_of(SkippedKind::Style).count(), 3);
    assert_eq!(
        desc.transitions[2],
        PageState::ContentPopulated(Completion::Complete)
    );
}

#[test]
fn unavailable_host_mid_page_returns_what_was_built() {
    let mut host = RecordingHost::default();
    // add_page, title box, font and frame, then node a: shape, fill, text, font
    host.go_unavailable_after(8);
    let spec = ContentSpec::graph("Dies", triangle(["", "", ""]));
    let (desc, ctx) = build(&mut host, EngineConfig::default(), &spec);

    assert!(desc.fatal.is_some());
    assert_eq!(desc.nodes.len(), 1);
    assert_eq!(
        desc.transitions,
        vec![
            PageState::Created,
            PageState::TitleAdded,
            PageState::Finalized
        ]
    );
    assert!(ctx.tracker().is_empty());
    assert_eq!(ctx.tracker().stats().failed_releases, 3);
}

#[test]
fn page_creation_failure_is_an_error() {
    let mut host = RecordingHost::default();
    host.fail_always("add_page");
    let cfg = EngineConfig::default();
    let mut ctx = GenerationContext::new(&cfg);
    let assembler = DocumentAssembler::for_host(cfg, &host);
    let spec = ContentSpec::graph("Never", GraphSpec::default());
    let err = assembler
        .assemble_page(&mut host, &mut ctx, 0, &spec)
        .unwrap_err();
    assert!(matches!(err, SlidewrightError::Host(_)));
    assert!(ctx.tracker().is_empty());
}
