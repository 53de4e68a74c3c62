use super::*;

#[test]
fn graph_pages_parse_with_defaults() {
    let json = r#"{
        "pages": [{
            "title": "Flow",
            "content": { "graph": {
                "nodes": [ { "id": "a", "label": "A" }, { "id": "b", "label": "B", "color": "accent3" } ],
                "edges": [ { "from": "a", "to": "b" } ]
            } }
        }]
    }"#;
    let deck = DeckSpec::from_reader(json.as_bytes()).unwrap();
    let page = &deck.pages[0];
    assert!(!page.animate);
    assert_eq!(page.subtitle, None);
    let PageContent::Graph(g) = &page.content else {
        panic!("expected graph");
    };
    assert_eq!(g.nodes[1].color, Some(ColorTag::new("accent3")));
    assert_eq!(g.edges[0].label, "");
    assert!(g.legend.is_empty());
    assert_eq!(g.layout, None);
}

#[test]
fn two_column_pages_parse() {
    let json = r#"{ "pages": [{
        "title": "Compare", "animate": true, "notes": "say this",
        "content": { "two_column": { "left_items": ["x"], "right_header": "After" } }
    }] }"#;
    let deck = DeckSpec::from_reader(json.as_bytes()).unwrap();
    let PageContent::TwoColumn(c) = &deck.pages[0].content else {
        panic!("expected two columns");
    };
    assert_eq!(c.left_items, vec!["x".to_string()]);
    assert!(c.right_items.is_empty());
    assert_eq!(c.right_header.as_deref(), Some("After"));
}

#[test]
fn validation_rejects_duplicate_and_dangling_ids() {
    let mut g = GraphSpec::default();
    g.node("a", "A").node("a", "again");
    let err = ContentSpec::graph("t", g).validate().unwrap_err();
    assert!(err.to_string().contains("duplicate node id 'a'"));

    let mut g = GraphSpec::default();
    g.node("a", "A").edge("a", "zz", "");
    let err = ContentSpec::graph("t", g).validate().unwrap_err();
    assert!(err.to_string().contains("unknown node 'zz'"));

    let mut g = GraphSpec::default();
    g.node("", "blank");
    assert!(ContentSpec::graph("t", g).validate().is_err());
}

#[test]
fn deck_errors_name_the_page() {
    let json = r#"{ "pages": [
        { "title": "ok", "content": { "two_column": {} } },
        { "title": "bad", "content": { "graph": { "nodes": [], "edges": [ { "from": "a", "to": "b" } ] } } }
    ] }"#;
    let err = DeckSpec::from_reader(json.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("page 1 ('bad')"));
}

#[test]
fn malformed_json_is_a_validation_error() {
    let err = DeckSpec::from_reader("{ nope".as_bytes()).unwrap_err();
    assert!(matches!(err, SlidewrightError::Validation(_)));
}
