use super::*;

const EPS: f64 = 1e-9;

#[test]
fn radial_points_sit_on_the_circle_with_even_spacing() {
    let c = Point::new(400.0, 250.0);
    for n in 1..=12usize {
        let pts = radial_layout(c, 120.0, n);
        assert_eq!(pts.len(), n);
        for (i, p) in pts.iter().enumerate() {
            assert!((p.distance(c) - 120.0).abs() < EPS, "n={n} i={i}");
            let angle = (*p - c).atan2().rem_euclid(TAU);
            let expected = TAU * i as f64 / n as f64;
            let diff = (angle - expected).abs();
            assert!(diff < 1e-9 || (TAU - diff) < 1e-9, "n={n} i={i}");
        }
    }
}

#[test]
fn radial_first_point_is_at_angle_zero() {
    let pts = radial_layout(Point::new(10.0, 20.0), 5.0, 4);
    assert!((pts[0].x - 15.0).abs() < EPS);
    assert!((pts[0].y - 20.0).abs() < EPS);
    assert!(radial_layout(Point::ORIGIN, 5.0, 0).is_empty());
}

#[test]
fn radial_layout_is_pure() {
    let a = radial_layout(Point::new(1.5, 2.5), 33.0, 7);
    let b = radial_layout(Point::new(1.5, 2.5), 33.0, 7);
    assert_eq!(a, b);
}

#[test]
fn triad_uses_fixed_offsets() {
    let pts = triad_layout(Point::new(100.0, 100.0), 0.5);
    assert_eq!(pts[0], Point::new(100.0, 35.0));
    assert_eq!(pts[1], Point::new(-10.0, 150.0));
    assert_eq!(pts[2], Point::new(210.0, 150.0));
}

#[test]
fn auto_layout_picks_triad_only_for_three_nodes() {
    let c = Point::new(0.0, 0.0);
    assert_eq!(
        graph_positions(GraphLayout::Auto, c, 50.0, 1.0, 3),
        triad_layout(c, 1.0).to_vec()
    );
    assert_eq!(
        graph_positions(GraphLayout::Auto, c, 50.0, 1.0, 4),
        radial_layout(c, 50.0, 4)
    );
    assert_eq!(
        graph_positions(GraphLayout::Triad, c, 50.0, 1.0, 2),
        radial_layout(c, 50.0, 2)
    );
    assert_eq!(
        graph_positions(GraphLayout::Radial, c, 50.0, 1.0, 3),
        radial_layout(c, 50.0, 3)
    );
}

#[test]
fn edge_anchor_is_the_midpoint() {
    assert_eq!(
        edge_anchor(Point::new(0.0, 0.0), Point::new(10.0, -4.0)),
        Point::new(5.0, -2.0)
    );
}

#[test]
fn column_rows_keep_height_when_they_fit() {
    let region = Rect::new(0.0, 100.0, 200.0, 400.0);
    let rows = column_layout(region, 3, 40.0, 10.0);
    assert_eq!(rows[0], Rect::new(0.0, 100.0, 200.0, 140.0));
    assert_eq!(rows[2], Rect::new(0.0, 200.0, 200.0, 240.0));
}

#[test]
fn column_rows_shrink_to_fit_the_region() {
    let region = Rect::new(0.0, 0.0, 100.0, 100.0);
    let rows = column_layout(region, 5, 40.0, 5.0);
    assert_eq!(rows.len(), 5);
    assert!((rows[4].y1 - 100.0).abs() < EPS);
    assert!((rows[0].height() - 16.0).abs() < EPS);
}

#[test]
fn page_regions_stay_inside_the_canvas() {
    let canvas = Canvas::default();
    let r = PageRegions::for_canvas(canvas);
    let page = canvas.rect();
    for rect in [r.title, r.subtitle, r.content, r.legend, r.left_column, r.right_column] {
        assert!(rect.x0 >= page.x0 && rect.x1 <= page.x1);
        assert!(rect.y0 >= page.y0 && rect.y1 <= page.y1);
    }
    assert!(r.left_column.x1 < r.right_column.x0);
    assert!(r.title.y1 <= r.subtitle.y0);
    assert_eq!(r.content.x1, r.legend.x0);
}

#[test]
fn fitted_radius_keeps_nodes_on_the_page() {
    let r = PageRegions::for_canvas(Canvas::default());
    let node = Size::new(120.0, 60.0);
    let radius = r.fitted_radius(1_000.0, node);
    assert!(radius <= (r.content.height() - node.height) / 2.0 + EPS);
    assert_eq!(r.fitted_radius(10.0, node), 10.0);
}
