use std::f64::consts::TAU;

use crate::foundation::core::{Canvas, Point, Rect, Size, Vec2};

/// Hand-placed offsets for three-entity graphs: apex, lower left, lower right.
pub const TRIAD_OFFSETS: [Vec2; 3] = [
    Vec2::new(0.0, -130.0),
    Vec2::new(-220.0, 100.0),
    Vec2::new(220.0, 100.0),
];

const PAGE_MARGIN: f64 = 36.0;
const TITLE_HEIGHT: f64 = 56.0;
const SUBTITLE_HEIGHT: f64 = 28.0;
const LEGEND_WIDTH: f64 = 150.0;
const COLUMN_GAP: f64 = 24.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Node placement strategy for graph pages.
pub enum GraphLayout {
    /// Triad for exactly three nodes, radial otherwise.
    #[default]
    Auto,
    /// Evenly spaced on a circle.
    Radial,
    /// Fixed three-point layout; falls back to radial for any other node count.
    Triad,
}

/// `n` points evenly spaced on a circle, the first at angle 0 (to the right of `center`).
pub fn radial_layout(center: Point, radius: f64, n: usize) -> Vec<Point> {
    if n == 0 {
        return Vec::new();
    }
    let step = TAU / n as f64;
    (0..n)
        .map(|i| {
            let angle = step * i as f64;
            center + Vec2::from_angle(angle) * radius
        })
        .collect()
}

/// The fixed triad around `center`, offsets multiplied by `scale`.
pub fn triad_layout(center: Point, scale: f64) -> [Point; 3] {
    TRIAD_OFFSETS.map(|off| center + off * scale)
}

/// Midpoint between two node centers, where an edge label and its badge sit.
pub fn edge_anchor(a: Point, b: Point) -> Point {
    a.midpoint(b)
}

/// Node centers for a graph of `n` nodes.
pub fn graph_positions(
    choice: GraphLayout,
    center: Point,
    radius: f64,
    triad_scale: f64,
    n: usize,
) -> Vec<Point> {
    match (choice, n) {
        (GraphLayout::Auto | GraphLayout::Triad, 3) => triad_layout(center, triad_scale).to_vec(),
        (GraphLayout::Triad, _) => {
            tracing::debug!(nodes = n, "triad layout needs three nodes; using radial");
            radial_layout(center, radius, n)
        }
        _ => radial_layout(center, radius, n),
    }
}

/// Frame of a node of `size` centered on `center`.
pub fn node_frame(center: Point, size: Size) -> Rect {
    Rect::from_center_size(center, size)
}

/// Stack `n` rows top-down inside `region`.
///
/// Rows keep `row_height` while they fit; otherwise they shrink uniformly so the last row ends at
/// the region's bottom edge.
pub fn column_layout(region: Rect, n: usize, row_height: f64, gap: f64) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }
    let gap = gap.max(0.0);
    let gaps = gap * n.saturating_sub(1) as f64;
    let fit = ((region.height() - gaps) / n as f64).max(0.0);
    let h = row_height.max(0.0).min(fit);

    let mut y = region.y0;
    let mut rows = Vec::with_capacity(n);
    for _ in 0..n {
        rows.push(Rect::new(region.x0, y, region.x1, y + h));
        y += h + gap;
    }
    rows
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Fixed page regions derived from the canvas.
pub struct PageRegions {
    /// Title band across the top.
    pub title: Rect,
    /// Subtitle band under the title.
    pub subtitle: Rect,
    /// Main content area (diagram).
    pub content: Rect,
    /// Legend strip at the right edge of the content area.
    pub legend: Rect,
    /// Left column of a two-column page.
    pub left_column: Rect,
    /// Right column of a two-column page.
    pub right_column: Rect,
}

impl PageRegions {
    pub fn for_canvas(canvas: Canvas) -> Self {
        let inner = canvas.rect().inset(-PAGE_MARGIN);
        let title = Rect::new(inner.x0, inner.y0, inner.x1, inner.y0 + TITLE_HEIGHT);
        let subtitle = Rect::new(inner.x0, title.y1, inner.x1, title.y1 + SUBTITLE_HEIGHT);
        let body_top = subtitle.y1 + 8.0;
        let body = Rect::new(inner.x0, body_top, inner.x1, inner.y1.max(body_top));

        let legend_x0 = (body.x1 - LEGEND_WIDTH).max(body.x0);
        let content = Rect::new(body.x0, body.y0, legend_x0, body.y1);
        let legend = Rect::new(legend_x0, body.y0, body.x1, body.y1);

        let half = ((body.width() - COLUMN_GAP) / 2.0).max(0.0);
        let left_column = Rect::new(body.x0, body.y0, body.x0 + half, body.y1);
        let right_column = Rect::new(body.x1 - half, body.y0, body.x1, body.y1);

        Self {
            title,
            subtitle,
            content,
            legend,
            left_column,
            right_column,
        }
    }

    /// Largest radial radius that keeps nodes of `node` size inside the content area.
    pub fn fitted_radius(&self, preferred: f64, node: Size) -> f64 {
        let room_x = (self.content.width() - node.width) / 2.0;
        let room_y = (self.content.height() - node.height) / 2.0;
        preferred.min(room_x).min(room_y).max(0.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/diagram.rs"]
mod tests;
