use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use crate::{
    foundation::core::ColorTag,
    foundation::error::{SlidewrightError, SlidewrightResult},
    layout::diagram::GraphLayout,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Content of one page as authored.
pub struct ContentSpec {
    /// Page title. Empty means no title element.
    pub title: String,
    /// Optional subtitle under the title.
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Optional speaker notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Animate the diagram or columns.
    #[serde(default)]
    pub animate: bool,
    /// Page body.
    pub content: PageContent,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Page body variants.
pub enum PageContent {
    /// Node/edge diagram.
    Graph(GraphSpec),
    /// Two lists side by side.
    TwoColumn(TwoColumnSpec),
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Node/edge diagram.
pub struct GraphSpec {
    /// Nodes in declaration order.
    pub nodes: Vec<NodeSpec>,
    /// Edges in declaration order.
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
    /// Legend entries.
    #[serde(default)]
    pub legend: Vec<LegendItemSpec>,
    /// Placement override; the engine default applies when absent.
    #[serde(default)]
    pub layout: Option<GraphLayout>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Diagram node.
pub struct NodeSpec {
    /// Identifier referenced by edges.
    pub id: String,
    /// Visible text.
    pub label: String,
    /// Fill tag; cycles through theme accents when absent.
    #[serde(default)]
    pub color: Option<ColorTag>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Directed diagram edge.
pub struct EdgeSpec {
    /// Source node id.
    pub from: String,
    /// Target node id.
    pub to: String,
    /// Badge text at the edge midpoint. Empty means no badge.
    #[serde(default)]
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Legend entry.
pub struct LegendItemSpec {
    /// Visible text.
    pub label: String,
    /// Swatch tag; cycles through theme accents when absent.
    #[serde(default)]
    pub color: Option<ColorTag>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Two lists side by side.
pub struct TwoColumnSpec {
    /// Left column items, top-down.
    #[serde(default)]
    pub left_items: Vec<String>,
    /// Right column items, top-down.
    #[serde(default)]
    pub right_items: Vec<String>,
    /// Optional left header.
    #[serde(default)]
    pub left_header: Option<String>,
    /// Optional right header.
    #[serde(default)]
    pub right_header: Option<String>,
}

impl ContentSpec {
    /// Graph page with no subtitle, notes or animation.
    pub fn graph(title: impl Into<String>, graph: GraphSpec) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            notes: None,
            animate: false,
            content: PageContent::Graph(graph),
        }
    }

    /// Two-column page with no subtitle, notes or animation.
    pub fn two_column(title: impl Into<String>, columns: TwoColumnSpec) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            notes: None,
            animate: false,
            content: PageContent::TwoColumn(columns),
        }
    }

    /// Reject content that can never be built: duplicate node ids and edges naming unknown nodes.
    ///
    /// The assembler tolerates both (it skips and records them); validation exists so authoring
    /// mistakes surface at load time rather than as diagnostics.
    pub fn validate(&self) -> SlidewrightResult<()> {
        let PageContent::Graph(g) = &self.content else {
            return Ok(());
        };
        let mut ids = HashSet::with_capacity(g.nodes.len());
        for n in &g.nodes {
            if n.id.is_empty() {
                return Err(SlidewrightError::validation("node id must not be empty"));
            }
            if !ids.insert(n.id.as_str()) {
                return Err(SlidewrightError::validation(format!(
                    "duplicate node id '{}'",
                    n.id
                )));
            }
        }
        for e in &g.edges {
            for end in [&e.from, &e.to] {
                if !ids.contains(end.as_str()) {
                    return Err(SlidewrightError::validation(format!(
                        "edge '{}' -> '{}' references unknown node '{end}'",
                        e.from, e.to
                    )));
                }
            }
        }
        Ok(())
    }
}

impl GraphSpec {
    pub fn node(&mut self, id: &str, label: &str) -> &mut Self {
        self.nodes.push(NodeSpec {
            id: id.to_string(),
            label: label.to_string(),
            color: None,
        });
        self
    }

    pub fn edge(&mut self, from: &str, to: &str, label: &str) -> &mut Self {
        self.edges.push(EdgeSpec {
            from: from.to_string(),
            to: to.to_string(),
            label: label.to_string(),
        });
        self
    }

    pub fn legend_item(&mut self, label: &str) -> &mut Self {
        self.legend.push(LegendItemSpec {
            label: label.to_string(),
            color: None,
        });
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// An ordered list of pages.
pub struct DeckSpec {
    /// Pages in output order.
    pub pages: Vec<ContentSpec>,
}

impl DeckSpec {
    /// Parse a deck from a JSON reader and validate every page.
    pub fn from_reader<R: std::io::Read>(r: R) -> SlidewrightResult<Self> {
        let deck: Self = serde_json::from_reader(r)
            .map_err(|e| SlidewrightError::validation(format!("parse deck JSON: {e}")))?;
        for (i, page) in deck.pages.iter().enumerate() {
            page.validate().map_err(|e| {
                SlidewrightError::validation(format!("page {i} ('{}'): {e}", page.title))
            })?;
        }
        Ok(deck)
    }

    /// Parse a deck from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SlidewrightResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SlidewrightError::validation(format!("open deck JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/content.rs"]
mod tests;
