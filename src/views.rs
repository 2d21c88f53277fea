//! Forest Views
//!
//! Flattens the forest into display lines (pre-order, one line per node) under
//! a sort mode. The walk keeps its own stack so arbitrarily deep forests
//! render without recursion.

use crate::error::ApiError;
use crate::forest::ForestService;
use crate::tree::{Node, Parent, SortMode};
use owo_colors::OwoColorize;
use serde::Serialize;

/// One rendered node
#[derive(Debug, Clone, Serialize)]
pub struct ViewLine {
    pub depth: usize,
    pub node: Node,
    /// For each ancestor level (outermost first): whether that ancestor was
    /// the last of its group. Drives the tree guides.
    #[serde(skip)]
    pub guides: Vec<bool>,
    #[serde(skip)]
    pub is_last: bool,
}

/// A pre-order rendering of the whole forest, or of one subtree
#[derive(Debug, Clone, Serialize)]
pub struct ForestView {
    pub sort: SortMode,
    pub lines: Vec<ViewLine>,
}

impl ForestView {
    /// Render every tree in the forest.
    pub fn build(service: &ForestService, sort: SortMode) -> Result<Self, ApiError> {
        Self::build_from(service, Parent::Root, sort)
    }

    /// Render everything below `top` (the group under `top`, then their
    /// descendants).
    pub fn build_from(
        service: &ForestService,
        top: Parent,
        sort: SortMode,
    ) -> Result<Self, ApiError> {
        let mut lines = Vec::new();
        let mut stack: Vec<(Node, usize, Vec<bool>, bool)> = Vec::new();
        push_group(&mut stack, service.get_group(top, sort)?, 0, Vec::new());

        while let Some((node, depth, guides, is_last)) = stack.pop() {
            let children = service.get_children(node.id, sort)?;
            let mut child_guides = guides.clone();
            child_guides.push(is_last);
            push_group(&mut stack, children, depth + 1, child_guides);
            lines.push(ViewLine {
                depth,
                node,
                guides,
                is_last,
            });
        }

        Ok(Self { sort, lines })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Text rendering with box-drawing guides. Top-level nodes carry no
    /// connector.
    pub fn render_text(&self, color: bool) -> String {
        let mut out = String::new();
        for line in &self.lines {
            if line.depth > 0 {
                // skip the top level's own flag: top-level nodes draw no guide column
                for last in line.guides.iter().skip(1) {
                    out.push_str(if *last { "    " } else { "│   " });
                }
                out.push_str(if line.is_last { "└── " } else { "├── " });
            }
            out.push_str(&format_label(&line.node, color));
            out.push('\n');
        }
        out
    }
}

fn push_group(
    stack: &mut Vec<(Node, usize, Vec<bool>, bool)>,
    group: Vec<Node>,
    depth: usize,
    guides: Vec<bool>,
) {
    let count = group.len();
    // reversed so the first node is popped first
    for (position, node) in group.into_iter().enumerate().rev() {
        stack.push((node, depth, guides.clone(), position + 1 == count));
    }
}

/// `Name #id` with the id dimmed when colored.
pub fn format_label(node: &Node, color: bool) -> String {
    let id = format!("#{}", node.id);
    if color {
        format!("{} {}", node.name.bold(), id.dimmed())
    } else {
        format!("{} {}", node.name, id)
    }
}
