//! Human-readable formatting for CLI output.

use crate::forest::{MoveOutcome, ValidationReport};
use crate::tree::{Node, SortMode};
use crate::views::format_label;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Section heading for CLI text output.
pub fn format_section_heading(title: &str, color: bool) -> String {
    if color {
        format!("{}", title.bold().underline())
    } else {
        title.to_string()
    }
}

/// Table of nodes in the order given.
pub fn format_node_table(title: &str, nodes: &[Node], sort: SortMode, color: bool) -> String {
    if nodes.is_empty() {
        return "No nodes.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Name", "Index"]);
    for node in nodes {
        table.add_row(vec![
            node.id.to_string(),
            node.name.clone(),
            node.display_index.to_string(),
        ]);
    }
    format!(
        "{} ({})\n{}\n\nTotal: {} node(s)",
        format_section_heading(title, color),
        sort,
        table,
        nodes.len()
    )
}

pub struct NodeDetail<'a> {
    pub node: &'a Node,
    pub children: usize,
    pub descendants: usize,
    pub can_move_up: bool,
    pub can_move_down: bool,
}

pub fn format_node_detail(detail: &NodeDetail<'_>, color: bool) -> String {
    let node = detail.node;
    let mut out = format!("{}\n", format_section_heading("Node", color));
    out.push_str(&format!("  Label:         {}\n", format_label(node, color)));
    out.push_str(&format!("  Parent:        {}\n", node.parent));
    out.push_str(&format!("  Display index: {}\n", node.display_index));
    out.push_str(&format!("  Children:      {}\n", detail.children));
    out.push_str(&format!("  Descendants:   {}\n", detail.descendants));
    out.push_str(&format!(
        "  Can move:      {}",
        match (detail.can_move_up, detail.can_move_down) {
            (true, true) => "up, down",
            (true, false) => "up",
            (false, true) => "down",
            (false, false) => "-",
        }
    ));
    out
}

pub fn format_move_outcome(outcome: &MoveOutcome) -> String {
    if outcome.success {
        outcome.message.clone()
    } else {
        format!("Move rejected: {}", outcome.message)
    }
}

pub fn format_validation_report(report: &ValidationReport) -> String {
    if report.valid {
        format!(
            "Validation passed:\n  Nodes: {}\n  Sibling groups: {}\n  All checks passed",
            report.node_count, report.group_count
        )
    } else {
        let mut s = format!(
            "Validation completed with issues:\n  Nodes: {}\n  Sibling groups: {}\n\nIssues ({}):",
            report.node_count,
            report.group_count,
            report.issues.len()
        );
        for issue in &report.issues {
            s.push_str(&format!("\n  - {}", issue));
        }
        let groups = report.groups_needing_normalization();
        if !groups.is_empty() {
            s.push_str("\n\nRun `grove normalize --all` to renumber affected groups.");
        }
        s
    }
}
