//! SVG flamegraph generation.
//!
//! Builds a render tree from collapsed stacks and emits an inverted
//! flamegraph (root at the bottom) with hover titles and a legend.

use crate::cct::CollapsedStack;
use crate::utils::config::DEFAULT_FLAMEGRAPH_WIDTH;
use crate::utils::error::FlamegraphError;
use log::info;
use std::collections::HashMap;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Profiling Session".to_string(),
            width: DEFAULT_FLAMEGRAPH_WIDTH,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Internal node structure for building the render tree
struct Node {
    name: String,
    value: u64,
    children: HashMap<String, Node>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            value: 0,
            children: HashMap::new(),
        }
    }

    fn insert(&mut self, stack: &[&str], value: u64) {
        self.value += value;
        if let Some((head, tail)) = stack.split_first() {
            let child = self
                .children
                .entry(head.to_string())
                .or_insert_with(|| Node::new(head.to_string()));
            child.insert(tail, value);
        }
    }
}

/// Generate an SVG flamegraph from collapsed stacks
///
/// **Public** - main entry point
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - nothing to render
pub fn generate_flamegraph(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    if stacks.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph with {} stacks", stacks.len());

    let mut root = Node::new("root".to_string());
    for stack in stacks {
        let stack_parts: Vec<&str> = stack.stack.split(';').collect();
        root.insert(&stack_parts, stack.weight);
    }

    let max_depth = calculate_max_depth(&root);

    let mut svg = String::new();
    let width = config.width;
    let height_per_level = 20;
    let graph_height = (max_depth + 1) * height_per_level;
    let legend_height = 60;
    let total_height = graph_height + legend_height;

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        width, total_height, width, total_height
    ));

    svg.push_str(
        r#"<style>.func { font: 12px sans-serif; } .func:hover { stroke: black; stroke-width: 1; cursor: pointer; opacity: 0.9; }</style>"#,
    );

    svg.push_str(&format!(
        r#"<text x="{}" y="20" font-size="16" text-anchor="middle" font-weight="bold">{}</text>"#,
        width / 2,
        xml_escape(&config.title)
    ));

    render_node(&root, 0, 0.0, width as f64, &mut svg, height_per_level, graph_height);
    render_legend(&mut svg, graph_height);

    svg.push_str("</svg>");

    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

fn calculate_max_depth(node: &Node) -> usize {
    node.children
        .values()
        .map(|c| calculate_max_depth(c) + 1)
        .max()
        .unwrap_or(0)
}

fn get_node_color(name: &str) -> &'static str {
    if name.contains("alloc") || name.contains("new") {
        "rgb(255, 140, 0)" // Dark Orange
    } else if name.contains("read") || name.contains("write") || name.contains("io") {
        "rgb(34, 139, 34)" // Forest Green
    } else if name.contains("lock") || name.contains("wait") || name.contains("sleep") {
        "rgb(220, 20, 60)" // Crimson (blocked time)
    } else if name == "root" {
        "rgb(100, 149, 237)" // Cornflower Blue
    } else {
        "rgb(205, 92, 92)" // Indian Red (plain code)
    }
}

fn get_ansi_color(name: &str) -> &'static str {
    if name.contains("alloc") || name.contains("new") {
        "\x1b[33m" // Yellow/Orange
    } else if name.contains("read") || name.contains("write") || name.contains("io") {
        "\x1b[32m" // Green
    } else if name.contains("lock") || name.contains("wait") || name.contains("sleep") {
        "\x1b[31;1m" // Red
    } else if name == "root" {
        "\x1b[36m" // Cyan
    } else {
        "\x1b[90m" // Gray
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// At most `max_chars` characters from the front, never splitting a
/// multi-byte character
fn prefix_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// At most `max_chars` characters from the end, never splitting a
/// multi-byte character
fn suffix_chars(s: &str, max_chars: usize) -> &str {
    let total = s.chars().count();
    if total <= max_chars {
        return s;
    }
    match s.char_indices().nth(total - max_chars) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

fn render_node(
    node: &Node,
    level: usize,
    x: f64,
    w: f64,
    out: &mut String,
    h: usize,
    graph_height: usize,
) {
    // Invisible blocks are not worth the SVG bytes
    if w < 0.5 {
        return;
    }

    let color = get_node_color(&node.name);

    // Inverted layout: root at the bottom, 30px margin for the title
    let y = graph_height - ((level + 1) * h) + 30;

    out.push_str(&format!(
        r#"<rect x="{:.2}" y="{}" width="{:.2}" height="{}" fill="{}" class="func"><title>{} ({})</title></rect>"#,
        x,
        y,
        w,
        h,
        color,
        xml_escape(&node.name),
        node.value
    ));

    if w > 35.0 {
        let char_width = 7.0;
        let max_chars = (w / char_width) as usize;
        let display_name = if node.name.chars().count() > max_chars && max_chars > 3 {
            format!("{}...", prefix_chars(&node.name, max_chars - 3))
        } else {
            node.name.clone()
        };

        if !display_name.is_empty() {
            out.push_str(&format!(
                r#"<text x="{:.2}" y="{}" dx="4" dy="14" font-size="12" fill="white" pointer-events="none">{}</text>"#,
                x,
                y,
                xml_escape(&display_name)
            ));
        }
    }

    let mut current_x = x;
    let mut children: Vec<&Node> = node.children.values().collect();
    children.sort_by(|a, b| b.value.cmp(&a.value).then(a.name.cmp(&b.name)));

    for child in children {
        let child_w = if node.value > 0 {
            (child.value as f64 / node.value as f64) * w
        } else {
            0.0
        };
        render_node(child, level + 1, current_x, child_w, out, h, graph_height);
        current_x += child_w;
    }
}

fn render_legend(out: &mut String, graph_height: usize) {
    let legend_y = graph_height + 50;

    out.push_str(&format!(
        r#"<text x="10" y="{}" font-size="14" font-weight="bold">Legend:</text>"#,
        legend_y
    ));

    let items = [
        ("Allocation", "rgb(255, 140, 0)"),
        ("I/O", "rgb(34, 139, 34)"),
        ("Blocked", "rgb(220, 20, 60)"),
        ("Code", "rgb(205, 92, 92)"),
    ];

    for (i, (label, color)) in items.iter().enumerate() {
        let x = 80 + (i * 120);
        out.push_str(&format!(
            r#"<rect x="{}" y="{}" width="15" height="15" fill="{}" rx="2"/>"#,
            x,
            legend_y - 12,
            color
        ));
        out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="12">{}</text>"#,
            x + 20,
            legend_y,
            label
        ));
    }
}

/// Create a text summary with percentages and a bar chart
pub fn generate_text_summary(stacks: &[CollapsedStack], max_lines: usize, total_weight: u64) -> String {
    let mut lines = Vec::new();
    let total = total_weight.max(1);

    lines.push("  HOT PATHS".to_string());
    lines.push(format!(
        "  {:<52} {:>12} {:>8}",
        "Stack (hottest first)", "Weight", "%"
    ));

    for stack in stacks.iter().take(max_lines) {
        let percentage = (stack.weight as f64 / total as f64) * 100.0;

        let frame = stack.stack.split(';').next_back().unwrap_or(&stack.stack);
        let color = get_ansi_color(frame);
        let reset = "\x1b[0m";

        let display_stack = if stack.stack.chars().count() > 50 {
            format!("...{}", suffix_chars(&stack.stack, 47))
        } else {
            stack.stack.clone()
        };

        lines.push(format!(
            "  {}{:<52}{} {:>12} {:>7.1}%",
            color, display_stack, reset, stack.weight, percentage
        ));
    }

    lines.push(String::new());
    for stack in stacks.iter().take(5) {
        let percentage = (stack.weight as f64 / total as f64) * 100.0;
        let bar = "#".repeat((percentage / 2.0) as usize);

        let frame = stack.stack.split(';').next_back().unwrap_or(&stack.stack);
        lines.push(format!("  {:<24} {:<50} {:>5.1}%", frame, bar, percentage));
    }

    if stacks.len() > max_lines {
        lines.push(String::new());
        lines.push(format!(
            "  (Showing top {} of {} unique paths)",
            max_lines,
            stacks.len()
        ));
    }

    lines.join("\n")
}
