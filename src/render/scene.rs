//! SVG drawing of a laid-out topology.

use std::fmt::Write;

use crate::{
    network::{autonomous_system::AsNode, topology_graph::TopologyGraph},
    render::labels::node_label,
};

const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";

#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    /// Vertical space reserved for the title.
    pub title_height: f64,
    pub node_radius: f64,
    pub node_fill: &'static str,
    pub local_node_fill: &'static str,
    pub edge_color: &'static str,
    pub name_font_size: f64,
    pub prefix_font_size: f64,
    pub title_font_size: f64,
}

impl Default for SceneSettings {
    /// A 15x10 inch figure at 100 dpi.
    fn default() -> Self {
        Self {
            width: 1500.0,
            height: 1000.0,
            margin: 120.0,
            title_height: 60.0,
            node_radius: 32.0,
            node_fill: "#add8e6",
            local_node_fill: "#6fa8dc",
            edge_color: "#333333",
            name_font_size: 11.0,
            prefix_font_size: 8.5,
            title_font_size: 20.0,
        }
    }
}

impl SceneSettings {
    /// Maps a layout coordinate in `[-1, 1]` to canvas pixels. Layout y grows upwards.
    fn to_canvas(&self, (x, y): (f64, f64)) -> (f64, f64) {
        let left = self.margin;
        let top = self.margin + self.title_height;
        let usable_w = (self.width - 2.0 * self.margin).max(1.0);
        let usable_h = (self.height - 2.0 * self.margin - self.title_height).max(1.0);
        (
            left + (x + 1.0) / 2.0 * usable_w,
            top + (1.0 - y) / 2.0 * usable_h,
        )
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Draws `graph` with node `positions` (indexed like the graph's nodes) as an SVG document.
pub fn render_svg(
    graph: &TopologyGraph,
    title: &str,
    positions: &[(f64, f64)],
    settings: &SceneSettings,
) -> String {
    let points: Vec<(f64, f64)> = positions.iter().map(|&p| settings.to_canvas(p)).collect();
    let r = settings.node_radius;

    // `write!` into a String cannot fail
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = settings.width,
        h = settings.height
    );
    let _ = write!(
        svg,
        r#"<defs><marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="7" markerHeight="7" orient="auto"><path d="M0,0 L10,5 L0,10 Z" fill="{}"/></marker></defs>"#,
        settings.edge_color
    );
    let _ = write!(
        svg,
        r#"<rect x="0" y="0" width="{}" height="{}" fill="white"/>"#,
        settings.width, settings.height
    );

    for (source, target) in graph.index_edges() {
        let (Some(&from), Some(&to)) = (points.get(source), points.get(target)) else {
            continue;
        };
        if source == target {
            let _ = write!(
                svg,
                r#"<path d="M {:.1} {:.1} C {:.1} {:.1} {:.1} {:.1} {:.1} {:.1}" fill="none" stroke="{c}" stroke-width="1.2" marker-end="url(#arrow)"/>"#,
                from.0 - r * 0.5,
                from.1 - r * 0.87,
                from.0 - r * 1.5,
                from.1 - r * 2.6,
                from.0 + r * 1.5,
                from.1 - r * 2.6,
                from.0 + r * 0.5,
                from.1 - r * 0.87,
                c = settings.edge_color
            );
            continue;
        }
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let distance = dx.hypot(dy);
        if distance <= 2.0 * r {
            continue;
        }
        let (ux, uy) = (dx / distance, dy / distance);
        let _ = write!(
            svg,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1.2" marker-end="url(#arrow)"/>"#,
            from.0 + ux * r,
            from.1 + uy * r,
            to.0 - ux * (r + 1.0),
            to.1 - uy * (r + 1.0),
            settings.edge_color
        );
    }

    for (node, &(cx, cy)) in graph.nodes().zip(points.iter()) {
        draw_node(&mut svg, node, cx, cy, settings);
    }

    let _ = write!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="{FONT_FAMILY}" font-size="{}">{}</text>"#,
        settings.width / 2.0,
        settings.margin / 2.0 + settings.title_font_size,
        settings.title_font_size,
        escape_xml(title)
    );
    svg.push_str("</svg>");
    svg
}

fn draw_node(svg: &mut String, node: &AsNode, cx: f64, cy: f64, settings: &SceneSettings) {
    let fill = if node.is_local() {
        settings.local_node_fill
    } else {
        settings.node_fill
    };
    let _ = write!(
        svg,
        r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{}" fill="{fill}" stroke="{}" stroke-width="0.8"/>"#,
        settings.node_radius, settings.edge_color
    );

    let label = node_label(node);
    let line_height = settings.prefix_font_size * 1.25;
    let first_baseline = cy - (label.lines.len() as f64 - 1.0) * line_height / 2.0
        + settings.prefix_font_size / 2.0;
    for (i, line) in label.lines.iter().enumerate() {
        let (size, weight) = if i == 0 {
            (settings.name_font_size, "bold")
        } else {
            (settings.prefix_font_size, "normal")
        };
        let _ = write!(
            svg,
            r#"<text x="{cx:.1}" y="{:.1}" text-anchor="middle" font-family="{FONT_FAMILY}" font-size="{size}" font-weight="{weight}">{}</text>"#,
            first_baseline + i as f64 * line_height,
            escape_xml(line)
        );
    }
}
