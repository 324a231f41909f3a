use crate::config::{LayoutOptions, RenderConfig};
use crate::geometry::{Bounds, Point, round_to_fixed};
use crate::ir::Edge;
use crate::layout::routing::{curve_offsets, fan_offsets};
use crate::layout::{Layout, NodeLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;
use std::fmt;
use std::path::Path;

/// Drawn node radius as a share of the footprint radius.
const NODE_RADIUS_RATIO: f64 = 0.7;
const LABEL_GAP: f64 = 16.0;
/// Control points sit this far along the center-to-center span.
const CONTROL_RATIO: f64 = 0.4;
const OFFSET_RATIO: f64 = 0.3;
const ARROW_RATIO: f64 = 0.5;
const ARROW_ANGLE: f64 = PI / 6.0;
const LOOP_HEIGHT: f64 = 30.0;

/// Visible window onto layout space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}

/// Bounding box of every node circle plus the label strip under the lowest
/// row, padded on all sides. Falls back to the configured canvas size when
/// there is nothing to frame.
pub fn view_box(nodes: &[NodeLayout], options: &LayoutOptions, config: &RenderConfig) -> ViewBox {
    let radius = options.node_radius();
    let corners = nodes.iter().flat_map(|node| {
        let center = Point::new(round_to_fixed(node.x), round_to_fixed(node.y));
        [
            Point::new(center.x - radius, center.y - radius),
            Point::new(center.x + radius, center.y + radius + config.label_space),
        ]
    });
    let Some(bounds) = Bounds::of(corners) else {
        return ViewBox {
            x: 0.0,
            y: 0.0,
            width: config.width,
            height: config.height,
        };
    };

    let width = bounds.width() + config.padding * 2.0;
    let height = bounds.height() + config.padding * 2.0;
    let center = bounds.center();
    ViewBox {
        x: round_to_fixed(center.x - width / 2.0),
        y: round_to_fixed(center.y - height / 2.0),
        width: round_to_fixed(width),
        height: round_to_fixed(height),
    }
}

/// Nodes and edges to emphasise around a focused node.
#[derive(Debug, Default, PartialEq)]
pub struct HighlightTargets<'a> {
    pub nodes: HashSet<&'a str>,
    pub edges: HashSet<&'a str>,
}

pub fn highlight_targets<'a>(edges: &'a [Edge], focus: &'a str) -> HighlightTargets<'a> {
    let mut targets = HighlightTargets::default();
    targets.nodes.insert(focus);
    for edge in edges {
        if edge.source == focus {
            targets.nodes.insert(edge.target.as_str());
            targets.edges.insert(edge.id.as_str());
        }
        if edge.target == focus {
            targets.nodes.insert(edge.source.as_str());
            targets.edges.insert(edge.id.as_str());
        }
    }
    targets
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Normal,
    Highlighted,
    Dimmed,
}

impl Emphasis {
    fn of(id: &str, targets: Option<&HashSet<&str>>) -> Self {
        match targets {
            None => Self::Normal,
            Some(set) if set.contains(id) => Self::Highlighted,
            Some(_) => Self::Dimmed,
        }
    }
}

pub fn render_svg(
    layout: &Layout,
    theme: &Theme,
    options: &LayoutOptions,
    config: &RenderConfig,
) -> String {
    let mut by_id: HashMap<&str, &NodeLayout> = HashMap::with_capacity(layout.nodes.len());
    for node in &layout.nodes {
        by_id.entry(node.id.as_str()).or_insert(node);
    }

    let focus = config.focus.as_deref().filter(|id| {
        let known = by_id.contains_key(id);
        if !known {
            tracing::warn!(focus = *id, "focus node not in graph, rendering without focus");
        }
        known
    });
    let targets = focus.map(|id| highlight_targets(&layout.edges, id));

    let view = view_box(&layout.nodes, options, config);
    let radius = options.node_radius() * NODE_RADIUS_RATIO;
    let offsets = curve_offsets(&layout.nodes, &layout.edges);
    let fans = fan_offsets(&layout.edges);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"{view}\">",
        config.width, config.height
    ));
    svg.push_str(&format!(
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" stroke=\"{}\"/>",
        view.x, view.y, view.width, view.height, theme.background, theme.panel_border
    ));

    svg.push_str("<g class=\"edges\">");
    for edge in &layout.edges {
        let (Some(source), Some(target)) = (
            by_id.get(edge.source.as_str()),
            by_id.get(edge.target.as_str()),
        ) else {
            continue;
        };
        let emphasis = Emphasis::of(&edge.id, targets.as_ref().map(|t| &t.edges));
        let (color, stroke_width) = match emphasis {
            Emphasis::Highlighted => (&theme.edge_highlight_color, 2.0),
            Emphasis::Dimmed => (&theme.edge_dimmed_color, 0.5),
            Emphasis::Normal => (&theme.edge_color, 1.0),
        };
        let offset = offsets.get(&edge.id).copied().unwrap_or(0.0);
        let fan = fans.get(&edge.id).copied().unwrap_or(0.0);
        let shape = if edge.is_self_loop() {
            self_loop_shape(source.center(), radius)
        } else {
            edge_shape(source.center(), target.center(), radius, offset, fan)
        };

        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{stroke_width}\" data-edge=\"{}\"/>",
            shape.path,
            escape_xml(&edge.id)
        ));
        svg.push_str(&format!(
            "<polygon points=\"{}\" fill=\"{color}\"/>",
            points_attr(&shape.arrow)
        ));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"nodes\">");
    for node in &layout.nodes {
        let emphasis = Emphasis::of(&node.id, targets.as_ref().map(|t| &t.nodes));
        let circle_style = match emphasis {
            Emphasis::Highlighted => format!(
                "fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"",
                theme.node_highlight_fill, theme.node_highlight_stroke
            ),
            Emphasis::Dimmed => format!("fill=\"{}\"", theme.node_dimmed_fill),
            Emphasis::Normal => format!("fill=\"{}\"", theme.node_fill),
        };
        let text_color = match emphasis {
            Emphasis::Highlighted => &theme.text_highlight_color,
            Emphasis::Dimmed => &theme.text_dimmed_color,
            Emphasis::Normal => &theme.text_color,
        };

        svg.push_str(&format!(
            "<g transform=\"translate({}, {})\" data-node=\"{}\">",
            node.x,
            node.y,
            escape_xml(&node.id)
        ));
        svg.push_str(&format!(
            "<circle cx=\"0\" cy=\"0\" r=\"{radius}\" {circle_style}/>"
        ));
        svg.push_str(&format!(
            "<text x=\"0\" y=\"{}\" text-anchor=\"middle\" dominant-baseline=\"hanging\" font-family=\"{}\" font-size=\"{}\" fill=\"{text_color}\">{}</text>",
            radius + LABEL_GAP,
            escape_xml(&theme.font_family),
            theme.font_size,
            escape_xml(&node.label)
        ));
        svg.push_str("</g>");
    }
    svg.push_str("</g>");

    svg.push_str("</svg>");
    svg
}

struct EdgeShape {
    path: String,
    arrow: [Point; 3],
}

/// Cubic bezier between the two drawn circles, bowed sideways by
/// `curve_offset` plus the parallel-edge `fan`, with the arrowhead on the
/// target end.
fn edge_shape(
    source: Point,
    target: Point,
    radius: f64,
    curve_offset: f64,
    fan: f64,
) -> EdgeShape {
    let delta = target - source;
    let angle = delta.angle();
    let along = Point::polar(1.0, angle);
    let start = source + along * radius;
    let end = target - along * radius;

    let reach = delta.length() * CONTROL_RATIO;
    let bow = Point::polar(curve_offset * OFFSET_RATIO + fan, angle + PI / 2.0);
    let control1 = start + along * reach + bow;
    let control2 = end - along * reach + bow;

    EdgeShape {
        path: format!(
            "M {} C {} {} {}",
            coord(start),
            coord(control1),
            coord(control2),
            coord(end)
        ),
        arrow: arrowhead(end, angle, radius * ARROW_RATIO),
    }
}

fn self_loop_shape(center: Point, radius: f64) -> EdgeShape {
    let start = center + Point::polar(radius, -2.0 * PI / 3.0);
    let end = center + Point::polar(radius, -PI / 3.0);
    let lift = Point::new(0.0, radius + LOOP_HEIGHT);
    let control1 = Point::new(center.x - radius * 1.5, center.y) - lift;
    let control2 = Point::new(center.x + radius * 1.5, center.y) - lift;
    // arrives heading down and slightly left into the node
    let arrival = (end - control2).angle();

    EdgeShape {
        path: format!(
            "M {} C {} {} {}",
            coord(start),
            coord(control1),
            coord(control2),
            coord(end)
        ),
        arrow: arrowhead(end, arrival, radius * ARROW_RATIO),
    }
}

fn arrowhead(tip: Point, angle: f64, size: f64) -> [Point; 3] {
    [
        tip,
        tip - Point::polar(size, angle - ARROW_ANGLE),
        tip - Point::polar(size, angle + ARROW_ANGLE),
    ]
}

fn coord(point: Point) -> String {
    format!("{:.2} {:.2}", point.x, point.y)
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Arial".to_string();
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width as f32, render_cfg.height as f32) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
