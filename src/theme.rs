use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f64,
    pub node_fill: String,
    pub node_highlight_fill: String,
    pub node_highlight_stroke: String,
    pub node_dimmed_fill: String,
    pub edge_color: String,
    pub edge_highlight_color: String,
    pub edge_dimmed_color: String,
    pub text_color: String,
    pub text_highlight_color: String,
    pub text_dimmed_color: String,
    pub panel_border: String,
    pub background: String,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            font_family: "Arial, sans-serif".to_string(),
            font_size: 11.0,
            node_fill: "#808080".to_string(),
            node_highlight_fill: "#00bcd4".to_string(),
            node_highlight_stroke: "#0097a7".to_string(),
            node_dimmed_fill: "#d0d0d0".to_string(),
            edge_color: "#CCCCCC".to_string(),
            edge_highlight_color: "#87CEFA".to_string(),
            edge_dimmed_color: "#e0e0e0".to_string(),
            text_color: "#333333".to_string(),
            text_highlight_color: "#006064".to_string(),
            text_dimmed_color: "#999999".to_string(),
            panel_border: "#e0e0e0".to_string(),
            background: "#f9f9f9".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            node_fill: "#9aa4b2".to_string(),
            node_highlight_fill: "#559eff".to_string(),
            node_highlight_stroke: "#82aeff".to_string(),
            node_dimmed_fill: "#3a3f47".to_string(),
            edge_color: "#5c6470".to_string(),
            edge_highlight_color: "#a9e7ff".to_string(),
            edge_dimmed_color: "#2c3138".to_string(),
            text_color: "#e6e9ee".to_string(),
            text_highlight_color: "#a9e7ff".to_string(),
            text_dimmed_color: "#6b7280".to_string(),
            panel_border: "#2c3138".to_string(),
            background: "#15181d".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
