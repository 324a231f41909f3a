use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which placement algorithm the engine should run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Hierarchical,
    Radial,
    Force,
    #[default]
    Auto,
}

impl LayoutMode {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "hierarchical" | "layered" | "tb" => Some(Self::Hierarchical),
            "radial" => Some(Self::Radial),
            "force" | "force-directed" => Some(Self::Force),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialOptions {
    pub center_radius: f64,
    pub layer_spacing: f64,
}

impl Default for RadialOptions {
    fn default() -> Self {
        Self {
            center_radius: 120.0,
            layer_spacing: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CollisionOptions {
    /// Overrides the `max(node_width, node_height) + 20` default.
    pub minimum_distance: Option<f64>,
}

/// Caller-supplied knobs for one layout call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    pub node_width: f64,
    pub node_height: f64,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
    pub compact_mode: bool,
    pub max_width: f64,
    pub min_node_spacing: f64,
    pub enable_collision_avoidance: bool,
    pub use_force_directed: bool,
    pub force_strength: f64,
    pub layout_mode: LayoutMode,
    #[serde(rename = "radialOptions")]
    pub radial: RadialOptions,
    #[serde(rename = "collisionOptions")]
    pub collision: CollisionOptions,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_width: 80.0,
            node_height: 40.0,
            horizontal_spacing: 150.0,
            vertical_spacing: 100.0,
            compact_mode: false,
            max_width: 1200.0,
            min_node_spacing: 60.0,
            enable_collision_avoidance: false,
            use_force_directed: false,
            force_strength: 0.1,
            layout_mode: LayoutMode::Auto,
            radial: RadialOptions::default(),
            collision: CollisionOptions::default(),
        }
    }
}

impl LayoutOptions {
    /// Spacing preset used for dense diagrams sized to a `width`-wide canvas.
    pub fn compact(width: f64) -> Self {
        Self {
            horizontal_spacing: 100.0,
            vertical_spacing: 80.0,
            compact_mode: true,
            max_width: width * 1.5,
            min_node_spacing: 50.0,
            ..Self::default()
        }
    }

    pub fn minimum_distance(&self) -> f64 {
        self.collision
            .minimum_distance
            .unwrap_or_else(|| self.node_width.max(self.node_height) + 20.0)
    }

    /// Radius of the circle that stands in for a node in routing and bounds.
    pub fn node_radius(&self) -> f64 {
        self.node_width.min(self.node_height) / 2.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub label_space: f64,
    /// Node whose direct neighbourhood is highlighted.
    pub focus: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            padding: 50.0,
            label_space: 20.0,
            focus: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutOptions,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f64>,
    node_fill: Option<String>,
    node_highlight_fill: Option<String>,
    node_dimmed_fill: Option<String>,
    edge_color: Option<String>,
    edge_highlight_color: Option<String>,
    text_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutOptions>,
    render: Option<RenderConfig>,
}

/// Loads a JSON5 (or plain JSON) config file on top of the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = json5::from_str(&contents)?;
    apply_config_file(&mut config, parsed);
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) {
    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "dark" => config.theme = Theme::dark(),
            "default" | "light" => config.theme = Theme::light(),
            other => tracing::warn!(theme = other, "unknown theme, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_highlight_fill {
            config.theme.node_highlight_fill = v;
        }
        if let Some(v) = vars.node_dimmed_fill {
            config.theme.node_dimmed_fill = v;
        }
        if let Some(v) = vars.edge_color {
            config.theme.edge_color = v;
        }
        if let Some(v) = vars.edge_highlight_color {
            config.theme.edge_highlight_color = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        config.layout = layout;
    }
    if let Some(render) = parsed.render {
        config.render = render;
    }
}
