use crate::config::{Config, LayoutMode, LayoutOptions, load_config};
use crate::layout::compute_layout;
use crate::layout::routing::RouteOptions;
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_graph;
use crate::render::{render_svg, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "ngl", version, about = "Automatic node-graph layout and rendering")]
pub struct Args {
    /// Input graph (JSON or edge list) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON5 file (theme, themeVariables, layout, render)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Layout mode: hierarchical, radial, force or auto
    #[arg(short = 'm', long = "mode", value_parser = parse_mode)]
    pub mode: Option<LayoutMode>,

    /// Use the compact spacing preset
    #[arg(long = "compact")]
    pub compact: bool,

    /// Highlight this node and its neighbours
    #[arg(long = "focus")]
    pub focus: Option<String>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

fn parse_mode(token: &str) -> std::result::Result<LayoutMode, String> {
    LayoutMode::from_token(token).ok_or_else(|| {
        format!("unknown layout mode `{token}` (expected hierarchical, radial, force or auto)")
    })
}

pub fn run() -> Result<()> {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init();

    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    let input = read_input(args.input.as_deref())?;
    let graph = parse_graph(&input)?;
    let layout = compute_layout(&graph, &config.layout);
    tracing::info!(
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        strategy = ?layout.strategy,
        "layout complete"
    );

    match args.output_format {
        OutputFormat::Json => {
            let route_options = RouteOptions {
                node_width: config.layout.node_width,
                node_height: config.layout.node_height,
                ..RouteOptions::default()
            };
            write_layout_dump(args.output.as_deref(), &layout, &route_options)?;
        }
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &config.theme, &config.layout, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&layout, &config.theme, &config.layout, &config.render);
            write_png(&svg, &output, &config)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

/// Command-line flags win over the config file.
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if args.compact {
        let base = std::mem::take(&mut config.layout);
        config.layout = LayoutOptions {
            node_width: base.node_width,
            node_height: base.node_height,
            enable_collision_avoidance: base.enable_collision_avoidance,
            use_force_directed: base.use_force_directed,
            force_strength: base.force_strength,
            layout_mode: base.layout_mode,
            radial: base.radial,
            collision: base.collision,
            ..LayoutOptions::compact(config.render.width)
        };
    }
    if let Some(mode) = args.mode {
        config.layout.layout_mode = mode;
    }
    if args.focus.is_some() {
        config.render.focus = args.focus.clone();
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "ngl", "-i", "graph.txt", "-e", "json", "-m", "radial", "--compact", "--focus", "A",
            "-w", "640",
        ])
        .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("graph.txt")));
        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.mode, Some(LayoutMode::Radial));
        assert!(args.compact);
        assert_eq!(args.focus.as_deref(), Some("A"));
        assert_eq!(args.width, Some(640.0));
        assert_eq!(args.height, None);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Args::try_parse_from(["ngl", "--mode", "grid"]).is_err());
    }

    #[test]
    fn overrides_apply_on_top_of_config() {
        let args = Args::try_parse_from([
            "ngl", "--compact", "-w", "400", "-H", "300", "-m", "force", "--focus", "hub",
        ])
        .unwrap();
        let mut config = Config::default();
        config.layout.node_width = 60.0;
        apply_overrides(&mut config, &args);

        assert_eq!(config.render.width, 400.0);
        assert_eq!(config.render.height, 300.0);
        assert!(config.layout.compact_mode);
        assert_eq!(config.layout.max_width, 600.0);
        assert_eq!(config.layout.horizontal_spacing, 100.0);
        assert_eq!(config.layout.node_width, 60.0);
        assert_eq!(config.layout.layout_mode, LayoutMode::Force);
        assert_eq!(config.render.focus.as_deref(), Some("hub"));
    }

    #[test]
    fn png_needs_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        assert_eq!(
            ensure_output(&Some(PathBuf::from("out.png")), "png").unwrap(),
            PathBuf::from("out.png")
        );
    }
}
