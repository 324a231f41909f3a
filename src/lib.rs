#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{LayoutMode, LayoutOptions};
pub use ir::{Edge, Graph, Node};
pub use layout::{Layout, NodeLayout, Strategy, calculate_layout, compute_layout};
pub use parser::{ParseError, parse_graph};
