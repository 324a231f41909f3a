use crate::ir::{Edge, Graph, Node};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(flowchart|graph)(\s+\w+)?\s*;?$").unwrap());
static NODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<id>[\w.:]+)\s*(?:\[(?P<label>[^\[\]]*)\])?$").unwrap()
});
static ARROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(?:--(?P<id>[\w.:]+)-->|-->|->)\s*").unwrap());

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON graph: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

impl ParseError {
    fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsonGraph {
    nodes: Vec<JsonNode>,
    edges: Vec<JsonEdge>,
}

#[derive(Debug, Deserialize)]
struct JsonNode {
    id: String,
    label: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct JsonEdge {
    id: Option<String>,
    source: String,
    target: String,
}

/// Reads a graph from either a JSON document (input starting with `{`) or
/// the line-based edge-list format.
pub fn parse_graph(input: &str) -> Result<Graph, ParseError> {
    if input.trim_start().starts_with('{') {
        parse_json(input)
    } else {
        parse_edge_list(input)
    }
}

fn parse_json(input: &str) -> Result<Graph, ParseError> {
    let parsed: JsonGraph = serde_json::from_str(input)?;
    let nodes = parsed
        .nodes
        .into_iter()
        .map(|node| {
            let label = node.label.unwrap_or_else(|| node.id.clone());
            Node {
                id: node.id,
                label,
                x: node.x,
                y: node.y,
            }
        })
        .collect();
    let edges = parsed
        .edges
        .into_iter()
        .enumerate()
        .map(|(idx, edge)| Edge {
            id: edge.id.unwrap_or_else(|| format!("e{idx}")),
            source: edge.source,
            target: edge.target,
        })
        .collect();
    Ok(Graph { nodes, edges })
}

fn is_comment(line: &str) -> bool {
    line.starts_with("%%") || line.starts_with('#')
}

fn parse_edge_list(input: &str) -> Result<Graph, ParseError> {
    let mut graph = Graph::new();
    let mut seen_statement = false;

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim().trim_end_matches(';').trim_end();
        if line.is_empty() || is_comment(line) {
            continue;
        }
        if !seen_statement && HEADER_RE.is_match(line) {
            seen_statement = true;
            continue;
        }
        seen_statement = true;
        parse_statement(&mut graph, line, line_no)?;
    }

    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "parsed edge list"
    );
    Ok(graph)
}

/// Byte offsets of `line` that sit inside a `[...]` label.
fn bracketed(line: &str) -> Vec<bool> {
    let mut depth = 0usize;
    let mut inside = vec![false; line.len()];
    for (pos, ch) in line.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        for flag in &mut inside[pos..pos + ch.len_utf8()] {
            *flag = depth > 0;
        }
    }
    inside
}

fn parse_statement(graph: &mut Graph, line: &str, line_no: usize) -> Result<(), ParseError> {
    let inside = bracketed(line);
    let arrows: Vec<_> = ARROW_RE
        .captures_iter(line)
        .filter(|caps| caps.get(0).is_some_and(|m| !inside[m.start()]))
        .collect();

    let mut segments = Vec::with_capacity(arrows.len() + 1);
    let mut edge_ids = Vec::with_capacity(arrows.len());
    let mut cursor = 0;
    for caps in &arrows {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        segments.push(&line[cursor..whole.start()]);
        edge_ids.push(caps.name("id").map(|m| m.as_str().to_string()));
        cursor = whole.end();
    }
    segments.push(&line[cursor..]);

    let mut ids = Vec::with_capacity(segments.len());
    for segment in segments {
        let Some(caps) = NODE_RE.captures(segment.trim()) else {
            let message = if segment.trim().is_empty() {
                "edge is missing an endpoint".to_string()
            } else {
                format!("unrecognized statement `{}`", segment.trim())
            };
            return Err(ParseError::syntax(line_no, message));
        };
        let id = caps["id"].to_string();
        let label = caps.name("label").map(|m| m.as_str().trim().to_string());
        graph.ensure_node(&id, label);
        ids.push(id);
    }

    for (pair, explicit_id) in ids.windows(2).zip(edge_ids) {
        match explicit_id {
            Some(edge_id) => graph.edges.push(Edge::new(edge_id, &pair[0], &pair[1])),
            None => {
                graph.add_edge(&pair[0], &pair[1]);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_edge_list_with_header_and_comments() {
        let input = "graph TD\n%% a comment\n# another\nA[Start] --> B\nB -> C[End]\n";
        let graph = parse_graph(input).unwrap();
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(graph.node("A").unwrap().label, "Start");
        assert_eq!(graph.node("B").unwrap().label, "B");
        assert_eq!(graph.node("C").unwrap().label, "End");
        assert_eq!(graph.edges[0], Edge::new("e0", "A", "B"));
        assert_eq!(graph.edges[1], Edge::new("e1", "B", "C"));
    }

    #[test]
    fn chains_and_explicit_edge_ids() {
        let graph = parse_graph("a --> b --> c\na --link--> c").unwrap();
        assert_eq!(graph.edges.len(), 3);
        assert_eq!(graph.edges[1], Edge::new("e1", "b", "c"));
        assert_eq!(graph.edges[2], Edge::new("link", "a", "c"));
    }

    #[test]
    fn declarations_keep_first_node_and_explicit_label_wins() {
        let graph = parse_graph("a\nb[Bee]\na --> b\na[Ay]").unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.node("a").unwrap().label, "Ay");
        assert_eq!(graph.node("b").unwrap().label, "Bee");
    }

    #[test]
    fn arrows_inside_labels_are_text() {
        let graph = parse_graph("a[x -> y] --> b").unwrap();
        assert_eq!(graph.node("a").unwrap().label, "x -> y");
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn unknown_lines_report_line_number() {
        let err = parse_graph("a --> b\n\nthis is not valid").unwrap_err();
        match err {
            ParseError::Syntax { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            parse_graph("a -->"),
            Err(ParseError::Syntax { line: 1, .. })
        ));
    }

    #[test]
    fn late_header_is_rejected() {
        assert!(parse_graph("a --> b\ngraph TD").is_err());
    }

    #[test]
    fn parses_json_with_defaults() {
        let input = r#"{
            "nodes": [{"id": "A"}, {"id": "B", "label": "Bee", "x": 1.5, "y": 2}],
            "edges": [{"source": "A", "target": "B"}, {"id": "back", "source": "B", "target": "A"}]
        }"#;
        let graph = parse_graph(input).unwrap();
        assert_eq!(graph.nodes[0].label, "A");
        assert_eq!(graph.nodes[1].label, "Bee");
        assert_eq!(graph.nodes[1].x, Some(1.5));
        assert_eq!(graph.edges[0].id, "e0");
        assert_eq!(graph.edges[1].id, "back");
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(parse_graph("{\"nodes\": ["), Err(ParseError::Json(_))));
    }
}
