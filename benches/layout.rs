use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use node_graph_layout::config::{LayoutMode, LayoutOptions, RenderConfig};
use node_graph_layout::layout::compute_layout;
use node_graph_layout::layout::routing::{RouteOptions, route_edges};
use node_graph_layout::parser::parse_graph;
use node_graph_layout::render::render_svg;
use node_graph_layout::theme::Theme;
use std::hint::black_box;

fn dense_edge_list(nodes: usize, extra_edges: usize) -> String {
    let mut out = String::from("graph TD\n");
    if nodes == 0 {
        return out;
    }
    for i in 0..nodes {
        out.push_str(&format!("N{}[Node {}]\n", i, i));
    }
    for i in 0..nodes.saturating_sub(1) {
        out.push_str(&format!("N{} --> N{}\n", i, i + 1));
    }
    let mut count = 0usize;
    for i in 0..nodes {
        for j in (i + 2)..nodes {
            if count >= extra_edges {
                break;
            }
            out.push_str(&format!("N{} --> N{}\n", i, j));
            count += 1;
        }
        if count >= extra_edges {
            break;
        }
    }
    out
}

fn bench_layout_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let cases = [("small", 10, 5), ("medium", 30, 40), ("large", 80, 120)];
    let modes = [
        ("auto", LayoutMode::Auto),
        ("hierarchical", LayoutMode::Hierarchical),
        ("radial", LayoutMode::Radial),
        ("force", LayoutMode::Force),
    ];

    for (size, nodes, extra) in cases {
        let graph = parse_graph(&dense_edge_list(nodes, extra)).expect("parse failed");
        for (mode_name, mode) in modes {
            let options = LayoutOptions {
                layout_mode: mode,
                ..LayoutOptions::default()
            };
            group.bench_with_input(
                BenchmarkId::new(mode_name, size),
                &graph,
                |b, graph| b.iter(|| compute_layout(black_box(graph), black_box(&options))),
            );
        }
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let source = dense_edge_list(40, 60);
    let options = LayoutOptions::default();
    let theme = Theme::default();
    let render = RenderConfig::default();

    group.bench_function("parse", |b| b.iter(|| parse_graph(black_box(&source))));

    let graph = parse_graph(&source).expect("parse failed");
    let layout = compute_layout(&graph, &options);
    group.bench_function("route", |b| {
        b.iter(|| route_edges(black_box(&layout.nodes), black_box(&layout.edges), &RouteOptions::default()))
    });
    group.bench_function("render", |b| {
        b.iter(|| render_svg(black_box(&layout), &theme, &options, &render))
    });
    group.bench_function("end_to_end", |b| {
        b.iter(|| {
            let graph = parse_graph(black_box(&source)).expect("parse failed");
            let layout = compute_layout(&graph, &options);
            render_svg(&layout, &theme, &options, &render)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_layout_modes, bench_pipeline);
criterion_main!(benches);
