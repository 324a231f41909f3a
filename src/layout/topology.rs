use super::*;

/// Arena view of a graph: every node gets a dense index in input order and
/// adjacency is kept as index lists.
#[derive(Debug, Clone)]
pub(crate) struct Topology {
    pub forward: Vec<Vec<usize>>,
    pub reverse: Vec<Vec<usize>>,
    pub in_degree: Vec<usize>,
}

impl Topology {
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Edge count touching `idx`, in either direction.
    pub fn degree(&self, idx: usize) -> usize {
        self.forward[idx].len() + self.reverse[idx].len()
    }

    pub fn roots(&self) -> Vec<usize> {
        (0..self.len()).filter(|&idx| self.in_degree[idx] == 0).collect()
    }

    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.forward[idx]
            .iter()
            .chain(self.reverse[idx].iter())
            .copied()
    }
}

pub(crate) fn index_nodes(graph: &Graph) -> HashMap<&str, usize> {
    let mut index = HashMap::with_capacity(graph.nodes.len());
    for (idx, node) in graph.nodes.iter().enumerate() {
        index.entry(node.id.as_str()).or_insert(idx);
    }
    index
}

/// Forward/reverse adjacency and in-degrees. Edges with an unknown endpoint
/// and self-loops take no part in topology.
pub(crate) fn build_adjacency(graph: &Graph, index: &HashMap<&str, usize>) -> Topology {
    let count = graph.nodes.len();
    let mut forward = vec![Vec::new(); count];
    let mut reverse = vec![Vec::new(); count];
    let mut in_degree = vec![0usize; count];

    for edge in &graph.edges {
        let (Some(&from), Some(&to)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) else {
            continue;
        };
        if from == to {
            continue;
        }
        forward[from].push(to);
        reverse[to].push(from);
        in_degree[to] += 1;
    }

    Topology {
        forward,
        reverse,
        in_degree,
    }
}

/// Kahn-style leveling. Nodes the sweep cannot reach (cycles without an
/// acyclic entry) are promoted one at a time, in input order, to synthetic
/// roots one level below their deepest leveled parent.
pub(crate) fn assign_levels(topology: &Topology) -> Vec<usize> {
    let count = topology.len();
    let mut remaining = topology.in_degree.clone();
    let mut levels: Vec<Option<usize>> = vec![None; count];
    let mut queue = VecDeque::new();

    for idx in topology.roots() {
        levels[idx] = Some(0);
        queue.push_back(idx);
    }

    loop {
        while let Some(current) = queue.pop_front() {
            let Some(level) = levels[current] else {
                continue;
            };
            for &child in &topology.forward[current] {
                if levels[child].is_some() {
                    continue;
                }
                remaining[child] = remaining[child].saturating_sub(1);
                if remaining[child] == 0 {
                    levels[child] = Some(level + 1);
                    queue.push_back(child);
                }
            }
        }

        let Some(root) = levels.iter().position(Option::is_none) else {
            break;
        };
        let level = topology.reverse[root]
            .iter()
            .filter_map(|&parent| levels[parent])
            .max()
            .map_or(0, |deepest| deepest + 1);
        tracing::trace!(node = root, level, "breaking cycle with synthetic root");
        levels[root] = Some(level);
        queue.push_back(root);
    }

    levels.into_iter().map(|level| level.unwrap_or(0)).collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    New,
    Open,
    Done,
}

/// Leaf-descendant counts. A leaf is worth 1, an inner node the sum of its
/// children (at least 1). A child still open on the traversal stack closes a
/// cycle and contributes 0, so cyclic structures are undercounted.
pub(crate) fn subtree_widths(topology: &Topology) -> Vec<usize> {
    let count = topology.len();
    let mut widths = vec![0usize; count];
    let mut marks = vec![Mark::New; count];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for start in 0..count {
        if marks[start] != Mark::New {
            continue;
        }
        marks[start] = Mark::Open;
        stack.push((start, 0));

        while let Some(top) = stack.len().checked_sub(1) {
            let (node, cursor) = stack[top];
            let children = &topology.forward[node];
            if cursor < children.len() {
                stack[top].1 += 1;
                let child = children[cursor];
                if marks[child] == Mark::New {
                    marks[child] = Mark::Open;
                    stack.push((child, 0));
                }
                continue;
            }

            stack.pop();
            widths[node] = if children.is_empty() {
                1
            } else {
                children
                    .iter()
                    .filter(|&&child| marks[child] == Mark::Done)
                    .map(|&child| widths[child])
                    .sum::<usize>()
                    .max(1)
            };
            marks[node] = Mark::Done;
        }
    }

    widths
}

pub(crate) fn node_infos(topology: &Topology) -> Vec<NodeInfo> {
    let levels = assign_levels(topology);
    let widths = subtree_widths(topology);
    (0..topology.len())
        .map(|idx| NodeInfo {
            level: levels[idx],
            children: topology.forward[idx].clone(),
            parents: topology.reverse[idx].clone(),
            subtree_width: widths[idx],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> Graph {
        let mut graph = Graph::new();
        for id in nodes {
            graph.ensure_node(id, None);
        }
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        graph
    }

    fn topology(graph: &Graph) -> Topology {
        build_adjacency(graph, &index_nodes(graph))
    }

    #[test]
    fn adjacency_skips_dangling_and_self_loops() {
        let g = graph(&["A", "B"], &[("A", "B"), ("A", "ghost"), ("B", "B")]);
        let topo = topology(&g);
        assert_eq!(topo.forward, vec![vec![1], vec![]]);
        assert_eq!(topo.reverse, vec![vec![], vec![0]]);
        assert_eq!(topo.in_degree, vec![0, 1]);
    }

    #[test]
    fn levels_follow_longest_dependency_chain() {
        // A -> B -> C and A -> C: C must wait for B.
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("A", "C")]);
        assert_eq!(assign_levels(&topology(&g)), vec![0, 1, 2]);
    }

    #[test]
    fn pure_cycle_gets_synthetic_root() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")]);
        assert_eq!(assign_levels(&topology(&g)), vec![0, 1, 2]);
    }

    #[test]
    fn cycle_below_root_is_placed_under_its_parent() {
        let g = graph(
            &["R", "A", "B"],
            &[("R", "A"), ("A", "B"), ("B", "A")],
        );
        assert_eq!(assign_levels(&topology(&g)), vec![0, 1, 2]);
    }

    #[test]
    fn subtree_width_counts_leaves() {
        let g = graph(
            &["root", "l", "r", "l1", "l2", "r1"],
            &[("root", "l"), ("root", "r"), ("l", "l1"), ("l", "l2"), ("r", "r1")],
        );
        assert_eq!(subtree_widths(&topology(&g)), vec![3, 2, 1, 1, 1, 1]);
    }

    #[test]
    fn subtree_width_survives_cycles() {
        let g = graph(&["A", "B"], &[("A", "B"), ("B", "A")]);
        let widths = subtree_widths(&topology(&g));
        // B's only child is on the stack, so it bottoms out at 1.
        assert_eq!(widths, vec![1, 1]);
    }
}
