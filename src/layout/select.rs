use super::*;

/// Concrete algorithm picked for one layout call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Hierarchical,
    Radial,
    /// Force simulation; `explicit` when the caller asked for it directly.
    Force { explicit: bool },
}

/// `edges / (n (n - 1) / 2)`, or 0 for graphs too small to have a pair.
pub fn graph_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0;
    }
    let pairs = (node_count * (node_count - 1)) as f64 / 2.0;
    edge_count as f64 / pairs
}

/// Maps graph statistics to a placement. Explicit modes bypass the table.
pub fn select_placement(mode: LayoutMode, node_count: usize, edge_count: usize) -> Placement {
    match mode {
        LayoutMode::Hierarchical => Placement::Hierarchical,
        LayoutMode::Radial => Placement::Radial,
        LayoutMode::Force => Placement::Force { explicit: true },
        LayoutMode::Auto => {
            if node_count < 3 {
                return Placement::Hierarchical;
            }
            let density = graph_density(node_count, edge_count);
            if (15..=50).contains(&node_count) && density > 0.1 {
                Placement::Radial
            } else if node_count > 50 || density > 0.3 {
                Placement::Force { explicit: false }
            } else {
                Placement::Hierarchical
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_uses_complete_graph_denominator() {
        assert_eq!(graph_density(4, 3), 0.5);
        assert_eq!(graph_density(1, 5), 0.0);
        assert_eq!(graph_density(0, 0), 0.0);
    }

    #[test]
    fn auto_table() {
        let auto = LayoutMode::Auto;
        assert_eq!(select_placement(auto, 2, 1), Placement::Hierarchical);
        // 30 nodes, 60 edges: density ~0.138
        assert_eq!(select_placement(auto, 30, 60), Placement::Radial);
        assert_eq!(select_placement(auto, 30, 20), Placement::Hierarchical);
        assert_eq!(select_placement(auto, 60, 59), Placement::Force { explicit: false });
        assert_eq!(select_placement(auto, 5, 5), Placement::Force { explicit: false });
        assert_eq!(select_placement(auto, 10, 9), Placement::Hierarchical);
    }

    #[test]
    fn explicit_modes_bypass_table() {
        assert_eq!(select_placement(LayoutMode::Radial, 2, 1), Placement::Radial);
        assert_eq!(select_placement(LayoutMode::Force, 3, 0), Placement::Force { explicit: true });
        assert_eq!(select_placement(LayoutMode::Hierarchical, 80, 2000), Placement::Hierarchical);
    }
}
