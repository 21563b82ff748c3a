//! Degree and clustering statistics, the data behind degree-distribution and
//! clustering-coefficient plots.

use crate::{SocialGraph, UserId};
use petgraph::graph::NodeIndex;
use std::collections::{BTreeMap, HashSet};

/// Degree of every user, highest first. Ties keep node order.
pub fn degree_sequence(graph: &SocialGraph) -> Vec<(UserId, usize)> {
    let g = graph.as_petgraph();
    let mut degrees: Vec<(UserId, usize)> = g
        .node_indices()
        .map(|idx| (g[idx].id.clone(), g.neighbors(idx).count()))
        .collect();
    degrees.sort_by(|a, b| b.1.cmp(&a.1));
    degrees
}

/// Fraction of nodes with each degree, by ascending degree.
pub fn degree_distribution(graph: &SocialGraph) -> Vec<(usize, f64)> {
    let n = graph.node_count();
    if n == 0 {
        return vec![];
    }
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for (_, degree) in degree_sequence(graph) {
        *counts.entry(degree).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(degree, count)| (degree, count as f64 / n as f64))
        .collect()
}

/// Local clustering coefficient of every user (edge weights ignored).
///
/// ```text
/// C(v) = 2·T(v) / (deg(v)·(deg(v) - 1))
/// ```
///
/// where T(v) counts triangles through v. Users with degree below 2 score 0.
pub fn clustering_coefficients(graph: &SocialGraph) -> BTreeMap<UserId, f64> {
    let g = graph.as_petgraph();
    let neighbor_sets: Vec<HashSet<NodeIndex>> = g
        .node_indices()
        .map(|idx| g.neighbors(idx).filter(|&n| n != idx).collect())
        .collect();

    g.node_indices()
        .map(|idx| {
            let neighbors = &neighbor_sets[idx.index()];
            let degree = neighbors.len();
            let coefficient = if degree < 2 {
                0.0
            } else {
                let links: usize = neighbors
                    .iter()
                    .map(|n| {
                        neighbor_sets[n.index()]
                            .iter()
                            .filter(|&m| neighbors.contains(m))
                            .count()
                    })
                    .sum();
                // Each triangle edge was seen from both ends.
                links as f64 / (degree * (degree - 1)) as f64
            };
            (g[idx].id.clone(), coefficient)
        })
        .collect()
}

/// Mean local clustering coefficient over all users, 0 for an empty graph.
pub fn average_clustering(graph: &SocialGraph) -> f64 {
    let coefficients = clustering_coefficients(graph);
    if coefficients.is_empty() {
        return 0.0;
    }
    coefficients.values().sum::<f64>() / coefficients.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kite() -> SocialGraph {
        // Triangle a-b-c with a tail c-d.
        let mut graph = SocialGraph::new();
        graph.add_edge("a", "b", 1.0);
        graph.add_edge("b", "c", 1.0);
        graph.add_edge("a", "c", 1.0);
        graph.add_edge("c", "d", 1.0);
        graph
    }

    #[test]
    fn test_degree_sequence() {
        let degrees = degree_sequence(&kite());
        assert_eq!(degrees[0], (UserId::from("c"), 3));
        let total: usize = degrees.iter().map(|(_, d)| d).sum();
        assert_eq!(total, 8);
    }

    #[test]
    fn test_degree_distribution() {
        let dist = degree_distribution(&kite());
        assert_eq!(dist, vec![(1, 0.25), (2, 0.5), (3, 0.25)]);
        assert!(degree_distribution(&SocialGraph::new()).is_empty());
    }

    #[test]
    fn test_clustering() {
        let c = clustering_coefficients(&kite());
        assert_eq!(c[&UserId::from("a")], 1.0);
        assert!((c[&UserId::from("c")] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(c[&UserId::from("d")], 0.0);
        let avg = average_clustering(&kite());
        assert!((avg - (1.0 + 1.0 + 1.0 / 3.0) / 4.0).abs() < 1e-12);
    }
}
