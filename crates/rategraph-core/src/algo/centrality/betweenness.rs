//! Betweenness centrality: how often a user sits on shortest paths.
//!
//! # Definition
//!
//! ```text
//! C_B(v) = Σ_{s≠v≠t} σ_st(v) / σ_st
//! ```
//!
//! Where σ_st is the number of shortest paths from s to t and σ_st(v) the
//! number of those passing through v. Paths are counted in hops; edge weights
//! do not shorten or lengthen a path.
//!
//! # Brandes' Algorithm (2001)
//!
//! One BFS per source tracks σ_sv on the way out, then dependencies are
//! accumulated on the way back:
//!
//! ```text
//! δ_s(v) = Σ_{w: v∈P_s(w)} (σ_sv/σ_sw) × (1 + δ_s(w))
//! ```
//!
//! # Normalization
//!
//! The graph is undirected, so each unordered pair is reached from both ends.
//! The normalized score divides that doubled sum by the number of ordered
//! pairs excluding v:
//!
//! ```text
//! C_B_norm(v) = 2 × C_B(v) / [(n-1)(n-2)]
//! ```
//!
//! which lies in `[0, 1]` (1 for the centre of a star).

use crate::algo::ImportanceScores;
use crate::{SocialGraph, UserNode};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::VecDeque;

/// Configuration for betweenness centrality.
#[derive(Debug, Clone, Copy)]
pub struct BetweennessConfig {
    /// Normalize scores to the `[0, 1]` range.
    pub normalized: bool,
}

impl Default for BetweennessConfig {
    fn default() -> Self {
        Self { normalized: true }
    }
}

/// Compute betweenness centrality using Brandes' algorithm.
///
/// # Complexity
///
/// - Time: O(VE)
/// - Space: O(V + E)
///
/// # Example
///
/// ```
/// use rategraph_core::{SocialGraph, UserId};
/// use rategraph_core::algo::centrality::{betweenness_centrality, BetweennessConfig};
///
/// let mut graph = SocialGraph::new();
/// graph.add_edge("A", "B", 1.0);
/// graph.add_edge("B", "C", 1.0);
///
/// let scores = betweenness_centrality(&graph, BetweennessConfig::default());
/// assert_eq!(scores[&UserId::from("B")], 1.0);
/// assert_eq!(scores[&UserId::from("A")], 0.0);
/// ```
#[must_use]
pub fn betweenness_centrality(graph: &SocialGraph, config: BetweennessConfig) -> ImportanceScores {
    let g = graph.as_petgraph();
    let n = g.node_count();
    let mut betweenness = vec![0.0_f64; n];

    for s in g.node_indices() {
        let (sigma, predecessors, order) = bfs_shortest_paths(g, s);

        let mut delta = vec![0.0_f64; n];
        // Farthest nodes first.
        for &w in order.iter().rev() {
            let w_idx = w.index();
            for &v in &predecessors[w_idx] {
                let v_idx = v.index();
                delta[v_idx] += sigma[v_idx] / sigma[w_idx] * (1.0 + delta[w_idx]);
            }
            if w != s {
                betweenness[w_idx] += delta[w_idx];
            }
        }
    }

    // The doubled sums are kept for the normalized score; raw scores count
    // each unordered pair once.
    if config.normalized {
        if n > 2 {
            let norm = ((n - 1) * (n - 2)) as f64;
            for b in &mut betweenness {
                *b /= norm;
            }
        }
    } else {
        for b in &mut betweenness {
            *b /= 2.0;
        }
    }

    g.node_indices()
        .map(|idx| (g[idx].id.clone(), betweenness[idx.index()]))
        .collect()
}

/// BFS to find shortest paths from source.
///
/// Returns:
/// - sigma: σ_sv = number of shortest paths from s to v
/// - predecessors: P_s(v) = predecessors on shortest paths
/// - order: nodes in BFS order (for backward pass)
fn bfs_shortest_paths(
    graph: &UnGraph<UserNode, f64>,
    source: NodeIndex,
) -> (Vec<f64>, Vec<Vec<NodeIndex>>, Vec<NodeIndex>) {
    let n = graph.node_count();
    let mut sigma = vec![0.0_f64; n];
    let mut dist = vec![-1_i64; n];
    let mut predecessors: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
    let mut order = Vec::with_capacity(n);

    sigma[source.index()] = 1.0;
    dist[source.index()] = 0;

    let mut queue = VecDeque::new();
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        order.push(v);
        let v_idx = v.index();
        let v_dist = dist[v_idx];

        for w in graph.neighbors(v) {
            let w_idx = w.index();
            if dist[w_idx] < 0 {
                dist[w_idx] = v_dist + 1;
                queue.push_back(w);
            }
            if dist[w_idx] == v_dist + 1 {
                sigma[w_idx] += sigma[v_idx];
                predecessors[w_idx].push(v);
            }
        }
    }

    (sigma, predecessors, order)
}
