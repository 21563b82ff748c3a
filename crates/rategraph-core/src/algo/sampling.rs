//! Seeded random induced subgraphs.
//!
//! Used to cut a large graph down to something an external visualization
//! tool can handle. Node records are copied verbatim.

use crate::{Error, Result, SocialGraph, UserId};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use std::collections::HashSet;

/// Draw `k` distinct users uniformly at random.
///
/// # Complexity
/// O(V)
pub fn sample_nodes(graph: &SocialGraph, k: usize, seed: u64) -> Vec<UserId> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    let g = graph.as_petgraph();
    let indices: Vec<NodeIndex> = g.node_indices().collect();
    indices
        .choose_multiple(&mut rng, k)
        .map(|&idx| g[idx].id.clone())
        .collect()
}

/// Induced subgraph on `node_count` randomly chosen users.
///
/// An edge survives iff both endpoints were sampled. Only users touched by a
/// surviving edge appear in the result, so it may hold fewer than
/// `node_count` nodes.
///
/// # Errors
/// [`Error::SampleTooLarge`] unless `node_count` is smaller than the graph.
///
/// # Example
///
/// ```rust
/// use rategraph_core::SocialGraph;
/// use rategraph_core::algo::sampling::sample_subgraph;
///
/// let mut graph = SocialGraph::new();
/// graph.add_edge("a", "b", 0.5);
/// graph.add_edge("b", "c", 0.5);
/// graph.add_edge("c", "d", 0.5);
///
/// let sub = sample_subgraph(&graph, 3, 42)?;
/// assert!(sub.node_count() <= 3);
/// # Ok::<(), rategraph_core::Error>(())
/// ```
pub fn sample_subgraph(graph: &SocialGraph, node_count: usize, seed: u64) -> Result<SocialGraph> {
    let available = graph.node_count();
    if node_count >= available {
        return Err(Error::SampleTooLarge {
            requested: node_count,
            available,
        });
    }

    let sampled: HashSet<UserId> = sample_nodes(graph, node_count, seed).into_iter().collect();
    let g = graph.as_petgraph();
    let mut sub = SocialGraph::new();

    for edge in g.edge_references() {
        let (source, target) = (&g[edge.source()], &g[edge.target()]);
        if !(sampled.contains(&source.id) && sampled.contains(&target.id)) {
            continue;
        }
        for node in [source, target] {
            if !sub.contains(&node.id) {
                sub.upsert_node(node.clone());
            }
        }
        sub.add_edge(source.id.clone(), target.id.clone(), *edge.weight());
    }

    tracing::info!(
        sampled = node_count,
        nodes = sub.node_count(),
        edges = sub.edge_count(),
        "subgraph sampled"
    );
    Ok(sub)
}
