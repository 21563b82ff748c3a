//! Connected components of the similarity graph.

use crate::{SocialGraph, UserId};
use petgraph::visit::EdgeRef;
use std::cmp::Ordering;
use std::collections::BTreeMap;

// Union-Find helpers
fn uf_find(parent: &mut [usize], i: usize) -> usize {
    if parent[i] != i {
        parent[i] = uf_find(parent, parent[i]);
    }
    parent[i]
}

fn uf_union(parent: &mut [usize], rank: &mut [usize], x: usize, y: usize) {
    let px = uf_find(parent, x);
    let py = uf_find(parent, y);
    if px == py {
        return;
    }
    match rank[px].cmp(&rank[py]) {
        Ordering::Less => parent[px] = py,
        Ordering::Greater => parent[py] = px,
        Ordering::Equal => {
            parent[py] = px;
            rank[px] += 1;
        }
    }
}

/// Connected components, each listed in node order, largest first.
///
/// Uses Union-Find for O(V + E * alpha(V)) computation.
#[must_use]
pub fn connected_components(graph: &SocialGraph) -> Vec<Vec<UserId>> {
    let g = graph.as_petgraph();
    let n = g.node_count();
    let mut parent: Vec<usize> = (0..n).collect();
    let mut rank: Vec<usize> = vec![0; n];

    for edge in g.edge_references() {
        uf_union(&mut parent, &mut rank, edge.source().index(), edge.target().index());
    }

    let mut components: BTreeMap<usize, Vec<UserId>> = BTreeMap::new();
    for idx in g.node_indices() {
        let root = uf_find(&mut parent, idx.index());
        components.entry(root).or_default().push(g[idx].id.clone());
    }

    let mut components: Vec<Vec<UserId>> = components.into_values().collect();
    components.sort_by(|a, b| b.len().cmp(&a.len()));
    components
}

/// Number of connected components.
#[must_use]
pub fn connected_component_count(graph: &SocialGraph) -> usize {
    connected_components(graph).len()
}
