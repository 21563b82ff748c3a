use crate::algo::clustering::average_clustering;
use crate::algo::components::connected_component_count;
use crate::{FriendshipIndex, Result, UserId, UserNode};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Undirected, weighted user graph.
///
/// Nodes carry a [`UserNode`] record, edges carry the rating-agreement
/// weight in `[0, 1]`. Uses petgraph's undirected graph internally and keeps a
/// user id -> node index map for O(1) lookup.
///
/// # Example
///
/// ```rust
/// use rategraph_core::SocialGraph;
///
/// let mut graph = SocialGraph::new();
/// graph.add_edge("alice", "bob", 0.8);
/// graph.add_edge("bob", "carol", 0.4);
///
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.weight(&"bob".into(), &"alice".into()), Some(0.8));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialGraph {
    /// The underlying undirected graph.
    graph: UnGraph<UserNode, f64>,

    /// Map from user ID to node index.
    #[serde(skip, default)]
    node_index: HashMap<UserId, NodeIndex>,
}

impl SocialGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with estimated capacity.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: UnGraph::with_capacity(nodes, edges),
            node_index: HashMap::with_capacity(nodes),
        }
    }

    /// Rebuild the lookup index after deserialization.
    fn rebuild_indexes(&mut self) {
        self.node_index = self
            .graph
            .node_indices()
            .map(|idx| (self.graph[idx].id.clone(), idx))
            .collect();
    }

    /// Get or create the node for a user.
    fn get_or_create_node(&mut self, id: &UserId) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(UserNode::new(id.clone()));
        self.node_index.insert(id.clone(), idx);
        idx
    }

    /// Insert a node record, replacing the attributes of an existing node.
    pub(crate) fn upsert_node(&mut self, node: UserNode) -> NodeIndex {
        let idx = self.get_or_create_node(&node.id);
        self.graph[idx] = node;
        idx
    }

    /// Add an undirected edge, creating missing endpoints.
    ///
    /// An existing edge between the two users has its weight replaced, so there
    /// is never more than one edge per pair. Self-loops are ignored.
    pub fn add_edge(&mut self, a: impl Into<UserId>, b: impl Into<UserId>, weight: f64) {
        let (a, b) = (a.into(), b.into());
        if a == b {
            return;
        }
        let a_idx = self.get_or_create_node(&a);
        let b_idx = self.get_or_create_node(&b);
        self.graph.update_edge(a_idx, b_idx, weight);
    }

    /// Undirected topology of a friendship index.
    ///
    /// Each follow becomes an edge of weight 1.0; reciprocal follows collapse
    /// into one edge. Followers whose every followee is themselves are absent.
    pub fn from_friendships(friendships: &FriendshipIndex) -> Self {
        let mut graph = Self::new();
        for (follower, followees) in friendships.iter() {
            for followee in followees {
                graph.add_edge(follower.clone(), followee.clone(), 1.0);
            }
        }
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built friendship graph"
        );
        graph
    }

    /// Attach `followings` to every node from a pruned friendship index.
    ///
    /// Users with no followee left in the graph get `None`.
    pub fn attach_followings(&mut self, friendships: &FriendshipIndex) {
        for node in self.graph.node_weights_mut() {
            node.followings = friendships
                .followings(&node.id)
                .filter(|followees| !followees.is_empty())
                .cloned();
        }
    }

    /// Get a node by user ID.
    pub fn node(&self, id: &UserId) -> Option<&UserNode> {
        self.node_index.get(id).map(|&idx| &self.graph[idx])
    }

    /// Get the petgraph index of a user.
    pub fn get_node_index(&self, id: &UserId) -> Option<NodeIndex> {
        self.node_index.get(id).copied()
    }

    /// Whether the user is a node.
    pub fn contains(&self, id: &UserId) -> bool {
        self.node_index.contains_key(id)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterate over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &UserNode> {
        self.graph.node_weights()
    }

    /// Iterate over all edges as `(a, b, weight)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&UserId, &UserId, f64)> {
        self.graph.edge_references().map(|e| {
            (
                &self.graph[e.source()].id,
                &self.graph[e.target()].id,
                *e.weight(),
            )
        })
    }

    /// Weight of the edge between two users, in either order.
    pub fn weight(&self, a: &UserId, b: &UserId) -> Option<f64> {
        let a = self.get_node_index(a)?;
        let b = self.get_node_index(b)?;
        self.graph.find_edge(a, b).map(|e| self.graph[e])
    }

    /// Neighbors of a user. Empty if the user is not a node.
    pub fn neighbors(&self, id: &UserId) -> Vec<&UserNode> {
        match self.node_index.get(id) {
            Some(&idx) => self.graph.neighbors(idx).map(|n| &self.graph[n]).collect(),
            None => vec![],
        }
    }

    /// Degree of a user. Zero if the user is not a node.
    pub fn degree(&self, id: &UserId) -> usize {
        match self.node_index.get(id) {
            Some(&idx) => self.graph.neighbors(idx).count(),
            None => 0,
        }
    }

    /// Get the underlying petgraph for advanced operations.
    pub fn as_petgraph(&self) -> &UnGraph<UserNode, f64> {
        &self.graph
    }

    /// Write the graph in binary (bincode) form.
    pub fn write_binary<W: Write>(&self, writer: W) -> Result<()> {
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Read a graph written by [`Self::write_binary`].
    pub fn read_binary<R: Read>(reader: R) -> Result<Self> {
        let mut graph: Self = bincode::deserialize_from(reader)?;
        graph.rebuild_indexes();
        Ok(graph)
    }

    /// Save to a binary file.
    pub fn save_binary(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_binary(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Load from a binary file.
    pub fn load_binary(path: impl AsRef<Path>) -> Result<Self> {
        Self::read_binary(BufReader::new(File::open(path)?))
    }

    /// Save to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Load from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let mut graph: Self = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        graph.rebuild_indexes();
        Ok(graph)
    }
}

/// Summary statistics about a graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialGraphStats {
    /// Number of nodes.
    pub node_count: usize,
    /// Number of edges.
    pub edge_count: usize,
    /// Mean node degree.
    pub avg_degree: f64,
    /// Number of connected components.
    pub component_count: usize,
    /// Mean local clustering coefficient.
    pub avg_clustering: f64,
}

impl SocialGraph {
    /// Compute statistics about the graph.
    pub fn stats(&self) -> SocialGraphStats {
        let node_count = self.node_count();
        let edge_count = self.edge_count();
        let avg_degree = if node_count > 0 {
            2.0 * edge_count as f64 / node_count as f64
        } else {
            0.0
        };

        SocialGraphStats {
            node_count,
            edge_count,
            avg_degree,
            component_count: connected_component_count(self),
            avg_clustering: average_clustering(self),
        }
    }
}
