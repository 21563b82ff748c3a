//! Similarity graph construction from co-rated venues.
//!
//! Every unordered pair of rating users is compared. Users who rated at least
//! one venue in common are joined by an edge whose weight is the mean
//! per-venue agreement scaled by the judgement validity of the pair:
//!
//! ```text
//! agreement(a, b) = (5 - |r_a - r_b|) / 5
//! weight          = mean(agreement over shared venues) × validity(shared)
//! validity(n)     = min(1, n / limit)
//! ```
//!
//! Pair comparison runs in parallel; edges are inserted in pair order so the
//! result does not depend on scheduling.

use crate::{
    Coordinates, FriendshipIndex, GraphConfig, Rating, RatingIndex, SocialGraph, UserId, UserNode,
    VenueId,
};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// Agreement between two ratings of the same venue, in `[0.2, 1]`.
pub fn agreement_score(a: Rating, b: Rating) -> f64 {
    f64::from(5 - a.distance(b)) / 5.0
}

/// Weight of the edge between two users, or `None` when they share no venue.
pub fn edge_weight(
    a: &BTreeMap<VenueId, Rating>,
    b: &BTreeMap<VenueId, Rating>,
    config: &GraphConfig,
) -> Option<f64> {
    // Walk the smaller map; both are venue-ordered so the summation order
    // is the same whichever user comes first.
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut shared = 0usize;
    let mut total = 0.0;
    for (venue, &rating) in small {
        if let Some(&other) = large.get(venue) {
            shared += 1;
            total += agreement_score(rating, other);
        }
    }

    if shared == 0 {
        return None;
    }
    Some(total / shared as f64 * config.judgement_validity(shared))
}

/// Builds a [`SocialGraph`] from a rating index.
///
/// # Example
///
/// ```rust
/// use rategraph_core::{GraphConfig, RatingIndex, SimilarityGraphBuilder};
///
/// let ratings = RatingIndex::from_raw(vec![
///     ("1", "V1", "5"),
///     ("2", "V1", "5"),
///     ("3", "V2", "4"),
/// ])?;
/// let graph = SimilarityGraphBuilder::new(GraphConfig::default()).build(&ratings);
///
/// // User 3 shares no venue with anyone and never becomes a node.
/// assert_eq!(graph.node_count(), 2);
/// # Ok::<(), rategraph_core::Error>(())
/// ```
pub struct SimilarityGraphBuilder<'a> {
    config: GraphConfig,
    friendships: Option<&'a mut FriendshipIndex>,
    coordinates: Option<&'a HashMap<UserId, Coordinates>>,
}

impl<'a> SimilarityGraphBuilder<'a> {
    /// Create a builder.
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            friendships: None,
            coordinates: None,
        }
    }

    /// Attach followings from this index after the edges are built.
    ///
    /// The index is pruned in place to followees that became graph nodes.
    /// Ignored unless `include_friendships` is set.
    pub fn with_friendships(mut self, friendships: &'a mut FriendshipIndex) -> Self {
        self.friendships = Some(friendships);
        self
    }

    /// Attach coordinates to nodes. Ignored unless `include_geo` is set.
    pub fn with_coordinates(mut self, coordinates: &'a HashMap<UserId, Coordinates>) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Build the graph from a rating index.
    pub fn build(self, ratings: &RatingIndex) -> SocialGraph {
        self.build_from_ratings(ratings.user_venue_ratings())
    }

    /// Build the graph from per-user venue ratings.
    pub fn build_from_ratings(
        self,
        user_venue_ratings: &BTreeMap<UserId, BTreeMap<VenueId, Rating>>,
    ) -> SocialGraph {
        let users: Vec<(&UserId, &BTreeMap<VenueId, Rating>)> = user_venue_ratings
            .iter()
            .filter(|(_, ratings)| !ratings.is_empty())
            .collect();
        let n = users.len();
        let config = self.config;

        tracing::info!(
            users = n,
            pairs = n * n.saturating_sub(1) / 2,
            "computing rating-agreement edges"
        );

        let edges: Vec<Vec<(usize, usize, f64)>> = (0..n)
            .into_par_iter()
            .map(|i| {
                ((i + 1)..n)
                    .filter_map(|j| {
                        edge_weight(users[i].1, users[j].1, &config).map(|w| (i, j, w))
                    })
                    .collect()
            })
            .collect();

        let edge_total: usize = edges.iter().map(Vec::len).sum();
        let mut graph = SocialGraph::with_capacity(n, edge_total);
        let coordinates = if config.include_geo {
            self.coordinates
        } else {
            None
        };

        for (i, j, weight) in edges.into_iter().flatten() {
            for &k in &[i, j] {
                let (id, ratings) = users[k];
                if graph.contains(id) {
                    continue;
                }
                let mut node = UserNode::new(id.clone()).with_ratings(ratings.clone());
                if let Some(position) = coordinates.and_then(|c| c.get(id)) {
                    node = node.with_coordinates(*position);
                }
                graph.upsert_node(node);
            }
            graph.add_edge(users[i].0.clone(), users[j].0.clone(), weight);
        }

        if let Some(coordinates) = coordinates {
            let missing = graph
                .nodes()
                .filter(|node| !coordinates.contains_key(&node.id))
                .count();
            if missing > 0 {
                tracing::warn!(missing, "graph nodes without coordinates");
            }
        }

        if config.include_friendships {
            if let Some(friendships) = self.friendships {
                let pruned = friendships.prune(&graph);
                tracing::debug!(pruned, followers = friendships.len(), "pruned dangling followees");
                graph.attach_followings(friendships);
            }
        }

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "similarity graph built"
        );
        graph
    }
}
