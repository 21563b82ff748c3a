//! Importance measures over the similarity graph.
//!
//! | Measure | Question answered | Complexity |
//! |---------|-------------------|------------|
//! | Betweenness | How often on shortest paths between other users? | O(VE) |
//! | Consensus | How close are the user's ratings to the population's? | O(ratings) |
//!
//! Betweenness looks only at graph structure; consensus looks only at the
//! user's own ratings against the per-venue rating distribution.

mod betweenness;
mod consensus;

pub use betweenness::{betweenness_centrality, BetweennessConfig};
pub use consensus::{consensus_centrality, consensus_score};
