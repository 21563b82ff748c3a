//! Consensus ("mainstream-ness") of a user's ratings.
//!
//! For each venue a user rated, look up the fraction of the population that
//! gave the venue the same rating, then average over the user's venues:
//!
//! ```text
//! C(u) = mean_{v ∈ rated(u)} P(rating_v = r_uv)
//! ```
//!
//! A user who rates venues the way most people rate them scores close to 1.

use crate::algo::ImportanceScores;
use crate::{RatingIndex, SocialGraph, UserNode};

/// Consensus score of one user, or `None` if none of their venues appear in
/// the rating index.
pub fn consensus_score(node: &UserNode, ratings: &RatingIndex) -> Option<f64> {
    let fractions: Vec<f64> = node
        .venue_ratings
        .iter()
        .filter_map(|(venue, &rating)| {
            ratings
                .distribution_for(venue)
                .map(|dist| dist.fraction(rating))
        })
        .collect();

    if fractions.is_empty() {
        return None;
    }
    Some(fractions.iter().sum::<f64>() / fractions.len() as f64)
}

/// Consensus scores for every node of the graph.
///
/// Venues missing from `ratings` are skipped; a user with no known venue
/// scores 0.
#[must_use]
pub fn consensus_centrality(graph: &SocialGraph, ratings: &RatingIndex) -> ImportanceScores {
    let mut unresolved = 0usize;
    let scores = graph
        .nodes()
        .map(|node| {
            let score = consensus_score(node, ratings).unwrap_or_else(|| {
                unresolved += 1;
                0.0
            });
            (node.id.clone(), score)
        })
        .collect();

    if unresolved > 0 {
        tracing::warn!(unresolved, "users with no venue in the rating index");
    }
    scores
}
