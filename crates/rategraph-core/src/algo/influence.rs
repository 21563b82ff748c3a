//! Neighbor-agreement influence and its aggregation by importance band.
//!
//! A user's influence is the fraction of "common venue" observations, one per
//! (venue the user rated, neighbor who also rated it), where the neighbor's
//! rating agrees with the user's under an [`AgreementTolerance`].
//!
//! # Percentile bands
//!
//! Bands are cut from the top of the ascending score order: percentile 0 is
//! the highest-scoring user, percentile 1 the lowest. For `N` users the band
//! `[start, end)` is the slice
//!
//! ```text
//! sorted[N - floor(N·end) .. N - floor(N·start)]
//! ```
//!
//! so `(0.0, 0.05)` selects the top 5% and `(0.0, 1.0)` everyone.

use crate::algo::ImportanceScores;
use crate::{AgreementTolerance, Error, Result, SocialGraph, UserId, UserNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Observation counts behind an influence score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfluenceCounts {
    /// Number of (venue, other user) pairs where both rated the venue.
    pub common: usize,
    /// How many of those agree with the user's rating.
    pub influenced: usize,
}

impl InfluenceCounts {
    /// `influenced / common`, or `None` when there is no common observation.
    pub fn ratio(&self) -> Option<f64> {
        (self.common > 0).then(|| self.influenced as f64 / self.common as f64)
    }
}

/// Users in ascending score order. Ties keep user-id order.
pub fn sort_ascending(scores: &ImportanceScores) -> Vec<(&UserId, f64)> {
    let mut sorted: Vec<(&UserId, f64)> = scores.iter().map(|(id, &s)| (id, s)).collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
    sorted
}

/// Users whose score falls in the percentile band `[start, end)`, counted
/// from the top.
pub fn select_band(scores: &ImportanceScores, start: f64, end: f64) -> Result<Vec<UserId>> {
    if !(start.is_finite() && end.is_finite() && 0.0 <= start && start <= end && end <= 1.0) {
        return Err(Error::InvalidPercentile { start, end });
    }

    let sorted = sort_ascending(scores);
    let n = sorted.len();
    let end_index = n - (n as f64 * start).floor() as usize;
    let start_index = n - (n as f64 * end).floor() as usize;
    if start_index >= end_index {
        return Err(Error::EmptyBand { start, end });
    }

    Ok(sorted[start_index..end_index]
        .iter()
        .map(|(id, _)| (*id).clone())
        .collect())
}

/// Computes influence scores over one graph.
#[derive(Debug, Clone, Copy)]
pub struct InfluenceEvaluator<'a> {
    graph: &'a SocialGraph,
    tolerance: AgreementTolerance,
}

impl<'a> InfluenceEvaluator<'a> {
    /// Create an evaluator.
    pub fn new(graph: &'a SocialGraph, tolerance: AgreementTolerance) -> Self {
        Self { graph, tolerance }
    }

    fn count<'n>(
        &self,
        user: &UserNode,
        others: impl Iterator<Item = &'n UserNode>,
    ) -> InfluenceCounts {
        let others: Vec<&UserNode> = others.collect();
        let mut counts = InfluenceCounts::default();
        for (venue, &own) in &user.venue_ratings {
            for other in &others {
                let Some(theirs) = other.rating_of(venue) else {
                    continue;
                };
                counts.common += 1;
                if self.tolerance.agrees(own, theirs) {
                    counts.influenced += 1;
                }
            }
        }
        counts
    }

    /// Observation counts of a user against their graph neighbors.
    pub fn neighbor_counts(&self, user: &UserId) -> Result<InfluenceCounts> {
        let node = self
            .graph
            .node(user)
            .ok_or_else(|| Error::UnknownUser(user.clone()))?;
        Ok(self.count(node, self.graph.neighbors(user).into_iter()))
    }

    /// Influence of a user on their graph neighbors.
    ///
    /// Fails with [`Error::NoCommonVenues`] when no neighbor rated any of the
    /// user's venues.
    pub fn user_influence(&self, user: &UserId) -> Result<f64> {
        self.neighbor_counts(user)?
            .ratio()
            .ok_or_else(|| Error::NoCommonVenues(user.clone()))
    }

    /// Mean influence of the users in a percentile band of `scores`.
    ///
    /// Any user in the band without a common venue fails the whole band.
    pub fn average_influence_for_band(
        &self,
        scores: &ImportanceScores,
        start: f64,
        end: f64,
    ) -> Result<f64> {
        let band = select_band(scores, start, end)?;
        let influences = band
            .iter()
            .map(|user| self.user_influence(user))
            .collect::<Result<Vec<f64>>>()?;

        tracing::debug!(start, end, users = band.len(), "band influence");
        Ok(influences.iter().sum::<f64>() / influences.len() as f64)
    }

    /// Observation counts of a user against the users they follow.
    ///
    /// `None` when the user has no followings attribute. Followees that are
    /// not graph nodes are skipped.
    pub fn friend_counts(&self, user: &UserNode) -> Option<InfluenceCounts> {
        let followings = user.followings.as_ref()?;
        let followees = followings.iter().filter_map(|id| self.graph.node(id));
        Some(self.count(user, followees))
    }

    /// Friend influence per user that has a followings attribute.
    ///
    /// The value is `None` for users with no common observation; they are
    /// left out of [`Self::average_friend_influence`] rather than scored 0.
    pub fn friend_influence_by_user(&self) -> BTreeMap<UserId, Option<f64>> {
        self.graph
            .nodes()
            .filter_map(|node| {
                self.friend_counts(node)
                    .map(|counts| (node.id.clone(), counts.ratio()))
            })
            .collect()
    }

    /// Mean friend influence over users with a defined score.
    pub fn average_friend_influence(&self) -> Result<f64> {
        let defined: Vec<f64> = self
            .friend_influence_by_user()
            .into_values()
            .flatten()
            .collect();
        if defined.is_empty() {
            return Err(Error::NoQualifyingUsers("friend influence"));
        }
        tracing::debug!(users = defined.len(), "friend influence");
        Ok(defined.iter().sum::<f64>() / defined.len() as f64)
    }
}
