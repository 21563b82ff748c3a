//! Interchangeable user-importance rankings.
//!
//! Both strategies produce one score per graph node; callers stratify users
//! by sorting ascending on score (see [`crate::algo::influence::select_band`]).

use crate::algo::cache::{cached_betweenness, CentralityCache};
use crate::algo::centrality::{consensus_centrality, BetweennessConfig};
use crate::algo::ImportanceScores;
use crate::{RatingIndex, Result, SocialGraph};

/// Something that assigns an importance score to every user in a graph.
pub trait ImportanceRanker {
    /// Short name for reports and logs.
    fn name(&self) -> &'static str;

    /// Score every user.
    fn rank(&self) -> Result<ImportanceScores>;
}

/// Structural importance: normalized betweenness centrality, memoized.
pub struct StructuralRanker<'a> {
    graph: &'a SocialGraph,
    cache: &'a dyn CentralityCache,
    config: BetweennessConfig,
}

impl<'a> StructuralRanker<'a> {
    /// Rank users of `graph`, storing results in `cache`.
    pub fn new(graph: &'a SocialGraph, cache: &'a dyn CentralityCache) -> Self {
        Self {
            graph,
            cache,
            config: BetweennessConfig::default(),
        }
    }
}

impl ImportanceRanker for StructuralRanker<'_> {
    fn name(&self) -> &'static str {
        "betweenness"
    }

    fn rank(&self) -> Result<ImportanceScores> {
        cached_betweenness(self.graph, self.config, self.cache)
    }
}

/// Consensus importance: how mainstream the user's ratings are.
pub struct ConsensusRanker<'a> {
    graph: &'a SocialGraph,
    ratings: &'a RatingIndex,
}

impl<'a> ConsensusRanker<'a> {
    /// Rank users of `graph` against the population in `ratings`.
    pub fn new(graph: &'a SocialGraph, ratings: &'a RatingIndex) -> Self {
        Self { graph, ratings }
    }
}

impl ImportanceRanker for ConsensusRanker<'_> {
    fn name(&self) -> &'static str {
        "consensus"
    }

    fn rank(&self) -> Result<ImportanceScores> {
        Ok(consensus_centrality(self.graph, self.ratings))
    }
}
