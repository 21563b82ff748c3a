//! Per-run analysis state.
//!
//! An [`AnalysisContext`] owns everything one analysis run needs: the graph,
//! the rating index it was built from, the configuration and the centrality
//! cache. Components borrow from it; nothing is process-global.

use crate::algo::cache::{CentralityCache, MemoryCache};
use crate::algo::influence::{select_band, InfluenceEvaluator};
use crate::algo::ranking::{ConsensusRanker, ImportanceRanker, StructuralRanker};
use crate::{
    Coordinates, FriendshipIndex, GraphConfig, RatingIndex, Result, SimilarityGraphBuilder,
    SocialGraph, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which importance ranking to stratify users by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingKind {
    /// Betweenness centrality.
    #[default]
    Structural,
    /// Rating consensus.
    Consensus,
}

/// Influence of one percentile band.
#[derive(Debug)]
pub struct BandInfluence {
    /// Band start (0 = top).
    pub start: f64,
    /// Band end.
    pub end: f64,
    /// Users in the band, 0 if the band was invalid.
    pub users: usize,
    /// Mean influence, or why it is undefined.
    pub influence: Result<f64>,
}

/// Graph, ratings, configuration and cache for one analysis run.
pub struct AnalysisContext {
    graph: SocialGraph,
    ratings: RatingIndex,
    config: GraphConfig,
    cache: Box<dyn CentralityCache>,
}

impl AnalysisContext {
    /// Wrap an existing graph. Uses an in-memory centrality cache.
    pub fn new(graph: SocialGraph, ratings: RatingIndex, config: GraphConfig) -> Self {
        Self {
            graph,
            ratings,
            config,
            cache: Box::new(MemoryCache::new()),
        }
    }

    /// Build the graph from raw inputs and wrap it.
    pub fn build(
        ratings: RatingIndex,
        friendships: Option<&mut FriendshipIndex>,
        coordinates: Option<&HashMap<UserId, Coordinates>>,
        config: GraphConfig,
    ) -> Self {
        let mut builder = SimilarityGraphBuilder::new(config);
        if let Some(friendships) = friendships {
            builder = builder.with_friendships(friendships);
        }
        if let Some(coordinates) = coordinates {
            builder = builder.with_coordinates(coordinates);
        }
        let graph = builder.build(&ratings);
        Self::new(graph, ratings, config)
    }

    /// Replace the centrality cache.
    pub fn with_cache(mut self, cache: Box<dyn CentralityCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The graph.
    pub fn graph(&self) -> &SocialGraph {
        &self.graph
    }

    /// The rating index.
    pub fn ratings(&self) -> &RatingIndex {
        &self.ratings
    }

    /// The configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Consume the context, returning the graph.
    pub fn into_graph(self) -> SocialGraph {
        self.graph
    }

    /// Influence evaluator using the configured agreement tolerance.
    pub fn evaluator(&self) -> InfluenceEvaluator<'_> {
        InfluenceEvaluator::new(&self.graph, self.config.agreement_tolerance)
    }

    /// Betweenness ranking backed by this context's cache.
    pub fn structural_ranker(&self) -> StructuralRanker<'_> {
        StructuralRanker::new(&self.graph, self.cache.as_ref())
    }

    /// Consensus ranking against this context's rating index.
    pub fn consensus_ranker(&self) -> ConsensusRanker<'_> {
        ConsensusRanker::new(&self.graph, &self.ratings)
    }

    /// Ranking strategy by kind.
    pub fn ranker(&self, kind: RankingKind) -> Box<dyn ImportanceRanker + '_> {
        match kind {
            RankingKind::Structural => Box::new(self.structural_ranker()),
            RankingKind::Consensus => Box::new(self.consensus_ranker()),
        }
    }

    /// Mean neighbor influence of users in the percentile band `[start, end)`
    /// of `ranker` (0 = top).
    pub fn average_influence_for_band(
        &self,
        ranker: &dyn ImportanceRanker,
        start: f64,
        end: f64,
    ) -> Result<f64> {
        let scores = ranker.rank()?;
        self.evaluator().average_influence_for_band(&scores, start, end)
    }

    /// Mean influence of followees on their followers.
    pub fn average_friend_influence(&self) -> Result<f64> {
        self.evaluator().average_friend_influence()
    }

    /// Influence for several bands from a single ranking.
    ///
    /// Fails only if the ranking itself fails; each band carries its own result.
    pub fn band_report(
        &self,
        ranker: &dyn ImportanceRanker,
        bands: &[(f64, f64)],
    ) -> Result<Vec<BandInfluence>> {
        let scores = ranker.rank()?;
        let evaluator = self.evaluator();
        Ok(bands
            .iter()
            .map(|&(start, end)| BandInfluence {
                start,
                end,
                users: select_band(&scores, start, end).map_or(0, |band| band.len()),
                influence: evaluator.average_influence_for_band(&scores, start, end),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, FriendshipRecord};

    fn context() -> AnalysisContext {
        let ratings = RatingIndex::from_raw(vec![
            ("1", "V1", "5"),
            ("1", "V2", "3"),
            ("2", "V1", "5"),
            ("2", "V2", "4"),
            ("3", "V2", "3"),
        ])
        .unwrap();
        let mut friendships = FriendshipIndex::build(vec![FriendshipRecord::new("1", "2")]);
        AnalysisContext::build(ratings, Some(&mut friendships), None, GraphConfig::default())
    }

    #[test]
    fn test_full_band_matches_mean_influence() {
        let ctx = context();
        let evaluator = ctx.evaluator();
        let expected = ["1", "2", "3"]
            .iter()
            .map(|id| evaluator.user_influence(&UserId::from(*id)).unwrap())
            .sum::<f64>()
            / 3.0;

        for kind in [RankingKind::Structural, RankingKind::Consensus] {
            let ranker = ctx.ranker(kind);
            let all = ctx.average_influence_for_band(ranker.as_ref(), 0.0, 1.0).unwrap();
            assert!((all - expected).abs() < 1e-12, "{kind:?}");
        }
    }

    #[test]
    fn test_band_report() {
        let ctx = context();
        let ranker = ctx.consensus_ranker();
        let report = ctx
            .band_report(&ranker, &[(0.0, 1.0), (0.0, 0.1), (0.9, 0.1)])
            .unwrap();
        assert_eq!(report.len(), 3);
        assert_eq!(report[0].users, 3);
        assert!(report[0].influence.is_ok());
        assert!(matches!(report[1].influence, Err(Error::EmptyBand { .. })));
        assert!(matches!(
            report[2].influence,
            Err(Error::InvalidPercentile { .. })
        ));
    }

    #[test]
    fn test_friend_influence() {
        let ctx = context();
        assert_eq!(ctx.average_friend_influence().unwrap(), 0.5);
    }
}
