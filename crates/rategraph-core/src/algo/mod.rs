//! Algorithms over the similarity graph.
//!
//! - **Centrality**: betweenness and rating consensus ([`centrality`])
//! - **Ranking**: interchangeable importance strategies ([`ranking`])
//! - **Cache**: fingerprint-keyed memoization of centrality ([`cache`])
//! - **Influence**: neighbor and friend agreement, percentile bands ([`influence`])
//! - **Sampling**: seeded induced subgraphs ([`sampling`])
//! - **Clustering / components**: structural summaries ([`clustering`], [`components`])

use crate::UserId;
use std::collections::BTreeMap;

/// One importance score per user.
pub type ImportanceScores = BTreeMap<UserId, f64>;

/// Memoization of centrality results.
pub mod cache;

/// Centrality algorithms for measuring user importance.
pub mod centrality;

/// Degree and clustering statistics.
pub mod clustering;

/// Connected components.
pub mod components;

/// Influence scores and percentile-band aggregation.
pub mod influence;

/// Importance ranking strategies.
pub mod ranking;

/// Random subgraph sampling.
pub mod sampling;
