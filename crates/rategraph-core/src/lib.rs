// Allow minor clippy style warnings at crate level
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

//! Rating-similarity social graphs and user influence metrics.
//!
//! Users who rated the same venues are linked by an edge whose weight grows
//! with how closely their ratings agree and how much evidence backs the
//! agreement. On top of the graph the crate computes:
//!
//! - [`algo::centrality`] - two importance rankings: betweenness and rating consensus
//! - [`algo::influence`] - how often a user's ratings match their neighbors' or followees'
//! - [`algo::sampling`] - seeded induced subgraphs for visualization
//! - [`algo::clustering`] - degree and clustering data for plots
//!
//! # Pipeline
//!
//! | Stage | Type |
//! |-------|------|
//! | ingest | [`formats::text`], [`formats::dat`] |
//! | index | [`RatingIndex`], [`FriendshipIndex`] |
//! | build | [`SimilarityGraphBuilder`] -> [`SocialGraph`] |
//! | analyze | [`AnalysisContext`] |
//! | export | [`formats::Csv`], [`SocialGraph::save_binary`] |
//!
//! # Example
//!
//! ```rust
//! use rategraph_core::{AnalysisContext, GraphConfig, RatingIndex};
//!
//! let ratings = RatingIndex::from_raw(vec![
//!     ("alice", "cafe", "5"),
//!     ("bob", "cafe", "5"),
//!     ("carol", "cafe", "2"),
//! ])?;
//! let ctx = AnalysisContext::build(ratings, None, None, GraphConfig::default());
//! assert_eq!(ctx.graph().edge_count(), 3);
//!
//! let ranker = ctx.consensus_ranker();
//! let influence = ctx.average_influence_for_band(&ranker, 0.0, 1.0)?;
//! assert!((0.0..=1.0).contains(&influence));
//! # Ok::<(), rategraph_core::Error>(())
//! ```

pub mod algo;
pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod formats;
pub mod friendship;
pub mod generator;
pub mod geo;
pub mod graph;
pub mod ids;
pub mod node;
pub mod rating;

pub use builder::{agreement_score, edge_weight, SimilarityGraphBuilder};
pub use config::{AgreementTolerance, GraphConfig};
pub use context::{AnalysisContext, BandInfluence, RankingKind};
pub use error::{Error, Result};
pub use friendship::{FriendshipIndex, FriendshipRecord};
pub use generator::{Dataset, RandomDatasetConfig};
pub use geo::Polygon;
pub use graph::{SocialGraph, SocialGraphStats};
pub use ids::{UserId, VenueId};
pub use node::{Coordinates, UserNode};
pub use rating::{Rating, RatingDistribution, RatingIndex, RatingRecord, MAX_RATING, MIN_RATING};

// Re-export petgraph for callers that need the raw graph
pub use petgraph;
