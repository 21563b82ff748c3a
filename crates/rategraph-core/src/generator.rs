//! Random null-model datasets.
//!
//! A dataset has uniformly random ratings and a directed Erdős–Rényi
//! friendship relation. Averaging metrics over many such datasets gives the
//! baseline that real-data results are compared against.

use crate::formats::text;
use crate::{
    AnalysisContext, Coordinates, FriendshipIndex, FriendshipRecord, GraphConfig, Rating,
    RatingIndex, RatingRecord, Result, UserId, MAX_RATING, MIN_RATING,
};
use rand::Rng;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Ratings file inside a dataset directory.
pub const RATINGS_FILE: &str = "ratings.txt";
/// Friendships file inside a dataset directory.
pub const FRIENDSHIPS_FILE: &str = "friendships.txt";
/// Users file inside a dataset directory.
pub const USERS_FILE: &str = "users.txt";

/// Size of a random dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomDatasetConfig {
    /// Number of users, ids `0..users`.
    pub users: usize,
    /// Number of venues, ids `0..venues`.
    pub venues: usize,
    /// Number of rating records drawn.
    pub ratings: usize,
    /// Probability of each ordered follower/followee pair.
    pub friendship_probability: f64,
}

impl Default for RandomDatasetConfig {
    fn default() -> Self {
        Self {
            users: 5600,
            venues: 8000,
            ratings: 21000,
            friendship_probability: 0.0008,
        }
    }
}

/// Ratings, friendships and user positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Rating records.
    pub ratings: Vec<RatingRecord>,
    /// Directed friendships.
    pub friendships: Vec<FriendshipRecord>,
    /// User positions.
    pub users: HashMap<UserId, Coordinates>,
}

impl Dataset {
    /// Write `ratings.txt`, `friendships.txt` and `users.txt` into `dir`.
    pub fn save_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        text::write_ratings(File::create(dir.join(RATINGS_FILE))?, &self.ratings)?;
        text::write_friendships(File::create(dir.join(FRIENDSHIPS_FILE))?, &self.friendships)?;
        text::write_positions(File::create(dir.join(USERS_FILE))?, &self.users)?;
        Ok(())
    }

    /// Read a dataset directory. Only `ratings.txt` is required.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let ratings = text::read_ratings_file(dir.join(RATINGS_FILE))?;
        let friendships_path = dir.join(FRIENDSHIPS_FILE);
        let friendships = if friendships_path.exists() {
            text::read_friendships_file(friendships_path)?
        } else {
            Vec::new()
        };
        let users_path = dir.join(USERS_FILE);
        let users = if users_path.exists() {
            text::read_users_file(users_path)?
        } else {
            HashMap::new()
        };
        tracing::info!(
            dir = %dir.display(),
            ratings = ratings.len(),
            friendships = friendships.len(),
            users = users.len(),
            "loaded dataset"
        );
        Ok(Self {
            ratings,
            friendships,
            users,
        })
    }

    /// Build an analysis context from this dataset.
    pub fn into_context(self, config: GraphConfig) -> AnalysisContext {
        let ratings = RatingIndex::build(self.ratings);
        let mut friendships = FriendshipIndex::build(self.friendships);
        let coordinates = (!self.users.is_empty()).then_some(&self.users);
        AnalysisContext::build(ratings, Some(&mut friendships), coordinates, config)
    }
}

/// Draw a random dataset. Same config and seed give the same dataset.
pub fn generate_dataset(config: &RandomDatasetConfig, seed: u64) -> Dataset {
    let mut rng = XorShiftRng::seed_from_u64(seed);

    let users: HashMap<UserId, Coordinates> = (0..config.users)
        .map(|u| {
            (
                UserId::from(u as u64),
                Coordinates {
                    longitude: 0.0,
                    latitude: 0.0,
                },
            )
        })
        .collect();

    let mut ratings = Vec::with_capacity(config.ratings);
    if config.users > 0 && config.venues > 0 {
        for _ in 0..config.ratings {
            let user = rng.gen_range(0..config.users) as u64;
            let venue = rng.gen_range(0..config.venues) as u64;
            let value = rng.gen_range(MIN_RATING..=MAX_RATING);
            if let Some(rating) = Rating::new(value) {
                ratings.push(RatingRecord::new(user, venue, rating));
            }
        }
    }

    let p = config.friendship_probability;
    let mut friendships = Vec::new();
    for follower in 0..config.users {
        for followee in 0..config.users {
            if follower != followee && rng.gen::<f64>() < p {
                friendships.push(FriendshipRecord::new(follower as u64, followee as u64));
            }
        }
    }

    tracing::debug!(
        seed,
        ratings = ratings.len(),
        friendships = friendships.len(),
        "generated random dataset"
    );

    Dataset {
        ratings,
        friendships,
        users,
    }
}

/// Percentile bands reported by [`null_model_report`].
pub const NULL_MODEL_BANDS: [(f64, f64); 3] = [(0.0, 0.1), (0.1, 0.2), (0.2, 0.3)];

/// Metrics averaged over random datasets. `None` when no sample defined it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullModelReport {
    /// Samples drawn.
    pub samples: usize,
    /// Mean average degree.
    pub average_degree: Option<f64>,
    /// Mean band influence by betweenness, one entry per [`NULL_MODEL_BANDS`] band.
    pub band_influence: Vec<Option<f64>>,
    /// Mean friend influence.
    pub friend_influence: Option<f64>,
}

#[derive(Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn get(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Build `samples` random graphs and average their metrics.
///
/// Sample `i` uses seed `seed + i`.
pub fn null_model_report(
    config: &RandomDatasetConfig,
    samples: usize,
    seed: u64,
    graph_config: GraphConfig,
) -> Result<NullModelReport> {
    let mut degree = Mean::default();
    let mut bands: Vec<Mean> = NULL_MODEL_BANDS.iter().map(|_| Mean::default()).collect();
    let mut friends = Mean::default();

    for i in 0..samples {
        let dataset = generate_dataset(config, seed.wrapping_add(i as u64));
        let ctx = dataset.into_context(graph_config);

        let stats = ctx.graph().stats();
        degree.push((stats.node_count > 0).then_some(stats.avg_degree));

        let ranker = ctx.structural_ranker();
        let report = ctx.band_report(&ranker, &NULL_MODEL_BANDS)?;
        for (mean, band) in bands.iter_mut().zip(report) {
            mean.push(band.influence.ok());
        }
        friends.push(ctx.average_friend_influence().ok());

        tracing::info!(sample = i + 1, samples, "null-model sample done");
    }

    Ok(NullModelReport {
        samples,
        average_degree: degree.get(),
        band_influence: bands.iter().map(Mean::get).collect(),
        friend_influence: friends.get(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> RandomDatasetConfig {
        RandomDatasetConfig {
            users: 40,
            venues: 15,
            ratings: 200,
            friendship_probability: 0.1,
        }
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = generate_dataset(&small(), 7);
        let b = generate_dataset(&small(), 7);
        let c = generate_dataset(&small(), 8);
        assert_eq!(a, b);
        assert_ne!(a.ratings, c.ratings);
    }

    #[test]
    fn test_generate_shape() {
        let d = generate_dataset(&small(), 1);
        assert_eq!(d.ratings.len(), 200);
        assert_eq!(d.users.len(), 40);
        assert!(d.users.values().all(|c| c.longitude == 0.0 && c.latitude == 0.0));
        assert!(d.friendships.iter().all(|f| f.follower != f.followee));
        assert!(!d.friendships.is_empty());
    }

    #[test]
    fn test_zero_probability_has_no_friendships() {
        let config = RandomDatasetConfig {
            friendship_probability: 0.0,
            ..small()
        };
        assert!(generate_dataset(&config, 3).friendships.is_empty());
    }

    #[test]
    fn test_save_and_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        let d = generate_dataset(&small(), 5);
        d.save_dir(dir.path()).unwrap();
        let back = Dataset::load_dir(dir.path()).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_null_model_report() {
        let report = null_model_report(&small(), 2, 11, GraphConfig::default()).unwrap();
        assert_eq!(report.samples, 2);
        assert_eq!(report.band_influence.len(), 3);
        assert!(report.average_degree.unwrap() > 0.0);
        if let Some(v) = report.friend_influence {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_null_model_without_samples() {
        let report = null_model_report(&small(), 0, 0, GraphConfig::default()).unwrap();
        assert_eq!(report.average_degree, None);
        assert_eq!(report.friend_influence, None);
    }
}
