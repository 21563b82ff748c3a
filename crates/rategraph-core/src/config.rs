//! Configuration for graph construction and influence evaluation.

use crate::{Rating, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// When a neighbor's rating counts as agreeing with a user's rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementTolerance {
    /// Ratings must be equal.
    #[default]
    Exact,
    /// Ratings may differ by at most one star.
    WithinOne,
}

impl AgreementTolerance {
    /// Whether `other` agrees with `own` under this tolerance.
    pub fn agrees(self, own: Rating, other: Rating) -> bool {
        match self {
            Self::Exact => own == other,
            Self::WithinOne => own.distance(other) <= 1,
        }
    }
}

/// Configuration for building and analysing a similarity graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Agreement policy used by influence evaluation.
    pub agreement_tolerance: AgreementTolerance,
    /// Shared-venue count at which an edge reaches full confidence.
    pub judgement_validity_limit: usize,
    /// Attach coordinates to nodes when available.
    pub include_geo: bool,
    /// Attach pruned followings to nodes when a friendship index is given.
    pub include_friendships: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            agreement_tolerance: AgreementTolerance::Exact,
            judgement_validity_limit: 3,
            include_geo: false,
            include_friendships: true,
        }
    }
}

impl GraphConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Confidence multiplier for an edge backed by `shared` venues.
    ///
    /// Saturates at 1 once `shared` reaches the limit. A limit of zero means
    /// every edge has full confidence.
    pub fn judgement_validity(&self, shared: usize) -> f64 {
        if shared >= self.judgement_validity_limit {
            1.0
        } else {
            shared as f64 / self.judgement_validity_limit as f64
        }
    }
}
