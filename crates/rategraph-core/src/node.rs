//! Node records attached to users in the similarity graph.

use crate::{Error, Rating, Result, UserId, VenueId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Geographic position of a user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Longitude in degrees, `-180..=180`.
    pub longitude: f64,
    /// Latitude in degrees, `-90..=90`.
    pub latitude: f64,
}

impl Coordinates {
    /// Create coordinates, rejecting non-finite or out-of-range values.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::MalformedCoordinate(format!("longitude {longitude}")));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::MalformedCoordinate(format!("latitude {latitude}")));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Parse coordinates from their textual form.
    pub fn parse(longitude: &str, latitude: &str) -> Result<Self> {
        let parse = |raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| Error::MalformedCoordinate(raw.to_string()))
        };
        Self::new(parse(longitude)?, parse(latitude)?)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.longitude, self.latitude)
    }
}

/// A user node and its attributes.
///
/// `followings` is `None` when the user follows nobody in the graph, either
/// because they have no friendship record or because every followee was
/// pruned. A `Some` set is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserNode {
    /// User identifier.
    pub id: UserId,
    /// The user's own venue ratings.
    pub venue_ratings: BTreeMap<VenueId, Rating>,
    /// Users this user follows, restricted to graph nodes.
    pub followings: Option<BTreeSet<UserId>>,
    /// Position, when the graph was built with geographic data.
    pub coordinates: Option<Coordinates>,
}

impl UserNode {
    /// Create a node with no attributes.
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            venue_ratings: BTreeMap::new(),
            followings: None,
            coordinates: None,
        }
    }

    /// Set the venue ratings.
    pub fn with_ratings(mut self, venue_ratings: BTreeMap<VenueId, Rating>) -> Self {
        self.venue_ratings = venue_ratings;
        self
    }

    /// Set the coordinates.
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// This user's rating of `venue`, if any.
    pub fn rating_of(&self, venue: &VenueId) -> Option<Rating> {
        self.venue_ratings.get(venue).copied()
    }
}

impl fmt::Display for UserNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} ratings)", self.id, self.venue_ratings.len())
    }
}
