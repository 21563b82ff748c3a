//! Ratings and the per-user / per-venue rating index.

use crate::{Error, Result, UserId, VenueId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lowest valid rating.
pub const MIN_RATING: u8 = 1;
/// Highest valid rating.
pub const MAX_RATING: u8 = 5;

/// A venue rating, always in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rating(u8);

impl Rating {
    /// Create a rating, or `None` when `value` is outside `1..=5`.
    pub fn new(value: u8) -> Option<Self> {
        (MIN_RATING..=MAX_RATING)
            .contains(&value)
            .then_some(Self(value))
    }

    /// The numeric value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Absolute difference between two ratings (0..=4).
    pub fn distance(self, other: Self) -> u8 {
        self.0.abs_diff(other.0)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One `(user, venue, rating)` observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRecord {
    /// Rating user.
    pub user: UserId,
    /// Rated venue.
    pub venue: VenueId,
    /// The rating.
    pub rating: Rating,
}

impl RatingRecord {
    /// Create a record from an already validated rating.
    pub fn new(user: impl Into<UserId>, venue: impl Into<VenueId>, rating: Rating) -> Self {
        Self {
            user: user.into(),
            venue: venue.into(),
            rating,
        }
    }

    /// Create a record from a raw rating value.
    ///
    /// Fails with [`Error::MalformedRating`] if `raw` is not an integer in `1..=5`.
    /// Values are never rounded or clamped.
    pub fn parse(user: impl Into<UserId>, venue: impl Into<VenueId>, raw: &str) -> Result<Self> {
        let user = user.into();
        let venue = venue.into();
        let rating = raw
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(Rating::new)
            .ok_or_else(|| Error::MalformedRating {
                user: user.0.clone(),
                venue: venue.0.clone(),
                value: raw.to_string(),
            })?;
        Ok(Self {
            user,
            venue,
            rating,
        })
    }
}

/// How the population rated one venue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingDistribution {
    counts: [usize; MAX_RATING as usize],
    total: usize,
}

impl RatingDistribution {
    fn record(&mut self, rating: Rating) {
        self.counts[usize::from(rating.value() - MIN_RATING)] += 1;
        self.total += 1;
    }

    /// Fraction of this venue's ratings equal to `rating`.
    pub fn fraction(&self, rating: Rating) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.counts[usize::from(rating.value() - MIN_RATING)] as f64 / self.total as f64
    }

    /// Fractions for ratings 1 through 5, summing to 1.
    pub fn fractions(&self) -> [f64; MAX_RATING as usize] {
        let mut out = [0.0; MAX_RATING as usize];
        for (value, slot) in (MIN_RATING..=MAX_RATING).zip(out.iter_mut()) {
            *slot = Rating::new(value).map_or(0.0, |r| self.fraction(r));
        }
        out
    }

    /// Number of ratings the venue received.
    pub fn total(&self) -> usize {
        self.total
    }
}

/// Per-user venue ratings plus per-venue rating distributions.
///
/// Both maps are ordered so that everything derived from the index iterates
/// users and venues in the same order on every run.
#[derive(Debug, Clone, Default)]
pub struct RatingIndex {
    user_venue_ratings: BTreeMap<UserId, BTreeMap<VenueId, Rating>>,
    venue_distribution: BTreeMap<VenueId, RatingDistribution>,
    record_count: usize,
}

impl RatingIndex {
    /// Build the index. A later rating of the same venue by the same user
    /// replaces the earlier one.
    pub fn build(records: impl IntoIterator<Item = RatingRecord>) -> Self {
        let mut user_venue_ratings: BTreeMap<UserId, BTreeMap<VenueId, Rating>> = BTreeMap::new();
        let mut record_count = 0;
        for record in records {
            record_count += 1;
            user_venue_ratings
                .entry(record.user)
                .or_default()
                .insert(record.venue, record.rating);
        }

        // Distributions count the surviving rating of each (user, venue) pair.
        let mut venue_distribution: BTreeMap<VenueId, RatingDistribution> = BTreeMap::new();
        for ratings in user_venue_ratings.values() {
            for (venue, &rating) in ratings {
                venue_distribution
                    .entry(venue.clone())
                    .or_default()
                    .record(rating);
            }
        }

        tracing::info!(
            users = user_venue_ratings.len(),
            venues = venue_distribution.len(),
            records = record_count,
            "rating index built"
        );

        Self {
            user_venue_ratings,
            venue_distribution,
            record_count,
        }
    }

    /// Build the index from raw `(user, venue, value)` triples, failing on the
    /// first malformed value.
    pub fn from_raw<U, V, S>(raw: impl IntoIterator<Item = (U, V, S)>) -> Result<Self>
    where
        U: Into<UserId>,
        V: Into<VenueId>,
        S: AsRef<str>,
    {
        let records = raw
            .into_iter()
            .map(|(user, venue, value)| RatingRecord::parse(user, venue, value.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::build(records))
    }

    /// Venue ratings per user.
    pub fn user_venue_ratings(&self) -> &BTreeMap<UserId, BTreeMap<VenueId, Rating>> {
        &self.user_venue_ratings
    }

    /// Ratings of a single user.
    pub fn ratings_of(&self, user: &UserId) -> Option<&BTreeMap<VenueId, Rating>> {
        self.user_venue_ratings.get(user)
    }

    /// Rating distribution per venue.
    pub fn venue_rating_distribution(&self) -> &BTreeMap<VenueId, RatingDistribution> {
        &self.venue_distribution
    }

    /// Rating distribution of a single venue.
    pub fn distribution_for(&self, venue: &VenueId) -> Option<&RatingDistribution> {
        self.venue_distribution.get(venue)
    }

    /// Number of distinct rating users.
    pub fn user_count(&self) -> usize {
        self.user_venue_ratings.len()
    }

    /// Number of distinct rated venues.
    pub fn venue_count(&self) -> usize {
        self.venue_distribution.len()
    }

    /// Number of records the index was built from, duplicates included.
    pub fn record_count(&self) -> usize {
        self.record_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(v: u8) -> Rating {
        Rating::new(v).unwrap()
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_none());
        assert!(Rating::new(6).is_none());
        assert_eq!(r(3).value(), 3);
        assert_eq!(r(5).distance(r(1)), 4);
        assert_eq!(r(1).distance(r(5)), 4);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in ["0", "6", "abc", "4.5", "", "-1"] {
            let err = RatingRecord::parse("u", "v", raw).unwrap_err();
            assert!(
                matches!(err, Error::MalformedRating { ref value, .. } if value == raw),
                "unexpected error for {raw:?}: {err}"
            );
        }
        let ok = RatingRecord::parse("u", "v", " 4 ").unwrap();
        assert_eq!(ok.rating, r(4));
    }

    #[test]
    fn test_last_write_wins() {
        let index = RatingIndex::build(vec![
            RatingRecord::new("1", "V1", r(2)),
            RatingRecord::new("1", "V1", r(5)),
        ]);
        let ratings = index.ratings_of(&UserId::from("1")).unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[&VenueId::from("V1")], r(5));
        assert_eq!(index.record_count(), 2);

        let dist = index.distribution_for(&VenueId::from("V1")).unwrap();
        assert_eq!(dist.total(), 1);
        assert_eq!(dist.fraction(r(5)), 1.0);
    }

    #[test]
    fn test_distribution_fractions_sum_to_one() {
        let index = RatingIndex::from_raw(vec![
            ("1", "V1", "5"),
            ("2", "V1", "5"),
            ("3", "V1", "1"),
            ("4", "V1", "3"),
        ])
        .unwrap();
        let dist = index.distribution_for(&VenueId::from("V1")).unwrap();
        assert_eq!(dist.fraction(r(5)), 0.5);
        assert_eq!(dist.fraction(r(1)), 0.25);
        assert_eq!(dist.fraction(r(2)), 0.0);
        let sum: f64 = dist.fractions().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_raw_fails_fast() {
        let err = RatingIndex::from_raw(vec![("1", "V1", "5"), ("2", "V1", "9")]).unwrap_err();
        assert!(matches!(err, Error::MalformedRating { .. }));
    }
}
