//! Raw pipe-delimited table dumps.
//!
//! Each file starts with a column header line and a separator line. Data rows
//! are `|`-separated; a row with any empty column is skipped, and a trailing
//! `(N rows)` footer is ignored.
//!
//! | File | Columns |
//! |------|---------|
//! | users, venues | `id \| latitude \| longitude` |
//! | ratings | `user_id \| venue_id \| rating` |
//! | checkins | `id \| user_id \| venue_id \| latitude \| longitude \| created_at` |

use crate::geo::Polygon;
use crate::{Coordinates, Error, RatingRecord, Result, UserId, VenueId};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::hash::Hash;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

const HEADER_LINES: usize = 2;

/// A geolocated row of a users or venues dump.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecord {
    /// Row identifier.
    pub id: String,
    /// Row position.
    pub coordinates: Coordinates,
}

/// A row of a checkins dump.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckinRecord {
    /// Row identifier.
    pub id: String,
    /// Checking-in user.
    pub user: UserId,
    /// Visited venue.
    pub venue: VenueId,
    /// Where the checkin happened.
    pub coordinates: Coordinates,
    /// Timestamp, kept as written in the dump.
    pub created_at: String,
}

/// A record that references one user and one venue.
pub trait UserVenueRecord {
    /// The referenced user.
    fn user(&self) -> &UserId;
    /// The referenced venue.
    fn venue(&self) -> &VenueId;
}

impl UserVenueRecord for RatingRecord {
    fn user(&self) -> &UserId {
        &self.user
    }

    fn venue(&self) -> &VenueId {
        &self.venue
    }
}

impl UserVenueRecord for CheckinRecord {
    fn user(&self) -> &UserId {
        &self.user
    }

    fn venue(&self) -> &VenueId {
        &self.venue
    }
}

fn is_footer(line: &str) -> bool {
    let line = line.trim();
    line.starts_with('(') && (line.ends_with("rows)") || line.ends_with("row)"))
}

fn rows<R: Read>(reader: R, columns: usize) -> Result<Vec<(usize, Vec<String>)>> {
    let mut out = Vec::new();
    let mut skipped = 0usize;
    for (i, line) in BufReader::new(reader).lines().enumerate().skip(HEADER_LINES) {
        let line = line?;
        if line.trim().is_empty() || is_footer(&line) {
            continue;
        }
        let fields: Vec<String> = line.split('|').map(|c| c.trim().to_string()).collect();
        if fields.iter().any(String::is_empty) {
            skipped += 1;
            continue;
        }
        if fields.len() != columns {
            return Err(Error::MalformedRecord {
                line: i + 1,
                reason: format!("expected {columns} columns, found {}", fields.len()),
            });
        }
        out.push((i + 1, fields));
    }
    tracing::debug!(rows = out.len(), skipped, "read dat rows");
    Ok(out)
}

/// Read a users or venues dump.
pub fn read_geo_records<R: Read>(reader: R) -> Result<Vec<GeoRecord>> {
    rows(reader, 3)?
        .into_iter()
        .map(|(_, f)| {
            Ok(GeoRecord {
                coordinates: Coordinates::parse(&f[2], &f[1])?,
                id: f[0].clone(),
            })
        })
        .collect()
}

/// Read a ratings dump.
pub fn read_rating_records<R: Read>(reader: R) -> Result<Vec<RatingRecord>> {
    rows(reader, 3)?
        .into_iter()
        .map(|(_, f)| RatingRecord::parse(f[0].as_str(), f[1].as_str(), &f[2]))
        .collect()
}

/// Read a checkins dump.
pub fn read_checkin_records<R: Read>(reader: R) -> Result<Vec<CheckinRecord>> {
    rows(reader, 6)?
        .into_iter()
        .map(|(_, mut f)| {
            let coordinates = Coordinates::parse(&f[4], &f[3])?;
            Ok(CheckinRecord {
                created_at: std::mem::take(&mut f[5]),
                venue: VenueId::from(std::mem::take(&mut f[2])),
                user: UserId::from(std::mem::take(&mut f[1])),
                id: std::mem::take(&mut f[0]),
                coordinates,
            })
        })
        .collect()
}

/// Read a users or venues dump from disk.
pub fn read_geo_file(path: impl AsRef<Path>) -> Result<Vec<GeoRecord>> {
    read_geo_records(File::open(path)?)
}

/// Read a ratings dump from disk.
pub fn read_ratings_file(path: impl AsRef<Path>) -> Result<Vec<RatingRecord>> {
    read_rating_records(File::open(path)?)
}

/// Read a checkins dump from disk.
pub fn read_checkins_file(path: impl AsRef<Path>) -> Result<Vec<CheckinRecord>> {
    read_checkin_records(File::open(path)?)
}

/// Keep the records whose position lies inside `polygon`.
pub fn limit_by_polygon(records: Vec<GeoRecord>, polygon: &Polygon) -> Vec<GeoRecord> {
    records
        .into_iter()
        .filter(|r| polygon.contains(r.coordinates))
        .collect()
}

/// Keep the records whose user and venue both appear in the given sets.
pub fn limit_by_user_venue<T: UserVenueRecord>(
    records: Vec<T>,
    users: &[GeoRecord],
    venues: &[GeoRecord],
) -> Vec<T> {
    let user_ids = ids(users);
    let venue_ids = ids(venues);
    records
        .into_iter()
        .filter(|r| user_ids.contains(r.user().as_str()) && venue_ids.contains(r.venue().as_str()))
        .collect()
}

fn ids(records: &[GeoRecord]) -> HashSet<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

/// Index geo records by id.
pub fn coordinates_by_id<K>(records: &[GeoRecord]) -> HashMap<K, Coordinates>
where
    K: From<String> + Eq + Hash,
{
    records
        .iter()
        .map(|r| (K::from(r.id.clone()), r.coordinates))
        .collect()
}
