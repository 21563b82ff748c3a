//! Whitespace-delimited data files, one record per line.
//!
//! | File | Columns |
//! |------|---------|
//! | ratings | `user venue rating` |
//! | friendships | `follower followee` |
//! | users | `id latitude longitude` |
//!
//! Blank lines are skipped; any other line with the wrong number of columns
//! is an error.

use crate::formats::dat::CheckinRecord;
use crate::{Coordinates, Error, FriendshipRecord, RatingRecord, Result, UserId};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::fs::File;
use std::hash::Hash;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

fn records<R: Read>(
    reader: R,
    columns: usize,
) -> impl Iterator<Item = Result<(usize, Vec<String>)>> {
    BufReader::new(reader)
        .lines()
        .enumerate()
        .filter_map(move |(i, line)| {
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(Error::Io(e))),
            };
            let fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            if fields.is_empty() {
                return None;
            }
            if fields.len() != columns {
                return Some(Err(Error::MalformedRecord {
                    line: i + 1,
                    reason: format!("expected {columns} columns, found {}", fields.len()),
                }));
            }
            Some(Ok((i + 1, fields)))
        })
}

/// Read rating records.
pub fn read_ratings<R: Read>(reader: R) -> Result<Vec<RatingRecord>> {
    records(reader, 3)
        .map(|record| {
            let (_, f) = record?;
            RatingRecord::parse(f[0].as_str(), f[1].as_str(), &f[2])
        })
        .collect()
}

/// Read friendship records.
pub fn read_friendships<R: Read>(reader: R) -> Result<Vec<FriendshipRecord>> {
    records(reader, 2)
        .map(|record| {
            let (_, f) = record?;
            Ok(FriendshipRecord::new(f[0].as_str(), f[1].as_str()))
        })
        .collect()
}

/// Read user positions.
pub fn read_users<R: Read>(reader: R) -> Result<HashMap<UserId, Coordinates>> {
    records(reader, 3)
        .map(|record| {
            let (_, f) = record?;
            let coordinates = Coordinates::parse(&f[2], &f[1])?;
            Ok((UserId::from(f[0].as_str()), coordinates))
        })
        .collect()
}

/// Read a ratings file.
pub fn read_ratings_file(path: impl AsRef<Path>) -> Result<Vec<RatingRecord>> {
    read_ratings(File::open(path)?)
}

/// Read a friendships file.
pub fn read_friendships_file(path: impl AsRef<Path>) -> Result<Vec<FriendshipRecord>> {
    read_friendships(File::open(path)?)
}

/// Read a users file.
pub fn read_users_file(path: impl AsRef<Path>) -> Result<HashMap<UserId, Coordinates>> {
    read_users(File::open(path)?)
}

/// Write rating records.
pub fn write_ratings<W: Write>(writer: W, ratings: &[RatingRecord]) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for r in ratings {
        writeln!(writer, "{} {} {}", r.user, r.venue, r.rating)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write friendship records.
pub fn write_friendships<W: Write>(writer: W, friendships: &[FriendshipRecord]) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for f in friendships {
        writeln!(writer, "{} {}", f.follower, f.followee)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `id user venue latitude longitude created_at` checkin lines.
pub fn write_checkins<W: Write>(writer: W, checkins: &[CheckinRecord]) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for c in checkins {
        writeln!(
            writer,
            "{} {} {} {} {} {}",
            c.id, c.user, c.venue, c.coordinates.latitude, c.coordinates.longitude, c.created_at
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `id latitude longitude` lines, ordered by id.
pub fn write_positions<W, K>(writer: W, positions: &HashMap<K, Coordinates>) -> Result<()>
where
    W: Write,
    K: Ord + Hash + Display,
{
    let ordered: BTreeMap<&K, &Coordinates> = positions.iter().collect();
    let mut writer = BufWriter::new(writer);
    for (id, c) in ordered {
        writeln!(writer, "{} {} {}", id, c.latitude, c.longitude)?;
    }
    writer.flush()?;
    Ok(())
}
