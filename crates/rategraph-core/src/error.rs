//! Error types for rategraph-core.

use thiserror::Error;

use crate::UserId;

/// Error type for graph construction and influence analysis.
#[derive(Error, Debug)]
pub enum Error {
    /// A rating value that is not an integer in 1..=5.
    #[error("malformed rating {value:?} for user {user} at venue {venue}")]
    MalformedRating {
        /// User who submitted the rating.
        user: String,
        /// Venue that was rated.
        venue: String,
        /// Raw value as it appeared in the input.
        value: String,
    },

    /// A line of an input file that does not have the expected shape.
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A longitude/latitude value that cannot be parsed or is out of range.
    #[error("malformed coordinate: {0}")]
    MalformedCoordinate(String),

    /// Requested sample is not smaller than the graph.
    #[error("sample size {requested} must be smaller than the graph ({available} nodes)")]
    SampleTooLarge {
        /// Requested node count.
        requested: usize,
        /// Nodes in the source graph.
        available: usize,
    },

    /// Percentile bounds outside `0 <= start <= end <= 1`.
    #[error("invalid percentile band {start}..{end}")]
    InvalidPercentile {
        /// Band start.
        start: f64,
        /// Band end.
        end: f64,
    },

    /// The requested percentile band selects no users.
    #[error("percentile band {start}..{end} selects no users")]
    EmptyBand {
        /// Band start.
        start: f64,
        /// Band end.
        end: f64,
    },

    /// A user shares no rated venue with any neighbor, so influence is undefined.
    #[error("user {0} shares no rated venue with any neighbor")]
    NoCommonVenues(UserId),

    /// An aggregate had no user with a defined value.
    #[error("no qualifying users for {0}")]
    NoQualifyingUsers(&'static str),

    /// User is not a node of the graph.
    #[error("user not in graph: {0}")]
    UnknownUser(UserId),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary (bincode) serialization error.
    #[error("binary serialization error: {0}")]
    Binary(#[from] bincode::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for rategraph operations.
pub type Result<T> = std::result::Result<T, Error>;
