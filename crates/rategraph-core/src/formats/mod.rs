//! Input and output formats.
//!
//! - [`text`] - whitespace-delimited ratings, friendships and user positions
//! - [`dat`] - raw pipe-delimited table dumps
//! - [`csv`] - node and edge tables for visualization tools

pub mod csv;
pub mod dat;
pub mod text;

pub use self::csv::{Csv, CsvOptions};
