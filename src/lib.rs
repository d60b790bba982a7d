//! ADS SEARCH TO TSV
//! Reads author names or grant ids, drains every result page from the search API
//! and prints a few fields of each record as tab separated lines.

pub mod config;
mod error;
pub mod fetch;
pub mod format;
mod macros;
pub mod parse;
pub mod process;
pub mod query;
pub mod request;
pub mod response;

pub use error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "http://adslabs.org/adsabs/api/search/";
pub const DEFAULT_ROWS: u32 = 100;
/// Static part of every grant lookup, sent as a filter query.
pub const DEFAULT_GRANT_FILTER: &str = r#"(NASA OR "National Aeronautics and Space Administration") AND grant"#;
const AUTHOR_FIELDS: [&str; 4] = ["bibcode", "title", "pub", "author"];
/// Number of publication venues reported per author.
pub const DEFAULT_TOP_VENUES: u32 = 3;
