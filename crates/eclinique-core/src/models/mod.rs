//! Domain models for the eClinique client.
//!
//! Field names follow the backend's JSON contract through serde renames; the
//! Rust side uses English names throughout.

mod appointment;
mod auth;
mod catalog;
mod practitioner;
mod profile;

pub use appointment::*;
pub use auth::*;
pub use catalog::*;
pub use practitioner::*;
pub use profile::*;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Parse the calendar date out of a wire value.
///
/// Accepts `YYYY-MM-DD` or any longer ISO timestamp; only the leading
/// ten characters are considered.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Deserialize a string that the backend may send as `null`.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
