//! Per-drug lookups in the description table

use crate::data::{DescriptionRecord, DescriptionTable};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
}

fn record<'a>(table: &'a DescriptionTable, key: &str) -> Result<&'a DescriptionRecord, LookupError> {
    table
        .get(key)
        .ok_or_else(|| LookupError::UnknownCategory(key.to_string()))
}

/// Image URL for the drug
pub fn image_url<'a>(table: &'a DescriptionTable, key: &str) -> Result<&'a str, LookupError> {
    record(table, key).map(|r| r.image_url.as_str())
}

/// Free-text description of the drug
pub fn description<'a>(table: &'a DescriptionTable, key: &str) -> Result<&'a str, LookupError> {
    record(table, key).map(|r| r.description.as_str())
}

/// Reference page the description was taken from
pub fn reference_url<'a>(table: &'a DescriptionTable, key: &str) -> Result<&'a str, LookupError> {
    record(table, key).map(|r| r.reference_url.as_str())
}
