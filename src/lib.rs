#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod features;
pub mod loader;
mod raw_data;
pub mod segment;
pub mod sonority;
pub mod table;

pub use config::TableConfig;
pub use features::{Feature, FeatureMask, FeatureSet, FeatureValue};
pub use loader::TableSource;
pub use raw_data::TableVariant;
pub use segment::{segment_text, segment_text_with, SEG_REGEX};
pub use sonority::sonority_from_features;
pub use table::FeatureTable;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeatureError {
    /// Unknown table variant requested.
    #[error("Unknown feature table variant: {0}")]
    Configuration(String),

    #[error("Unknown segment: {0}")]
    UnknownSegment(String),

    #[error("Invalid value {value:?} for feature {feature} of segment {segment}")]
    InvalidFeatureValue {
        segment: String,
        feature: String,
        value: String,
    },

    #[error("Row for segment {segment} has {actual} values, expected {expected}")]
    MalformedRow {
        segment: String,
        expected: usize,
        actual: usize,
    },

    #[error("Feature {0} appears more than once in the table header")]
    DuplicateFeature(String),

    #[error("Feature table header has no feature columns")]
    EmptyHeader,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FeatureResult<T> = Result<T, FeatureError>;
