use crate::loader::TableSource;
use crate::FeatureResult;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

pub const SPE_FEATURES: &str = include_str!("../data/segment_features.csv");
pub const PHOIBLE_FEATURES: &str = include_str!("../data/segment_features_phoible.csv");

/// The feature systems that ship with the crate.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum TableVariant {
    /// SPE-style features, also known as `panphon`.
    #[default]
    #[strum(to_string = "spe+", serialize = "panphon")]
    #[serde(rename = "spe+", alias = "panphon")]
    Spe,
    #[strum(to_string = "phoible")]
    #[serde(rename = "phoible")]
    Phoible,
}

impl TableVariant {
    pub fn file_name(self) -> &'static str {
        match self {
            TableVariant::Spe => "segment_features.csv",
            TableVariant::Phoible => "segment_features_phoible.csv",
        }
    }

    pub(crate) fn embedded(self) -> &'static str {
        match self {
            TableVariant::Spe => SPE_FEATURES,
            TableVariant::Phoible => PHOIBLE_FEATURES,
        }
    }

    /// Parses the copy of the table compiled into the crate.
    pub fn source(self) -> FeatureResult<TableSource> {
        TableSource::from_reader(self.embedded().as_bytes())
    }
}
