use crate::{FeatureResult, TableVariant};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// How to build a [`FeatureTable`](crate::FeatureTable).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub variant: TableVariant,
    /// Directory holding the variant's CSV file. The tables compiled into
    /// the crate are used when unset.
    pub data_dir: Option<PathBuf>,
    /// Strip tie bars from every segment after loading.
    pub delete_ties: bool,
}

impl TableConfig {
    pub fn new(variant: TableVariant) -> Self {
        Self {
            variant,
            ..Default::default()
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_delete_ties(mut self, delete_ties: bool) -> Self {
        self.delete_ties = delete_ties;
        self
    }

    pub fn from_json_str(json: &str) -> FeatureResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> FeatureResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Path of the variant's CSV file, if a data directory is configured.
    pub fn table_path(&self) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(self.variant.file_name()))
    }
}
