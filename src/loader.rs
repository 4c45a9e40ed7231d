use crate::{FeatureError, FeatureResult};
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::path::Path;

/// A parsed feature table: the feature names from the header (segment column
/// dropped) and one row per segment holding the raw cell values.
///
/// Cell values are validated when the table is built, not here.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TableSource {
    pub names: Vec<String>,
    pub rows: Vec<(String, Vec<String>)>,
}

impl TableSource {
    pub fn from_reader<R: io::Read>(reader: R) -> FeatureResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let names = headers
            .iter()
            .skip(1)
            .map(|h| h.to_string())
            .collect::<Vec<_>>();
        if names.is_empty() {
            return Err(FeatureError::EmptyHeader);
        }
        let mut rows = vec![];
        for result in rdr.records() {
            let record = result?;
            let mut cells = record.iter();
            let Some(segment) = cells.next() else {
                continue;
            };
            let values = cells.map(|c| c.to_string()).collect::<Vec<_>>();
            rows.push((segment.to_string(), values));
        }
        log::debug!("read {} rows with {} features", rows.len(), names.len());
        Ok(Self { names, rows })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> FeatureResult<Self> {
        let file = File::open(path.as_ref())?;
        log::debug!("loading feature table from {}", path.as_ref().display());
        Self::from_reader(BufReader::new(file))
    }
}
