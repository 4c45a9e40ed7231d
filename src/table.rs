//! The segment to feature mapping and the queries over it.
//!
//! Lookups come in three strengths: [`FeatureTable::features_of`] fails on an
//! unknown segment, [`FeatureTable::get`] returns `None`, and the inventory
//! queries skip unknown segments entirely (an unknown segment never matches).

use crate::features::{Feature, FeatureMask, FeatureSet, FeatureValue};
use crate::loader::TableSource;
use crate::sonority::sonority_from_features;
use crate::{FeatureError, FeatureResult, TableConfig, TableVariant};
use itertools::Itertools;
use std::collections::HashMap;

pub const TIE_BAR: char = '\u{0361}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureTable {
    segments: Vec<(String, FeatureSet)>,
    index: HashMap<String, usize>,
    names: Vec<String>,
}

impl FeatureTable {
    /// Loads a bundled table by name: `spe+`, `panphon` or `phoible`.
    pub fn new(variant: &str) -> FeatureResult<Self> {
        let variant = variant
            .parse::<TableVariant>()
            .map_err(|_| FeatureError::Configuration(variant.to_string()))?;
        Self::from_variant(variant)
    }

    pub fn from_variant(variant: TableVariant) -> FeatureResult<Self> {
        log::debug!("loading embedded {} table", variant);
        Self::from_source(variant.source()?)
    }

    pub fn from_config(config: &TableConfig) -> FeatureResult<Self> {
        let source = match config.table_path() {
            Some(path) => TableSource::from_path(path)?,
            None => config.variant.source()?,
        };
        let mut table = Self::from_source(source)?;
        if config.delete_ties {
            table.delete_ties();
        }
        Ok(table)
    }

    /// Builds the table from parsed rows. Every cell must be `+`, `-` or `0`
    /// and every feature name may appear once. A segment repeated in a later
    /// row replaces the earlier one.
    pub fn from_source(source: TableSource) -> FeatureResult<Self> {
        let TableSource { names, rows } = source;
        if names.is_empty() {
            return Err(FeatureError::EmptyHeader);
        }
        if let Some(name) = names.iter().duplicates().next() {
            return Err(FeatureError::DuplicateFeature(name.clone()));
        }
        let mut table = Self {
            segments: Vec::with_capacity(rows.len()),
            index: HashMap::with_capacity(rows.len()),
            names,
        };
        for (segment, values) in rows {
            if values.len() != table.names.len() {
                return Err(FeatureError::MalformedRow {
                    segment,
                    expected: table.names.len(),
                    actual: values.len(),
                });
            }
            let fts = table
                .names
                .iter()
                .zip(values.iter())
                .map(|(name, value)| {
                    FeatureValue::try_from(value.as_str())
                        .map(|v| Feature::new(v, name.as_str()))
                        .map_err(|_| FeatureError::InvalidFeatureValue {
                            segment: segment.clone(),
                            feature: name.clone(),
                            value: value.clone(),
                        })
                })
                .collect::<FeatureResult<FeatureSet>>()?;
            table.insert(segment, fts);
        }
        log::debug!(
            "built feature table with {} segments and {} features",
            table.segments.len(),
            table.names.len()
        );
        Ok(table)
    }

    fn insert(&mut self, segment: String, fts: FeatureSet) {
        if let Some(&i) = self.index.get(&segment) {
            log::warn!("duplicate segment {segment}, keeping the later row");
            self.segments[i].1 = fts;
        } else {
            self.index.insert(segment.clone(), self.segments.len());
            self.segments.push((segment, fts));
        }
    }

    /// Removes the tie bar from every segment. When the untied form already
    /// exists, the entry that comes later in the table wins.
    pub fn delete_ties(&mut self) {
        let segments = std::mem::take(&mut self.segments);
        self.index.clear();
        let mut untied = 0;
        for (segment, fts) in segments {
            if segment.contains(TIE_BAR) {
                untied += 1;
                self.insert(segment.replace(TIE_BAR, ""), fts);
            } else {
                self.insert(segment, fts);
            }
        }
        log::debug!("deleted ties from {} segments", untied);
    }

    /// Feature names in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Segments and their features in table order.
    pub fn segments(&self) -> impl Iterator<Item = (&str, &FeatureSet)> + '_ {
        self.segments.iter().map(|(s, fts)| (s.as_str(), fts))
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment_known(&self, segment: &str) -> bool {
        self.index.contains_key(segment)
    }

    pub fn get(&self, segment: &str) -> Option<&FeatureSet> {
        self.index.get(segment).map(|&i| &self.segments[i].1)
    }

    pub fn features_of(&self, segment: &str) -> FeatureResult<&FeatureSet> {
        self.get(segment)
            .ok_or_else(|| FeatureError::UnknownSegment(segment.to_string()))
    }

    /// Subset test: every feature of `mask` is in `fts`.
    pub fn matches(mask: &FeatureMask, fts: &FeatureSet) -> bool {
        fts.satisfies(mask)
    }

    /// `None` when the segment is not in the table.
    pub fn segment_matches(&self, mask: &FeatureMask, segment: &str) -> Option<bool> {
        self.get(segment).map(|fts| Self::matches(mask, fts))
    }

    pub fn any_match<I, S>(&self, mask: &FeatureMask, inventory: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        inventory
            .into_iter()
            .any(|s| self.segment_matches(mask, s.as_ref()) == Some(true))
    }

    /// True if every segment is known and matches. Vacuously true for an
    /// empty inventory.
    pub fn all_match<I, S>(&self, mask: &FeatureMask, inventory: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        inventory
            .into_iter()
            .all(|s| self.segment_matches(mask, s.as_ref()) == Some(true))
    }

    pub fn count_matches<I, S>(&self, mask: &FeatureMask, inventory: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        inventory
            .into_iter()
            .filter(|s| self.segment_matches(mask, s.as_ref()) == Some(true))
            .count()
    }

    /// True if the inventory holds a segment matching `mask` plus `+name`
    /// and another matching `mask` plus `-name`.
    pub fn contrasts<I, S>(&self, mask: &FeatureMask, name: &str, inventory: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let with_plus = mask.clone().with(Feature::positive(name));
        let with_minus = mask.clone().with(Feature::negative(name));
        let (mut plus, mut minus) = (false, false);
        for fts in inventory.into_iter().filter_map(|s| self.get(s.as_ref())) {
            plus |= Self::matches(&with_plus, fts);
            minus |= Self::matches(&with_minus, fts);
            if plus && minus {
                return true;
            }
        }
        false
    }

    /// Features shared by every known segment. Unknown segments are ignored;
    /// if none are known the result is empty.
    pub fn intersection<I, S>(&self, segments: I) -> FeatureSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut known = segments.into_iter().filter_map(|s| self.get(s.as_ref()));
        let Some(first) = known.next() else {
            log::debug!("intersection over no known segments");
            return FeatureSet::new();
        };
        known.fold(first.clone(), |acc, fts| acc.intersection(fts))
    }

    /// One character per table feature present in `fts`, in table order:
    /// `1` for `+`, `0` for `-`, a space for `0`. Features missing from the
    /// set produce no character.
    pub fn to_vector_string(&self, fts: &FeatureSet) -> String {
        self.names
            .iter()
            .filter_map(|name| fts.get(name))
            .map(FeatureValue::vector_char)
            .collect()
    }

    /// Names, in table order, whose values differ between `a` and `b`
    /// (including names present in only one of them).
    pub fn differing_features<'a>(&'a self, a: &FeatureSet, b: &FeatureSet) -> Vec<&'a str> {
        self.names
            .iter()
            .filter(|name| a.get(name) != b.get(name))
            .map(|name| name.as_str())
            .collect()
    }

    pub fn sonority(&self, segment: &str) -> FeatureResult<u8> {
        self.features_of(segment).map(sonority_from_features)
    }

    /// Segments of the table whose features satisfy `mask`, in table order.
    pub fn matching_segments<'a>(
        &'a self,
        mask: &'a FeatureMask,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.segments()
            .filter(move |(_, fts)| Self::matches(mask, fts))
            .map(|(s, _)| s)
    }

    /// Human readable feature listing of a segment, e.g. `p [+cons, -son]`.
    pub fn describe(&self, segment: &str) -> FeatureResult<String> {
        let fts = self.features_of(segment)?;
        let features = self
            .names
            .iter()
            .filter_map(|name| fts.get(name).map(|v| format!("{}{}", v, name)))
            .join(", ");
        Ok(format!("{} [{}]", segment, features))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::segment_text;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const SMALL: &str = "\
ipa,cons,son,cont,voi,hi,lo,nas
p,+,-,-,-,-,-,-
b,+,-,-,+,-,-,-
m,+,+,-,+,-,-,+
i,-,+,+,+,+,-,-
a,-,+,+,+,-,+,-
";

    fn load(csv: &str) -> FeatureResult<FeatureTable> {
        init();
        let source = TableSource::from_reader(csv.as_bytes()).unwrap();
        FeatureTable::from_source(source)
    }

    fn small() -> FeatureTable {
        load(SMALL).unwrap()
    }

    fn mask(text: &str) -> FeatureMask {
        FeatureMask::parse(text)
    }

    fn set(text: &str) -> FeatureSet {
        mask(text).iter().cloned().collect()
    }

    #[test]
    fn t_unknown_variant() {
        let err = FeatureTable::new("hayes").unwrap_err();
        assert!(matches!(err, FeatureError::Configuration(_)));
        assert_eq!(err.to_string(), "Unknown feature table variant: hayes");
    }

    #[test]
    fn t_bundled_variants() {
        init();
        let spe = FeatureTable::new("spe+").unwrap();
        let panphon = FeatureTable::new("panphon").unwrap();
        assert_eq!(spe, panphon);
        assert_eq!(spe.names()[0], "syl");
        assert!(spe.segment_known("pʰ"));

        let phoible = FeatureTable::new("phoible").unwrap();
        assert!(phoible.names().iter().any(|n| n == "periodicGlottalSource"));
        assert!(phoible.segment_known("a"));
    }

    #[test]
    fn t_bundled_sonority() {
        let table = FeatureTable::new("spe+").unwrap();
        let ranks = ["p", "pʰ", "b", "s", "v", "m", "l", "i", "e", "a", "ã"]
            .iter()
            .map(|s| table.sonority(s).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(ranks, vec![1, 1, 2, 3, 4, 5, 6, 7, 8, 9, 9]);
    }

    #[test]
    fn t_strict_and_lenient_lookup() {
        let table = small();
        assert!(table.features_of("p").is_ok());
        assert!(table.get("p").is_some());
        let err = table.features_of("x").unwrap_err();
        assert!(matches!(err, FeatureError::UnknownSegment(s) if s == "x"));
        assert_eq!(table.get("x"), None);
        let err = table.sonority("x").unwrap_err();
        assert!(matches!(err, FeatureError::UnknownSegment(_)));
    }

    #[test]
    fn t_known_iff_strict_lookup_succeeds() {
        let table = small();
        for segment in ["p", "b", "m", "i", "a", "x", "pʰ", ""] {
            let known = table.segment_known(segment);
            assert_eq!(known, table.features_of(segment).is_ok());
        }
    }

    #[test]
    fn t_invalid_value_rejected() {
        let err = load("ipa,cons,son\np,+,1\n").unwrap_err();
        match err {
            FeatureError::InvalidFeatureValue {
                segment,
                feature,
                value,
            } => {
                assert_eq!((segment.as_str(), feature.as_str()), ("p", "son"));
                assert_eq!(value, "1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn t_malformed_row_rejected() {
        let err = load("ipa,cons,son\np,+\n").unwrap_err();
        match err {
            FeatureError::MalformedRow {
                expected,
                actual,
                ..
            } => assert_eq!((expected, actual), (2, 1)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn t_duplicate_feature_column_rejected() {
        // a repeated column would silently overwrite the first value
        for csv in ["ipa,cons,cons\np,+,-\n", "ipa,son,cons,voi,cons\n"] {
            match load(csv).unwrap_err() {
                FeatureError::DuplicateFeature(name) => assert_eq!(name, "cons"),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn t_duplicate_rows_last_wins() {
        let table = load("ipa,cons\np,+\nb,+\np,-\n").unwrap();
        assert_eq!(table.len(), 2);
        let p = table.features_of("p").unwrap();
        assert!(p.contains(&Feature::negative("cons")));
        let order = table.segments().map(|(s, _)| s).collect::<Vec<_>>();
        assert_eq!(order, vec!["p", "b"]);
    }

    #[test]
    fn t_delete_ties() {
        let csv = "ipa,cons,delrel\nt\u{0361}s,+,+\nts,+,-\nd\u{0361}z,+,+\n";
        let mut table = load(csv).unwrap();
        table.delete_ties();
        assert_eq!(table.len(), 2);
        assert!(!table.segment_known("t\u{0361}s"));
        assert!(table.segment_known("dz"));
        // the untied row came later, so it survives the collision
        let ts = table.features_of("ts").unwrap();
        assert_eq!(ts.get("delrel"), Some(FeatureValue::Negative));

        let once = table.clone();
        table.delete_ties();
        assert_eq!(table, once);
    }

    #[test]
    fn t_from_config() {
        init();
        let config = TableConfig::default().with_delete_ties(true);
        let table = FeatureTable::from_config(&config).unwrap();
        assert!(table.segment_known("tʃ"));
        assert!(!table.segment_known("t\u{0361}ʃ"));

        let config = TableConfig::default().with_data_dir("/nonexistent");
        let result = FeatureTable::from_config(&config);
        assert!(matches!(result, Err(FeatureError::Io(_))));
    }

    #[test]
    fn t_empty_mask_matches_every_segment() {
        let table = FeatureTable::new("spe+").unwrap();
        let empty = FeatureMask::new();
        let all = table
            .segments()
            .all(|(_, fts)| FeatureTable::matches(&empty, fts));
        assert!(all);
        assert_eq!(table.matching_segments(&empty).count(), table.len());
    }

    #[test]
    fn t_matching_is_monotone() {
        let table = FeatureTable::new("spe+").unwrap();
        let narrow = mask("+cons -son +cont +voi");
        let wide = mask("+cons +cont");
        for (_, fts) in table.segments() {
            if FeatureTable::matches(&narrow, fts) {
                assert!(FeatureTable::matches(&wide, fts));
            }
        }
        assert!(table.matching_segments(&narrow).any(|s| s == "z"));
    }

    #[test]
    fn t_segment_matches_is_ternary() {
        let table = small();
        assert_eq!(table.segment_matches(&mask("+voi"), "b"), Some(true));
        assert_eq!(table.segment_matches(&mask("+voi"), "p"), Some(false));
        assert_eq!(table.segment_matches(&mask("+voi"), "x"), None);
        assert_eq!(table.segment_matches(&FeatureMask::new(), "x"), None);
    }

    #[test]
    fn t_quantifiers() {
        let table = small();
        let lo = mask("+lo");
        assert!(table.any_match(&lo, ["p", "a"]));
        assert!(!table.all_match(&lo, ["p", "a"]));
        assert!(table.all_match(&lo, ["a"]));
        // unknown segments never count as matches
        assert!(!table.all_match(&lo, ["a", "x"]));
        assert!(!table.any_match(&FeatureMask::new(), ["x", "y"]));
        assert!(table.all_match(&lo, Vec::<String>::new()));
        assert!(!table.any_match(&lo, Vec::<String>::new()));
    }

    #[test]
    fn t_count_matches() {
        let table = small();
        let inventory: Vec<String> = ["p", "b", "m", "x"].iter().map(|s| s.to_string()).collect();
        assert_eq!(table.count_matches(&mask("+cons"), &inventory), 3);
        assert_eq!(table.count_matches(&mask("+cons +voi"), &inventory), 2);
        assert_eq!(table.count_matches(&FeatureMask::new(), &inventory), 3);
    }

    #[test]
    fn t_contrasts() {
        let table = small();
        let cons = mask("+cons -son");
        assert!(table.contrasts(&cons, "voi", ["p", "b", "a"]));
        assert!(!table.contrasts(&cons, "voi", ["p", "m", "x"]));
        assert!(!table.contrasts(&cons, "nas", ["p", "b", "m"]));
        assert!(table.contrasts(&mask("+cons"), "nas", ["p", "m"]));
        // the mask already pins the feature, so the minus side cannot match
        assert!(!table.contrasts(&mask("+voi"), "voi", ["p", "b"]));
    }

    #[test]
    fn t_intersection() {
        let table = small();
        let shared = table.intersection(["p", "b", "x"]);
        assert_eq!(shared, set("+cons -son -cont -hi -lo -nas"));
        let a = table.features_of("a").unwrap();
        assert_eq!(&table.intersection(["a"]), a);
        assert!(table.intersection(Vec::<&str>::new()).is_empty());
        assert!(table.intersection(["x", "y"]).is_empty());
    }

    #[test]
    fn t_intersection_without_shared_values() {
        let table = load("ipa,cons,son,cont,voi\np,+,-,-,-\na,-,+,+,+\n").unwrap();
        assert!(table.intersection(["p", "a"]).is_empty());
    }

    #[test]
    fn t_vector_string() {
        let table = small();
        let m = table.features_of("m").unwrap();
        assert_eq!(table.to_vector_string(m), "1101001");
        let partial = set("0voi +cons -nas");
        let rendered = table.to_vector_string(&partial);
        assert_eq!(rendered, "1 0");
        assert_eq!(rendered.chars().count(), partial.len());
        assert!(table.to_vector_string(&FeatureSet::new()).is_empty());
        // features outside the table are not rendered
        assert_eq!(table.to_vector_string(&set("+cons +lab")), "1");
    }

    #[test]
    fn t_vector_string_length_bound() {
        let table = FeatureTable::new("spe+").unwrap();
        for (_, fts) in table.segments() {
            let len = table.to_vector_string(fts).chars().count();
            assert!(len <= table.names().len());
            assert_eq!(len, fts.len());
        }
    }

    #[test]
    fn t_differing_features() {
        let table = small();
        let p = table.features_of("p").unwrap();
        let b = table.features_of("b").unwrap();
        assert_eq!(table.differing_features(p, b), vec!["voi"]);
        assert_eq!(table.differing_features(p, p), Vec::<&str>::new());
        let partial = set("+cons -son");
        let expected = vec!["cont", "voi", "hi", "lo", "nas"];
        assert_eq!(table.differing_features(p, &partial), expected);
    }

    #[test]
    fn t_describe() {
        let table = small();
        let expected = "p [+cons, -son, -cont, -voi, -hi, -lo, -nas]";
        assert_eq!(table.describe("p").unwrap(), expected);
        assert!(table.describe("x").is_err());
    }

    #[test]
    fn t_end_to_end() {
        let table = load("ipa,cons,son,cont,voi,lo\np,+,-,-,-,-\na,-,+,+,+,+\n").unwrap();
        assert_eq!(table.sonority("p").unwrap(), 1);
        assert_eq!(table.sonority("a").unwrap(), 9);
        let lo = mask("+lo");
        assert!(table.any_match(&lo, ["p", "a"]));
        assert!(!table.all_match(&lo, ["p", "a"]));
    }

    #[test]
    fn t_segment_then_query() {
        let table = FeatureTable::new("spe+").unwrap();
        let segments = segment_text("pʰãma").collect::<Vec<_>>();
        assert_eq!(segments, vec!["pʰ", "ã", "m", "a"]);
        let ranks = segments
            .iter()
            .map(|s| table.sonority(s))
            .collect::<FeatureResult<Vec<_>>>()
            .unwrap();
        assert_eq!(ranks, vec![1, 9, 5, 9]);
        assert!(table.all_match(&mask("+voi"), &segments[1..]));
    }
}
