//! Feature values, feature sets and masks.
//!
//! A [`FeatureSet`] describes one segment and holds at most one value per
//! feature name. A [`FeatureMask`] is a pattern: it matches a feature set when
//! every feature of the mask is present in the set.

use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;

const FT_PATTERN: &str = r"([-+0])([a-z][A-Za-z]*)";

static FT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FT_PATTERN).expect("valid feature regex"));

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureValue {
    #[serde(rename = "+")]
    Positive,
    #[serde(rename = "-")]
    Negative,
    #[serde(rename = "0")]
    Unspecified,
}

impl FeatureValue {
    pub fn symbol(self) -> char {
        match self {
            FeatureValue::Positive => '+',
            FeatureValue::Negative => '-',
            FeatureValue::Unspecified => '0',
        }
    }

    /// Character used in the fixed-width vector rendering.
    pub fn vector_char(self) -> char {
        match self {
            FeatureValue::Positive => '1',
            FeatureValue::Negative => '0',
            FeatureValue::Unspecified => ' ',
        }
    }
}

impl TryFrom<char> for FeatureValue {
    type Error = ();

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Ok(match value {
            '+' => FeatureValue::Positive,
            '-' => FeatureValue::Negative,
            '0' => FeatureValue::Unspecified,
            _ => return Err(()),
        })
    }
}

impl TryFrom<&str> for FeatureValue {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut chars = value.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => FeatureValue::try_from(c),
            _ => Err(()),
        }
    }
}

impl Display for FeatureValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize)]
pub struct Feature {
    pub value: FeatureValue,
    pub name: String,
}

impl Feature {
    pub fn new(value: FeatureValue, name: impl Into<String>) -> Self {
        Self {
            value,
            name: name.into(),
        }
    }

    pub fn positive(name: impl Into<String>) -> Self {
        Self::new(FeatureValue::Positive, name)
    }

    pub fn negative(name: impl Into<String>) -> Self {
        Self::new(FeatureValue::Negative, name)
    }

    pub fn unspecified(name: impl Into<String>) -> Self {
        Self::new(FeatureValue::Unspecified, name)
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.value, self.name)
    }
}

/// The feature description of one segment.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet {
    inner: BTreeMap<String, FeatureValue>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value for the feature's name, returning the value it replaced.
    pub fn insert(&mut self, feature: Feature) -> Option<FeatureValue> {
        self.inner.insert(feature.name, feature.value)
    }

    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.inner.get(name).copied()
    }

    pub fn contains(&self, feature: &Feature) -> bool {
        self.get(&feature.name) == Some(feature.value)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FeatureValue)> + '_ {
        self.inner.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.iter().map(|(n, v)| Feature::new(v, n))
    }

    /// True if every feature of `mask` is in this set.
    pub fn satisfies(&self, mask: &FeatureMask) -> bool {
        mask.iter().all(|f| self.contains(f))
    }

    pub fn intersection(&self, other: &FeatureSet) -> FeatureSet {
        self.inner
            .iter()
            .filter(|(n, v)| other.inner.get(*n) == Some(*v))
            .map(|(n, v)| (n.clone(), *v))
            .collect::<BTreeMap<_, _>>()
            .into()
    }
}

impl From<BTreeMap<String, FeatureValue>> for FeatureSet {
    fn from(inner: BTreeMap<String, FeatureValue>) -> Self {
        Self { inner }
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<T: IntoIterator<Item = Feature>>(iter: T) -> Self {
        let mut set = FeatureSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Feature> for FeatureSet {
    fn extend<T: IntoIterator<Item = Feature>>(&mut self, iter: T) {
        for feature in iter {
            self.insert(feature);
        }
    }
}

impl Display for FeatureSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.features().join(", "))
    }
}

/// A pattern of features that must all hold. The empty mask matches every
/// feature set.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureMask {
    inner: SmallVec<[Feature; 4]>,
}

impl FeatureMask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: Feature) -> Self {
        self.push(feature);
        self
    }

    pub fn push(&mut self, feature: Feature) {
        if !self.inner.contains(&feature) {
            self.inner.push(feature);
        }
    }

    /// Parses every `+name`, `-name` or `0name` in `text`. Anything else in
    /// the string is skipped.
    pub fn parse(text: &str) -> Self {
        FT_REGEX
            .captures_iter(text)
            .filter_map(|c| {
                let value = c.get(1)?.as_str().chars().next()?;
                let value = FeatureValue::try_from(value).ok()?;
                Some(Feature::new(value, c.get(2)?.as_str()))
            })
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromStr for FeatureMask {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl FromIterator<Feature> for FeatureMask {
    fn from_iter<T: IntoIterator<Item = Feature>>(iter: T) -> Self {
        let mut mask = FeatureMask::new();
        for feature in iter {
            mask.push(feature);
        }
        mask
    }
}

impl From<&FeatureSet> for FeatureMask {
    fn from(value: &FeatureSet) -> Self {
        value.features().collect()
    }
}

impl<'a> IntoIterator for &'a FeatureMask {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Display for FeatureMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.inner.iter().join(", "))
    }
}
