//! Sonority ranks derived from `spe+` features.

use crate::features::FeatureValue::{Negative, Positive};
use crate::features::{FeatureSet, FeatureValue};

fn has(fts: &FeatureSet, value: FeatureValue, name: &str) -> bool {
    fts.get(name) == Some(value)
}

/// Sonority rank from 1 (voiceless stop) to 9 (low vowel).
///
/// Only `-cons` selects the vocoid branch; every other feature set is ranked
/// as a consonant.
pub fn sonority_from_features(fts: &FeatureSet) -> u8 {
    if has(fts, Negative, "cons") {
        if has(fts, Positive, "lo") {
            9
        } else if has(fts, Negative, "hi") {
            8
        } else {
            7
        }
    } else if has(fts, Positive, "son") {
        if has(fts, Negative, "nas") { 6 } else { 5 }
    } else if has(fts, Positive, "cont") {
        if has(fts, Positive, "voi") { 4 } else { 3 }
    } else if has(fts, Positive, "voi") {
        2
    } else {
        1
    }
}
