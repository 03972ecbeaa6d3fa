//! Closed label set for the three word classes

use std::fmt;
use std::str::FromStr;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of target classes.
pub const NUM_CLASSES: usize = 3;

/// Linguistic class of a word.
///
/// Serialized as the single-character tag used by the teaching batches:
/// `d` (diphthong), `h` (hiatus), `g` (neither).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WordClass {
    #[serde(rename = "d")]
    Diphthong,
    #[serde(rename = "h")]
    Hiatus,
    #[serde(rename = "g")]
    Neither,
}

impl WordClass {
    /// All classes in index order.
    pub const ALL: [WordClass; NUM_CLASSES] =
        [WordClass::Diphthong, WordClass::Hiatus, WordClass::Neither];

    /// Column of this class in a one-hot label vector.
    pub fn index(self) -> usize {
        match self {
            Self::Diphthong => 0,
            Self::Hiatus => 1,
            Self::Neither => 2,
        }
    }

    /// Class for a one-hot column, `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Single-character tag.
    pub fn tag(self) -> char {
        match self {
            Self::Diphthong => 'd',
            Self::Hiatus => 'h',
            Self::Neither => 'g',
        }
    }

    /// Human-readable class name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Diphthong => "diphthong",
            Self::Hiatus => "hiatus",
            Self::Neither => "neither",
        }
    }

    /// One-hot vector for this class.
    pub fn one_hot(self) -> [f32; NUM_CLASSES] {
        let mut row = [0.0; NUM_CLASSES];
        row[self.index()] = 1.0;
        row
    }

    /// Decode a strict one-hot row.
    ///
    /// Returns `None` (the unknown outcome) unless exactly one entry equals
    /// 1 and the rest equal 0. Never defaults to a valid class.
    pub fn from_one_hot(row: ArrayView1<'_, f32>) -> Option<Self> {
        if row.len() != NUM_CLASSES {
            return None;
        }
        let mut hit = None;
        for (i, &v) in row.iter().enumerate() {
            if v == 1.0 {
                if hit.is_some() {
                    return None;
                }
                hit = Some(i);
            } else if v != 0.0 {
                return None;
            }
        }
        hit.and_then(Self::from_index)
    }

    /// Class with the highest probability. Ties resolve to the lowest index.
    ///
    /// Returns `None` only for rows of the wrong width or containing NaN.
    pub fn argmax(row: ArrayView1<'_, f32>) -> Option<Self> {
        if row.len() != NUM_CLASSES || row.iter().any(|v| v.is_nan()) {
            return None;
        }
        let mut best = 0;
        for (i, &v) in row.iter().enumerate().skip(1) {
            if v > row[best] {
                best = i;
            }
        }
        Self::from_index(best)
    }

    /// Parse a corpus label cell: either an integer index or a tag.
    pub fn from_cell(cell: &str) -> Result<Self> {
        let cell = cell.trim();
        if let Ok(index) = cell.parse::<usize>() {
            return Self::from_index(index)
                .ok_or_else(|| Error::Validation(format!("label index out of range: {index}")));
        }
        cell.parse()
    }
}

impl FromStr for WordClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "d" | "diphthong" => Ok(Self::Diphthong),
            "h" | "hiatus" => Ok(Self::Hiatus),
            "g" | "neither" => Ok(Self::Neither),
            other => Err(Error::Validation(format!(
                "unknown label '{other}'. Use: d (diphthong), h (hiatus), g (neither)"
            ))),
        }
    }
}

impl fmt::Display for WordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_tags_round_trip() {
        for class in WordClass::ALL {
            let parsed: WordClass = class.tag().to_string().parse().unwrap();
            assert_eq!(parsed, class);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("D".parse::<WordClass>().unwrap(), WordClass::Diphthong);
        assert_eq!(" H ".parse::<WordClass>().unwrap(), WordClass::Hiatus);
        assert_eq!("G".parse::<WordClass>().unwrap(), WordClass::Neither);
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = "x".parse::<WordClass>().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_from_cell_accepts_indices() {
        assert_eq!(WordClass::from_cell("0").unwrap(), WordClass::Diphthong);
        assert_eq!(WordClass::from_cell("2").unwrap(), WordClass::Neither);
        assert!(WordClass::from_cell("3").is_err());
    }

    #[test]
    fn test_strict_one_hot_decoding() {
        assert_eq!(
            WordClass::from_one_hot(arr1(&[0.0, 1.0, 0.0]).view()),
            Some(WordClass::Hiatus)
        );
        assert_eq!(WordClass::from_one_hot(arr1(&[0.0, 0.0, 0.0]).view()), None);
        assert_eq!(WordClass::from_one_hot(arr1(&[1.0, 1.0, 0.0]).view()), None);
        assert_eq!(WordClass::from_one_hot(arr1(&[0.4, 0.6, 0.0]).view()), None);
    }

    #[test]
    fn test_argmax_never_empty() {
        // No entry would round to 1, argmax still picks a class.
        let row = arr1(&[0.34, 0.33, 0.33]);
        assert_eq!(WordClass::argmax(row.view()), Some(WordClass::Diphthong));
        let row = arr1(&[0.2, 0.3, 0.5]);
        assert_eq!(WordClass::argmax(row.view()), Some(WordClass::Neither));
    }

    #[test]
    fn test_serializes_as_tag() {
        let json = serde_json::to_string(&WordClass::Hiatus).unwrap();
        assert_eq!(json, "\"h\"");
        let back: WordClass = serde_json::from_str("\"g\"").unwrap();
        assert_eq!(back, WordClass::Neither);
    }
}
