use serde::{Deserialize, Serialize};
use std::fmt;

/// A US ZIP code, zero-padded to five digits. Two codes are equal iff their
/// padded forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    pub const WIDTH: usize = 5;

    /// Normalize a raw input value: trim whitespace, left-pad digit strings
    /// to five characters. Empty, non-numeric, or overlong values yield
    /// `None` and are dropped by the caller.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.len() > Self::WIDTH {
            return None;
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(format!("{:0>width$}", trimmed, width = Self::WIDTH)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Latitude/longitude in decimal degrees. An unresolvable location is
/// `Option<Coordinate>::None`, never a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Per-destination result of one provider call. Both fields absent means the
/// lookup failed and the pair degrades to an empty output cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leg {
    pub miles: Option<f64>,
    pub duration: Option<String>,
}

impl Leg {
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// One row of the cross product, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct DistancePair {
    pub origin: PostalCode,
    pub destination: PostalCode,
    pub miles: Option<f64>,
    pub duration: Option<String>,
}

/// The two ordered-unique ZIP lists the cross product is built from.
#[derive(Debug, Clone)]
pub struct ZipInputs {
    pub origins: Vec<PostalCode>,
    pub destinations: Vec<PostalCode>,
}

impl ZipInputs {
    pub fn pair_count(&self) -> usize {
        self.origins.len() * self.destinations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pads_short_codes() {
        assert_eq!(PostalCode::parse("501").unwrap().as_str(), "00501");
        assert_eq!(PostalCode::parse("0544").unwrap().as_str(), "00544");
        assert_eq!(PostalCode::parse("42307").unwrap().as_str(), "42307");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(PostalCode::parse("  42307 ").unwrap().as_str(), "42307");
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        assert!(PostalCode::parse("").is_none());
        assert!(PostalCode::parse("   ").is_none());
        assert!(PostalCode::parse("12a45").is_none());
        assert!(PostalCode::parse("123456").is_none());
        assert!(PostalCode::parse("12345-6789").is_none());
    }

    #[test]
    fn test_padded_forms_are_equal() {
        assert_eq!(
            PostalCode::parse("501").unwrap(),
            PostalCode::parse("00501").unwrap()
        );
    }

    #[test]
    fn test_pair_count() {
        let inputs = ZipInputs {
            origins: vec![PostalCode::parse("42307").unwrap()],
            destinations: vec![
                PostalCode::parse("42301").unwrap(),
                PostalCode::parse("52806").unwrap(),
            ],
        };
        assert_eq!(inputs.pair_count(), 2);
    }
}
