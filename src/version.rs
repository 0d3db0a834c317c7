use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::CatalogError;

/// Release version such as `5.6`, `2019.4.1` or `2020.1.0f1`.
///
/// Missing components count as zero, so `1.0` and `1.0.0` compare equal.
/// A trailing non-numeric suffix is compared lexically after the numbers.
#[derive(Debug, Clone)]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
    suffix: String,
    raw: String,
}

impl Version {
    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn patch(&self) -> u32 {
        self.patch
    }

    fn key(&self) -> (u32, u32, u32, &str, u64) {
        let (tag, build) = split_suffix(&self.suffix);
        (self.major, self.minor, self.patch, tag, build)
    }
}

/// `f10` → (`f`, 10). The trailing build number compares numerically.
fn split_suffix(suffix: &str) -> (&str, u64) {
    let tag = suffix.trim_end_matches(|c: char| c.is_ascii_digit());
    let build = suffix[tag.len()..].parse().unwrap_or(0);
    (tag, build)
}

impl FromStr for Version {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || CatalogError::InvalidVersion(s.to_string());
        if raw.is_empty() {
            return Err(invalid());
        }

        let mut numbers = [0u32; 3];
        let mut suffix = String::new();
        let mut parts = raw.split('.');

        for slot in numbers.iter_mut() {
            let Some(part) = parts.next() else { break };
            let digits_end = part
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(part.len());
            if digits_end == 0 {
                return Err(invalid());
            }
            *slot = part[..digits_end].parse().map_err(|_| invalid())?;
            if digits_end < part.len() {
                suffix = part[digits_end..].to_string();
                break;
            }
        }

        // Anything left over (a fourth component, or text after a suffix) is malformed.
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Version {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            suffix,
            raw: raw.to_string(),
        })
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn numeric_ordering() {
        assert!(v("5.6") < v("2017.1"));
        assert!(v("2017.1") < v("2017.2"));
        assert!(v("2019.4.1") < v("2019.4.10"));
        assert!(v("1.9") < v("1.10"));
    }

    #[test]
    fn missing_components_are_zero() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("3"), v("3.0.0"));
        assert_eq!(v("2019.4").patch(), 0);
    }

    #[test]
    fn suffix_sorts_after_numbers() {
        let f1 = v("2020.1f1");
        assert_eq!(f1.minor(), 1);
        assert!(v("2020.1") < f1);
        assert!(v("2020.1.0a5") < v("2020.1.0f1"));
        assert!(f1 < v("2020.2"));
    }

    #[test]
    fn build_number_in_suffix_is_numeric() {
        assert!(v("2019.4.0f9") < v("2019.4.0f10"));
        assert!(v("2019.4.0b12") < v("2019.4.0f1"));
        assert_eq!(v("2019.4.0f01"), v("2019.4.0f1"));
    }

    #[test]
    fn display_keeps_original_text() {
        assert_eq!(v("2019.4").to_string(), "2019.4");
        assert_eq!(v(" 5.6 ").to_string(), "5.6");
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "x.1", "1..2", "1.2.3.4", "1.2b.3"] {
            assert!(bad.parse::<Version>().is_err(), "accepted {:?}", bad);
        }
    }
}
