//! Dotted-numeric version ordering.
//!
//! Versions are compared component by component, left to right, as unsigned
//! integers. A version with fewer components is padded with zeros, so
//! `1.0` and `1.0.0` are equal. Anything that is not a non-empty list of
//! integers separated by dots (including the `*` wildcard) does not parse.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub(crate) enum ParseError {
    #[error("version is empty")]
    Empty,
    #[error("version component \"{0}\" is not a non-negative integer")]
    InvalidComponent(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Version {
    components: Vec<u64>,
}

impl Version {
    fn component(&self, i: usize) -> u64 {
        self.components.get(i).copied().unwrap_or(0)
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        let components = s
            .split('.')
            .map(|c| {
                // u64::from_str accepts a leading '+', which is not a version digit
                if c.is_empty() || !c.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ParseError::InvalidComponent(c.to_string()));
                }

                c.parse::<u64>()
                    .map_err(|_| ParseError::InvalidComponent(c.to_string()))
            })
            .collect::<Result<Vec<u64>, ParseError>>()?;

        Ok(Version { components })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());

        for i in 0..len {
            match self.component(i).cmp(&other.component(i)) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }

        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();

        write!(f, "{}", parts.join("."))
    }
}

/// Compares two version strings. Returns `None` when either side does not
/// parse; callers decide what an incomparable pair means for them.
pub(crate) fn compare(a: &str, b: &str) -> Option<Ordering> {
    let a = Version::from_str(a).ok()?;
    let b = Version::from_str(b).ok()?;

    Some(a.cmp(&b))
}

/// Returns the highest parseable version in `versions`, or `None` if none of
/// them parse. Among equal versions the first one wins.
pub(crate) fn latest<'v, I>(versions: I) -> Option<&'v str>
where
    I: IntoIterator<Item = &'v str>,
{
    let mut best: Option<(&'v str, Version)> = None;

    for raw in versions {
        let parsed = match Version::from_str(raw) {
            Ok(parsed) => parsed,
            Err(_) => continue,
        };

        if let Some((_, current)) = &best {
            if parsed <= *current {
                continue;
            }
        }

        best = Some((raw, parsed));
    }

    best.map(|(raw, _)| raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_wise_ordering() {
        assert_eq!(compare("1.0.1", "1.0.2"), Some(Ordering::Less));
        assert_eq!(compare("1.0.3", "1.0.2"), Some(Ordering::Greater));
        assert_eq!(compare("1.0.2", "1.0.2"), Some(Ordering::Equal));
        // integer, not lexical, comparison
        assert_eq!(compare("1.10.0", "1.9.0"), Some(Ordering::Greater));
        assert_eq!(compare("2.0.0", "10.0.0"), Some(Ordering::Less));
    }

    #[test]
    fn test_missing_trailing_components_are_zero() {
        assert_eq!(compare("1.0", "1.0.0"), Some(Ordering::Equal));
        assert_eq!(compare("1", "1.0.1"), Some(Ordering::Less));
        assert_eq!(compare("1.2.0.1", "1.2"), Some(Ordering::Greater));

        let a: Version = "3".parse().unwrap();
        let b: Version = "3.0.0".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unparseable_versions_are_incomparable() {
        assert_eq!(compare("*", "1.0.0"), None);
        assert_eq!(compare("1.0.0", ""), None);
        assert_eq!(compare("1.0.x", "1.0.0"), None);
        assert_eq!(compare("1..0", "1.0.0"), None);
        assert_eq!(compare("+1.0", "1.0"), None);
        assert_eq!(compare("v1.0", "1.0"), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Version::from_str("  "), Err(ParseError::Empty));
        assert_eq!(
            Version::from_str("1.beta"),
            Err(ParseError::InvalidComponent("beta".to_string()))
        );
    }

    #[test]
    fn test_display() {
        let v: Version = " 1.02.3 ".parse().unwrap();
        assert_eq!(v.to_string(), "1.2.3");
    }

    #[test]
    fn test_latest() {
        assert_eq!(latest(["1.0.0", "1.2.0", "1.1.9"]), Some("1.2.0"));
        assert_eq!(latest(["garbage", "0.0.1"]), Some("0.0.1"));
        assert_eq!(latest(["2.0", "2.0.0"]), Some("2.0"));
        assert_eq!(latest(["*"]), None);
        assert_eq!(latest(Vec::<&str>::new()), None);
    }
}
