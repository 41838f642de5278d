//! Document format version tag.

use std::fmt;
use std::str::FromStr;

use crate::util::{Error, Result};

/// Immutable (major, minor) version carried by every metadata document.
///
/// The container does not interpret it; consumers decide what to do with an
/// older or newer generation of their own documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    major: u32,
    minor: u32,
}

impl Version {
    /// Construct from major and minor parts.
    pub const fn of(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub const fn major(self) -> u32 {
        self.major
    }

    pub const fn minor(self) -> u32 {
        self.minor
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split('.');
        let (major, minor) = match (parts.next(), parts.next(), parts.next()) {
            (Some(major), Some(minor), None) => (major, minor),
            _ => return Err(Error::InvalidVersion(s.to_string())),
        };
        let major = major
            .parse::<u32>()
            .map_err(|_| Error::InvalidVersion(s.to_string()))?;
        let minor = minor
            .parse::<u32>()
            .map_err(|_| Error::InvalidVersion(s.to_string()))?;
        Ok(Self { major, minor })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v: Version = "2.7".parse().unwrap();
        assert_eq!(v, Version::of(2, 7));
        assert_eq!(v.major(), 2);
        assert_eq!(v.minor(), 7);
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::of(1, 0).to_string(), "1.0");
    }

    #[test]
    fn test_version_parse_errors() {
        for bad in ["", "1", "1.2.3", "a.b", "1.-2", " 1.2"] {
            assert!(
                bad.parse::<Version>().is_err(),
                "expected parse failure for {bad:?}"
            );
        }
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::of(1, 9) < Version::of(2, 0));
        assert!(Version::of(2, 0) < Version::of(2, 1));
    }
}
