//! Database product versions.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DialectError;

/// A `major.minor.micro` database version.
///
/// Versions are totally ordered, so capability checks read like
/// `version.is_same_or_after(12, 10)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct DatabaseVersion {
    /// Major version.
    pub major: u16,
    /// Minor version.
    pub minor: u16,
    /// Micro (patch) version.
    pub micro: u16,
}

impl DatabaseVersion {
    /// Creates a version from its three components.
    #[must_use]
    pub const fn new(major: u16, minor: u16, micro: u16) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }

    /// Creates a `major.minor` version.
    #[must_use]
    pub const fn make(major: u16, minor: u16) -> Self {
        Self::new(major, minor, 0)
    }

    /// Returns true if this version is strictly before `major.minor`.
    #[must_use]
    pub const fn is_before(&self, major: u16, minor: u16) -> bool {
        self.major < major || (self.major == major && self.minor < minor)
    }

    /// Returns true if this version is strictly before `major.minor.micro`.
    #[must_use]
    pub const fn is_before_micro(&self, major: u16, minor: u16, micro: u16) -> bool {
        self.is_before(major, minor)
            || (self.major == major && self.minor == minor && self.micro < micro)
    }

    /// Returns true if this version is `major.minor` or later.
    #[must_use]
    pub const fn is_same_or_after(&self, major: u16, minor: u16) -> bool {
        !self.is_before(major, minor)
    }

    /// Returns true if this version is `major.minor.micro` or later.
    #[must_use]
    pub const fn is_same_or_after_micro(&self, major: u16, minor: u16, micro: u16) -> bool {
        !self.is_before_micro(major, minor, micro)
    }

    /// Returns true if major and minor match exactly.
    #[must_use]
    pub const fn is_same(&self, major: u16, minor: u16) -> bool {
        self.major == major && self.minor == minor
    }
}

impl fmt::Display for DatabaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

/// Parses vendor version strings leniently.
///
/// Only the leading digits of each dot-separated component count, so
/// `"12.10.FC8"` is 12.10.0 and `"15.00.2000"` is 15.0.2000. A leading
/// alphabetic prefix such as DB2 for z/OS's `"DSN12015"` is skipped and
/// the remaining digits are read as `VVRRM`.
impl FromStr for DatabaseVersion {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        if digits.len() != trimmed.len() && !digits.contains('.') && digits.len() >= 5 {
            return parse_packed(digits).ok_or_else(|| DialectError::InvalidVersion(s.into()));
        }

        let mut parts = digits.split('.').map(leading_number);
        let major = parts
            .next()
            .flatten()
            .ok_or_else(|| DialectError::InvalidVersion(s.into()))?;
        let minor = parts.next().flatten().unwrap_or(0);
        let micro = parts.next().flatten().unwrap_or(0);
        Ok(Self::new(major, minor, micro))
    }
}

fn leading_number(part: &str) -> Option<u16> {
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part[..end].parse().ok()
}

fn parse_packed(digits: &str) -> Option<DatabaseVersion> {
    let major = digits.get(0..2)?.parse().ok()?;
    let minor = digits.get(2..4)?.parse().ok()?;
    let micro = digits.get(4..5)?.parse().ok()?;
    Some(DatabaseVersion::new(major, minor, micro))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        let v = DatabaseVersion::make(11, 70);
        assert!(v.is_before(12, 10));
        assert!(v.is_same_or_after(11, 50));
        assert!(v.is_same_or_after(11, 70));
        assert!(!v.is_before(11, 70));
        assert!(DatabaseVersion::new(1, 4, 200).is_same_or_after_micro(1, 4, 197));
        assert!(DatabaseVersion::new(1, 4, 195).is_before_micro(1, 4, 197));
    }

    #[test]
    fn test_parse_vendor_strings() {
        assert_eq!(
            "12.10.FC8".parse::<DatabaseVersion>().unwrap(),
            DatabaseVersion::make(12, 10)
        );
        assert_eq!(
            "15.00.2000".parse::<DatabaseVersion>().unwrap(),
            DatabaseVersion::new(15, 0, 2000)
        );
        assert_eq!(
            "DSN12015".parse::<DatabaseVersion>().unwrap(),
            DatabaseVersion::new(12, 1, 5)
        );
        assert_eq!(
            "3".parse::<DatabaseVersion>().unwrap(),
            DatabaseVersion::make(3, 0)
        );
        assert!("abc".parse::<DatabaseVersion>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(DatabaseVersion::make(9, 7).to_string(), "9.7.0");
    }
}
