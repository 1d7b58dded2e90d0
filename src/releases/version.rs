//! OpenShift release version parsing and comparison.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{AuditError, Result};

/// A `major.minor.patch` release version.
///
/// Pre-release and build suffixes (`4.14.0-rc.2`, `4.12.3+build`) are ignored
/// for ordering purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReleaseVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ReleaseVersion {
    /// The `major.minor` stream, e.g. `4.12`.
    pub fn stream(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// How many minor releases `self` trails `other` by (0 if not behind or
    /// on a different major).
    pub fn minors_behind(&self, other: &ReleaseVersion) -> u64 {
        if self.major == other.major {
            other.minor.saturating_sub(self.minor)
        } else {
            0
        }
    }
}

impl FromStr for ReleaseVersion {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AuditError::InvalidVersion {
            version: s.to_string(),
        };

        let trimmed = s.trim().trim_start_matches('v');
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() < 3 {
            return Err(invalid());
        }

        let number = |part: &str| -> Result<u64> {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().map_err(|_| invalid())
        };

        Ok(Self {
            major: number(parts[0])?,
            minor: number(parts[1])?,
            patch: number(parts[2])?,
        })
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Compare two version strings.
///
/// Fails if either side has fewer than three dot-separated components.
pub fn compare(a: &str, b: &str) -> Result<Ordering> {
    let a: ReleaseVersion = a.parse()?;
    let b: ReleaseVersion = b.parse()?;
    Ok(a.cmp(&b))
}
