//! Target framework monikers

use serde::{Serialize, Serializer};
use std::fmt;

/// A target framework such as `net8.0` or `netstandard2.0`
///
/// Stored in short-folder form, lowercased. Long identifiers as written in
/// older assets files (`.NETCoreApp,Version=v8.0`) are folded into the same
/// short form so both spellings compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetFramework(String);

impl TargetFramework {
    pub fn new(moniker: &str) -> Self {
        let trimmed = moniker.trim();
        let short = Self::shorten(trimmed).unwrap_or_else(|| trimmed.to_ascii_lowercase());
        Self(short)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn shorten(long: &str) -> Option<String> {
        let (identifier, version) = long.split_once(",Version=")?;
        let version = version
            .split(',')
            .next()?
            .trim()
            .trim_start_matches(['v', 'V']);
        let version = version.strip_suffix(".0").filter(|v| v.contains('.')).unwrap_or(version);

        let short = match identifier.trim().to_ascii_lowercase().as_str() {
            ".netcoreapp" => {
                let major = version.split('.').next()?.parse::<u32>().ok()?;
                if major >= 5 {
                    format!("net{}", version)
                } else {
                    format!("netcoreapp{}", version)
                }
            }
            ".netstandard" => format!("netstandard{}", version),
            ".netframework" => format!("net{}", version.replace('.', "")),
            _ => return None,
        };
        Some(short)
    }
}

impl fmt::Display for TargetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetFramework {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Serialize for TargetFramework {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_are_lowercased() {
        assert_eq!(TargetFramework::new(" NET8.0 ").as_str(), "net8.0");
        assert_eq!(TargetFramework::new("net8.0"), TargetFramework::new("Net8.0"));
    }

    #[test]
    fn long_names_fold_to_short() {
        assert_eq!(
            TargetFramework::new(".NETCoreApp,Version=v8.0").as_str(),
            "net8.0"
        );
        assert_eq!(
            TargetFramework::new(".NETCoreApp,Version=v3.1").as_str(),
            "netcoreapp3.1"
        );
        assert_eq!(
            TargetFramework::new(".NETStandard,Version=v2.0").as_str(),
            "netstandard2.0"
        );
        assert_eq!(
            TargetFramework::new(".NETFramework,Version=v4.7.2").as_str(),
            "net472"
        );
    }

    #[test]
    fn unknown_long_names_are_kept() {
        assert_eq!(
            TargetFramework::new("Tizen,Version=v4.0").as_str(),
            "tizen,version=v4.0"
        );
    }
}
