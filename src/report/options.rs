//! Report options, validated before any scan work starts

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Minimum number of stars a row needs to be shown
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Threshold(u32);

impl Threshold {
    /// Show every row
    pub const VERBOSE: Threshold = Threshold(0);
    /// Show rows of at least some concern
    pub const DEFAULT: Threshold = Threshold(1);
    /// Show only the most extreme outliers
    pub const CRITICAL: Threshold = Threshold(5);

    pub fn new(stars: u32) -> Self {
        Self(stars)
    }

    pub fn stars(self) -> u32 {
        self.0
    }

    pub fn admits(self, severity: u32) -> bool {
        severity >= self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for Threshold {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Threshold)
            .map_err(|_| ConfigError::InvalidThreshold(s.to_string()))
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How much of an offending object's identity to disclose
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum NameStyle {
    /// No object identification at all
    None,
    /// Object ids only
    Hash,
    /// Object ids with human-readable names
    #[default]
    Full,
}

impl NameStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            NameStyle::None => "none",
            NameStyle::Hash => "hash",
            NameStyle::Full => "full",
        }
    }

    /// Whether the object source should derive names at all
    pub fn wants_names(self) -> bool {
        self == NameStyle::Full
    }
}

impl FromStr for NameStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(NameStyle::None),
            "hash" => Ok(NameStyle::Hash),
            "full" => Ok(NameStyle::Full),
            other => Err(ConfigError::InvalidNameStyle(other.to_string())),
        }
    }
}

impl fmt::Display for NameStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON output schema
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum JsonVersion {
    /// Structural dump of the aggregate
    #[default]
    V1,
    /// Threshold-filtered rows with stars
    V2,
}

impl TryFrom<u8> for JsonVersion {
    type Error = ConfigError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(JsonVersion::V1),
            2 => Ok(JsonVersion::V2),
            other => Err(ConfigError::InvalidJsonVersion(other.to_string())),
        }
    }
}

impl FromStr for JsonVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| ConfigError::InvalidJsonVersion(s.to_string()))
            .and_then(JsonVersion::try_from)
    }
}
