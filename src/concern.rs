//! Level-of-concern rating
//!
//! Each metric has a "reasonable" baseline. A value earns one star for
//! every factor of `base` by which it exceeds that baseline:
//! `stars = floor(log_base(value / reasonable))`, clamped at zero. Because
//! the scale is relative, star counts are comparable across unrelated
//! metrics.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Default logarithm base: one star per doubling
pub const DEFAULT_BASE: f64 = 2.0;

/// Most stars ever displayed
pub const MAX_STARS: u32 = 30;

/// Every metric the report can rate
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub enum Metric {
    UniqueCommitCount,
    UniqueCommitSize,
    UniqueTreeCount,
    UniqueTreeSize,
    UniqueTreeEntries,
    UniqueBlobCount,
    UniqueBlobSize,
    UniqueTagCount,
    ReferenceCount,
    MaxCommitSize,
    MaxParentCount,
    MaxTreeEntries,
    MaxBlobSize,
    MaxHistoryDepth,
    MaxTagDepth,
    MaxExpandedTreeCount,
    MaxPathDepth,
    MaxPathLength,
    MaxExpandedBlobCount,
    MaxExpandedBlobSize,
    MaxExpandedLinkCount,
    MaxExpandedSubmoduleCount,
}

impl Metric {
    pub const ALL: [Metric; 22] = [
        Metric::UniqueCommitCount,
        Metric::UniqueCommitSize,
        Metric::UniqueTreeCount,
        Metric::UniqueTreeSize,
        Metric::UniqueTreeEntries,
        Metric::UniqueBlobCount,
        Metric::UniqueBlobSize,
        Metric::UniqueTagCount,
        Metric::ReferenceCount,
        Metric::MaxCommitSize,
        Metric::MaxParentCount,
        Metric::MaxTreeEntries,
        Metric::MaxBlobSize,
        Metric::MaxHistoryDepth,
        Metric::MaxTagDepth,
        Metric::MaxExpandedTreeCount,
        Metric::MaxPathDepth,
        Metric::MaxPathLength,
        Metric::MaxExpandedBlobCount,
        Metric::MaxExpandedBlobSize,
        Metric::MaxExpandedLinkCount,
        Metric::MaxExpandedSubmoduleCount,
    ];

    /// Stable camelCase key, used in JSON output
    pub fn key(self) -> &'static str {
        match self {
            Metric::UniqueCommitCount => "uniqueCommitCount",
            Metric::UniqueCommitSize => "uniqueCommitSize",
            Metric::UniqueTreeCount => "uniqueTreeCount",
            Metric::UniqueTreeSize => "uniqueTreeSize",
            Metric::UniqueTreeEntries => "uniqueTreeEntries",
            Metric::UniqueBlobCount => "uniqueBlobCount",
            Metric::UniqueBlobSize => "uniqueBlobSize",
            Metric::UniqueTagCount => "uniqueTagCount",
            Metric::ReferenceCount => "referenceCount",
            Metric::MaxCommitSize => "maxCommitSize",
            Metric::MaxParentCount => "maxCommitParentCount",
            Metric::MaxTreeEntries => "maxTreeEntries",
            Metric::MaxBlobSize => "maxBlobSize",
            Metric::MaxHistoryDepth => "maxHistoryDepth",
            Metric::MaxTagDepth => "maxTagDepth",
            Metric::MaxExpandedTreeCount => "maxCheckoutTreeCount",
            Metric::MaxPathDepth => "maxCheckoutPathDepth",
            Metric::MaxPathLength => "maxCheckoutPathLength",
            Metric::MaxExpandedBlobCount => "maxCheckoutBlobCount",
            Metric::MaxExpandedBlobSize => "maxCheckoutBlobSize",
            Metric::MaxExpandedLinkCount => "maxCheckoutLinkCount",
            Metric::MaxExpandedSubmoduleCount => "maxCheckoutSubmoduleCount",
        }
    }

    /// Value considered unremarkable for a healthy repository
    pub fn reasonable(self) -> f64 {
        match self {
            Metric::UniqueCommitCount => 500e3,
            Metric::UniqueCommitSize => 250e6,
            Metric::UniqueTreeCount => 1.5e6,
            Metric::UniqueTreeSize => 2e9,
            Metric::UniqueTreeEntries => 50e6,
            Metric::UniqueBlobCount => 1.5e6,
            Metric::UniqueBlobSize => 10e9,
            Metric::UniqueTagCount => 25e3,
            Metric::ReferenceCount => 25e3,
            Metric::MaxCommitSize => 50e3,
            Metric::MaxParentCount => 10.0,
            Metric::MaxTreeEntries => 1000.0,
            Metric::MaxBlobSize => 10e6,
            Metric::MaxHistoryDepth => 500e3,
            Metric::MaxTagDepth => 1.001,
            Metric::MaxExpandedTreeCount => 2000.0,
            Metric::MaxPathDepth => 10.0,
            Metric::MaxPathLength => 100.0,
            Metric::MaxExpandedBlobCount => 50e3,
            Metric::MaxExpandedBlobSize => 1e9,
            Metric::MaxExpandedLinkCount => 25e3,
            Metric::MaxExpandedSubmoduleCount => 100.0,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.key() == s)
            .ok_or_else(|| format!("unknown metric {s:?}"))
    }
}

/// Calibration of the star scale
#[derive(Debug, Clone, PartialEq)]
pub struct ConcernScale {
    base: f64,
    baselines: BTreeMap<Metric, f64>,
}

impl Default for ConcernScale {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE,
            baselines: BTreeMap::new(),
        }
    }
}

impl ConcernScale {
    pub fn new(base: f64) -> Result<Self, ConfigError> {
        if !base.is_finite() || base <= 1.0 {
            return Err(ConfigError::InvalidSeverityBase(base.to_string()));
        }
        Ok(Self {
            base,
            baselines: BTreeMap::new(),
        })
    }

    /// Override the reasonable value of one metric
    pub fn with_baseline(mut self, metric: Metric, reasonable: f64) -> Self {
        if reasonable > 0.0 && reasonable.is_finite() {
            self.baselines.insert(metric, reasonable);
        }
        self
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn reasonable(&self, metric: Metric) -> f64 {
        self.baselines
            .get(&metric)
            .copied()
            .unwrap_or_else(|| metric.reasonable())
    }

    /// How many times over its baseline `value` is
    pub fn level(&self, metric: Metric, value: u64) -> f64 {
        value as f64 / self.reasonable(metric)
    }

    /// Star rating of `value` for `metric`
    ///
    /// Counts powers of the base instead of taking a logarithm, so values
    /// right below a power never round up.
    pub fn severity(&self, metric: Metric, value: u64) -> u32 {
        let value = value as f64;
        let mut threshold = self.reasonable(metric) * self.base;
        let mut stars = 0;
        while stars < MAX_STARS && value >= threshold {
            stars += 1;
            threshold *= self.base;
        }
        stars
    }
}
