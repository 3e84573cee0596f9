//! Severity levels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Message severity, ordered from most to least urgent.
///
/// A message reaches a domain's sinks only while its level is within the
/// domain's configured ceiling; see [`Level::is_within`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Information addressed to end users. Shown whenever the domain is active.
    User,
    /// Certain malfunction of the application.
    Error,
    /// Possible malfunction or discarded invalid input.
    Warning,
    /// Debug information with warning character ("parameter x not set, using y").
    DebugWarning,
    /// Coarse program flow. Default ceiling.
    Debug,
    /// Detailed debug output.
    #[serde(rename = "debug_verbose_1")]
    DebugVerbose1,
    /// More detailed debug output.
    #[serde(rename = "debug_verbose_2")]
    DebugVerbose2,
    /// Most detailed debug output.
    #[serde(rename = "debug_verbose_3")]
    DebugVerbose3,
}

impl Level {
    /// All levels, most urgent first.
    pub const ALL: [Self; 8] = [
        Self::User,
        Self::Error,
        Self::Warning,
        Self::DebugWarning,
        Self::Debug,
        Self::DebugVerbose1,
        Self::DebugVerbose2,
        Self::DebugVerbose3,
    ];

    /// Whether a message at this level passes a severity ceiling.
    ///
    /// The ceiling names the least-urgent level still allowed through, so the
    /// check is an ordinal comparison.
    #[must_use]
    pub fn is_within(self, ceiling: Self) -> bool {
        (self as u8) <= (ceiling as u8)
    }

    /// Canonical lowercase name, as used in logging documents.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::DebugWarning => "debug_warning",
            Self::Debug => "debug",
            Self::DebugVerbose1 => "debug_verbose_1",
            Self::DebugVerbose2 => "debug_verbose_2",
            Self::DebugVerbose3 => "debug_verbose_3",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.name() == s)
            .ok_or_else(|| Error::UnknownLevel(s.to_string()))
    }
}
