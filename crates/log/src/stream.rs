//! Output stream kinds and masks

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::Error;

/// A kind of output sink a domain can write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// The process standard output stream.
    Stdout,
    /// The process standard error stream.
    Stderr,
    /// One log file per domain, named `<prefix><domain>.log`.
    File,
    /// One log file shared by a recursively configured subtree.
    CombinedFile,
}

impl StreamKind {
    /// All kinds, in mask order.
    pub const ALL: [Self; 4] = [Self::Stdout, Self::Stderr, Self::File, Self::CombinedFile];

    /// Canonical lowercase name, as used in logging documents.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::File => "file",
            Self::CombinedFile => "combined_file",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StreamKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownStream(s.to_string()))
    }
}

/// An ordered set of [`StreamKind`]s with duplicates collapsed.
///
/// The default mask routes to stdout only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<StreamKind>", into = "Vec<StreamKind>")]
pub struct StreamMask {
    kinds: SmallVec<[StreamKind; 4]>,
}

impl StreamMask {
    /// Empty mask; such a domain resolves no sinks at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            kinds: SmallVec::new(),
        }
    }

    /// Mask containing a single kind.
    #[must_use]
    pub fn of(kind: StreamKind) -> Self {
        let mut mask = Self::empty();
        mask.insert(kind);
        mask
    }

    /// Inserts a kind, keeping the mask ordered and duplicate-free.
    pub fn insert(&mut self, kind: StreamKind) {
        if let Err(at) = self.kinds.binary_search(&kind) {
            self.kinds.insert(at, kind);
        }
    }

    /// Whether the mask contains the given kind.
    #[must_use]
    pub fn contains(&self, kind: StreamKind) -> bool {
        self.kinds.binary_search(&kind).is_ok()
    }

    /// Iterates the kinds in mask order.
    pub fn iter(&self) -> impl Iterator<Item = StreamKind> + '_ {
        self.kinds.iter().copied()
    }

    /// Number of distinct kinds in the mask.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the mask is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for StreamMask {
    fn default() -> Self {
        Self::of(StreamKind::Stdout)
    }
}

impl FromIterator<StreamKind> for StreamMask {
    fn from_iter<I: IntoIterator<Item = StreamKind>>(iter: I) -> Self {
        let mut mask = Self::empty();
        for kind in iter {
            mask.insert(kind);
        }
        mask
    }
}

impl From<Vec<StreamKind>> for StreamMask {
    fn from(kinds: Vec<StreamKind>) -> Self {
        kinds.into_iter().collect()
    }
}

impl From<StreamMask> for Vec<StreamKind> {
    fn from(mask: StreamMask) -> Self {
        mask.kinds.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn duplicates_collapse() {
        let mask: StreamMask = [StreamKind::File, StreamKind::Stdout, StreamKind::File]
            .into_iter()
            .collect();
        assert_eq!(mask.len(), 2);
        assert_eq!(
            mask.iter().collect::<Vec<_>>(),
            vec![StreamKind::Stdout, StreamKind::File]
        );
    }

    #[test]
    fn default_is_stdout_only() {
        let mask = StreamMask::default();
        assert!(mask.contains(StreamKind::Stdout));
        assert_eq!(mask.len(), 1);
    }

    #[test]
    fn serde_round_trips_as_kind_list() {
        let mask: StreamMask = [StreamKind::Stderr, StreamKind::CombinedFile]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&mask).unwrap();
        assert_eq!(json, "[\"stderr\",\"combined_file\"]");
        let back: StreamMask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mask);
    }
}
