//! Per-domain configuration
//!
//! Every domain name owns one [`DomainConfig`]. The settings live behind a
//! lock and are mutated exclusively through the [`Registry`](crate::Registry);
//! domains only read them. Stream-mask changes additionally bump a revision
//! drawn from one process-wide counter, which lets a domain decide whether its
//! cached sink list is stale with a single integer comparison.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::level::Level;
use crate::stream::StreamMask;

/// Process-wide generator for stream-mask revisions.
///
/// Revisions start at 1 so a freshly created domain (cached revision 0)
/// always builds its sink list on first use.
static REVISION: AtomicU64 = AtomicU64::new(0);

fn next_revision() -> u64 {
    REVISION.fetch_add(1, Ordering::Relaxed) + 1
}

/// The mutable settings of one configuration.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub configures_subtree: bool,
    pub enabled: bool,
    pub print_time: bool,
    pub print_name: bool,
    pub print_level: bool,
    pub print_location: bool,
    pub max_level: Level,
    pub stream_mask: StreamMask,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            configures_subtree: false,
            enabled: true,
            print_time: false,
            print_name: false,
            print_level: false,
            print_location: true,
            max_level: Level::Debug,
            stream_mask: StreamMask::default(),
        }
    }
}

/// Display and filter settings for one domain name.
///
/// Created on first reference to a name and kept for the life of the owning
/// registry. The name is immutable; everything else changes through registry
/// setters only.
#[derive(Debug)]
pub struct DomainConfig {
    name: String,
    state: RwLock<Settings>,
    stream_mask_revision: AtomicU64,
}

impl DomainConfig {
    /// New configuration with default settings.
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(Settings::default()),
            stream_mask_revision: AtomicU64::new(next_revision()),
        }
    }

    /// Name-preserving copy of `source`, used when an ancestor marked
    /// `configures_subtree` propagates its settings into a descendant.
    pub(crate) fn derive(name: impl Into<String>, source: &Self) -> Self {
        let state = source.state.read().clone();
        Self {
            name: name.into(),
            state: RwLock::new(state),
            stream_mask_revision: AtomicU64::new(source.revision()),
        }
    }

    /// Qualified domain name this configuration belongs to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether mutations propagate into the domain's subtree.
    #[must_use]
    pub fn configures_subtree(&self) -> bool {
        self.state.read().configures_subtree
    }

    /// Whether the domain emits anything at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    /// Whether lines start with the current time.
    #[must_use]
    pub fn prints_time(&self) -> bool {
        self.state.read().print_time
    }

    /// Whether lines include the qualified domain name.
    #[must_use]
    pub fn prints_name(&self) -> bool {
        self.state.read().print_name
    }

    /// Whether lines include a level tag.
    #[must_use]
    pub fn prints_level(&self) -> bool {
        self.state.read().print_level
    }

    /// Whether lines include the `file:line` call site.
    #[must_use]
    pub fn prints_location(&self) -> bool {
        self.state.read().print_location
    }

    /// The least-urgent level still allowed through.
    #[must_use]
    pub fn max_level(&self) -> Level {
        self.state.read().max_level
    }

    /// Current stream mask.
    #[must_use]
    pub fn stream_mask(&self) -> StreamMask {
        self.state.read().stream_mask.clone()
    }

    /// Current stream-mask revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.stream_mask_revision.load(Ordering::Acquire)
    }

    /// Cheap suppression check for the emit fast path.
    pub(crate) fn allows(&self, level: Level) -> bool {
        let state = self.state.read();
        state.enabled && level.is_within(state.max_level)
    }

    /// Full settings clone for prefix assembly and export.
    pub(crate) fn snapshot(&self) -> Settings {
        self.state.read().clone()
    }

    /// Mutates one non-mask setting in place.
    pub(crate) fn update(&self, mutate: impl FnOnce(&mut Settings)) {
        mutate(&mut self.state.write());
    }

    /// Replaces the stream mask and bumps the shared revision.
    ///
    /// Both stores happen under the write lock so a concurrent sink rebuild
    /// never pairs a new mask with an old revision or vice versa.
    pub(crate) fn set_stream_mask(&self, mask: StreamMask) {
        let mut state = self.state.write();
        state.stream_mask = mask;
        self.stream_mask_revision
            .store(next_revision(), Ordering::Release);
    }

    /// Mask and revision read as a consistent pair.
    pub(crate) fn mask_with_revision(&self) -> (StreamMask, u64) {
        let state = self.state.read();
        let revision = self.stream_mask_revision.load(Ordering::Acquire);
        (state.stream_mask.clone(), revision)
    }
}
