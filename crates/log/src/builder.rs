//! Incremental message assembly
//!
//! A [`MessageBuilder`] accumulates fragments and emits them as one message,
//! so a multi-step report cannot be interleaved with output from other
//! threads. The message goes out exactly once: on [`MessageBuilder::emit`],
//! or on drop if the builder was abandoned.

use std::fmt;
use std::fmt::Write as _;

use crate::domain::{CallSite, Domain};
use crate::level::Level;

/// Accumulates one message for a domain.
///
/// Created by [`Domain::message`]. The severity check still happens at
/// emission time, against the configuration in force then.
#[must_use = "the message is emitted on drop; call emit() to be explicit"]
pub struct MessageBuilder {
    domain: Domain,
    level: Level,
    origin: String,
    site: CallSite,
    buffer: String,
    emitted: bool,
}

impl MessageBuilder {
    pub(crate) fn new(domain: Domain, level: Level, origin: String, site: CallSite) -> Self {
        Self {
            domain,
            level,
            origin,
            site,
            buffer: String::new(),
            emitted: false,
        }
    }

    /// Appends a fragment.
    pub fn push(mut self, fragment: impl fmt::Display) -> Self {
        let _ = write!(self.buffer, "{fragment}");
        self
    }

    /// Appends a fragment followed by a line break.
    pub fn pushln(mut self, fragment: impl fmt::Display) -> Self {
        let _ = writeln!(self.buffer, "{fragment}");
        self
    }

    /// Emits the accumulated message.
    pub fn emit(mut self) {
        self.flush();
    }

    fn flush(&mut self) {
        if self.emitted {
            return;
        }
        self.emitted = true;
        self.domain
            .emit(self.level, self.site, &self.origin, &self.buffer, None);
    }
}

impl Drop for MessageBuilder {
    fn drop(&mut self) {
        self.flush();
    }
}
