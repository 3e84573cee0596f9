//! Domain handles and message emission
//!
//! A [`Domain`] is a cheap handle onto one record in its registry's arena.
//! Emission reads the currently bound configuration without taking the
//! registry lock: a suppressed call costs one atomic pointer load and one
//! settings read. Only calls that actually produce output lock the domain's
//! per-record emit state, which serializes prefix assembly and sink writes so
//! concurrent messages to the same domain come out as whole lines.

use std::fmt;
use std::fmt::Write as _;
use std::panic::Location;
use std::sync::Arc;

use crate::builder::MessageBuilder;
use crate::config::DomainConfig;
use crate::format;
use crate::level::Level;
use crate::registry::{DomainId, Node, Registry, Shared};
use crate::writer::{self, Sink};

/// Cached emission state of one domain, guarded by the record's mutex.
pub(crate) struct EmitState {
    /// Stream-mask revision the sink list was built against. Starts at 0,
    /// which is older than any real revision, so the first emit builds it.
    pub(crate) revision: u64,
    pub(crate) sinks: Vec<Sink>,
    /// Reused line buffer.
    pub(crate) line: String,
}

impl Default for EmitState {
    fn default() -> Self {
        Self {
            revision: 0,
            sinks: Vec::new(),
            line: String::new(),
        }
    }
}

/// The source position a message was produced at.
///
/// The logging macros fill this from `file!()`, `line!()` and
/// `module_path!()`; the plain [`Domain`] methods capture it through
/// `#[track_caller]` and leave the scope empty.
#[derive(Debug, Clone, Copy)]
pub struct CallSite {
    /// Source file of the call.
    pub file: &'static str,
    /// Line within that file.
    pub line: u32,
    /// Enclosing module path, when the macros captured one.
    pub scope: Option<&'static str>,
}

impl CallSite {
    /// The caller's own location.
    #[must_use]
    #[track_caller]
    pub fn here() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
            scope: None,
        }
    }
}

/// Handle to one logging domain.
///
/// Obtained from [`Registry::resolve`](crate::Registry::resolve) or the
/// crate-level [`resolve`](crate::resolve). Clones are handles to the same
/// record; two domains compare equal when they address the same record in
/// the same registry.
#[derive(Clone)]
pub struct Domain {
    shared: Arc<Shared>,
    id: DomainId,
}

impl Domain {
    pub(crate) fn new(shared: Arc<Shared>, id: DomainId) -> Self {
        Self { shared, id }
    }

    pub(crate) fn id(&self) -> DomainId {
        self.id
    }

    fn node(&self) -> Arc<Node> {
        self.shared.node(self.id)
    }

    /// Qualified dot-path name of this domain.
    #[must_use]
    pub fn name(&self) -> String {
        self.node().name.clone()
    }

    /// The parent domain, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Domain> {
        self.node()
            .parent
            .map(|id| Domain::new(Arc::clone(&self.shared), id))
    }

    /// Resolves (creating if needed) a descendant by relative dot-path.
    #[must_use]
    pub fn subdomain(&self, path: &str) -> Domain {
        let registry = Registry::from_shared(Arc::clone(&self.shared));
        let node = self.node();
        if node.parent.is_none() {
            registry.resolve(path)
        } else {
            registry.resolve(&format!("{}.{path}", node.name))
        }
    }

    /// The configuration this domain currently reads. This is the effective
    /// one: for an inherited domain it is the derived copy, not the entry
    /// registered under the domain's own name.
    #[must_use]
    pub fn config(&self) -> Arc<DomainConfig> {
        self.node().config.load_full()
    }

    /// Logs one message.
    #[track_caller]
    pub fn log(&self, level: Level, origin: impl fmt::Display, message: impl fmt::Display) {
        self.emit(level, CallSite::here(), &origin, &message, None);
    }

    /// Logs one message together with an error and its source chain.
    #[track_caller]
    pub fn log_error(
        &self,
        level: Level,
        origin: impl fmt::Display,
        message: impl fmt::Display,
        error: &(dyn std::error::Error + 'static),
    ) {
        self.emit(level, CallSite::here(), &origin, &message, Some(error));
    }

    /// Starts a multi-part message that emits on [`MessageBuilder::emit`]
    /// or when dropped.
    #[must_use]
    #[track_caller]
    pub fn message(&self, level: Level, origin: impl fmt::Display) -> MessageBuilder {
        MessageBuilder::new(self.clone(), level, origin.to_string(), CallSite::here())
    }

    /// Core emission path. Suppressed calls return after the configuration
    /// check; everything else happens under the domain's emit lock.
    pub fn emit(
        &self,
        level: Level,
        site: CallSite,
        origin: &dyn fmt::Display,
        message: &dyn fmt::Display,
        error: Option<&(dyn std::error::Error + 'static)>,
    ) {
        let node = self.node();
        let config = node.config.load();
        if !config.allows(level) {
            return;
        }

        let mut emit = node.emit.lock();
        if emit.revision != config.revision() {
            let (mask, revision) = config.mask_with_revision();
            emit.sinks = writer::resolve_sinks(&self.shared, &node, &mask);
            emit.revision = revision;
        }

        let settings = config.snapshot();
        let EmitState { sinks, line, .. } = &mut *emit;
        line.clear();

        if settings.print_time {
            let _ = write!(line, "{} ", format::time_string());
        }
        if settings.print_name {
            let _ = write!(line, "[{}] ", node.name);
        }
        if settings.print_level {
            let _ = write!(line, "{} ", format::level_tag(level));
        }
        let _ = write!(line, "{origin}");
        if let Some(scope) = site.scope {
            let _ = write!(line, "::{scope}");
        }
        if settings.print_location {
            let _ = write!(line, " ({}:{})", site.file, site.line);
        }
        let _ = write!(line, " >> {message}");

        if let Some(error) = error {
            let _ = write!(line, "\n  error: {error}");
            let mut source = error.source();
            while let Some(cause) = source {
                let _ = write!(line, "\n  caused by: {cause}");
                source = cause.source();
            }
        }

        for sink in sinks.iter() {
            sink.write_line(line, level);
        }
    }
}

impl PartialEq for Domain {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared) && self.id == other.id
    }
}

impl Eq for Domain {}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain").field("name", &self.name()).finish()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.node().name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use pretty_assertions::assert_eq;

    #[test]
    fn subdomain_builds_qualified_names() {
        let registry = Registry::new();
        let net = registry.resolve("net");
        let http = net.subdomain("http.h2");
        assert_eq!(http.name(), "net.http.h2");
        assert_eq!(registry.root().subdomain("net"), net);
    }

    #[test]
    fn handles_compare_by_record_identity() {
        let registry = Registry::new();
        let a = registry.resolve("a");
        assert_eq!(a, a.clone());
        assert_ne!(a, registry.resolve("b"));

        let other = Registry::new();
        assert_ne!(a, other.resolve("a"));
    }

    #[test]
    fn call_site_here_captures_the_caller() {
        let site = CallSite::here();
        assert!(site.file.ends_with("domain.rs"));
        assert!(site.scope.is_none());
        assert!(site.line > 0);
    }

    #[test]
    fn display_is_the_qualified_name() {
        let registry = Registry::new();
        assert_eq!(registry.resolve("a.b").to_string(), "a.b");
        assert_eq!(registry.root().to_string(), ".");
    }
}
