//! Hierarchical domain logging
//!
//! Log messages belong to *domains*: named nodes in a tree rooted at `"."`,
//! addressed by dot-separated paths such as `net.http.h2`. Each domain name
//! owns a configuration deciding whether messages get through at all, how
//! urgent they must be, which prefix fields a line carries and which sinks
//! receive it. A domain marked `configures_subtree` pushes its settings into
//! every descendant on each change, so one switch can silence or redirect a
//! whole subsystem.
//!
//! # Quick start
//!
//! ```
//! use arbor_log::{Level, StreamKind};
//!
//! // One-off tuning through the process-wide registry.
//! let registry = arbor_log::global();
//! registry.set_prints_time("net", true);
//! registry.set_stream("net", StreamKind::Stderr);
//!
//! // Explicit domain handles...
//! let http = arbor_log::resolve("net.http");
//! http.log(Level::Debug, "handshake", "client connected");
//!
//! // ...or the module-path macro.
//! arbor_log::log!(Level::Warning, "startup", "no config file found");
//! ```
//!
//! Emission never fails the caller: a suppressed message costs a single
//! configuration read, and sink problems degrade to stderr with a one-time
//! diagnostic. Configuration loads and parses return [`Result`]; everything
//! on the message path is infallible by construction.
//!
//! Isolated [`Registry`] instances exist for tests and embedders; the macros
//! and [`resolve`] use the shared [`global`] one.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod builder;
mod config;
mod document;
mod domain;
mod error;
mod format;
mod level;
mod macros;
mod registry;
mod stream;
mod writer;

pub use builder::MessageBuilder;
pub use config::DomainConfig;
pub use document::{DomainSpec, LoggingDocument, GLOBAL_SEGMENT};
pub use domain::{CallSite, Domain};
pub use error::{Error, Result};
pub use level::Level;
pub use registry::Registry;
pub use stream::{StreamKind, StreamMask};

use std::sync::LazyLock;

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

/// The process-wide default registry used by the logging macros.
#[must_use]
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// Resolves a domain in the default registry, creating it if needed.
#[must_use]
pub fn resolve(name: &str) -> Domain {
    global().resolve(name)
}

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        global, log, log_err, log_to, resolve, Domain, Level, Registry, StreamKind, StreamMask,
    };
}
