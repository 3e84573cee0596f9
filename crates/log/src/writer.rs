//! Sink resolution and line output
//!
//! A domain's stream mask names abstract sink kinds; this module maps them to
//! concrete write targets. File sinks open lazily, truncate what they find,
//! and stay open for the life of the registry. A file that cannot be opened
//! degrades that slot to stderr: a failed sink must never surface as an error
//! to the code that merely tried to log something.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::format;
use crate::level::Level;
use crate::registry::{Node, Shared};
use crate::stream::{StreamKind, StreamMask};

pub(crate) type FileSink = Arc<Mutex<BufWriter<File>>>;

/// Lifecycle of a domain's log file. `Failed` is sticky so the diagnostic is
/// reported once, not on every emit.
pub(crate) enum FileSlot {
    Closed,
    Open(FileSink),
    Failed,
}

/// A concrete write target resolved from a [`StreamKind`].
pub(crate) enum Sink {
    Stdout,
    Stderr,
    File(FileSink),
}

impl Sink {
    /// Identity comparison used to collapse duplicate targets, e.g. an
    /// explicit stderr entry next to a file slot that fell back to stderr.
    fn same_target(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Stdout, Self::Stdout) | (Self::Stderr, Self::Stderr) => true,
            (Self::File(a), Self::File(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Writes one assembled line. The target is locked for the duration of
    /// the write, so lines stay contiguous even when several domains share
    /// it. Write errors are swallowed; logging must not fail the caller.
    pub(crate) fn write_line(&self, line: &str, level: Level) {
        match self {
            Self::Stdout => {
                let stdout = io::stdout();
                let _ = write_console(&mut stdout.lock(), line, level, format::color_stdout());
            }
            Self::Stderr => {
                let stderr = io::stderr();
                let _ = write_console(&mut stderr.lock(), line, level, format::color_stderr());
            }
            Self::File(file) => {
                let mut file = file.lock();
                let _ = writeln!(file, "{line}");
                let _ = file.flush();
            }
        }
    }
}

fn write_console(out: &mut impl Write, line: &str, level: Level, colored: bool) -> io::Result<()> {
    if colored {
        writeln!(
            out,
            "{}{line}{}",
            format::level_color(level),
            format::COLOR_RESET
        )
    } else {
        writeln!(out, "{line}")
    }
}

/// Maps a stream mask to de-duplicated concrete sinks for one domain.
pub(crate) fn resolve_sinks(shared: &Shared, node: &Arc<Node>, mask: &StreamMask) -> Vec<Sink> {
    let mut sinks: Vec<Sink> = Vec::with_capacity(mask.len());
    for kind in mask.iter() {
        let sink = match kind {
            StreamKind::Stdout => Sink::Stdout,
            StreamKind::Stderr => Sink::Stderr,
            StreamKind::File => file_sink(shared, node),
            StreamKind::CombinedFile => {
                let owner = propagation_root(shared, node);
                file_sink(shared, &owner)
            }
        };
        if !sinks.iter().any(|existing| existing.same_target(&sink)) {
            sinks.push(sink);
        }
    }
    sinks
}

/// Walks up through `configures_subtree` ancestors to the root of the
/// propagation run this domain belongs to. That domain owns the combined
/// file for the whole subtree.
fn propagation_root(shared: &Shared, node: &Arc<Node>) -> Arc<Node> {
    let mut current = Arc::clone(node);
    while let Some(parent_id) = current.parent {
        let parent = shared.node(parent_id);
        if !parent.config.load().configures_subtree() {
            break;
        }
        current = parent;
    }
    current
}

/// The domain's own file sink, opened on first use.
fn file_sink(shared: &Shared, node: &Node) -> Sink {
    let mut slot = node.file.lock();
    match &*slot {
        FileSlot::Open(file) => Sink::File(Arc::clone(file)),
        FileSlot::Failed => Sink::Stderr,
        FileSlot::Closed => match open_log_file(shared, &node.name) {
            Some(file) => {
                let file = Arc::new(Mutex::new(BufWriter::new(file)));
                *slot = FileSlot::Open(Arc::clone(&file));
                Sink::File(file)
            }
            None => {
                *slot = FileSlot::Failed;
                Sink::Stderr
            }
        },
    }
}

fn open_log_file(shared: &Shared, name: &str) -> Option<File> {
    let Some(prefix) = shared.prefix() else {
        eprintln!(
            "arbor-log >> file name prefix not set; domain `{name}` falls back to stderr. \
             Call set_output_file_name_prefix(basename(argv[0])) before enabling file sinks."
        );
        return None;
    };
    let path = format!("{prefix}{name}.log");
    match File::create(&path) {
        Ok(file) => Some(file),
        Err(err) => {
            eprintln!("arbor-log >> could not open `{path}`: {err}; falling back to stderr");
            None
        }
    }
}
