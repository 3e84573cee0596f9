//! Line prefix formatting helpers

use std::io::IsTerminal;
use std::sync::LazyLock;

use time::OffsetDateTime;
use time::macros::format_description;

use crate::level::Level;

/// ANSI reset sequence closing a colored line.
pub(crate) const COLOR_RESET: &str = "\x1b[;0m";

static STDOUT_IS_TERMINAL: LazyLock<bool> = LazyLock::new(|| std::io::stdout().is_terminal());
static STDERR_IS_TERMINAL: LazyLock<bool> = LazyLock::new(|| std::io::stderr().is_terminal());

/// Whether colored output is permitted on stdout.
pub(crate) fn color_stdout() -> bool {
    *STDOUT_IS_TERMINAL
}

/// Whether colored output is permitted on stderr.
pub(crate) fn color_stderr() -> bool {
    *STDERR_IS_TERMINAL
}

/// Padded level tag for the line prefix. User and verbose levels carry no
/// tag, only the padding.
pub(crate) fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "[error]  ",
        Level::Warning => "[warning]",
        Level::DebugWarning | Level::Debug => "[debug]  ",
        _ => "         ",
    }
}

/// ANSI control sequence selecting the color for a level.
pub(crate) fn level_color(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[;1;31m",
        Level::Warning => "\x1b[;1;34m",
        Level::DebugWarning => "\x1b[;2;33m",
        Level::Debug => "\x1b[;2;32m",
        _ => COLOR_RESET,
    }
}

/// Current wall-clock time as `HH:MM:SS`.
pub(crate) fn time_string() -> String {
    let format = format_description!("[hour]:[minute]:[second]");
    OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_uniform_width() {
        for level in Level::ALL {
            assert_eq!(level_tag(level).len(), 9);
        }
    }

    #[test]
    fn time_string_is_hh_mm_ss() {
        let s = time_string();
        let parts: Vec<_> = s.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.len() == 2));
    }

    #[test]
    fn untagged_levels_share_the_reset_color() {
        assert_eq!(level_color(Level::User), COLOR_RESET);
        assert_eq!(level_color(Level::DebugVerbose3), COLOR_RESET);
        assert_ne!(level_color(Level::Error), level_color(Level::Debug));
    }
}
