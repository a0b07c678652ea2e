//! Logging for roster.
//!
//! Log lines go to stderr so that `--format json` output on stdout stays
//! machine-readable. Request spans from `tower_http` share roster's level.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// How much the binary logs, chosen with `-q` / `-v` / `-vv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Info and above.
    #[default]
    Normal,
    /// Debug and above, including per-request spans.
    Verbose,
    /// Everything, including fuzzy scores.
    Trace,
}

impl Verbosity {
    /// The level this verbosity enables.
    #[must_use]
    pub fn level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::ERROR,
            Self::Normal => LevelFilter::INFO,
            Self::Verbose => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    /// `RUST_LOG` if set and valid, otherwise directives for this verbosity.
    #[must_use]
    pub fn env_filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = self.level();
            EnvFilter::new(format!("roster={level},tower_http={level}"))
        })
    }
}

/// Install the global subscriber. Later calls are no-ops.
///
/// ```no_run
/// use roster::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(verbosity.env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Warn-level logging routed to the test harness.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
