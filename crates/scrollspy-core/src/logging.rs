#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! With the `tracing` feature the usual macros are re-exported from `tracing`.
//! Without it, no-op macros with the same names keep call sites compiling.
//! The `tracing-json` feature adds [`init_json`] for hosts that want
//! structured JSON log lines.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, info, trace, warn};

/// Environment variable consulted by [`init_json`] for the filter directive.
pub const LOG_ENV: &str = "SCROLLSPY_LOG";

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op debug_span macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// No-op info macro when tracing is disabled.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op warn macro when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}

/// Span stand-in used when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Enter the no-op span (does nothing).
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }
}

/// Guard returned by [`NoopSpan::enter`].
#[cfg(not(feature = "tracing"))]
pub struct NoopGuard;

/// Install a global JSON subscriber filtered by [`LOG_ENV`] (default `info`).
///
/// Returns `false` if another global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> bool {
    let directive = std::env::var(LOG_ENV).ok();
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(json_filter(directive.as_deref()))
        .with_current_span(false)
        .try_init()
        .is_ok()
}

/// Filter for `directive`, falling back to `info` when absent or unparsable.
#[cfg(feature = "tracing-json")]
fn json_filter(directive: Option<&str>) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[cfg(all(test, feature = "tracing-json"))]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn filter_defaults_to_info() {
        assert_eq!(json_filter(None).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn filter_honors_directive() {
        let filter = json_filter(Some("scrollspy_runtime=trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn init_json_installs_once() {
        assert!(init_json());
        assert!(!init_json());
    }
}
