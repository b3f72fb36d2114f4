//! `tracing` subscriber setup. Logs go to stderr; stdout is tool output only.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Filter directive used when neither env var is set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "lineedit=debug,led=debug,warn" } else { "warn" }
}

/// Build the filter from `LINEEDIT_LOG`, then `RUST_LOG`, then the default.
pub fn env_filter(verbose: bool) -> EnvFilter {
    ["LINEEDIT_LOG", "RUST_LOG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: bool, no_color: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_timer(ChronoLocal::new("%H:%M:%S%.3f".into()))
        .with_target(verbose)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_default() {
        assert_eq!(default_directive(false), "warn");
        assert!(default_directive(true).contains("lineedit=debug"));
    }

    #[test]
    fn init_twice_is_harmless() {
        init(false, true);
        init(true, true);
    }
}
