//! Logging setup for the server binary.

use tracing_subscriber::EnvFilter;

/// Crates whose events are shown at the configured level.
const PARLOR_TARGETS: [&str; 5] = [
    "parlor",
    "parlor_server",
    "parlor_room",
    "parlor_transport",
    "parlor_protocol",
];

/// Builds the default filter: `default_level` for Parlor's own crates,
/// dependencies stay at their `warn` default.
///
/// `RUST_LOG`, when set, replaces this filter entirely.
pub fn default_filter(default_level: &str) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        PARLOR_TARGETS
            .iter()
            .map(|target| format!("{target}={default_level}")),
    );
    directives.join(",")
}

/// Installs the global `tracing` subscriber (fmt output, env filter).
///
/// # Panics
/// Panics if a global subscriber is already installed.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(default_level)));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_every_crate() {
        let filter = default_filter("debug");
        assert!(filter.starts_with("warn,"));
        for target in PARLOR_TARGETS {
            assert!(filter.contains(&format!("{target}=debug")), "{target}");
        }
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(default_filter("info").parse::<EnvFilter>().is_ok());
    }
}
