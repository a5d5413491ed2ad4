//! Structured logging to stderr.
//!
//! Stdout carries command output only; diagnostics from the catalog
//! library and the commands go through `tracing` to stderr, either as
//! human-readable lines or as JSON objects (one per line).

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// An unparsable `filter` falls back to `warn`. Calling this twice keeps
/// the first subscriber.
pub fn init(filter: &str, json: bool) {
    let (env_filter, rejected) = match EnvFilter::try_new(filter) {
        Ok(env_filter) => (env_filter, false),
        Err(_) => (EnvFilter::new("warn"), true),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_ok() && rejected {
        tracing::warn!(filter, "invalid log filter, using warn");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init("jupii_i18n=debug", false);
        init("not a [valid filter", true);
        tracing::debug!("still logging");
    }
}
