//! Tracing setup for the bot and tools.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

const CRATE_TARGETS: &[&str] = &[
    "clearcast_common",
    "clearcast_media",
    "clearcast_enhance",
    "clearcast_pipeline",
    "clearcast_bot",
];

/// Derive filter directives from the configured level string. Explicit
/// directives ("clearcast_media=trace,info") pass through; a plain level
/// ("debug") is scoped to the clearcast crates with dependencies at warn.
fn directives_for(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    let mut directives = String::from("warn");
    for target in CRATE_TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the config.
///
/// JSON output is for hosted deployments where logs are scraped; the plain
/// formatter is for running the bot locally. A second call is a no-op rather
/// than an error, so tests can initialize freely.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives_for(&config.level)));

    let builder = fmt::Subscriber::builder().with_env_filter(filter);
    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish()).ok();
    } else {
        tracing::subscriber::set_global_default(builder.with_target(true).finish()).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_level_is_scoped_to_clearcast_crates() {
        let directives = directives_for("debug");
        assert!(directives.starts_with("warn,"), "got: {directives}");
        for target in CRATE_TARGETS {
            assert!(
                directives.contains(&format!("{target}=debug")),
                "missing {target} in {directives}"
            );
        }
        // Must also be accepted by the filter parser.
        let rendered = EnvFilter::new(&directives).to_string();
        assert!(rendered.contains("clearcast_media=debug"), "got: {rendered}");
    }

    #[test]
    fn explicit_directives_pass_through_unchanged() {
        assert_eq!(
            directives_for("clearcast_media=trace,info"),
            "clearcast_media=trace,info"
        );
        assert_eq!(directives_for("clearcast_pipeline=warn"), "clearcast_pipeline=warn");
    }
}
