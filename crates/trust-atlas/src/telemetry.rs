//! Tracing bootstrap for the aggregation engine and its API service.

use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    InvalidFilter { directives: String, source: ParseError },
    Init(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter { directives, .. } => {
                write!(f, "invalid tracing filter '{directives}'")
            }
            TelemetryError::Init(err) => {
                write!(f, "failed to install tracing subscriber: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidFilter { source, .. } => Some(source),
            TelemetryError::Init(err) => Some(&**err),
        }
    }
}

/// Filter applied when `RUST_LOG` is unset. A bare level from the config is
/// scoped to the atlas crates so dependency noise stays at `warn`; a value
/// carrying its own directives is passed through verbatim.
fn default_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    let directives = if level.contains(['=', ',']) {
        level.to_string()
    } else {
        format!("warn,trust_atlas={level},trust_atlas_api={level}")
    };

    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::InvalidFilter {
        directives,
        source,
    })
}

/// Installs the global subscriber for the service process. `RUST_LOG` takes
/// precedence over the configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => default_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Init)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_atlas_crates() {
        let filter = default_filter("debug").expect("bare level builds");
        let rendered = filter.to_string();
        assert!(rendered.contains("trust_atlas=debug"));
        assert!(rendered.contains("trust_atlas_api=debug"));
    }

    #[test]
    fn explicit_directives_pass_through() {
        let filter = default_filter("info,hyper=warn").expect("directives build");
        let rendered = filter.to_string();
        assert!(rendered.contains("hyper=warn"));
        assert!(!rendered.contains("trust_atlas"));
    }

    #[test]
    fn rejects_garbage_filter() {
        let err = default_filter("not a level").expect_err("garbage must fail");
        assert!(matches!(err, TelemetryError::InvalidFilter { .. }));
    }
}
