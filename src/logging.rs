use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing::{level_filters::LevelFilter, Subscriber};
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan, EnvFilter, Layer};

use crate::config::{Logging, LoggingStyle};

#[derive(Debug, Error)]
#[error("Failed to initialize logging")]
pub struct LoggingInitError;

fn make_env_filter(targets: Option<&str>) -> EnvFilter {
    let default_level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let builder = EnvFilter::builder().with_default_directive(default_level.into());
    match targets {
        Some(targets) => builder.parse_lossy(targets),
        None => builder.from_env_lossy(),
    }
}

fn console_layer<S>(config: &Logging) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = tracing_subscriber::fmt::layer();
    let filter = make_env_filter(config.targets.as_deref());
    match config.style {
        LoggingStyle::Compact => layer.compact().with_filter(filter).boxed(),
        LoggingStyle::Full => layer.with_filter(filter).boxed(),
        LoggingStyle::Pretty => layer.pretty().with_filter(filter).boxed(),
        LoggingStyle::JSON => layer
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_filter(filter)
            .boxed(),
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` applies only when `logging.targets` is not configured.
pub fn init(config: &Logging) -> Result<(), LoggingInitError> {
    let registry = tracing_subscriber::Registry::default()
        .with(console_layer(config))
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(registry)
        .change_context(LoggingInitError)
        .attach_printable("logging is already initialized")?;

    if config.targets.is_some() && std::env::var("RUST_LOG").is_ok() {
        tracing::warn!("Both `RUST_LOG` and `FOODGRAM_LOGGING_TARGETS` are set, `RUST_LOG` is ignored");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_targets() {
        let filter = make_env_filter(Some("foodgram=trace,sqlx=warn"));
        let rendered = filter.to_string();
        assert!(rendered.contains("foodgram=trace"));
        assert!(rendered.contains("sqlx=warn"));
    }
}
