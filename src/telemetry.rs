use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;
use crate::models::State;

/// Install the global subscriber: JSON lines with span context, or plain text
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    if config.json_logs {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .try_init()?;
    }

    tracing::info!("bundle-api telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking related operations
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one bundle state transition and its cascade
pub fn create_transition_span(
    bundle_id: &str,
    from: State,
    to: State,
    correlation_id: &str,
) -> tracing::Span {
    tracing::info_span!(
        "bundle_transition",
        bundle.id = bundle_id,
        state.from = %from,
        state.to = %to,
        correlation.id = correlation_id,
        otel.kind = "internal"
    )
}

/// Span covering one service operation
pub fn create_request_span(
    operation: &str,
    bundle_id: Option<&str>,
    correlation_id: &str,
) -> tracing::Span {
    tracing::info_span!(
        "bundle_request",
        operation = operation,
        bundle.id = bundle_id,
        correlation.id = correlation_id,
        otel.kind = "server"
    )
}
