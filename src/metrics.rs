//! Prometheus metrics

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Setup Prometheus metrics exporter
/// Returns a handle that can be used to retrieve metrics
pub fn setup_metrics() -> Result<metrics_exporter_prometheus::PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    tracing::info!("Prometheus metrics exporter installed");

    Ok(handle)
}

/// Record a model package that loaded during discovery
pub fn record_plugin_loaded(model: &str) {
    metrics::counter!("modulus_plugins_loaded_total",
        "model" => model.to_string()
    )
    .increment(1);
}

/// Record a model package that failed to load during discovery
pub fn record_plugin_failed(package: &str) {
    metrics::counter!("modulus_plugins_failed_total",
        "package" => package.to_string()
    )
    .increment(1);
}

/// Record a served prediction
pub fn record_prediction(model: &str) {
    metrics::counter!("modulus_predictions_total",
        "model" => model.to_string()
    )
    .increment(1);
}

/// Record a request rejected by schema validation
pub fn record_validation_failure() {
    metrics::counter!("modulus_validation_failures_total").increment(1);
}

/// Update registered model count gauge
pub fn update_registered_models(count: usize) {
    metrics::gauge!("modulus_registered_models").set(count as f64);
}
