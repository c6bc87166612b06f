//! Prometheus metrics.

use crate::config::MetricsSettings;
use crate::{Error, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Installs the Prometheus recorder.
///
/// With `expose`, the exporter serves `/metrics` on the configured port from
/// a background thread and no render handle is returned. Returns `None` when
/// metrics are disabled.
pub fn install_prometheus(
    settings: &MetricsSettings,
    expose: bool,
) -> Result<Option<PrometheusHandle>> {
    if !settings.enabled {
        return Ok(None);
    }

    let builder = PrometheusBuilder::new();
    if expose {
        let listen_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), settings.port);
        builder
            .with_http_listener(listen_addr)
            .install()
            .map_err(|e| Error::OperationFailed {
                operation: "metrics_exporter_install".to_string(),
                cause: e.to_string(),
            })?;
        tracing::info!(addr = %listen_addr, "Prometheus listener started");
        return Ok(None);
    }

    let handle = builder
        .install_recorder()
        .map_err(|e| Error::OperationFailed {
            operation: "metrics_recorder_install".to_string(),
            cause: e.to_string(),
        })?;
    Ok(Some(handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_installs_nothing() {
        let handle = install_prometheus(&MetricsSettings::default(), false).unwrap();
        assert!(handle.is_none());
    }

    #[test]
    fn test_metrics_registry_smoke() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let _guard = metrics::set_default_local_recorder(&recorder);

        metrics::counter!("crisis_detections_total", "kind" => "exact").increment(1);
        let rendered = handle.render();
        assert!(rendered.contains("crisis_detections_total"));
    }
}
