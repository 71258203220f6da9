use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Mutex, OnceLock};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static INSTALL: Mutex<()> = Mutex::new(());

/// Install the Prometheus recorder globally and store the handle.
///
/// Later calls are no-ops: the recorder can only be installed once per process.
pub fn init_metrics() -> Result<()> {
    // ---
    let _guard = INSTALL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    if HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = HANDLE.set(handle);

    Ok(())
}

/// Render the current metrics in Prometheus text format.
pub fn render_metrics() -> String {
    HANDLE.get().map(|handle| handle.render()).unwrap_or_default()
}
