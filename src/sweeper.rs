//! Background removal of idle sessions.

use crate::app_state::AppState;
use anyhow::Result;
use chrono::Utc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawns a task that drops sessions idle for longer than `idle_ttl`,
/// checking every `interval`.
///
/// The task runs until the returned handle is aborted.
///
/// # Errors
/// Returns an error if `idle_ttl` does not fit a calendar duration.
pub fn spawn_session_sweeper(
    state: AppState,
    idle_ttl: Duration,
    interval: Duration,
) -> Result<JoinHandle<()>> {
    // ---
    let idle_ttl = chrono::Duration::from_std(idle_ttl)?;

    tracing::info!(
        "Sweeping sessions idle for more than {}s every {}s",
        idle_ttl.num_seconds(),
        interval.as_secs()
    );

    Ok(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match state.authority().sweep_idle(idle_ttl, Utc::now()).await {
                Ok(0) => {}
                Ok(removed) => state.metrics().record_sessions_swept(removed),
                Err(err) => tracing::error!("Session sweep failed: {:?}", err),
            }
        }
    }))
}
