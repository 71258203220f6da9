//! Application state management.
//!
//! This module defines the shared state structure that gets passed to all
//! Axum handlers via the `State` extractor. The `AppState` owns the three
//! attendance components and the metrics backend. It is built once at
//! startup from an injected repository, so tests get a private store.
//!
//! The state is cheaply cloneable (everything heavy sits behind `Arc`).

use crate::domain::{
    AttendanceLedger, CredentialHasherPtr, Identity, MetricsPtr, RepositoryPtr, SessionAuthority,
    TokenPolicy,
};

/// Shared application state passed to all Axum handlers.
///
/// # Lifecycle
///
/// 1. Created once in `create_router()` (or by a test) during startup
/// 2. Attached to the Axum router via `.with_state(app_state)`
/// 3. Cloned automatically by Axum for each incoming HTTP request
/// 4. Dropped, together with every session and user, at shutdown
#[derive(Clone)]
pub struct AppState {
    /// Registration, login and bearer checks.
    identity: Identity,

    /// Session lifecycle and rotating tokens.
    authority: SessionAuthority,

    /// Per-session attendance sets.
    ledger: AttendanceLedger,

    /// Either Prometheus-backed (production) or no-op (testing/development).
    metrics: MetricsPtr,
}

impl AppState {
    // ---

    pub fn new(
        repository: RepositoryPtr,
        hasher: CredentialHasherPtr,
        metrics: MetricsPtr,
        policy: TokenPolicy,
    ) -> Self {
        // ---
        AppState {
            identity: Identity::new(repository.clone(), hasher),
            authority: SessionAuthority::new(repository.clone(), policy),
            ledger: AttendanceLedger::new(repository),
            metrics,
        }
    }

    pub(crate) fn identity(&self) -> &Identity {
        &self.identity
    }

    pub(crate) fn authority(&self) -> &SessionAuthority {
        &self.authority
    }

    pub(crate) fn ledger(&self) -> &AttendanceLedger {
        &self.ledger
    }

    /// Get a reference to the metrics implementation.
    pub(crate) fn metrics(&self) -> &MetricsPtr {
        &self.metrics
    }
}
