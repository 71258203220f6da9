mod authority;
mod error;
mod hasher;
mod identity;
mod ledger;
mod metrics;
mod models;
mod payload;
mod repository;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

// Storage and hashing seams
pub use hasher::{CredentialHasher, CredentialHasherPtr};
pub use repository::{Repository, RepositoryPtr, SessionHandle};

// Entities and the failure taxonomy
pub use error::{AttendanceError, AttendanceResult};
pub use models::{IssuedToken, Role, Session, SessionId, User, UserId};
pub use payload::QrPayload;

// The three components
pub use authority::{SessionAuthority, TokenPolicy};
pub use identity::{Identity, LoginGrant};
pub use ledger::AttendanceLedger;
