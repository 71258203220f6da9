// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod attendance;
mod error;
mod health;
mod identity;
mod metrics;
mod root;
mod sessions;
mod shared_types;

// Core handlers
pub use health::health_check;
pub use metrics::{metrics_handler, track_requests};
pub use root::root_handler;

// Identity/Access handlers
pub use identity::{login, register};

// Session/Token Authority handlers
pub use sessions::{close_session, create_session, get_new_token};

// Attendance Ledger handlers
pub use attendance::{get_attendance, mark_attendance, scan};
