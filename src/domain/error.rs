//! Failure taxonomy shared by every attendance operation.
//!
//! All variants except `Internal` are ordinary, user-visible outcomes.
//! None of them are retried by the server.

/// Errors returned by identity, session and ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    // ---
    /// Missing fields, unknown role, or a malformed QR payload.
    #[error("Invalid input")]
    InvalidInput,

    /// Registration with a display name that is already taken.
    #[error("Username exists")]
    DuplicateIdentity,

    /// Login with an unknown name or a wrong secret.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bad bearer credential, wrong role, unknown session, or not the owner.
    #[error("Unauthorized")]
    Unauthorized,

    /// Token does not match the session's current one, or it has expired.
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    /// The student is already in the session's attendance set.
    #[error("Already marked")]
    AlreadyMarked,

    /// Token rotation requested on a session that has been closed.
    #[error("Session closed")]
    SessionClosed,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience alias for domain results.
pub type AttendanceResult<T> = Result<T, AttendanceError>;
