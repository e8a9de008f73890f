use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the journey workspace.
///
/// Covers identity resolution, remote fetch failures, persisted-state validation,
/// storage refusals and builder/argument validation.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum JourneyError {
    /// No caller identity could be resolved from the site session.
    #[error("not authenticated: no identity could be resolved")]
    NotAuthenticated,

    /// A single page or work-detail fetch failed.
    #[error("fetch failed for {resource}: {msg}")]
    Fetch {
        /// Resource being fetched (a url or a `stage page N` label).
        resource: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A persisted cache or progress row failed validation.
    #[error("malformed persisted state at {key}: {reason}")]
    MalformedState {
        /// Storage key of the offending row.
        key: String,
        /// Why the row was rejected (parse error, version, identity, age).
        reason: String,
    },

    /// A persistence write was refused because the serialized row is too large.
    #[error("storage quota exceeded: {bytes} bytes > limit {limit}")]
    StorageQuotaExceeded {
        /// Size of the serialized row.
        bytes: usize,
        /// Configured ceiling.
        limit: usize,
    },

    /// The persistence backend failed (I/O, permissions).
    #[error("storage error: {0}")]
    Storage(String),

    /// Another scan is already in flight on this orchestrator.
    #[error("a scan is already in progress")]
    ScanInProgress,

    /// The site does not provide the requested capability.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// Capability label (e.g. "works", "inbox").
        capability: String,
    },

    /// Invalid input argument or configuration.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl JourneyError {
    /// Helper: build a `Fetch` error for a resource and message.
    pub fn fetch(resource: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Fetch {
            resource: resource.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `MalformedState` error for a storage key and reason.
    pub fn malformed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedState {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Helper: build an `Unsupported` error for a capability label.
    #[must_use]
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Helper: build a `Storage` error from any displayable backend failure.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// True when the error came from the remote site rather than local state.
    #[must_use]
    pub const fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}
