//! VM Manager Error Types
//!
//! This module defines all error types that can occur during VM lifecycle
//! operations. Each variant carries the name of the offending VM so callers
//! can branch on kind rather than parse message text.

/// Error types for VM lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum VmError {
    /// Malformed or missing required configuration field
    #[error("invalid argument for VM '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// Name collision on create
    #[error("virtual machine '{0}' already exists")]
    AlreadyExists(String),

    /// Operation referenced an unknown VM
    #[error("virtual machine '{0}' not found")]
    NotFound(String),
}

/// Convenience alias for VM operation results.
pub type VmResult<T> = Result<T, VmError>;
