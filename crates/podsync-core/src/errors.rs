//! Error types for the podsync controller
//!
//! Errors are grouped by concern (value validation, handshake synchronization,
//! transport) and unified under [`PodsyncError`], which every fallible controller
//! operation returns through [`PodsyncResult`].

use crate::model::tone::ToneTarget;

// ----------------------------------------------------------------------------
// Specific Error Types
// ----------------------------------------------------------------------------

/// Rejections raised while parsing or applying a caller-supplied value
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid number for {field}: {value:?}")]
    InvalidNumber { field: String, value: String },
    #[error("{field} value {value} outside of [{lower}, {upper}]")]
    OutOfRange {
        field: String,
        value: f32,
        lower: f32,
        upper: f32,
    },
    #[error("Bounds for {field} would invert: min {min} > max {max}")]
    InvertedBounds { field: String, min: f32, max: f32 },
    #[error("Unknown {field} option: {value:?}")]
    UnknownOption { field: String, value: String },
    #[error("Index {index} out of range for {field} (count: {count})")]
    IndexOutOfRange { field: String, index: u32, count: u32 },
    #[error("Preset name too long: {length} characters (max: {max})")]
    NameTooLong { length: usize, max: usize },
    #[error("Preset name contains unsupported character {character:?}")]
    InvalidNameCharacter { character: char },
}

impl ValidationError {
    /// Shorthand for an unparseable numeric value
    pub fn invalid_number(field: impl Into<String>, value: impl Into<String>) -> Self {
        ValidationError::InvalidNumber {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Shorthand for an unknown enumerated option
    pub fn unknown_option(field: impl Into<String>, value: impl Into<String>) -> Self {
        ValidationError::UnknownOption {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Failures of the query/response handshake
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("No response to {query} after {duration_ms}ms")]
    Timeout { query: String, duration_ms: u64 },
    #[error("Completion handle dropped while {query} was in flight")]
    Abandoned { query: String },
}

/// Failures reported by a transport implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Send failed: {reason}")]
    SendFailed { reason: String },
    #[error("Link closed: {reason}")]
    Closed { reason: String },
}

// ----------------------------------------------------------------------------
// Unified Error
// ----------------------------------------------------------------------------

/// Core error type for the podsync controller
#[derive(Debug, thiserror::Error)]
pub enum PodsyncError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A tone descriptor lookup failed; carries what was asked for
    #[error("DT not found {target}")]
    DescriptorNotFound { target: ToneTarget },

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// Detached task failed to join
    #[error("Task error: {message}")]
    Task { message: String },
}

impl PodsyncError {
    /// Descriptor lookup by descriptor id failed
    pub fn descriptor_not_found(id: u32) -> Self {
        PodsyncError::DescriptorNotFound {
            target: ToneTarget::Id(id),
        }
    }

    /// Descriptor lookup by owning amplifier id failed
    pub fn descriptor_not_found_for_amp(amp_id: u32) -> Self {
        PodsyncError::DescriptorNotFound {
            target: ToneTarget::Amp(amp_id),
        }
    }

    /// Create a configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        PodsyncError::Configuration {
            reason: reason.into(),
        }
    }

    /// Whether this error is a caller-input validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, PodsyncError::Validation(_))
    }
}

pub type PodsyncResult<T> = Result<T, PodsyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_not_found_carries_id() {
        let err = PodsyncError::descriptor_not_found(7);
        assert_eq!(err.to_string(), "DT not found ID:7");

        let err = PodsyncError::descriptor_not_found_for_amp(1);
        assert_eq!(err.to_string(), "DT not found AmpID:1");
    }

    #[test]
    fn test_validation_conversion() {
        let err: PodsyncError = ValidationError::invalid_number("max", "abc").into();
        assert!(err.is_validation());
        assert!(err.to_string().contains("\"abc\""));
    }
}
