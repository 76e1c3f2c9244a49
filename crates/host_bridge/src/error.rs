//! Error model shared by every binding.

use serde_json::Value;
use thiserror::Error;

/// Convenience result alias for host binding operations.
pub type HostResult<T> = Result<T, HostError>;

/// Failure surfaced by a host binding call.
///
/// Host-side rejections are carried verbatim in [`HostError::Rejected`]; every other variant is
/// produced on the client before or after the single host round trip.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The host answered the command with an error payload.
    #[error("host rejected `{command}`: {payload}")]
    Rejected {
        /// Command string that was invoked.
        command: String,
        /// Error payload exactly as returned by the host.
        payload: Value,
    },
    /// A client-side argument check failed; no host call was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Arguments could not be serialized into the wire shape.
    #[error("failed to encode arguments for `{command}`: {message}")]
    Encode {
        /// Command string that was about to be invoked.
        command: String,
        /// Serializer error message.
        message: String,
    },
    /// The host response did not match the expected shape.
    #[error("unexpected response for `{command}`: {message}")]
    Decode {
        /// Command string that was invoked.
        command: String,
        /// Deserializer error message.
        message: String,
    },
    /// No host runtime is reachable from the active transport.
    #[error("host runtime unavailable: {0}")]
    Unavailable(String),
}

impl HostError {
    /// Returns the host rejection payload when this error came from the host.
    pub fn rejection(&self) -> Option<&Value> {
        match self {
            Self::Rejected { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub(crate) fn decode(command: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            command: command.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn encode(command: &str, err: impl std::fmt::Display) -> Self {
        Self::Encode {
            command: command.to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rejection_payload_is_preserved_verbatim() {
        let err = HostError::Rejected {
            command: "plugin:window|title".to_string(),
            payload: json!({"code": 3, "message": "window not found"}),
        };

        assert_eq!(
            err.rejection(),
            Some(&json!({"code": 3, "message": "window not found"}))
        );
        assert!(err.to_string().starts_with("host rejected `plugin:window|title`"));
        assert_eq!(HostError::InvalidArgument("x".into()).rejection(), None);
    }
}
