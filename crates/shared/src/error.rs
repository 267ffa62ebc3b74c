use thiserror::Error;

/// An outbound request did not complete with a success status.
#[derive(Debug, Error)]
#[error("request `{request}` failed: {reason}")]
pub struct TransportError {
    pub request: String,
    /// Response status when the host answered at all.
    pub status: Option<u16>,
    pub reason: String,
}

impl TransportError {
    pub fn status(request: impl Into<String>, status: u16) -> Self {
        Self {
            request: request.into(),
            status: Some(status),
            reason: format!("host responded with status {status}"),
        }
    }

    pub fn unreachable(request: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            status: None,
            reason: reason.into(),
        }
    }
}

/// A payload could not be encoded or decoded.
#[derive(Debug, Error)]
#[error("malformed payload for `{context}`: {source}")]
pub struct SerializationError {
    pub context: String,
    #[source]
    pub source: serde_json::Error,
}

impl SerializationError {
    pub fn new(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self {
            context: context.into(),
            source,
        }
    }
}

/// An inbound dispatch handler returned an error or panicked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("handler for `{key}` failed: {reason}")]
pub struct HandlerError {
    pub key: String,
    pub reason: String,
}

impl HandlerError {
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

impl BridgeError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }
}
