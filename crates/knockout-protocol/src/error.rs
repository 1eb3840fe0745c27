//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `event` tag, or
    /// missing required fields.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The event is well-formed but invalid at this point in the
    /// conversation — e.g. anything other than `hello` as the first
    /// event on a connection.
    #[error("invalid event: {0}")]
    InvalidEvent(String),
}
