use thiserror::Error;

/// Failures decoding the line based data stream.
///
/// These are the only errors this crate produces; the content transforms
/// degrade malformed input instead of rejecting it.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Missing stream part separator in line: {0}")]
    MissingSeparator(String),

    #[error("Unknown stream part code: {0}")]
    UnknownCode(String),

    #[error("Invalid payload for stream part {code}: {source}")]
    InvalidPayload {
        code: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
