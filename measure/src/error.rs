//! Error type for the measure crate.
//!
//! Only configuration mistakes and undecodable backend payloads are errors.
//! An incomplete selection, a stale reply or a timed-out request are normal
//! states and are reported through [`crate::engine::Action`]s and
//! [`crate::session::ResponseDisposition`] instead.

use frames::CodecError;

/// Errors surfaced to the host.
#[derive(Debug, thiserror::Error)]
pub enum MeasureError {
    /// The host asked for a tool that does not exist.
    #[error("unknown tool type: {0}")]
    UnknownTool(String),
    /// A backend payload could not be decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The configuration JSON could not be parsed.
    #[error("failed to parse measure config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    /// A configuration value is out of range.
    #[error("invalid measure config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: &'static str },
}
