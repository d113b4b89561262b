use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `bravia-api` crate.
///
/// Covers every failure mode of a device session: authentication,
/// transport, device state, and payload decoding. The transport primitive
/// raises these; convenience methods pass them through unchanged.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The device rejected the credentials (HTTP 401 or 403).
    ///
    /// Wrong or expired PIN, unknown pre-shared key, or a registration
    /// that has not been confirmed on the TV yet.
    #[error("Authentication rejected by device (HTTP {status})")]
    Authentication { status: u16 },

    // ── Device ──────────────────────────────────────────────────────
    /// The requested service or endpoint does not exist (HTTP 404).
    #[error("Endpoint not found: {url}")]
    NotFound { url: String },

    /// The device answered but does not expose the expected API surface.
    #[error("Device does not support the Bravia REST API")]
    NotSupported,

    /// HTTP 200, but the payload says the display is powered off.
    #[error("Device is turned off and does not respond to this request")]
    TurnedOff,

    // ── Transport ───────────────────────────────────────────────────
    /// Network-level failure (connection refused/reset, DNS failure, etc.)
    #[error("Connection error: {0}")]
    Connection(#[source] reqwest::Error),

    /// Request deadline exceeded.
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The HTTP client could not be built (TLS backend, invalid headers).
    #[error("Transport setup failed: {0}")]
    Transport(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Wake-on-LAN ─────────────────────────────────────────────────
    /// The stored MAC address is not six hex-encoded octets.
    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),

    /// Sending the magic packet failed.
    #[error("Wake-on-LAN broadcast failed: {0}")]
    WakeOnLan(#[source] std::io::Error),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the device rejected the session's credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if the device reported itself as powered off.
    pub fn is_turned_off(&self) -> bool {
        matches!(self, Self::TurnedOff)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection(e) => e.is_connect() || e.is_request(),
            Self::Timeout { .. } | Self::TurnedOff => true,
            _ => false,
        }
    }

    /// Classify a `reqwest` send error into `Timeout` or `Connection`.
    pub(crate) fn from_send(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout }
        } else {
            Self::Connection(err)
        }
    }
}
