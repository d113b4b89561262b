use secrecy::{ExposeSecret, SecretString};

/// PIN sent by [`pair`](crate::BraviaClient::pair) to make the TV show its
/// on-screen PIN prompt.
pub const PAIR_PIN: &str = "0000";

/// Prefix that turns a PIN string into a pre-shared key.
const PSK_PREFIX: &str = "psk:";

/// Which authentication strategy a session currently uses.
///
/// Marker enum (no data) -- the secret lives in the session's auth state.
/// Useful for branching on auth flow without carrying secret material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// No credentials attached.
    None,
    /// HTTP Basic auth with an empty user and the PIN as password, plus the
    /// auth cookie planted by `actRegister`.
    Pin,
    /// `X-Auth-PSK` header on every request.
    PreSharedKey,
}

/// Credentials for connecting to a Bravia device.
///
/// Each variant carries the secret material needed for its auth flow, so
/// the two modes can never be active at once.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Register with a PIN shown on the TV screen.
    Pin {
        pin: SecretString,
        client_id: String,
        nickname: String,
    },

    /// Pre-shared key configured under the TV's IP control settings.
    PreSharedKey(SecretString),
}

impl Credentials {
    /// Build PIN credentials, honoring the `psk:<key>` shorthand.
    ///
    /// A PIN of the form `psk:secret` selects pre-shared-key auth with
    /// `secret` as the key; client id and nickname are then unused.
    pub fn from_pin(pin: &str, client_id: impl Into<String>, nickname: impl Into<String>) -> Self {
        match pin.strip_prefix(PSK_PREFIX) {
            Some(key) => Self::PreSharedKey(SecretString::from(key.to_owned())),
            None => Self::Pin {
                pin: SecretString::from(pin.to_owned()),
                client_id: client_id.into(),
                nickname: nickname.into(),
            },
        }
    }

    /// Pre-shared-key credentials.
    pub fn psk(key: impl Into<String>) -> Self {
        Self::PreSharedKey(SecretString::from(key.into()))
    }

    pub fn strategy(&self) -> AuthStrategy {
        match self {
            Self::Pin { .. } => AuthStrategy::Pin,
            Self::PreSharedKey(_) => AuthStrategy::PreSharedKey,
        }
    }
}

/// Auth state held by a session.
#[derive(Debug, Clone, Default)]
pub(crate) enum AuthState {
    #[default]
    None,
    Pin(SecretString),
    PreSharedKey(SecretString),
}

impl AuthState {
    pub(crate) fn strategy(&self) -> AuthStrategy {
        match self {
            Self::None => AuthStrategy::None,
            Self::Pin(_) => AuthStrategy::Pin,
            Self::PreSharedKey(_) => AuthStrategy::PreSharedKey,
        }
    }

    /// Attach the current credentials to an outgoing request.
    pub(crate) fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::None => builder,
            Self::Pin(pin) => builder.basic_auth("", Some(pin.expose_secret())),
            Self::PreSharedKey(key) => builder.header("X-Auth-PSK", key.expose_secret()),
        }
    }
}
