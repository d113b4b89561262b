// Transport configuration for building the session's reqwest::Client.
//
// The client is created lazily by the session and shares the session's
// cookie store, so one connection pool and one jar serve every call.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use crate::cookies::DeviceCookieJar;
use crate::error::Error;

/// Per-request deadline applied when a call does not override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Idle period after which the IRCC endpoint needs a wake-up ping.
pub const DEFAULT_IRCC_WAKE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Wake-on-LAN discard port.
pub const WOL_PORT: u16 = 9;

/// TLS verification mode for `https://` base URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Accept any certificate (Bravia sets ship self-signed certificates).
    DangerAcceptInvalid,
}

/// Transport settings shared by every request of a session.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub user_agent: String,
    /// See [`DEFAULT_IRCC_WAKE_INTERVAL`].
    pub ircc_wake_interval: Duration,
    /// Destination of the magic packet.
    pub wol_target: SocketAddr,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("bravia-api/", env!("CARGO_PKG_VERSION")).to_owned(),
            ircc_wake_interval: DEFAULT_IRCC_WAKE_INTERVAL,
            wol_target: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::BROADCAST, WOL_PORT)),
        }
    }
}

impl TransportConfig {
    /// Build a pooled `reqwest::Client` wired to the session's cookie store.
    pub fn build_client(&self, cookie_jar: &Arc<DeviceCookieJar>) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .cookie_provider(Arc::clone(cookie_jar));

        if self.tls == TlsMode::DangerAcceptInvalid {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {e}")))
    }

    /// Override the default request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the IRCC wake interval.
    pub fn with_ircc_wake_interval(mut self, interval: Duration) -> Self {
        self.ircc_wake_interval = interval;
        self
    }

    /// Override where the Wake-on-LAN packet is sent.
    pub fn with_wol_target(mut self, target: SocketAddr) -> Self {
        self.wol_target = target;
        self
    }
}
