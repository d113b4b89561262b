// Bravia device session
//
// Owns the HTTP transport, cookie store, auth state and IRCC command cache
// for one TV. All REST and IRCC traffic funnels through `send_request`,
// which attaches credentials and classifies the response. Endpoint wrappers
// live as inherent methods in the service modules.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::header::{CACHE_CONTROL, CONNECTION, HeaderMap};
use serde_json::{Map, Value, json};
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::{AuthState, AuthStrategy, Credentials, PAIR_PIN};
use crate::cookies::DeviceCookieJar;
use crate::error::Error;
use crate::rest::{RestRequest, Service};
use crate::transport::TransportConfig;

/// Marker the firmware puts in `error` when the panel is in standby.
const NOT_POWER_ON: &str = "not power-on";

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Request body handed to the transport primitive.
pub(crate) enum Payload {
    Json(Value),
    Xml(String),
}

/// Classified outcome of a request that did not fail.
pub(crate) enum Reply {
    /// Parsed JSON body (HTTP 200) or an empty object (other statuses).
    Json(Value),
    /// Raw-mode success marker: `true` for HTTP 200.
    Raw(bool),
}

/// Remote-control session for one Bravia TV.
///
/// Created empty for a host, then [`connect`](Self::connect)ed with a PIN
/// or pre-shared key. The session is not meant to be shared: every
/// lifecycle and command method takes `&mut self`, so callers serialize
/// access by construction.
#[derive(Debug)]
pub struct BraviaClient {
    base_url: Url,
    mac: Option<String>,
    transport: TransportConfig,
    http: Option<reqwest::Client>,
    cookie_jar: Arc<DeviceCookieJar>,
    auth: AuthState,
    state: SessionState,
    /// IRCC command name → code, filled on first lookup.
    pub(crate) commands: HashMap<String, String>,
    pub(crate) last_ircc_wake: Option<Instant>,
}

impl BraviaClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Create a session for `host` (an IP or hostname, optionally with
    /// `:port`), reached over plain HTTP.
    pub fn new(host: &str) -> Result<Self, Error> {
        let base_url = Url::parse(&format!("http://{host}"))?;
        Ok(Self::with_base_url(base_url, TransportConfig::default()))
    }

    /// Create a session for an explicit base URL (e.g. `https://tv.lan`).
    pub fn with_base_url(base_url: Url, transport: TransportConfig) -> Self {
        Self {
            base_url,
            mac: None,
            transport,
            http: None,
            cookie_jar: Arc::new(DeviceCookieJar::new()),
            auth: AuthState::None,
            state: SessionState::Disconnected,
            commands: HashMap::new(),
            last_ircc_wake: None,
        }
    }

    /// Set the MAC address used for Wake-on-LAN.
    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac = Some(mac.into());
        self
    }

    /// Replace the transport settings. Takes effect for the next transport.
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Device address as `host[:port]`.
    pub fn host(&self) -> &str {
        &self.base_url[url::Position::BeforeHost..url::Position::AfterPort]
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn mac(&self) -> Option<&str> {
        self.mac.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn auth_strategy(&self) -> AuthStrategy {
        self.auth.strategy()
    }

    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// Whether an HTTP transport is currently open.
    pub fn has_transport(&self) -> bool {
        self.http.is_some()
    }

    /// The session's cookie store.
    pub fn cookie_jar(&self) -> &DeviceCookieJar {
        &self.cookie_jar
    }

    /// Number of cached IRCC command names.
    pub fn cached_command_count(&self) -> usize {
        self.commands.len()
    }

    pub(crate) fn remember_mac(&mut self, mac: Option<&str>) {
        if self.mac.is_none() {
            if let Some(mac) = mac.filter(|m| !m.is_empty()) {
                debug!(mac, "captured device MAC address");
                self.mac = Some(mac.to_owned());
            }
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/sony/{service}`
    pub(crate) fn service_url(&self, service: Service) -> Result<Url, Error> {
        Ok(self.base_url.join(&format!("sony/{service}"))?)
    }

    /// `{base}/sony/ircc`
    pub(crate) fn ircc_url(&self) -> Result<Url, Error> {
        Ok(self.base_url.join("sony/ircc")?)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Establish the session and probe the device.
    ///
    /// PSK credentials switch the session to header auth and drop any
    /// basic-auth state and cookies; PIN credentials run
    /// [`register`](Self::register). Either way a system-information query
    /// follows: a missing, `null`, `false`, zero or empty `result[0]` means
    /// the device does not expose the API and fails with
    /// [`Error::NotSupported`]. Any other value, object or not, counts as an
    /// answer. On failure the session is left disconnected with no
    /// credentials.
    pub async fn connect(&mut self, credentials: Credentials) -> Result<(), Error> {
        self.state = SessionState::Connecting;
        debug!(strategy = ?credentials.strategy(), host = self.host(), "connecting");

        match self.establish(credentials).await {
            Ok(()) => {
                self.state = SessionState::Connected;
                debug!(strategy = ?self.auth.strategy(), "connected");
                Ok(())
            }
            Err(err) => {
                debug!(error = %err, "connect failed");
                self.auth = AuthState::None;
                self.state = SessionState::Disconnected;
                Err(err)
            }
        }
    }

    async fn establish(&mut self, credentials: Credentials) -> Result<(), Error> {
        match credentials {
            Credentials::PreSharedKey(key) => {
                self.cookie_jar.clear();
                self.auth = AuthState::PreSharedKey(key);
            }
            Credentials::Pin {
                pin,
                client_id,
                nickname,
            } => {
                self.register_secret(pin, &client_id, &nickname).await?;
            }
        }

        // Probe: also captures the MAC address for later Wake-on-LAN.
        if !is_truthy(&self.system_info_raw().await?) {
            return Err(Error::NotSupported);
        }
        Ok(())
    }

    /// Register this client with the TV using a PIN.
    ///
    /// Sends `accessControl/actRegister` with basic auth (empty user, PIN as
    /// password) and asks the TV to enable Wake-on-LAN. The response plants
    /// the auth cookie used by later requests.
    pub async fn register(&mut self, pin: &str, client_id: &str, nickname: &str) -> Result<(), Error> {
        self.register_secret(pin.to_owned().into(), client_id, nickname)
            .await
    }

    async fn register_secret(
        &mut self,
        pin: secrecy::SecretString,
        client_id: &str,
        nickname: &str,
    ) -> Result<(), Error> {
        debug!(client_id, nickname, "registering with PIN");
        self.auth = AuthState::Pin(pin);
        let request = RestRequest::new(Service::AccessControl, "actRegister").params(vec![
            json!({"clientid": client_id, "nickname": nickname, "level": "private"}),
            json!([{"value": "yes", "function": "WOL"}]),
        ]);
        self.send_rest_req(&request).await?;
        Ok(())
    }

    /// Start pairing: the TV shows a PIN that is later passed to `connect`.
    ///
    /// Registers with the fixed [`PAIR_PIN`]; the device rejects it with an
    /// auth error, which is the expected outcome and is not reported.
    pub async fn pair(&mut self, client_id: &str, nickname: &str) -> Result<(), Error> {
        match self.register(PAIR_PIN, client_id, nickname).await {
            Ok(()) => Ok(()),
            Err(err @ Error::Authentication { .. }) => {
                debug!(error = %err, "pairing started, PIN prompt expected on screen");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Close the transport and forget credentials, cookies and cached
    /// commands. Safe to call on a disconnected session.
    pub fn disconnect(&mut self) {
        if self.http.take().is_some() {
            debug!(host = self.host(), "transport closed");
        }
        self.auth = AuthState::None;
        self.cookie_jar.clear();
        self.commands.clear();
        self.last_ircc_wake = None;
        self.state = SessionState::Disconnected;
    }

    /// Borrow the session for a scope that always ends in
    /// [`disconnect`](Self::disconnect), whichever way the scope is left.
    pub fn scoped(&mut self) -> ScopedSession<'_> {
        ScopedSession { client: self }
    }

    // ── Transport primitive ──────────────────────────────────────────

    fn http_client(&mut self) -> Result<reqwest::Client, Error> {
        if let Some(http) = &self.http {
            return Ok(http.clone());
        }
        debug!(host = self.host(), "opening transport");
        let http = self.transport.build_client(&self.cookie_jar)?;
        self.http = Some(http.clone());
        Ok(http)
    }

    /// POST one request and classify the response.
    ///
    /// - 200: JSON mode returns the parsed body (or [`Error::TurnedOff`] if
    ///   the body says the panel is off); raw mode returns `true`.
    /// - 404: [`Error::NotFound`]; 401/403: [`Error::Authentication`].
    /// - Any other status: an empty object / `false`.
    ///
    /// Cookies from the response are normalized into the session store by
    /// the transport. Never retries.
    pub(crate) async fn send_request(
        &mut self,
        url: Url,
        payload: Payload,
        headers: HeaderMap,
        timeout: Duration,
    ) -> Result<Reply, Error> {
        let http = self.http_client()?;
        let is_json = matches!(payload, Payload::Json(_));

        debug!(%url, strategy = ?self.auth.strategy(), "POST");

        let builder = http
            .post(url.clone())
            .headers(headers)
            .header(CACHE_CONTROL, "no-cache")
            .header(CONNECTION, "keep-alive")
            .timeout(timeout);
        let builder = match payload {
            Payload::Json(body) => builder.json(&body),
            Payload::Xml(body) => builder.body(body),
        };

        let resp = self
            .auth
            .apply(builder)
            .send()
            .await
            .map_err(|e| Error::from_send(e, timeout))?;

        let status = resp.status();
        debug!(status = status.as_u16(), "response");

        match status {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(Error::NotFound {
                    url: url.to_string(),
                });
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::Authentication {
                    status: status.as_u16(),
                });
            }
            other => {
                warn!(status = other.as_u16(), %url, "unexpected response status");
                return Ok(if is_json {
                    Reply::Json(Value::Object(Map::new()))
                } else {
                    Reply::Raw(false)
                });
            }
        }

        if !is_json {
            return Ok(Reply::Raw(true));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::from_send(e, timeout))?;
        let value: Value = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;
        trace!(%value, "response body");

        if signals_turned_off(&value) {
            return Err(Error::TurnedOff);
        }
        Ok(Reply::Json(value))
    }
}

/// Whether a probe answer counts as present: not `null`, `false`, zero,
/// or an empty string, array or object.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Whether a 200 body reports the panel as powered off.
///
/// Mirrors the firmware contract: `error` is normally an array such as
/// `[40005, "not power-on"]` and is matched element-wise; a string `error`
/// is matched by substring, an object by key.
fn signals_turned_off(body: &Value) -> bool {
    match body.get("error") {
        Some(Value::Array(items)) => items.iter().any(|item| item.as_str() == Some(NOT_POWER_ON)),
        Some(Value::String(message)) => message.contains(NOT_POWER_ON),
        Some(Value::Object(fields)) => fields.contains_key(NOT_POWER_ON),
        _ => false,
    }
}

// ── Scoped session ───────────────────────────────────────────────────

/// Guard returned by [`BraviaClient::scoped`].
///
/// Dereferences to the client; dropping it disconnects the session, so
/// normal returns, `?` early exits and unwinding all release the transport.
#[derive(Debug)]
pub struct ScopedSession<'a> {
    client: &'a mut BraviaClient,
}

impl Deref for ScopedSession<'_> {
    type Target = BraviaClient;

    fn deref(&self) -> &Self::Target {
        self.client
    }
}

impl DerefMut for ScopedSession<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.client
    }
}

impl Drop for ScopedSession<'_> {
    fn drop(&mut self) {
        self.client.disconnect();
    }
}
