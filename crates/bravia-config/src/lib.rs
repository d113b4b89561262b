//! Device profiles for Bravia clients.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `bravia_api` connection inputs: a [`BraviaClient`]
//! with its [`TransportConfig`], plus the [`Credentials`] to connect with.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use bravia_api::{BraviaClient, Credentials, TlsMode, TransportConfig};

/// Keyring service name under which secrets are stored.
pub const KEYRING_SERVICE: &str = "bravia";

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "BRAVIA_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("unknown profile '{name}'")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    /// The file or a `BRAVIA_*` variable did not fit the schema.
    #[error("cannot load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name, falling back to `default_profile`.
    pub fn profile<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .ok_or_else(|| ConfigError::UnknownProfile { name: String::new() })?;
        self.profiles
            .get(name)
            .map(|profile| (name, profile))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Accept self-signed certificates on `https://` hosts.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Client id registered with the TV during PIN pairing.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Name the TV shows for this client in its device list.
    #[serde(default = "default_nickname")]
    pub nickname: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: default_insecure(),
            timeout: default_timeout(),
            client_id: default_client_id(),
            nickname: default_nickname(),
        }
    }
}

fn default_insecure() -> bool {
    true
}
fn default_timeout() -> u64 {
    10
}
fn default_client_id() -> String {
    "bravia-rs".into()
}
fn default_nickname() -> String {
    "bravia-rs".into()
}

/// A named device profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Host or address (e.g., "192.168.1.100"), or a full base URL.
    pub host: String,

    /// MAC address for Wake-on-LAN.
    pub mac: Option<String>,

    /// Pre-shared key (plaintext, prefer keyring or env var).
    pub psk: Option<String>,

    /// Environment variable name containing the pre-shared key.
    pub psk_env: Option<String>,

    /// PIN from a previous registration (plaintext, prefer keyring).
    pub pin: Option<String>,

    /// Override the registered client id.
    pub client_id: Option<String>,

    /// Override the registered nickname.
    pub nickname: Option<String>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Config file location: `$BRAVIA_CONFIG` if set, else `config.toml` in
/// the platform config dir, else `.bravia.toml` in the working directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "bravia", "bravia").map_or_else(
        || PathBuf::from(".bravia.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`, layered over defaults and under `BRAVIA_*`
/// environment variables (`BRAVIA_PROFILES__DEN__HOST=...`). A missing
/// file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BRAVIA_").ignore(&["config"]).split("__"))
        .extract()
        .map_err(|err| ConfigError::Load {
            path: path.to_owned(),
            source: Box::new(err),
        })
}

/// Load the canonical config, falling back to defaults on any error.
pub fn load_config_or_default() -> Config {
    load_or_default(&config_path())
}

/// Load config from `path`; a broken file is logged and replaced by
/// defaults.
pub fn load_or_default(path: &Path) -> Config {
    load_config_from(path).unwrap_or_else(|err| {
        warn!(error = %err, "using default config");
        Config::default()
    })
}

// ── Config saving ───────────────────────────────────────────────────

/// Write config to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Write config to `path` through a sibling staging file renamed into
/// place. On Unix the file is owner-only (`0600`); it may hold a PSK or PIN.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let write_err = |source: io::Error| ConfigError::Write {
        path: path.to_owned(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let contents = toml::to_string_pretty(cfg)?;
    let staging = path.with_extension("toml.tmp");
    std::fs::write(&staging, contents).map_err(write_err)?;
    restrict_to_owner(&staging).map_err(write_err)?;
    std::fs::rename(&staging, path).map_err(write_err)?;

    debug!(path = %path.display(), profiles = cfg.profiles.len(), "config saved");
    Ok(())
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> io::Result<()> {
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_secret(profile_name: &str, kind: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{kind}"))
        .ok()?
        .get_password()
        .ok()
}

/// Resolve a pre-shared key from the credential chain.
pub fn resolve_psk(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's psk_env → env var lookup
    if let Some(val) = profile.psk_env.as_deref().and_then(|name| std::env::var(name).ok()) {
        return Some(SecretString::from(val));
    }

    // 2. System keyring
    if let Some(secret) = keyring_secret(profile_name, "psk") {
        return Some(SecretString::from(secret));
    }

    // 3. Plaintext in config
    profile.psk.clone().map(SecretString::from)
}

/// Resolve a PIN from the keyring, then plaintext config.
pub fn resolve_pin(profile: &Profile, profile_name: &str) -> Option<String> {
    keyring_secret(profile_name, "pin").or_else(|| profile.pin.clone())
}

/// Resolve [`Credentials`] for a profile. A pre-shared key wins over a PIN.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<Credentials, ConfigError> {
    if let Some(key) = resolve_psk(profile, profile_name) {
        return Ok(Credentials::PreSharedKey(key));
    }

    if let Some(pin) = resolve_pin(profile, profile_name) {
        let client_id = profile.client_id.as_deref().unwrap_or(&defaults.client_id);
        let nickname = profile.nickname.as_deref().unwrap_or(&defaults.nickname);
        return Ok(Credentials::from_pin(&pin, client_id, nickname));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation to bravia-api ───────────────────────────────────────

/// Base URL for a profile's `host`: bare hosts get `http://`.
pub fn profile_base_url(profile: &Profile) -> Result<Url, ConfigError> {
    let raw = if profile.host.contains("://") {
        profile.host.clone()
    } else {
        format!("http://{}", profile.host)
    };
    let url: Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "host".into(),
        reason: format!("invalid host: {}", profile.host),
    })?;
    if url.host_str().is_none() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("missing host: {}", profile.host),
        });
    }
    Ok(url)
}

/// Build a `TransportConfig` from a profile and the global defaults.
pub fn transport_config(profile: &Profile, defaults: &Defaults) -> TransportConfig {
    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    };
    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    TransportConfig {
        tls,
        ..TransportConfig::default()
    }
    .with_timeout(timeout)
}

/// Build a disconnected client for a profile, plus the credentials to
/// pass to [`BraviaClient::connect`].
pub fn client_for_profile(
    config: &Config,
    profile_name: Option<&str>,
) -> Result<(BraviaClient, Credentials), ConfigError> {
    let (name, profile) = config.profile(profile_name)?;
    let base_url = profile_base_url(profile)?;
    let credentials = resolve_credentials(profile, name, &config.defaults)?;

    let mut client = BraviaClient::with_base_url(base_url, transport_config(profile, &config.defaults));
    if let Some(mac) = profile.mac.as_deref().filter(|mac| !mac.is_empty()) {
        client = client.with_mac(mac);
    }
    Ok((client, credentials))
}
