//! Async client for the local control API of Sony Bravia televisions.
//!
//! A [`BraviaClient`] models one remote session with one TV:
//!
//! - **Auth**: PIN registration ([`Credentials::Pin`], with
//!   [`BraviaClient::pair`] to trigger the on-screen PIN) or a pre-shared
//!   key ([`Credentials::PreSharedKey`]). The two are mutually exclusive.
//! - **REST**: JSON-RPC style calls to `/sony/<service>` via
//!   [`BraviaClient::send_rest_req`] and [`BraviaClient::send_rest_quick`],
//!   wrapped by typed convenience methods (power, volume, apps, content).
//! - **IRCC**: remote-control codes posted as SOAP to `/sony/ircc`, with
//!   a wake-up ping ahead of the first code after an idle period.
//! - **Wake-on-LAN**: magic packet broadcast for sets in deep standby.
//!
//! ```no_run
//! use bravia_api::{BraviaClient, Credentials, Error};
//!
//! # async fn demo() -> Result<(), Error> {
//! let mut client = BraviaClient::new("192.168.1.100")?;
//! let mut session = client.scoped();
//! session.connect(Credentials::psk("sony")).await?;
//! println!("power: {}", session.get_power_status().await?);
//! session.send_command("Home").await?;
//! # Ok(())
//! # }
//! ```

pub mod app_control;
pub mod audio;
pub mod auth;
pub mod av_content;
pub mod client;
pub mod cookies;
pub mod error;
pub mod ircc;
pub mod models;
pub mod remote;
pub mod rest;
pub mod system;
pub mod transport;
pub mod video;
pub mod wol;

pub use audio::{DEFAULT_AUDIO_TARGET, VolumeOptions};
pub use auth::{AuthStrategy, Credentials, PAIR_PIN};
pub use av_content::CONTENT_PAGE_SIZE;
pub use client::{BraviaClient, ScopedSession, SessionState};
pub use cookies::{DeviceCookieJar, normalize_cookie};
pub use error::Error;
pub use ircc::CODE_POWER_ON;
pub use models::{
    App, Content, ExternalInput, LedStatus, PictureSetting, PlayingInfo, RemoteCommand,
    ServiceApiInfo, SystemInfo, VolumeInfo,
};
pub use rest::{DEFAULT_VERSION, Params, RestRequest, Service};
pub use transport::{TlsMode, TransportConfig};
