// `audio` service endpoints

use serde_json::{Map, Value, json};

use crate::client::BraviaClient;
use crate::error::Error;
use crate::models::VolumeInfo;
use crate::rest::{DEFAULT_VERSION, RestRequest, Service, first_result};

/// Output addressed when the caller does not pick one.
pub const DEFAULT_AUDIO_TARGET: &str = "speaker";

/// Options for `audio/setAudioVolume`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeOptions {
    pub target: String,
    /// `ui` parameter (`"on"` shows the on-screen volume bar).
    pub ui_mode: Option<String>,
    pub version: String,
}

impl Default for VolumeOptions {
    fn default() -> Self {
        Self {
            target: DEFAULT_AUDIO_TARGET.to_owned(),
            ui_mode: None,
            version: DEFAULT_VERSION.to_owned(),
        }
    }
}

impl BraviaClient {
    /// Volume and mute state of every output. `audio/getVolumeInformation`
    pub async fn get_volume_info_full(&mut self) -> Result<Vec<VolumeInfo>, Error> {
        let resp = self
            .send_rest_req(&RestRequest::new(Service::Audio, "getVolumeInformation"))
            .await?;
        Ok(first_result(&resp)?.unwrap_or_default())
    }

    /// Volume information for `target`, falling back to the last output
    /// reported when none matches. `None` if the device lists no outputs.
    pub async fn get_volume_info(&mut self, target: &str) -> Result<Option<VolumeInfo>, Error> {
        let outputs = self.get_volume_info_full().await?;
        let matching = outputs.iter().position(|o| o.target == target);
        Ok(match matching {
            Some(index) => outputs.into_iter().nth(index),
            None => outputs.into_iter().last(),
        })
    }

    /// Set the volume. `level` is absolute (`"25"`) or relative (`"+2"`).
    ///
    /// `audio/setAudioVolume`
    pub async fn volume_level(&mut self, level: &str, options: &VolumeOptions) -> Result<bool, Error> {
        let mut params = Map::new();
        params.insert("target".into(), Value::String(options.target.clone()));
        params.insert("volume".into(), Value::String(level.to_owned()));
        if let Some(ui) = &options.ui_mode {
            params.insert("ui".into(), Value::String(ui.clone()));
        }
        let request = RestRequest::new(Service::Audio, "setAudioVolume")
            .params(Value::Object(params))
            .version(options.version.clone());
        self.send_rest_quick(&request).await
    }

    /// Raise the volume by `step`.
    pub async fn volume_up(&mut self, step: u32, options: &VolumeOptions) -> Result<bool, Error> {
        self.volume_level(&format!("+{step}"), options).await
    }

    /// Lower the volume by `step`.
    pub async fn volume_down(&mut self, step: u32, options: &VolumeOptions) -> Result<bool, Error> {
        self.volume_level(&format!("-{step}"), options).await
    }

    /// Set mute, or toggle the current state of the default output when
    /// `mute` is `None`.
    ///
    /// `audio/setAudioMute` with `{"status": mute}`
    pub async fn volume_mute(&mut self, mute: Option<bool>) -> Result<bool, Error> {
        let mute = match mute {
            Some(mute) => mute,
            None => !self
                .get_volume_info(DEFAULT_AUDIO_TARGET)
                .await?
                .is_some_and(|info| info.mute),
        };
        let request =
            RestRequest::new(Service::Audio, "setAudioMute").params(json!({ "status": mute }));
        self.send_rest_quick(&request).await
    }
}
