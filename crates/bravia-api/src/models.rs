// Response models
//
// The REST API nests the interesting payload in `result[0]`. Field sets
// vary across firmware generations, so every field is optional or
// defaulted and unknown fields are kept in `extra` where useful.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `system/getSystemInformation` result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub product: Option<String>,
    pub region: Option<String>,
    pub language: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub mac_addr: Option<String>,
    pub name: Option<String>,
    pub generation: Option<String>,
    pub area: Option<String>,
    pub cid: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `system/getLEDIndicatorStatus` result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LedStatus {
    #[serde(default)]
    pub mode: String,
    pub status: Option<String>,
}

/// One entry of `guide/getSupportedApiInfo`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceApiInfo {
    pub service: String,
    pub protocols: Vec<String>,
    pub apis: Vec<Value>,
}

/// One IRCC button from `system/getRemoteControllerInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemoteCommand {
    pub name: String,
    pub value: String,
}

/// One audio output from `audio/getVolumeInformation`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeInfo {
    pub target: String,
    pub volume: i64,
    pub mute: bool,
    pub max_volume: i64,
    pub min_volume: i64,
}

/// One installed application from `appControl/getApplicationList`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct App {
    pub title: String,
    pub uri: String,
    pub icon: String,
    pub data: Option<String>,
}

/// One item of `avContent/getContentList`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
    pub index: Option<u64>,
    pub disp_num: Option<String>,
    pub program_media_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One input of `avContent/getCurrentExternalInputsStatus`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExternalInput {
    pub uri: String,
    pub title: String,
    pub connection: bool,
    pub label: String,
    pub icon: String,
    pub status: Option<String>,
}

/// `avContent/getPlayingContentInfo` result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayingInfo {
    pub uri: Option<String>,
    pub source: Option<String>,
    pub title: Option<String>,
    pub disp_num: Option<String>,
    pub program_title: Option<String>,
    pub start_date_time: Option<String>,
    pub duration_sec: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of `video/getPictureQualitySettings`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PictureSetting {
    pub target: String,
    pub current_value: String,
    pub is_available: bool,
    pub candidate: Vec<Value>,
}
