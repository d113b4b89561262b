// `video` service endpoints: picture quality settings.

use serde_json::json;

use crate::client::BraviaClient;
use crate::error::Error;
use crate::models::PictureSetting;
use crate::rest::{RestRequest, Service, first_result};

impl BraviaClient {
    /// Picture quality settings, optionally narrowed to one `target`
    /// (`"brightness"`, `"color"`, `"pictureMode"`, ...).
    ///
    /// `video/getPictureQualitySettings`
    pub async fn get_picture_setting(
        &mut self,
        target: Option<&str>,
    ) -> Result<Vec<PictureSetting>, Error> {
        let request = RestRequest::new(Service::Video, "getPictureQualitySettings")
            .params(json!({ "target": target.unwrap_or_default() }));
        let resp = self.send_rest_req(&request).await?;
        Ok(first_result(&resp)?.unwrap_or_default())
    }

    /// Change one picture quality setting.
    ///
    /// `video/setPictureQualitySettings` with
    /// `{"settings": [{"target", "value"}]}`
    pub async fn set_picture_setting(&mut self, target: &str, value: &str) -> Result<bool, Error> {
        let request = RestRequest::new(Service::Video, "setPictureQualitySettings")
            .params(json!({ "settings": [{ "target": target, "value": value }] }));
        self.send_rest_quick(&request).await
    }
}
