// `avContent` service endpoints
//
// Content lists are paged by the device; `get_content_list_full` walks
// `getContentCount` in fixed pages and concatenates in order.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::client::BraviaClient;
use crate::error::Error;
use crate::models::{Content, ExternalInput, PlayingInfo};
use crate::rest::{RestRequest, Service, first_result};

/// Items requested per `getContentList` page.
pub const CONTENT_PAGE_SIZE: usize = 50;

/// Collect `field` from every object in a result list.
fn pluck(items: Vec<Map<String, Value>>, field: &str) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|mut item| match item.remove(field) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        })
        .collect()
}

impl BraviaClient {
    /// URI schemes the device handles (`extInput`, `tv`, ...).
    ///
    /// `avContent/getSchemeList`
    pub async fn get_scheme_list(&mut self) -> Result<Vec<String>, Error> {
        let resp = self
            .send_rest_req(&RestRequest::new(Service::AvContent, "getSchemeList"))
            .await?;
        Ok(pluck(first_result(&resp)?.unwrap_or_default(), "scheme"))
    }

    /// Sources within a scheme. `avContent/getSourceList`
    pub async fn get_source_list(&mut self, scheme: &str) -> Result<Vec<String>, Error> {
        let request =
            RestRequest::new(Service::AvContent, "getSourceList").params(json!({ "scheme": scheme }));
        let resp = self.send_rest_req(&request).await?;
        Ok(pluck(first_result(&resp)?.unwrap_or_default(), "source"))
    }

    /// Number of items in a source; 0 when absent. `avContent/getContentCount`
    pub async fn get_content_count(&mut self, source: &str) -> Result<usize, Error> {
        let request =
            RestRequest::new(Service::AvContent, "getContentCount").params(json!({ "source": source }));
        let resp = self.send_rest_req(&request).await?;
        let result: Map<String, Value> = first_result(&resp)?.unwrap_or_default();
        Ok(result
            .get("count")
            .and_then(Value::as_u64)
            .and_then(|count| usize::try_from(count).ok())
            .unwrap_or(0))
    }

    /// One page of a source. `avContent/getContentList` with
    /// `{"source", "stIdx", "cnt"}`
    pub async fn get_content_list(
        &mut self,
        source: &str,
        index: usize,
        count: usize,
    ) -> Result<Vec<Content>, Error> {
        let request = RestRequest::new(Service::AvContent, "getContentList")
            .params(json!({ "source": source, "stIdx": index, "cnt": count }));
        let resp = self.send_rest_req(&request).await?;
        Ok(first_result(&resp)?.unwrap_or_default())
    }

    /// Every item of a source, fetched in pages of [`CONTENT_PAGE_SIZE`].
    pub async fn get_content_list_full(&mut self, source: &str) -> Result<Vec<Content>, Error> {
        let total = self.get_content_count(source).await?;
        debug!(source, total, "fetching content list");

        let mut items = Vec::with_capacity(total);
        for index in (0..total).step_by(CONTENT_PAGE_SIZE) {
            let count = CONTENT_PAGE_SIZE.min(total - index);
            items.extend(self.get_content_list(source, index, count).await?);
        }
        Ok(items)
    }

    /// Every item of every source in a scheme.
    pub async fn get_content_list_all(&mut self, scheme: &str) -> Result<Vec<Content>, Error> {
        let mut items = Vec::new();
        for source in self.get_source_list(scheme).await? {
            items.extend(self.get_content_list_full(&source).await?);
        }
        Ok(items)
    }

    /// Status of the external inputs (HDMI, composite, ...).
    ///
    /// `avContent/getCurrentExternalInputsStatus`; `version` selects the
    /// field set (`"1.1"` adds `status`).
    pub async fn get_external_status(&mut self, version: &str) -> Result<Vec<ExternalInput>, Error> {
        let request =
            RestRequest::new(Service::AvContent, "getCurrentExternalInputsStatus").version(version);
        let resp = self.send_rest_req(&request).await?;
        Ok(first_result(&resp)?.unwrap_or_default())
    }

    /// What is currently on screen. `avContent/getPlayingContentInfo`
    pub async fn get_playing_info(&mut self) -> Result<PlayingInfo, Error> {
        let resp = self
            .send_rest_req(&RestRequest::new(Service::AvContent, "getPlayingContentInfo"))
            .await?;
        Ok(first_result(&resp)?.unwrap_or_default())
    }

    /// `avContent/setPlayContent` with `{"uri": uri}`
    pub async fn set_play_content(&mut self, uri: &str) -> Result<bool, Error> {
        let request =
            RestRequest::new(Service::AvContent, "setPlayContent").params(json!({ "uri": uri }));
        self.send_rest_quick(&request).await
    }
}
