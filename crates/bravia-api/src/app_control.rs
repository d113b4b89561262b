// `appControl` service endpoints

use serde_json::{Value, json};

use crate::client::BraviaClient;
use crate::error::Error;
use crate::models::App;
use crate::rest::{RestRequest, Service, first_result};

impl BraviaClient {
    /// Installed applications. `appControl/getApplicationList`
    pub async fn get_app_list(&mut self) -> Result<Vec<App>, Error> {
        let resp = self
            .send_rest_req(&RestRequest::new(Service::AppControl, "getApplicationList"))
            .await?;
        Ok(first_result(&resp)?.unwrap_or_default())
    }

    /// Launch an application. `appControl/setActiveApp` with `{"uri": uri}`
    pub async fn set_active_app(&mut self, uri: &str) -> Result<bool, Error> {
        let request =
            RestRequest::new(Service::AppControl, "setActiveApp").params(json!({ "uri": uri }));
        self.send_rest_quick(&request).await
    }

    /// Type into the focused software-keyboard field.
    ///
    /// `appControl/setTextForm`; the text is sent as a bare string param.
    pub async fn set_text_form(&mut self, text: &str) -> Result<bool, Error> {
        let request = RestRequest::new(Service::AppControl, "setTextForm")
            .params(Value::String(text.to_owned()));
        self.send_rest_quick(&request).await
    }

    /// Close every running application. `appControl/terminateApps`
    pub async fn terminate_apps(&mut self) -> Result<bool, Error> {
        self.send_rest_quick(&RestRequest::new(Service::AppControl, "terminateApps"))
            .await
    }
}
