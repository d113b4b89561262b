// `system` and `guide` service endpoints
//
// Power, device information, LED/WOL settings and the remote-controller
// code table. Power-on is a best-effort sequence across WOL, REST and IRCC.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::client::BraviaClient;
use crate::error::Error;
use crate::ircc::CODE_POWER_ON;
use crate::models::{LedStatus, RemoteCommand, ServiceApiInfo, SystemInfo};
use crate::rest::{RestRequest, Service, first_result, nth_result};

/// Power status is polled often; fail fast when the set is unreachable.
const POWER_STATUS_TIMEOUT: Duration = Duration::from_secs(5);

impl BraviaClient {
    /// Current power status (`"active"`, `"standby"`, ...).
    ///
    /// `system/getPowerStatus`; `"off"` when the answer carries no status.
    pub async fn get_power_status(&mut self) -> Result<String, Error> {
        let request =
            RestRequest::new(Service::System, "getPowerStatus").timeout(POWER_STATUS_TIMEOUT);
        let resp = self.send_rest_req(&request).await?;
        let result: Map<String, Value> = first_result(&resp)?.unwrap_or_default();
        Ok(result
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("off")
            .to_owned())
    }

    /// `system/getPowerSavingMode`; empty string when absent.
    pub async fn get_power_saving_mode(&mut self) -> Result<String, Error> {
        let resp = self
            .send_rest_req(&RestRequest::new(Service::System, "getPowerSavingMode"))
            .await?;
        let result: Map<String, Value> = first_result(&resp)?.unwrap_or_default();
        Ok(result
            .get("mode")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned())
    }

    /// `system/getSystemInformation` as the raw `result[0]` value.
    ///
    /// `Null` when the device answered without a result. Captures the MAC
    /// address if the session has none yet.
    pub(crate) async fn system_info_raw(&mut self) -> Result<Value, Error> {
        let resp = self
            .send_rest_req(&RestRequest::new(Service::System, "getSystemInformation"))
            .await?;
        let result = resp
            .get("result")
            .and_then(|result| result.get(0))
            .cloned()
            .unwrap_or(Value::Null);
        self.remember_mac(result.get("macAddr").and_then(Value::as_str));
        Ok(result)
    }

    /// General information about the device.
    ///
    /// `system/getSystemInformation`; all fields `None` when the device
    /// returns no result.
    pub async fn get_system_info(&mut self) -> Result<SystemInfo, Error> {
        let raw = self.system_info_raw().await?;
        if raw.is_null() {
            return Ok(SystemInfo::default());
        }
        serde_json::from_value(raw.clone()).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: raw.to_string(),
        })
    }

    /// Supported services and their APIs.
    ///
    /// `guide/getSupportedApiInfo` with `{"services": [...]}`
    pub async fn get_api_info(&mut self, services: &[&str]) -> Result<Vec<ServiceApiInfo>, Error> {
        let request = RestRequest::new(Service::Guide, "getSupportedApiInfo")
            .params(json!({ "services": services }));
        let resp = self.send_rest_req(&request).await?;
        Ok(first_result(&resp)?.unwrap_or_default())
    }

    /// Whether Wake-on-LAN is enabled. `system/getWolMode`
    pub async fn get_wol_mode(&mut self) -> Result<bool, Error> {
        let resp = self
            .send_rest_req(&RestRequest::new(Service::System, "getWolMode"))
            .await?;
        let result: Map<String, Value> = first_result(&resp)?.unwrap_or_default();
        Ok(result
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    /// `system/getLEDIndicatorStatus`
    pub async fn get_led_status(&mut self) -> Result<LedStatus, Error> {
        let resp = self
            .send_rest_req(&RestRequest::new(Service::System, "getLEDIndicatorStatus"))
            .await?;
        Ok(first_result(&resp)?.unwrap_or_default())
    }

    /// IRCC buttons known to the device's remote.
    ///
    /// `system/getRemoteControllerInfo`; the code table is `result[1]`.
    pub async fn get_remote_info(&mut self) -> Result<Vec<RemoteCommand>, Error> {
        let resp = self
            .send_rest_req(&RestRequest::new(Service::System, "getRemoteControllerInfo"))
            .await?;
        Ok(nth_result(&resp, 1)?.unwrap_or_default())
    }

    /// IRCC command table as name → code.
    pub async fn get_command_list(&mut self) -> Result<HashMap<String, String>, Error> {
        Ok(self
            .get_remote_info()
            .await?
            .into_iter()
            .map(|cmd| (cmd.name, cmd.value))
            .collect())
    }

    /// Look up an IRCC code by button name.
    ///
    /// The table is fetched once per session and kept until
    /// [`disconnect`](Self::disconnect).
    pub async fn get_command_code(&mut self, command: &str) -> Result<Option<String>, Error> {
        if self.commands.is_empty() {
            self.commands = self.get_command_list().await?;
            debug!(count = self.commands.len(), "cached IRCC command table");
        }
        Ok(self.commands.get(command).cloned())
    }

    /// `system/setWolMode` with `{"enabled": mode}`
    pub async fn set_wol_mode(&mut self, mode: bool) -> Result<bool, Error> {
        let request = RestRequest::new(Service::System, "setWolMode").params(json!({ "enabled": mode }));
        self.send_rest_quick(&request).await
    }

    /// `system/setLEDIndicatorStatus` (v1.1) with `{"mode", "status"}`
    pub async fn set_led_status(&mut self, mode: &str, status: Option<&str>) -> Result<bool, Error> {
        let request = RestRequest::new(Service::System, "setLEDIndicatorStatus")
            .params(json!({ "mode": mode, "status": status }))
            .version("1.1");
        self.send_rest_quick(&request).await
    }

    /// `system/setPowerStatus` with `{"status": status}`
    pub async fn set_power_status(&mut self, status: bool) -> Result<bool, Error> {
        let request =
            RestRequest::new(Service::System, "setPowerStatus").params(json!({ "status": status }));
        self.send_rest_quick(&request).await
    }

    /// `system/setPowerSavingMode` with `{"mode": mode}`
    pub async fn set_power_saving_mode(&mut self, mode: &str) -> Result<bool, Error> {
        let request =
            RestRequest::new(Service::System, "setPowerSavingMode").params(json!({ "mode": mode }));
        self.send_rest_quick(&request).await
    }

    /// Power the set on.
    ///
    /// Sends a Wake-on-LAN packet, then, unless the set already reports
    /// `"active"`, asks for power via REST and presses the IRCC power
    /// button. WOL, REST and IRCC failures are logged and ignored; only the
    /// power-status query can fail the call.
    pub async fn turn_on(&mut self) -> Result<bool, Error> {
        if let Err(err) = self.send_wol_req().await {
            warn!(error = %err, "Wake-on-LAN failed (ignored)");
        }

        if self.get_power_status().await? != "active" {
            if let Err(err) = self.set_power_status(true).await {
                warn!(error = %err, "setPowerStatus failed (ignored)");
            }
            if let Err(err) = self.send_ircc_req(CODE_POWER_ON).await {
                warn!(error = %err, "IRCC power code failed (ignored)");
            }
        }
        Ok(true)
    }

    /// `system/setPowerStatus` with `{"status": false}`
    pub async fn turn_off(&mut self) -> Result<bool, Error> {
        self.set_power_status(false).await
    }

    /// `system/requestReboot`
    pub async fn reboot(&mut self) -> Result<bool, Error> {
        self.send_rest_quick(&RestRequest::new(Service::System, "requestReboot"))
            .await
    }
}
