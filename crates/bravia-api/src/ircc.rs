// IRCC (infrared compatible control) over SOAP
//
// Remote-control button codes are injected through a fixed SOAP envelope
// posted to `/sony/ircc`. After a long idle period some sets silently drop
// the first code, so a zero-length "wake" code is sent ahead of real ones.

use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::client::{BraviaClient, Payload, Reply};
use crate::error::Error;

/// IRCC code of the remote's power button.
pub const CODE_POWER_ON: &str = "AAAAAQAAAAEAAAAuAw==";

const SOAP_ACTION: &str = "\"urn:schemas-sony-com:service:IRCC:1#X_SendIRCC\"";
const CONTENT_TYPE_XML: &str = "text/xml; charset=UTF-8";

/// The SOAP envelope carrying one IRCC code.
pub fn ircc_envelope(code: &str) -> String {
    format!(
        "<s:Envelope \
         xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\" \
         s:encodingStyle=\"http://schemas.xmlsoap.org/soap/encoding/\">\
         <s:Body>\
         <u:X_SendIRCC xmlns:u=\"urn:schemas-sony-com:service:IRCC:1\">\
         <IRCCCode>{code}</IRCCCode>\
         </u:X_SendIRCC>\
         </s:Body>\
         </s:Envelope>"
    )
}

/// Whether a wake ping is due before the next real code.
pub(crate) fn wake_due(last_wake: Option<Instant>, now: Instant, interval: Duration) -> bool {
    last_wake.is_none_or(|last| now.saturating_duration_since(last) > interval)
}

fn soap_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("SOAPACTION", HeaderValue::from_static(SOAP_ACTION));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_XML));
    headers
}

impl BraviaClient {
    /// Send one IRCC code with the session's default timeout.
    ///
    /// Returns `true` when the device accepted the code (HTTP 200) and
    /// `false` for any other non-error status.
    pub async fn send_ircc_req(&mut self, code: &str) -> Result<bool, Error> {
        let timeout = self.transport().timeout;
        self.send_ircc_req_with_timeout(code, timeout).await
    }

    /// Send one IRCC code, waking the endpoint first if it has been idle.
    pub async fn send_ircc_req_with_timeout(
        &mut self,
        code: &str,
        timeout: Duration,
    ) -> Result<bool, Error> {
        if !code.is_empty() {
            let now = Instant::now();
            if wake_due(self.last_ircc_wake, now, self.transport().ircc_wake_interval) {
                debug!("IRCC endpoint idle, sending wake ping");
                if let Err(err) = self.post_ircc("", timeout).await {
                    warn!(error = %err, "IRCC wake ping failed (ignored)");
                }
            }
            self.last_ircc_wake = Some(now);
        }

        self.post_ircc(code, timeout).await
    }

    async fn post_ircc(&mut self, code: &str, timeout: Duration) -> Result<bool, Error> {
        let url = self.ircc_url()?;
        debug!(code, "IRCC request");
        match self
            .send_request(url, Payload::Xml(ircc_envelope(code)), soap_headers(), timeout)
            .await?
        {
            Reply::Raw(accepted) => Ok(accepted),
            Reply::Json(_) => Ok(true),
        }
    }
}
