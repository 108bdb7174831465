// Robot webservice HTTP client
//
// Wraps `reqwest::Client` with basic authentication, URL construction,
// form encoding, and error-envelope parsing. Endpoint groups (firewall,
// vswitch) are implemented as inherent methods in separate files to keep
// this module focused on transport mechanics.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::FormFields;
use crate::error::Error;
use crate::models::ErrorEnvelope;
use crate::transport::TransportConfig;

/// Production webservice endpoint.
pub const DEFAULT_BASE_URL: &str = "https://robot-ws.your-server.de";

/// Raw HTTP client for the Robot webservice.
///
/// Every request carries HTTP basic auth. Mutations are sent as
/// `application/x-www-form-urlencoded` bodies; responses are JSON.
/// Nothing is cached and nothing is retried.
pub struct RobotClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl RobotClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(
        base_url: Url,
        username: String,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, username, password))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        username: String,
        password: SecretString,
    ) -> Self {
        Self {
            http,
            base_url,
            username,
            password,
        }
    }

    /// The webservice base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The account the client authenticates as.
    pub fn username(&self) -> &str {
        &self.username
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an endpoint path such as `firewall/1.2.3.4`.
    pub(crate) fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.username, Some(self.password.expose_secret()))
    }

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let body = self.execute(self.authed(self.http.get(url))).await?;
        decode(&body)
    }

    /// Send a POST request with a form body, returning the raw response body.
    pub(crate) async fn post_form(&self, url: Url, form: &FormFields) -> Result<String, Error> {
        debug!(fields = form.len(), "POST {}", url);
        self.execute(self.authed(self.http.post(url).form(form)))
            .await
    }

    /// Send a DELETE request with a form body, returning the raw response body.
    pub(crate) async fn delete_form(&self, url: Url, form: &FormFields) -> Result<String, Error> {
        debug!(fields = form.len(), "DELETE {}", url);
        self.execute(self.authed(self.http.delete(url).form(form)))
            .await
    }

    /// Send the request and gate on the response status.
    ///
    /// Any non-2xx status is an error. When the body carries a Robot error
    /// envelope its code and message are preserved.
    async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<String, Error> {
        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        trace!(%status, bytes = body.len(), "response received");

        if status.is_success() {
            return Ok(body);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: format!("hetzner webservice response status {}", status.as_u16()),
            });
        }

        Err(api_error(status.as_u16(), &body))
    }
}

/// Build an `Error::Api` from a non-success response body.
fn api_error(status: u16, body: &str) -> Error {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => Error::Api {
            status: envelope.error.status.unwrap_or(status),
            code: envelope.error.code,
            message: envelope.error.message.unwrap_or_else(|| preview(body)),
        },
        Err(_) => Error::Api {
            status,
            code: None,
            message: preview(body),
        },
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> RobotClient {
        RobotClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            "user".into(),
            SecretString::from("pass".to_owned()),
        )
    }

    #[test]
    fn endpoint_url_joins_without_double_slash() {
        let c = client("https://robot-ws.your-server.de/");
        let url = c.endpoint_url("/firewall/1.2.3.4").unwrap();
        assert_eq!(url.as_str(), "https://robot-ws.your-server.de/firewall/1.2.3.4");
    }

    #[test]
    fn endpoint_url_keeps_base_path() {
        let c = client("http://127.0.0.1:8080/robot");
        let url = c.endpoint_url("vswitch/12/server").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/robot/vswitch/12/server");
    }

    #[test]
    fn api_error_parses_envelope() {
        let err = api_error(
            404,
            r#"{"error":{"status":404,"code":"FIREWALL_NOT_FOUND","message":"Firewall not found"}}"#,
        );
        match err {
            Error::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 404);
                assert_eq!(code.as_deref(), Some("FIREWALL_NOT_FOUND"));
                assert_eq!(message, "Firewall not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn api_error_falls_back_to_body_preview() {
        let err = api_error(500, "Internal Server Error");
        assert!(matches!(
            err,
            Error::Api { status: 500, code: None, ref message } if message == "Internal Server Error"
        ));
    }
}
