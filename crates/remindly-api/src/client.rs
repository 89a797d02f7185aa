// Remind API HTTP client
//
// Wraps `reqwest::Client` with Remind-specific URL construction, token
// header injection and status-code mapping. Endpoint methods are thin:
// each builds a URL, sends, and hands the response to `parse_json`.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::AUTH_HEADER;
use crate::error::Error;
use crate::models::{Customer, DeviceStatus, DeviceStatusReply, LocationList, LoginResponse};
use crate::transport::TransportConfig;

/// Production endpoint of the Remind mobile API.
pub const DEFAULT_BASE_URL: &str = "https://remind.rainsoft.com/api/remindapp/v2";

const BODY_PREVIEW_LEN: usize = 200;

/// Raw HTTP client for the Remind cloud API.
///
/// Stateless apart from the connection pool: tokens are passed in on every
/// call and never cached here.
#[derive(Debug, Clone)]
pub struct RemindClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RemindClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client against the production endpoint.
    pub fn production(transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(DEFAULT_BASE_URL)?;
        Self::new(base_url, transport)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Exchange email/password for an auth token.
    ///
    /// Success requires HTTP 200 and a non-empty `authentication_token`.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SecretString, Error> {
        let url = self.url(&["login"]);
        debug!("logging in at {}", url);

        let form = [("email", email), ("password", password.expose_secret())];
        let resp = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
            });
        }

        let body: LoginResponse = decode(resp).await?;
        match body.authentication_token {
            Some(token) => {
                debug!("login successful");
                Ok(SecretString::from(token))
            }
            None => Err(Error::Authentication {
                message: "login response missing authentication_token".into(),
            }),
        }
    }

    /// Fetch the account record behind a token.
    pub async fn customer(&self, token: &SecretString) -> Result<Customer, Error> {
        self.get_json(self.url(&["customer"]), token).await
    }

    /// Fetch the locations (and their devices) registered to a customer.
    pub async fn locations(
        &self,
        token: &SecretString,
        customer_id: &str,
    ) -> Result<LocationList, Error> {
        self.get_json(self.url(&["locations", customer_id]), token)
            .await
    }

    /// Ask the vendor to refresh the device's cached telemetry.
    pub async fn force_update(&self, token: &SecretString) -> Result<(), Error> {
        let url = self.url(&["forceupdate"]);
        debug!("GET {}", url);

        let resp = self.authed_get(url, token).await?;
        let status = resp.status();
        if status == StatusCode::OK {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }

    /// Fetch the device status, never failing.
    ///
    /// The HTTP status is always returned so the caller can branch on it;
    /// transport failures are reported as status `0`.
    pub async fn device_status(&self, token: &SecretString, device_id: &str) -> DeviceStatusReply {
        let url = self.url(&["device", device_id]);
        debug!("GET {}", url);

        let resp = match self.authed_get(url, token).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "device status request failed");
                return DeviceStatusReply::transport_failure();
            }
        };

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            debug!(status, body = %preview(&body), "device status returned non-200");
            return DeviceStatusReply { status, data: None };
        }

        match decode::<DeviceStatus>(resp).await {
            Ok(data) => DeviceStatusReply {
                status,
                data: Some(data),
            },
            Err(e) => {
                warn!(error = %e, "device status body unreadable");
                DeviceStatusReply { status, data: None }
            }
        }
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Append `segments` to the base path, percent-encoding each one, so
    /// ids coming back from the vendor cannot add path components.
    pub(crate) fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Only cannot-be-a-base URLs refuse segments; an http base never does.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn authed_get(&self, url: Url, token: &SecretString) -> Result<reqwest::Response, Error> {
        self.http
            .get(url)
            .header(AUTH_HEADER, token.expose_secret())
            .send()
            .await
            .map_err(Error::Transport)
    }

    /// Authenticated GET that decodes a JSON body on HTTP 200.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &SecretString,
    ) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.authed_get(url, token).await?;
        parse_json(resp).await
    }
}

/// Map a response into `T`, or into the error its status implies.
async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status != StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        return Err(status_error(status, &body));
    }
    decode(resp).await
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await.map_err(Error::Transport)?;
    trace!(len = body.len(), "decoding response body");
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    })
}

fn status_error(status: StatusCode, body: &str) -> Error {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Error::RejectedToken {
            status: status.as_u16(),
        },
        _ => Error::Api {
            status: status.as_u16(),
            message: preview(body).to_owned(),
        },
    }
}

/// First `BODY_PREVIEW_LEN` bytes of a body, cut on a char boundary.
fn preview(body: &str) -> &str {
    if body.len() <= BODY_PREVIEW_LEN {
        return body;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
