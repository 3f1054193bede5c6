//! Provider implementation for Twilio media downloads and WhatsApp delivery.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use ecobot_core::{
    model::{DeliveryReceipt, MediaContent, MediaRef, OutboundMessage},
    ports::{MediaPort, MessagingPort, PortError},
};

/// Public Twilio REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.twilio.com";

const SERVICE: &str = "twilio";
const WHATSAPP_PREFIX: &str = "whatsapp:";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Account credentials used for basic auth against Twilio.
#[derive(Clone)]
pub struct TwilioCredentials {
    /// Account SID (`AC…`).
    pub account_sid: String,
    /// Auth token paired with the SID.
    pub auth_token: String,
}

impl TwilioCredentials {
    /// Bundle an account SID with its auth token.
    #[must_use]
    pub fn new<S: Into<String>, T: Into<String>>(account_sid: S, auth_token: T) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
        }
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        req.basic_auth(&self.account_sid, Some(&self.auth_token))
    }
}

impl fmt::Debug for TwilioCredentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TwilioCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[redacted]")
            .finish()
    }
}

/// Message resource returned by `POST …/Messages.json`.
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

/// Error body Twilio sends with 4xx/5xx responses.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<u32>,
    message: String,
}

/// Media download implementation for attachments hosted by Twilio.
///
/// Account credentials are only sent when the media URL points at the
/// configured API host; any other host is fetched anonymously.
pub struct TwilioMediaPort {
    client: Client,
    credentials: TwilioCredentials,
    api_base: String,
}

impl TwilioMediaPort {
    /// Create a new media port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, credentials: TwilioCredentials) -> Self {
        Self {
            client,
            credentials,
            api_base: DEFAULT_API_BASE.to_owned(),
        }
    }

    /// Treat another API base URL as the host allowed to receive credentials.
    #[must_use]
    pub fn with_api_base<S: Into<String>>(mut self, api_base: S) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }

    fn is_api_host(&self, url: &Url) -> bool {
        Url::parse(&self.api_base).is_ok_and(|base| base.origin() == url.origin())
    }
}

#[async_trait]
impl MediaPort for TwilioMediaPort {
    async fn fetch(&self, media: &MediaRef) -> Result<MediaContent, PortError> {
        let url = Url::parse(&media.url)
            .map_err(|err| PortError::InvalidPayload(format!("media url: {err}")))?;

        let req = if self.is_api_host(&url) {
            self.credentials.authorize(self.client.get(url))
        } else {
            warn!(
                host = url.host_str().unwrap_or_default(),
                "media hosted outside the twilio api, fetching without credentials"
            );
            self.client.get(url)
        };
        let resp = ensure_success(req.send().await?).await?;

        let served_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        // The webhook's declared type wins; Twilio serves it from a redirect target
        // whose header is not always accurate.
        let content_type = media
            .content_type
            .clone()
            .filter(|declared| !declared.trim().is_empty())
            .or(served_type)
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_owned());

        let bytes = resp.bytes().await?.to_vec();
        debug!(url = %media.url, bytes = bytes.len(), %content_type, "media fetched");

        Ok(MediaContent {
            bytes,
            content_type,
        })
    }
}

/// Message delivery implementation using the Twilio Messages API.
pub struct TwilioMessagingPort {
    client: Client,
    credentials: TwilioCredentials,
    api_base: String,
}

impl TwilioMessagingPort {
    /// Create a new messaging port talking to the public Twilio API.
    #[must_use]
    pub fn new(client: Client, credentials: TwilioCredentials) -> Self {
        Self {
            client,
            credentials,
            api_base: DEFAULT_API_BASE.to_owned(),
        }
    }

    /// Point the port at another API base URL.
    #[must_use]
    pub fn with_api_base<S: Into<String>>(mut self, api_base: S) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.credentials.account_sid
        )
    }
}

#[async_trait]
impl MessagingPort for TwilioMessagingPort {
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, PortError> {
        let from = whatsapp_address(&message.from);
        let to = whatsapp_address(&message.to);

        let req = self
            .credentials
            .authorize(self.client.post(self.messages_url()))
            .form(&[
                ("From", from.as_str()),
                ("To", to.as_str()),
                ("Body", message.body.as_str()),
            ]);

        let resp = ensure_success(req.send().await?).await?;
        let resource: MessageResource = resp.json().await?;

        Ok(DeliveryReceipt {
            id: resource.sid,
            status: resource.status,
        })
    }
}

/// Prefix a bare phone number with the `whatsapp:` channel marker.
#[must_use]
pub fn whatsapp_address(address: &str) -> String {
    let trimmed = address.trim();
    if trimmed.starts_with(WHATSAPP_PREFIX) {
        trimmed.to_owned()
    } else {
        format!("{WHATSAPP_PREFIX}{trimmed}")
    }
}

// Turn non-2xx responses into a status error carrying Twilio's message when present.
async fn ensure_success(resp: Response) -> Result<Response, PortError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let body = match serde_json::from_str::<ApiError>(&text) {
        Ok(ApiError {
            code: Some(code),
            message,
        }) => format!("{message} (code {code})"),
        Ok(ApiError {
            code: None,
            message,
        }) => message,
        Err(_) => text,
    };

    Err(PortError::Status {
        service: SERVICE,
        status: status.as_u16(),
        body,
    })
}
