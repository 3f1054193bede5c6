use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ecobot_core::{InboundMessage, MediaRef, Outcome};
use serde::Deserialize;
use tracing::{error, info};

use crate::app::AppState;

/// Body returned when handling a message failed.
pub(crate) const INTERNAL_ERROR: &str = "Internal error.";

/// Form fields Twilio posts for an incoming WhatsApp message.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct TwilioWebhook {
    pub(crate) message_sid: Option<String>,
    pub(crate) from: String,
    pub(crate) to: Option<String>,
    pub(crate) body: Option<String>,
    pub(crate) num_media: Option<u32>,
    pub(crate) media_url0: Option<String>,
    pub(crate) media_content_type0: Option<String>,
}

impl TwilioWebhook {
    pub(crate) fn into_message(self) -> InboundMessage {
        let has_media = self.num_media != Some(0);
        let media = self
            .media_url0
            .filter(|url| has_media && !url.trim().is_empty())
            .map(|url| MediaRef {
                url,
                content_type: self
                    .media_content_type0
                    .filter(|content_type| !content_type.trim().is_empty()),
            });

        InboundMessage {
            id: self.message_sid,
            from: self.from,
            to: self.to,
            body: self.body,
            media,
        }
    }
}

pub(crate) async fn receive(
    State(state): State<AppState>,
    Form(form): Form<TwilioWebhook>,
) -> Response {
    let message = form.into_message();
    info!(
        id = ?message.id,
        from = %message.from,
        media_url = ?message.media.as_ref().map(|media| &media.url),
        media_type = ?message.media.as_ref().and_then(|media| media.content_type.as_deref()),
        "message received"
    );

    match state.service.handle(&message).await {
        Ok(Outcome::Prompted(prompt)) => (StatusCode::OK, prompt).into_response(),
        Ok(Outcome::Replied { .. } | Outcome::Unrecognized { .. }) => {
            StatusCode::OK.into_response()
        }
        Err(err) => {
            error!(
                from = %message.from,
                stage = %err.stage,
                notified = err.notified,
                error = %err.source,
                "webhook handling failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response()
        }
    }
}
