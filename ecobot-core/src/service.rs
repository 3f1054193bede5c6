//! Webhook pipeline: fetch media, classify, and reply.

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::classifier::classify;
use crate::clients::ServiceClients;
use crate::model::{Classification, DeliveryReceipt, InboundMessage, MediaRef, OutboundMessage};
use crate::ports::PortError;
use crate::reply::{self, Subject};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Switches selecting which pipeline variant handles a message.
pub struct PipelineOptions {
    /// Send attached images to the classification service.
    pub use_vision_model: bool,
    /// Classify the text body when there is no image to look at.
    pub use_text_fallback: bool,
    /// Append the educational note to classified replies.
    pub include_educational_note: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            use_vision_model: true,
            use_text_fallback: false,
            include_educational_note: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Pipeline step that talked to an external service.
pub enum Stage {
    /// Downloading the media attachment.
    FetchMedia,
    /// Sending the reply.
    Deliver,
}

impl fmt::Display for Stage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FetchMedia => "media fetch",
            Stage::Deliver => "message delivery",
        };
        formatter.write_str(name)
    }
}

#[derive(thiserror::Error, Debug)]
#[error("{stage} failed: {source}")]
/// Failure that aborted the handling of a message.
pub struct PipelineError {
    /// Step that failed.
    pub stage: Stage,
    /// Underlying service error.
    #[source]
    pub source: PortError,
    /// Whether the user was told about the failure.
    pub notified: bool,
}

impl PipelineError {
    fn at(stage: Stage) -> impl FnOnce(PortError) -> Self {
        move |source| Self {
            stage,
            source,
            notified: false,
        }
    }
}

#[derive(Debug)]
/// Result of handling one inbound message.
pub enum Outcome {
    /// Nothing to classify; the prompt is returned to the webhook caller.
    Prompted(&'static str),
    /// A classified reply was delivered.
    Replied {
        /// Label that was classified.
        label: String,
        /// Suggested category and note.
        classification: Classification,
        /// Delivery acknowledgment.
        receipt: DeliveryReceipt,
    },
    /// The image could not be classified; an apology was delivered.
    Unrecognized {
        /// Why the classification service gave no answer.
        reason: PortError,
        /// Delivery acknowledgment.
        receipt: DeliveryReceipt,
    },
}

/// Public entry point handling inbound messages.
pub struct EcoBotService {
    clients: ServiceClients,
    sender: String,
    options: PipelineOptions,
}

impl EcoBotService {
    /// Create a service replying from `sender` through the given clients.
    #[must_use]
    pub fn new<S: Into<String>>(
        clients: ServiceClients,
        sender: S,
        options: PipelineOptions,
    ) -> Self {
        Self {
            clients,
            sender: sender.into(),
            options,
        }
    }

    /// Options this service was built with.
    #[must_use]
    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Handle one inbound message end to end.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] when the media download or the reply
    /// delivery fails. A failure notice is sent to the user first when possible.
    pub async fn handle(&self, message: &InboundMessage) -> Result<Outcome, PipelineError> {
        debug!(
            from = %message.from,
            has_media = message.media.is_some(),
            "handling inbound message"
        );

        let result = match (&message.media, message.text()) {
            (Some(media), _) if self.options.use_vision_model => {
                self.reply_to_image(message, media).await
            }
            (_, Some(text)) if self.options.use_text_fallback => {
                self.reply_to_text(message, text).await
            }
            _ => {
                debug!(from = %message.from, "nothing to classify");
                return Ok(Outcome::Prompted(reply::missing_input_prompt(
                    self.options.use_text_fallback,
                )));
            }
        };

        match result {
            Ok(outcome) => Ok(outcome),
            Err(err) => Err(self.notify_failure(message, err).await),
        }
    }

    async fn reply_to_image(
        &self,
        message: &InboundMessage,
        media: &MediaRef,
    ) -> Result<Outcome, PipelineError> {
        let content = self
            .clients
            .media
            .fetch(media)
            .await
            .map_err(PipelineError::at(Stage::FetchMedia))?;
        debug!(
            bytes = content.bytes.len(),
            content_type = %content.content_type,
            "media downloaded"
        );

        let top = self
            .clients
            .vision
            .classify_image(&content)
            .await
            .and_then(|predictions| {
                predictions
                    .into_iter()
                    .next()
                    .ok_or(PortError::EmptyPrediction)
            });

        let prediction = match top {
            Ok(prediction) => prediction,
            Err(reason) => {
                warn!(from = %message.from, error = %reason, "image classification failed");
                let receipt = self
                    .deliver(&message.from, reply::UNRECOGNIZED_IMAGE.to_owned())
                    .await?;
                return Ok(Outcome::Unrecognized { reason, receipt });
            }
        };

        let classification = classify(&prediction.label);
        info!(
            label = %prediction.label,
            score = ?prediction.score,
            category = %classification.category,
            "image classified"
        );

        let body = reply::classified(
            Subject::Detected(&prediction),
            &classification,
            self.options.include_educational_note,
        );
        let receipt = self.deliver(&message.from, body).await?;

        Ok(Outcome::Replied {
            label: prediction.label,
            classification,
            receipt,
        })
    }

    async fn reply_to_text(
        &self,
        message: &InboundMessage,
        text: &str,
    ) -> Result<Outcome, PipelineError> {
        let classification = classify(text);
        info!(category = %classification.category, "text classified");

        let body = reply::classified(
            Subject::Described(text),
            &classification,
            self.options.include_educational_note,
        );
        let receipt = self.deliver(&message.from, body).await?;

        Ok(Outcome::Replied {
            label: text.to_owned(),
            classification,
            receipt,
        })
    }

    async fn deliver(&self, to: &str, body: String) -> Result<DeliveryReceipt, PipelineError> {
        let outbound = OutboundMessage {
            from: self.sender.clone(),
            to: to.to_owned(),
            body,
        };
        let receipt = self
            .clients
            .messaging
            .send(&outbound)
            .await
            .map_err(PipelineError::at(Stage::Deliver))?;
        debug!(to, id = %receipt.id, status = ?receipt.status, "reply delivered");
        Ok(receipt)
    }

    async fn notify_failure(
        &self,
        message: &InboundMessage,
        mut err: PipelineError,
    ) -> PipelineError {
        error!(
            from = %message.from,
            stage = %err.stage,
            error = %err.source,
            "pipeline failed"
        );

        match self
            .deliver(&message.from, reply::PROCESSING_FAILED.to_owned())
            .await
        {
            Ok(_) => err.notified = true,
            Err(notice_err) => {
                warn!(
                    from = %message.from,
                    error = %notice_err,
                    "could not deliver failure notice"
                );
            }
        }
        err
    }
}
