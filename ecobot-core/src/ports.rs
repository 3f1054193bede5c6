//! Traits describing the external collaborators and their shared error type.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{DeliveryReceipt, MediaContent, MediaRef, OutboundMessage, Prediction};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to external services.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Service answered with a non-success status.
    #[error("{service} responded with status {status}: {body}")]
    Status {
        /// Name of the remote service.
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body or provider error message.
        body: String,
    },
    /// Classification model is still warming up.
    #[error("Model is loading, retry in about {estimated_secs:.0}s")]
    ModelLoading {
        /// Wait suggested by the service.
        estimated_secs: f64,
    },
    /// Classification service returned no prediction.
    #[error("No prediction returned")]
    EmptyPrediction,
    /// Response body could not be understood.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
/// Retrieval of media attachments referenced by inbound messages.
pub trait MediaPort: Send + Sync {
    /// Download the attachment behind `media`.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the download fails or is rejected.
    async fn fetch(&self, media: &MediaRef) -> Result<MediaContent, PortError>;
}

#[async_trait]
/// Image classification backend.
pub trait VisionPort: Send + Sync {
    /// Classify an image, returning predictions ranked best first.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the service is unreachable, still loading,
    /// or produced no prediction.
    async fn classify_image(&self, media: &MediaContent) -> Result<Vec<Prediction>, PortError>;
}

#[async_trait]
/// Outbound message delivery.
pub trait MessagingPort: Send + Sync {
    /// Deliver a text message.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider rejects or fails the request.
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, PortError>;
}
