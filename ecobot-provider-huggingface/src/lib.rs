//! Provider implementation for image classification using the Hugging Face
//! inference API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use ecobot_core::{
    model::{MediaContent, Prediction},
    ports::{PortError, VisionPort},
};

/// Public inference endpoint.
pub const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co";
/// Image classification model used when none is configured.
pub const DEFAULT_MODEL: &str = "microsoft/resnet-50";

const SERVICE: &str = "huggingface";

/// Request body for `/models/{model}`.
#[derive(Debug, Serialize)]
struct InferenceRequest<'req> {
    inputs: &'req str,
}

/// Any of the bodies the inference endpoint answers with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    /// Image classification models: `[{"label": …, "score": …}]`.
    Ranked(Vec<LabelScore>),
    /// Captioning models: `[{"generated_text": …}]`.
    Described(Vec<GeneratedText>),
    /// `{"error": …, "estimated_time": …}`
    Failed(ErrorBody),
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorText,
    #[serde(default)]
    estimated_time: Option<f64>,
}

// Validation failures come back as a list of messages.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorText {
    One(String),
    Many(Vec<String>),
}

impl ErrorText {
    fn into_message(self) -> String {
        match self {
            ErrorText::One(message) => message,
            ErrorText::Many(messages) => messages.join("; "),
        }
    }
}

/// Image classification implementation backed by a hosted model.
pub struct HuggingFaceVisionPort {
    client: Client,
    api_token: String,
    api_base: String,
    model: String,
}

impl HuggingFaceVisionPort {
    /// Create a new vision port using the default endpoint and model.
    #[must_use]
    pub fn new<S: Into<String>>(client: Client, api_token: S) -> Self {
        Self {
            client,
            api_token: api_token.into(),
            api_base: DEFAULT_API_BASE.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Use another model repository, e.g. `google/vit-base-patch16-224`.
    #[must_use]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    /// Point the port at another API base URL.
    #[must_use]
    pub fn with_api_base<S: Into<String>>(mut self, api_base: S) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }

    /// Model repository this port queries.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn model_url(&self) -> String {
        format!("{}/models/{}", self.api_base, self.model)
    }
}

#[async_trait]
impl VisionPort for HuggingFaceVisionPort {
    async fn classify_image(&self, media: &MediaContent) -> Result<Vec<Prediction>, PortError> {
        let data_uri = media.data_uri();
        let resp = self
            .client
            .post(self.model_url())
            .bearer_auth(&self.api_token)
            .json(&InferenceRequest { inputs: &data_uri })
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(model = %self.model, %status, "inference response received");

        parse_predictions(status, &text)
    }
}

fn parse_predictions(status: StatusCode, text: &str) -> Result<Vec<Prediction>, PortError> {
    let parsed = serde_json::from_str::<InferenceResponse>(text);

    let predictions = match parsed {
        Ok(InferenceResponse::Failed(ErrorBody {
            error,
            estimated_time,
        })) => {
            return Err(match estimated_time {
                Some(estimated_secs) if status == StatusCode::SERVICE_UNAVAILABLE => {
                    PortError::ModelLoading { estimated_secs }
                }
                _ => PortError::Status {
                    service: SERVICE,
                    status: status.as_u16(),
                    body: error.into_message(),
                },
            });
        }
        _ if !status.is_success() => {
            return Err(PortError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: text.to_owned(),
            });
        }
        Ok(InferenceResponse::Ranked(mut ranked)) => {
            ranked.sort_by(|left, right| right.score.total_cmp(&left.score));
            ranked
                .into_iter()
                .map(|entry| Prediction::scored(entry.label, entry.score))
                .collect::<Vec<_>>()
        }
        Ok(InferenceResponse::Described(described)) => described
            .into_iter()
            .map(|entry| entry.generated_text.trim().to_owned())
            .filter(|caption| !caption.is_empty())
            .map(Prediction::described)
            .collect(),
        Err(err) => return Err(PortError::InvalidPayload(err.to_string())),
    };

    if predictions.is_empty() {
        return Err(PortError::EmptyPrediction);
    }
    Ok(predictions)
}
