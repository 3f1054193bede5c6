//! Domain data structures for waste categories, predictions, and messages.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
/// Disposal bins a piece of waste can be sorted into.
pub enum Category {
    /// Aluminum and metal cans.
    Cans,
    /// Paper, newspaper, and cardboard.
    Paper,
    /// Clean and dry plastic.
    Plastic,
    /// General (non-recyclable) trash.
    Trash,
    /// Organic matter for composting.
    Compost,
}

impl Category {
    /// All categories in bin-label order.
    pub const ALL: [Category; 5] = [
        Category::Cans,
        Category::Paper,
        Category::Plastic,
        Category::Trash,
        Category::Compost,
    ];

    /// Stable tag string used by downstream display logic.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Category::Cans => "CANS",
            Category::Paper => "PAPER",
            Category::Plastic => "PLASTIC",
            Category::Trash => "TRASH",
            Category::Compost => "COMPOST",
        }
    }

    /// Human-friendly bin description shown in replies.
    #[must_use]
    pub fn bin_label(self) -> &'static str {
        match self {
            Category::Cans => "a) Red bin (cans)",
            Category::Paper => "b) Green bin (paper)",
            Category::Plastic => "c) Plastic (dry and clean)",
            Category::Trash => "d) Trash (food scraps, used napkins, etc.)",
            Category::Compost => "e) Compost",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Suggested category for a label together with its educational note.
pub struct Classification {
    /// Bin the label belongs to.
    pub category: Category,
    /// Fixed sentence shown to the user alongside the category.
    pub note: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One result returned by the image classification service.
pub struct Prediction {
    /// Detected object label or free-text description.
    pub label: String,
    /// Confidence in `[0, 1]`; absent for free-text descriptions.
    pub score: Option<f64>,
}

impl Prediction {
    /// Construct a ranked prediction.
    #[must_use]
    pub fn scored<S: Into<String>>(label: S, score: f64) -> Self {
        Self {
            label: label.into(),
            score: Some(score),
        }
    }

    /// Construct a free-text description without a score.
    #[must_use]
    pub fn described<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
            score: None,
        }
    }

    /// Confidence as a percentage with two decimals, e.g. `"87.50"`.
    #[must_use]
    pub fn confidence_percent(&self) -> Option<String> {
        self.score.map(|score| format!("{:.2}", score * 100.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Reference to a media attachment hosted by the messaging provider.
pub struct MediaRef {
    /// Location of the binary content.
    pub url: String,
    /// Content type declared by the webhook, if any.
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Downloaded media attachment.
pub struct MediaContent {
    /// Raw bytes of the attachment.
    pub bytes: Vec<u8>,
    /// MIME type of the attachment.
    pub content_type: String,
}

impl MediaContent {
    /// Encode the content as a `data:` URI with a base64 payload.
    #[must_use]
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Message received through the webhook.
pub struct InboundMessage {
    /// Provider message identifier, when supplied.
    pub id: Option<String>,
    /// Address of the user who sent the message.
    pub from: String,
    /// Address the message was sent to (the bot).
    pub to: Option<String>,
    /// Text body, possibly empty.
    pub body: Option<String>,
    /// First media attachment, if any.
    pub media: Option<MediaRef>,
}

impl InboundMessage {
    /// Body text with surrounding whitespace removed, `None` when blank.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.body
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Message to be handed to the delivery service.
pub struct OutboundMessage {
    /// Sender address (the bot's number).
    pub from: String,
    /// Destination address.
    pub to: String,
    /// Text body.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Acknowledgment returned by the delivery service.
pub struct DeliveryReceipt {
    /// Provider-assigned message identifier.
    pub id: String,
    /// Provider status such as `queued`, when reported.
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_tags_match_display() {
        let tags: Vec<String> = Category::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            tags,
            ["CANS", "PAPER", "PLASTIC", "TRASH", "COMPOST"],
            "display must render the stable tag"
        );
    }

    #[test]
    fn data_uri_carries_content_type_and_payload() {
        let media = MediaContent {
            bytes: b"hello".to_vec(),
            content_type: "image/jpeg".to_owned(),
        };
        assert_eq!(
            media.data_uri(),
            "data:image/jpeg;base64,aGVsbG8=",
            "data URI should embed the MIME type and base64 payload"
        );
    }

    #[test]
    fn confidence_is_rendered_with_two_decimals() {
        assert_eq!(
            Prediction::scored("banana", 0.875).confidence_percent().as_deref(),
            Some("87.50"),
            "score should be scaled to a percentage"
        );
        assert_eq!(
            Prediction::described("a banana").confidence_percent(),
            None,
            "descriptions carry no confidence"
        );
    }

    #[test]
    fn confidence_rounds_at_double_precision() {
        for (score, expected) in [(0.33335, "33.34"), (0.98765, "98.77")] {
            assert_eq!(
                Prediction::scored("label", score).confidence_percent().as_deref(),
                Some(expected),
                "score {score} rounded differently"
            );
        }
    }

    #[test]
    fn blank_body_has_no_text() {
        let message = InboundMessage {
            id: None,
            from: "whatsapp:+15550001".to_owned(),
            to: None,
            body: Some("   ".to_owned()),
            media: None,
        };
        assert_eq!(message.text(), None, "whitespace-only body is not text");
    }
}
