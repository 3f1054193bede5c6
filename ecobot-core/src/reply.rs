//! Canned reply texts sent back to users.

use crate::model::{Classification, Prediction};

/// Greeting line opening every classified reply.
pub const GREETING: &str = "1️⃣ Hi, I'm EY-EcoBot. What would you like to recycle today?";

/// Sent when the classification service produced no usable prediction.
pub const UNRECOGNIZED_IMAGE: &str = "Sorry, I couldn't classify the image. \
    Try another one or type the name of the waste (e.g. 'dirty napkin').";

/// Sent when the pipeline failed while handling a message.
pub const PROCESSING_FAILED: &str =
    "There was an error processing your image 😢. Please try again.";

/// Webhook response when a message carries no image.
pub const SEND_IMAGE_PROMPT: &str = "Please send an image to classify.";

/// Webhook response when a message carries neither an image nor text and text
/// input is accepted.
pub const SEND_IMAGE_OR_TEXT_PROMPT: &str =
    "Please send an image or type the name of the waste (e.g. 'dirty napkin').";

/// What the bot recognized, used for the second reply line.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'msg> {
    /// Result of the image classification service.
    Detected(&'msg Prediction),
    /// Text typed by the user.
    Described(&'msg str),
}

/// Compose the reply for a classified message.
#[must_use]
pub fn classified(
    subject: Subject<'_>,
    classification: &Classification,
    include_note: bool,
) -> String {
    let subject_line = match subject {
        Subject::Detected(prediction) => match prediction.confidence_percent() {
            Some(percent) => format!(
                "2️⃣ Detected: *{}* ({percent}% confidence)",
                prediction.label
            ),
            None => format!("2️⃣ Detected: *{}*", prediction.label),
        },
        Subject::Described(text) => format!("2️⃣ You described: *{text}*"),
    };

    let mut reply = format!(
        "{GREETING}\n\n{subject_line}\n\n3️⃣ Suggested bin: *{}*",
        classification.category.bin_label()
    );
    if include_note {
        reply.push_str("\n\n4️⃣ 📚 ");
        reply.push_str(classification.note);
    }
    reply
}

/// Prompt returned when there is nothing to classify.
#[must_use]
pub fn missing_input_prompt(accepts_text: bool) -> &'static str {
    if accepts_text {
        SEND_IMAGE_OR_TEXT_PROMPT
    } else {
        SEND_IMAGE_PROMPT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;

    #[test]
    fn detected_reply_lists_all_four_lines() {
        let prediction = Prediction::scored("water bottle", 0.9123);
        let reply = classified(
            Subject::Detected(&prediction),
            &classify(&prediction.label),
            true,
        );

        assert_eq!(
            reply,
            "1️⃣ Hi, I'm EY-EcoBot. What would you like to recycle today?\n\n\
             2️⃣ Detected: *water bottle* (91.23% confidence)\n\n\
             3️⃣ Suggested bin: *c) Plastic (dry and clean)*\n\n\
             4️⃣ 📚 clean plastic can be recycled into new products.",
            "reply should carry greeting, subject, bin and note"
        );
    }

    #[test]
    fn description_without_score_has_no_confidence() {
        let prediction = Prediction::described("a banana on a table");
        let reply = classified(
            Subject::Detected(&prediction),
            &classify(&prediction.label),
            true,
        );
        assert!(
            reply.contains("2️⃣ Detected: *a banana on a table*\n"),
            "description should be shown as detected: {reply}"
        );
        assert!(!reply.contains("confidence"), "no score means no confidence");
    }

    #[test]
    fn note_is_optional() {
        let reply = classified(Subject::Described("newspaper"), &classify("newspaper"), false);
        assert!(
            reply.contains("2️⃣ You described: *newspaper*"),
            "typed text should be echoed: {reply}"
        );
        assert!(
            reply.ends_with("3️⃣ Suggested bin: *b) Green bin (paper)*"),
            "reply should end at the bin line: {reply}"
        );
        assert!(!reply.contains("📚"), "note should be left out");
    }

    #[test]
    fn prompt_depends_on_text_support() {
        assert_eq!(
            missing_input_prompt(false),
            SEND_IMAGE_PROMPT,
            "image-only prompt without text support"
        );
        assert_eq!(
            missing_input_prompt(true),
            SEND_IMAGE_OR_TEXT_PROMPT,
            "text is offered when supported"
        );
    }

    #[test]
    fn wrapped_texts_keep_single_spacing() {
        assert_eq!(
            UNRECOGNIZED_IMAGE,
            "Sorry, I couldn't classify the image. Try another one or type the name of \
             the waste (e.g. 'dirty napkin').",
            "continuation must not add or drop spaces"
        );
    }
}
