use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use ecobot_core::PipelineOptions;
use ecobot_provider_huggingface as huggingface;
use ecobot_provider_twilio as twilio;

/// Runtime settings, read from flags or the environment (a `.env` file is loaded first).
#[derive(Parser)]
#[command(name = "ecobot-server", version, about)]
pub(crate) struct Config {
    /// Interface to listen on.
    #[arg(long, env = "ECOBOT_HOST", default_value = "0.0.0.0")]
    pub(crate) host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub(crate) port: u16,

    /// Twilio account SID.
    #[arg(long, env = "TWILIO_ACCOUNT_SID")]
    pub(crate) twilio_account_sid: String,

    /// Twilio auth token.
    #[arg(long, env = "TWILIO_AUTH_TOKEN", hide_env_values = true)]
    pub(crate) twilio_auth_token: String,

    /// WhatsApp sender, e.g. `whatsapp:+14155238886`.
    #[arg(long, env = "TWILIO_WHATSAPP_NUMBER")]
    pub(crate) twilio_whatsapp_number: String,

    /// Twilio REST API base URL.
    #[arg(long, env = "TWILIO_API_BASE", default_value = twilio::DEFAULT_API_BASE)]
    pub(crate) twilio_api_base: String,

    /// Hugging Face access token.
    #[arg(long, env = "HUGGINGFACE_API_TOKEN", hide_env_values = true)]
    pub(crate) huggingface_api_token: String,

    /// Model repository used for image classification.
    #[arg(long, env = "HUGGINGFACE_MODEL", default_value = huggingface::DEFAULT_MODEL)]
    pub(crate) huggingface_model: String,

    /// Hugging Face inference API base URL.
    #[arg(long, env = "HUGGINGFACE_API_BASE", default_value = huggingface::DEFAULT_API_BASE)]
    pub(crate) huggingface_api_base: String,

    /// Timeout for outgoing HTTP requests, in seconds.
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub(crate) http_timeout_secs: u64,

    /// Send attached images to the classification model.
    #[arg(
        long,
        env = "ECOBOT_USE_VISION",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub(crate) use_vision: bool,

    /// Classify the message text when no image is attached.
    #[arg(
        long,
        env = "ECOBOT_TEXT_FALLBACK",
        default_value_t = false,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub(crate) text_fallback: bool,

    /// Append the educational note to replies.
    #[arg(
        long,
        env = "ECOBOT_EDUCATIONAL_NOTE",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub(crate) educational_note: bool,

    /// Emit logs as JSON lines.
    #[arg(long, env = "ECOBOT_LOG_JSON", value_parser = BoolishValueParser::new())]
    pub(crate) log_json: bool,
}

impl Config {
    pub(crate) fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub(crate) fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub(crate) fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            use_vision_model: self.use_vision,
            use_text_fallback: self.text_fallback,
            include_educational_note: self.educational_note,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Config")
            .field("listen_addr", &self.listen_addr())
            .field("twilio_account_sid", &self.twilio_account_sid)
            .field("twilio_auth_token", &"[redacted]")
            .field("twilio_whatsapp_number", &self.twilio_whatsapp_number)
            .field("twilio_api_base", &self.twilio_api_base)
            .field("huggingface_api_token", &"[redacted]")
            .field("huggingface_model", &self.huggingface_model)
            .field("huggingface_api_base", &self.huggingface_api_base)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("pipeline", &self.pipeline_options())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 9] = [
        "ecobot-server",
        "--twilio-account-sid",
        "AC123",
        "--twilio-auth-token",
        "secret-token",
        "--twilio-whatsapp-number",
        "whatsapp:+14155238886",
        "--huggingface-api-token",
        "hf_secret",
    ];

    #[test]
    fn defaults_match_the_deployed_bot() {
        let config = Config::try_parse_from(REQUIRED).expect("parse");

        assert_eq!(config.host.to_string(), "0.0.0.0", "listens on all interfaces");
        assert_eq!(
            config.huggingface_model, "microsoft/resnet-50",
            "resnet is the default model"
        );
        assert_eq!(
            config.pipeline_options(),
            PipelineOptions::default(),
            "pipeline defaults match the service defaults"
        );
        assert_eq!(
            config.http_timeout(),
            Duration::from_secs(30),
            "thirty second timeout"
        );
    }

    #[test]
    fn pipeline_switches_accept_boolish_values() {
        let args = REQUIRED.into_iter().chain([
            "--use-vision",
            "no",
            "--text-fallback",
            "yes",
            "--educational-note",
            "0",
        ]);
        let config = Config::try_parse_from(args).expect("parse");

        assert_eq!(
            config.pipeline_options(),
            PipelineOptions {
                use_vision_model: false,
                use_text_fallback: true,
                include_educational_note: false,
            },
            "boolish words and digits are accepted"
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = Config::try_parse_from(REQUIRED).expect("parse");
        let rendered = format!("{config:?}");

        assert!(rendered.contains("AC123"), "account sid is visible");
        assert!(!rendered.contains("secret-token"), "twilio token is redacted");
        assert!(!rendered.contains("hf_secret"), "hugging face token is redacted");
    }
}
