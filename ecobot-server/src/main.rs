//! WhatsApp webhook server that tells users which bin their waste belongs in.

mod app;
mod config;
mod webhook;

use std::future;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ecobot_core::{EcoBotService, ServiceClients};
use ecobot_provider_huggingface::HuggingFaceVisionPort;
use ecobot_provider_twilio::{TwilioCredentials, TwilioMediaPort, TwilioMessagingPort};
use reqwest::Client;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; variables may come from the process environment.
    dotenvy::dotenv().ok();
    let config = Config::parse();
    init_tracing(config.log_json);
    info!(?config, "starting ecobot");

    // HTTP + service setup
    let client = Client::builder()
        .user_agent(concat!("ecobot/", env!("CARGO_PKG_VERSION")))
        .timeout(config.http_timeout())
        .build()?;

    let credentials =
        TwilioCredentials::new(&config.twilio_account_sid, &config.twilio_auth_token);
    let vision = HuggingFaceVisionPort::new(client.clone(), &config.huggingface_api_token)
        .with_api_base(&config.huggingface_api_base)
        .with_model(&config.huggingface_model);
    let messaging = TwilioMessagingPort::new(client.clone(), credentials.clone())
        .with_api_base(&config.twilio_api_base);
    let media =
        TwilioMediaPort::new(client, credentials).with_api_base(&config.twilio_api_base);

    let clients = ServiceClients::new(
        Arc::new(media),
        Arc::new(vision),
        Arc::new(messaging),
    );
    let service = Arc::new(EcoBotService::new(
        clients,
        &config.twilio_whatsapp_number,
        config.pipeline_options(),
    ));

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "server listening");

    axum::serve(listener, app::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ecobot=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "could not listen for shutdown signal");
        future::pending::<()>().await;
    }
    info!("shutdown requested");
}
