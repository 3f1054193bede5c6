//! Core types and service wiring for the EcoBot recycling assistant.

/// Keyword classifier mapping labels to disposal categories.
pub mod classifier;
/// Bundle of the external service clients.
pub mod clients;
/// Domain models shared by all providers.
pub mod model;
/// Traits describing the external collaborators.
pub mod ports;
/// Canned reply texts.
pub mod reply;
/// Message handling pipeline used by the webhook server.
pub mod service;

pub use classifier::classify;
pub use clients::*;
pub use model::*;
pub use ports::*;
pub use service::*;
