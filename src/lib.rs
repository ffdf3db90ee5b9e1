//! `WeatherChat` - chat-style current weather lookup
//!
//! This library turns free-text questions like "weather in Paris" into a
//! place query, resolves it with a geocoding lookup, fetches current
//! conditions and renders the answer into an append-only conversation log.

pub mod api;
pub mod condition;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod models;
pub mod report;
pub mod terminal;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use condition::{ConditionLabel, map_code};
pub use config::WeatherChatConfig;
pub use controller::{ChatController, ControllerState, Outcome};
pub use conversation::{ConversationEvent, ConversationLog, PendingHandle};
pub use error::WeatherChatError;
pub use extractor::{LocationQuery, extract};
pub use models::{Author, CurrentConditions, Message, MessageId, ResolvedPlace};
pub use report::WeatherReport;
pub use weather::{ConditionsSource, OpenMeteoClient, PlaceResolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherChatError>;
