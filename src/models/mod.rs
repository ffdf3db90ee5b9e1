//! Data models for the WeatherChat application
//!
//! This module contains the core domain models organized by concern:
//! - Place: a geocoded location with coordinates
//! - Conditions: current weather observations for a coordinate pair
//! - Message: entries of the conversation log

pub mod conditions;
pub mod message;
pub mod place;

// Re-export all public types for convenient access
pub use conditions::CurrentConditions;
pub use message::{Author, Message, MessageId};
pub use place::ResolvedPlace;
