//! Remote lookups used by the chat pipeline
//!
//! The controller only sees the two traits below; `open_meteo` provides the
//! production implementation of both.

use async_trait::async_trait;

use crate::Result;
use crate::extractor::LocationQuery;
use crate::models::{CurrentConditions, ResolvedPlace};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Resolves a free-text place query to coordinates
#[async_trait]
pub trait PlaceResolver: Send + Sync {
    /// Returns `Ok(None)` when the provider has no candidate for the query.
    /// Transport and decoding problems are errors, never `None`.
    async fn resolve_place(&self, query: &LocationQuery) -> Result<Option<ResolvedPlace>>;
}

/// Fetches current observations for a coordinate pair
#[async_trait]
pub trait ConditionsSource: Send + Sync {
    async fn fetch_conditions(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions>;
}
