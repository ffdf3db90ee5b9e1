//! Open-Meteo geocoding and forecast client
//!
//! Both endpoints are free and need no API key. One GET per lookup, no retry,
//! reqwest's default timeouts.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use super::{ConditionsSource, PlaceResolver};
use crate::config::WeatherChatConfig;
use crate::extractor::LocationQuery;
use crate::models::{CurrentConditions, ResolvedPlace};
use crate::{Result, WeatherChatError};

/// Fields requested from the `current` block of the forecast endpoint
const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,wind_speed_10m";

/// Open-Meteo API client
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    geocoding_base_url: String,
    weather_base_url: String,
    language: String,
    result_count: u32,
}

impl OpenMeteoClient {
    /// Create a new client from configuration
    pub fn new(config: &WeatherChatConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.http.user_agent.clone())
            .build()
            .map_err(|e| WeatherChatError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            geocoding_base_url: config.geocoding.base_url.trim_end_matches('/').to_string(),
            weather_base_url: config.weather.base_url.trim_end_matches('/').to_string(),
            language: config.geocoding.language.clone(),
            result_count: config.geocoding.result_count,
        })
    }

    fn geocoding_url(&self, query: &LocationQuery) -> String {
        format!(
            "{}/search?name={}&count={}&language={}&format=json",
            self.geocoding_base_url,
            urlencoding::encode(query.as_str()),
            self.result_count,
            urlencoding::encode(&self.language)
        )
    }

    fn forecast_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&current={}",
            self.weather_base_url, latitude, longitude, CURRENT_FIELDS
        )
    }

    /// Send a GET and turn non-success statuses into API errors
    async fn get(&self, url: &str) -> Result<Response> {
        debug!("Open-Meteo request URL: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.reason)
            .unwrap_or(body);
        Err(WeatherChatError::api(format!(
            "Open-Meteo returned {status}: {reason}"
        )))
    }
}

#[async_trait]
impl PlaceResolver for OpenMeteoClient {
    #[instrument(skip(self, query), fields(query = %query))]
    async fn resolve_place(&self, query: &LocationQuery) -> Result<Option<ResolvedPlace>> {
        info!("Geocoding location: '{}'", query);
        let start_time = Instant::now();

        let response = self.get(&self.geocoding_url(query)).await?;
        let geocoding: GeocodingResponse = response.json().await.map_err(|e| {
            error!("Failed to parse geocoding response for '{}': {}", query, e);
            WeatherChatError::invalid_response(format!("geocoding response: {e}"))
        })?;

        let place = geocoding
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(ResolvedPlace::from);

        match &place {
            Some(place) => info!(
                "Resolved '{}' to {} ({}) in {:.3}s",
                query,
                place.display_name(),
                place.format_coordinates(),
                start_time.elapsed().as_secs_f64()
            ),
            None => warn!("No results found for location '{}'", query),
        }

        Ok(place)
    }
}

#[async_trait]
impl ConditionsSource for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn fetch_conditions(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions> {
        info!(
            "Getting current weather for coordinates: {:.4}, {:.4}",
            latitude, longitude
        );
        let start_time = Instant::now();

        let response = self.get(&self.forecast_url(latitude, longitude)).await?;
        let forecast: ForecastResponse = response.json().await.map_err(|e| {
            error!("Failed to parse weather response: {}", e);
            WeatherChatError::invalid_response(format!("forecast response: {e}"))
        })?;

        let current = forecast.current.ok_or_else(|| {
            WeatherChatError::invalid_response(format!(
                "no current weather for {latitude:.4},{longitude:.4}"
            ))
        })?;

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved current weather in {:.3}s",
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow API response detected: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(current.into())
    }
}

/// Geocoding response; `results` is absent when nothing matched
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
    timezone: Option<String>,
}

impl From<GeocodingResult> for ResolvedPlace {
    fn from(result: GeocodingResult) -> Self {
        Self {
            name: result.name,
            country: result.country,
            latitude: result.latitude,
            longitude: result.longitude,
            admin1: result.admin1,
            timezone: result.timezone,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentData>,
}

#[derive(Debug, Deserialize)]
struct CurrentData {
    #[serde(rename = "temperature_2m")]
    temperature: f64,
    #[serde(rename = "relative_humidity_2m")]
    relative_humidity: f64,
    apparent_temperature: f64,
    #[serde(default)]
    precipitation: f64,
    weather_code: i32,
    #[serde(rename = "wind_speed_10m")]
    wind_speed: f64,
}

impl From<CurrentData> for CurrentConditions {
    fn from(current: CurrentData) -> Self {
        Self {
            temperature_c: current.temperature,
            feels_like_c: current.apparent_temperature,
            humidity_pct: current.relative_humidity,
            wind_kph: current.wind_speed,
            precipitation_mm: current.precipitation,
            weather_code: current.weather_code,
        }
    }
}

/// Error body Open-Meteo sends with 4xx responses
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    reason: String,
}
