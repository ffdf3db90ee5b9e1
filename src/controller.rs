//! Input controller
//!
//! Drives one query at a time through extraction, geocoding, the weather
//! lookup and rendering. `submit` takes `&mut self`, so a second query cannot
//! start while one is in flight. The current state is published on a watch
//! channel so presenters can read it while a query holds the controller.

use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ChatConfig;
use crate::conversation::ConversationLog;
use crate::extractor::{self, LocationQuery};
use crate::models::Author;
use crate::report::WeatherReport;
use crate::weather::{ConditionsSource, PlaceResolver};
use crate::Result;

pub const CLARIFY_PROMPT: &str = "Please tell me which city you'd like to check! 🌍";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    Idle,
    Validating,
    Resolving,
}

/// How one submission ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Blank input, nothing was added to the log
    Ignored,
    /// The query was too short; the user was asked to name a city
    Clarified,
    /// The geocoder had no candidate for the query
    NotFound { query: LocationQuery },
    /// A lookup failed; the cause went to the logs only
    Failed,
    Reported(WeatherReport),
}

#[must_use]
pub fn not_found_message(query: &LocationQuery) -> String {
    format!("I couldn't find a city named \"{query}\". Could you check the spelling? 🤔")
}

pub struct ChatController<G, W> {
    geocoder: G,
    weather: W,
    log: ConversationLog,
    state: watch::Sender<ControllerState>,
    /// Clarification prompts waiting for their delay to pass
    scheduled: Vec<JoinHandle<()>>,
    clarify_delay: Duration,
    min_query_chars: usize,
}

impl<G, W> ChatController<G, W>
where
    G: PlaceResolver,
    W: ConditionsSource,
{
    pub fn new(geocoder: G, weather: W, settings: &ChatConfig) -> Self {
        Self {
            geocoder,
            weather,
            log: ConversationLog::new(),
            state: watch::Sender::new(ControllerState::Idle),
            scheduled: Vec::new(),
            clarify_delay: settings.clarify_delay(),
            min_query_chars: settings.min_query_chars,
        }
    }

    #[must_use]
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        *self.state.borrow()
    }

    /// Follow state changes without borrowing the controller
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    /// Wait until every scheduled clarification prompt is in the log
    pub async fn settle(&mut self) {
        for task in self.scheduled.drain(..) {
            if let Err(e) = task.await {
                warn!("Scheduled reply did not complete: {}", e);
            }
        }
    }

    /// Process one utterance end to end
    #[instrument(skip(self))]
    pub async fn submit(&mut self, utterance: &str) -> Outcome {
        let text = utterance.trim();
        if text.is_empty() {
            debug!("Ignoring blank submission");
            return Outcome::Ignored;
        }

        self.set_state(ControllerState::Validating);
        self.log.append_message(Author::User, text, false);

        let query = extractor::extract(text);
        debug!("Extracted location query '{}'", query);

        let outcome = if query.char_len() < self.min_query_chars {
            self.clarify()
        } else {
            self.set_state(ControllerState::Resolving);
            self.resolve(query).await
        };

        self.set_state(ControllerState::Idle);
        outcome
    }

    fn set_state(&self, state: ControllerState) {
        self.state.send_replace(state);
    }

    /// Schedule the prompt for a city and return at once. The controller is
    /// free for the next query while the delay runs.
    fn clarify(&mut self) -> Outcome {
        self.scheduled.retain(|task| !task.is_finished());

        let log = self.log.clone();
        let delay = self.clarify_delay;
        self.scheduled.push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            log.append_message(Author::Bot, CLARIFY_PROMPT, false);
        }));

        Outcome::Clarified
    }

    async fn resolve(&mut self, query: LocationQuery) -> Outcome {
        let pending = self.log.show_pending();
        let result = self.lookup(&query).await;
        self.log.clear_pending(pending);

        match result {
            Ok(Some(report)) => {
                info!(
                    "Reporting {} for {}",
                    report.condition.text,
                    report.place.display_name()
                );
                self.log.append_message(Author::Bot, report.to_markup(), true);
                Outcome::Reported(report)
            }
            Ok(None) => {
                info!("No place found for '{}'", query);
                self.log
                    .append_message(Author::Bot, not_found_message(&query), false);
                Outcome::NotFound { query }
            }
            Err(e) => {
                error!("Weather lookup for '{}' failed: {}", query, e);
                self.log.append_message(Author::Bot, e.user_message(), false);
                Outcome::Failed
            }
        }
    }

    /// Geocode, then fetch the weather. `Ok(None)` means the place is unknown.
    async fn lookup(&self, query: &LocationQuery) -> Result<Option<WeatherReport>> {
        let Some(place) = self.geocoder.resolve_place(query).await? else {
            return Ok(None);
        };

        let conditions = self
            .weather
            .fetch_conditions(place.latitude, place.longitude)
            .await?;

        Ok(Some(WeatherReport::new(place, conditions)))
    }
}

impl<G, W> std::fmt::Debug for ChatController<G, W>
where
    G: PlaceResolver,
    W: ConditionsSource,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatController")
            .field("state", &self.state())
            .field("messages", &self.log.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WeatherChatError;
    use crate::conversation::ConversationEvent;
    use crate::models::{CurrentConditions, ResolvedPlace};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    enum GeocodeReply {
        Found(ResolvedPlace),
        Empty,
        Broken,
    }

    #[derive(Clone)]
    struct FakeGeocoder {
        reply: GeocodeReply,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PlaceResolver for FakeGeocoder {
        async fn resolve_place(&self, _query: &LocationQuery) -> Result<Option<ResolvedPlace>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                GeocodeReply::Found(place) => Ok(Some(place.clone())),
                GeocodeReply::Empty => Ok(None),
                GeocodeReply::Broken => Err(WeatherChatError::api("connection reset by peer")),
            }
        }
    }

    #[derive(Clone)]
    struct FakeWeather {
        reply: Option<CurrentConditions>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ConditionsSource for FakeWeather {
        async fn fetch_conditions(&self, _lat: f64, _lon: f64) -> Result<CurrentConditions> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .clone()
                .ok_or_else(|| WeatherChatError::invalid_response("missing field `current`"))
        }
    }

    fn paris() -> ResolvedPlace {
        ResolvedPlace::with_country("Paris", "France", 48.85341, 2.3488)
    }

    fn partly_cloudy() -> CurrentConditions {
        CurrentConditions {
            temperature_c: 17.6,
            feels_like_c: 16.4,
            humidity_pct: 65.0,
            wind_kph: 12.3,
            precipitation_mm: 0.0,
            weather_code: 2,
        }
    }

    struct Harness {
        controller: ChatController<FakeGeocoder, FakeWeather>,
        geocode_calls: Arc<AtomicUsize>,
        weather_calls: Arc<AtomicUsize>,
    }

    fn harness(geocode: GeocodeReply, weather: Option<CurrentConditions>) -> Harness {
        let geocode_calls = Arc::new(AtomicUsize::new(0));
        let weather_calls = Arc::new(AtomicUsize::new(0));
        let controller = ChatController::new(
            FakeGeocoder {
                reply: geocode,
                calls: geocode_calls.clone(),
            },
            FakeWeather {
                reply: weather,
                calls: weather_calls.clone(),
            },
            &ChatConfig::default(),
        );
        Harness {
            controller,
            geocode_calls,
            weather_calls,
        }
    }

    #[tokio::test]
    async fn test_reports_weather() {
        let mut h = harness(GeocodeReply::Found(paris()), Some(partly_cloudy()));

        let outcome = h.controller.submit("weather in Paris").await;

        let Outcome::Reported(report) = outcome else {
            panic!("expected a report, got {outcome:?}");
        };
        assert_eq!(report.condition.text, "Partly Cloudy");

        let messages = h.controller.log().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].author, Author::User);
        assert_eq!(messages[0].content, "weather in Paris");
        assert!(messages[1].is_markup);
        assert!(messages[1].content.contains("Partly Cloudy"));
        assert!(messages[1].content.contains("Paris, France"));
        assert!(messages.iter().all(|m| !m.pending));
        assert_eq!(h.controller.state(), ControllerState::Idle);
        assert_eq!(h.geocode_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.weather_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_skips_weather_lookup() {
        let mut h = harness(GeocodeReply::Empty, Some(partly_cloudy()));

        let outcome = h.controller.submit("xyzzyqq").await;

        assert!(matches!(&outcome, Outcome::NotFound { query } if query.as_str() == "xyzzyqq"));
        let messages = h.controller.log().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[1].content,
            "I couldn't find a city named \"xyzzyqq\". Could you check the spelling? 🤔"
        );
        assert!(!messages[1].is_markup);
        assert_eq!(h.weather_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_geocoding_failure_is_generic_apology() {
        let mut h = harness(GeocodeReply::Broken, Some(partly_cloudy()));

        let outcome = h.controller.submit("weather in Paris").await;

        assert_eq!(outcome, Outcome::Failed);
        let messages = h.controller.log().messages();
        let reply = &messages[1];
        assert!(reply.content.starts_with("Oops! Something went wrong"));
        assert!(!reply.content.contains("connection reset"));
        assert_eq!(h.weather_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_weather_failure_is_generic_apology() {
        let mut h = harness(GeocodeReply::Found(paris()), None);

        let outcome = h.controller.submit("weather in Paris").await;

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(h.controller.log().len(), 2);
        assert!(h.controller.log().messages().iter().all(|m| !m.pending));
        assert_eq!(h.controller.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut h = harness(GeocodeReply::Found(paris()), Some(partly_cloudy()));

        assert_eq!(h.controller.submit("  ").await, Outcome::Ignored);
        assert_eq!(h.controller.submit("\t\n").await, Outcome::Ignored);

        assert!(h.controller.log().is_empty());
        assert_eq!(h.controller.state(), ControllerState::Idle);
        assert_eq!(h.geocode_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_asks_for_city_after_delay() {
        let mut h = harness(GeocodeReply::Found(paris()), Some(partly_cloudy()));
        let started = tokio::time::Instant::now();

        let outcome = h.controller.submit("a").await;

        assert_eq!(outcome, Outcome::Clarified);
        assert_eq!(h.controller.state(), ControllerState::Idle);
        assert_eq!(h.controller.log().len(), 1);

        h.controller.settle().await;

        assert!(started.elapsed() >= Duration::from_millis(500));
        let messages = h.controller.log().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "a");
        assert_eq!(messages[1].content, CLARIFY_PROMPT);
        assert_eq!(h.geocode_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_query_runs_during_clarify_delay() {
        let mut h = harness(GeocodeReply::Found(paris()), Some(partly_cloudy()));

        assert_eq!(h.controller.submit("a").await, Outcome::Clarified);
        let outcome = h.controller.submit("weather in Paris").await;
        assert!(matches!(outcome, Outcome::Reported(_)), "got {outcome:?}");
        assert_eq!(h.controller.log().len(), 3);

        h.controller.settle().await;

        let messages = h.controller.log().messages();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents.len(), 4);
        assert_eq!(contents[0], "a");
        assert_eq!(contents[1], "weather in Paris");
        assert!(contents[2].contains("Partly Cloudy"));
        assert_eq!(contents[3], CLARIFY_PROMPT);
    }

    #[tokio::test]
    async fn test_state_is_published_to_watchers() {
        let mut h = harness(GeocodeReply::Empty, None);
        let mut states = h.controller.watch_state();
        assert_eq!(*states.borrow_and_update(), ControllerState::Idle);

        h.controller.submit("xyzzyqq").await;

        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_user_text_is_trimmed() {
        let mut h = harness(GeocodeReply::Empty, None);
        h.controller.submit("   Atlantis  ").await;
        assert_eq!(h.controller.log().messages()[0].content, "Atlantis");
    }

    #[tokio::test]
    async fn test_log_grows_by_user_plus_one_reply_per_submission() {
        let mut h = harness(GeocodeReply::Found(paris()), Some(partly_cloudy()));

        for (i, text) in ["weather in Paris", "Paris again", "   ", "Lyon?"]
            .into_iter()
            .enumerate()
        {
            let before = h.controller.log().len();
            let outcome = h.controller.submit(text).await;
            h.controller.settle().await;
            let grown = h.controller.log().len() - before;
            if outcome == Outcome::Ignored {
                assert_eq!(grown, 0, "submission {i}");
            } else {
                assert_eq!(grown, 2, "submission {i}");
            }
        }
        assert_eq!(h.controller.log().len(), 6);
    }

    #[tokio::test]
    async fn test_pending_indicator_is_shown_then_removed() {
        let mut h = harness(GeocodeReply::Found(paris()), Some(partly_cloudy()));
        let mut events = h.controller.log().subscribe();

        h.controller.submit("weather in Paris").await;

        let mut kinds = Vec::new();
        while let Ok(event) = events.try_recv() {
            kinds.push(match event {
                ConversationEvent::Appended { message } if message.pending => {
                    "pending"
                }
                ConversationEvent::Appended { message } => {
                    if message.is_from_bot() { "bot" } else { "user" }
                }
                ConversationEvent::Removed { .. } => "removed",
            });
        }
        assert_eq!(kinds, vec!["user", "pending", "removed", "bot"]);
    }
}
