//! JSON + SSE endpoints of the web front-end
//!
//! The controller lives behind a mutex. A submission that arrives while
//! another query is resolving is refused with 409 instead of queued. Reads go
//! through the shared log and the state watch, so they never wait on a query.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{
        Json,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use futures::{Stream, StreamExt, stream};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, warn};

use crate::controller::{ChatController, ControllerState, Outcome};
use crate::conversation::ConversationLog;
use crate::models::Message;
use crate::weather::OpenMeteoClient;

pub type WebController = ChatController<OpenMeteoClient, OpenMeteoClient>;

#[derive(Clone)]
pub struct AppState {
    controller: Arc<Mutex<WebController>>,
    log: ConversationLog,
    status: watch::Receiver<ControllerState>,
}

impl AppState {
    pub fn new(controller: WebController) -> Self {
        Self {
            log: controller.log().clone(),
            status: controller.watch_state(),
            controller: Arc::new(Mutex::new(controller)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: ControllerState,
    pub messages: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/messages", get(get_messages).post(post_message))
        .route("/events", get(get_events))
        .route("/status", get(get_status))
        .with_state(state)
}

async fn get_messages(State(state): State<AppState>) -> Json<Vec<Message>> {
    Json(state.log.messages())
}

async fn post_message(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<Outcome>, StatusCode> {
    let Ok(mut controller) = state.controller.try_lock() else {
        debug!("Rejecting submission while a query is in flight");
        return Err(StatusCode::CONFLICT);
    };
    Ok(Json(controller.submit(&request.text).await))
}

async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        state: *state.status.borrow(),
        messages: state.log.len(),
    })
}

async fn get_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.log.subscribe();
    let events = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => return Some((event, receiver)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Event stream fell behind, {} events skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
    .filter_map(|event| async move {
        match Event::default().json_data(&event) {
            Ok(sse_event) => Some(Ok(sse_event)),
            Err(e) => {
                warn!("Failed to encode conversation event: {}", e);
                None
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
