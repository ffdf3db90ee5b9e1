//! Terminal presenter
//!
//! Reads one query per line from stdin and renders conversation events on
//! stdout as they happen.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::controller::ChatController;
use crate::conversation::{ConversationEvent, plain_text};
use crate::models::{Author, Message};
use crate::weather::{ConditionsSource, PlaceResolver};

const GREETING: &str =
    "Hi! Ask me about the weather anywhere, e.g. \"weather in Paris\". Type /quit to leave.";

/// Format a message the way the terminal shows it, or `None` when it should stay silent
#[must_use]
pub fn render(message: &Message) -> Option<String> {
    if message.pending {
        return Some("bot ▸ …".to_string());
    }
    match message.author {
        // The user already sees what they typed.
        Author::User => None,
        Author::Bot => {
            let text = plain_text(message).replace('\n', "\n      ");
            Some(format!("bot ▸ {text}"))
        }
    }
}

async fn print_events(mut events: broadcast::Receiver<ConversationEvent>) {
    loop {
        match events.recv().await {
            Ok(ConversationEvent::Appended { message }) => {
                if let Some(line) = render(&message) {
                    println!("{line}");
                }
            }
            Ok(ConversationEvent::Removed { id }) => debug!("Indicator {} removed", id),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Terminal fell behind, {} events skipped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Run the interactive chat until EOF, `/quit` or Ctrl-C
pub async fn run<G, W>(mut controller: ChatController<G, W>) -> Result<()>
where
    G: PlaceResolver,
    W: ConditionsSource,
{
    let printer = tokio::spawn(print_events(controller.log().subscribe()));
    println!("{GREETING}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };

        let Some(line) = line else { break };
        if matches!(line.trim(), "/quit" | "/exit") {
            break;
        }

        controller.submit(&line).await;
    }

    controller.settle().await;
    drop(controller);
    printer.await.context("Terminal printer task failed")?;
    Ok(())
}
