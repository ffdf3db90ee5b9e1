//! Conversation log
//!
//! An ordered, append-only list of messages. The only removal allowed is the
//! transient typing indicator shown while a query resolves. Every mutation is
//! broadcast as a [`ConversationEvent`] so presenters can render and scroll
//! to the newest entry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::{Author, Message, MessageId};

const EVENT_CAPACITY: usize = 64;

const TYPING_INDICATOR: &str = r#"<div class="typing-indicator"><div class="dot"></div><div class="dot"></div><div class="dot"></div></div>"#;

/// Change notification for presenters
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    /// A message was added at the end; presenters scroll to it
    Appended { message: Message },
    /// The typing indicator with this id was taken down
    Removed { id: MessageId },
}

/// Handle to a typing indicator created by [`ConversationLog::show_pending`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingHandle(MessageId);

impl PendingHandle {
    #[must_use]
    pub fn id(&self) -> MessageId {
        self.0
    }
}

#[derive(Debug)]
struct Entries {
    messages: Vec<Message>,
    next_id: u64,
}

/// Shared handle to the log. Clones see the same messages and events.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    entries: Arc<Mutex<Entries>>,
    events: broadcast::Sender<ConversationEvent>,
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationLog {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Arc::new(Mutex::new(Entries {
                messages: Vec::new(),
                next_id: 1,
            })),
            events,
        }
    }

    /// Append a message at the end of the log
    pub fn append_message(
        &self,
        author: Author,
        content: impl Into<String>,
        is_markup: bool,
    ) -> MessageId {
        self.push(author, content.into(), is_markup, false)
    }

    /// Show the typing indicator
    pub fn show_pending(&self) -> PendingHandle {
        PendingHandle(self.push(Author::Bot, TYPING_INDICATOR.to_string(), true, true))
    }

    /// Remove the indicator behind `handle`. Returns false if it is already gone.
    pub fn clear_pending(&self, handle: PendingHandle) -> bool {
        let mut entries = self.entries();
        let Some(index) = entries
            .messages
            .iter()
            .position(|m| m.pending && m.id == handle.0)
        else {
            return false;
        };

        entries.messages.remove(index);
        debug!("Cleared pending indicator {}", handle.0);
        let _ = self.events.send(ConversationEvent::Removed { id: handle.0 });
        true
    }

    /// Snapshot of the log in order
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.entries().messages.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().messages.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<Message> {
        self.entries().messages.last().cloned()
    }

    /// Receive every change made after this call
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.events.subscribe()
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        // Entries stay consistent even if a holder panicked.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, author: Author, content: String, is_markup: bool, pending: bool) -> MessageId {
        let mut entries = self.entries();
        let id = MessageId(entries.next_id);
        entries.next_id += 1;

        let message = Message {
            id,
            author,
            content,
            is_markup,
            pending,
            sent_at: Utc::now(),
        };
        entries.messages.push(message.clone());
        // Sent under the lock so events arrive in log order. Nobody listening is fine.
        let _ = self.events.send(ConversationEvent::Appended { message });
        id
    }
}

/// Text rendering of a message for presenters that cannot show markup.
///
/// Tags become line breaks, basic entities are decoded and blank lines dropped.
#[must_use]
pub fn plain_text(message: &Message) -> String {
    if !message.is_markup {
        return message.content.clone();
    }

    let mut text = String::with_capacity(message.content.len());
    let mut in_tag = false;
    for c in message.content.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push('\n');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(unescape_html)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape text for inclusion in an HTML fragment
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
