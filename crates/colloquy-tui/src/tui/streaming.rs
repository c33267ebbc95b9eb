//! Display-state inference for messages that may still be streaming.
//!
//! The upstream producer gives the renderer no "generation finished" event,
//! so the tracker approximates one: a latest message whose content differs
//! from the last remembered content is `Streaming`, and the remembered
//! content catches up only after the content has been byte-stable for the
//! settle window. The "timer" is cooperative: callers poll
//! [`StreamTracker::next_deadline`] to know when a redraw could flip a
//! message to `Settled`; nothing runs in the background and dropping an
//! entry cancels its pending update.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::tui::model::{Message, MessageId};

/// How long content must stay unchanged before it counts as settled.
pub const SETTLE_WINDOW: Duration = Duration::from_millis(500);

/// How a message should be presented right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayState {
    /// Awaiting the first token of a response.
    Thinking,
    /// Content is actively being appended.
    Streaming,
    /// Content is final (or has been stable long enough to look final).
    Settled,
}

#[derive(Debug)]
struct Entry {
    /// Content as of the last committed observation. Starts empty so a new
    /// message with empty content classifies as settled immediately.
    remembered: String,
    pending: Option<Pending>,
}

/// A scheduled update of `remembered`, waiting out the settle window.
#[derive(Debug)]
struct Pending {
    content: String,
    since: Instant,
}

/// Per-message remembered-content arena.
///
/// Owned by the chat view; each message's entry is independent, so a reorder
/// of which message is "latest" never bleeds state across messages.
#[derive(Debug)]
pub struct StreamTracker {
    entries: HashMap<MessageId, Entry>,
    settle_window: Duration,
}

impl Default for StreamTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamTracker {
    pub fn new() -> Self {
        Self::with_settle_window(SETTLE_WINDOW)
    }

    pub fn with_settle_window(settle_window: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            settle_window,
        }
    }

    /// Classify `message` for this render and advance the remembered state.
    ///
    /// `now` is injected rather than sampled so the settle window is
    /// deterministic under test.
    pub fn observe(&mut self, message: &Message, is_latest: bool, now: Instant) -> DisplayState {
        let entry = self.entries.entry(message.id.clone()).or_insert(Entry {
            remembered: String::new(),
            pending: None,
        });

        // Commit a pending update whose window has elapsed. A commit only
        // happens if the content is still what it was when the window
        // started; any change restarts the window below.
        if let Some(pending) = &entry.pending {
            if pending.content == message.content
                && now.duration_since(pending.since) >= self.settle_window
            {
                entry.remembered = message.content.clone();
                entry.pending = None;
                trace!(id = %message.id, "settle window elapsed, content committed");
            }
        }

        let state = if message.is_thinking {
            DisplayState::Thinking
        } else if is_latest && entry.remembered != message.content {
            DisplayState::Streaming
        } else {
            DisplayState::Settled
        };

        // (Re)schedule the remembered-content update. If the content changed
        // since the window started, the old pending update is discarded,
        // which is the restart-on-change cancellation.
        match &entry.pending {
            Some(pending) if pending.content == message.content => {}
            _ => {
                if entry.remembered == message.content {
                    entry.pending = None;
                } else {
                    entry.pending = Some(Pending {
                        content: message.content.clone(),
                        since: now,
                    });
                }
            }
        }

        state
    }

    /// Explicit end-of-stream from a producer that does know generation
    /// finished. Preferred over waiting out the settle heuristic.
    pub fn mark_settled(&mut self, id: &str, content: &str) {
        let entry = self.entries.entry(id.to_string()).or_insert(Entry {
            remembered: String::new(),
            pending: None,
        });
        entry.remembered = content.to_string();
        entry.pending = None;
    }

    /// Drop a message's entry, cancelling any pending update. Call when the
    /// owning view is torn down.
    pub fn forget(&mut self, id: &str) {
        self.entries.remove(id);
    }

    /// Keep only the entries whose ids the predicate accepts.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|id, _| keep(id));
    }

    /// Earliest instant at which a pending update could commit, if any. The
    /// event loop schedules its next idle redraw for this.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries
            .values()
            .filter_map(|entry| entry.pending.as_ref())
            .map(|pending| pending.since + self.settle_window)
            .min()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
