//! Windowing over the chat log.
//!
//! The list only renders the newest `visible_count` messages. Scrolling up
//! until the item at [`LOAD_TRIGGER_INDEX`] shows grows the window by one
//! page, and the view is asked to keep the previously oldest message where it
//! was instead of jumping.
//!
//! `loading` stays set from the moment a page is added until the view reports
//! that it scrolled to the anchor. Any trigger in between (the grown window
//! briefly puts new items under the viewport before the scroll lands) is
//! dropped rather than queued.

use std::time::{Duration, Instant};

use crate::common::ChatMessage;

/// Messages added to the window per load.
pub const PAGE_SIZE: usize = 15;

/// Window index whose appearance triggers loading older messages.
pub const LOAD_TRIGGER_INDEX: usize = 4;

/// Time after the first render before scrolling may trigger loads.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Keep the message at the top of the viewport (restoring after a load).
    Top,
    /// Pin the message to the bottom (new or initial messages).
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub message_id: String,
    pub align: ScrollAlign,
}

#[derive(Debug)]
pub struct PaginationController {
    visible_count: usize,
    loading: bool,
    initial_load_complete: bool,
    first_render_at: Option<Instant>,
    pending_scroll: Option<ScrollRequest>,
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginationController {
    pub fn new() -> Self {
        Self {
            visible_count: PAGE_SIZE,
            loading: false,
            initial_load_complete: false,
            first_render_at: None,
            pending_scroll: None,
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn initial_load_complete(&self) -> bool {
        self.initial_load_complete
    }

    /// The newest `min(visible_count, len)` messages, oldest first.
    pub fn visible_window<'a>(&self, all_messages: &'a [ChatMessage]) -> &'a [ChatMessage] {
        let start = all_messages.len().saturating_sub(self.visible_count);
        &all_messages[start..]
    }

    pub fn can_load_more(&self, total_count: usize) -> bool {
        self.visible_count < total_count
    }

    /// Grow the window by one page. Returns the id the view should scroll to,
    /// or `None` when a load is already in flight or nothing older exists.
    pub fn request_load_more(
        &mut self,
        current_oldest_visible_id: &str,
        total_count: usize,
    ) -> Option<String> {
        if self.loading || !self.can_load_more(total_count) {
            return None;
        }

        self.loading = true;
        self.visible_count += PAGE_SIZE;
        log::debug!(
            "Loading older messages: window now {} of {total_count}",
            self.visible_count.min(total_count)
        );

        let anchor = current_oldest_visible_id.to_string();
        self.pending_scroll = Some(ScrollRequest {
            message_id: anchor.clone(),
            align: ScrollAlign::Top,
        });
        Some(anchor)
    }

    /// Called for every window item the view finds on screen. Only the
    /// trigger index counts, and only once the settle delay has passed.
    pub fn on_item_visible(
        &mut self,
        window_index: usize,
        current_oldest_visible_id: &str,
        total_count: usize,
    ) -> Option<String> {
        if window_index != LOAD_TRIGGER_INDEX || !self.initial_load_complete {
            return None;
        }
        self.request_load_more(current_oldest_visible_id, total_count)
    }

    /// A message was appended; the window already ends with it, so only the
    /// scroll target changes.
    pub fn record_send(&mut self, new_message_id: &str) {
        self.pending_scroll = Some(ScrollRequest {
            message_id: new_message_id.to_string(),
            align: ScrollAlign::Bottom,
        });
    }

    /// First frame of the chat screen: start the settle timer and jump to the
    /// newest message.
    pub fn on_first_render(&mut self, now: Instant, newest_id: Option<&str>) {
        if self.first_render_at.is_some() {
            return;
        }
        self.first_render_at = Some(now);
        if let Some(id) = newest_id {
            self.record_send(id);
        }
    }

    /// Flip `initial_load_complete` once the settle delay has elapsed.
    pub fn tick(&mut self, now: Instant) {
        if self.initial_load_complete {
            return;
        }
        if let Some(started) = self.first_render_at {
            if now.saturating_duration_since(started) >= SETTLE_DELAY {
                self.initial_load_complete = true;
                log::debug!("Message list settled; load-more enabled");
            }
        }
    }

    /// How long until [`Self::tick`] can flip the settle flag, for repaint scheduling.
    pub fn settle_remaining(&self, now: Instant) -> Option<Duration> {
        if self.initial_load_complete {
            return None;
        }
        self.first_render_at
            .map(|started| SETTLE_DELAY.saturating_sub(now.saturating_duration_since(started)))
    }

    pub fn pending_scroll(&self) -> Option<&ScrollRequest> {
        self.pending_scroll.as_ref()
    }

    /// The view has issued the pending scroll (or found its target gone).
    /// Ends the current load, if any.
    pub fn scroll_applied(&mut self) {
        self.pending_scroll = None;
        self.loading = false;
    }
}
