//! Host navigation history
//!
//! [`HistoryBackend`] is the only way the navigator touches the outside world:
//! it reads the current location, pushes or replaces entries, and asks the
//! host to go back. [`MemoryHistory`] implements it in memory with
//! browser-like semantics:
//! - pushing truncates forward entries
//! - `back`/`forward` move the cursor and leave a pending popstate payload
//! - a configurable entry limit

use crate::location::Location;
use crate::trace_log;
use serde_json::Value as JsonValue;

/// Host history and location, as seen by the navigator
pub trait HistoryBackend {
    /// Current host location
    fn location(&self) -> Location;

    /// Add an entry for `url` carrying `state`
    fn push_state(&mut self, state: &JsonValue, url: &str);

    /// Overwrite the current entry with `state` at `url`
    fn replace_state(&mut self, state: &JsonValue, url: &str);

    /// Native back navigation; the host reports the result as a popstate
    fn back(&mut self);

    /// Whether this host is embedded in another browsing context.
    ///
    /// Nested hosts share history with their parent, so the navigator never
    /// writes to them.
    fn is_nested(&self) -> bool {
        false
    }

    /// Payload of a back/forward move not yet delivered to the navigator.
    ///
    /// Hosts that deliver popstate through their own event loop keep the
    /// default.
    fn take_popstate(&mut self) -> Option<JsonValue> {
        None
    }
}

impl<T: HistoryBackend + ?Sized> HistoryBackend for Box<T> {
    fn location(&self) -> Location {
        (**self).location()
    }

    fn push_state(&mut self, state: &JsonValue, url: &str) {
        (**self).push_state(state, url);
    }

    fn replace_state(&mut self, state: &JsonValue, url: &str) {
        (**self).replace_state(state, url);
    }

    fn back(&mut self) {
        (**self).back();
    }

    fn is_nested(&self) -> bool {
        (**self).is_nested()
    }

    fn take_popstate(&mut self) -> Option<JsonValue> {
        (**self).take_popstate()
    }
}

/// Navigation history entry
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// `pathname + search + hash` of this entry
    pub url: String,
    /// Payload attached with push/replace
    pub state: JsonValue,
}

impl HistoryEntry {
    /// Create a new history entry with an empty object payload
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: JsonValue::Object(serde_json::Map::new()),
        }
    }

    /// Create with state
    pub fn with_state(url: impl Into<String>, state: JsonValue) -> Self {
        Self {
            url: url.into(),
            state,
        }
    }
}

/// In-memory history stack
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<HistoryEntry>,
    current: usize,
    /// Maximum history size (0 = unlimited)
    max_size: usize,
    nested: bool,
    pending_pop: Option<JsonValue>,
    back_calls: usize,
}

impl MemoryHistory {
    /// Create a new history with an initial url
    pub fn new(initial_url: impl Into<String>) -> Self {
        Self::with_max_size(initial_url, 1000)
    }

    /// Create with custom max size
    pub fn with_max_size(initial_url: impl Into<String>, max_size: usize) -> Self {
        Self {
            entries: vec![HistoryEntry::new(initial_url)],
            current: 0,
            max_size,
            nested: false,
            pending_pop: None,
            back_calls: 0,
        }
    }

    /// Mark this host as embedded in a parent context
    pub fn nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }

    /// Get current entry
    pub fn current_entry(&self) -> &HistoryEntry {
        &self.entries[self.current]
    }

    /// Get current url
    pub fn current_url(&self) -> &str {
        &self.current_entry().url
    }

    /// Go forward in history, leaving a pending popstate
    pub fn forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.current += 1;
        self.pending_pop = Some(self.current_entry().state.clone());
        true
    }

    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current + 1 < self.entries.len()
    }

    /// Number of native back requests received
    pub fn back_calls(&self) -> usize {
        self.back_calls
    }

    /// Get history length
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the initial entry is never removed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get all entries
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Get current index
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Enforce maximum size limit
    fn enforce_size_limit(&mut self) {
        if self.max_size > 0 && self.entries.len() > self.max_size {
            // Remove oldest entries, keeping the current entry reachable
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(0..excess);
            self.current = self.current.saturating_sub(excess);
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl HistoryBackend for MemoryHistory {
    fn location(&self) -> Location {
        Location::split(self.current_url())
    }

    fn push_state(&mut self, state: &JsonValue, url: &str) {
        // Remove forward history when pushing
        self.entries.truncate(self.current + 1);
        self.entries.push(HistoryEntry::with_state(url, state.clone()));
        self.current += 1;
        self.enforce_size_limit();
    }

    fn replace_state(&mut self, state: &JsonValue, url: &str) {
        self.entries[self.current] = HistoryEntry::with_state(url, state.clone());
    }

    fn back(&mut self) {
        self.back_calls += 1;
        if !self.can_go_back() {
            trace_log!("MemoryHistory::back at first entry, no popstate");
            return;
        }
        self.current -= 1;
        self.pending_pop = Some(self.current_entry().state.clone());
    }

    fn is_nested(&self) -> bool {
        self.nested
    }

    fn take_popstate(&mut self) -> Option<JsonValue> {
        self.pending_pop.take()
    }
}
