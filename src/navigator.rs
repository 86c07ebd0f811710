//! Synchronization between the URL state cells and the host history
//!
//! Writes to path, query and fragment apply to the cells immediately. The
//! derived url and the history write are deferred to the next [`tick`]:
//! every write schedules a url commit tagged with a new version, and a commit
//! whose version is no longer the latest is dropped. Setting all three cells
//! in one synchronous call therefore produces a single history entry.
//!
//! Browser-driven changes ([`pop_state`], [`hash_change`]) raise a flag that
//! makes the next commit skip the push, because the host already shows that
//! url.
//!
//! [`tick`]: Navigator::tick
//! [`pop_state`]: Navigator::pop_state
//! [`hash_change`]: Navigator::hash_change

use crate::config::Prefs;
use crate::error::Result;
use crate::history::HistoryBackend;
use crate::location::Location;
use crate::query::{Query, QueryInput};
use crate::state::{Path, UrlState};
use crate::{debug_log, info_log, trace_log, ChangeOrigin, UrlChangeEvent};
use serde_json::Value as JsonValue;
use std::collections::VecDeque;

/// Identifier returned by [`Navigator::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&UrlChangeEvent)>;

/// Work deferred to the next tick
#[derive(Debug)]
enum Task {
    /// Derive the url and sync it, unless a newer commit was scheduled
    CommitUrl { version: u64 },
    /// Deferred state write from `goto` or a popstate
    SetState(JsonValue),
    /// Simulated back navigation
    SetPath(String),
}

/// URL state store plus the engine that keeps it in sync with the host
pub struct Navigator<H: HistoryBackend> {
    host: H,
    prefs: Prefs,
    cells: UrlState,
    /// Last settled url
    url: String,
    /// Version of the most recently scheduled url commit
    version: u64,
    tasks: VecDeque<Task>,
    /// Set by host-driven changes, consumed by the next url commit
    popstate: bool,
    /// Entries pushed by this navigator and not yet unwound by `back`
    depth: usize,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<H: HistoryBackend> Navigator<H> {
    /// Create a navigator seeded from the host's current location.
    ///
    /// Nothing is written to the host at startup.
    pub fn new(host: H, prefs: Prefs) -> Self {
        let location = host.location();
        let cells = UrlState::from_location(&location, &prefs.query);
        let url = cells.url();

        let navigator = Self {
            host,
            prefs,
            cells,
            url,
            version: 0,
            tasks: VecDeque::new(),
            popstate: false,
            depth: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        };
        info_log!(
            "Navigator started at '{}' (side effects {})",
            navigator.url,
            if navigator.side_effects_enabled() { "on" } else { "off" }
        );
        navigator
    }

    /// Create with default preferences
    pub fn with_host(host: H) -> Self {
        Self::new(host, Prefs::default())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn prefs(&self) -> &Prefs {
        &self.prefs
    }

    /// Preferences are read on every write, changes apply immediately
    pub fn prefs_mut(&mut self) -> &mut Prefs {
        &mut self.prefs
    }

    pub fn path(&self) -> &Path {
        self.cells.path()
    }

    pub fn query(&self) -> &Query {
        self.cells.query()
    }

    pub fn fragment(&self) -> &str {
        self.cells.fragment()
    }

    pub fn state(&self) -> &JsonValue {
        self.cells.state()
    }

    /// All four cells
    pub fn cells(&self) -> &UrlState {
        &self.cells
    }

    /// The last settled url. Lags behind the cells until the next tick.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of entries this navigator pushed and has not gone back over
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether deferred work is waiting for [`tick`](Self::tick)
    pub fn has_pending(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Whether writes reach the host history
    pub fn side_effects_enabled(&self) -> bool {
        self.prefs.side_effect && !self.host.is_nested()
    }

    // ------------------------------------------------------------------------
    // Cell writes
    // ------------------------------------------------------------------------

    pub fn set_path(&mut self, path: impl Into<Path>) {
        self.cells.set_path(path);
        self.schedule_url_commit();
    }

    pub fn set_query(&mut self, query: impl Into<QueryInput>) {
        self.cells.set_query(query.into(), &self.prefs.query);
        self.schedule_url_commit();
    }

    pub fn set_fragment(&mut self, fragment: impl Into<String>) {
        self.cells.set_fragment(fragment);
        self.schedule_url_commit();
    }

    /// Replace the state payload of the host's current entry
    pub fn set_state(&mut self, state: JsonValue) {
        self.cells.set_state(state);
        self.sync_state();
    }

    pub fn update_path<P, F>(&mut self, reducer: F)
    where
        P: Into<Path>,
        F: FnOnce(&Path) -> P,
    {
        let next = reducer(self.cells.path());
        self.set_path(next);
    }

    pub fn update_query<Q, F>(&mut self, reducer: F)
    where
        Q: Into<QueryInput>,
        F: FnOnce(&Query) -> Q,
    {
        let next = reducer(self.cells.query());
        self.set_query(next);
    }

    pub fn update_fragment<S, F>(&mut self, reducer: F)
    where
        S: Into<String>,
        F: FnOnce(&str) -> S,
    {
        let next = reducer(self.cells.fragment());
        self.set_fragment(next);
    }

    pub fn update_state<F>(&mut self, reducer: F)
    where
        F: FnOnce(&JsonValue) -> JsonValue,
    {
        let next = reducer(self.cells.state());
        self.set_state(next);
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Navigate to `url`, optionally attaching `data` to the new entry.
    ///
    /// Path, query and fragment are all written before returning and settle
    /// as one history entry on the next tick. `data` is written after the url
    /// commit, so it lands on the new entry.
    ///
    /// # Example
    ///
    /// ```
    /// use url_pathfinder::{MemoryHistory, Navigator};
    ///
    /// let mut nav = Navigator::with_host(MemoryHistory::new("/"));
    /// nav.goto("/users/42?tab=posts#top", None).unwrap();
    /// nav.tick();
    ///
    /// assert_eq!(nav.url(), "/users/42?tab=posts#top");
    /// assert_eq!(nav.host().len(), 2);
    /// ```
    pub fn goto(&mut self, url: &str, data: Option<JsonValue>) -> Result<()> {
        let Location {
            pathname,
            search,
            hash,
        } = Location::resolve(url)?;
        debug_log!("goto '{}' -> '{}{}{}'", url, pathname, search, hash);

        self.set_path(pathname);
        self.set_query(search);
        self.set_fragment(hash);
        if let Some(data) = data.filter(|d| !d.is_null()) {
            self.tasks.push_back(Task::SetState(data));
        }
        Ok(())
    }

    /// Go back one entry.
    ///
    /// Uses the host's native back when this navigator has pushed entries and
    /// may write history; otherwise sets the path cell to `fallback` on the
    /// next tick.
    pub fn back(&mut self, fallback: &str) {
        if self.depth > 0 && self.side_effects_enabled() {
            debug_log!("history.back (depth {})", self.depth);
            self.host.back();
            self.depth -= 1;
        } else {
            debug_log!("Simulated back to '{}'", fallback);
            self.tasks.push_back(Task::SetPath(fallback.to_string()));
        }
    }

    /// Run `writes` and settle them before returning.
    ///
    /// All url writes inside the scope produce at most one history entry.
    pub fn batch<R>(&mut self, writes: impl FnOnce(&mut Self) -> R) -> R {
        let result = writes(self);
        self.tick();
        result
    }

    // ------------------------------------------------------------------------
    // Host events
    // ------------------------------------------------------------------------

    /// React to a browser back/forward navigation.
    ///
    /// The host location is authoritative: the cells are re-read from it and
    /// `state` is re-applied. The resulting commit does not push.
    pub fn pop_state(&mut self, state: JsonValue) {
        if !self.side_effects_enabled() {
            trace_log!("Ignoring popstate, side effects are off");
            return;
        }

        self.popstate = true;
        let Location {
            pathname,
            search,
            hash,
        } = self.host.location();
        self.set_path(pathname);
        self.set_query(search);
        self.set_fragment(hash);
        if !state.is_null() {
            self.tasks.push_back(Task::SetState(state));
        }
    }

    /// React to a fragment change made by the host
    pub fn hash_change(&mut self) {
        if !self.side_effects_enabled() {
            return;
        }
        self.popstate = true;
        let hash = self.host.location().hash;
        self.set_fragment(hash);
    }

    /// Deliver a popstate the host has queued, if any
    pub fn poll_host(&mut self) -> bool {
        match self.host.take_popstate() {
            Some(state) => {
                self.pop_state(state);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------------
    // Deferred work
    // ------------------------------------------------------------------------

    /// Run all deferred work, including work scheduled while running.
    ///
    /// Returns the url changes that settled, in order.
    pub fn tick(&mut self) -> Vec<UrlChangeEvent> {
        let mut events = Vec::new();

        while let Some(task) = self.tasks.pop_front() {
            match task {
                Task::CommitUrl { version } => {
                    if let Some(event) = self.commit_url(version) {
                        for (_, listener) in &mut self.listeners {
                            listener(&event);
                        }
                        events.push(event);
                    }
                }
                Task::SetState(state) => self.set_state(state),
                Task::SetPath(path) => self.set_path(path),
            }
        }

        events
    }

    /// Observe settled url changes
    pub fn subscribe(&mut self, listener: impl FnMut(&UrlChangeEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns whether it was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn schedule_url_commit(&mut self) {
        self.version += 1;
        trace_log!("Scheduling url commit v{}", self.version);
        self.tasks.push_back(Task::CommitUrl {
            version: self.version,
        });
    }

    fn commit_url(&mut self, version: u64) -> Option<UrlChangeEvent> {
        if version != self.version {
            trace_log!("Url commit v{} superseded by v{}", version, self.version);
            return None;
        }

        let host_driven = std::mem::take(&mut self.popstate);
        let next = self.cells.url();
        if next == self.url {
            trace_log!("Url unchanged at '{}'", next);
            return None;
        }
        let from = std::mem::replace(&mut self.url, next.clone());

        let pushed = if !self.side_effects_enabled() {
            false
        } else if host_driven {
            trace_log!("Host already at '{}', not pushing", next);
            false
        } else {
            debug_log!("pushState '{}'", next);
            self.host
                .push_state(&JsonValue::Object(serde_json::Map::new()), &next);
            self.depth += 1;
            true
        };

        Some(UrlChangeEvent {
            from,
            to: next,
            origin: if host_driven {
                ChangeOrigin::Host
            } else {
                ChangeOrigin::Navigator
            },
            pushed,
        })
    }

    fn sync_state(&mut self) {
        if !self.side_effects_enabled() {
            return;
        }
        let href = self.host.location().href();
        debug_log!("replaceState at '{}'", href);
        self.host.replace_state(self.cells.state(), &href);
    }
}

impl<H: HistoryBackend + std::fmt::Debug> std::fmt::Debug for Navigator<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("host", &self.host)
            .field("prefs", &self.prefs)
            .field("cells", &self.cells)
            .field("url", &self.url)
            .field("version", &self.version)
            .field("popstate", &self.popstate)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
