//! Navigator integration for GPUI
//!
//! The navigator lives in a GPUI [`Global`]. Writes go through the free
//! functions below, which apply them immediately and defer the tick to the
//! end of the current effect cycle with [`App::defer`], so every write made in
//! one update settles as a single history entry.

use crate::config::Prefs;
use crate::error::Result;
use crate::history::HistoryBackend;
use crate::navigator::Navigator;
use crate::query::QueryInput;
use crate::state::Path;
use crate::trace_log;
use gpui::{App, Global};
use serde_json::Value as JsonValue;
use std::ops::{Deref, DerefMut};

// ============================================================================
// GlobalNavigator
// ============================================================================

/// Navigator stored as a GPUI global
pub struct GlobalNavigator(Navigator<Box<dyn HistoryBackend>>);

impl GlobalNavigator {
    pub fn new(host: Box<dyn HistoryBackend>, prefs: Prefs) -> Self {
        Self(Navigator::new(host, prefs))
    }

    pub fn into_inner(self) -> Navigator<Box<dyn HistoryBackend>> {
        self.0
    }
}

impl Deref for GlobalNavigator {
    type Target = Navigator<Box<dyn HistoryBackend>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for GlobalNavigator {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Global for GlobalNavigator {}

/// Trait for accessing the global navigator from context
pub trait UseNavigator {
    /// Get reference to global navigator
    fn navigator(&self) -> &GlobalNavigator;

    /// Update global navigator
    fn update_navigator<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut GlobalNavigator, &mut App) -> R;
}

impl UseNavigator for App {
    fn navigator(&self) -> &GlobalNavigator {
        self.global::<GlobalNavigator>()
    }

    fn update_navigator<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut GlobalNavigator, &mut App) -> R,
    {
        self.update_global(f)
    }
}

/// Install the global navigator, seeded from `host`
///
/// # Example
///
/// ```ignore
/// use url_pathfinder::{context::init_navigator, MemoryHistory, Prefs};
///
/// Application::new().run(|cx| {
///     init_navigator(cx, Box::new(MemoryHistory::new("/")), Prefs::default());
/// });
/// ```
pub fn init_navigator(cx: &mut App, host: Box<dyn HistoryBackend>, prefs: Prefs) {
    cx.set_global(GlobalNavigator::new(host, prefs));
}

// ============================================================================
// Writes
// ============================================================================

/// Run `write` against the navigator, then settle on the next effect cycle
fn write_and_settle<R>(cx: &mut App, write: impl FnOnce(&mut GlobalNavigator) -> R) -> R {
    let result = cx.update_navigator(|nav, _| write(nav));
    cx.defer(|cx| {
        cx.update_navigator(|nav, _| {
            if nav.has_pending() {
                let events = nav.tick();
                trace_log!("Deferred tick settled {} url change(s)", events.len());
            }
        });
    });
    result
}

/// Navigate to `url`, see [`Navigator::goto`]
pub fn goto(cx: &mut App, url: &str, data: Option<JsonValue>) -> Result<()> {
    write_and_settle(cx, |nav| nav.goto(url, data))
}

/// Go back, see [`Navigator::back`]
pub fn back(cx: &mut App, fallback: &str) {
    write_and_settle(cx, |nav| nav.back(fallback));
}

pub fn set_path(cx: &mut App, path: impl Into<Path>) {
    write_and_settle(cx, |nav| nav.set_path(path));
}

pub fn set_query(cx: &mut App, query: impl Into<QueryInput>) {
    write_and_settle(cx, |nav| nav.set_query(query));
}

pub fn set_fragment(cx: &mut App, fragment: impl Into<String>) {
    write_and_settle(cx, |nav| nav.set_fragment(fragment));
}

/// Replace the current entry's state; applied immediately
pub fn set_state(cx: &mut App, state: JsonValue) {
    cx.update_navigator(|nav, _| nav.set_state(state));
}

/// Forward a host popstate event
pub fn pop_state(cx: &mut App, state: JsonValue) {
    write_and_settle(cx, |nav| nav.pop_state(state));
}

/// Forward a host hashchange event
pub fn hash_change(cx: &mut App) {
    write_and_settle(cx, |nav| nav.hash_change());
}

/// Deliver a popstate queued by the host, see [`Navigator::poll_host`]
pub fn poll_host(cx: &mut App) -> bool {
    write_and_settle(cx, |nav| nav.poll_host())
}

/// Last settled url
pub fn current_url(cx: &App) -> String {
    cx.navigator().url().to_string()
}
