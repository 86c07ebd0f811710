//! # url-pathfinder
//!
//! URL state management with:
//!
//! - **Nested query strings** - `a[b][c]=1`, `ids[]=1&ids[]=2` or separator arrays (`ids=1,2`)
//! - **Type coercion** - `"42"` becomes a number, `"true"` a boolean, `"null"` null
//! - **Route templates** - `/users/:id`, `/:page?`, `/file/:name.json`, `/assets/*`
//! - **Batched history writes** - writes made in one tick produce one history entry
//! - **Host history abstraction** - [`HistoryBackend`], with [`MemoryHistory`] for tests and headless use
//!
//! # Quick Start
//!
//! ```
//! use url_pathfinder::{MemoryHistory, Navigator, Value};
//!
//! let mut nav = Navigator::with_host(MemoryHistory::new("/"));
//!
//! nav.set_path("/products");
//! nav.set_query("page=2&filter[color]=red");
//! nav.set_fragment("#list");
//! nav.tick();
//!
//! assert_eq!(nav.url(), "/products?page=2&filter[color]=red#list");
//! assert_eq!(nav.query().get("page"), Some(&Value::Number(2.0)));
//! // three writes, one entry
//! assert_eq!(nav.host().len(), 2);
//! ```
//!
//! # Route Matching
//!
//! ```
//! use url_pathfinder::{match_route, Value};
//!
//! let result = match_route("/users/42/posts", "/users/:id/:tab?").unwrap();
//! assert!(result.matched);
//! assert_eq!(result.params.get("id"), Some(&Value::Number(42.0)));
//! assert_eq!(result.params.get("tab"), Some(&Value::from("posts")));
//! ```
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `cache` (default) - [`PatternCache`] for compiled route templates
//! - `gpui` - Keeps the navigator in a GPUI global and settles writes with `App::defer`

#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Query codec
pub mod coerce;
pub mod config;
pub mod keys;
pub mod query;
pub mod value;

// Route templates
pub mod matcher;
pub mod params;

// State and synchronization
pub mod history;
pub mod location;
pub mod navigator;
pub mod state;

// Error handling
pub mod error;

// GPUI integration (optional)
#[cfg(feature = "gpui")]
pub mod context;

// Re-export main types for convenient access
#[cfg(feature = "cache")]
pub use cache::{CacheStats, PatternCache};
pub use coerce::{convert_str, convert_type};
pub use config::{ArrayConfig, ArrayFormat, Prefs, QueryConfig};
#[cfg(feature = "gpui")]
pub use context::{init_navigator, GlobalNavigator, UseNavigator};
pub use error::{NavigationError, Result};
pub use history::{HistoryBackend, HistoryEntry, MemoryHistory};
pub use location::Location;
pub use matcher::{match_route, RoutePattern, WILDCARD_KEY};
pub use navigator::{Navigator, SubscriptionId};
pub use params::{MatchResult, RouteParams};
pub use query::{
    decode_uri_component, encode_uri_component, parse_query, stringify_query, Query, QueryInput,
};
pub use state::{Path, UrlState};
pub use value::{Map, Value};

pub use serde_json;

/// Who caused a url change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// A cell write, `goto` or `back` on the navigator
    Navigator,
    /// The host moved first (popstate or hashchange); nothing was pushed
    Host,
}

/// Event emitted when the settled url changes.
///
/// Produced by [`Navigator::tick`] and delivered to subscribers in the order
/// the changes settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlChangeEvent {
    /// The previous settled url
    pub from: String,
    /// The new settled url
    pub to: String,
    /// Where the change came from
    pub origin: ChangeOrigin,
    /// Whether a history entry was pushed for it
    pub pushed: bool,
}
