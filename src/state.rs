//! URL state cells
//!
//! Path, query and fragment are canonicalized independently when written. The
//! opaque `state` payload is stored as given.

use crate::config::QueryConfig;
use crate::error::Result;
use crate::location::Location;
use crate::matcher::RoutePattern;
use crate::params::MatchResult;
use crate::query::{Query, QueryInput};
use serde_json::Value as JsonValue;
use std::fmt;

/// Path cell value
///
/// # Example
///
/// ```
/// use url_pathfinder::{Path, Value};
///
/// let path = Path::new("/user/42");
/// let result = path.matches("/user/:id").unwrap();
/// assert!(result.matched);
/// assert_eq!(result.params.get("id"), Some(&Value::Number(42.0)));
/// assert_eq!(path.as_str(), "/user/42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Path(String);

impl Path {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Match against a route template (compiled for this call)
    pub fn matches(&self, template: &str) -> Result<MatchResult> {
        Ok(RoutePattern::compile(template)?.matches(&self.0))
    }

    /// Match against a route template, accepting longer paths
    pub fn matches_loose(&self, template: &str) -> Result<MatchResult> {
        Ok(RoutePattern::compile_loose(template)?.matches(&self.0))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for Path {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// The four state cells
#[derive(Debug, Clone, PartialEq)]
pub struct UrlState {
    path: Path,
    query: Query,
    fragment: String,
    state: JsonValue,
}

impl UrlState {
    /// Seed the cells from a host location
    pub fn from_location(location: &Location, config: &QueryConfig) -> Self {
        Self {
            path: Path::new(location.pathname.as_str()),
            query: Query::parse(&location.search, config),
            fragment: location.hash.clone(),
            state: JsonValue::Object(serde_json::Map::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn state(&self) -> &JsonValue {
        &self.state
    }

    /// Combined url from the canonical string forms of the three cells
    pub fn url(&self) -> String {
        format!("{}{}{}", self.path, self.query, self.fragment)
    }

    pub(crate) fn set_path(&mut self, path: impl Into<Path>) {
        self.path = path.into();
    }

    pub(crate) fn set_query(&mut self, input: QueryInput, config: &QueryConfig) {
        self.query = Query::from_input(input, config);
    }

    pub(crate) fn set_fragment(&mut self, fragment: impl Into<String>) {
        self.fragment = fragment.into();
    }

    pub(crate) fn set_state(&mut self, state: JsonValue) {
        self.state = state;
    }
}

impl Default for UrlState {
    fn default() -> Self {
        Self::from_location(&Location::new("/", "", ""), &QueryConfig::default())
    }
}
