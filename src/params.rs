//! Route parameters extracted by the matcher
//!
//! Values are already coerced: `/user/42` against `/user/:id` yields
//! `Value::Number(42.0)`, not the string `"42"`.

use crate::value::{Map, Value};

/// Route parameters extracted from path segments
///
/// # Example
///
/// ```
/// use url_pathfinder::{RouteParams, Value};
///
/// // Route pattern: /users/:id
/// // Matched path: /users/123
/// let mut params = RouteParams::new();
/// params.insert("id".to_string(), Value::Number(123.0));
///
/// assert_eq!(params.get("id"), Some(&Value::Number(123.0)));
/// assert_eq!(params.get_as::<i32>("id"), Some(123));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteParams {
    params: Map,
}

impl RouteParams {
    /// Create new empty route params
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a map
    pub fn from_map(params: Map) -> Self {
        Self { params }
    }

    /// Get a parameter value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Get a parameter and parse its string form as a specific type
    ///
    /// Returns `None` if the parameter doesn't exist or cannot be parsed.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(key)?.to_string().parse().ok()
    }

    /// Insert a parameter
    pub fn insert(&mut self, key: String, value: Value) {
        self.params.insert(key, value);
    }

    /// Check if parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Get all parameters
    pub fn all(&self) -> &Map {
        &self.params
    }

    /// Iterate over all parameters
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.params.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn into_map(self) -> Map {
        self.params
    }
}

/// Outcome of matching a path against a route pattern.
///
/// Returned by value; the matched path is never modified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    /// Whether the path matched
    pub matched: bool,
    /// Coerced parameters, empty when `matched` is false
    pub params: RouteParams,
}

impl MatchResult {
    pub fn matched(params: RouteParams) -> Self {
        Self {
            matched: true,
            params,
        }
    }

    pub fn no_match() -> Self {
        Self::default()
    }

    /// The parameters, if the path matched
    pub fn into_params(self) -> Option<RouteParams> {
        self.matched.then_some(self.params)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_params_basic() {
        let mut params = RouteParams::new();
        params.insert("id".to_string(), Value::Number(123.0));

        assert_eq!(params.get("id"), Some(&Value::Number(123.0)));
        assert!(params.contains("id"));
        assert!(!params.contains("missing"));
    }

    #[test]
    fn test_route_params_get_as() {
        let mut params = RouteParams::new();
        params.insert("id".to_string(), Value::Number(123.0));
        params.insert("active".to_string(), Value::Bool(true));
        params.insert("slug".to_string(), Value::from("intro"));

        assert_eq!(params.get_as::<i32>("id"), Some(123));
        assert_eq!(params.get_as::<u32>("id"), Some(123));
        assert_eq!(params.get_as::<bool>("active"), Some(true));
        assert_eq!(params.get_as::<String>("slug"), Some("intro".to_string()));
        assert_eq!(params.get_as::<i32>("slug"), None);
        assert_eq!(params.get_as::<i32>("missing"), None);
    }

    #[test]
    fn test_route_params_from_map() {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::from("John"));
        map.insert("age".to_string(), Value::Number(30.0));

        let params = RouteParams::from_map(map);
        assert_eq!(params.len(), 2);
        assert_eq!(params.iter().count(), 2);
        assert_eq!(params.get_as::<i32>("age"), Some(30));
    }

    #[test]
    fn test_match_result_params() {
        assert_eq!(MatchResult::no_match().into_params(), None);

        let mut params = RouteParams::new();
        params.insert("a".to_string(), Value::Null);
        let result = MatchResult::matched(params.clone());
        assert!(result.matched);
        assert_eq!(result.into_params(), Some(params));
    }
}
