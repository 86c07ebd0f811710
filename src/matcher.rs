//! Route template compilation and matching
//!
//! Templates use `/`-separated segments:
//! - `users` - literal, used verbatim
//! - `:id` - required parameter
//! - `:id?` - optional parameter (the whole segment may be missing)
//! - `:name.json` - parameter followed by a literal extension
//! - `:name?.json` - optional parameter, optional extension
//! - `*` - captures the rest of the path as `wild`
//!
//! Matching is case-insensitive and anchored at the start. A strict pattern
//! allows one trailing slash; a loose pattern also matches when more segments
//! follow.

use crate::coerce::convert_str;
use crate::config::QueryConfig;
use crate::error::{NavigationError, Result};
use crate::params::{MatchResult, RouteParams};
use crate::value::Value;
use crate::{trace_log, warn_log};
use regex::{Regex, RegexBuilder};

/// Parameter name used for a trailing `*` segment.
pub const WILDCARD_KEY: &str = "wild";

/// Maximum allowed size for a compiled route pattern (in bytes).
const MAX_PATTERN_SIZE: usize = 1 << 20; // 1 MiB

/// A compiled route template
#[derive(Debug, Clone)]
pub struct RoutePattern {
    template: String,
    regex: Regex,
    keys: Vec<String>,
    loose: bool,
}

impl RoutePattern {
    /// Compile a template that must match the whole path
    ///
    /// # Example
    ///
    /// ```
    /// use url_pathfinder::{RoutePattern, Value};
    ///
    /// let pattern = RoutePattern::compile("/user/:id").unwrap();
    /// let result = pattern.matches("/user/42");
    /// assert!(result.matched);
    /// assert_eq!(result.params.get("id"), Some(&Value::Number(42.0)));
    /// assert!(!pattern.matches("/user/42/extra").matched);
    /// ```
    pub fn compile(template: &str) -> Result<Self> {
        Self::build(template, false)
    }

    /// Compile a template that also matches path prefixes ending on a segment
    pub fn compile_loose(template: &str) -> Result<Self> {
        Self::build(template, true)
    }

    fn build(template: &str, loose: bool) -> Result<Self> {
        let (source, keys) = compile_template(template, loose);
        trace_log!("Compiled route '{}' to '{}' with keys {:?}", template, source, keys);

        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .size_limit(MAX_PATTERN_SIZE)
            .build()
            .map_err(|source| {
                warn_log!("Route template '{}' does not compile: {}", template, source);
                NavigationError::InvalidPattern {
                    template: template.to_string(),
                    source,
                }
            })?;

        Ok(Self {
            template: template.to_string(),
            regex,
            keys,
            loose,
        })
    }

    /// The template this pattern was compiled from
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parameter names in capture order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The generated regular expression
    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    pub fn is_loose(&self) -> bool {
        self.loose
    }

    /// Match a path, coercing each capture.
    ///
    /// Captures split on `|` into arrays; an optional parameter that did not
    /// participate in the match is `Null`.
    pub fn matches(&self, path: &str) -> MatchResult {
        let Some(captures) = self.regex.captures(path) else {
            return MatchResult::no_match();
        };

        let config = QueryConfig::route_params();
        let mut params = RouteParams::new();
        for (i, key) in self.keys.iter().enumerate() {
            let value = captures
                .get(i + 1)
                .map_or(Value::Null, |m| convert_str(m.as_str(), &config));
            params.insert(key.clone(), value);
        }

        MatchResult::matched(params)
    }
}

/// Compile `template` and match `path` in one step.
///
/// The template is compiled on every call; see
/// [`PatternCache`](crate::cache::PatternCache) to reuse compiled patterns.
pub fn match_route(path: &str, template: &str) -> Result<MatchResult> {
    Ok(RoutePattern::compile(template)?.matches(path))
}

/// Build the regex source and the ordered parameter names.
fn compile_template(template: &str, loose: bool) -> (String, Vec<String>) {
    let mut keys = Vec::new();
    let mut source = String::from("^");

    let mut segments = template.split('/').peekable();
    if segments.peek() == Some(&"") {
        segments.next();
    }

    // An empty segment ends the template ("/a//b" compiles as "/a").
    for segment in segments.take_while(|s| !s.is_empty()) {
        if segment.starts_with('*') {
            keys.push(WILDCARD_KEY.to_string());
            source.push_str("/(.*)");
        } else if let Some(param) = segment.strip_prefix(':') {
            let optional = param.find('?');
            let extension = param.find('.');
            let name_end = optional.or(extension).unwrap_or(param.len());
            keys.push(param[..name_end].to_string());

            match (optional.is_some(), extension) {
                (false, None) => source.push_str("/([^/]+?)"),
                (true, None) => source.push_str("(?:/([^/]+?))?"),
                (false, Some(dot)) => {
                    source.push_str("/([^/]+?)");
                    source.push_str(&regex::escape(&param[dot..]));
                }
                (true, Some(dot)) => {
                    source.push_str("(?:/([^/]+?))?");
                    source.push_str("(?:");
                    source.push_str(&regex::escape(&param[dot..]));
                    source.push_str(")?");
                }
            }
        } else {
            source.push('/');
            source.push_str(segment);
        }
    }

    source.push_str(if loose { "(?:$|/)" } else { "/?$" });
    (source, keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_of(template: &str, path: &str) -> RouteParams {
        let result = match_route(path, template).unwrap();
        assert!(result.matched, "{} should match {}", template, path);
        result.params
    }

    #[test]
    fn test_compile_keys_and_source() {
        let (source, keys) = compile_template("/user/:id", false);
        assert_eq!(source, "^/user/([^/]+?)/?$");
        assert_eq!(keys, vec!["id"]);

        let (source, keys) = compile_template("/assets/*", true);
        assert_eq!(source, "^/assets/(.*)(?:$|/)");
        assert_eq!(keys, vec!["wild"]);
    }

    #[test]
    fn test_key_count_equals_capture_count() {
        for template in ["/a/:b/:c?/*", "/file/:name?.json", "/x", "/"] {
            let pattern = RoutePattern::compile(template).unwrap();
            assert_eq!(
                pattern.keys().len() + 1,
                pattern.as_regex().captures_len(),
                "{}",
                template
            );
        }
    }

    #[test]
    fn test_static_route_matching() {
        assert!(match_route("/users", "/users").unwrap().matched);
        assert!(match_route("/users/", "/users").unwrap().matched);
        assert!(match_route("/USERS", "/users").unwrap().matched);
        assert!(!match_route("/posts", "/users").unwrap().matched);
        assert!(!match_route("/users/1", "/users").unwrap().matched);
    }

    #[test]
    fn test_root_template() {
        assert!(match_route("/", "/").unwrap().matched);
        assert!(match_route("", "").unwrap().matched);
        assert!(!match_route("/a", "/").unwrap().matched);
    }

    #[test]
    fn test_param_is_coerced() {
        let params = params_of("/user/:id", "/user/42");
        assert_eq!(params.get("id"), Some(&Value::Number(42.0)));

        let params = params_of("/user/:name", "/user/ann");
        assert_eq!(params.get("name"), Some(&Value::from("ann")));

        assert!(!match_route("/user/42/extra", "/user/:id").unwrap().matched);
    }

    #[test]
    fn test_param_splits_on_pipe() {
        let params = params_of("/tags/:list", "/tags/a|b");
        assert_eq!(
            params.get("list"),
            Some(&Value::Array(vec![Value::from("a"), Value::from("b")]))
        );

        let params = params_of("/tags/:list", "/tags/a,b");
        assert_eq!(params.get("list"), Some(&Value::from("a,b")));
    }

    #[test]
    fn test_optional_param() {
        let params = params_of("/posts/:page?", "/posts");
        assert_eq!(params.get("page"), Some(&Value::Null));

        let params = params_of("/posts/:page?", "/posts/3");
        assert_eq!(params.get("page"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn test_required_extension() {
        let params = params_of("/file/:name.json", "/file/report.json");
        assert_eq!(params.get("name"), Some(&Value::from("report")));
        assert!(!match_route("/file/report.xml", "/file/:name.json").unwrap().matched);
        assert!(!match_route("/file.json", "/file/:name.json").unwrap().matched);
    }

    #[test]
    fn test_optional_extension() {
        let params = params_of("/file/:name?.json", "/file.json");
        assert_eq!(params.get("name"), Some(&Value::Null));

        let params = params_of("/file/:name?.json", "/file/report.json");
        assert_eq!(params.get("name"), Some(&Value::from("report")));
    }

    #[test]
    fn test_wildcard() {
        let params = params_of("/assets/*", "/assets/a/b/c.png");
        assert_eq!(params.get("wild"), Some(&Value::from("a/b/c.png")));
    }

    #[test]
    fn test_loose_prefix_match() {
        let strict = RoutePattern::compile("/users/:id").unwrap();
        let loose = RoutePattern::compile_loose("/users/:id").unwrap();

        assert!(!strict.matches("/users/7/posts").matched);
        let result = loose.matches("/users/7/posts");
        assert!(result.matched);
        assert_eq!(result.params.get("id"), Some(&Value::Number(7.0)));
        assert!(loose.is_loose());
        assert!(!loose.matches("/users7").matched);
    }

    #[test]
    fn test_no_match_has_no_params() {
        let result = match_route("/other", "/user/:id").unwrap();
        assert!(!result.matched);
        assert!(result.params.is_empty());
    }

    #[test]
    fn test_invalid_literal_segment() {
        let err = RoutePattern::compile("/bad(/:id").unwrap_err();
        assert!(err.is_invalid_pattern());
    }

    #[test]
    fn test_empty_segment_ends_template() {
        let pattern = RoutePattern::compile("/a//b").unwrap();
        assert!(pattern.matches("/a").matched);
        assert_eq!(pattern.template(), "/a//b");
    }
}
