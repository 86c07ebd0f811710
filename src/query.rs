//! Nested query string codec
//!
//! Parses `?a=1&user[name]=ann&tags[]=x&tags[]=y` into a nested [`Map`] and
//! writes it back. Arrays use either bracket pairs or a single joined value,
//! see [`ArrayFormat`].
//!
//! Two behaviours are kept as-is and worth knowing about:
//!
//! - `stringify_query` skips top-level keys that start with an integer
//!   (`"0"`, `"12abc"`); they are treated as stray array indices.
//! - Repeating a non-array key keeps the first value unless it is falsy
//!   (`0`, `""`, `false`, `null`), in which case the later value replaces it.
//!   Two objects are merged one level deep (`a[b]=1&a[c]=2` keeps both).

use crate::coerce::convert_type;
use crate::config::{ArrayFormat, QueryConfig};
use crate::keys::{build_from_chain, parse_key};
use crate::trace_log;
use crate::value::{Map, Value};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

/// Characters left as-is by [`encode_uri_component`].
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode everything except the URI component unreserved set
pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// Percent-decode, replacing invalid UTF-8 sequences
pub fn decode_uri_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Parse a raw query string into a nested map.
///
/// # Example
///
/// ```
/// use url_pathfinder::{parse_query, QueryConfig, Value};
///
/// let params = parse_query("?page=2&user[name]=ann", &QueryConfig::default());
/// assert_eq!(params.get("page"), Some(&Value::Number(2.0)));
/// assert_eq!(
///     params.get("user").and_then(|u| u.get("name")),
///     Some(&Value::from("ann"))
/// );
/// ```
pub fn parse_query(raw: &str, config: &QueryConfig) -> Map {
    let raw = raw.strip_prefix('?').unwrap_or(raw).replace('+', " ");
    let mut params = Map::new();

    for part in raw.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = part.split_once('=').unwrap_or((part, ""));
        let key = decode_uri_component(key);
        let value = decode_uri_component(value);

        let chain = parse_key(&key, config.nesting);
        if chain.is_empty() {
            trace_log!("Skipping query pair without a key: '{}'", part);
            continue;
        }

        let built = build_from_chain(&chain, Value::String(value));
        for (key, value) in built.into_entries() {
            merge_entry(&mut params, key, convert_type(value, config));
        }
    }

    params
}

fn merge_entry(params: &mut Map, key: String, incoming: Value) {
    match params.get_mut(&key) {
        Some(Value::Array(items)) => match incoming {
            Value::Array(more) => items.extend(more),
            other => items.push(other),
        },
        Some(Value::Object(existing)) => {
            if incoming.is_object() || incoming.is_array() {
                existing.extend(incoming.into_entries());
            }
        }
        // A truthy scalar is never merged into.
        Some(slot) if slot.is_truthy() => {
            trace_log!("Keeping first value of repeated query key '{}'", key);
        }
        Some(slot) => *slot = incoming,
        None => {
            params.insert(key, incoming);
        }
    }
}

/// Write a nested map as a query string, `?`-prefixed unless empty.
///
/// # Example
///
/// ```
/// use url_pathfinder::{stringify_query, Map, QueryConfig, Value};
///
/// let mut params = Map::new();
/// params.insert("tags".into(), Value::from(vec![Value::from("a"), Value::from("b")]));
/// assert_eq!(stringify_query(&params, &QueryConfig::default()), "?tags[]=a&tags[]=b");
/// ```
pub fn stringify_query(params: &Map, config: &QueryConfig) -> String {
    let mut parts = Vec::new();

    for (key, value) in params {
        if starts_with_integer(key) {
            trace_log!("Skipping integer query key '{}'", key);
            continue;
        }

        match value {
            Value::Array(items) => match config.array.format {
                ArrayFormat::Separator => {
                    let joined = items
                        .iter()
                        .map(|item| encode_uri_component(&join_element(item)))
                        .collect::<Vec<_>>()
                        .join(&config.array.separator);
                    parts.push(format!("{}={}", key, joined));
                }
                ArrayFormat::Bracket => {
                    for item in items.iter().filter(|item| !item.is_undefined()) {
                        parts.push(format!(
                            "{}[]={}",
                            key,
                            encode_uri_component(&item.to_string())
                        ));
                    }
                }
            },
            Value::Object(_) => {
                let chain = parse_key(key, config.nesting);
                let expanded = build_from_chain(&chain, value.clone());
                flatten(&expanded, "", &mut parts);
            }
            scalar => parts.push(format!(
                "{}={}",
                key,
                encode_uri_component(&scalar.to_string())
            )),
        }
    }

    let query = parts.join("&");
    if query.is_empty() {
        query
    } else {
        format!("?{}", query)
    }
}

fn join_element(item: &Value) -> String {
    match item {
        Value::Null | Value::Undefined => String::new(),
        other => other.to_string(),
    }
}

fn flatten(value: &Value, prefix: &str, parts: &mut Vec<String>) {
    let entries: Vec<(String, &Value)> = match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_undefined())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => return,
    };

    for (key, child) in entries {
        let path = if prefix.is_empty() {
            key
        } else {
            format!("{}[{}]", prefix, key)
        };
        match child {
            Value::Object(_) | Value::Array(_) => flatten(child, &path, parts),
            scalar => parts.push(format!(
                "{}={}",
                path,
                encode_uri_component(&scalar.to_string())
            )),
        }
    }
}

/// Leading-integer test: optional whitespace and sign, then at least one digit.
fn starts_with_integer(key: &str) -> bool {
    let rest = key.trim_start();
    let rest = rest
        .strip_prefix('-')
        .or_else(|| rest.strip_prefix('+'))
        .unwrap_or(rest);
    rest.bytes().next().is_some_and(|b| b.is_ascii_digit())
}

// ============================================================================
// Query cell value
// ============================================================================

/// What a caller may assign to the query cell
#[derive(Debug, Clone, PartialEq)]
pub enum QueryInput {
    /// A raw query string, with or without the leading `?`
    Raw(String),
    /// Structured parameters, stringified before being stored
    Params(Map),
}

impl From<&str> for QueryInput {
    fn from(raw: &str) -> Self {
        QueryInput::Raw(raw.to_string())
    }
}

impl From<String> for QueryInput {
    fn from(raw: String) -> Self {
        QueryInput::Raw(raw)
    }
}

impl From<Map> for QueryInput {
    fn from(params: Map) -> Self {
        QueryInput::Params(params)
    }
}

impl From<Query> for QueryInput {
    fn from(query: Query) -> Self {
        QueryInput::Raw(query.raw)
    }
}

/// Canonical query cell value: both its string form and its parsed parameters
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    raw: String,
    params: Map,
}

impl Query {
    /// Parse a raw query string, keeping it as the string form
    pub fn parse(raw: &str, config: &QueryConfig) -> Self {
        let raw = match raw {
            "" | "?" => String::new(),
            r if r.starts_with('?') => r.to_string(),
            r => format!("?{}", r),
        };
        let params = parse_query(&raw, config);
        Self { raw, params }
    }

    /// Stringify parameters, then parse the result back
    pub fn from_params(params: &Map, config: &QueryConfig) -> Self {
        Self::parse(&stringify_query(params, config), config)
    }

    /// Canonicalize either input form
    pub fn from_input(input: QueryInput, config: &QueryConfig) -> Self {
        match input {
            QueryInput::Raw(raw) => Self::parse(&raw, config),
            QueryInput::Params(params) => Self::from_params(&params, config),
        }
    }

    /// The string form, `?`-prefixed unless empty
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed parameters
    pub fn params(&self) -> &Map {
        &self.params
    }

    /// Get a top-level parameter
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Check if a top-level parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn into_params(self) -> Map {
        self.params
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bracket() -> QueryConfig {
        QueryConfig::default()
    }

    fn separator() -> QueryConfig {
        QueryConfig::default().with_format(ArrayFormat::Separator)
    }

    #[test]
    fn test_uri_encoding() {
        assert_eq!(encode_uri_component("hello world"), "hello%20world");
        assert_eq!(encode_uri_component("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_uri_component("it's (ok)!*~"), "it's%20(ok)!*~");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }

    #[test]
    fn test_uri_decoding() {
        assert_eq!(decode_uri_component("hello%20world"), "hello world");
        assert_eq!(decode_uri_component("%C3%A9"), "é");
        assert_eq!(decode_uri_component("100%"), "100%");
    }

    #[test]
    fn test_parse_scalars() {
        let params = parse_query("?page=1&sort=name&active=true&gone", &bracket());
        assert_eq!(params.get("page"), Some(&Value::Number(1.0)));
        assert_eq!(params.get("sort"), Some(&Value::from("name")));
        assert_eq!(params.get("active"), Some(&Value::Bool(true)));
        assert_eq!(params.get("gone"), Some(&Value::from("")));
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_query("", &bracket()).is_empty());
        assert!(parse_query("?", &bracket()).is_empty());
        assert!(parse_query("?&&", &bracket()).is_empty());
    }

    #[test]
    fn test_parse_plus_and_percent() {
        let params = parse_query("q=hello+world&r=a%2Bb", &bracket());
        assert_eq!(params.get("q"), Some(&Value::from("hello world")));
        assert_eq!(params.get("r"), Some(&Value::from("a+b")));
    }

    #[test]
    fn test_parse_value_keeps_later_equals() {
        let params = parse_query("expr=a=b", &bracket());
        assert_eq!(params.get("expr"), Some(&Value::from("a=b")));
    }

    #[test]
    fn test_parse_bracket_arrays() {
        let params = parse_query("?arr[]=1&arr[]=2&arr[]=x", &bracket());
        assert_eq!(
            params.get("arr"),
            Some(&Value::Array(vec![
                Value::Number(1.0),
                Value::Number(2.0),
                Value::from("x")
            ]))
        );
    }

    #[test]
    fn test_parse_separator_arrays() {
        let params = parse_query("?ids=1,2,3&one=4", &separator());
        assert_eq!(
            params.get("ids"),
            Some(&Value::Array(vec![
                Value::from("1"),
                Value::from("2"),
                Value::from("3")
            ]))
        );
        assert_eq!(params.get("one"), Some(&Value::Number(4.0)));
    }

    #[test]
    fn test_parse_nested_objects_merge_one_level() {
        let params = parse_query("user[name]=ann&user[age]=30", &bracket());
        let user = params.get("user").and_then(Value::as_object).unwrap();
        assert_eq!(user.get("name"), Some(&Value::from("ann")));
        assert_eq!(user.get("age"), Some(&Value::Number(30.0)));
    }

    #[test]
    fn test_parse_deep_merge_is_shallow() {
        let params = parse_query("a[b][c]=1&a[b][d]=2", &bracket());
        let b = params.get("a").and_then(|a| a.get("b")).unwrap();
        assert!(b.get("c").is_none());
        assert_eq!(b.get("d"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_parse_repeated_scalar_keeps_truthy_first() {
        let params = parse_query("a=1&a=2", &bracket());
        assert_eq!(params.get("a"), Some(&Value::Number(1.0)));

        let params = parse_query("a=x&a[b]=1", &bracket());
        assert_eq!(params.get("a"), Some(&Value::from("x")));

        let params = parse_query("a[b]=1&a=x", &bracket());
        assert_eq!(
            params.get("a"),
            Some(&Value::object([("b", Value::Number(1.0))]))
        );
    }

    #[test]
    fn test_parse_repeated_scalar_replaces_falsy_first() {
        for raw in ["a=0&a=2", "a=&a=2", "a=false&a=2", "a=null&a=2"] {
            let params = parse_query(raw, &bracket());
            assert_eq!(params.get("a"), Some(&Value::Number(2.0)), "{}", raw);
        }

        let params = parse_query("a=0&a[b]=1", &bracket());
        assert_eq!(
            params.get("a"),
            Some(&Value::object([("b", Value::Number(1.0))]))
        );
    }

    #[test]
    fn test_parse_indexed_separator_value_stays_raw() {
        let params = parse_query("ids[0]=1,a", &separator());
        assert_eq!(
            params.get("ids"),
            Some(&Value::Array(vec![Value::Array(vec![
                Value::from("1"),
                Value::from("a"),
            ])]))
        );

        let params = parse_query("ids[0]=5", &separator());
        assert_eq!(
            params.get("ids"),
            Some(&Value::Array(vec![Value::Number(5.0)]))
        );
    }

    #[test]
    fn test_parse_nesting_limit() {
        let config = bracket().with_nesting(2);
        let params = parse_query("a[b][c][d]=1", &config);
        let c = params
            .get("a")
            .and_then(|a| a.get("b"))
            .and_then(|b| b.get("c"))
            .unwrap();
        assert_eq!(c.get("[d]"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_parse_encoded_brackets() {
        let params = parse_query("a%5Bb%5D=1", &bracket());
        assert_eq!(
            params.get("a"),
            Some(&Value::object([("b", Value::Number(1.0))]))
        );
    }

    #[test]
    fn test_stringify_scalars() {
        let mut params = Map::new();
        params.insert("page".to_string(), Value::Number(2.0));
        params.insert("q".to_string(), Value::from("a b&c"));
        params.insert("flag".to_string(), Value::Bool(false));
        params.insert("none".to_string(), Value::Null);

        assert_eq!(
            stringify_query(&params, &bracket()),
            "?flag=false&none=null&page=2&q=a%20b%26c"
        );
    }

    #[test]
    fn test_stringify_large_number_round_trips() {
        let params = parse_query("n=1e21&m=2e-7", &bracket());
        let raw = stringify_query(&params, &bracket());
        assert_eq!(raw, "?m=2e-7&n=1e%2B21");
        assert_eq!(parse_query(&raw, &bracket()), params);
    }

    #[test]
    fn test_stringify_empty() {
        assert_eq!(stringify_query(&Map::new(), &bracket()), "");
    }

    #[test]
    fn test_stringify_skips_integer_keys() {
        let mut params = Map::new();
        params.insert("0".to_string(), Value::from("x"));
        params.insert("12abc".to_string(), Value::from("y"));
        params.insert("-1".to_string(), Value::from("z"));
        params.insert("a1".to_string(), Value::from("kept"));

        assert_eq!(stringify_query(&params, &bracket()), "?a1=kept");
    }

    #[test]
    fn test_stringify_arrays() {
        let mut params = Map::new();
        params.insert(
            "ids".to_string(),
            Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]),
        );

        assert_eq!(stringify_query(&params, &bracket()), "?ids[]=1&ids[]=2");
        assert_eq!(stringify_query(&params, &separator()), "?ids=1,2");
        assert_eq!(
            stringify_query(&params, &separator().with_separator("|")),
            "?ids=1|2"
        );
    }

    #[test]
    fn test_stringify_nested_object() {
        let mut params = Map::new();
        params.insert(
            "user".to_string(),
            Value::object([
                ("name", Value::from("ann lee")),
                ("tags", Value::from(vec![Value::from("a")])),
            ]),
        );

        assert_eq!(
            stringify_query(&params, &bracket()),
            "?user[name]=ann%20lee&user[tags][0]=a"
        );
    }

    #[test]
    fn test_stringify_bracket_skips_holes() {
        let params = parse_query("ids[1]=b", &bracket());
        assert_eq!(stringify_query(&params, &bracket()), "?ids[]=b");
    }

    #[test]
    fn test_query_cell_keeps_raw_form() {
        let query = Query::parse("b=2&a=1", &bracket());
        assert_eq!(query.as_str(), "?b=2&a=1");
        assert_eq!(query.get("a"), Some(&Value::Number(1.0)));
        assert!(query.contains("b"));
        assert_eq!(Query::parse("?", &bracket()).as_str(), "");
    }

    #[test]
    fn test_query_cell_from_params() {
        let mut params = Map::new();
        params.insert("tags".to_string(), Value::from(vec![Value::from("x")]));
        params.insert("7".to_string(), Value::from("dropped"));

        let query = Query::from_input(QueryInput::from(params), &bracket());
        assert_eq!(query.to_string(), "?tags[]=x");
        assert!(!query.contains("7"));
    }
}
