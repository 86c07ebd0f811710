//! Bracketed query key parsing
//!
//! A key such as `user[address][city]` becomes the chain
//! `["user", "[address]", "[city]"]`, which is then folded into a nested value.
//! At most `nesting` bracket groups are expanded; whatever follows is kept as a
//! single literal token with its brackets intact.
//!
//! Folding does not coerce anything; the query codec converts each parsed
//! entry exactly once after the fold.
//!
//! Index keys are capped, unlike plain bracket notation where any canonical
//! integer builds an array: `a[N]` with `N` above [`ARRAY_INDEX_LIMIT`] builds
//! an object keyed `"N"`.

use crate::value::Value;

/// Array indices above this are treated as object keys.
pub const ARRAY_INDEX_LIMIT: usize = 1024;

/// Split a query key into its parent token and bracket groups.
///
/// # Example
///
/// ```
/// use url_pathfinder::keys::parse_key;
///
/// assert_eq!(parse_key("a[b][c][d]", 2), vec!["a", "[b]", "[c]", "[[d]]"]);
/// ```
pub fn parse_key(key: &str, nesting: usize) -> Vec<String> {
    let mut chain = Vec::new();

    let parent = next_group(key, 0).map_or(key, |(start, _)| &key[..start]);
    if !parent.is_empty() {
        chain.push(parent.to_string());
    }

    let mut cursor = 0;
    let mut depth = 0;
    while let Some((start, end)) = next_group(key, cursor) {
        if depth == nesting {
            chain.push(format!("[{}]", &key[start..]));
            break;
        }
        chain.push(key[start..end].to_string());
        depth += 1;
        cursor = end;
    }

    chain
}

/// Next `[...]` group at or after `from` whose content holds no brackets.
///
/// Returns the byte range including both brackets.
fn next_group(key: &str, from: usize) -> Option<(usize, usize)> {
    let mut open = None;
    for (i, b) in key.bytes().enumerate().skip(from) {
        match b {
            b'[' => open = Some(i),
            b']' => {
                if let Some(start) = open {
                    return Some((start, i + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// Fold a key chain around a leaf value, innermost token first.
///
/// `[]` wraps the value in an array, a bracketed canonical integer places it at
/// that index of a new array, anything else becomes an object key.
pub fn build_from_chain(chain: &[String], leaf: Value) -> Value {
    let mut current = leaf;

    for token in chain.iter().rev() {
        current = if token == "[]" {
            match current {
                Value::Array(items) => Value::Array(items),
                other => Value::Array(vec![other]),
            }
        } else {
            let inner = strip_brackets(token);
            match inner.and_then(array_index) {
                Some(index) => {
                    let mut items = vec![Value::Undefined; index];
                    items.push(current);
                    Value::Array(items)
                }
                None => Value::object([(inner.unwrap_or(token), current)]),
            }
        };
    }

    current
}

fn strip_brackets(token: &str) -> Option<&str> {
    token.strip_prefix('[')?.strip_suffix(']')
}

/// Canonical non-negative decimal integer, `"0"` but never `"01"`.
fn array_index(key: &str) -> Option<usize> {
    let canonical = !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'));
    if !canonical {
        return None;
    }
    key.parse::<usize>()
        .ok()
        .filter(|index| *index <= ARRAY_INDEX_LIMIT)
}
