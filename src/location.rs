//! URL segments exchanged with the host location

use crate::error::{NavigationError, Result};
use std::fmt;
use url::Url;

/// Base that navigation targets are resolved against.
///
/// Only pathname, search and hash are kept, so the scheme and host never leak
/// into the navigator state.
const NEUTRAL_BASE: &str = "file:///";

/// The `{pathname, search, hash}` triple of a location
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// Path, always starting with `/` once resolved
    pub pathname: String,
    /// Query with its leading `?`, or empty
    pub search: String,
    /// Fragment with its leading `#`, or empty
    pub hash: String,
}

impl Location {
    pub fn new(
        pathname: impl Into<String>,
        search: impl Into<String>,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            pathname: pathname.into(),
            search: search.into(),
            hash: hash.into(),
        }
    }

    /// Resolve a navigation target, absolute or relative.
    ///
    /// # Example
    ///
    /// ```
    /// use url_pathfinder::Location;
    ///
    /// let location = Location::resolve("https://example.com/a/b?x=1#top").unwrap();
    /// assert_eq!(location.pathname, "/a/b");
    /// assert_eq!(location.search, "?x=1");
    /// assert_eq!(location.hash, "#top");
    /// ```
    pub fn resolve(target: &str) -> Result<Self> {
        let url = Url::parse(NEUTRAL_BASE)
            .and_then(|base| base.join(target))
            .map_err(|source| NavigationError::MalformedUrl {
                url: target.to_string(),
                source,
            })?;

        Ok(Self {
            pathname: url.path().to_string(),
            search: prefixed('?', url.query()),
            hash: prefixed('#', url.fragment()),
        })
    }

    /// Split an already-resolved href at its first `?` and `#`.
    pub fn split(href: &str) -> Self {
        let (rest, hash) = href
            .find('#')
            .map_or((href, ""), |i| (&href[..i], &href[i..]));
        let (pathname, search) = rest
            .find('?')
            .map_or((rest, ""), |i| (&rest[..i], &rest[i..]));

        Self::new(
            pathname,
            if search == "?" { "" } else { search },
            if hash == "#" { "" } else { hash },
        )
    }

    /// `pathname + search + hash`
    pub fn href(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }
}

fn prefixed(marker: char, part: Option<&str>) -> String {
    match part {
        Some(part) if !part.is_empty() => format!("{}{}", marker, part),
        _ => String::new(),
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.pathname, self.search, self.hash)
    }
}
