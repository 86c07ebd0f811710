//! Error handling for navigation
//!
//! Codec and coercion operations are total and never fail. The only fallible
//! operations are resolving a navigation target and compiling a route template.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, NavigationError>;

/// Errors that can occur during navigation or route matching
#[derive(Debug, Clone, Error)]
pub enum NavigationError {
    /// The navigation target could not be resolved against the neutral base.
    ///
    /// Returned synchronously by `goto`; no cell has been touched.
    #[error("Malformed url '{url}': {source}")]
    MalformedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A route template did not compile to a valid matcher.
    ///
    /// Literal segments are used verbatim, so regex metacharacters in them
    /// can produce an invalid pattern.
    #[error("Invalid route template '{template}': {source}")]
    InvalidPattern {
        template: String,
        #[source]
        source: regex::Error,
    },
}

impl NavigationError {
    /// Check if this is a url resolution failure
    pub fn is_malformed_url(&self) -> bool {
        matches!(self, NavigationError::MalformedUrl { .. })
    }

    /// Check if this is a route template failure
    pub fn is_invalid_pattern(&self) -> bool {
        matches!(self, NavigationError::InvalidPattern { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_url_display() {
        let error = NavigationError::MalformedUrl {
            url: "http://[::1".to_string(),
            source: url::ParseError::InvalidIpv6Address,
        };
        assert!(error.is_malformed_url());
        assert!(!error.is_invalid_pattern());
        assert!(error.to_string().starts_with("Malformed url 'http://[::1'"));
    }

    #[test]
    fn test_invalid_pattern_has_source() {
        use std::error::Error as _;

        let source = regex::Regex::new("(").unwrap_err();
        let error = NavigationError::InvalidPattern {
            template: "/a(".to_string(),
            source,
        };
        assert!(error.is_invalid_pattern());
        assert!(error.source().is_some());
    }
}
