//! Navigator preferences
//!
//! Preferences are owned by the [`Navigator`](crate::Navigator) and read on
//! every operation, so changing them through `prefs_mut()` takes effect on the
//! next write without re-creating any cell.

/// How arrays are written to and read from a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayFormat {
    /// One `key[]=value` pair per element.
    #[default]
    Bracket,
    /// One `key=v1,v2` pair, joined by the configured separator.
    Separator,
}

/// Array encoding options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayConfig {
    /// Joins elements in `Separator` mode and splits scalar strings on parse.
    pub separator: String,
    /// Array encoding mode.
    pub format: ArrayFormat,
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            separator: ",".to_string(),
            format: ArrayFormat::Bracket,
        }
    }
}

/// Query codec options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Array encoding options.
    pub array: ArrayConfig,
    /// Maximum number of bracket groups expanded in a single key.
    pub nesting: usize,
}

impl QueryConfig {
    /// Coercion settings used for route parameters.
    ///
    /// Route captures always split on `|`, independent of the query settings.
    pub fn route_params() -> Self {
        Self {
            array: ArrayConfig {
                separator: "|".to_string(),
                format: ArrayFormat::Separator,
            },
            nesting: 0,
        }
    }

    /// Set the array format
    pub fn with_format(mut self, format: ArrayFormat) -> Self {
        self.array.format = format;
        self
    }

    /// Set the array separator
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.array.separator = separator.into();
        self
    }

    /// Set the nesting depth
    pub fn with_nesting(mut self, nesting: usize) -> Self {
        self.nesting = nesting;
        self
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            array: ArrayConfig::default(),
            nesting: 3,
        }
    }
}

/// Top-level preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefs {
    /// Query codec options.
    pub query: QueryConfig,
    /// Allow the navigator to write the host history.
    ///
    /// Even when `true`, side effects stay off for a host that reports itself
    /// as nested inside another browsing context.
    pub side_effect: bool,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            query: QueryConfig::default(),
            side_effect: true,
        }
    }
}
