//! Compiled route pattern caching
//!
//! [`match_route`](crate::match_route) compiles its template on every call.
//! Hot paths that match the same templates repeatedly can go through a
//! [`PatternCache`] instead, which keeps compiled patterns with LRU eviction.

use crate::error::Result;
use crate::matcher::RoutePattern;
use crate::params::MatchResult;
use crate::trace_log;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache key: template plus match mode
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PatternKey {
    template: String,
    loose: bool,
}

/// Cache performance statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub invalidations: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Compiled pattern cache with LRU eviction
///
/// Default capacity: 256 templates.
#[derive(Debug)]
pub struct PatternCache {
    patterns: LruCache<PatternKey, RoutePattern>,
    stats: CacheStats,
}

impl PatternCache {
    const DEFAULT_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// A zero capacity is raised to one
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            patterns: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    /// Get or compile a strict pattern
    pub fn pattern(&mut self, template: &str) -> Result<&RoutePattern> {
        self.lookup(template, false)
    }

    /// Get or compile a loose pattern
    pub fn loose_pattern(&mut self, template: &str) -> Result<&RoutePattern> {
        self.lookup(template, true)
    }

    /// Match `path` against `template`, compiling it at most once
    pub fn match_path(&mut self, path: &str, template: &str) -> Result<MatchResult> {
        Ok(self.pattern(template)?.matches(path))
    }

    fn lookup(&mut self, template: &str, loose: bool) -> Result<&RoutePattern> {
        let key = PatternKey {
            template: template.to_string(),
            loose,
        };

        if self.patterns.contains(&key) {
            self.stats.hits += 1;
            trace_log!("Pattern cache hit for '{}'", template);
        } else {
            self.stats.misses += 1;
            trace_log!("Pattern cache miss for '{}'", template);
        }

        self.patterns.try_get_or_insert(key, || {
            if loose {
                RoutePattern::compile_loose(template)
            } else {
                RoutePattern::compile(template)
            }
        })
    }

    pub fn clear(&mut self) {
        trace_log!("Clearing pattern cache");
        self.patterns.clear();
        self.stats.invalidations += 1;
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new()
    }
}
