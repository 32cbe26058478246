// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Concurrent cache of parsed expressions keyed by source text
//!
//! Entries are shared `Arc<ExpressionNode>` values. When the cache reaches
//! its capacity the least recently used fifth of the entries is evicted.
//! Failed parses are never stored.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::error::ParseResult;
use crate::ast::ExpressionNode;

/// Configuration for the expression cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AstCacheConfig {
    /// Maximum number of cached expressions
    pub max_entries: usize,
    /// Whether lookups consult the cache at all
    pub enabled: bool,
}

impl Default for AstCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 512,
            enabled: true,
        }
    }
}

impl AstCacheConfig {
    /// Create a configuration with caching disabled
    pub fn disabled() -> Self {
        Self {
            max_entries: 0,
            enabled: false,
        }
    }

    /// Set the capacity
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to parse
    pub misses: u64,
    /// Entries removed to make room
    pub evictions: u64,
    /// Entries currently stored
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate between 0.0 and 1.0, or 0.0 if no lookups occurred
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    ast: Arc<ExpressionNode>,
    last_used: AtomicU64,
}

/// Thread-safe compute-if-absent cache of parsed expressions
#[derive(Debug)]
pub struct AstCache {
    entries: DashMap<String, CacheEntry>,
    config: AstCacheConfig,
    clock: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl Default for AstCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AstCache {
    /// Create a cache with default configuration
    pub fn new() -> Self {
        Self::with_config(AstCacheConfig::default())
    }

    /// Create a cache with custom configuration
    pub fn with_config(config: AstCacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            clock: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &AstCacheConfig {
        &self.config
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Cached AST for `expression`, parsing with `parse` on a miss
    ///
    /// Concurrent callers asking for the same missing expression may both
    /// parse it; one result wins and both callers get equal trees.
    pub fn get_or_parse<F>(&self, expression: &str, parse: F) -> ParseResult<Arc<ExpressionNode>>
    where
        F: FnOnce(&str) -> ParseResult<ExpressionNode>,
    {
        if !self.config.enabled || self.config.max_entries == 0 {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return parse(expression).map(Arc::new);
        }

        if let Some(entry) = self.entries.get(expression) {
            entry.last_used.store(self.tick(), Ordering::Relaxed);
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::trace!("ast cache hit for {expression:?}");
            return Ok(Arc::clone(&entry.ast));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let ast = Arc::new(parse(expression)?);

        if self.entries.len() >= self.config.max_entries {
            self.evict();
        }

        let stored = match self.entries.entry(expression.to_string()) {
            Entry::Occupied(existing) => Arc::clone(&existing.get().ast),
            Entry::Vacant(slot) => {
                slot.insert(CacheEntry {
                    ast: Arc::clone(&ast),
                    last_used: AtomicU64::new(self.tick()),
                });
                ast
            }
        };
        Ok(stored)
    }

    /// Drop the least recently used ~20% of entries
    fn evict(&self) {
        let target = (self.config.max_entries / 5).max(1);
        let mut by_age: Vec<(u64, String)> = self
            .entries
            .iter()
            .map(|e| (e.value().last_used.load(Ordering::Relaxed), e.key().clone()))
            .collect();
        by_age.sort_unstable_by_key(|(age, _)| *age);

        let mut removed = 0u64;
        for (_, key) in by_age.into_iter().take(target) {
            if self.entries.remove(&key).is_some() {
                removed += 1;
            }
        }
        self.evictions.fetch_add(removed, Ordering::Relaxed);
        log::debug!("ast cache evicted {removed} entries");
    }

    /// Whether an expression is currently cached
    pub fn contains(&self, expression: &str) -> bool {
        self.entries.contains_key(expression)
    }

    /// Number of cached expressions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry; counters are kept
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

static GLOBAL_CACHE: Lazy<AstCache> = Lazy::new(AstCache::new);

/// Process-wide cache shared by engines configured to use it
pub fn global_cache() -> &'static AstCache {
    &GLOBAL_CACHE
}
