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

//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::evaluator::DEFAULT_MAX_DEPTH;
use crate::parser::{AstCacheConfig, DEFAULT_MAX_NESTING};

/// Configuration for [`crate::FhirPathEngine`]
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use octofhir_fhirpath_interp::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{"max_depth": 64}"#).unwrap();
/// assert_eq!(config.max_depth, 64);
/// assert!(config.cache.enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Compiled expression cache settings
    pub cache: AstCacheConfig,
    /// Maximum evaluation nesting before failing
    pub max_depth: usize,
    /// Maximum expression nesting accepted by the parser
    pub max_nesting: usize,
    /// Share the process-wide cache instead of a per-engine one
    pub use_global_cache: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache: AstCacheConfig::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_nesting: DEFAULT_MAX_NESTING,
            use_global_cache: false,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cache settings
    pub fn with_cache(mut self, cache: AstCacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Set the maximum evaluation depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the parser nesting limit
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Use the process-wide expression cache
    pub fn with_global_cache(mut self, enabled: bool) -> Self {
        self.use_global_cache = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_depth, 256);
        assert_eq!(config.max_nesting, 256);
        assert_eq!(config.cache.max_entries, 512);
        assert!(!config.use_global_cache);
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig::new()
            .with_max_depth(32)
            .with_max_nesting(64)
            .with_cache(AstCacheConfig::disabled());
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
