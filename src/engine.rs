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

//! FHIRPath engine - the main entry point for FHIRPath evaluation

use std::sync::Arc;

use crate::ast::ExpressionNode;
use crate::config::EngineConfig;
use crate::error::{FhirPathError, Result};
use crate::evaluator::{EvaluationContext, EvaluationResult, Interpreter};
use crate::model::{Collection, TreeAdapter};
use crate::parser::{AstCache, CacheStats, global_cache, parse_with_max_nesting};
use crate::registry::FunctionRegistry;

#[derive(Debug)]
enum ExpressionCache {
    Owned(AstCache),
    Global,
}

impl ExpressionCache {
    fn get(&self) -> &AstCache {
        match self {
            Self::Owned(cache) => cache,
            Self::Global => global_cache(),
        }
    }
}

/// Compiles and evaluates FHIRPath expressions
///
/// The engine is `Send + Sync`; share it behind an `Arc` to evaluate from
/// several threads. Each evaluation gets its own focus stack.
#[derive(Debug)]
pub struct FhirPathEngine {
    functions: FunctionRegistry,
    cache: ExpressionCache,
    config: EngineConfig,
}

impl Default for FhirPathEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FhirPathEngine {
    /// Create a new FHIRPath engine with the built-in functions
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        let cache = if config.use_global_cache {
            ExpressionCache::Global
        } else {
            ExpressionCache::Owned(AstCache::with_config(config.cache.clone()))
        };
        Self {
            functions: FunctionRegistry::with_builtins(),
            cache,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn function_registry(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Registry for adding or replacing functions
    pub fn function_registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    /// Counters of the expression cache in use
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.get().stats()
    }

    /// Parse an expression, reusing a cached tree when available
    pub fn compile(&self, expression: &str) -> Result<Arc<ExpressionNode>> {
        let max_nesting = self.config.max_nesting;
        self.cache
            .get()
            .get_or_parse(expression, |text| parse_with_max_nesting(text, max_nesting))
            .map_err(|source| FhirPathError::parse(expression, source))
    }

    /// Evaluate an expression against an input collection
    pub fn evaluate(&self, expression: &str, input: impl Into<Collection>) -> Result<Collection> {
        self.evaluate_with_context(expression, &EvaluationContext::new(input))
    }

    /// Adapt a document and evaluate an expression against it
    pub fn evaluate_document(
        &self,
        expression: &str,
        document: &impl TreeAdapter,
    ) -> Result<Collection> {
        let root = document
            .to_node()
            .map_err(|source| FhirPathError::model(expression, source))?;
        self.evaluate(expression, root)
    }

    /// Evaluate an expression with caller supplied variables and types
    pub fn evaluate_with_context(
        &self,
        expression: &str,
        context: &EvaluationContext,
    ) -> Result<Collection> {
        let ast = self.compile(expression)?;
        log::debug!("evaluating {expression:?}");
        self.evaluate_compiled(&ast, context)
            .map_err(|source| FhirPathError::evaluation(expression, source))
    }

    /// Evaluate an already parsed expression
    pub fn evaluate_compiled(
        &self,
        ast: &ExpressionNode,
        context: &EvaluationContext,
    ) -> EvaluationResult<Collection> {
        Interpreter::new(&self.functions, context)
            .with_max_depth(self.config.max_depth)
            .evaluate(ast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluationError;
    use crate::model::PrimitiveValue;
    use crate::parser::AstCacheConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FhirPathEngine>();
    }

    #[test]
    fn test_compile_uses_cache() {
        let engine = FhirPathEngine::new();
        let first = engine.compile("name.given").unwrap();
        let second = engine.compile("name.given").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cache_stats().hits, 1);
    }

    #[test]
    fn test_disabled_cache_still_parses() {
        let config = EngineConfig::default().with_cache(AstCacheConfig::disabled());
        let engine = FhirPathEngine::with_config(config);
        let result = engine.evaluate("1 + 1", Collection::empty()).unwrap();
        assert_eq!(result.to_string(), "[2]");
        assert_eq!(engine.cache_stats().entries, 0);
    }

    #[test]
    fn test_errors_carry_expression() {
        let engine = FhirPathEngine::new();
        let err = engine.evaluate("1 +", Collection::empty()).unwrap_err();
        assert!(matches!(err, FhirPathError::Parse { ref expression, .. } if expression == "1 +"));

        let err = engine.evaluate("frobnicate()", Collection::empty()).unwrap_err();
        match err {
            FhirPathError::Evaluation { expression, source } => {
                assert_eq!(expression, "frobnicate()");
                assert!(matches!(source, EvaluationError::Function(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_context_variables() {
        let engine = FhirPathEngine::new();
        let context = EvaluationContext::new(Collection::empty())
            .with_variable("threshold", PrimitiveValue::Integer(5));
        let result = engine.evaluate_with_context("%threshold > 3", &context).unwrap();
        assert_eq!(result.to_string(), "[true]");
    }

    #[test]
    fn test_configured_depth_applies() {
        let engine = FhirPathEngine::with_config(EngineConfig::default().with_max_depth(2));
        let err = engine.evaluate("(1 + 2) + 3", Collection::empty()).unwrap_err();
        assert!(matches!(
            err,
            FhirPathError::Evaluation {
                source: EvaluationError::RecursionLimitExceeded { limit: 2 },
                ..
            }
        ));
    }

    #[test]
    fn test_document_input() {
        let engine = FhirPathEngine::new();
        let patient = serde_json::json!({"resourceType": "Patient", "active": true});
        let result = engine.evaluate_document("Patient.active", &patient).unwrap();
        assert_eq!(result.to_string(), "[true]");
    }
}
