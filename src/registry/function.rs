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

//! Function trait, dispatch context and registry

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::{Collection, PathNode, PrimitiveValue, TypeRegistry};
use crate::registry::signature::FunctionSignature;

/// Function evaluation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// No function registered under this name
    #[error("Unknown function '{name}'")]
    UnknownFunction {
        /// Function name
        name: String,
    },

    /// Runtime evaluation error
    #[error("Function '{name}' evaluation error: {message}")]
    EvaluationError {
        /// Function name
        name: String,
        /// Error message
        message: String,
    },
}

/// Evaluates unevaluated argument expressions on behalf of a function
///
/// Implemented by the interpreter for the frame the call appears in.
pub trait ArgumentEvaluator {
    /// Evaluate against the frame enclosing the call
    fn evaluate(&self, expr: &ExpressionNode) -> EvaluationResult<Collection>;

    /// Evaluate against a new frame pushed on top of the enclosing one
    fn evaluate_with_focus(
        &self,
        expr: &ExpressionNode,
        focus: Collection,
        index: Option<usize>,
        total: Option<Collection>,
    ) -> EvaluationResult<Collection>;

    /// Types visible to this evaluation
    fn type_registry(&self) -> &TypeRegistry;
}

/// What a function sees when it is invoked
pub struct FunctionContext<'a> {
    /// Input collection (the focus the function was invoked on)
    pub input: &'a Collection,
    name: &'a str,
    evaluator: &'a dyn ArgumentEvaluator,
}

impl<'a> FunctionContext<'a> {
    /// Create a new function context
    pub fn new(
        name: &'a str,
        input: &'a Collection,
        evaluator: &'a dyn ArgumentEvaluator,
    ) -> Self {
        Self {
            input,
            name,
            evaluator,
        }
    }

    /// Name the function was invoked under
    pub fn name(&self) -> &str {
        self.name
    }

    /// Evaluate an argument once, in the enclosing frame
    pub fn evaluate(&self, arg: &ExpressionNode) -> EvaluationResult<Collection> {
        self.evaluator.evaluate(arg)
    }

    /// Evaluate an argument against an explicit focus
    pub fn evaluate_with(
        &self,
        arg: &ExpressionNode,
        focus: Collection,
        index: Option<usize>,
        total: Option<Collection>,
    ) -> EvaluationResult<Collection> {
        self.evaluator.evaluate_with_focus(arg, focus, index, total)
    }

    /// Evaluate an argument with `$this` bound to one input element
    pub fn evaluate_for_item(
        &self,
        arg: &ExpressionNode,
        item: &PathNode,
        index: usize,
    ) -> EvaluationResult<Collection> {
        self.evaluate_with(arg, Collection::single(item.clone()), Some(index), None)
    }

    /// Type registry of the running evaluation
    pub fn types(&self) -> &TypeRegistry {
        self.evaluator.type_registry()
    }

    /// Read a type specifier argument such as `Patient` or `FHIR.Quantity`
    ///
    /// `None` when the argument is missing or is not a type name.
    pub fn type_argument(&self, args: &[ExpressionNode], index: usize) -> Option<String> {
        let specifier = args.get(index).and_then(ExpressionNode::as_type_specifier);
        if specifier.is_none() {
            self.ignored_argument(index, "a type specifier");
        }
        specifier
    }

    /// Evaluate an optional singleton argument
    ///
    /// `None` when the argument is absent, empty or has more than one item.
    pub fn value_argument(
        &self,
        args: &[ExpressionNode],
        index: usize,
    ) -> EvaluationResult<Option<PrimitiveValue>> {
        let Some(arg) = args.get(index) else {
            return Ok(None);
        };
        let value = self.evaluate(arg)?;
        if value.is_empty() {
            return Ok(None);
        }
        let primitive = value.singleton_primitive().cloned();
        if primitive.is_none() {
            self.ignored_argument(index, "a singleton value");
        }
        Ok(primitive)
    }

    /// Evaluate a String argument; any other type reads as `None`
    pub fn string_argument(
        &self,
        args: &[ExpressionNode],
        index: usize,
    ) -> EvaluationResult<Option<String>> {
        Ok(match self.value_argument(args, index)? {
            Some(PrimitiveValue::String(s)) => Some(s.to_string()),
            Some(_) => {
                self.ignored_argument(index, "a String");
                None
            }
            None => None,
        })
    }

    /// Evaluate an Integer argument; any other type reads as `None`
    pub fn integer_argument(
        &self,
        args: &[ExpressionNode],
        index: usize,
    ) -> EvaluationResult<Option<i64>> {
        Ok(match self.value_argument(args, index)? {
            Some(PrimitiveValue::Integer(i)) => Some(i),
            Some(_) => {
                self.ignored_argument(index, "an Integer");
                None
            }
            None => None,
        })
    }

    fn ignored_argument(&self, index: usize, expected: &str) {
        log::debug!(
            "{}() argument {index} is not {expected}, treating it as empty",
            self.name
        );
    }
}

/// Trait for implementing FHIRPath functions
///
/// Functions receive their arguments unevaluated and decide through the
/// [`FunctionContext`] whether each one is evaluated once or per element.
pub trait FhirPathFunction: Send + Sync {
    /// Get the function name
    fn name(&self) -> &str;

    /// Get the human-friendly name for the function
    fn human_friendly_name(&self) -> &str;

    /// Get the function signature
    fn signature(&self) -> &FunctionSignature;

    /// Evaluate the function
    fn evaluate(
        &self,
        args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection>;

    /// Get function documentation
    fn documentation(&self) -> &str {
        ""
    }

    /// Check if this function is pure (deterministic with no side effects)
    fn is_pure(&self) -> bool {
        false
    }
}

/// Registry of functions callable from expressions
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, Arc<dyn FhirPathFunction>>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("function_count", &self.functions.len())
            .finish()
    }
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with every built-in function
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::registry::functions::register_builtin_functions(&mut registry);
        registry
    }

    /// Register a function, replacing any previous one with the same name
    pub fn register<F: FhirPathFunction + 'static>(&mut self, function: F) {
        let name = function.name().to_string();
        if self.functions.insert(name.clone(), Arc::new(function)).is_some() {
            log::debug!("function '{name}' replaced");
        }
    }

    /// Function registered under `name`
    pub fn get(&self, name: &str) -> Option<&Arc<dyn FhirPathFunction>> {
        self.functions.get(name)
    }

    /// Whether a function is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether no function is registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Signatures of all registered functions, sorted by name
    pub fn signatures(&self) -> Vec<&FunctionSignature> {
        let mut signatures: Vec<_> = self.functions.values().map(|f| f.signature()).collect();
        signatures.sort_by(|a, b| a.name.cmp(&b.name));
        signatures
    }

    /// Look up, check arity and evaluate a function
    ///
    /// A call with an argument count outside the signature yields empty.
    pub fn call(
        &self,
        name: &str,
        args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        let function = self.get(name).ok_or_else(|| FunctionError::UnknownFunction {
            name: name.to_string(),
        })?;
        if !function.signature().accepts(args.len()) {
            log::debug!(
                "{name}() does not take {} argument(s), yielding empty",
                args.len()
            );
            return Ok(Collection::empty());
        }
        log::trace!("calling {name}() on {} item(s)", context.input.len());
        function.evaluate(args, context)
    }
}
