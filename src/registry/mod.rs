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

//! Function registry for FHIRPath
//!
//! Functions implement [`FhirPathFunction`] and are looked up by name in a
//! [`FunctionRegistry`]. They receive their arguments unevaluated together
//! with a [`FunctionContext`] that evaluates them on demand.

#![warn(missing_docs)]

pub mod function;
pub mod functions;
pub mod signature;

pub use function::{
    ArgumentEvaluator, FhirPathFunction, FunctionContext, FunctionError, FunctionRegistry,
};
pub use signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// Create a registry with all built-in functions
pub fn create_standard_registry() -> FunctionRegistry {
    FunctionRegistry::with_builtins()
}
