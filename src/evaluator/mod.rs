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

//! FHIRPath expression evaluator
//!
//! Walks an [`ExpressionNode`](crate::ast::ExpressionNode) tree against an
//! [`EvaluationContext`], dispatching function calls through the
//! [`FunctionRegistry`](crate::registry::FunctionRegistry).

#![warn(missing_docs)]

mod context;
mod error;
mod interpreter;
pub mod operators;
mod type_check;

pub use context::{EvaluationContext, Frame};
pub use error::{EvaluationError, EvaluationResult};
pub use interpreter::{DEFAULT_MAX_DEPTH, Interpreter};
pub use type_check::TypeSpecifier;
