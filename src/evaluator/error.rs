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

//! Error types for FHIRPath evaluation

use thiserror::Error;

use crate::model::ModelError;
use crate::registry::FunctionError;

/// Result type for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Errors that can occur during FHIRPath evaluation
///
/// Semantic mismatches such as wrong operand types or out-of-range indexes
/// are not errors; they evaluate to an empty collection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// Function dispatch or argument error
    #[error("Function error: {0}")]
    Function(#[from] FunctionError),

    /// Type specifier not present in the type registry
    #[error("Unknown type '{type_name}'")]
    UnknownType {
        /// Type specifier as written
        type_name: String,
    },

    /// Value model failure surfaced during evaluation
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Evaluation nested deeper than the configured limit
    #[error("Recursion limit of {limit} exceeded")]
    RecursionLimitExceeded {
        /// Configured maximum depth
        limit: usize,
    },
}

impl EvaluationError {
    /// Create an unknown type error
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
        }
    }
}
