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

//! Error types for the value model and tree adapters

use thiserror::Error;

use super::temporal::TemporalPrecision;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while adapting documents or constructing values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Input was absent or structurally unusable
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem
        message: String,
    },

    /// A temporal component was requested at a granularity the value does not carry
    #[error("Invalid precision: requested {requested:?}, value only has {available:?}")]
    InvalidPrecision {
        /// Precision that was asked for
        requested: TemporalPrecision,
        /// Precision the value actually has
        available: TemporalPrecision,
    },

    /// Text could not be read as a date, time or datetime
    #[error("Invalid temporal value: '{value}'")]
    InvalidTemporal {
        /// Offending text
        value: String,
    },
}

impl ModelError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
