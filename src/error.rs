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

//! Top-level error type
//!
//! Layer errors keep their own enums; this type attaches the expression text
//! and preserves the layer error as `source`.

use thiserror::Error;

use crate::evaluator::EvaluationError;
use crate::model::ModelError;
use crate::parser::ParseError;

/// Result type alias for FHIRPath operations
pub type Result<T> = std::result::Result<T, FhirPathError>;

/// Error returned by [`crate::FhirPathEngine`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FhirPathError {
    /// Expression text is not valid FHIRPath
    #[error("Failed to parse '{expression}': {source}")]
    Parse {
        /// Expression as supplied
        expression: String,
        /// Underlying syntax error
        source: ParseError,
    },

    /// Expression parsed but evaluation failed
    #[error("Failed to evaluate '{expression}': {source}")]
    Evaluation {
        /// Expression as supplied
        expression: String,
        /// Underlying evaluation error
        source: EvaluationError,
    },
}

impl FhirPathError {
    /// Create a parse error
    pub fn parse(expression: impl Into<String>, source: ParseError) -> Self {
        Self::Parse {
            expression: expression.into(),
            source,
        }
    }

    /// Create an evaluation error
    pub fn evaluation(expression: impl Into<String>, source: impl Into<EvaluationError>) -> Self {
        Self::Evaluation {
            expression: expression.into(),
            source: source.into(),
        }
    }

    /// Adapter failure while preparing the input document
    pub fn model(expression: impl Into<String>, source: ModelError) -> Self {
        Self::evaluation(expression, source)
    }

    /// Expression text the error refers to
    pub fn expression(&self) -> &str {
        match self {
            Self::Parse { expression, .. } | Self::Evaluation { expression, .. } => expression,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_source_is_preserved() {
        let err = FhirPathError::parse("1 +", ParseError::UnexpectedEof { position: 3 });
        assert_eq!(err.expression(), "1 +");
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Failed to parse '1 +'"));

        let err = FhirPathError::evaluation(
            "x is Foo",
            EvaluationError::unknown_type("Foo"),
        );
        assert_eq!(
            err.source().map(ToString::to_string),
            Some("Unknown type 'Foo'".to_string())
        );
    }
}
