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

//! Parser error types

use std::borrow::Cow;

use thiserror::Error;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Syntax error with the byte position it was detected at
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Unexpected token
    #[error("Unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// The unexpected token that was found
        token: Cow<'static, str>,
        /// Position where the token was found
        position: usize,
    },

    /// Input ended while more was expected
    #[error("Unexpected end of input at position {position}")]
    UnexpectedEof {
        /// Position where more input was expected
        position: usize,
    },

    /// Unclosed string literal or delimited identifier
    #[error("Unclosed string literal starting at position {position}")]
    UnclosedString {
        /// Position where the unclosed string started
        position: usize,
    },

    /// Invalid escape sequence
    #[error("Invalid escape sequence at position {position}: {sequence}")]
    InvalidEscape {
        /// The invalid escape sequence
        sequence: String,
        /// Position where the escape sequence was found
        position: usize,
    },

    /// Invalid literal value
    #[error("Invalid {literal_type} literal at position {position}: {value}")]
    InvalidLiteral {
        /// Type of literal that failed to parse
        literal_type: Cow<'static, str>,
        /// The invalid value that was encountered
        value: String,
        /// Position where the invalid literal was found
        position: usize,
    },

    /// Character that cannot start any token
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter {
        /// The offending character
        character: char,
        /// Position of the character
        position: usize,
    },

    /// Expression nests deeper than the configured limit
    #[error("Expression nesting exceeds {limit} levels at position {position}")]
    NestingTooDeep {
        /// Configured nesting limit
        limit: usize,
        /// Position where the limit was crossed
        position: usize,
    },
}

impl ParseError {
    /// Byte offset into the expression text
    pub fn position(&self) -> usize {
        match self {
            Self::UnexpectedToken { position, .. }
            | Self::UnexpectedEof { position }
            | Self::UnclosedString { position }
            | Self::InvalidEscape { position, .. }
            | Self::InvalidLiteral { position, .. }
            | Self::UnexpectedCharacter { position, .. }
            | Self::NestingTooDeep { position, .. } => *position,
        }
    }

    pub(crate) fn invalid_literal(
        literal_type: &'static str,
        value: impl Into<String>,
        position: usize,
    ) -> Self {
        Self::InvalidLiteral {
            literal_type: Cow::Borrowed(literal_type),
            value: value.into(),
            position,
        }
    }
}
