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

//! FHIRPath expression parser
//!
//! Converts expression text into an [`ExpressionNode`](crate::ast::ExpressionNode)
//! tree with a Pratt parser, and caches parsed trees by source text.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod pratt;
pub mod span;
pub mod tokenizer;

pub use cache::{AstCache, AstCacheConfig, CacheStats, global_cache};
pub use error::{ParseError, ParseResult};
pub use pratt::{DEFAULT_MAX_NESTING, parse_expression_pratt, parse_expression_pratt_with_limit};
pub use span::Spanned;

/// Parse an FHIRPath expression string into an AST
pub fn parse(input: &str) -> ParseResult<crate::ast::ExpressionNode> {
    parse_expression_pratt(input)
}

/// Parse, failing with [`ParseError::NestingTooDeep`] past `max_nesting` levels
pub fn parse_with_max_nesting(
    input: &str,
    max_nesting: usize,
) -> ParseResult<crate::ast::ExpressionNode> {
    parse_expression_pratt_with_limit(input, max_nesting)
}
