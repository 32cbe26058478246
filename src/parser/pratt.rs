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

//! Pratt parser for FHIRPath expressions
//!
//! Binary operators are parsed by precedence climbing over a single table;
//! postfix chains (`.member`, `.function()`, `[index]`) bind tightest and are
//! handled right after each primary expression.
//!
//! Both the parser's own recursion and the depth of the tree it builds are
//! bounded by a nesting limit, so pathological input fails with
//! [`ParseError::NestingTooDeep`] instead of exhausting the stack.

use std::str::FromStr;

use rust_decimal::Decimal;
use smallvec::SmallVec;

use super::error::{ParseError, ParseResult};
use super::span::Spanned;
use super::tokenizer::{Token, Tokenizer};
use crate::ast::{
    BinaryOperator, ExpressionNode, LiteralValue, SpecialVariable, TypeOperator, UnaryOperator,
};
use crate::model::{PrecisionDate, PrecisionDateTime, PrecisionTime, Quantity};

/// Operator precedence levels (higher = tighter binding)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Lowest precedence - implies (right associative)
    Implies = 1,
    /// Logical OR and XOR
    Or = 2,
    /// Logical AND
    And = 3,
    /// Membership operators (in, contains)
    Membership = 4,
    /// Equality operators (=, !=, ~, !~)
    Equality = 5,
    /// Inequality operators (<, >, <=, >=)
    Inequality = 6,
    /// Union operator (|)
    Union = 7,
    /// Type operators (is, as)
    Type = 8,
    /// Additive operators (+, -, &)
    Additive = 9,
    /// Multiplicative operators (*, /, div, mod)
    Multiplicative = 10,
    /// Unary operators (+, -)
    Unary = 11,
    /// Invocation/Indexing (., [])
    Invocation = 12,
}

impl Precedence {
    /// Get the next higher precedence level for left-associative operators
    #[inline(always)]
    pub const fn next_level(self) -> Self {
        match self {
            Precedence::Implies => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Membership,
            Precedence::Membership => Precedence::Equality,
            Precedence::Equality => Precedence::Inequality,
            Precedence::Inequality => Precedence::Union,
            Precedence::Union => Precedence::Type,
            Precedence::Type => Precedence::Additive,
            Precedence::Additive => Precedence::Multiplicative,
            Precedence::Multiplicative => Precedence::Unary,
            Precedence::Unary => Precedence::Invocation,
            Precedence::Invocation => Precedence::Invocation,
        }
    }

    /// Check if this precedence is right associative
    #[inline(always)]
    pub const fn is_right_associative(self) -> bool {
        matches!(self, Precedence::Implies)
    }
}

/// Precedence of a token in infix position
#[inline(always)]
fn get_precedence(token: &Token<'_>) -> Option<Precedence> {
    match token {
        Token::Equal | Token::NotEqual | Token::Equivalent | Token::NotEquivalent => {
            Some(Precedence::Equality)
        }
        Token::Plus | Token::Minus | Token::Ampersand => Some(Precedence::Additive),
        Token::And => Some(Precedence::And),
        Token::Or | Token::Xor => Some(Precedence::Or),
        Token::Multiply | Token::Divide | Token::Div | Token::Mod => {
            Some(Precedence::Multiplicative)
        }
        Token::LessThan
        | Token::LessThanOrEqual
        | Token::GreaterThan
        | Token::GreaterThanOrEqual => Some(Precedence::Inequality),
        Token::In | Token::Contains => Some(Precedence::Membership),
        Token::Is | Token::As => Some(Precedence::Type),
        Token::Union => Some(Precedence::Union),
        Token::Implies => Some(Precedence::Implies),
        _ => None,
    }
}

/// Convert token to binary operator
#[inline(always)]
fn token_to_binary_op(token: &Token<'_>) -> Option<BinaryOperator> {
    match token {
        Token::Equal => Some(BinaryOperator::Equal),
        Token::NotEqual => Some(BinaryOperator::NotEqual),
        Token::Plus => Some(BinaryOperator::Add),
        Token::Minus => Some(BinaryOperator::Subtract),
        Token::And => Some(BinaryOperator::And),
        Token::Or => Some(BinaryOperator::Or),
        Token::Equivalent => Some(BinaryOperator::Equivalent),
        Token::NotEquivalent => Some(BinaryOperator::NotEquivalent),
        Token::LessThan => Some(BinaryOperator::LessThan),
        Token::LessThanOrEqual => Some(BinaryOperator::LessThanOrEqual),
        Token::GreaterThan => Some(BinaryOperator::GreaterThan),
        Token::GreaterThanOrEqual => Some(BinaryOperator::GreaterThanOrEqual),
        Token::In => Some(BinaryOperator::In),
        Token::Contains => Some(BinaryOperator::Contains),
        Token::Multiply => Some(BinaryOperator::Multiply),
        Token::Divide => Some(BinaryOperator::Divide),
        Token::Div => Some(BinaryOperator::IntegerDivide),
        Token::Mod => Some(BinaryOperator::Modulo),
        Token::Union => Some(BinaryOperator::Union),
        Token::Ampersand => Some(BinaryOperator::Concatenate),
        Token::Xor => Some(BinaryOperator::Xor),
        Token::Implies => Some(BinaryOperator::Implies),
        _ => None,
    }
}

/// Calendar duration keywords accepted as quantity units without quotes
const CALENDAR_KEYWORDS: &[&str] = &[
    "year",
    "years",
    "month",
    "months",
    "week",
    "weeks",
    "day",
    "days",
    "hour",
    "hours",
    "minute",
    "minutes",
    "second",
    "seconds",
    "millisecond",
    "milliseconds",
];

/// Resolve escape sequences in string literals and delimited identifiers
///
/// `offset` is the byte position of the raw text in the expression and is
/// used for error reporting.
pub fn unescape(raw: &str, offset: usize) -> ParseResult<String> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }

    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.char_indices();
    while let Some((i, ch)) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        let invalid = |sequence: &str| ParseError::InvalidEscape {
            sequence: sequence.to_string(),
            position: offset + i,
        };
        match chars.next() {
            Some((_, '\'')) => result.push('\''),
            Some((_, '"')) => result.push('"'),
            Some((_, '`')) => result.push('`'),
            Some((_, '\\')) => result.push('\\'),
            Some((_, '/')) => result.push('/'),
            Some((_, 'f')) => result.push('\u{000C}'),
            Some((_, 'n')) => result.push('\n'),
            Some((_, 'r')) => result.push('\r'),
            Some((_, 't')) => result.push('\t'),
            Some((_, 'u')) => {
                let hex: String = chars.by_ref().take(4).map(|(_, c)| c).collect();
                let code = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| invalid(&format!("\\u{hex}")))?;
                result.push(code);
            }
            Some((_, other)) => return Err(invalid(&format!("\\{other}"))),
            None => return Err(invalid("\\")),
        }
    }
    Ok(result)
}

/// Default bound on expression nesting
pub const DEFAULT_MAX_NESTING: usize = 256;

/// A parsed subtree together with its depth
type Subtree = (ExpressionNode, usize);

/// Pratt parser over a token stream
pub struct PrattParser<'input> {
    input: &'input str,
    tokenizer: Tokenizer<'input>,
    current_token: Option<Spanned<Token<'input>>>,
    max_nesting: usize,
    nesting: usize,
}

impl<'input> PrattParser<'input> {
    /// Create a parser positioned on the first token
    pub fn new(input: &'input str) -> ParseResult<Self> {
        let mut tokenizer = Tokenizer::new(input);
        let current_token = tokenizer.next_token()?;
        Ok(Self {
            input,
            tokenizer,
            current_token,
            max_nesting: DEFAULT_MAX_NESTING,
            nesting: 0,
        })
    }

    /// Bound both recursion and tree depth
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Parse the complete input as a single expression
    pub fn parse(mut self) -> ParseResult<ExpressionNode> {
        let (expression, _) = self.parse_expression_with_precedence(Precedence::Implies)?;
        match &self.current_token {
            None => Ok(expression),
            Some(token) => Err(self.unexpected(token)),
        }
    }

    #[inline(always)]
    fn advance(&mut self) -> ParseResult<()> {
        self.current_token = self.tokenizer.next_token()?;
        Ok(())
    }

    #[inline(always)]
    fn current(&self) -> Option<&Token<'input>> {
        self.current_token.as_ref().map(|t| &t.value)
    }

    fn current_start(&self) -> usize {
        self.current_token
            .as_ref()
            .map_or(self.input.len(), |t| t.start)
    }

    fn unexpected(&self, token: &Spanned<Token<'input>>) -> ParseError {
        ParseError::UnexpectedToken {
            token: token.text(self.input).to_string().into(),
            position: token.start,
        }
    }

    /// Error for whatever the parser is looking at now
    fn error_here(&self) -> ParseError {
        match &self.current_token {
            Some(token) => self.unexpected(token),
            None => ParseError::UnexpectedEof {
                position: self.input.len(),
            },
        }
    }

    fn too_deep(&self, position: usize) -> ParseError {
        ParseError::NestingTooDeep {
            limit: self.max_nesting,
            position,
        }
    }

    /// Accept a node whose subtree is `depth` levels deep
    fn nest(&self, node: ExpressionNode, depth: usize, position: usize) -> ParseResult<Subtree> {
        if depth > self.max_nesting {
            return Err(self.too_deep(position));
        }
        Ok((node, depth))
    }

    fn expect(&mut self, expected: Token<'input>) -> ParseResult<()> {
        match self.current() {
            Some(token) if *token == expected => self.advance(),
            _ => Err(self.error_here()),
        }
    }

    /// Parse an identifier, delimited identifier or (when allowed) keyword name
    fn parse_name(&mut self, allow_keywords: bool) -> ParseResult<String> {
        let start = self.current_start();
        let name = match self.current() {
            Some(Token::Identifier(name)) => name.to_string(),
            Some(Token::DelimitedIdentifier(raw)) => unescape(raw, start + 1)?,
            Some(token) if allow_keywords => match token.keyword_text() {
                Some(keyword) => keyword.to_string(),
                None => return Err(self.error_here()),
            },
            _ => return Err(self.error_here()),
        };
        self.advance()?;
        Ok(name)
    }

    /// Argument list and the depth of its deepest argument
    fn parse_arguments(&mut self) -> ParseResult<(SmallVec<[ExpressionNode; 3]>, usize)> {
        self.expect(Token::LeftParen)?;
        let mut args = SmallVec::new();
        let mut deepest = 0;
        if let Some(Token::RightParen) = self.current() {
            self.advance()?;
            return Ok((args, deepest));
        }
        loop {
            let (arg, depth) = self.parse_expression_with_precedence(Precedence::Implies)?;
            args.push(arg);
            deepest = deepest.max(depth);
            match self.current() {
                Some(Token::Comma) => self.advance()?,
                Some(Token::RightParen) => {
                    self.advance()?;
                    return Ok((args, deepest));
                }
                _ => return Err(self.error_here()),
            }
        }
    }

    /// Member reference, or function call when an argument list follows
    fn parse_member_or_call(&mut self, name: String) -> ParseResult<Subtree> {
        if let Some(Token::LeftParen) = self.current() {
            let position = self.current_start();
            let (args, depth) = self.parse_arguments()?;
            self.nest(ExpressionNode::function_call(name, args), depth + 1, position)
        } else {
            Ok((ExpressionNode::member(name), 1))
        }
    }

    fn parse_number(
        &mut self,
        text: &str,
        start: usize,
        is_decimal: bool,
    ) -> ParseResult<ExpressionNode> {
        let value = if is_decimal {
            None
        } else {
            text.parse::<i64>().ok()
        };
        let decimal = || {
            Decimal::from_str(text).map_err(|_| ParseError::invalid_literal("number", text, start))
        };

        // Quantity: number followed by a unit string or calendar keyword
        let unit = match self.current() {
            Some(Token::String(raw)) => {
                let unit_start = self.current_start() + 1;
                Some(unescape(raw, unit_start)?)
            }
            Some(Token::Identifier(word)) if CALENDAR_KEYWORDS.contains(word) => {
                Some(word.to_string())
            }
            _ => None,
        };
        if let Some(unit) = unit {
            self.advance()?;
            let amount = match value {
                Some(integer) => Decimal::from(integer),
                None => decimal()?,
            };
            return Ok(ExpressionNode::literal(LiteralValue::Quantity(
                Quantity::new(amount, unit),
            )));
        }

        let literal = match value {
            Some(integer) => LiteralValue::Integer(integer),
            None => LiteralValue::Decimal(decimal()?),
        };
        Ok(ExpressionNode::literal(literal))
    }

    /// Parse primary expression (literals, names, variables, parentheses)
    fn parse_primary(&mut self) -> ParseResult<Subtree> {
        let Some(spanned) = self.current_token.clone() else {
            return Err(ParseError::UnexpectedEof {
                position: self.input.len(),
            });
        };
        let start = spanned.start;

        let leaf = match spanned.value {
            Token::Identifier(_) | Token::DelimitedIdentifier(_) => {
                let name = self.parse_name(false)?;
                return self.parse_member_or_call(name);
            }

            Token::Integer(text) => {
                self.advance()?;
                self.parse_number(text, start, false)?
            }
            Token::Decimal(text) => {
                self.advance()?;
                self.parse_number(text, start, true)?
            }

            Token::String(raw) => {
                self.advance()?;
                let value = unescape(raw, start + 1)?;
                ExpressionNode::literal(LiteralValue::String(value))
            }

            Token::True => {
                self.advance()?;
                ExpressionNode::literal(LiteralValue::Boolean(true))
            }
            Token::False => {
                self.advance()?;
                ExpressionNode::literal(LiteralValue::Boolean(false))
            }

            Token::Date(text) => {
                self.advance()?;
                let date = PrecisionDate::parse(text)
                    .map_err(|_| ParseError::invalid_literal("date", text, start))?;
                ExpressionNode::literal(LiteralValue::Date(date))
            }
            Token::DateTime(text) => {
                self.advance()?;
                let datetime = PrecisionDateTime::parse(text)
                    .map_err(|_| ParseError::invalid_literal("datetime", text, start))?;
                ExpressionNode::literal(LiteralValue::DateTime(datetime))
            }
            Token::Time(text) => {
                self.advance()?;
                let time = PrecisionTime::parse(text)
                    .map_err(|_| ParseError::invalid_literal("time", text, start))?;
                ExpressionNode::literal(LiteralValue::Time(time))
            }

            Token::LeftParen => {
                self.advance()?;
                let inner = self.parse_expression_with_precedence(Precedence::Implies)?;
                self.expect(Token::RightParen)?;
                return Ok(inner);
            }

            Token::LeftBrace => {
                self.advance()?;
                self.expect(Token::RightBrace)?;
                ExpressionNode::literal(LiteralValue::Empty)
            }

            Token::DollarThis => {
                self.advance()?;
                ExpressionNode::Variable(SpecialVariable::This)
            }
            Token::DollarIndex => {
                self.advance()?;
                ExpressionNode::Variable(SpecialVariable::Index)
            }
            Token::DollarTotal => {
                self.advance()?;
                ExpressionNode::Variable(SpecialVariable::Total)
            }

            Token::Percent => {
                self.advance()?;
                let name_start = self.current_start();
                let name = match self.current() {
                    Some(Token::String(raw)) => {
                        let name = unescape(raw, name_start + 1)?;
                        self.advance()?;
                        name
                    }
                    _ => self.parse_name(true)?,
                };
                ExpressionNode::ExternalConstant(name)
            }

            Token::Minus | Token::Plus => {
                let op = if matches!(spanned.value, Token::Minus) {
                    UnaryOperator::Negate
                } else {
                    UnaryOperator::Positive
                };
                self.advance()?;
                let (operand, depth) = self.parse_expression_with_precedence(Precedence::Unary)?;
                return self.nest(ExpressionNode::unary_op(op, operand), depth + 1, start);
            }

            _ => return Err(self.unexpected(&spanned)),
        };
        Ok((leaf, 1))
    }

    /// Parse postfix expressions (member access, method calls, indexing)
    fn parse_postfix(&mut self, (mut left, mut depth): Subtree) -> ParseResult<Subtree> {
        loop {
            let position = self.current_start();
            match self.current() {
                Some(Token::Dot) => {
                    self.advance()?;
                    let (invocation, invocation_depth) = match self.current() {
                        Some(Token::DollarThis) => {
                            self.advance()?;
                            (ExpressionNode::Variable(SpecialVariable::This), 1)
                        }
                        _ => {
                            let name = self.parse_name(true)?;
                            self.parse_member_or_call(name)?
                        }
                    };
                    let node = ExpressionNode::invocation(left, invocation);
                    (left, depth) = self.nest(node, depth.max(invocation_depth) + 1, position)?;
                }
                Some(Token::LeftBracket) => {
                    self.advance()?;
                    let (index, index_depth) =
                        self.parse_expression_with_precedence(Precedence::Implies)?;
                    self.expect(Token::RightBracket)?;
                    let node = ExpressionNode::index(left, index);
                    (left, depth) = self.nest(node, depth.max(index_depth) + 1, position)?;
                }
                _ => return Ok((left, depth)),
            }
        }
    }

    /// Qualified type name after `is` / `as` (`Patient`, `FHIR.Patient`)
    fn parse_type_specifier(&mut self) -> ParseResult<String> {
        let mut type_name = self.parse_name(false)?;
        while let Some(Token::Dot) = self.current() {
            self.advance()?;
            type_name.push('.');
            type_name.push_str(&self.parse_name(true)?);
        }
        Ok(type_name)
    }

    /// Parse at one more level of nesting
    fn parse_expression_with_precedence(
        &mut self,
        min_precedence: Precedence,
    ) -> ParseResult<Subtree> {
        if self.nesting >= self.max_nesting {
            return Err(self.too_deep(self.current_start()));
        }
        self.nesting += 1;
        let result = self.parse_binary(min_precedence);
        self.nesting -= 1;
        result
    }

    /// Core Pratt parsing loop
    fn parse_binary(&mut self, min_precedence: Precedence) -> ParseResult<Subtree> {
        let primary = self.parse_primary()?;
        let (mut left, mut depth) = self.parse_postfix(primary)?;

        while let Some(current_token) = self.current() {
            let position = self.current_start();
            let precedence = match get_precedence(current_token) {
                Some(prec) if prec >= min_precedence => prec,
                _ => break,
            };

            match current_token {
                Token::Is | Token::As => {
                    let op = if matches!(current_token, Token::Is) {
                        TypeOperator::Is
                    } else {
                        TypeOperator::As
                    };
                    self.advance()?;
                    let type_name = self.parse_type_specifier()?;
                    let node = ExpressionNode::type_op(op, left, type_name);
                    (left, depth) = self.nest(node, depth + 1, position)?;
                }
                token => {
                    let Some(op) = token_to_binary_op(token) else {
                        break;
                    };
                    self.advance()?;
                    let next_precedence = if precedence.is_right_associative() {
                        precedence
                    } else {
                        precedence.next_level()
                    };
                    let (right, right_depth) =
                        self.parse_expression_with_precedence(next_precedence)?;
                    let node = ExpressionNode::binary_op(op, left, right);
                    (left, depth) = self.nest(node, depth.max(right_depth) + 1, position)?;
                }
            }
        }

        Ok((left, depth))
    }
}

/// Parse an expression string into an AST
pub fn parse_expression_pratt(input: &str) -> ParseResult<ExpressionNode> {
    PrattParser::new(input)?.parse()
}

/// Parse with an explicit nesting limit
pub fn parse_expression_pratt_with_limit(
    input: &str,
    max_nesting: usize,
) -> ParseResult<ExpressionNode> {
    PrattParser::new(input)?.with_max_nesting(max_nesting).parse()
}
