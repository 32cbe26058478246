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

//! Tokenizer for FHIRPath expressions
//!
//! Produces zero-copy tokens: literal and identifier tokens borrow their text
//! from the input and are converted to values by the parser, which keeps
//! error positions accurate.

use unicode_xid::UnicodeXID;

use super::error::{ParseError, ParseResult};
use super::span::Spanned;

/// Lexical token borrowing from the input
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'input> {
    // Literals
    /// Integer literal digits (e.g., 42)
    Integer(&'input str),
    /// Decimal literal digits (e.g., 3.14)
    Decimal(&'input str),
    /// String literal content between the quotes, escapes unprocessed
    String(&'input str),
    /// Date literal without the leading `@` (e.g., 2023-01-01)
    Date(&'input str),
    /// DateTime literal without the leading `@` (e.g., 2023-01-01T12:00)
    DateTime(&'input str),
    /// Time literal without the leading `@T` (e.g., 12:00:00)
    Time(&'input str),
    /// Boolean literal true
    True,
    /// Boolean literal false
    False,

    // Identifiers
    /// Plain identifier
    Identifier(&'input str),
    /// Back-quoted identifier content, escapes unprocessed
    DelimitedIdentifier(&'input str),

    // Operators
    /// Addition operator (+)
    Plus,
    /// Subtraction operator (-)
    Minus,
    /// Multiplication operator (*)
    Multiply,
    /// Division operator (/)
    Divide,
    /// Integer division operator (div keyword)
    Div,
    /// Modulo operator (mod keyword)
    Mod,
    /// String concatenation operator (&)
    Ampersand,
    /// Equality operator (=)
    Equal,
    /// Inequality operator (!=)
    NotEqual,
    /// Equivalence operator (~)
    Equivalent,
    /// Non-equivalence operator (!~)
    NotEquivalent,
    /// Less than operator (<)
    LessThan,
    /// Less than or equal operator (<=)
    LessThanOrEqual,
    /// Greater than operator (>)
    GreaterThan,
    /// Greater than or equal operator (>=)
    GreaterThanOrEqual,
    /// Logical AND operator (and keyword)
    And,
    /// Logical OR operator (or keyword)
    Or,
    /// Logical XOR operator (xor keyword)
    Xor,
    /// Logical implication operator (implies keyword)
    Implies,
    /// Type checking operator (is keyword)
    Is,
    /// Type casting operator (as keyword)
    As,
    /// Membership operator (in keyword)
    In,
    /// Contains operator (contains keyword)
    Contains,
    /// Union operator (|)
    Union,

    // Delimiters
    /// Left parenthesis (
    LeftParen,
    /// Right parenthesis )
    RightParen,
    /// Left square bracket [
    LeftBracket,
    /// Right square bracket ]
    RightBracket,
    /// Left curly brace {
    LeftBrace,
    /// Right curly brace }
    RightBrace,
    /// Dot operator (.) for member access
    Dot,
    /// Comma separator (,)
    Comma,
    /// Percent sign (%) introducing an external constant
    Percent,

    // Special variables
    /// Special variable $this representing current context
    DollarThis,
    /// Special variable $index representing current iteration index
    DollarIndex,
    /// Special variable $total representing the aggregate accumulator
    DollarTotal,
}

impl<'input> Token<'input> {
    /// Get keyword from string
    #[inline]
    pub fn from_keyword(s: &str) -> Option<Token<'input>> {
        match s {
            "true" => Some(Token::True),
            "false" => Some(Token::False),
            "and" => Some(Token::And),
            "or" => Some(Token::Or),
            "xor" => Some(Token::Xor),
            "implies" => Some(Token::Implies),
            "is" => Some(Token::Is),
            "as" => Some(Token::As),
            "in" => Some(Token::In),
            "contains" => Some(Token::Contains),
            "div" => Some(Token::Div),
            "mod" => Some(Token::Mod),
            _ => None,
        }
    }

    /// Keyword text when the token is a word keyword
    ///
    /// After a `.` keywords are ordinary member or function names.
    pub fn keyword_text(&self) -> Option<&'static str> {
        match self {
            Token::True => Some("true"),
            Token::False => Some("false"),
            Token::And => Some("and"),
            Token::Or => Some("or"),
            Token::Xor => Some("xor"),
            Token::Implies => Some("implies"),
            Token::Is => Some("is"),
            Token::As => Some("as"),
            Token::In => Some("in"),
            Token::Contains => Some("contains"),
            Token::Div => Some("div"),
            Token::Mod => Some("mod"),
            _ => None,
        }
    }
}

/// Whether a word is reserved and must be back-quoted to be used as a name
pub fn is_keyword(word: &str) -> bool {
    Token::from_keyword(word).is_some()
}

fn is_id_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic() || UnicodeXID::is_xid_start(ch)
}

fn is_id_continue(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric() || UnicodeXID::is_xid_continue(ch)
}

/// Streaming tokenizer over an expression string
#[derive(Clone)]
pub struct Tokenizer<'input> {
    input: &'input str,
    bytes: &'input [u8],
    pos: usize,
}

impl<'input> Tokenizer<'input> {
    /// Create a tokenizer positioned at the start of the input
    pub fn new(input: &'input str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn slice(&self, start: usize, end: usize) -> &'input str {
        self.input.get(start..end).unwrap_or_default()
    }

    #[inline]
    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    fn skip_trivia(&mut self) -> ParseResult<()> {
        loop {
            match self.peek_byte(0) {
                Some(b' ' | b'\t' | b'\r' | b'\n') => self.pos += 1,
                Some(b'/') if self.peek_byte(1) == Some(b'/') => {
                    while let Some(b) = self.peek_byte(0) {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_byte(1) == Some(b'*') => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match (self.peek_byte(0), self.peek_byte(1)) {
                            (Some(b'*'), Some(b'/')) => {
                                self.pos += 2;
                                break;
                            }
                            (Some(_), _) => self.pos += 1,
                            (None, _) => {
                                return Err(ParseError::UnexpectedToken {
                                    token: "/*".into(),
                                    position: start,
                                });
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn scan_digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek_byte(0).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn parse_number(&mut self) -> Token<'input> {
        let start = self.pos;
        self.scan_digits();
        let is_decimal =
            self.peek_byte(0) == Some(b'.') && self.peek_byte(1).is_some_and(|b| b.is_ascii_digit());
        if is_decimal {
            self.pos += 1;
            self.scan_digits();
            Token::Decimal(self.slice(start, self.pos))
        } else {
            Token::Integer(self.slice(start, self.pos))
        }
    }

    fn parse_identifier(&mut self) -> Token<'input> {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if !is_id_continue(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        let word = self.slice(start, self.pos);
        Token::from_keyword(word).unwrap_or(Token::Identifier(word))
    }

    /// Scan quoted text up to the matching unescaped delimiter
    fn parse_quoted(&mut self, delimiter: u8) -> ParseResult<&'input str> {
        let open = self.pos;
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.peek_byte(0) {
            if b == delimiter {
                let content = self.slice(start, self.pos);
                self.pos += 1;
                return Ok(content);
            }
            self.pos += if b == b'\\' { 2 } else { 1 };
        }
        self.pos = self.bytes.len();
        Err(ParseError::UnclosedString { position: open })
    }

    fn scan_two_digits(&mut self, separator: u8) -> bool {
        let matched = self.peek_byte(0) == Some(separator)
            && self.peek_byte(1).is_some_and(|b| b.is_ascii_digit())
            && self.peek_byte(2).is_some_and(|b| b.is_ascii_digit());
        if matched {
            self.pos += 3;
        }
        matched
    }

    fn scan_date_part(&mut self) -> bool {
        if self.scan_digits() == 0 {
            return false;
        }
        if self.scan_two_digits(b'-') {
            self.scan_two_digits(b'-');
        }
        true
    }

    fn scan_time_part(&mut self) {
        if self.scan_digits() == 0 {
            return;
        }
        if self.scan_two_digits(b':')
            && self.scan_two_digits(b':')
            && self.peek_byte(0) == Some(b'.')
            && self.peek_byte(1).is_some_and(|b| b.is_ascii_digit())
        {
            self.pos += 1;
            self.scan_digits();
        }
    }

    fn scan_timezone(&mut self) {
        match self.peek_byte(0) {
            Some(b'Z') => self.pos += 1,
            Some(b'+' | b'-') => {
                let rest = &self.bytes[self.pos + 1..];
                if rest.len() >= 5
                    && rest[0].is_ascii_digit()
                    && rest[1].is_ascii_digit()
                    && rest[2] == b':'
                    && rest[3].is_ascii_digit()
                    && rest[4].is_ascii_digit()
                {
                    self.pos += 6;
                }
            }
            _ => {}
        }
    }

    fn parse_datetime_literal(&mut self) -> ParseResult<Token<'input>> {
        let at = self.pos;
        self.pos += 1;

        if self.peek_byte(0) == Some(b'T') {
            self.pos += 1;
            let start = self.pos;
            self.scan_time_part();
            if start == self.pos {
                return Err(ParseError::invalid_literal("time", "@T", at));
            }
            return Ok(Token::Time(self.slice(start, self.pos)));
        }

        let start = self.pos;
        if !self.scan_date_part() {
            return Err(ParseError::UnexpectedCharacter {
                character: '@',
                position: at,
            });
        }
        if self.peek_byte(0) == Some(b'T') {
            self.pos += 1;
            let time_start = self.pos;
            self.scan_time_part();
            if time_start != self.pos {
                self.scan_timezone();
            }
            Ok(Token::DateTime(self.slice(start, self.pos)))
        } else {
            Ok(Token::Date(self.slice(start, self.pos)))
        }
    }

    fn parse_special_variable(&mut self) -> ParseResult<Token<'input>> {
        let start = self.pos;
        self.pos += 1;
        let name_start = self.pos;
        while let Some(ch) = self.peek_char() {
            if !is_id_continue(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        match self.slice(name_start, self.pos) {
            "this" => Ok(Token::DollarThis),
            "index" => Ok(Token::DollarIndex),
            "total" => Ok(Token::DollarTotal),
            "" => Err(ParseError::UnexpectedCharacter {
                character: '$',
                position: start,
            }),
            _ => Err(ParseError::UnexpectedToken {
                token: self.slice(start, self.pos).to_string().into(),
                position: start,
            }),
        }
    }

    fn single(&mut self, token: Token<'input>, width: usize) -> Token<'input> {
        self.pos += width;
        token
    }

    /// Next token with its span, or `None` at end of input
    pub fn next_token(&mut self) -> ParseResult<Option<Spanned<Token<'input>>>> {
        self.skip_trivia()?;

        let start = self.pos;
        let Some(byte) = self.peek_byte(0) else {
            return Ok(None);
        };

        let token = match byte {
            b'.' => self.single(Token::Dot, 1),
            b'(' => self.single(Token::LeftParen, 1),
            b')' => self.single(Token::RightParen, 1),
            b'[' => self.single(Token::LeftBracket, 1),
            b']' => self.single(Token::RightBracket, 1),
            b'{' => self.single(Token::LeftBrace, 1),
            b'}' => self.single(Token::RightBrace, 1),
            b',' => self.single(Token::Comma, 1),
            b'+' => self.single(Token::Plus, 1),
            b'-' => self.single(Token::Minus, 1),
            b'*' => self.single(Token::Multiply, 1),
            b'/' => self.single(Token::Divide, 1),
            b'&' => self.single(Token::Ampersand, 1),
            b'|' => self.single(Token::Union, 1),
            b'%' => self.single(Token::Percent, 1),
            b'~' => self.single(Token::Equivalent, 1),
            b'=' => self.single(Token::Equal, 1),
            b'<' if self.peek_byte(1) == Some(b'=') => self.single(Token::LessThanOrEqual, 2),
            b'<' => self.single(Token::LessThan, 1),
            b'>' if self.peek_byte(1) == Some(b'=') => self.single(Token::GreaterThanOrEqual, 2),
            b'>' => self.single(Token::GreaterThan, 1),
            b'!' => match self.peek_byte(1) {
                Some(b'=') => self.single(Token::NotEqual, 2),
                Some(b'~') => self.single(Token::NotEquivalent, 2),
                _ => {
                    return Err(ParseError::UnexpectedCharacter {
                        character: '!',
                        position: start,
                    });
                }
            },
            b'$' => self.parse_special_variable()?,
            b'0'..=b'9' => self.parse_number(),
            b'\'' => Token::String(self.parse_quoted(b'\'')?),
            b'`' => Token::DelimitedIdentifier(self.parse_quoted(b'`')?),
            b'@' => self.parse_datetime_literal()?,
            _ => match self.peek_char() {
                Some(ch) if is_id_start(ch) => self.parse_identifier(),
                Some(ch) => {
                    return Err(ParseError::UnexpectedCharacter {
                        character: ch,
                        position: start,
                    });
                }
                None => return Ok(None),
            },
        };

        Ok(Some(Spanned::new(token, start, self.pos)))
    }

    /// Tokenize the whole input
    pub fn tokenize_all(&mut self) -> ParseResult<Vec<Spanned<Token<'input>>>> {
        let mut tokens = Vec::with_capacity(32);
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Tokenizer::new(input)
            .tokenize_all()
            .unwrap()
            .into_iter()
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_path_and_operators() {
        assert_eq!(
            tokens("Patient.name.where(use != 'old')"),
            vec![
                Token::Identifier("Patient"),
                Token::Dot,
                Token::Identifier("name"),
                Token::Dot,
                Token::Identifier("where"),
                Token::LeftParen,
                Token::Identifier("use"),
                Token::NotEqual,
                Token::String("old"),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("1 2.5 3."),
            vec![
                Token::Integer("1"),
                Token::Decimal("2.5"),
                Token::Integer("3"),
                Token::Dot
            ]
        );
    }

    #[test]
    fn test_keywords_and_variables() {
        assert_eq!(
            tokens("$this div $index mod $total"),
            vec![
                Token::DollarThis,
                Token::Div,
                Token::DollarIndex,
                Token::Mod,
                Token::DollarTotal
            ]
        );
        assert!(is_keyword("contains"));
        assert!(!is_keyword("not"));
    }

    #[test]
    fn test_temporal_literals() {
        assert_eq!(
            tokens("@2024-01-15 @2024-01-15T10:30:00Z @T14:30 @2024T"),
            vec![
                Token::Date("2024-01-15"),
                Token::DateTime("2024-01-15T10:30:00Z"),
                Token::Time("14:30"),
                Token::DateTime("2024T"),
            ]
        );
        // The minus is an operator, not a timezone
        assert_eq!(
            tokens("@2024-01-15 - 1"),
            vec![Token::Date("2024-01-15"), Token::Minus, Token::Integer("1")]
        );
    }

    #[test]
    fn test_delimited_identifier_and_comments() {
        assert_eq!(
            tokens("`div` // trailing\n /* block */ . x"),
            vec![
                Token::DelimitedIdentifier("div"),
                Token::Dot,
                Token::Identifier("x")
            ]
        );
    }

    #[test]
    fn test_unicode_identifier() {
        assert_eq!(tokens("名前"), vec![Token::Identifier("名前")]);
    }

    #[test]
    fn test_spans() {
        let spanned = Tokenizer::new("a <= 'xy'").tokenize_all().unwrap();
        assert_eq!((spanned[1].start, spanned[1].end), (2, 4));
        assert_eq!(spanned[2].len(), 4);
        assert_eq!(spanned[2].text("a <= 'xy'"), "'xy'");
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            Tokenizer::new("'abc").tokenize_all(),
            Err(ParseError::UnclosedString { position: 0 })
        );
        assert_eq!(
            Tokenizer::new("a # b").tokenize_all(),
            Err(ParseError::UnexpectedCharacter {
                character: '#',
                position: 2
            })
        );
        assert!(Tokenizer::new("$foo").tokenize_all().is_err());
    }
}
