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

//! Expression AST node definitions

use std::fmt;

use rust_decimal::Decimal;
use smallvec::SmallVec;

use super::operator::{BinaryOperator, TypeOperator, UnaryOperator};
use crate::model::{PrecisionDate, PrecisionDateTime, PrecisionTime, PrimitiveValue, Quantity};

/// AST representation of FHIRPath expressions
///
/// Large variants are boxed to keep the enum small.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    /// Literal value (string, number, boolean, temporal, quantity or `{}`)
    Literal(LiteralValue),

    /// Member navigation by name against the current focus
    Member(String),

    /// Function call with name and unevaluated arguments
    Function(Box<FunctionCallData>),

    /// `base.invocation`: the invocation is evaluated against the base result
    Invocation {
        /// Expression producing the new focus
        base: Box<ExpressionNode>,
        /// Member, function or variable evaluated against that focus
        invocation: Box<ExpressionNode>,
    },

    /// Binary operation (boxed for size optimization)
    BinaryOp(Box<BinaryOpData>),

    /// Unary polarity operation
    UnaryOp {
        /// The operator
        op: UnaryOperator,
        /// The operand
        operand: Box<ExpressionNode>,
    },

    /// Index access (collection\[index\])
    Index {
        /// Base expression
        base: Box<ExpressionNode>,
        /// Index expression, evaluated in the enclosing focus
        index: Box<ExpressionNode>,
    },

    /// Type test or cast (`value is Type`, `value as Type`)
    TypeOp {
        /// The operator
        op: TypeOperator,
        /// Expression being tested
        expression: Box<ExpressionNode>,
        /// Type specifier as written, possibly qualified
        type_name: String,
    },

    /// `$this`, `$index` or `$total`
    Variable(SpecialVariable),

    /// `%name` environment constant
    ExternalConstant(String),
}

/// Context variables bound by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialVariable {
    /// `$this`: the current focus
    This,
    /// `$index`: position of the element being iterated
    Index,
    /// `$total`: accumulator of `aggregate()`
    Total,
}

impl fmt::Display for SpecialVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::This => f.write_str("$this"),
            Self::Index => f.write_str("$index"),
            Self::Total => f.write_str("$total"),
        }
    }
}

/// Binary operation data (separate struct to optimize enum size)
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOpData {
    /// The operator
    pub op: BinaryOperator,
    /// Left operand
    pub left: ExpressionNode,
    /// Right operand
    pub right: ExpressionNode,
}

/// Function call data (separate struct to optimize enum size)
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallData {
    /// Function name
    pub name: String,
    /// Function arguments (SmallVec for the common case of 0-3 args)
    pub args: SmallVec<[ExpressionNode; 3]>,
}

/// Literal values in FHIRPath, already parsed into their runtime form
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Boolean literal
    Boolean(bool),
    /// Integer literal
    Integer(i64),
    /// Decimal literal, scale preserved as written
    Decimal(Decimal),
    /// String literal with escapes resolved
    String(String),
    /// Date literal (@YYYY-MM-DD)
    Date(PrecisionDate),
    /// DateTime literal (@YYYY-MM-DDThh:mm:ss)
    DateTime(PrecisionDateTime),
    /// Time literal (@Thh:mm:ss)
    Time(PrecisionTime),
    /// Quantity literal
    Quantity(Quantity),
    /// Empty collection `{}`
    Empty,
}

impl LiteralValue {
    /// Runtime value of the literal; `None` for `{}`
    pub fn to_primitive(&self) -> Option<PrimitiveValue> {
        match self {
            Self::Boolean(b) => Some(PrimitiveValue::Boolean(*b)),
            Self::Integer(i) => Some(PrimitiveValue::Integer(*i)),
            Self::Decimal(d) => Some(PrimitiveValue::Decimal(*d)),
            Self::String(s) => Some(PrimitiveValue::string(s.as_str())),
            Self::Date(d) => Some(PrimitiveValue::Date(d.clone())),
            Self::DateTime(dt) => Some(PrimitiveValue::DateTime(dt.clone())),
            Self::Time(t) => Some(PrimitiveValue::Time(t.clone())),
            Self::Quantity(q) => Some(PrimitiveValue::quantity(q.clone())),
            Self::Empty => None,
        }
    }
}

impl ExpressionNode {
    /// Create a literal expression
    pub fn literal(value: LiteralValue) -> Self {
        Self::Literal(value)
    }

    /// Create a member navigation expression
    pub fn member(name: impl Into<String>) -> Self {
        Self::Member(name.into())
    }

    /// Create a function call expression
    pub fn function_call(
        name: impl Into<String>,
        args: impl Into<SmallVec<[ExpressionNode; 3]>>,
    ) -> Self {
        Self::Function(Box::new(FunctionCallData {
            name: name.into(),
            args: args.into(),
        }))
    }

    /// Create `base.invocation`
    pub fn invocation(base: ExpressionNode, invocation: ExpressionNode) -> Self {
        Self::Invocation {
            base: Box::new(base),
            invocation: Box::new(invocation),
        }
    }

    /// Create a binary operation expression
    pub fn binary_op(op: BinaryOperator, left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::BinaryOp(Box::new(BinaryOpData { op, left, right }))
    }

    /// Create a unary operation expression
    pub fn unary_op(op: UnaryOperator, operand: ExpressionNode) -> Self {
        Self::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    /// Create an index expression
    pub fn index(base: ExpressionNode, index: ExpressionNode) -> Self {
        Self::Index {
            base: Box::new(base),
            index: Box::new(index),
        }
    }

    /// Create an `is` / `as` expression
    pub fn type_op(op: TypeOperator, expression: ExpressionNode, type_name: impl Into<String>) -> Self {
        Self::TypeOp {
            op,
            expression: Box::new(expression),
            type_name: type_name.into(),
        }
    }

    /// Read this expression as a type specifier (`Patient`, `FHIR.Patient`)
    ///
    /// Used by functions such as `ofType()` whose argument names a type.
    pub fn as_type_specifier(&self) -> Option<String> {
        match self {
            Self::Member(name) => Some(name.clone()),
            Self::Invocation { base, invocation } => match (base.as_ref(), invocation.as_ref()) {
                (Self::Member(namespace), Self::Member(name)) => Some(format!("{namespace}.{name}")),
                _ => None,
            },
            _ => None,
        }
    }

    /// Number of nodes in the tree
    pub fn complexity(&self) -> usize {
        1 + match self {
            Self::Literal(_) | Self::Member(_) | Self::Variable(_) | Self::ExternalConstant(_) => 0,
            Self::Function(data) => data.args.iter().map(Self::complexity).sum(),
            Self::Invocation { base, invocation } => base.complexity() + invocation.complexity(),
            Self::BinaryOp(data) => data.left.complexity() + data.right.complexity(),
            Self::UnaryOp { operand, .. } => operand.complexity(),
            Self::Index { base, index } => base.complexity() + index.complexity(),
            Self::TypeOp { expression, .. } => expression.complexity(),
        }
    }

    /// Names of all functions called anywhere in the tree
    pub fn function_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_function_names(&mut names);
        names
    }

    fn collect_function_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Literal(_) | Self::Member(_) | Self::Variable(_) | Self::ExternalConstant(_) => {}
            Self::Function(data) => {
                names.push(&data.name);
                for arg in &data.args {
                    arg.collect_function_names(names);
                }
            }
            Self::Invocation { base, invocation } => {
                base.collect_function_names(names);
                invocation.collect_function_names(names);
            }
            Self::BinaryOp(data) => {
                data.left.collect_function_names(names);
                data.right.collect_function_names(names);
            }
            Self::UnaryOp { operand, .. } => operand.collect_function_names(names),
            Self::Index { base, index } => {
                base.collect_function_names(names);
                index.collect_function_names(names);
            }
            Self::TypeOp { expression, .. } => expression.collect_function_names(names),
        }
    }
}

fn write_identifier(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !crate::parser::tokenizer::is_keyword(name);
    if plain {
        f.write_str(name)
    } else {
        write!(f, "`{}`", name.replace('`', "\\`"))
    }
}

fn write_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in value.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            other => write!(f, "{other}")?,
        }
    }
    f.write_str("'")
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::String(s) => write_string(f, s),
            Self::Date(d) => write!(f, "@{d}"),
            Self::DateTime(dt) => write!(f, "@{dt}"),
            Self::Time(t) => write!(f, "@T{t}"),
            Self::Quantity(q) => write!(f, "{q}"),
            Self::Empty => f.write_str("{}"),
        }
    }
}

/// Renders an expression that parses back to the same tree
impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{literal}"),
            Self::Member(name) => write_identifier(f, name),
            Self::Function(data) => {
                write_identifier(f, &data.name)?;
                f.write_str("(")?;
                for (i, arg) in data.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Self::Invocation { base, invocation } => write!(f, "{base}.{invocation}"),
            Self::BinaryOp(data) => write!(f, "({} {} {})", data.left, data.op, data.right),
            Self::UnaryOp { op, operand } => write!(f, "({op}{operand})"),
            Self::Index { base, index } => write!(f, "{base}[{index}]"),
            Self::TypeOp {
                op,
                expression,
                type_name,
            } => write!(f, "({expression} {op} {type_name})"),
            Self::Variable(variable) => write!(f, "{variable}"),
            Self::ExternalConstant(name) => {
                f.write_str("%")?;
                write_identifier(f, name)
            }
        }
    }
}
