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

//! Tree-walking interpreter
//!
//! Every AST kind is handled by one arm of [`Interpreter::eval`]. The focus
//! stack is threaded through as a [`Frame`] reference; functions reach back
//! into the interpreter through [`ArgumentEvaluator`].

use super::context::{EvaluationContext, Frame};
use super::error::{EvaluationError, EvaluationResult};
use super::operators;
use super::type_check::TypeSpecifier;
use crate::ast::{
    BinaryOpData, BinaryOperator, ExpressionNode, FunctionCallData, SpecialVariable, TypeOperator,
};
use crate::model::{
    Collection, PathNode, PrecisionDate, PrecisionDateTime, PrecisionTime, PrimitiveValue,
    TypeRegistry,
};
use crate::registry::{ArgumentEvaluator, FunctionContext, FunctionRegistry};

/// Default bound on evaluation nesting
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Evaluates one expression tree against one [`EvaluationContext`]
pub struct Interpreter<'e> {
    functions: &'e FunctionRegistry,
    context: &'e EvaluationContext,
    max_depth: usize,
}

impl<'e> Interpreter<'e> {
    /// Create an interpreter with the default depth limit
    pub fn new(functions: &'e FunctionRegistry, context: &'e EvaluationContext) -> Self {
        Self {
            functions,
            context,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum evaluation depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Evaluate with the context root as the initial focus
    pub fn evaluate(&self, expr: &ExpressionNode) -> EvaluationResult<Collection> {
        let root = Frame::root(self.context.root().clone());
        self.eval(expr, &root, 0)
    }

    fn eval(
        &self,
        expr: &ExpressionNode,
        frame: &Frame<'_>,
        depth: usize,
    ) -> EvaluationResult<Collection> {
        if depth >= self.max_depth {
            return Err(EvaluationError::RecursionLimitExceeded {
                limit: self.max_depth,
            });
        }
        let depth = depth + 1;

        match expr {
            ExpressionNode::Literal(literal) => Ok(Collection::from_iter(
                literal.to_primitive().map(PathNode::Value),
            )),
            ExpressionNode::Member(name) => Ok(self.navigate(frame.focus(), name)),
            ExpressionNode::Function(call) => self.call(call, frame.focus(), frame, depth),
            ExpressionNode::Invocation { base, invocation } => {
                let input = self.eval(base, frame, depth)?;
                match invocation.as_ref() {
                    ExpressionNode::Function(call) => self.call(call, &input, frame, depth),
                    other => {
                        let inner = frame.push(input);
                        self.eval(other, &inner, depth)
                    }
                }
            }
            ExpressionNode::BinaryOp(data) => self.eval_binary(data, frame, depth),
            ExpressionNode::UnaryOp { op, operand } => {
                let value = self.eval(operand, frame, depth)?;
                Ok(operators::unary(*op, &value))
            }
            ExpressionNode::Index { base, index } => {
                let items = self.eval(base, frame, depth)?;
                let position = self.eval(index, frame, depth)?;
                let item = position
                    .singleton_primitive()
                    .and_then(PrimitiveValue::as_integer)
                    .and_then(|i| usize::try_from(i).ok())
                    .and_then(|i| items.get(i));
                Ok(Collection::from_iter(item.cloned()))
            }
            ExpressionNode::TypeOp {
                op,
                expression,
                type_name,
            } => {
                let specifier = TypeSpecifier::resolve(self.context.types(), type_name)?;
                let value = self.eval(expression, frame, depth)?;
                let matched = value.singleton().filter(|item| specifier.matches(item));
                Ok(match op {
                    TypeOperator::Is => Collection::boolean(matched.is_some()),
                    TypeOperator::As => Collection::from_iter(matched.cloned()),
                })
            }
            ExpressionNode::Variable(variable) => Ok(match variable {
                SpecialVariable::This => frame.focus().clone(),
                SpecialVariable::Index => Collection::from_iter(
                    frame
                        .index()
                        .and_then(|i| i64::try_from(i).ok())
                        .map(|i| PathNode::Value(PrimitiveValue::Integer(i))),
                ),
                SpecialVariable::Total => frame.total().cloned().unwrap_or_default(),
            }),
            ExpressionNode::ExternalConstant(name) => Ok(self.external_constant(name)),
        }
    }

    fn eval_binary(
        &self,
        data: &BinaryOpData,
        frame: &Frame<'_>,
        depth: usize,
    ) -> EvaluationResult<Collection> {
        let op = data.op;
        if op.is_logical() {
            let left = self.eval(&data.left, frame, depth)?.to_truth();
            let settled = match op {
                BinaryOperator::And => left == Some(false),
                BinaryOperator::Or => left == Some(true),
                BinaryOperator::Implies => left == Some(false),
                _ => false,
            };
            if settled {
                return Ok(Collection::boolean(op != BinaryOperator::And));
            }
            let right = self.eval(&data.right, frame, depth)?.to_truth();
            let result = match op {
                BinaryOperator::And => operators::and(left, right),
                BinaryOperator::Or => operators::or(left, right),
                BinaryOperator::Xor => operators::xor(left, right),
                _ => operators::implies(left, right),
            };
            return Ok(Collection::from_truth(result));
        }

        let left = self.eval(&data.left, frame, depth)?;
        let right = self.eval(&data.right, frame, depth)?;
        Ok(match op {
            BinaryOperator::Concatenate => operators::concatenate(&left, &right),
            op if op.is_arithmetic() => operators::arithmetic(op, &left, &right),
            BinaryOperator::Equal => Collection::from_truth(operators::equals(&left, &right)),
            BinaryOperator::NotEqual => {
                Collection::from_truth(operators::equals(&left, &right).map(|eq| !eq))
            }
            BinaryOperator::Equivalent => Collection::boolean(operators::equivalent(&left, &right)),
            BinaryOperator::NotEquivalent => {
                Collection::boolean(!operators::equivalent(&left, &right))
            }
            BinaryOperator::Union => left.union(&right),
            BinaryOperator::In => Collection::from_truth(operators::is_member(&left, &right)),
            BinaryOperator::Contains => {
                Collection::from_truth(operators::is_member(&right, &left))
            }
            op => operators::compare(op, &left, &right),
        })
    }

    /// Children named `name` across the focus
    ///
    /// A singleton focus whose type is named `name` resolves to itself, so
    /// `Patient.name` works on a Patient root.
    fn navigate(&self, focus: &Collection, name: &str) -> Collection {
        let children: Collection = focus
            .iter()
            .filter_map(PathNode::as_node)
            .flat_map(|node| node.children_named(name))
            .map(|child| PathNode::Node(child.clone()))
            .collect();
        if children.is_empty() {
            if let Some(PathNode::Node(node)) = focus.singleton() {
                if self.context.types().has_type_named(node.type_name(), name) {
                    return focus.clone();
                }
            }
        }
        children
    }

    fn call(
        &self,
        call: &FunctionCallData,
        input: &Collection,
        frame: &Frame<'_>,
        depth: usize,
    ) -> EvaluationResult<Collection> {
        let scope = ArgumentScope {
            interpreter: self,
            frame,
            depth,
        };
        let context = FunctionContext::new(&call.name, input, &scope);
        self.functions.call(&call.name, &call.args, &context)
    }

    fn external_constant(&self, name: &str) -> Collection {
        if let Some(value) = self.context.variable(name) {
            return value.clone();
        }
        let text = |s: String| Collection::single(PrimitiveValue::string(s));
        match name {
            "context" | "resource" | "rootResource" => self.context.root().clone(),
            "ucum" => text("http://unitsofmeasure.org".to_string()),
            "loinc" => text("http://loinc.org".to_string()),
            "sct" => text("http://snomed.info/sct".to_string()),
            "now" => Collection::single(PrimitiveValue::DateTime(PrecisionDateTime::now())),
            "today" => Collection::single(PrimitiveValue::Date(PrecisionDate::today())),
            "timeOfDay" => Collection::single(PrimitiveValue::Time(PrecisionTime::now())),
            _ => {
                if let Some(value_set) = name.strip_prefix("vs-") {
                    text(format!("http://hl7.org/fhir/ValueSet/{value_set}"))
                } else if let Some(extension) = name.strip_prefix("ext-") {
                    text(format!("http://hl7.org/fhir/StructureDefinition/{extension}"))
                } else {
                    log::debug!("unknown external constant %{name}");
                    Collection::empty()
                }
            }
        }
    }
}

/// Argument evaluation for one function call site
struct ArgumentScope<'i, 'e, 'f> {
    interpreter: &'i Interpreter<'e>,
    frame: &'i Frame<'f>,
    depth: usize,
}

impl ArgumentEvaluator for ArgumentScope<'_, '_, '_> {
    fn evaluate(&self, expr: &ExpressionNode) -> EvaluationResult<Collection> {
        self.interpreter.eval(expr, self.frame, self.depth)
    }

    fn evaluate_with_focus(
        &self,
        expr: &ExpressionNode,
        focus: Collection,
        index: Option<usize>,
        total: Option<Collection>,
    ) -> EvaluationResult<Collection> {
        let mut inner = self.frame.push(focus);
        if let Some(index) = index {
            inner = inner.with_index(index);
        }
        if let Some(total) = total {
            inner = inner.with_total(total);
        }
        self.interpreter.eval(expr, &inner, self.depth)
    }

    fn type_registry(&self) -> &TypeRegistry {
        self.interpreter.context.types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn run(expression: &str, root: impl Into<Collection>) -> EvaluationResult<Collection> {
        let functions = FunctionRegistry::with_builtins();
        let context = EvaluationContext::new(root);
        let ast = parse(expression).unwrap();
        Interpreter::new(&functions, &context).evaluate(&ast)
    }

    fn sample() -> Arc<Node> {
        Node::builder("R", "FHIR.Element")
            .leaf("a", "FHIR.string", "first")
            .leaf("a", "FHIR.string", "second")
            .leaf("b", "FHIR.integer", 3i64)
            .into()
    }

    #[test]
    fn test_member_navigation_preserves_order() {
        let result = run("a", sample()).unwrap();
        assert_eq!(result.to_string(), "[first, second]");
        assert!(run("c", sample()).unwrap().is_empty());
    }

    #[test]
    fn test_indexer_bounds() {
        assert!(run("(1 | 2 | 3)[5]", Collection::empty()).unwrap().is_empty());
        assert_eq!(run("(1 | 2 | 3)[1]", Collection::empty()).unwrap().to_string(), "[2]");
        assert!(run("(1 | 2 | 3)[-1]", Collection::empty()).unwrap().is_empty());
    }

    #[test]
    fn test_short_circuit_skips_right_operand() {
        // The right side would fail with an unknown function if evaluated.
        assert_eq!(run("false and nope()", Collection::empty()).unwrap().to_string(), "[false]");
        assert_eq!(run("true or nope()", Collection::empty()).unwrap().to_string(), "[true]");
        assert_eq!(run("false implies nope()", Collection::empty()).unwrap().to_string(), "[true]");
        assert!(run("true and nope()", Collection::empty()).is_err());
    }

    #[test]
    fn test_index_and_this_in_where() {
        let result = run("a.where($index = 1)", sample()).unwrap();
        assert_eq!(result.to_string(), "[second]");
        let result = run("a.select($this & '!')", sample()).unwrap();
        assert_eq!(result.to_string(), "[first!, second!]");
    }

    #[test]
    fn test_type_name_navigation() {
        let patient: Arc<Node> = Node::builder("Patient", "FHIR.Patient")
            .leaf("active", "FHIR.boolean", true)
            .into();
        assert_eq!(run("Patient.active", patient.clone()).unwrap().to_string(), "[true]");
        assert_eq!(run("DomainResource.active", patient).unwrap().to_string(), "[true]");
    }

    #[test]
    fn test_external_constants() {
        assert_eq!(
            run("%ucum", Collection::empty()).unwrap().to_string(),
            "[http://unitsofmeasure.org]"
        );
        assert_eq!(
            run("%`vs-administrative-gender`", Collection::empty()).unwrap().to_string(),
            "[http://hl7.org/fhir/ValueSet/administrative-gender]"
        );
        assert_eq!(run("%context.b", sample()).unwrap().to_string(), "[3]");
        assert!(run("%unknown", Collection::empty()).unwrap().is_empty());
    }

    #[test]
    fn test_caller_variables_shadow_builtins() {
        let functions = FunctionRegistry::with_builtins();
        let context = EvaluationContext::new(Collection::empty())
            .with_variable("ucum", PrimitiveValue::string("overridden"));
        let ast = parse("%ucum").unwrap();
        let result = Interpreter::new(&functions, &context).evaluate(&ast).unwrap();
        assert_eq!(result.to_string(), "[overridden]");
    }

    #[test]
    fn test_recursion_limit() {
        let functions = FunctionRegistry::with_builtins();
        let context = EvaluationContext::new(Collection::empty());
        let ast = parse("1 + 1 + 1 + 1 + 1").unwrap();
        let err = Interpreter::new(&functions, &context)
            .with_max_depth(3)
            .evaluate(&ast)
            .unwrap_err();
        assert_eq!(err, EvaluationError::RecursionLimitExceeded { limit: 3 });
    }

    #[test]
    fn test_type_operators() {
        assert_eq!(run("1 is Integer", Collection::empty()).unwrap().to_string(), "[true]");
        assert_eq!(run("(1 | 2) is Integer", Collection::empty()).unwrap().to_string(), "[false]");
        assert_eq!(run("{} is Integer", Collection::empty()).unwrap().to_string(), "[false]");
        assert!(run("'a' as Integer", Collection::empty()).unwrap().is_empty());
        assert!(matches!(
            run("1 is Starship", Collection::empty()),
            Err(EvaluationError::UnknownType { .. })
        ));
    }
}
