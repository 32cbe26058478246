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

//! Function signatures used for arity checks and documentation

use std::fmt;

use serde::{Deserialize, Serialize};

/// How an argument is consumed by the function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    /// Evaluated once against the enclosing focus
    Value,
    /// Re-evaluated for each input element with `$this` and `$index` bound
    Expression,
    /// Read as a type specifier, never evaluated
    TypeSpecifier,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value => f.write_str("value"),
            Self::Expression => f.write_str("expression"),
            Self::TypeSpecifier => f.write_str("type"),
        }
    }
}

/// Function signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Function name
    pub name: String,
    /// Declared parameters
    pub parameters: Vec<ParameterInfo>,
    /// Name of the result type
    pub return_type: String,
    /// Minimum number of arguments
    pub min_arity: usize,
    /// Maximum number of arguments (None for variadic)
    pub max_arity: Option<usize>,
}

/// Parameter information for functions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// How the argument is evaluated
    pub kind: ParameterKind,
    /// Whether this parameter is optional
    pub optional: bool,
}

impl FunctionSignature {
    /// Create a new function signature
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<ParameterInfo>,
        return_type: impl Into<String>,
    ) -> Self {
        let required_params = parameters.iter().filter(|p| !p.optional).count();
        let max_arity = Some(parameters.len());

        Self {
            name: name.into(),
            parameters,
            return_type: return_type.into(),
            min_arity: required_params,
            max_arity,
        }
    }

    /// Create a variadic function signature
    pub fn variadic(
        name: impl Into<String>,
        parameters: Vec<ParameterInfo>,
        return_type: impl Into<String>,
    ) -> Self {
        let required_params = parameters.iter().filter(|p| !p.optional).count();

        Self {
            name: name.into(),
            parameters,
            return_type: return_type.into(),
            min_arity: required_params,
            max_arity: None,
        }
    }

    /// Whether `count` arguments are acceptable
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_arity && self.max_arity.is_none_or(|max| count <= max)
    }
}

impl ParameterInfo {
    /// Create a required parameter
    pub fn required(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false,
        }
    }

    /// Create an optional parameter
    pub fn optional(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: true,
        }
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", param.name, param.kind)?;
            if param.optional {
                write!(f, "?")?;
            }
        }
        if self.max_arity.is_none() {
            write!(f, ", ...")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arity_bounds() {
        let sig = FunctionSignature::new(
            "iif",
            vec![
                ParameterInfo::required("criterion", ParameterKind::Expression),
                ParameterInfo::required("true-result", ParameterKind::Expression),
                ParameterInfo::optional("otherwise-result", ParameterKind::Expression),
            ],
            "Any",
        );
        assert_eq!((sig.min_arity, sig.max_arity), (2, Some(3)));
        assert!(!sig.accepts(1));
        assert!(sig.accepts(3));
        assert!(!sig.accepts(4));
    }

    #[test]
    fn test_display() {
        let sig = FunctionSignature::new(
            "skip",
            vec![ParameterInfo::required("num", ParameterKind::Value)],
            "Collection",
        );
        assert_eq!(sig.to_string(), "skip(num: value) -> Collection");
        let empty = FunctionSignature::new("count", vec![], "Integer");
        assert_eq!(empty.max_arity, Some(0));
    }
}
