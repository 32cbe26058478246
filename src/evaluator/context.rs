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

//! Evaluation context and the focus stack
//!
//! [`EvaluationContext`] carries what stays fixed for a whole evaluation: the
//! root input, caller variables and the type registry. [`Frame`] is one level
//! of the focus stack. Frames live on the Rust call stack and link to their
//! parent by reference, so pushing a focus never copies or mutates the levels
//! below it.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::model::{Collection, TypeRegistry, default_registry};

/// Inputs shared by every frame of one evaluation
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    /// Root input value (`%context`, `%resource`)
    root: Collection,
    /// Caller supplied `%name` variables
    variables: FxHashMap<String, Collection>,
    /// Types used by `is`, `as` and `ofType`
    types: Arc<TypeRegistry>,
}

impl EvaluationContext {
    /// Create a context over the given input with the default type registry
    pub fn new(root: impl Into<Collection>) -> Self {
        Self {
            root: root.into(),
            variables: FxHashMap::default(),
            types: default_registry(),
        }
    }

    /// Bind an external constant, visible as `%name`
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Collection>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Replace the type registry
    pub fn with_type_registry(mut self, types: Arc<TypeRegistry>) -> Self {
        self.types = types;
        self
    }

    /// Set a variable in the context
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<Collection>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Get a variable from the context
    pub fn variable(&self, name: &str) -> Option<&Collection> {
        self.variables.get(name)
    }

    /// Root input of the evaluation
    pub fn root(&self) -> &Collection {
        &self.root
    }

    /// Type registry used for type tests
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }
}

/// One level of the focus stack
#[derive(Debug)]
pub struct Frame<'a> {
    focus: Collection,
    index: Option<usize>,
    total: Option<Collection>,
    parent: Option<&'a Frame<'a>>,
}

impl<'a> Frame<'a> {
    /// Bottom frame of an evaluation
    pub fn root(focus: Collection) -> Self {
        Self {
            focus,
            index: None,
            total: None,
            parent: None,
        }
    }

    /// Child frame focused on `focus`
    pub fn push(&'a self, focus: Collection) -> Frame<'a> {
        Frame {
            focus,
            index: None,
            total: None,
            parent: Some(self),
        }
    }

    /// Bind `$index` in this frame
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Bind `$total` in this frame
    pub fn with_total(mut self, total: Collection) -> Self {
        self.total = Some(total);
        self
    }

    /// `$this`
    pub fn focus(&self) -> &Collection {
        &self.focus
    }

    /// `$index` of the nearest frame that binds it
    pub fn index(&self) -> Option<usize> {
        self.ancestors().find_map(|frame| frame.index)
    }

    /// `$total` of the nearest frame that binds it
    pub fn total(&self) -> Option<&Collection> {
        self.ancestors().find_map(|frame| frame.total.as_ref())
    }

    fn ancestors(&self) -> impl Iterator<Item = &Frame<'a>> {
        std::iter::successors(Some(self), |frame| frame.parent)
    }
}
