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

//! Value model, document trees and the type registry

pub mod adapter;
pub mod collection;
pub mod error;
pub mod node;
pub mod quantity;
pub mod temporal;
pub mod types;
pub mod value;

pub use adapter::{JsonAdapter, TreeAdapter};
pub use collection::{Collection, PathNode};
pub use error::{ModelError, ModelResult};
pub use node::{Node, NodeBuilder};
pub use quantity::Quantity;
pub use temporal::{CalendarUnit, PrecisionDate, PrecisionDateTime, PrecisionTime, TemporalPrecision};
pub use types::{TypeInfo, TypeRegistry, default_registry};
pub use value::PrimitiveValue;
