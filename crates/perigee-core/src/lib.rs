// Copyright 2025 the Perigee authors
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

//! # Perigee Core
//!
//! Foundational crate containing traits, core types, and interface contracts
//! that define the engine's architecture: the event system (payloads,
//! dispatcher, queue, listener/manager), the layer stack, and the
//! backend-agnostic render command contract.

#![warn(missing_docs)]

pub mod context;
pub mod event;
pub mod layer;
pub mod math;
pub mod platform;
pub mod renderer;

pub use context::EngineContext;
