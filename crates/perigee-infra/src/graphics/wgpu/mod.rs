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

//! The wgpu implementation of the render command contract.
//!
//! The command layer speaks an immediate, bind-then-modify vocabulary; wgpu
//! wants whole pipelines and passes. The backend bridges the two by
//! recording operations between `clear()` and `present()` and replaying them
//! into render passes at present time, caching pipelines by the state that
//! shaped them.

mod api;
mod context;
mod conversions;

pub use api::WgpuRenderApi;
pub use context::WgpuGraphicsContext;
