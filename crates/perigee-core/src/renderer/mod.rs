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

//! The backend-agnostic render command layer.
//!
//! [`RenderApi`] enumerates every graphics operation the engine needs, in
//! terms of engine-defined enums and opaque handles. Exactly one concrete
//! backend implements it per process; all call sites go through the
//! [`RenderContext`] façade and never see a backend type.

mod api;
mod command;
mod enums;
mod error;
mod handle;

pub use api::RenderApi;
pub use command::RenderContext;
pub use enums::{
    BoolFlag, DrawMode, GraphicsBackendKind, NumericType, PolygonMode, ShaderStage, TextureFormat,
    TextureParameter, TextureParameterName, TextureTarget, TextureUnit,
};
pub use error::{RenderError, ShaderError};
pub use handle::{
    BufferId, FramebufferId, FramebufferTarget, ProgramId, ShaderId, TextureId, VertexArrayId,
};
