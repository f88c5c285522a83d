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

//! Error types for the rendering subsystem.
//!
//! Only configuration errors propagate as `Result`s (and only out of
//! initialization paths). Resource failures — shader compilation, program
//! linking, framebuffer completeness — are logged at the point of occurrence
//! and execution continues with a best-effort handle; these types give those
//! logs consistent wording.

use crate::renderer::enums::ShaderStage;
use crate::renderer::handle::ShaderId;
use std::fmt;

/// An error in shader compilation or program linking.
#[derive(Debug)]
pub enum ShaderError {
    /// The shader source failed to compile for a stage.
    CompilationFailed {
        /// The stage being compiled.
        stage: ShaderStage,
        /// Detailed error messages from the backend compiler.
        details: String,
    },
    /// The program could not be linked from its stages.
    LinkFailed {
        /// Detailed error messages from the backend.
        details: String,
    },
    /// A stage id handed to the linker does not refer to a live shader.
    InvalidStage {
        /// The offending shader id.
        id: ShaderId,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::CompilationFailed { stage, details } => {
                write!(f, "{stage} shader failed to compile: {details}")
            }
            ShaderError::LinkFailed { details } => {
                write!(f, "shader program failed to link: {details}")
            }
            ShaderError::InvalidStage { id } => {
                write!(f, "invalid shader stage id {id:?} passed to linker")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// A high-level error in the rendering system.
#[derive(Debug)]
pub enum RenderError {
    /// No backend was selected at startup. Fatal configuration error.
    NoBackendSelected,
    /// The graphics backend failed to initialize.
    InitializationFailed(String),
    /// The next frame could not be acquired from the presentation surface.
    SurfaceAcquisitionFailed(String),
    /// A shader-related failure, when it needs to travel as a value.
    Shader(ShaderError),
    /// An unexpected internal error.
    Internal(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NoBackendSelected => {
                write!(f, "no graphics backend selected")
            }
            RenderError::InitializationFailed(msg) => {
                write!(f, "failed to initialize graphics backend: {msg}")
            }
            RenderError::SurfaceAcquisitionFailed(msg) => {
                write!(f, "failed to acquire surface for rendering: {msg}")
            }
            RenderError::Shader(err) => {
                write!(f, "shader operation failed: {err}")
            }
            RenderError::Internal(msg) => {
                write!(f, "internal rendering error: {msg}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Shader(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for RenderError {
    fn from(err: ShaderError) -> Self {
        RenderError::Shader(err)
    }
}
