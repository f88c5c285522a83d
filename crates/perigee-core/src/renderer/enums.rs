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

//! Engine-level enums parameterizing the render command layer.
//!
//! Backends translate these to native values through exhaustive matches. A
//! value a backend cannot express translates to that backend's documented
//! default rather than failing; adding a case here requires touching every
//! backend's translation table.

/// The graphics API a backend targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsBackendKind {
    /// No backend. Selecting this at startup is a fatal configuration error.
    None,
    /// The wgpu backend.
    Wgpu,
}

/// Scalar type of vertex attribute or texel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    /// Unspecified; translates to the backend default.
    None,
    /// 32-bit float.
    Float,
    /// 32-bit signed integer.
    Int,
    /// 8-bit unsigned integer.
    UnsignedByte,
}

/// A boolean crossing the command layer as an explicit flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolFlag {
    /// False.
    False,
    /// True.
    True,
}

impl From<BoolFlag> for bool {
    fn from(flag: BoolFlag) -> bool {
        matches!(flag, BoolFlag::True)
    }
}

/// Primitive assembly mode for non-indexed draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawMode {
    /// Unspecified; translates to the backend default.
    None,
    /// Line list.
    Lines,
    /// Triangle list.
    Triangles,
    /// Convex polygon; backends without native support fall back to
    /// triangles.
    Polygons,
}

/// Rasterization fill mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    /// Unspecified; translates to the backend default (fill).
    None,
    /// Outline rasterization.
    Line,
    /// Filled rasterization.
    Fill,
}

/// Dimensionality of a texture binding target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureTarget {
    /// Unspecified; translates to the backend default.
    None,
    /// One-dimensional texture.
    D1,
    /// Two-dimensional texture.
    D2,
    /// Three-dimensional texture.
    D3,
}

/// Which sampling parameter a [`TextureParameter`] value applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureParameterName {
    /// Addressing along the horizontal axis.
    WrapS,
    /// Addressing along the vertical axis.
    WrapT,
    /// Minification filter.
    MinFilter,
    /// Magnification filter.
    MagFilter,
}

/// A texture sampling parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureParameter {
    /// Unspecified; translates to the backend default.
    None,
    /// Linear filtering.
    Linear,
    /// Linear filtering with linear mip blending.
    LinearMipmapLinear,
    /// Nearest-texel filtering.
    Nearest,
    /// Wrap addressing; not every backend maps it, in which case the
    /// documented default applies.
    Wrap,
    /// Repeat addressing.
    Repeat,
}

/// Texel channel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// Unspecified; translates to the backend default.
    None,
    /// Single red channel.
    Red,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
}

/// A texture binding slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureUnit(pub u32);

impl TextureUnit {
    /// The first (and most commonly used) texture unit.
    pub const UNIT0: Self = Self(0);
}

/// Pipeline stage a shader is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Fragment stage.
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}
