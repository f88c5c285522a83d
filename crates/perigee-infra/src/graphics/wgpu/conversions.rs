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

//! Translation tables from engine enums to wgpu values.
//!
//! Every function is total: a value this backend cannot express translates
//! to the documented default named in its doc comment, never to a failure.

use perigee_core::math::LinearRgba;
use perigee_core::renderer::{DrawMode, NumericType, PolygonMode, TextureFormat, TextureParameter};

/// A local extension trait to convert engine types into wgpu-compatible
/// types. Avoids the orphan rules while keeping `.into_wgpu()` syntax.
pub trait IntoWgpu<T> {
    /// Consumes self and converts it into a wgpu-compatible type.
    fn into_wgpu(self) -> T;
}

impl IntoWgpu<wgpu::Color> for LinearRgba {
    fn into_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

/// Primitive topology for a draw mode. Default: `TriangleList`.
///
/// wgpu has no native polygon primitive; `Polygons` falls back to triangles.
pub fn topology_for(mode: DrawMode) -> wgpu::PrimitiveTopology {
    match mode {
        DrawMode::Lines => wgpu::PrimitiveTopology::LineList,
        DrawMode::Triangles | DrawMode::Polygons | DrawMode::None => {
            wgpu::PrimitiveTopology::TriangleList
        }
    }
}

/// Rasterization mode. Default: `Fill`.
pub fn polygon_mode_for(mode: PolygonMode) -> wgpu::PolygonMode {
    match mode {
        PolygonMode::Line => wgpu::PolygonMode::Line,
        PolygonMode::Fill | PolygonMode::None => wgpu::PolygonMode::Fill,
    }
}

/// Vertex attribute format for a scalar type and component count.
/// Default: `Float32` for anything without an exact wgpu format.
pub fn vertex_format_for(ty: NumericType, size: i32) -> wgpu::VertexFormat {
    match (ty, size) {
        (NumericType::Float, 1) => wgpu::VertexFormat::Float32,
        (NumericType::Float, 2) => wgpu::VertexFormat::Float32x2,
        (NumericType::Float, 3) => wgpu::VertexFormat::Float32x3,
        (NumericType::Float, 4) => wgpu::VertexFormat::Float32x4,
        (NumericType::Int, 1) => wgpu::VertexFormat::Sint32,
        (NumericType::Int, 2) => wgpu::VertexFormat::Sint32x2,
        (NumericType::Int, 3) => wgpu::VertexFormat::Sint32x3,
        (NumericType::Int, 4) => wgpu::VertexFormat::Sint32x4,
        (NumericType::UnsignedByte, 4) => wgpu::VertexFormat::Unorm8x4,
        _ => wgpu::VertexFormat::Float32,
    }
}

/// Sampler addressing mode. Default: `ClampToEdge`.
///
/// `Wrap` has no wgpu counterpart and takes the default; `Repeat` maps
/// directly.
pub fn address_mode_for(value: TextureParameter) -> wgpu::AddressMode {
    match value {
        TextureParameter::Repeat => wgpu::AddressMode::Repeat,
        _ => wgpu::AddressMode::ClampToEdge,
    }
}

/// Sampler filter mode. Default: `Nearest`.
pub fn filter_mode_for(value: TextureParameter) -> wgpu::FilterMode {
    match value {
        TextureParameter::Linear | TextureParameter::LinearMipmapLinear => {
            wgpu::FilterMode::Linear
        }
        _ => wgpu::FilterMode::Nearest,
    }
}

/// Texture storage format. Default: `Rgba8UnormSrgb`.
///
/// wgpu has no three-channel 8-bit format; `Rgb` data is padded to four
/// channels at upload and stored as rgba.
pub fn texture_format_for(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::Red => wgpu::TextureFormat::R8Unorm,
        TextureFormat::Rgb | TextureFormat::Rgba | TextureFormat::None => {
            wgpu::TextureFormat::Rgba8UnormSrgb
        }
    }
}

/// Bytes per texel of the source data as described by the caller.
pub fn source_bytes_per_texel(format: TextureFormat) -> u32 {
    match format {
        TextureFormat::Red => 1,
        TextureFormat::Rgb => 3,
        TextureFormat::Rgba | TextureFormat::None => 4,
    }
}

/// Bytes per texel of the stored format chosen by [`texture_format_for`].
pub fn stored_bytes_per_texel(format: TextureFormat) -> u32 {
    match format {
        TextureFormat::Red => 1,
        TextureFormat::Rgb | TextureFormat::Rgba | TextureFormat::None => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_wrap_parameter_takes_the_default_address_mode() {
        assert_eq!(
            address_mode_for(TextureParameter::Wrap),
            wgpu::AddressMode::ClampToEdge
        );
        assert_eq!(
            address_mode_for(TextureParameter::None),
            wgpu::AddressMode::ClampToEdge
        );
        assert_eq!(
            address_mode_for(TextureParameter::Repeat),
            wgpu::AddressMode::Repeat
        );
    }

    #[test]
    fn filter_modes_translate_with_nearest_default() {
        assert_eq!(
            filter_mode_for(TextureParameter::Linear),
            wgpu::FilterMode::Linear
        );
        assert_eq!(
            filter_mode_for(TextureParameter::LinearMipmapLinear),
            wgpu::FilterMode::Linear
        );
        assert_eq!(
            filter_mode_for(TextureParameter::Nearest),
            wgpu::FilterMode::Nearest
        );
        assert_eq!(
            filter_mode_for(TextureParameter::Wrap),
            wgpu::FilterMode::Nearest
        );
    }

    #[test]
    fn polygons_fall_back_to_triangle_list() {
        assert_eq!(
            topology_for(DrawMode::Polygons),
            wgpu::PrimitiveTopology::TriangleList
        );
        assert_eq!(
            topology_for(DrawMode::Lines),
            wgpu::PrimitiveTopology::LineList
        );
        assert_eq!(
            topology_for(DrawMode::None),
            wgpu::PrimitiveTopology::TriangleList
        );
    }

    #[test]
    fn unspecified_polygon_mode_defaults_to_fill() {
        assert_eq!(polygon_mode_for(PolygonMode::None), wgpu::PolygonMode::Fill);
        assert_eq!(polygon_mode_for(PolygonMode::Line), wgpu::PolygonMode::Line);
    }

    #[test]
    fn vertex_formats_cover_float_and_int_widths() {
        assert_eq!(
            vertex_format_for(NumericType::Float, 3),
            wgpu::VertexFormat::Float32x3
        );
        assert_eq!(
            vertex_format_for(NumericType::Int, 2),
            wgpu::VertexFormat::Sint32x2
        );
        // No exact format: takes the documented default.
        assert_eq!(
            vertex_format_for(NumericType::None, 7),
            wgpu::VertexFormat::Float32
        );
    }

    #[test]
    fn rgb_data_is_stored_as_four_channel() {
        assert_eq!(
            texture_format_for(TextureFormat::Rgb),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(source_bytes_per_texel(TextureFormat::Rgb), 3);
        assert_eq!(stored_bytes_per_texel(TextureFormat::Rgb), 4);
    }

    #[test]
    fn clear_color_converts_channelwise() {
        let color: wgpu::Color = LinearRgba::new(0.25, 0.5, 0.75, 1.0).into_wgpu();
        assert_eq!(color.r, 0.25);
        assert_eq!(color.g, 0.5);
        assert_eq!(color.b, 0.75);
        assert_eq!(color.a, 1.0);
    }
}
