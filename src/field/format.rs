//! Typed buffer formats and their element strides/byte layouts.

use crate::error::MaterializeError;

/// A typed output format a [`crate::field::FieldMaterializer`] can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BufferFormat {
    F32,
    F64,
    I32,
    U32,
    U8,
    /// Interleaved `(x, y)` pairs.
    Vec2F32,
    /// Interleaved `(x, y, z)`.
    Vec3F32,
    /// Interleaved `(x, y, z, w)`.
    Vec4F32,
    /// Interleaved `(x, y, z, w)`, same stride as `Vec4F32`.
    QuatF32,
    /// Column-major, 16 scalars per element, translation in indices 12..15.
    Mat4F32,
    /// 4 bytes per element, 0-255 range, sRGB unless stated otherwise.
    Rgba8,
}

impl BufferFormat {
    /// Number of scalar/byte components per element.
    pub fn stride(self) -> usize {
        match self {
            BufferFormat::F32 | BufferFormat::F64 | BufferFormat::I32 | BufferFormat::U32 | BufferFormat::U8 => 1,
            BufferFormat::Vec2F32 => 2,
            BufferFormat::Vec3F32 => 3,
            BufferFormat::Vec4F32 | BufferFormat::QuatF32 => 4,
            BufferFormat::Mat4F32 => 16,
            BufferFormat::Rgba8 => 4,
        }
    }

    /// Parse a format from the wire name used by materialization requests and
    /// the render-sink planner's usage-tag table.
    pub fn parse(name: &str) -> Result<Self, MaterializeError> {
        match name {
            "f32" => Ok(BufferFormat::F32),
            "f64" => Ok(BufferFormat::F64),
            "i32" => Ok(BufferFormat::I32),
            "u32" => Ok(BufferFormat::U32),
            "u8" => Ok(BufferFormat::U8),
            "vec2f32" => Ok(BufferFormat::Vec2F32),
            "vec3f32" => Ok(BufferFormat::Vec3F32),
            "vec4f32" => Ok(BufferFormat::Vec4F32),
            "quatf32" => Ok(BufferFormat::QuatF32),
            "mat4f32" => Ok(BufferFormat::Mat4F32),
            "rgba8" => Ok(BufferFormat::Rgba8),
            other => Err(MaterializeError::UnknownFormat(other.to_string())),
        }
    }
}

/// A semantic layout tag, used only by the render-sink planner to describe
/// what shape of data a usage tag maps to. Distinct from [`BufferFormat`]
/// because several layouts (e.g. `scalar`) can map to several formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Layout {
    Scalar,
    Vec2,
    Color,
}

/// A typed, owned buffer produced by [`crate::field::FieldMaterializer`].
///
/// Backed by one concrete typed `Vec`; element count times [`BufferFormat::stride`]
/// gives the underlying array length (byte length for [`BufferFormat::Rgba8`]).
#[derive(Debug, Clone, PartialEq)]
pub enum BufferView {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    U8(Vec<u8>),
}

impl BufferView {
    /// Allocate a zero-filled buffer of `format` sized for `element_count`
    /// elements.
    pub fn zeroed(format: BufferFormat, element_count: usize) -> Self {
        let len = format.stride() * element_count;
        match format {
            BufferFormat::F32 | BufferFormat::Vec2F32 | BufferFormat::Vec3F32 | BufferFormat::Vec4F32 | BufferFormat::QuatF32 | BufferFormat::Mat4F32 => {
                BufferView::F32(vec![0.0; len])
            }
            BufferFormat::F64 => BufferView::F64(vec![0.0; len]),
            BufferFormat::I32 => BufferView::I32(vec![0; len]),
            BufferFormat::U32 => BufferView::U32(vec![0; len]),
            BufferFormat::U8 | BufferFormat::Rgba8 => BufferView::U8(vec![0; len]),
        }
    }

    /// The format this buffer was allocated for.
    pub fn format(&self) -> BufferFormat {
        // The allocator only ever produces F32 buffers for the float-family
        // formats, so format identity beyond the underlying type is tracked
        // by the pool/cache key, not recoverable from the buffer alone.
        match self {
            BufferView::F32(_) => BufferFormat::F32,
            BufferView::F64(_) => BufferFormat::F64,
            BufferView::I32(_) => BufferFormat::I32,
            BufferView::U32(_) => BufferFormat::U32,
            BufferView::U8(_) => BufferFormat::U8,
        }
    }

    /// Underlying scalar/byte array length.
    pub fn raw_len(&self) -> usize {
        match self {
            BufferView::F32(v) => v.len(),
            BufferView::F64(v) => v.len(),
            BufferView::I32(v) => v.len(),
            BufferView::U32(v) => v.len(),
            BufferView::U8(v) => v.len(),
        }
    }

    /// Mutable access to the `f32` backing array, for formats that use it.
    pub fn as_f32_mut(&mut self) -> Option<&mut [f32]> {
        match self {
            BufferView::F32(v) => Some(v.as_mut_slice()),
            _ => None,
        }
    }

    /// Mutable access to the `u8` backing array, for formats that use it.
    pub fn as_u8_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            BufferView::U8(v) => Some(v.as_mut_slice()),
            _ => None,
        }
    }

    /// Read-only access to the `f32` backing array.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            BufferView::F32(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Read-only access to the `u8` backing array.
    pub fn as_u8(&self) -> Option<&[u8]> {
        match self {
            BufferView::U8(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_lengths() {
        assert_eq!(BufferView::zeroed(BufferFormat::Vec2F32, 10).raw_len(), 20);
        assert_eq!(BufferView::zeroed(BufferFormat::Vec3F32, 10).raw_len(), 30);
        assert_eq!(BufferView::zeroed(BufferFormat::Vec4F32, 10).raw_len(), 40);
        assert_eq!(BufferView::zeroed(BufferFormat::Mat4F32, 10).raw_len(), 160);
        assert_eq!(BufferView::zeroed(BufferFormat::Rgba8, 10).raw_len(), 40);
    }

    #[test]
    fn unknown_format_errors() {
        assert!(BufferFormat::parse("nonsense").is_err());
    }
}
