//! Read-only table of compile-time numeric constants and structured
//! literals, addressed by integer id.

use crate::error::{EvalError, MaterializeError};
use crate::ids::ConstId;

/// Tolerance within which a quaternion literal's squared length must sit
/// around 1.0 to be accepted (`spec.md §3`, `‖q‖ ∈ [1−10⁻³, 1+10⁻³]`).
pub const QUATERNION_UNIT_TOLERANCE: f64 = 1e-3;

/// A `vec2` literal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2Lit {
    pub x: f64,
    pub y: f64,
}

/// A `vec3` literal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3Lit {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A `vec4` literal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec4Lit {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// A quaternion literal. Must satisfy `‖q‖ ≈ 1` within
/// [`QUATERNION_UNIT_TOLERANCE`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuatLit {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl QuatLit {
    fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Validate the unit-length invariant, returning the offending const id
    /// on failure.
    pub fn validate(&self, id: u32) -> Result<(), MaterializeError> {
        let len = self.length();
        if (len - 1.0).abs() > QUATERNION_UNIT_TOLERANCE {
            return Err(MaterializeError::NonUnitQuaternion(id));
        }
        Ok(())
    }
}

/// A column-major 4x4 matrix literal. Must have exactly 16 elements.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mat4Lit(pub Vec<f64>);

impl Mat4Lit {
    /// Validate the fixed 16-element shape, returning the offending const
    /// id on failure.
    pub fn validate(&self, id: u32) -> Result<(), MaterializeError> {
        if self.0.len() != 16 {
            return Err(MaterializeError::Mat4LengthMismatch(id));
        }
        Ok(())
    }
}

/// An sRGB color literal, components in `[0, 1]` prior to 8-bit
/// quantization.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorLit {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// Read-only table of constant-pool entries.
///
/// Only the `numbers` arena participates in scalar `const` node evaluation;
/// the typed arenas back field `Const` handles. Out-of-range reads are
/// errors (`spec.md §3`).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstPool {
    numbers: Vec<f64>,
    vec2s: Vec<Vec2Lit>,
    vec3s: Vec<Vec3Lit>,
    vec4s: Vec<Vec4Lit>,
    quats: Vec<QuatLit>,
    mat4s: Vec<Mat4Lit>,
    colors: Vec<ColorLit>,
    bools: Vec<bool>,
    number_arrays: Vec<Vec<f64>>,
}

impl ConstPool {
    /// Build a const pool from its number arena; the typed arenas are
    /// populated separately via the `push_*` builders.
    pub fn new(numbers: Vec<f64>) -> Self {
        Self {
            numbers,
            ..Default::default()
        }
    }

    /// Read a number from the pool's `numbers` arena.
    pub fn number(&self, id: ConstId) -> Result<f64, EvalError> {
        self.numbers
            .get(id.index())
            .copied()
            .ok_or(EvalError::InvalidConstId(id.get()))
    }

    /// Append a `vec2` literal, returning its assigned id.
    pub fn push_vec2(&mut self, v: Vec2Lit) -> ConstId {
        self.vec2s.push(v);
        ConstId((self.vec2s.len() - 1) as u32)
    }

    /// Read a `vec2` literal.
    pub fn vec2(&self, id: ConstId) -> Result<Vec2Lit, MaterializeError> {
        self.vec2s
            .get(id.index())
            .copied()
            .ok_or_else(|| MaterializeError::InvalidVecConstant(format!("no vec2 const {id}")))
    }

    /// Append a `vec3` literal, returning its assigned id.
    pub fn push_vec3(&mut self, v: Vec3Lit) -> ConstId {
        self.vec3s.push(v);
        ConstId((self.vec3s.len() - 1) as u32)
    }

    /// Read a `vec3` literal.
    pub fn vec3(&self, id: ConstId) -> Result<Vec3Lit, MaterializeError> {
        self.vec3s
            .get(id.index())
            .copied()
            .ok_or_else(|| MaterializeError::InvalidVecConstant(format!("no vec3 const {id}")))
    }

    /// Append a `vec4` literal, returning its assigned id.
    pub fn push_vec4(&mut self, v: Vec4Lit) -> ConstId {
        self.vec4s.push(v);
        ConstId((self.vec4s.len() - 1) as u32)
    }

    /// Read a `vec4` literal.
    pub fn vec4(&self, id: ConstId) -> Result<Vec4Lit, MaterializeError> {
        self.vec4s
            .get(id.index())
            .copied()
            .ok_or_else(|| MaterializeError::InvalidVecConstant(format!("no vec4 const {id}")))
    }

    /// Append a quaternion literal, returning its assigned id. Length is
    /// validated lazily at read time, matching `spec.md §4.2`'s "validate
    /// unit length before filling" (validation happens on fill, not push).
    pub fn push_quat(&mut self, v: QuatLit) -> ConstId {
        self.quats.push(v);
        ConstId((self.quats.len() - 1) as u32)
    }

    /// Read a quaternion literal, validating its unit-length invariant.
    pub fn quat(&self, id: ConstId) -> Result<QuatLit, MaterializeError> {
        let q = self
            .quats
            .get(id.index())
            .copied()
            .ok_or_else(|| MaterializeError::InvalidVecConstant(format!("no quat const {id}")))?;
        q.validate(id.get())?;
        Ok(q)
    }

    /// Append a mat4 literal, returning its assigned id.
    pub fn push_mat4(&mut self, v: Mat4Lit) -> ConstId {
        self.mat4s.push(v);
        ConstId((self.mat4s.len() - 1) as u32)
    }

    /// Read a mat4 literal, validating its 16-element shape.
    pub fn mat4(&self, id: ConstId) -> Result<&Mat4Lit, MaterializeError> {
        let m = self
            .mat4s
            .get(id.index())
            .ok_or_else(|| MaterializeError::InvalidVecConstant(format!("no mat4 const {id}")))?;
        m.validate(id.get())?;
        Ok(m)
    }

    /// Append a color literal, returning its assigned id.
    pub fn push_color(&mut self, v: ColorLit) -> ConstId {
        self.colors.push(v);
        ConstId((self.colors.len() - 1) as u32)
    }

    /// Read a color literal.
    pub fn color(&self, id: ConstId) -> Result<ColorLit, MaterializeError> {
        self.colors
            .get(id.index())
            .copied()
            .ok_or_else(|| MaterializeError::InvalidVecConstant(format!("no color const {id}")))
    }

    /// Append a boolean literal, returning its assigned id.
    pub fn push_bool(&mut self, v: bool) -> ConstId {
        self.bools.push(v);
        ConstId((self.bools.len() - 1) as u32)
    }

    /// Read a boolean literal.
    pub fn boolean(&self, id: ConstId) -> Result<bool, MaterializeError> {
        self.bools
            .get(id.index())
            .copied()
            .ok_or_else(|| MaterializeError::InvalidVecConstant(format!("no bool const {id}")))
    }

    /// Append a per-element numeric array literal, returning its assigned
    /// id. Its length must equal the domain's element count at fill time.
    pub fn push_number_array(&mut self, v: Vec<f64>) -> ConstId {
        self.number_arrays.push(v);
        ConstId((self.number_arrays.len() - 1) as u32)
    }

    /// Read a per-element numeric array literal.
    pub fn number_array(&self, id: ConstId) -> Result<&[f64], MaterializeError> {
        self.number_arrays
            .get(id.index())
            .map(Vec::as_slice)
            .ok_or_else(|| MaterializeError::InvalidVecConstant(format!("no number array const {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_out_of_range_errors() {
        let pool = ConstPool::new(vec![1.0, 2.0]);
        assert_eq!(pool.number(ConstId(5)), Err(EvalError::InvalidConstId(5)));
        assert_eq!(pool.number(ConstId(1)), Ok(2.0));
    }

    #[test]
    fn quaternion_validation() {
        let mut pool = ConstPool::default();
        let good = pool.push_quat(QuatLit {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        });
        let bad = pool.push_quat(QuatLit {
            x: 1.0,
            y: 1.0,
            z: 1.0,
            w: 1.0,
        });
        assert!(pool.quat(good).is_ok());
        assert_eq!(pool.quat(bad), Err(MaterializeError::NonUnitQuaternion(bad.get())));
    }

    #[test]
    fn mat4_length_mismatch() {
        let mut pool = ConstPool::default();
        let id = pool.push_mat4(Mat4Lit(vec![0.0; 15]));
        assert_eq!(pool.mat4(id).err(), Some(MaterializeError::Mat4LengthMismatch(id.get())));
    }
}
