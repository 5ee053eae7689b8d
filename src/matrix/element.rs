//! In-memory element types.
//!
//! Every matrix operation is written once, generic over [`Element`], and
//! instantiated for `i32`, `f32` and `f64`. The handle converts between the
//! requested type and the stored kind on every read and write.

use super::ElementKind;
use std::fmt::Debug;
use std::str::FromStr;

/// A numeric type a matrix line can be read into or written from.
pub trait Element: Copy + Default + PartialEq + PartialOrd + Debug + FromStr + 'static {
    /// Kind this type maps to on disk.
    const KIND: ElementKind;

    fn from_i32(v: i32) -> Self;

    fn to_i32(self) -> i32;

    fn from_f64(v: f64) -> Self;

    fn to_f64(self) -> f64;

    /// Sum used by projections. Integers wrap.
    fn accumulate(self, other: Self) -> Self;

    /// Decode one little-endian value of `kind` from the front of `bytes`.
    #[inline]
    fn read_le(kind: ElementKind, bytes: &[u8]) -> Self {
        match kind {
            ElementKind::Int32 => Self::from_i32(i32::from_le_bytes(le4(bytes))),
            ElementKind::Float32 => Self::from_f64(f64::from(f32::from_le_bytes(le4(bytes)))),
            ElementKind::Float64 => Self::from_f64(f64::from_le_bytes(le8(bytes))),
        }
    }

    /// Encode as one little-endian value of `kind` into the front of `out`.
    #[inline]
    fn write_le(self, kind: ElementKind, out: &mut [u8]) {
        match kind {
            ElementKind::Int32 => out[..4].copy_from_slice(&self.to_i32().to_le_bytes()),
            ElementKind::Float32 => out[..4].copy_from_slice(&(self.to_f64() as f32).to_le_bytes()),
            ElementKind::Float64 => out[..8].copy_from_slice(&self.to_f64().to_le_bytes()),
        }
    }
}

#[inline]
fn le4(bytes: &[u8]) -> [u8; 4] {
    [bytes[0], bytes[1], bytes[2], bytes[3]]
}

#[inline]
fn le8(bytes: &[u8]) -> [u8; 8] {
    [
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ]
}

impl Element for i32 {
    const KIND: ElementKind = ElementKind::Int32;

    #[inline]
    fn from_i32(v: i32) -> Self {
        v
    }

    #[inline]
    fn to_i32(self) -> i32 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        // `as` saturates and maps NaN to 0
        v.round() as i32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn accumulate(self, other: Self) -> Self {
        self.wrapping_add(other)
    }
}

impl Element for f32 {
    const KIND: ElementKind = ElementKind::Float32;

    #[inline]
    fn from_i32(v: i32) -> Self {
        v as f32
    }

    #[inline]
    fn to_i32(self) -> i32 {
        self.round() as i32
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn accumulate(self, other: Self) -> Self {
        self + other
    }
}

impl Element for f64 {
    const KIND: ElementKind = ElementKind::Float64;

    #[inline]
    fn from_i32(v: i32) -> Self {
        f64::from(v)
    }

    #[inline]
    fn to_i32(self) -> i32 {
        self.round() as i32
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn accumulate(self, other: Self) -> Self {
        self + other
    }
}
