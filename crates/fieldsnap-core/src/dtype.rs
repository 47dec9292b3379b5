//! Element data types.

use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Runtime tag for the element type of an array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit IEEE 754 float.
    F32,
    /// 64-bit IEEE 754 float.
    F64,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            Self::F32 => std::mem::size_of::<f32>(),
            Self::F64 => std::mem::size_of::<f64>(),
        }
    }

    /// Required alignment of one element in bytes.
    pub fn align_bytes(self) -> usize {
        match self {
            Self::F32 => std::mem::align_of::<f32>(),
            Self::F64 => std::mem::align_of::<f64>(),
        }
    }

    /// Conventional name (`float32`, `float64`).
    pub fn name(self) -> &'static str {
        match self {
            Self::F32 => "float32",
            Self::F64 => "float64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A numeric element that can live in a device buffer.
///
/// Sealed: [`DType`] must describe the in-memory representation exactly,
/// because exchanged memory is reinterpreted as `[Self]` on that basis.
pub trait Element:
    sealed::Sealed
    + Copy
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
{
    /// Runtime tag for this type.
    const DTYPE: DType;
    /// Additive identity.
    const ZERO: Self;

    /// Lossy conversion from `f64`.
    fn from_f64(v: f64) -> Self;
    /// Widening conversion to `f64`.
    fn to_f64(self) -> f64;
    /// Whether the value is neither NaN nor infinite.
    fn is_finite(self) -> bool;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;
    const ZERO: Self = 0.0;

    fn from_f64(v: f64) -> Self {
        v as f32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;
    const ZERO: Self = 0.0;

    fn from_f64(v: f64) -> Self {
        v
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_dtype_matches_size() {
        assert_eq!(<f32 as Element>::DTYPE.size_bytes(), 4);
        assert_eq!(<f64 as Element>::DTYPE.size_bytes(), 8);
        assert_eq!(<f64 as Element>::DTYPE.align_bytes(), std::mem::align_of::<f64>());
    }

    #[test]
    fn display_uses_conventional_names() {
        assert_eq!(DType::F32.to_string(), "float32");
        assert_eq!(DType::F64.to_string(), "float64");
    }

    #[test]
    fn finiteness_is_per_type() {
        assert!(Element::is_finite(1.0f32));
        assert!(!Element::is_finite(f64::NAN));
        assert!(!Element::is_finite(f32::INFINITY));
    }
}
