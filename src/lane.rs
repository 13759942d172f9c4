//! Scalar lane kinds and lane-count markers
//!
//! A vector is described by two compile-time parameters: the scalar kind of
//! its lanes (`i32`, `u32`, `f32`, `f64`) and its logical lane count (2, 3 or
//! 4). Both are closed sets, enforced by sealed traits.

use std::fmt;

use crate::backends::{ActiveBackend, LaneStorage, VectorBackend};

mod sealed {
    pub trait Sealed {}
}

/// Logical scalar kind of a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// 32-bit signed integer
    Int32,
    /// 32-bit unsigned integer
    UInt32,
    /// IEEE-754 binary32
    Float32,
    /// IEEE-754 binary64
    Float64,
}

impl Kind {
    /// Width of one lane in bits
    pub const fn bits(self) -> u32 {
        match self {
            Kind::Int32 | Kind::UInt32 | Kind::Float32 => 32,
            Kind::Float64 => 64,
        }
    }

    /// Whether negative values are representable
    pub const fn is_signed(self) -> bool {
        !matches!(self, Kind::UInt32)
    }

    /// Whether the kind is a floating-point format
    pub const fn is_float(self) -> bool {
        matches!(self, Kind::Float32 | Kind::Float64)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Int32 => "Int32",
            Kind::UInt32 => "UInt32",
            Kind::Float32 => "Float32",
            Kind::Float64 => "Float64",
        };
        f.write_str(name)
    }
}

/// A scalar type that can occupy a vector lane
pub trait Lane:
    sealed::Sealed + Copy + PartialEq + fmt::Debug + Default + Send + Sync + 'static
{
    /// Additive identity, also the value of every padding lane
    const ZERO: Self;
    /// Multiplicative identity
    const ONE: Self;
    /// Logical kind tag
    const KIND: Kind;
}

/// A lane type bound to the storage of the active backend
///
/// `Storage` is always the backend's 4-lane register for this kind; narrow
/// vectors reuse it and leave the high lanes as zero padding.
pub trait Element: Lane {
    /// 4-lane register holding this kind on the active backend
    type Storage: LaneStorage<Element = Self>;
    /// Kind produced by `abs`
    type Magnitude: Element;

    /// Lane-wise absolute value, reinterpreted as the magnitude kind
    fn abs_storage(storage: Self::Storage) -> <Self::Magnitude as Element>::Storage;
}

macro_rules! impl_lane {
    ($t:ty, $kind:ident, $zero:expr, $one:expr) => {
        impl sealed::Sealed for $t {}

        impl Lane for $t {
            const ZERO: Self = $zero;
            const ONE: Self = $one;
            const KIND: Kind = Kind::$kind;
        }
    };
}

impl_lane!(i32, Int32, 0, 1);
impl_lane!(u32, UInt32, 0, 1);
impl_lane!(f32, Float32, 0.0, 1.0);
impl_lane!(f64, Float64, 0.0, 1.0);

impl Element for i32 {
    type Storage = <ActiveBackend as VectorBackend>::I32x4;
    type Magnitude = u32;

    #[inline(always)]
    fn abs_storage(storage: Self::Storage) -> <u32 as Element>::Storage {
        storage.abs()
    }
}

impl Element for u32 {
    type Storage = <ActiveBackend as VectorBackend>::U32x4;
    type Magnitude = u32;

    #[inline(always)]
    fn abs_storage(storage: Self::Storage) -> Self::Storage {
        storage.abs()
    }
}

impl Element for f32 {
    type Storage = <ActiveBackend as VectorBackend>::F32x4;
    type Magnitude = f32;

    #[inline(always)]
    fn abs_storage(storage: Self::Storage) -> Self::Storage {
        storage.abs()
    }
}

impl Element for f64 {
    type Storage = <ActiveBackend as VectorBackend>::F64x4;
    type Magnitude = f64;

    #[inline(always)]
    fn abs_storage(storage: Self::Storage) -> Self::Storage {
        storage.abs()
    }
}

/// Lane-count marker, only instantiable for supported widths
pub struct LaneCount<const N: usize>;

/// Implemented by `LaneCount<2>`, `LaneCount<3>` and `LaneCount<4>`
pub trait SupportedLaneCount: sealed::Sealed {}

impl sealed::Sealed for LaneCount<2> {}
impl sealed::Sealed for LaneCount<3> {}
impl sealed::Sealed for LaneCount<4> {}

impl SupportedLaneCount for LaneCount<2> {}
impl SupportedLaneCount for LaneCount<3> {}
impl SupportedLaneCount for LaneCount<4> {}
