//! Backend implementations for different SIMD instruction sets
//!
//! Every backend provides the same storage types and operation catalogue for
//! 4-lane registers of `i32`, `u32`, `f32` and `f64`. Narrow (2 and 3 lane)
//! vectors are built on top of these in [`crate::vector`].
//!
//! # Backends
//!
//! - `scalar`: Portable fallback on plain arrays (always compiled; it is the
//!   reference the hardware backends are tested against)
//! - `neon`: AArch64 Advanced SIMD (128-bit)
//! - `sse2`: x86/x86_64 baseline SIMD (128-bit)
//!
//! # Selection
//!
//! Exactly one backend is active per build, picked from the compile target:
//! NEON on `aarch64`, SSE2 on `x86`/`x86_64`, the scalar fallback elsewhere or
//! when the `force-scalar` feature is enabled. There is no runtime dispatch.
//!
//! # Safety
//!
//! Hardware backends are only compiled when their target feature is enabled
//! for the whole build, so the intrinsics they call are always available.
//! The only `unsafe` entry point of the catalogue is [`LaneStorage::load`],
//! which dereferences a raw pointer.

use std::fmt::Debug;

use crate::lane::Lane;
use crate::Backend;

pub mod scalar;

#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse2"))]
pub mod sse2;

#[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
pub mod neon;

/// Backend compiled for this target
#[cfg(all(
    target_arch = "aarch64",
    target_feature = "neon",
    not(feature = "force-scalar")
))]
pub type ActiveBackend = neon::NeonBackend;

/// Backend compiled for this target
#[cfg(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    target_feature = "sse2",
    not(feature = "force-scalar")
))]
pub type ActiveBackend = sse2::Sse2Backend;

/// Backend compiled for this target
#[cfg(not(any(
    all(
        target_arch = "aarch64",
        target_feature = "neon",
        not(feature = "force-scalar")
    ),
    all(
        any(target_arch = "x86", target_arch = "x86_64"),
        target_feature = "sse2",
        not(feature = "force-scalar")
    )
)))]
pub type ActiveBackend = scalar::ScalarBackend;

/// A 4-lane register of one scalar kind
///
/// Lane 0 is the least significant lane. All operations are lane-wise and
/// integer arithmetic wraps.
pub trait LaneStorage: Copy + Debug + Send + Sync + 'static {
    /// Scalar kind of each lane
    type Element: Lane;
    /// Register produced by [`LaneStorage::abs`]
    type Magnitude: LaneStorage;

    /// Register holding `[v0, v1, v2, v3]`
    fn make(
        v0: Self::Element,
        v1: Self::Element,
        v2: Self::Element,
        v3: Self::Element,
    ) -> Self;

    /// Reads `lanes` contiguous elements from `ptr`; remaining lanes are zero
    ///
    /// # Safety
    ///
    /// - `lanes` must be 2, 3 or 4
    /// - `ptr` must be valid for reads of `lanes` elements; no alignment
    ///   beyond one byte is required
    unsafe fn load(ptr: *const Self::Element, lanes: usize) -> Self;

    /// Register with every lane set to `value`
    fn splat(value: Self::Element) -> Self;

    /// Register with every lane zero
    #[inline(always)]
    fn zero() -> Self {
        Self::splat(<Self::Element as Lane>::ZERO)
    }

    /// Lane `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= 4`
    fn extract(self, index: usize) -> Self::Element;

    /// Overwrites lane `index`, leaving the others untouched
    ///
    /// # Panics
    ///
    /// Panics if `index >= 4`
    fn insert(&mut self, index: usize, value: Self::Element);

    /// All four lanes, lane 0 first
    fn to_array(self) -> [Self::Element; 4];

    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
    fn min(self, rhs: Self) -> Self;
    fn max(self, rhs: Self) -> Self;

    /// Lane-wise magnitude
    ///
    /// Identity for unsigned kinds. Signed integers produce the unsigned bit
    /// pattern of the absolute value, so `i32::MIN` maps to `2^31`.
    fn abs(self) -> Self::Magnitude;
}

/// Lane-wise negation (signed and floating-point kinds)
pub trait NegateStorage: LaneStorage {
    /// Integer negation wraps; float negation flips the sign bit
    fn neg(self) -> Self;
}

/// Bitwise and shift operations (integer kinds)
///
/// Shift amounts outside `0..32` are outside the contract; see each backend
/// for what it produces.
pub trait IntegerStorage: LaneStorage {
    fn not(self) -> Self;
    fn and(self, rhs: Self) -> Self;

    /// `!self & rhs`
    #[inline(always)]
    fn and_not(self, rhs: Self) -> Self {
        self.not().and(rhs)
    }

    fn or(self, rhs: Self) -> Self;
    fn xor(self, rhs: Self) -> Self;

    /// `self[i] << amounts[i]`
    fn shl_lanes(self, amounts: Self) -> Self;

    /// `self[i] >> amounts[i]`, arithmetic for signed kinds, logical otherwise
    fn shr_lanes(self, amounts: Self) -> Self;

    /// Every lane shifted left by `amount`
    fn shl(self, amount: u32) -> Self;

    /// Every lane shifted right by `amount`
    fn shr(self, amount: u32) -> Self;
}

/// Division (floating-point kinds)
pub trait FloatStorage: NegateStorage {
    /// IEEE-754 division; zero divisors produce infinities or NaN
    fn div(self, rhs: Self) -> Self;
}

/// Backend trait tying the storage types of one instruction set together
///
/// All backend implementations must implement this trait to ensure
/// consistent behavior across different SIMD instruction sets. Conversions
/// live here because they cross storage types.
///
/// Rounding conversions round to nearest, ties to even. Truncating
/// conversions round toward zero. Results for NaN and out-of-range inputs are
/// backend-defined and documented on each implementation.
pub trait VectorBackend {
    /// Enum tag of this backend
    const KIND: Backend;

    type I32x4: LaneStorage<Element = i32, Magnitude = Self::U32x4>
        + NegateStorage
        + IntegerStorage;
    type U32x4: LaneStorage<Element = u32, Magnitude = Self::U32x4> + IntegerStorage;
    type F32x4: LaneStorage<Element = f32, Magnitude = Self::F32x4> + FloatStorage;
    type F64x4: LaneStorage<Element = f64, Magnitude = Self::F64x4> + FloatStorage;

    fn i32x4_from_f32x4(value: Self::F32x4) -> Self::I32x4;
    fn i32x4_from_f32x4_truncating(value: Self::F32x4) -> Self::I32x4;
    fn i32x4_from_f64x4(value: Self::F64x4) -> Self::I32x4;
    fn i32x4_from_f64x4_truncating(value: Self::F64x4) -> Self::I32x4;

    fn f32x4_from_i32x4(value: Self::I32x4) -> Self::F32x4;

    /// Converts toward zero
    ///
    /// Integers above 2^24 in magnitude may not fit; the default steps the
    /// rounded result one ulp toward zero where rounding moved away from it.
    fn f32x4_from_i32x4_truncating(value: Self::I32x4) -> Self::F32x4 {
        let source = value.to_array();
        let nearest = Self::f32x4_from_i32x4(value).to_array();
        let lane = |i: usize| crate::convert::i32_to_f32_toward_zero(source[i], nearest[i]);
        Self::F32x4::make(lane(0), lane(1), lane(2), lane(3))
    }

    fn f32x4_from_f64x4(value: Self::F64x4) -> Self::F32x4;

    /// Narrows toward zero
    ///
    /// Neither instruction set has a truncating double-to-single conversion,
    /// so the default corrects the rounded result one ulp toward zero where
    /// rounding moved away from it.
    fn f32x4_from_f64x4_truncating(value: Self::F64x4) -> Self::F32x4 {
        let source = value.to_array();
        let nearest = Self::f32x4_from_f64x4(value).to_array();
        let lane = |i: usize| crate::convert::f64_to_f32_toward_zero(source[i], nearest[i]);
        Self::F32x4::make(lane(0), lane(1), lane(2), lane(3))
    }

    fn f64x4_from_i32x4(value: Self::I32x4) -> Self::F64x4;
    fn f64x4_from_f32x4(value: Self::F32x4) -> Self::F64x4;
}
