//! Conversions between lane kinds
//!
//! Rounding conversions round to nearest, ties to even; `_allow_truncating`
//! variants round toward zero. Conversions keep the lane count, and padding
//! lanes convert from zero to zero.
//!
//! # NaN and out-of-range lanes
//!
//! Float-to-`Int32` results for NaN or values outside the `i32` range depend
//! on the backend:
//!
//! | backend | NaN | too large | too small |
//! |---|---|---|---|
//! | NEON, scalar | `0` | `i32::MAX` | `i32::MIN` |
//! | SSE2 | `i32::MIN` | `i32::MIN` | `i32::MIN` |
//!
//! Every backend agrees on in-range lanes. The checked integer conversions
//! (`try_from_int32`, `try_from_uint32`) never depend on the backend.

use crate::backends::{ActiveBackend, VectorBackend};
use crate::lane::{LaneCount, SupportedLaneCount};
use crate::vector::Vector;
use crate::{Result, SimdError};

/// Rounds `value` to `f32` toward zero, given its round-to-nearest narrowing
///
/// Steps `nearest` one ulp toward zero when rounding increased the magnitude.
/// Finite values beyond the `f32` range become `±f32::MAX`; NaN and infinities
/// pass through.
pub(crate) fn f64_to_f32_toward_zero(value: f64, nearest: f32) -> f32 {
    if value.is_nan() || value.is_infinite() {
        return nearest;
    }
    if nearest.is_infinite() {
        return f32::MAX.copysign(nearest);
    }
    if f64::from(nearest).abs() > value.abs() {
        // |nearest| > |value| >= 0, so the magnitude bits are non-zero
        return f32::from_bits(nearest.to_bits() - 1);
    }
    nearest
}

/// Rounds `value` to `f32` toward zero, given its round-to-nearest conversion
pub(crate) fn i32_to_f32_toward_zero(value: i32, nearest: f32) -> f32 {
    if f64::from(nearest).abs() > f64::from(value).abs() {
        // |nearest| > |value| >= 0
        return f32::from_bits(nearest.to_bits() - 1);
    }
    nearest
}

impl<const N: usize> Vector<i32, N>
where
    LaneCount<N>: SupportedLaneCount,
{
    /// Rounds each `Float32` lane to the nearest integer, ties to even
    ///
    /// # Examples
    ///
    /// ```
    /// use simdx::{Float32x3, Int32x3};
    ///
    /// let v = Int32x3::from_float32(Float32x3::new(2.7, -1.5, 0.5));
    /// assert_eq!(v.to_array(), [3, -2, 0]);
    /// ```
    #[inline(always)]
    pub fn from_float32(value: Vector<f32, N>) -> Self {
        Self::from_raw(ActiveBackend::i32x4_from_f32x4(value.storage()))
    }

    /// Truncates each `Float32` lane toward zero
    #[inline(always)]
    pub fn from_float32_allow_truncating(value: Vector<f32, N>) -> Self {
        Self::from_raw(ActiveBackend::i32x4_from_f32x4_truncating(value.storage()))
    }

    /// Rounds each `Float64` lane to the nearest integer, ties to even
    #[inline(always)]
    pub fn from_float64(value: Vector<f64, N>) -> Self {
        Self::from_raw(ActiveBackend::i32x4_from_f64x4(value.storage()))
    }

    /// Truncates each `Float64` lane toward zero
    #[inline(always)]
    pub fn from_float64_allow_truncating(value: Vector<f64, N>) -> Self {
        Self::from_raw(ActiveBackend::i32x4_from_f64x4_truncating(value.storage()))
    }

    /// Reinterprets `UInt32` lanes that fit in `i32`
    ///
    /// # Errors
    ///
    /// Returns [`SimdError::NotRepresentable`] naming the first lane above
    /// `i32::MAX`.
    pub fn try_from_uint32(value: Vector<u32, N>) -> Result<Self> {
        let lanes = value.to_array();
        let mut out = [0i32; N];
        for (lane, (dst, src)) in out.iter_mut().zip(lanes).enumerate() {
            *dst = i32::try_from(src).map_err(|_| SimdError::NotRepresentable { lane })?;
        }
        Ok(Self::from_array(out))
    }
}

impl<const N: usize> Vector<u32, N>
where
    LaneCount<N>: SupportedLaneCount,
{
    /// Reinterprets non-negative `Int32` lanes
    ///
    /// # Errors
    ///
    /// Returns [`SimdError::NotRepresentable`] naming the first negative lane.
    ///
    /// # Examples
    ///
    /// ```
    /// use simdx::{Int32x2, SimdError, UInt32x2};
    ///
    /// assert_eq!(UInt32x2::try_from_int32(Int32x2::new(1, 2))?.to_array(), [1, 2]);
    /// assert_eq!(
    ///     UInt32x2::try_from_int32(Int32x2::new(1, -2)),
    ///     Err(SimdError::NotRepresentable { lane: 1 })
    /// );
    /// # Ok::<(), SimdError>(())
    /// ```
    pub fn try_from_int32(value: Vector<i32, N>) -> Result<Self> {
        let lanes = value.to_array();
        let mut out = [0u32; N];
        for (lane, (dst, src)) in out.iter_mut().zip(lanes).enumerate() {
            *dst = u32::try_from(src).map_err(|_| SimdError::NotRepresentable { lane })?;
        }
        Ok(Self::from_array(out))
    }
}

impl<const N: usize> Vector<f32, N>
where
    LaneCount<N>: SupportedLaneCount,
{
    /// Converts each `Int32` lane, rounding to nearest above 2^24
    #[inline(always)]
    pub fn from_int32(value: Vector<i32, N>) -> Self {
        Self::from_raw(ActiveBackend::f32x4_from_i32x4(value.storage()))
    }

    /// Converts each `Int32` lane toward zero
    ///
    /// # Examples
    ///
    /// ```
    /// use simdx::{Float32x2, Int32x2};
    ///
    /// let i = Int32x2::new(16_777_219, -16_777_219);
    /// assert_eq!(Float32x2::from_int32(i).to_array(), [16_777_220.0, -16_777_220.0]);
    /// assert_eq!(
    ///     Float32x2::from_int32_allow_truncating(i).to_array(),
    ///     [16_777_218.0, -16_777_218.0]
    /// );
    /// ```
    #[inline(always)]
    pub fn from_int32_allow_truncating(value: Vector<i32, N>) -> Self {
        Self::from_raw(ActiveBackend::f32x4_from_i32x4_truncating(value.storage()))
    }

    /// Narrows each `Float64` lane, rounding to nearest
    #[inline(always)]
    pub fn from_float64(value: Vector<f64, N>) -> Self {
        Self::from_raw(ActiveBackend::f32x4_from_f64x4(value.storage()))
    }

    /// Narrows each `Float64` lane toward zero
    #[inline(always)]
    pub fn from_float64_allow_truncating(value: Vector<f64, N>) -> Self {
        Self::from_raw(ActiveBackend::f32x4_from_f64x4_truncating(value.storage()))
    }
}

impl<const N: usize> Vector<f64, N>
where
    LaneCount<N>: SupportedLaneCount,
{
    /// Widens each `Int32` lane exactly
    #[inline(always)]
    pub fn from_int32(value: Vector<i32, N>) -> Self {
        Self::from_raw(ActiveBackend::f64x4_from_i32x4(value.storage()))
    }

    /// Widens each `Float32` lane exactly
    #[inline(always)]
    pub fn from_float32(value: Vector<f32, N>) -> Self {
        Self::from_raw(ActiveBackend::f64x4_from_f32x4(value.storage()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::LaneStorage;
    use crate::vector::{
        Float32x2, Float32x3, Float32x4, Float64x2, Float64x3, Float64x4, Int32x2, Int32x3,
        Int32x4, UInt32x3,
    };
    use crate::Backend;
    use proptest::prelude::*;

    #[test]
    fn test_float32_to_int32_rounding_and_truncation() {
        let f = Float32x4::new(2.7, -2.7, 2.5, 3.5);
        assert_eq!(Int32x4::from_float32(f).to_array(), [3, -3, 2, 4]);
        assert_eq!(
            Int32x4::from_float32_allow_truncating(f).to_array(),
            [2, -2, 2, 3]
        );
    }

    #[test]
    fn test_float64_to_int32() {
        let d = Float64x3::new(2.7, -0.5, 1.0e9);
        assert_eq!(Int32x3::from_float64(d).to_array(), [3, 0, 1_000_000_000]);
        assert_eq!(
            Int32x3::from_float64_allow_truncating(d).to_array(),
            [2, 0, 1_000_000_000]
        );
    }

    #[test]
    fn test_out_of_range_per_backend() {
        let f = Float32x2::new(f32::NAN, 1.0e10);
        let r = Int32x2::from_float32(f).to_array();
        match Backend::ACTIVE {
            Backend::SSE2 => assert_eq!(r, [i32::MIN, i32::MIN]),
            Backend::NEON | Backend::Scalar => assert_eq!(r, [0, i32::MAX]),
        }
    }

    #[test]
    fn test_int32_to_floats() {
        let i = Int32x3::new(-1, 0, 16_777_217);
        assert_eq!(Float32x3::from_int32(i).to_array(), [-1.0, 0.0, 16_777_216.0]);
        assert_eq!(Float64x3::from_int32(i).to_array(), [-1.0, 0.0, 16_777_217.0]);
    }

    #[test]
    fn test_int32_to_float32_truncating() {
        let i = Int32x4::new(16_777_219, -16_777_219, 16_777_217, i32::MAX);
        assert_eq!(
            Float32x4::from_int32(i).to_array(),
            [16_777_220.0, -16_777_220.0, 16_777_216.0, 2_147_483_648.0]
        );
        assert_eq!(
            Float32x4::from_int32_allow_truncating(i).to_array(),
            [16_777_218.0, -16_777_218.0, 16_777_216.0, 2_147_483_520.0]
        );

        let exact = Int32x3::new(0, -7, i32::MIN);
        assert_eq!(
            Float32x3::from_int32_allow_truncating(exact),
            Float32x3::from_int32(exact)
        );
        assert_eq!(i32_to_f32_toward_zero(0, 0.0), 0.0);
    }

    #[test]
    fn test_float_width_conversions() {
        let d = Float64x2::new(0.1, -0.1);
        let nearest = Float32x2::from_float64(d);
        assert_eq!(nearest.to_array(), [0.1f32, -0.1f32]);

        // 0.1f32 rounds up from 0.1f64, so truncation lands one ulp lower
        let truncated = Float32x2::from_float64_allow_truncating(d).to_array();
        assert!(f64::from(truncated[0]) < 0.1);
        assert_eq!(truncated[0], f32::from_bits(0.1f32.to_bits() - 1));
        assert_eq!(truncated[1], -truncated[0]);

        let widened = Float64x4::from_float32(Float32x4::new(0.5, -1.25, 3.0, 1.0e-3));
        assert_eq!(widened.element(3), f64::from(1.0e-3f32));
    }

    #[test]
    fn test_toward_zero_edges() {
        assert_eq!(f64_to_f32_toward_zero(1.0e300, f32::INFINITY), f32::MAX);
        assert_eq!(f64_to_f32_toward_zero(-1.0e300, f32::NEG_INFINITY), -f32::MAX);
        assert_eq!(f64_to_f32_toward_zero(f64::INFINITY, f32::INFINITY), f32::INFINITY);
        assert!(f64_to_f32_toward_zero(f64::NAN, f32::NAN).is_nan());
        assert_eq!(f64_to_f32_toward_zero(0.5, 0.5), 0.5);
        assert_eq!(f64_to_f32_toward_zero(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_checked_integer_conversions() {
        let u = UInt32x3::new(1, u32::MAX, 2);
        assert_eq!(
            Int32x3::try_from_uint32(u),
            Err(SimdError::NotRepresentable { lane: 1 })
        );
        let ok = Int32x3::try_from_uint32(UInt32x3::new(0, 7, i32::MAX as u32)).unwrap();
        assert_eq!(ok.to_array(), [0, 7, i32::MAX]);
        assert_eq!(
            UInt32x3::try_from_int32(Int32x3::new(-1, 0, 0)),
            Err(SimdError::NotRepresentable { lane: 0 })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_truncation_never_grows(d in prop::array::uniform3(-1.0e38f64..1.0e38)) {
            let v = Float32x3::from_float64_allow_truncating(Float64x3::from_array(d));
            for (t, x) in v.to_array().into_iter().zip(d) {
                prop_assert!(f64::from(t).abs() <= x.abs());
                prop_assert!(t == 0.0 || t.signum() as f64 == x.signum());
            }
        }

        #[test]
        fn test_int32_to_float32_truncation_never_grows(a in any::<[i32; 3]>()) {
            let v = Float32x3::from_int32_allow_truncating(Int32x3::from_array(a));
            let nearest = Float32x3::from_int32(Int32x3::from_array(a));
            for ((t, n), x) in v.to_array().into_iter().zip(nearest.to_array()).zip(a) {
                prop_assert!(f64::from(t).abs() <= f64::from(x).abs());
                prop_assert!(f64::from(x).abs() - f64::from(t).abs() <= f64::from(n).abs() * f64::from(f32::EPSILON));
                prop_assert!(t == 0.0 || (t > 0.0) == (x > 0));
            }
        }

        #[test]
        fn test_int32_round_trips_through_float64(a in any::<[i32; 4]>()) {
            let v = Int32x4::from_array(a);
            prop_assert_eq!(Int32x4::from_float64(Float64x4::from_int32(v)), v);
            prop_assert_eq!(Int32x4::from_float64_allow_truncating(Float64x4::from_int32(v)), v);
        }

        #[test]
        fn test_float32_rounding_matches_std(f in prop::array::uniform2(-1.0e9f32..1.0e9)) {
            let v = Float32x2::from_array(f);
            prop_assert_eq!(Int32x2::from_float32(v).to_array(), f.map(|x| x.round_ties_even() as i32));
            prop_assert_eq!(Int32x2::from_float32_allow_truncating(v).to_array(), f.map(|x| x as i32));
        }

        #[test]
        fn test_conversion_keeps_padding_zero(d in prop::array::uniform2(-1.0e6f64..1.0e6)) {
            let v = Int32x2::from_float64(Float64x2::from_array(d));
            prop_assert_eq!(&v.storage().to_array()[2..], &[0, 0]);
            let w = Float32x2::from_float64(Float64x2::from_array(d));
            prop_assert_eq!(&w.storage().to_array()[2..], &[0.0, 0.0]);
        }
    }
}
