//! Scalar (non-SIMD) backend implementation
//!
//! This is the portable fallback that works on all platforms. Each register
//! is a 16-byte aligned array of four lanes, processed with plain loops the
//! compiler is free to auto-vectorize.
//!
//! # Semantics
//!
//! The scalar backend is the reference the hardware backends are tested
//! against. Where hardware differs on inputs outside the contract, it follows
//! NEON:
//!
//! - float to integer conversions saturate and map NaN to 0
//! - per-lane shifts treat the amount as signed; a negative left shift is a
//!   right shift, and amounts of 32 or more shift every bit out
//! - float `min`/`max` produce NaN in any lane where either operand is NaN

use super::{FloatStorage, IntegerStorage, LaneStorage, NegateStorage, VectorBackend};
use crate::convert::{f64_to_f32_toward_zero, i32_to_f32_toward_zero};
use crate::lane::Lane;
use crate::Backend;

/// Scalar backend (portable, no SIMD)
pub struct ScalarBackend;

/// Four lanes of `T`, aligned like a 128-bit register
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C, align(16))]
pub struct ScalarLanes<T>(pub [T; 4]);

impl<T: Copy> ScalarLanes<T> {
    #[inline(always)]
    fn map<U>(self, f: impl Fn(T) -> U) -> ScalarLanes<U> {
        ScalarLanes(self.0.map(f))
    }

    #[inline(always)]
    fn zip(self, rhs: Self, f: impl Fn(T, T) -> T) -> Self {
        ScalarLanes(std::array::from_fn(|i| f(self.0[i], rhs.0[i])))
    }
}

/// Left shift by a signed amount, right shift (arithmetic) when negative
#[inline(always)]
fn shift_i32(value: i32, amount: i32) -> i32 {
    if amount >= 0 {
        value.checked_shl(amount as u32).unwrap_or(0)
    } else {
        value >> amount.unsigned_abs().min(31)
    }
}

/// Shift amount as NEON reads it, the lane's bits as a signed count
trait SignedAmount: Copy {
    fn signed_amount(self) -> i32;
}

impl SignedAmount for i32 {
    #[inline(always)]
    fn signed_amount(self) -> i32 {
        self
    }
}

impl SignedAmount for u32 {
    #[inline(always)]
    fn signed_amount(self) -> i32 {
        i32::from_ne_bytes(self.to_ne_bytes())
    }
}

/// Left shift by a signed amount, right shift (logical) when negative
#[inline(always)]
fn shift_u32(value: u32, amount: i32) -> u32 {
    if amount >= 0 {
        value.checked_shl(amount as u32).unwrap_or(0)
    } else {
        value.checked_shr(amount.unsigned_abs()).unwrap_or(0)
    }
}

macro_rules! impl_common {
    ($t:ty) => {
        #[inline(always)]
        fn make(v0: $t, v1: $t, v2: $t, v3: $t) -> Self {
            ScalarLanes([v0, v1, v2, v3])
        }

        #[inline(always)]
        unsafe fn load(ptr: *const $t, lanes: usize) -> Self {
            debug_assert!((2..=4).contains(&lanes));
            let mut values = [<$t as Lane>::ZERO; 4];
            for (i, value) in values.iter_mut().enumerate().take(lanes) {
                // SAFETY: caller guarantees `lanes` readable elements at `ptr`
                *value = unsafe { ptr.add(i).read_unaligned() };
            }
            ScalarLanes(values)
        }

        #[inline(always)]
        fn splat(value: $t) -> Self {
            ScalarLanes([value; 4])
        }

        #[inline(always)]
        fn extract(self, index: usize) -> $t {
            self.0[index]
        }

        #[inline(always)]
        fn insert(&mut self, index: usize, value: $t) {
            self.0[index] = value;
        }

        #[inline(always)]
        fn to_array(self) -> [$t; 4] {
            self.0
        }
    };
}

macro_rules! impl_integer_lanes {
    ($t:ty, magnitude = $m:ty, abs = $abs:expr, shift = $shift:ident) => {
        impl LaneStorage for ScalarLanes<$t> {
            type Element = $t;
            type Magnitude = ScalarLanes<$m>;

            impl_common!($t);

            #[inline(always)]
            fn add(self, rhs: Self) -> Self {
                self.zip(rhs, <$t>::wrapping_add)
            }

            #[inline(always)]
            fn sub(self, rhs: Self) -> Self {
                self.zip(rhs, <$t>::wrapping_sub)
            }

            #[inline(always)]
            fn mul(self, rhs: Self) -> Self {
                self.zip(rhs, <$t>::wrapping_mul)
            }

            #[inline(always)]
            fn min(self, rhs: Self) -> Self {
                self.zip(rhs, Ord::min)
            }

            #[inline(always)]
            fn max(self, rhs: Self) -> Self {
                self.zip(rhs, Ord::max)
            }

            #[inline(always)]
            fn abs(self) -> ScalarLanes<$m> {
                self.map($abs)
            }
        }

        impl IntegerStorage for ScalarLanes<$t> {
            #[inline(always)]
            fn not(self) -> Self {
                self.map(|x| !x)
            }

            #[inline(always)]
            fn and(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| a & b)
            }

            #[inline(always)]
            fn or(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| a | b)
            }

            #[inline(always)]
            fn xor(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| a ^ b)
            }

            #[inline(always)]
            fn shl_lanes(self, amounts: Self) -> Self {
                self.zip(amounts, |value, amount| $shift(value, amount.signed_amount()))
            }

            #[inline(always)]
            fn shr_lanes(self, amounts: Self) -> Self {
                self.zip(amounts, |value, amount| {
                    $shift(value, amount.signed_amount().wrapping_neg())
                })
            }

            #[inline(always)]
            fn shl(self, amount: u32) -> Self {
                self.map(|value| $shift(value, amount.signed_amount()))
            }

            #[inline(always)]
            fn shr(self, amount: u32) -> Self {
                self.map(|value| $shift(value, amount.signed_amount().wrapping_neg()))
            }
        }
    };
}

impl_integer_lanes!(i32, magnitude = u32, abs = i32::unsigned_abs, shift = shift_i32);
impl_integer_lanes!(u32, magnitude = u32, abs = |x: u32| x, shift = shift_u32);

impl NegateStorage for ScalarLanes<i32> {
    #[inline(always)]
    fn neg(self) -> Self {
        self.map(i32::wrapping_neg)
    }
}

macro_rules! impl_float_lanes {
    ($t:ty) => {
        impl LaneStorage for ScalarLanes<$t> {
            type Element = $t;
            type Magnitude = Self;

            impl_common!($t);

            #[inline(always)]
            fn add(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| a + b)
            }

            #[inline(always)]
            fn sub(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| a - b)
            }

            #[inline(always)]
            fn mul(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| a * b)
            }

            #[inline(always)]
            fn min(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| if a.is_nan() || b.is_nan() { <$t>::NAN } else { a.min(b) })
            }

            #[inline(always)]
            fn max(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| if a.is_nan() || b.is_nan() { <$t>::NAN } else { a.max(b) })
            }

            #[inline(always)]
            fn abs(self) -> Self {
                self.map(<$t>::abs)
            }
        }

        impl NegateStorage for ScalarLanes<$t> {
            #[inline(always)]
            fn neg(self) -> Self {
                self.map(|x| -x)
            }
        }

        impl FloatStorage for ScalarLanes<$t> {
            #[inline(always)]
            fn div(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| a / b)
            }
        }
    };
}

impl_float_lanes!(f32);
impl_float_lanes!(f64);

/// Conversions use Rust's `as` casts, which saturate and map NaN to 0.
impl VectorBackend for ScalarBackend {
    const KIND: Backend = Backend::Scalar;

    type I32x4 = ScalarLanes<i32>;
    type U32x4 = ScalarLanes<u32>;
    type F32x4 = ScalarLanes<f32>;
    type F64x4 = ScalarLanes<f64>;

    #[inline(always)]
    fn i32x4_from_f32x4(value: Self::F32x4) -> Self::I32x4 {
        value.map(|x| x.round_ties_even() as i32)
    }

    #[inline(always)]
    fn i32x4_from_f32x4_truncating(value: Self::F32x4) -> Self::I32x4 {
        value.map(|x| x as i32)
    }

    #[inline(always)]
    fn i32x4_from_f64x4(value: Self::F64x4) -> Self::I32x4 {
        value.map(|x| x.round_ties_even() as i32)
    }

    #[inline(always)]
    fn i32x4_from_f64x4_truncating(value: Self::F64x4) -> Self::I32x4 {
        value.map(|x| x as i32)
    }

    #[inline(always)]
    fn f32x4_from_i32x4(value: Self::I32x4) -> Self::F32x4 {
        value.map(|x| x as f32)
    }

    #[inline(always)]
    fn f32x4_from_i32x4_truncating(value: Self::I32x4) -> Self::F32x4 {
        value.map(|x| i32_to_f32_toward_zero(x, x as f32))
    }

    #[inline(always)]
    fn f32x4_from_f64x4(value: Self::F64x4) -> Self::F32x4 {
        value.map(|x| x as f32)
    }

    #[inline(always)]
    fn f32x4_from_f64x4_truncating(value: Self::F64x4) -> Self::F32x4 {
        value.map(|x| f64_to_f32_toward_zero(x, x as f32))
    }

    #[inline(always)]
    fn f64x4_from_i32x4(value: Self::I32x4) -> Self::F64x4 {
        value.map(f64::from)
    }

    #[inline(always)]
    fn f64x4_from_f32x4(value: Self::F32x4) -> Self::F64x4 {
        value.map(f64::from)
    }
}
