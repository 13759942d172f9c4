//! ARM NEON backend implementation (AArch64 128-bit SIMD)
//!
//! This backend uses Advanced SIMD intrinsics for 128-bit operations. Every
//! operation in the catalogue maps to one or two instructions; NEON has no
//! separate right shift by a register amount, so right shifts are left shifts
//! by the negated amount (`SSHL`/`USHL`).
//!
//! `Float64` registers are pairs of `float64x2_t`. `FMIN`/`FMAX` return NaN
//! when either lane is NaN; the other backends match this.
//!
//! # Conversions
//!
//! `FCVTNS`/`FCVTZS` saturate out-of-range values to `i32::MIN`/`i32::MAX`
//! and map NaN to 0. Double-to-int goes through 64-bit lanes and a
//! saturating narrow, so it saturates the same way.
//!
//! # Safety
//!
//! The module is only compiled when `neon` is enabled for the target, so
//! every intrinsic below is available.

use std::arch::aarch64::*;
use std::mem::transmute;

use super::{FloatStorage, IntegerStorage, LaneStorage, NegateStorage, VectorBackend};
use crate::Backend;

/// ARM NEON backend (128-bit SIMD)
pub struct NeonBackend;

/// Four `i32` lanes
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct I32x4(pub int32x4_t);

/// Four `u32` lanes
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct U32x4(pub uint32x4_t);

/// Four `f32` lanes
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct F32x4(pub float32x4_t);

/// Four `f64` lanes in two registers
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct F64x4 {
    pub lo: float64x2_t,
    pub hi: float64x2_t,
}

macro_rules! impl_common {
    ($t:ty, $vec:ty, $half:ty, $dup:ident, $dup_half:ident, $combine:ident) => {
        #[inline(always)]
        fn make(v0: $t, v1: $t, v2: $t, v3: $t) -> Self {
            // SAFETY: both types are 16 bytes of plain lane data
            Self(unsafe { transmute::<[$t; 4], $vec>([v0, v1, v2, v3]) })
        }

        #[inline(always)]
        unsafe fn load(ptr: *const $t, lanes: usize) -> Self {
            debug_assert!((2..=4).contains(&lanes));
            Self(match lanes {
                2 => $combine(ptr.cast::<$half>().read_unaligned(), $dup_half(0 as $t)),
                3 => {
                    let tail: $half = transmute::<[$t; 2], $half>([
                        ptr.add(2).read_unaligned(),
                        0 as $t,
                    ]);
                    $combine(ptr.cast::<$half>().read_unaligned(), tail)
                }
                _ => ptr.cast::<$vec>().read_unaligned(),
            })
        }

        #[inline(always)]
        fn splat(value: $t) -> Self {
            Self(unsafe { $dup(value) })
        }

        #[inline(always)]
        fn extract(self, index: usize) -> $t {
            self.to_array()[index]
        }

        #[inline(always)]
        fn insert(&mut self, index: usize, value: $t) {
            let mut lanes = self.to_array();
            lanes[index] = value;
            *self = Self::make(lanes[0], lanes[1], lanes[2], lanes[3]);
        }

        #[inline(always)]
        fn to_array(self) -> [$t; 4] {
            // SAFETY: both types are 16 bytes of plain lane data
            unsafe { transmute::<$vec, [$t; 4]>(self.0) }
        }
    };
}

macro_rules! impl_binary {
    ($($name:ident => $intrinsic:ident),* $(,)?) => {
        $(
            #[inline(always)]
            fn $name(self, rhs: Self) -> Self {
                Self(unsafe { $intrinsic(self.0, rhs.0) })
            }
        )*
    };
}

impl LaneStorage for I32x4 {
    type Element = i32;
    type Magnitude = U32x4;

    impl_common!(i32, int32x4_t, int32x2_t, vdupq_n_s32, vdup_n_s32, vcombine_s32);
    impl_binary!(
        add => vaddq_s32,
        sub => vsubq_s32,
        mul => vmulq_s32,
        min => vminq_s32,
        max => vmaxq_s32,
    );

    #[inline(always)]
    fn abs(self) -> U32x4 {
        // vabsq_s32(i32::MIN) wraps to i32::MIN, whose bits are 2^31
        U32x4(unsafe { vreinterpretq_u32_s32(vabsq_s32(self.0)) })
    }
}

impl NegateStorage for I32x4 {
    #[inline(always)]
    fn neg(self) -> Self {
        Self(unsafe { vnegq_s32(self.0) })
    }
}

impl IntegerStorage for I32x4 {
    impl_binary!(
        and => vandq_s32,
        or => vorrq_s32,
        xor => veorq_s32,
        shl_lanes => vshlq_s32,
    );

    #[inline(always)]
    fn not(self) -> Self {
        Self(unsafe { vmvnq_s32(self.0) })
    }

    #[inline(always)]
    fn and_not(self, rhs: Self) -> Self {
        // BIC computes first & !second
        Self(unsafe { vbicq_s32(rhs.0, self.0) })
    }

    #[inline(always)]
    fn shr_lanes(self, amounts: Self) -> Self {
        Self(unsafe { vshlq_s32(self.0, vnegq_s32(amounts.0)) })
    }

    #[inline(always)]
    fn shl(self, amount: u32) -> Self {
        Self(unsafe { vshlq_s32(self.0, vdupq_n_s32(amount as i32)) })
    }

    #[inline(always)]
    fn shr(self, amount: u32) -> Self {
        Self(unsafe { vshlq_s32(self.0, vdupq_n_s32((amount as i32).wrapping_neg())) })
    }
}

impl LaneStorage for U32x4 {
    type Element = u32;
    type Magnitude = U32x4;

    impl_common!(u32, uint32x4_t, uint32x2_t, vdupq_n_u32, vdup_n_u32, vcombine_u32);
    impl_binary!(
        add => vaddq_u32,
        sub => vsubq_u32,
        mul => vmulq_u32,
        min => vminq_u32,
        max => vmaxq_u32,
    );

    #[inline(always)]
    fn abs(self) -> Self {
        self
    }
}

impl IntegerStorage for U32x4 {
    impl_binary!(
        and => vandq_u32,
        or => vorrq_u32,
        xor => veorq_u32,
    );

    #[inline(always)]
    fn not(self) -> Self {
        Self(unsafe { vmvnq_u32(self.0) })
    }

    #[inline(always)]
    fn and_not(self, rhs: Self) -> Self {
        Self(unsafe { vbicq_u32(rhs.0, self.0) })
    }

    #[inline(always)]
    fn shl_lanes(self, amounts: Self) -> Self {
        Self(unsafe { vshlq_u32(self.0, vreinterpretq_s32_u32(amounts.0)) })
    }

    #[inline(always)]
    fn shr_lanes(self, amounts: Self) -> Self {
        Self(unsafe { vshlq_u32(self.0, vnegq_s32(vreinterpretq_s32_u32(amounts.0))) })
    }

    #[inline(always)]
    fn shl(self, amount: u32) -> Self {
        Self(unsafe { vshlq_u32(self.0, vdupq_n_s32(amount as i32)) })
    }

    #[inline(always)]
    fn shr(self, amount: u32) -> Self {
        Self(unsafe { vshlq_u32(self.0, vdupq_n_s32((amount as i32).wrapping_neg())) })
    }
}

impl LaneStorage for F32x4 {
    type Element = f32;
    type Magnitude = F32x4;

    impl_common!(f32, float32x4_t, float32x2_t, vdupq_n_f32, vdup_n_f32, vcombine_f32);
    impl_binary!(
        add => vaddq_f32,
        sub => vsubq_f32,
        mul => vmulq_f32,
        min => vminq_f32,
        max => vmaxq_f32,
    );

    #[inline(always)]
    fn abs(self) -> Self {
        Self(unsafe { vabsq_f32(self.0) })
    }
}

impl NegateStorage for F32x4 {
    #[inline(always)]
    fn neg(self) -> Self {
        Self(unsafe { vnegq_f32(self.0) })
    }
}

impl FloatStorage for F32x4 {
    impl_binary!(div => vdivq_f32);
}

impl F64x4 {
    #[inline(always)]
    fn each(self, rhs: Self, op: impl Fn(float64x2_t, float64x2_t) -> float64x2_t) -> Self {
        Self {
            lo: op(self.lo, rhs.lo),
            hi: op(self.hi, rhs.hi),
        }
    }

    #[inline(always)]
    fn map(self, op: impl Fn(float64x2_t) -> float64x2_t) -> Self {
        Self {
            lo: op(self.lo),
            hi: op(self.hi),
        }
    }
}

impl LaneStorage for F64x4 {
    type Element = f64;
    type Magnitude = F64x4;

    #[inline(always)]
    fn make(v0: f64, v1: f64, v2: f64, v3: f64) -> Self {
        // SAFETY: `F64x4` is two 16-byte registers laid out in order
        unsafe { transmute::<[f64; 4], Self>([v0, v1, v2, v3]) }
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f64, lanes: usize) -> Self {
        debug_assert!((2..=4).contains(&lanes));
        let lo = ptr.cast::<float64x2_t>().read_unaligned();
        let hi = match lanes {
            2 => vdupq_n_f64(0.0),
            3 => transmute::<[f64; 2], float64x2_t>([ptr.add(2).read_unaligned(), 0.0]),
            _ => ptr.add(2).cast::<float64x2_t>().read_unaligned(),
        };
        Self { lo, hi }
    }

    #[inline(always)]
    fn splat(value: f64) -> Self {
        let v = unsafe { vdupq_n_f64(value) };
        Self { lo: v, hi: v }
    }

    #[inline(always)]
    fn extract(self, index: usize) -> f64 {
        self.to_array()[index]
    }

    #[inline(always)]
    fn insert(&mut self, index: usize, value: f64) {
        let mut lanes = self.to_array();
        lanes[index] = value;
        *self = Self::make(lanes[0], lanes[1], lanes[2], lanes[3]);
    }

    #[inline(always)]
    fn to_array(self) -> [f64; 4] {
        // SAFETY: `F64x4` is two 16-byte registers laid out in order
        unsafe { transmute::<Self, [f64; 4]>(self) }
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self.each(rhs, |a, b| unsafe { vaddq_f64(a, b) })
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        self.each(rhs, |a, b| unsafe { vsubq_f64(a, b) })
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        self.each(rhs, |a, b| unsafe { vmulq_f64(a, b) })
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        self.each(rhs, |a, b| unsafe { vminq_f64(a, b) })
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        self.each(rhs, |a, b| unsafe { vmaxq_f64(a, b) })
    }

    #[inline(always)]
    fn abs(self) -> Self {
        self.map(|a| unsafe { vabsq_f64(a) })
    }
}

impl NegateStorage for F64x4 {
    #[inline(always)]
    fn neg(self) -> Self {
        self.map(|a| unsafe { vnegq_f64(a) })
    }
}

impl FloatStorage for F64x4 {
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        self.each(rhs, |a, b| unsafe { vdivq_f64(a, b) })
    }
}

impl VectorBackend for NeonBackend {
    const KIND: Backend = Backend::NEON;

    type I32x4 = I32x4;
    type U32x4 = U32x4;
    type F32x4 = F32x4;
    type F64x4 = F64x4;

    #[inline(always)]
    fn i32x4_from_f32x4(value: F32x4) -> I32x4 {
        I32x4(unsafe { vcvtnq_s32_f32(value.0) })
    }

    #[inline(always)]
    fn i32x4_from_f32x4_truncating(value: F32x4) -> I32x4 {
        I32x4(unsafe { vcvtq_s32_f32(value.0) })
    }

    #[inline(always)]
    fn i32x4_from_f64x4(value: F64x4) -> I32x4 {
        I32x4(unsafe {
            vcombine_s32(
                vqmovn_s64(vcvtnq_s64_f64(value.lo)),
                vqmovn_s64(vcvtnq_s64_f64(value.hi)),
            )
        })
    }

    #[inline(always)]
    fn i32x4_from_f64x4_truncating(value: F64x4) -> I32x4 {
        I32x4(unsafe {
            vcombine_s32(
                vqmovn_s64(vcvtq_s64_f64(value.lo)),
                vqmovn_s64(vcvtq_s64_f64(value.hi)),
            )
        })
    }

    #[inline(always)]
    fn f32x4_from_i32x4(value: I32x4) -> F32x4 {
        F32x4(unsafe { vcvtq_f32_s32(value.0) })
    }

    #[inline(always)]
    fn f32x4_from_f64x4(value: F64x4) -> F32x4 {
        F32x4(unsafe { vcvt_high_f32_f64(vcvt_f32_f64(value.lo), value.hi) })
    }

    #[inline(always)]
    fn f64x4_from_i32x4(value: I32x4) -> F64x4 {
        unsafe {
            F64x4 {
                lo: vcvtq_f64_s64(vmovl_s32(vget_low_s32(value.0))),
                hi: vcvtq_f64_s64(vmovl_high_s32(value.0)),
            }
        }
    }

    #[inline(always)]
    fn f64x4_from_f32x4(value: F32x4) -> F64x4 {
        unsafe {
            F64x4 {
                lo: vcvt_f64_f32(vget_low_f32(value.0)),
                hi: vcvt_high_f64_f32(value.0),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neon_make_lane_order() {
        let v = I32x4::make(1, 2, 3, 4);
        assert_eq!(v.to_array(), [1, 2, 3, 4]);
        assert_eq!(v.extract(3), 4);
    }

    #[test]
    fn test_neon_load_narrow() {
        let data = [1.0f32, 2.0, 3.0, 4.0];
        // SAFETY: `data` holds four elements
        let two = unsafe { F32x4::load(data.as_ptr(), 2) };
        let three = unsafe { F32x4::load(data.as_ptr(), 3) };
        assert_eq!(two.to_array(), [1.0, 2.0, 0.0, 0.0]);
        assert_eq!(three.to_array(), [1.0, 2.0, 3.0, 0.0]);

        let ints = [9i32, 8, 7, 6];
        let three = unsafe { I32x4::load(ints.as_ptr(), 3) };
        assert_eq!(three.to_array(), [9, 8, 7, 0]);
    }

    #[test]
    fn test_neon_shift_by_negated_amount() {
        let a = I32x4::make(-64, 64, 1, -1);
        let k = I32x4::make(3, 3, 0, 31);
        assert_eq!(a.shr_lanes(k).to_array(), [-8, 8, 1, -1]);
        assert_eq!(a.shl_lanes(k).to_array(), [-512, 512, 1, i32::MIN]);

        let u = U32x4::make(u32::MAX, 8, 1, 0);
        assert_eq!(u.shr(31).to_array(), [1, 0, 0, 0]);
    }

    #[test]
    fn test_neon_abs_min() {
        let a = I32x4::make(i32::MIN, -5, 5, 0);
        assert_eq!(a.abs().to_array(), [0x8000_0000, 5, 5, 0]);

        let f = F32x4::make(0.0, f32::NAN, 1.0, 2.0);
        let g = F32x4::make(f32::NAN, 0.0, f32::NAN, 3.0);
        assert_eq!(f.min(g).to_array().map(f32::is_nan), [true, true, true, false]);
        assert_eq!(f.max(g).extract(3), 3.0);
    }

    #[test]
    fn test_neon_and_not() {
        let a = U32x4::splat(0b1100);
        let b = U32x4::splat(0b1010);
        assert_eq!(a.and_not(b).to_array(), [0b0010; 4]);
    }

    #[test]
    fn test_neon_conversions_saturate() {
        let f = F32x4::make(2.7, f32::NAN, 1.0e10, -1.0e10);
        assert_eq!(NeonBackend::i32x4_from_f32x4(f).to_array(), [3, 0, i32::MAX, i32::MIN]);
        assert_eq!(
            NeonBackend::i32x4_from_f32x4_truncating(f).to_array(),
            [2, 0, i32::MAX, i32::MIN]
        );

        let d = F64x4::make(1.0e12, -2.5, 2.5, f64::NAN);
        assert_eq!(NeonBackend::i32x4_from_f64x4(d).to_array(), [i32::MAX, -2, 2, 0]);
    }
}
