//! SSE2 backend implementation (x86/x86_64 baseline SIMD)
//!
//! This backend uses SSE2 intrinsics for 128-bit SIMD operations.
//! SSE2 is available on all x86_64 CPUs as a baseline requirement.
//!
//! Operations SSE2 lacks are emulated with baseline instructions unless a
//! newer target feature is enabled for the build:
//!
//! - 32-bit multiply and integer min/max: `sse4.1`
//! - integer absolute value: `ssse3`
//! - per-lane shifts: `avx2`
//!
//! `Float64` registers are pairs of `__m128d`. Float `min`/`max` yield NaN
//! when either lane is NaN, as on NEON.
//!
//! # Conversions
//!
//! Rounding conversions follow MXCSR, which is round-to-nearest-even unless
//! the caller changed it. Out-of-range and NaN lanes become `i32::MIN`
//! (the "integer indefinite" value), unlike NEON and the scalar fallback,
//! which saturate.
//!
//! # Safety
//!
//! The module is only compiled when `sse2` is enabled for the target, so
//! every intrinsic below is available.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use std::mem::transmute;

use super::{FloatStorage, IntegerStorage, LaneStorage, NegateStorage, VectorBackend};
use crate::Backend;

/// SSE2 backend (128-bit SIMD for x86/x86_64)
pub struct Sse2Backend;

/// Four `i32` lanes
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct I32x4(pub __m128i);

/// Four `u32` lanes
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct U32x4(pub __m128i);

/// Four `f32` lanes
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct F32x4(pub __m128);

/// Four `f64` lanes in two registers
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct F64x4 {
    pub lo: __m128d,
    pub hi: __m128d,
}

#[inline(always)]
fn epi32_lanes(v: __m128i) -> [i32; 4] {
    // SAFETY: both types are 16 bytes of plain integer data
    unsafe { transmute(v) }
}

#[inline(always)]
fn epi32_from_lanes(lanes: [i32; 4]) -> __m128i {
    // SAFETY: both types are 16 bytes of plain integer data
    unsafe { transmute(lanes) }
}

/// Reads 2, 3 or 4 unaligned 32-bit values, zeroing the rest
#[inline(always)]
unsafe fn load_epi32(ptr: *const i32, lanes: usize) -> __m128i {
    debug_assert!((2..=4).contains(&lanes));
    match lanes {
        2 => _mm_loadl_epi64(ptr.cast()),
        3 => _mm_unpacklo_epi64(
            _mm_loadl_epi64(ptr.cast()),
            _mm_cvtsi32_si128(ptr.add(2).read_unaligned()),
        ),
        _ => _mm_loadu_si128(ptr.cast()),
    }
}

/// `(mask & if_true) | (!mask & if_false)`
#[cfg(not(target_feature = "sse4.1"))]
#[inline(always)]
fn select(mask: __m128i, if_true: __m128i, if_false: __m128i) -> __m128i {
    unsafe { _mm_or_si128(_mm_and_si128(mask, if_true), _mm_andnot_si128(mask, if_false)) }
}

#[inline(always)]
fn mul_epi32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(target_feature = "sse4.1")]
    return unsafe { _mm_mullo_epi32(a, b) };
    #[cfg(not(target_feature = "sse4.1"))]
    return unsafe {
        // Products of lanes 0/2 and 1/3, low halves interleaved back
        let even = _mm_mul_epu32(a, b);
        let odd = _mm_mul_epu32(_mm_srli_epi64(a, 32), _mm_srli_epi64(b, 32));
        _mm_unpacklo_epi32(
            _mm_shuffle_epi32(even, 0b00_00_10_00),
            _mm_shuffle_epi32(odd, 0b00_00_10_00),
        )
    };
}

/// `a > b` per lane, unsigned
#[cfg(not(target_feature = "sse4.1"))]
#[inline(always)]
fn cmpgt_epu32(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let bias = _mm_set1_epi32(i32::MIN);
        _mm_cmpgt_epi32(_mm_xor_si128(a, bias), _mm_xor_si128(b, bias))
    }
}

/// Shifts lane `i` of `value` by lane `i` of `amounts` using a uniform-count
/// shift four times and gathering the diagonal.
#[cfg(not(target_feature = "avx2"))]
#[inline(always)]
fn shift_each_lane(
    value: __m128i,
    amounts: __m128i,
    shift: impl Fn(__m128i, __m128i) -> __m128i,
) -> __m128i {
    let counts = epi32_lanes(amounts);
    unsafe {
        let r0 = shift(value, _mm_cvtsi32_si128(counts[0]));
        let r1 = shift(value, _mm_cvtsi32_si128(counts[1]));
        let r2 = shift(value, _mm_cvtsi32_si128(counts[2]));
        let r3 = shift(value, _mm_cvtsi32_si128(counts[3]));
        // [r0.0, r1.0, r0.1, r1.1] and [r2.2, r3.2, r2.3, r3.3]
        let low = _mm_unpacklo_epi32(r0, r1);
        let high = _mm_unpackhi_epi32(r2, r3);
        _mm_castps_si128(_mm_shuffle_ps(
            _mm_castsi128_ps(low),
            _mm_castsi128_ps(high),
            0b11_00_11_00,
        ))
    }
}

macro_rules! impl_epi32_common {
    ($t:ty) => {
        #[inline(always)]
        fn make(v0: $t, v1: $t, v2: $t, v3: $t) -> Self {
            Self(unsafe { _mm_setr_epi32(v0 as i32, v1 as i32, v2 as i32, v3 as i32) })
        }

        #[inline(always)]
        unsafe fn load(ptr: *const $t, lanes: usize) -> Self {
            Self(load_epi32(ptr.cast(), lanes))
        }

        #[inline(always)]
        fn splat(value: $t) -> Self {
            Self(unsafe { _mm_set1_epi32(value as i32) })
        }

        #[inline(always)]
        fn zero() -> Self {
            Self(unsafe { _mm_setzero_si128() })
        }

        #[inline(always)]
        fn extract(self, index: usize) -> $t {
            epi32_lanes(self.0)[index] as $t
        }

        #[inline(always)]
        fn insert(&mut self, index: usize, value: $t) {
            let mut lanes = epi32_lanes(self.0);
            lanes[index] = value as i32;
            self.0 = epi32_from_lanes(lanes);
        }

        #[inline(always)]
        fn to_array(self) -> [$t; 4] {
            epi32_lanes(self.0).map(|x| x as $t)
        }

        #[inline(always)]
        fn add(self, rhs: Self) -> Self {
            Self(unsafe { _mm_add_epi32(self.0, rhs.0) })
        }

        #[inline(always)]
        fn sub(self, rhs: Self) -> Self {
            Self(unsafe { _mm_sub_epi32(self.0, rhs.0) })
        }

        #[inline(always)]
        fn mul(self, rhs: Self) -> Self {
            Self(mul_epi32(self.0, rhs.0))
        }
    };
}

macro_rules! impl_epi32_bitwise {
    () => {
        #[inline(always)]
        fn not(self) -> Self {
            Self(unsafe { _mm_xor_si128(self.0, _mm_set1_epi32(-1)) })
        }

        #[inline(always)]
        fn and(self, rhs: Self) -> Self {
            Self(unsafe { _mm_and_si128(self.0, rhs.0) })
        }

        #[inline(always)]
        fn and_not(self, rhs: Self) -> Self {
            Self(unsafe { _mm_andnot_si128(self.0, rhs.0) })
        }

        #[inline(always)]
        fn or(self, rhs: Self) -> Self {
            Self(unsafe { _mm_or_si128(self.0, rhs.0) })
        }

        #[inline(always)]
        fn xor(self, rhs: Self) -> Self {
            Self(unsafe { _mm_xor_si128(self.0, rhs.0) })
        }

        #[inline(always)]
        fn shl_lanes(self, amounts: Self) -> Self {
            #[cfg(target_feature = "avx2")]
            return Self(unsafe { _mm_sllv_epi32(self.0, amounts.0) });
            #[cfg(not(target_feature = "avx2"))]
            return Self(shift_each_lane(self.0, amounts.0, |v, c| unsafe {
                _mm_sll_epi32(v, c)
            }));
        }

        #[inline(always)]
        fn shl(self, amount: u32) -> Self {
            Self(unsafe { _mm_sll_epi32(self.0, _mm_cvtsi32_si128(amount as i32)) })
        }
    };
}

impl LaneStorage for I32x4 {
    type Element = i32;
    type Magnitude = U32x4;

    impl_epi32_common!(i32);

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        #[cfg(target_feature = "sse4.1")]
        return Self(unsafe { _mm_min_epi32(self.0, rhs.0) });
        #[cfg(not(target_feature = "sse4.1"))]
        return Self(select(unsafe { _mm_cmpgt_epi32(self.0, rhs.0) }, rhs.0, self.0));
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        #[cfg(target_feature = "sse4.1")]
        return Self(unsafe { _mm_max_epi32(self.0, rhs.0) });
        #[cfg(not(target_feature = "sse4.1"))]
        return Self(select(unsafe { _mm_cmpgt_epi32(self.0, rhs.0) }, self.0, rhs.0));
    }

    #[inline(always)]
    fn abs(self) -> U32x4 {
        #[cfg(target_feature = "ssse3")]
        return U32x4(unsafe { _mm_abs_epi32(self.0) });
        #[cfg(not(target_feature = "ssse3"))]
        return U32x4(unsafe {
            // (x ^ sign) - sign
            let sign = _mm_srai_epi32(self.0, 31);
            _mm_sub_epi32(_mm_xor_si128(self.0, sign), sign)
        });
    }
}

impl NegateStorage for I32x4 {
    #[inline(always)]
    fn neg(self) -> Self {
        Self(unsafe { _mm_sub_epi32(_mm_setzero_si128(), self.0) })
    }
}

impl IntegerStorage for I32x4 {
    impl_epi32_bitwise!();

    #[inline(always)]
    fn shr_lanes(self, amounts: Self) -> Self {
        #[cfg(target_feature = "avx2")]
        return Self(unsafe { _mm_srav_epi32(self.0, amounts.0) });
        #[cfg(not(target_feature = "avx2"))]
        return Self(shift_each_lane(self.0, amounts.0, |v, c| unsafe {
            _mm_sra_epi32(v, c)
        }));
    }

    #[inline(always)]
    fn shr(self, amount: u32) -> Self {
        Self(unsafe { _mm_sra_epi32(self.0, _mm_cvtsi32_si128(amount as i32)) })
    }
}

impl LaneStorage for U32x4 {
    type Element = u32;
    type Magnitude = U32x4;

    impl_epi32_common!(u32);

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        #[cfg(target_feature = "sse4.1")]
        return Self(unsafe { _mm_min_epu32(self.0, rhs.0) });
        #[cfg(not(target_feature = "sse4.1"))]
        return Self(select(cmpgt_epu32(self.0, rhs.0), rhs.0, self.0));
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        #[cfg(target_feature = "sse4.1")]
        return Self(unsafe { _mm_max_epu32(self.0, rhs.0) });
        #[cfg(not(target_feature = "sse4.1"))]
        return Self(select(cmpgt_epu32(self.0, rhs.0), self.0, rhs.0));
    }

    #[inline(always)]
    fn abs(self) -> Self {
        self
    }
}

impl IntegerStorage for U32x4 {
    impl_epi32_bitwise!();

    #[inline(always)]
    fn shr_lanes(self, amounts: Self) -> Self {
        #[cfg(target_feature = "avx2")]
        return Self(unsafe { _mm_srlv_epi32(self.0, amounts.0) });
        #[cfg(not(target_feature = "avx2"))]
        return Self(shift_each_lane(self.0, amounts.0, |v, c| unsafe {
            _mm_srl_epi32(v, c)
        }));
    }

    #[inline(always)]
    fn shr(self, amount: u32) -> Self {
        Self(unsafe { _mm_srl_epi32(self.0, _mm_cvtsi32_si128(amount as i32)) })
    }
}

impl LaneStorage for F32x4 {
    type Element = f32;
    type Magnitude = F32x4;

    #[inline(always)]
    fn make(v0: f32, v1: f32, v2: f32, v3: f32) -> Self {
        Self(unsafe { _mm_setr_ps(v0, v1, v2, v3) })
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f32, lanes: usize) -> Self {
        debug_assert!((2..=4).contains(&lanes));
        Self(match lanes {
            2 => _mm_castsi128_ps(_mm_loadl_epi64(ptr.cast())),
            3 => _mm_movelh_ps(
                _mm_castsi128_ps(_mm_loadl_epi64(ptr.cast())),
                _mm_set_ss(ptr.add(2).read_unaligned()),
            ),
            _ => _mm_loadu_ps(ptr),
        })
    }

    #[inline(always)]
    fn splat(value: f32) -> Self {
        Self(unsafe { _mm_set1_ps(value) })
    }

    #[inline(always)]
    fn zero() -> Self {
        Self(unsafe { _mm_setzero_ps() })
    }

    #[inline(always)]
    fn extract(self, index: usize) -> f32 {
        self.to_array()[index]
    }

    #[inline(always)]
    fn insert(&mut self, index: usize, value: f32) {
        let mut lanes = self.to_array();
        lanes[index] = value;
        // SAFETY: both types are 16 bytes of plain float data
        self.0 = unsafe { transmute::<[f32; 4], __m128>(lanes) };
    }

    #[inline(always)]
    fn to_array(self) -> [f32; 4] {
        // SAFETY: both types are 16 bytes of plain float data
        unsafe { transmute(self.0) }
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(unsafe { _mm_add_ps(self.0, rhs.0) })
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self(unsafe { _mm_sub_ps(self.0, rhs.0) })
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self(unsafe { _mm_mul_ps(self.0, rhs.0) })
    }

    // `_mm_min_ps` returns the second operand on NaN; OR-ing the unordered
    // mask turns those lanes into NaN
    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Self(unsafe { _mm_or_ps(_mm_min_ps(self.0, rhs.0), _mm_cmpunord_ps(self.0, rhs.0)) })
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Self(unsafe { _mm_or_ps(_mm_max_ps(self.0, rhs.0), _mm_cmpunord_ps(self.0, rhs.0)) })
    }

    #[inline(always)]
    fn abs(self) -> Self {
        Self(unsafe { _mm_andnot_ps(_mm_set1_ps(-0.0), self.0) })
    }
}

impl NegateStorage for F32x4 {
    #[inline(always)]
    fn neg(self) -> Self {
        Self(unsafe { _mm_xor_ps(self.0, _mm_set1_ps(-0.0)) })
    }
}

impl FloatStorage for F32x4 {
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        Self(unsafe { _mm_div_ps(self.0, rhs.0) })
    }
}

impl F64x4 {
    #[inline(always)]
    fn each(self, rhs: Self, op: impl Fn(__m128d, __m128d) -> __m128d) -> Self {
        Self {
            lo: op(self.lo, rhs.lo),
            hi: op(self.hi, rhs.hi),
        }
    }
}

impl LaneStorage for F64x4 {
    type Element = f64;
    type Magnitude = F64x4;

    #[inline(always)]
    fn make(v0: f64, v1: f64, v2: f64, v3: f64) -> Self {
        unsafe {
            Self {
                lo: _mm_setr_pd(v0, v1),
                hi: _mm_setr_pd(v2, v3),
            }
        }
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f64, lanes: usize) -> Self {
        debug_assert!((2..=4).contains(&lanes));
        let lo = _mm_loadu_pd(ptr);
        let hi = match lanes {
            2 => _mm_setzero_pd(),
            3 => _mm_set_sd(ptr.add(2).read_unaligned()),
            _ => _mm_loadu_pd(ptr.add(2)),
        };
        Self { lo, hi }
    }

    #[inline(always)]
    fn splat(value: f64) -> Self {
        let v = unsafe { _mm_set1_pd(value) };
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
        // SAFETY: each register is 16 bytes of plain float data
        let lo: [f64; 2] = unsafe { transmute(self.lo) };
        let hi: [f64; 2] = unsafe { transmute(self.hi) };
        [lo[0], lo[1], hi[0], hi[1]]
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self.each(rhs, |a, b| unsafe { _mm_add_pd(a, b) })
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        self.each(rhs, |a, b| unsafe { _mm_sub_pd(a, b) })
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        self.each(rhs, |a, b| unsafe { _mm_mul_pd(a, b) })
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        self.each(rhs, |a, b| unsafe { _mm_or_pd(_mm_min_pd(a, b), _mm_cmpunord_pd(a, b)) })
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        self.each(rhs, |a, b| unsafe { _mm_or_pd(_mm_max_pd(a, b), _mm_cmpunord_pd(a, b)) })
    }

    #[inline(always)]
    fn abs(self) -> Self {
        let sign = unsafe { _mm_set1_pd(-0.0) };
        self.each(Self { lo: sign, hi: sign }, |a, s| unsafe { _mm_andnot_pd(s, a) })
    }
}

impl NegateStorage for F64x4 {
    #[inline(always)]
    fn neg(self) -> Self {
        let sign = unsafe { _mm_set1_pd(-0.0) };
        self.each(Self { lo: sign, hi: sign }, |a, s| unsafe { _mm_xor_pd(a, s) })
    }
}

impl FloatStorage for F64x4 {
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        self.each(rhs, |a, b| unsafe { _mm_div_pd(a, b) })
    }
}

impl VectorBackend for Sse2Backend {
    const KIND: Backend = Backend::SSE2;

    type I32x4 = I32x4;
    type U32x4 = U32x4;
    type F32x4 = F32x4;
    type F64x4 = F64x4;

    #[inline(always)]
    fn i32x4_from_f32x4(value: F32x4) -> I32x4 {
        I32x4(unsafe { _mm_cvtps_epi32(value.0) })
    }

    #[inline(always)]
    fn i32x4_from_f32x4_truncating(value: F32x4) -> I32x4 {
        I32x4(unsafe { _mm_cvttps_epi32(value.0) })
    }

    #[inline(always)]
    fn i32x4_from_f64x4(value: F64x4) -> I32x4 {
        // Each conversion fills the low two lanes and zeroes the high two
        I32x4(unsafe {
            _mm_unpacklo_epi64(_mm_cvtpd_epi32(value.lo), _mm_cvtpd_epi32(value.hi))
        })
    }

    #[inline(always)]
    fn i32x4_from_f64x4_truncating(value: F64x4) -> I32x4 {
        I32x4(unsafe {
            _mm_unpacklo_epi64(_mm_cvttpd_epi32(value.lo), _mm_cvttpd_epi32(value.hi))
        })
    }

    #[inline(always)]
    fn f32x4_from_i32x4(value: I32x4) -> F32x4 {
        F32x4(unsafe { _mm_cvtepi32_ps(value.0) })
    }

    #[inline(always)]
    fn f32x4_from_f64x4(value: F64x4) -> F32x4 {
        F32x4(unsafe { _mm_movelh_ps(_mm_cvtpd_ps(value.lo), _mm_cvtpd_ps(value.hi)) })
    }

    #[inline(always)]
    fn f64x4_from_i32x4(value: I32x4) -> F64x4 {
        unsafe {
            F64x4 {
                lo: _mm_cvtepi32_pd(value.0),
                hi: _mm_cvtepi32_pd(_mm_unpackhi_epi64(value.0, value.0)),
            }
        }
    }

    #[inline(always)]
    fn f64x4_from_f32x4(value: F32x4) -> F64x4 {
        unsafe {
            F64x4 {
                lo: _mm_cvtps_pd(value.0),
                hi: _mm_cvtps_pd(_mm_movehl_ps(value.0, value.0)),
            }
        }
    }
}
