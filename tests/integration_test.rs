//! Integration tests through the public API
//!
//! Coverage:
//! - Every lane kind at every width (2, 3, 4)
//! - Construction, element access and slice conversions
//! - Arithmetic, bitwise and shift operators where the kind supports them
//! - Conversions and the 2x2 matrix type
//! - Error handling of the checked entry points

use proptest::prelude::*;
use simdx::{
    Backend, Float32x2, Float32x3, Float32x4, Float32x2x2, Float64x2, Float64x3, Float64x4,
    Int32x2, Int32x3, Int32x4, Int32x2x2, Kind, SimdError, UInt32x2, UInt32x3, UInt32x4, Vector,
};

const PROPTEST_CASES: u32 = 50;

// ============================================================================
// CONSTRUCTION & ACCESS (every kind, every width)
// ============================================================================

macro_rules! access_tests {
    ($($name:ident: $vec:ty, $t:ty, $n:literal, $sample:expr;)*) => {
        $(
            mod $name {
                use super::*;

                fn sample() -> [$t; $n] {
                    $sample
                }

                #[test]
                fn from_array_round_trips() {
                    let v = <$vec>::from_array(sample());
                    assert_eq!(v.to_array(), sample());
                    assert_eq!(<$vec>::LANES, $n);
                    for i in 0..$n {
                        assert_eq!(v.element(i), sample()[i]);
                        assert_eq!(v.get(i), Some(sample()[i]));
                    }
                    assert_eq!(v.get($n), None);
                }

                #[test]
                fn slice_load_and_store() {
                    let mut buffer = vec![<$t>::default(); $n + 1];
                    buffer[..$n].copy_from_slice(&sample());
                    let v = <$vec>::try_from_slice(&buffer).unwrap();
                    assert_eq!(v, <$vec>::from(sample()));

                    let mut out = vec![<$t>::default(); $n];
                    v.write_to_slice(&mut out).unwrap();
                    assert_eq!(out, sample().to_vec());

                    assert_eq!(
                        <$vec>::try_from(&buffer[..$n - 1]),
                        Err(SimdError::SizeMismatch { expected: $n, actual: $n - 1 })
                    );
                }

                #[test]
                fn set_element_touches_one_lane() {
                    let original = <$vec>::from_array(sample());
                    for i in 0..$n {
                        let mut v = original;
                        v.set_element(i, <$t>::default());
                        for j in 0..$n {
                            let expected = if i == j { <$t>::default() } else { sample()[j] };
                            assert_eq!(v.element(j), expected);
                        }
                    }
                    let mut v = original;
                    assert_eq!(
                        v.try_set_element($n, <$t>::default()),
                        Err(SimdError::IndexOutOfBounds { index: $n, lanes: $n })
                    );
                    assert_eq!(v, original);
                }

                #[test]
                fn splat_zero_default() {
                    let s = <$vec>::splat(sample()[0]);
                    assert!(s.to_array().iter().all(|&x| x == sample()[0]));
                    assert_eq!(<$vec>::zero(), <$vec>::default());
                    assert_eq!(<$vec>::zero().to_array(), [<$t>::default(); $n]);
                }

                #[test]
                fn add_sub_mul_match_lanes() {
                    let a = <$vec>::from_array(sample());
                    let sum = (a + a).to_array();
                    let product = (a * a).to_array();
                    for i in 0..$n {
                        assert_eq!(sum[i], sample()[i] + sample()[i]);
                        assert_eq!(product[i], sample()[i] * sample()[i]);
                    }
                    assert_eq!(a - a, <$vec>::zero());
                }

                #[test]
                fn debug_names_kind_and_width() {
                    let text = format!("{:?}", <$vec>::zero());
                    assert!(text.starts_with(&format!("{}x{}[", <$t as simdx::Lane>::KIND, $n)));
                }
            }
        )*
    };
}

access_tests! {
    int32x2: Int32x2, i32, 2, [-3, 7];
    int32x3: Int32x3, i32, 3, [-3, 7, 1000];
    int32x4: Int32x4, i32, 4, [-3, 7, 1000, -40];
    uint32x2: UInt32x2, u32, 2, [3, 7];
    uint32x3: UInt32x3, u32, 3, [3, 7, 1000];
    uint32x4: UInt32x4, u32, 4, [3, 7, 1000, 40];
    float32x2: Float32x2, f32, 2, [1.5, -2.25];
    float32x3: Float32x3, f32, 3, [1.5, -2.25, 8.0];
    float32x4: Float32x4, f32, 4, [1.5, -2.25, 8.0, 0.125];
    float64x2: Float64x2, f64, 2, [1.5, -2.25];
    float64x3: Float64x3, f64, 3, [1.5, -2.25, 8.0];
    float64x4: Float64x4, f64, 4, [1.5, -2.25, 8.0, 0.125];
}

// ============================================================================
// CONCRETE SCENARIOS
// ============================================================================

#[test]
fn integration_element_of_new() {
    assert_eq!(Int32x4::new(1, 2, 3, 4).element(2), 3);
}

#[test]
fn integration_negate() {
    assert_eq!(-Int32x3::new(1, -2, 3), Int32x3::new(-1, 2, -3));
    assert_eq!(Float64x2::new(1.0, -2.0).negate().to_array(), [-1.0, 2.0]);
}

#[test]
fn integration_shift_left() {
    assert_eq!((UInt32x4::splat(1) << 3).to_array(), [8; 4]);
    assert_eq!(Int32x2::splat(1).shl_lanes(Int32x2::splat(3)).to_array(), [8, 8]);
}

#[test]
fn integration_float_divide() {
    let q = Float32x3::new(9.0, 1.0, -4.0) / Float32x3::new(3.0, 4.0, 2.0);
    assert_eq!(q.to_array(), [3.0, 0.25, -2.0]);
}

#[test]
fn integration_and_not() {
    assert_eq!(
        Int32x4::splat(0b1100).and_not(Int32x4::splat(0b1010)).to_array(),
        [0b0010; 4]
    );
}

#[test]
fn integration_truncate_and_round() {
    let f = Float32x2::new(2.7, -2.7);
    assert_eq!(Int32x2::from_float32_allow_truncating(f).to_array(), [2, -2]);
    assert_eq!(Int32x2::from_float32(f).to_array(), [3, -3]);

    let d = Float64x4::splat(2.7);
    assert_eq!(Int32x4::from_float64_allow_truncating(d).to_array(), [2; 4]);
    assert_eq!(Int32x4::from_float64(d).to_array(), [3; 4]);
}

#[test]
fn integration_abs_produces_unsigned() {
    let magnitude: UInt32x3 = Int32x3::new(i32::MIN, -1, 1).abs();
    assert_eq!(magnitude.to_array(), [0x8000_0000, 1, 1]);
}

#[test]
fn integration_conversion_chain() {
    let i = Int32x3::new(-7, 0, 123_456);
    let d = Float64x3::from_int32(i);
    let f = Float32x3::from_float64(d);
    assert_eq!(Float64x3::from_float32(f), d);
    assert_eq!(Int32x3::from_float32(Float32x3::from_int32(i)), i);
    assert_eq!(
        UInt32x3::try_from_int32(i),
        Err(SimdError::NotRepresentable { lane: 0 })
    );
}

#[test]
fn integration_int32_to_float32_toward_zero() {
    let i = Int32x2::new(16_777_219, -16_777_219);
    assert_eq!(Float32x2::from_int32_allow_truncating(i).to_array(), [16_777_218.0, -16_777_218.0]);
    assert_eq!(Float32x2::from_int32(i).to_array(), [16_777_220.0, -16_777_220.0]);
}

#[test]
fn integration_float_min_max_nan() {
    let a = Float64x3::new(f64::NAN, 1.0, 2.0);
    let b = Float64x3::new(0.0, f64::NAN, 3.0);
    assert_eq!(a.min(b).to_array().map(f64::is_nan), [true, true, false]);
    assert_eq!(a.max(b).element(2), 3.0);
}

#[test]
fn integration_from_storage_zeroes_padding() {
    use simdx::backends::LaneStorage;
    let v = Int32x3::from_storage(Int32x4::new(1, 2, 3, 4).storage());
    assert_eq!(v.storage().to_array(), [1, 2, 3, 0]);
}

#[test]
fn integration_matrix() {
    let m = Int32x2x2::new(2, 1, 1, 3);
    assert_eq!(m.determinant(), 5);
    assert_eq!((m * Int32x2::new(1, 2)).to_array(), [4, 7]);
    assert_eq!(m * Int32x2x2::identity(), m);

    let f = Float32x2x2::from_columns(Float32x2::new(1.0, 0.0), Float32x2::new(0.0, 2.0));
    assert_eq!((f * 0.5).element(1, 1), 1.0);
    assert_eq!(f.transpose(), f);
}

#[test]
fn integration_backend_reporting() {
    assert_eq!(Backend::describe(), Backend::ACTIVE.name());
    assert_eq!(Kind::Float64.bits(), 64);
}

// ============================================================================
// PROPERTIES
// ============================================================================

fn padding<T: simdx::Element, const N: usize>(v: Vector<T, N>) -> Vec<T>
where
    simdx::LaneCount<N>: simdx::SupportedLaneCount,
{
    use simdx::backends::LaneStorage;
    v.storage().to_array()[N..].to_vec()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn integration_negation_involution(a in any::<[i32; 3]>(), f in prop::array::uniform4(-1.0e300f64..1.0e300)) {
        let v = Int32x3::from_array(a);
        prop_assert_eq!(v.negate().negate(), v);
        let w = Float64x4::from_array(f);
        prop_assert_eq!(-(-w), w);
    }

    #[test]
    fn integration_abs_matches_unsigned_abs(a in any::<[i32; 4]>()) {
        prop_assert_eq!(Int32x4::from_array(a).abs().to_array(), a.map(i32::unsigned_abs));
    }

    #[test]
    fn integration_and_not_identity(a in any::<[i32; 2]>(), b in any::<[i32; 2]>()) {
        let x = Int32x2::from_array(a);
        let y = Int32x2::from_array(b);
        prop_assert_eq!(x.and_not(y), !x & y);
    }

    #[test]
    fn integration_uniform_shift_is_splatted_shift(a in any::<[u32; 3]>(), k in 0u32..32) {
        let v = UInt32x3::from_array(a);
        prop_assert_eq!(v << k, v.shl_lanes(UInt32x3::splat(k)));
        prop_assert_eq!(v >> k, v.shr_lanes(UInt32x3::splat(k)));
        prop_assert_eq!((v >> k).to_array(), a.map(|x| x >> k));
    }

    #[test]
    fn integration_padding_closure(a in any::<[u32; 3]>(), b in any::<[u32; 3]>(), k in 0u32..32) {
        let x = UInt32x3::from_array(a);
        let y = UInt32x3::from_array(b);
        for v in [x + y, x - y, x * y, x & y, x | y, x ^ y, x << k, x >> k, x.min(y), x.max(y)] {
            prop_assert_eq!(padding(v), vec![0]);
        }
        let f = Float32x2::from_array([a[0] as f32, a[1] as f32]);
        prop_assert_eq!(padding(f + f), vec![0.0, 0.0]);
        prop_assert_eq!(padding(Int32x2::from_float32(f)), vec![0, 0]);
    }
}
