//! Fixed-width vector type over the active backend
//!
//! `Vector<T, N>` holds `N` lanes of `T` in the backend's 4-lane register for
//! `T`. Widths 2 and 3 share that register; their unused high lanes are zero
//! right after construction and are never observed afterwards.

use std::fmt;
use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div,
    DivAssign, Mul, MulAssign, Neg, Not, Shl, ShlAssign, Shr, ShrAssign, Sub, SubAssign,
};

use crate::backends::{FloatStorage, IntegerStorage, LaneStorage, NegateStorage};
use crate::lane::{Element, LaneCount, SupportedLaneCount};
use crate::{Result, SimdError};

/// Fixed-width SIMD vector of `N` lanes of kind `T`
///
/// # Examples
///
/// ```
/// use simdx::Int32x3;
///
/// let a = Int32x3::new(1, 2, 3);
/// let b = Int32x3::splat(10);
///
/// assert_eq!((a + b).to_array(), [11, 12, 13]);
/// assert_eq!((a << 2).element(2), 12);
/// ```
#[repr(transparent)]
pub struct Vector<T: Element, const N: usize>
where
    LaneCount<N>: SupportedLaneCount,
{
    storage: T::Storage,
}

pub type Int32x2 = Vector<i32, 2>;
pub type Int32x3 = Vector<i32, 3>;
pub type Int32x4 = Vector<i32, 4>;
pub type UInt32x2 = Vector<u32, 2>;
pub type UInt32x3 = Vector<u32, 3>;
pub type UInt32x4 = Vector<u32, 4>;
pub type Float32x2 = Vector<f32, 2>;
pub type Float32x3 = Vector<f32, 3>;
pub type Float32x4 = Vector<f32, 4>;
pub type Float64x2 = Vector<f64, 2>;
pub type Float64x3 = Vector<f64, 3>;
pub type Float64x4 = Vector<f64, 4>;

impl<T: Element, const N: usize> Clone for Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
{
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Element, const N: usize> Copy for Vector<T, N> where LaneCount<N>: SupportedLaneCount {}

impl<T: Element, const N: usize> Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
{
    /// Number of logical lanes
    pub const LANES: usize = N;

    /// Wraps a backend register, zeroing lanes `N..4`
    ///
    /// # Examples
    ///
    /// ```
    /// use simdx::backends::LaneStorage;
    /// use simdx::{Int32x2, Int32x4};
    ///
    /// let v = Int32x2::from_storage(Int32x4::new(1, 2, 3, 4).storage());
    /// assert_eq!(v.storage().to_array(), [1, 2, 0, 0]);
    /// ```
    #[inline(always)]
    pub fn from_storage(mut storage: T::Storage) -> Self {
        for index in N..4 {
            storage.insert(index, T::ZERO);
        }
        Self { storage }
    }

    /// Wraps a register whose padding came out of a lane-wise operation
    #[inline(always)]
    pub(crate) fn from_raw(storage: T::Storage) -> Self {
        Self { storage }
    }

    /// Backend register, padding lanes included
    #[inline(always)]
    pub fn storage(self) -> T::Storage {
        self.storage
    }

    /// Vector whose lane `i` is `lanes[i]`
    ///
    /// # Examples
    ///
    /// ```
    /// use simdx::Float32x2;
    ///
    /// let v = Float32x2::from_array([1.5, -2.0]);
    /// assert_eq!(v.element(1), -2.0);
    /// ```
    #[inline(always)]
    pub fn from_array(lanes: [T; N]) -> Self {
        let mut padded = [T::ZERO; 4];
        padded[..N].copy_from_slice(&lanes);
        Self::from_raw(T::Storage::make(padded[0], padded[1], padded[2], padded[3]))
    }

    /// Reads `N` contiguous elements starting at `ptr`
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `N` elements of `T`. Any alignment is
    /// accepted; no memory past element `N - 1` is touched.
    #[inline(always)]
    pub unsafe fn load(ptr: *const T) -> Self {
        Self::from_raw(T::Storage::load(ptr, N))
    }

    /// Reads the first `N` elements of `slice`
    ///
    /// # Errors
    ///
    /// Returns [`SimdError::SizeMismatch`] if the slice holds fewer than `N`
    /// elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use simdx::{SimdError, UInt32x3};
    ///
    /// let v = UInt32x3::try_from_slice(&[4, 5, 6, 7])?;
    /// assert_eq!(v.to_array(), [4, 5, 6]);
    ///
    /// assert!(matches!(
    ///     UInt32x3::try_from_slice(&[1, 2]),
    ///     Err(SimdError::SizeMismatch { expected: 3, actual: 2 })
    /// ));
    /// # Ok::<(), SimdError>(())
    /// ```
    pub fn try_from_slice(slice: &[T]) -> Result<Self> {
        if slice.len() < N {
            return Err(SimdError::SizeMismatch {
                expected: N,
                actual: slice.len(),
            });
        }
        // SAFETY: the slice holds at least N elements
        Ok(unsafe { Self::load(slice.as_ptr()) })
    }

    /// Every logical lane set to `value`
    #[inline(always)]
    pub fn splat(value: T) -> Self {
        if N == 4 {
            Self::from_raw(T::Storage::splat(value))
        } else {
            Self::from_array([value; N])
        }
    }

    /// Every lane zero
    #[inline(always)]
    pub fn zero() -> Self {
        Self::from_raw(T::Storage::zero())
    }

    /// Lane `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= N`.
    #[inline(always)]
    pub fn element(self, index: usize) -> T {
        assert!(index < N, "lane index {index} out of bounds for {N} lanes");
        self.storage.extract(index)
    }

    /// Lane `index`, or `None` if `index >= N`
    #[inline(always)]
    pub fn get(self, index: usize) -> Option<T> {
        (index < N).then(|| self.storage.extract(index))
    }

    /// Overwrites lane `index`, leaving every other lane untouched
    ///
    /// # Panics
    ///
    /// Panics if `index >= N`.
    #[inline(always)]
    pub fn set_element(&mut self, index: usize, value: T) {
        assert!(index < N, "lane index {index} out of bounds for {N} lanes");
        self.storage.insert(index, value);
    }

    /// Overwrites lane `index`
    ///
    /// # Errors
    ///
    /// Returns [`SimdError::IndexOutOfBounds`] if `index >= N`; the vector is
    /// left unchanged.
    pub fn try_set_element(&mut self, index: usize, value: T) -> Result<()> {
        if index >= N {
            return Err(SimdError::IndexOutOfBounds { index, lanes: N });
        }
        self.storage.insert(index, value);
        Ok(())
    }

    /// Logical lanes, lane 0 first
    #[inline(always)]
    pub fn to_array(self) -> [T; N] {
        let lanes = self.storage.to_array();
        std::array::from_fn(|i| lanes[i])
    }

    /// Writes the logical lanes to the start of `out`
    ///
    /// # Errors
    ///
    /// Returns [`SimdError::SizeMismatch`] if `out` holds fewer than `N`
    /// elements; `out` is left unchanged.
    pub fn write_to_slice(self, out: &mut [T]) -> Result<()> {
        if out.len() < N {
            return Err(SimdError::SizeMismatch {
                expected: N,
                actual: out.len(),
            });
        }
        out[..N].copy_from_slice(&self.to_array());
        Ok(())
    }

    /// Lane-wise minimum
    #[inline(always)]
    pub fn min(self, rhs: Self) -> Self {
        Self::from_raw(self.storage.min(rhs.storage))
    }

    /// Lane-wise maximum
    #[inline(always)]
    pub fn max(self, rhs: Self) -> Self {
        Self::from_raw(self.storage.max(rhs.storage))
    }

    /// Lane-wise magnitude
    ///
    /// `Int32` lanes produce `UInt32` lanes holding the bit pattern of the
    /// absolute value, so `i32::MIN` becomes `2^31`. Other kinds keep their
    /// kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use simdx::Int32x2;
    ///
    /// let v = Int32x2::new(-7, i32::MIN);
    /// assert_eq!(v.abs().to_array(), [7, 1 << 31]);
    /// ```
    #[inline(always)]
    pub fn abs(self) -> Vector<T::Magnitude, N> {
        Vector::from_raw(T::abs_storage(self.storage))
    }
}

impl<T: Element> Vector<T, 2> {
    /// Vector `[v0, v1]`
    #[inline(always)]
    pub fn new(v0: T, v1: T) -> Self {
        Self::from_raw(T::Storage::make(v0, v1, T::ZERO, T::ZERO))
    }
}

impl<T: Element> Vector<T, 3> {
    /// Vector `[v0, v1, v2]`
    #[inline(always)]
    pub fn new(v0: T, v1: T, v2: T) -> Self {
        Self::from_raw(T::Storage::make(v0, v1, v2, T::ZERO))
    }
}

impl<T: Element> Vector<T, 4> {
    /// Vector `[v0, v1, v2, v3]`
    #[inline(always)]
    pub fn new(v0: T, v1: T, v2: T, v3: T) -> Self {
        Self::from_raw(T::Storage::make(v0, v1, v2, v3))
    }
}

impl<T: Element, const N: usize> Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
    T::Storage: NegateStorage,
{
    /// Lane-wise negation; wraps for `Int32`, flips the sign bit for floats
    #[inline(always)]
    pub fn negate(self) -> Self {
        Self::from_raw(self.storage.neg())
    }
}

impl<T: Element, const N: usize> Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
    T::Storage: IntegerStorage,
{
    /// `!self & rhs`, lane-wise
    ///
    /// # Examples
    ///
    /// ```
    /// use simdx::UInt32x2;
    ///
    /// let mask = UInt32x2::splat(0b1100);
    /// let bits = UInt32x2::splat(0b1010);
    /// assert_eq!(mask.and_not(bits).to_array(), [0b0010; 2]);
    /// ```
    #[inline(always)]
    pub fn and_not(self, rhs: Self) -> Self {
        Self::from_raw(self.storage.and_not(rhs.storage))
    }

    /// Shifts lane `i` left by `amounts[i]`
    ///
    /// Amounts outside `0..32` are backend-defined.
    #[inline(always)]
    pub fn shl_lanes(self, amounts: Self) -> Self {
        Self::from_raw(self.storage.shl_lanes(amounts.storage))
    }

    /// Shifts lane `i` right by `amounts[i]`
    ///
    /// Arithmetic for `Int32`, logical for `UInt32`. Amounts outside `0..32`
    /// are backend-defined.
    #[inline(always)]
    pub fn shr_lanes(self, amounts: Self) -> Self {
        Self::from_raw(self.storage.shr_lanes(amounts.storage))
    }
}

impl<T: Element, const N: usize> PartialEq for Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
{
    fn eq(&self, other: &Self) -> bool {
        self.to_array() == other.to_array()
    }
}

impl<T: Element + Eq, const N: usize> Eq for Vector<T, N> where LaneCount<N>: SupportedLaneCount {}

impl<T: Element, const N: usize> fmt::Debug for Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", T::KIND, N)?;
        f.debug_list().entries(self.to_array()).finish()
    }
}

impl<T: Element, const N: usize> Default for Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
{
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Element, const N: usize> From<[T; N]> for Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
{
    fn from(lanes: [T; N]) -> Self {
        Self::from_array(lanes)
    }
}

impl<T: Element, const N: usize> From<Vector<T, N>> for [T; N]
where
    LaneCount<N>: SupportedLaneCount,
{
    fn from(vector: Vector<T, N>) -> Self {
        vector.to_array()
    }
}

impl<T: Element, const N: usize> TryFrom<&[T]> for Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
{
    type Error = SimdError;

    fn try_from(slice: &[T]) -> Result<Self> {
        Self::try_from_slice(slice)
    }
}

/// Lane-wise binary operator plus its compound assignment form
macro_rules! impl_binary_op {
    ($bound:ident, $op:ident, $method:ident, $assign:ident, $assign_method:ident, $storage_fn:ident) => {
        impl<T: Element, const N: usize> $op for Vector<T, N>
        where
            LaneCount<N>: SupportedLaneCount,
            T::Storage: $bound,
        {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                Self::from_raw(self.storage.$storage_fn(rhs.storage))
            }
        }

        impl<T: Element, const N: usize> $assign for Vector<T, N>
        where
            LaneCount<N>: SupportedLaneCount,
            T::Storage: $bound,
        {
            #[inline(always)]
            fn $assign_method(&mut self, rhs: Self) {
                *self = $op::$method(*self, rhs);
            }
        }
    };
}

impl_binary_op!(LaneStorage, Add, add, AddAssign, add_assign, add);
impl_binary_op!(LaneStorage, Sub, sub, SubAssign, sub_assign, sub);
impl_binary_op!(LaneStorage, Mul, mul, MulAssign, mul_assign, mul);
impl_binary_op!(FloatStorage, Div, div, DivAssign, div_assign, div);
impl_binary_op!(IntegerStorage, BitAnd, bitand, BitAndAssign, bitand_assign, and);
impl_binary_op!(IntegerStorage, BitOr, bitor, BitOrAssign, bitor_assign, or);
impl_binary_op!(IntegerStorage, BitXor, bitxor, BitXorAssign, bitxor_assign, xor);
impl_binary_op!(IntegerStorage, Shl, shl, ShlAssign, shl_assign, shl_lanes);
impl_binary_op!(IntegerStorage, Shr, shr, ShrAssign, shr_assign, shr_lanes);

/// Multiplication by a scalar from either side
macro_rules! impl_scalar_mul {
    ($($t:ty),*) => {
        $(
            impl<const N: usize> Mul<$t> for Vector<$t, N>
            where
                LaneCount<N>: SupportedLaneCount,
            {
                type Output = Self;

                #[inline(always)]
                fn mul(self, rhs: $t) -> Self {
                    self * Self::splat(rhs)
                }
            }

            impl<const N: usize> MulAssign<$t> for Vector<$t, N>
            where
                LaneCount<N>: SupportedLaneCount,
            {
                #[inline(always)]
                fn mul_assign(&mut self, rhs: $t) {
                    *self = *self * rhs;
                }
            }

            impl<const N: usize> Mul<Vector<$t, N>> for $t
            where
                LaneCount<N>: SupportedLaneCount,
            {
                type Output = Vector<$t, N>;

                #[inline(always)]
                fn mul(self, rhs: Vector<$t, N>) -> Vector<$t, N> {
                    rhs * self
                }
            }
        )*
    };
}

impl_scalar_mul!(i32, u32, f32, f64);

impl<T: Element, const N: usize> Neg for Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
    T::Storage: NegateStorage,
{
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        self.negate()
    }
}

impl<T: Element, const N: usize> Not for Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
    T::Storage: IntegerStorage,
{
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        Self::from_raw(self.storage.not())
    }
}

impl<T: Element, const N: usize> Shl<u32> for Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
    T::Storage: IntegerStorage,
{
    type Output = Self;

    #[inline(always)]
    fn shl(self, amount: u32) -> Self {
        Self::from_raw(self.storage.shl(amount))
    }
}

impl<T: Element, const N: usize> ShlAssign<u32> for Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
    T::Storage: IntegerStorage,
{
    #[inline(always)]
    fn shl_assign(&mut self, amount: u32) {
        *self = *self << amount;
    }
}

impl<T: Element, const N: usize> Shr<u32> for Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
    T::Storage: IntegerStorage,
{
    type Output = Self;

    #[inline(always)]
    fn shr(self, amount: u32) -> Self {
        Self::from_raw(self.storage.shr(amount))
    }
}

impl<T: Element, const N: usize> ShrAssign<u32> for Vector<T, N>
where
    LaneCount<N>: SupportedLaneCount,
    T::Storage: IntegerStorage,
{
    #[inline(always)]
    fn shr_assign(&mut self, amount: u32) {
        *self = *self >> amount;
    }
}
