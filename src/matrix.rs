//! 2×2 matrices packed into one vector register
//!
//! # Example
//!
//! ```
//! use simdx::{Float32x2, Float32x2x2};
//!
//! let m = Float32x2x2::new(1.0, 2.0, 3.0, 4.0);
//! let v = Float32x2::new(1.0, 1.0);
//! assert_eq!((m * v).to_array(), [3.0, 7.0]);
//! assert_eq!(m.determinant(), -2.0);
//! ```

use std::ops::{Add, Mul, Sub};

use crate::lane::Element;
use crate::vector::Vector;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A 2×2 matrix with column-major storage
///
/// # Storage Layout
///
/// The four entries live in one 4-lane vector as `[m00, m10, m01, m11]`:
/// column 0 occupies lanes 0-1 and column 1 lanes 2-3.
///
/// Integer arithmetic wraps like the underlying vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix2x2<T: Element> {
    columns: Vector<T, 4>,
}

pub type Int32x2x2 = Matrix2x2<i32>;
pub type UInt32x2x2 = Matrix2x2<u32>;
pub type Float32x2x2 = Matrix2x2<f32>;
pub type Float64x2x2 = Matrix2x2<f64>;

impl<T: Element> Matrix2x2<T> {
    /// Matrix from entries in reading order
    ///
    /// ```
    /// use simdx::Int32x2x2;
    ///
    /// // [[1, 2],
    /// //  [3, 4]]
    /// let m = Int32x2x2::new(1, 2, 3, 4);
    /// assert_eq!(m.element(0, 1), 2);
    /// assert_eq!(m.element(1, 0), 3);
    /// ```
    pub fn new(m00: T, m01: T, m10: T, m11: T) -> Self {
        Self {
            columns: Vector::<T, 4>::new(m00, m10, m01, m11),
        }
    }

    /// Matrix whose columns are `c0` and `c1`
    pub fn from_columns(c0: Vector<T, 2>, c1: Vector<T, 2>) -> Self {
        let [m00, m10] = c0.to_array();
        let [m01, m11] = c1.to_array();
        Self {
            columns: Vector::<T, 4>::new(m00, m10, m01, m11),
        }
    }

    pub fn identity() -> Self {
        Self::new(T::ONE, T::ZERO, T::ZERO, T::ONE)
    }

    pub fn zero() -> Self {
        Self {
            columns: Vector::zero(),
        }
    }

    /// Entry at `row`, `col`
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is greater than 1.
    pub fn element(&self, row: usize, col: usize) -> T {
        assert!(row < 2 && col < 2, "entry ({row}, {col}) out of bounds for 2x2 matrix");
        self.columns.element(col * 2 + row)
    }

    /// Entry at `row`, `col`, or `None` outside the matrix
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        (row < 2 && col < 2).then(|| self.columns.element(col * 2 + row))
    }

    /// Column `col` as a 2-lane vector
    ///
    /// # Panics
    ///
    /// Panics if `col > 1`.
    pub fn column(&self, col: usize) -> Vector<T, 2> {
        Vector::<T, 2>::new(self.element(0, col), self.element(1, col))
    }

    /// Row `row` as a 2-lane vector
    ///
    /// # Panics
    ///
    /// Panics if `row > 1`.
    pub fn row(&self, row: usize) -> Vector<T, 2> {
        Vector::<T, 2>::new(self.element(row, 0), self.element(row, 1))
    }

    pub fn transpose(&self) -> Self {
        let [m00, m10, m01, m11] = self.columns.to_array();
        Self {
            columns: Vector::<T, 4>::new(m00, m01, m10, m11),
        }
    }

    /// Packed column-major entries
    pub fn to_columns(&self) -> Vector<T, 4> {
        self.columns
    }

    /// Matrix-vector product
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self, v), fields(kind = %T::KIND)))]
    pub fn matvec(&self, v: Vector<T, 2>) -> Vector<T, 2> {
        let [x, y] = v.to_array();
        let [a, b, c, d] = (self.columns * Vector::<T, 4>::new(x, x, y, y)).to_array();
        Vector::<T, 2>::new(a, b) + Vector::<T, 2>::new(c, d)
    }

    /// Matrix product `self × other`
    ///
    /// ```
    /// use simdx::Float64x2x2;
    ///
    /// let a = Float64x2x2::new(1.0, 2.0, 3.0, 4.0);
    /// let b = Float64x2x2::new(5.0, 6.0, 7.0, 8.0);
    ///
    /// // [[1, 2],   [[5, 6],   [[19, 22],
    /// //  [3, 4]] ×  [7, 8]] =  [43, 50]]
    /// assert_eq!(a.matmul(&b), Float64x2x2::new(19.0, 22.0, 43.0, 50.0));
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self, other), fields(kind = %T::KIND)))]
    pub fn matmul(&self, other: &Self) -> Self {
        let [a00, a10, a01, a11] = self.columns.to_array();
        let [b00, b10, b01, b11] = other.columns.to_array();
        // Column j of the product is a0 * b0j + a1 * b1j
        let left = Vector::<T, 4>::new(a00, a10, a00, a10) * Vector::<T, 4>::new(b00, b00, b01, b01);
        let right = Vector::<T, 4>::new(a01, a11, a01, a11) * Vector::<T, 4>::new(b10, b10, b11, b11);
        Self {
            columns: left + right,
        }
    }

    /// `m00 * m11 - m01 * m10`
    pub fn determinant(&self) -> T {
        let [m00, m10, m01, m11] = self.columns.to_array();
        let products = Vector::<T, 2>::new(m00, m01) * Vector::<T, 2>::new(m11, m10);
        let [lhs, rhs] = products.to_array();
        (products - Vector::<T, 2>::new(rhs, lhs)).element(0)
    }
}

impl<T: Element> Default for Matrix2x2<T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Element> Add for Matrix2x2<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            columns: self.columns + rhs.columns,
        }
    }
}

impl<T: Element> Sub for Matrix2x2<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            columns: self.columns - rhs.columns,
        }
    }
}

impl<T: Element> Mul<T> for Matrix2x2<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self {
            columns: self.columns * Vector::splat(rhs),
        }
    }
}

impl<T: Element> Mul<Vector<T, 2>> for Matrix2x2<T> {
    type Output = Vector<T, 2>;

    fn mul(self, rhs: Vector<T, 2>) -> Vector<T, 2> {
        self.matvec(rhs)
    }
}

impl<T: Element> Mul for Matrix2x2<T> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.matmul(&rhs)
    }
}
