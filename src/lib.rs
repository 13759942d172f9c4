//! simdx: Portable Fixed-Width SIMD Vectors
//!
//! **simdx** provides small fixed-width vectors of `i32`, `u32`, `f32` and
//! `f64` with 2, 3 or 4 lanes, backed by one native 128-bit register (two
//! for `f64`) on every supported target:
//!
//! 1. **ARM** - NEON (AArch64 Advanced SIMD)
//! 2. **x86** - SSE2 baseline, refined by SSSE3/SSE4.1/AVX2 when enabled at
//!    build time
//! 3. **Anything else** - a portable scalar fallback with identical results
//!
//! # Design Principles
//!
//! - **One type, every width**: `Vector<T, N>` for N in 2, 3, 4; narrow widths
//!   share the 4-lane register and zero its unused lanes on construction
//! - **Compile-time dispatch**: the backend is picked by `cfg`, no runtime
//!   feature detection and no branches in the hot path
//! - **Capabilities in the type system**: negation only for signed kinds,
//!   division only for floats, bitwise and shift operators only for integers
//! - **Zero unsafe in the public API** apart from raw-pointer `load`
//!
//! # Quick Start
//!
//! ```rust
//! use simdx::{Float32x4, Int32x4};
//!
//! let a = Float32x4::new(1.0, 2.0, 3.0, 4.0);
//! let b = Float32x4::splat(2.0);
//!
//! assert_eq!((a / b).to_array(), [0.5, 1.0, 1.5, 2.0]);
//! assert_eq!(Int32x4::from_float32(a * 0.9).to_array(), [1, 2, 3, 4]);
//! ```

pub mod backends;
pub mod convert;
pub mod error;
pub mod lane;
pub mod matrix;
pub mod vector;

pub use backends::{ActiveBackend, VectorBackend};
pub use error::{Result, SimdError};
pub use lane::{Element, Kind, Lane, LaneCount, SupportedLaneCount};
pub use matrix::{Float32x2x2, Float64x2x2, Int32x2x2, Matrix2x2, UInt32x2x2};
pub use vector::{
    Float32x2, Float32x3, Float32x4, Float64x2, Float64x3, Float64x4, Int32x2, Int32x3, Int32x4,
    UInt32x2, UInt32x3, UInt32x4, Vector,
};

/// Backend execution target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Scalar fallback (no SIMD)
    Scalar,
    /// SSE2 (x86/x86_64 baseline)
    SSE2,
    /// ARM NEON
    NEON,
}

impl Backend {
    /// Backend compiled into this build
    pub const ACTIVE: Backend = <ActiveBackend as VectorBackend>::KIND;

    /// Short display name
    pub const fn name(self) -> &'static str {
        match self {
            Backend::Scalar => "scalar",
            Backend::SSE2 => "sse2",
            Backend::NEON => "neon",
        }
    }

    /// Names the active backend, emitting a debug event when tracing is on
    ///
    /// ```
    /// use simdx::Backend;
    ///
    /// assert_eq!(Backend::describe(), Backend::ACTIVE.name());
    /// ```
    pub fn describe() -> &'static str {
        let name = Self::ACTIVE.name();
        #[cfg(feature = "tracing")]
        tracing::debug!(backend = name, forced_scalar = cfg!(feature = "force-scalar"), "simdx backend");
        name
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
