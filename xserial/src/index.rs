//! Modular ring positions.
//!
//! Both rings address their storage through [`Index`], a position modulo a
//! power-of-two size `N`. Keeping the wrapping arithmetic here means the
//! full/empty disambiguation (one sentinel slot) is written exactly once.

use core::fmt;

/// A position in a ring of `N = 2^BITS` slots.
///
/// All arithmetic wraps modulo `N`. `N` must be a power of two no smaller
/// than 2; this is checked when the first index of a given size is built.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Index<const N: usize>(usize);

impl<const N: usize> Index<N> {
    const VALID: () = assert!(
        N >= 2 && N.is_power_of_two(),
        "ring size must be a power of two >= 2"
    );

    /// Bit width of the index space.
    pub const BITS: u32 = N.trailing_zeros();

    /// Largest representable index, also the usable capacity of a ring that
    /// keeps one slot free.
    pub const MAX: usize = N - 1;

    /// Index zero.
    pub const ZERO: Self = {
        let () = Self::VALID;
        Self(0)
    };

    /// Creates an index from a raw value.
    ///
    /// # Panics
    ///
    /// Panics if `value >= N`.
    #[inline]
    pub const fn new(value: usize) -> Self {
        let () = Self::VALID;
        assert!(value < N, "index out of range");
        Self(value)
    }

    /// Returns the raw value in `0..N`.
    #[inline]
    pub const fn value(self) -> usize {
        self.0
    }

    /// Moves forward by `amount` slots, wrapping.
    #[inline]
    #[must_use]
    pub const fn advance(self, amount: usize) -> Self {
        Self(self.0.wrapping_add(amount) & Self::MAX)
    }

    /// Number of slots from `self` forward to `other`.
    #[inline]
    pub const fn distance_to(self, other: Self) -> usize {
        other.0.wrapping_sub(self.0) & Self::MAX
    }

    /// The index one slot behind, wrapping at zero.
    #[inline]
    #[must_use]
    pub const fn dec(self) -> Self {
        Self(self.0.wrapping_sub(1) & Self::MAX)
    }

    /// Slots left before the physical end of the storage.
    ///
    /// This is `-self mod N`, so it is zero (not `N`) for index zero.
    #[inline]
    pub const fn to_boundary(self) -> usize {
        self.0.wrapping_neg() & Self::MAX
    }
}

impl<const N: usize> fmt::Debug for Index<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, N)
    }
}
