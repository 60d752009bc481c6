// Copyright 2025 Irreducible Inc.
//! [`Fp`] related definitions.

use std::{
	fmt,
	iter::Sum,
	ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

/// The field modulus, the Mersenne prime `2^61 - 1`.
pub const MODULUS: u64 = (1 << 61) - 1;

/// [`Fp`] is a residue modulo [`MODULUS`] and is the fundamental unit of data in Rankone. All
/// computation and constraints operate on it.
///
/// The canonical representative is always kept in `[0, MODULUS)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fp(u64);

impl Fp {
	/// The additive identity.
	pub const ZERO: Fp = Fp(0);
	/// The multiplicative identity.
	pub const ONE: Fp = Fp(1);

	/// Creates a field element from an arbitrary `u64`, reducing modulo [`MODULUS`].
	pub const fn new(value: u64) -> Fp {
		Fp(value % MODULUS)
	}

	/// Returns the canonical representative in `[0, MODULUS)`.
	pub const fn as_u64(self) -> u64 {
		self.0
	}

	/// Returns `true` if this is the additive identity.
	pub const fn is_zero(self) -> bool {
		self.0 == 0
	}

	/// Raises this element to the given power by square-and-multiply.
	pub fn pow(self, mut exp: u64) -> Fp {
		let mut base = self;
		let mut acc = Fp::ONE;
		while exp != 0 {
			if exp & 1 == 1 {
				acc *= base;
			}
			base *= base;
			exp >>= 1;
		}
		acc
	}

	/// The multiplicative inverse, or `None` for zero.
	///
	/// Computed as `self^(MODULUS - 2)` per Fermat.
	pub fn inv(self) -> Option<Fp> {
		if self.is_zero() {
			None
		} else {
			Some(self.pow(MODULUS - 2))
		}
	}

	/// Field division, `None` when `rhs` is zero.
	pub fn checked_div(self, rhs: Fp) -> Option<Fp> {
		rhs.inv().map(|inv| self * inv)
	}

	/// The embedding of the rational `num / den`, or `None` when `den ≡ 0`.
	///
	/// This is how rational literals enter programs.
	pub fn from_ratio(num: i64, den: i64) -> Option<Fp> {
		Fp::from(num).checked_div(Fp::from(den))
	}
}

impl From<u64> for Fp {
	fn from(value: u64) -> Fp {
		Fp::new(value)
	}
}

impl From<i64> for Fp {
	fn from(value: i64) -> Fp {
		let abs = Fp::new(value.unsigned_abs());
		if value < 0 { -abs } else { abs }
	}
}

impl From<bool> for Fp {
	fn from(value: bool) -> Fp {
		if value { Fp::ONE } else { Fp::ZERO }
	}
}

impl Add for Fp {
	type Output = Fp;

	fn add(self, rhs: Fp) -> Fp {
		// Both summands are below 2^61, the sum fits u64.
		let sum = self.0 + rhs.0;
		Fp(if sum >= MODULUS { sum - MODULUS } else { sum })
	}
}

impl Sub for Fp {
	type Output = Fp;

	fn sub(self, rhs: Fp) -> Fp {
		if self.0 >= rhs.0 {
			Fp(self.0 - rhs.0)
		} else {
			Fp(self.0 + MODULUS - rhs.0)
		}
	}
}

impl Mul for Fp {
	type Output = Fp;

	fn mul(self, rhs: Fp) -> Fp {
		Fp(((self.0 as u128 * rhs.0 as u128) % MODULUS as u128) as u64)
	}
}

impl Neg for Fp {
	type Output = Fp;

	fn neg(self) -> Fp {
		Fp::ZERO - self
	}
}

impl AddAssign for Fp {
	fn add_assign(&mut self, rhs: Fp) {
		*self = *self + rhs;
	}
}

impl SubAssign for Fp {
	fn sub_assign(&mut self, rhs: Fp) {
		*self = *self - rhs;
	}
}

impl MulAssign for Fp {
	fn mul_assign(&mut self, rhs: Fp) {
		*self = *self * rhs;
	}
}

impl Sum for Fp {
	fn sum<I: Iterator<Item = Fp>>(iter: I) -> Fp {
		iter.fold(Fp::ZERO, Fp::add)
	}
}

impl fmt::Debug for Fp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Fp({})", self.0)
	}
}

impl fmt::Display for Fp {
	/// Balanced representation: residues above `MODULUS / 2` print as negative rationals, so
	/// subtraction results read naturally in result records.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.0 <= MODULUS / 2 {
			write!(f, "{}", self.0)
		} else {
			write!(f, "-{}", MODULUS - self.0)
		}
	}
}
