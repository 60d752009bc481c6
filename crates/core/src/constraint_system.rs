// Copyright 2025 Irreducible Inc.
//! Definition of a rank-1 [`ConstraintSystem`] and the value assignments it is checked against.

use std::{
	fmt,
	ops::{Add, Mul, Neg, Sub},
};

use smallvec::{SmallVec, smallvec};

use crate::{error::ConstraintSystemError, field::Fp};

/// Index of a variable in the constraint system.
///
/// Variables are dense, `0..num_vars`. The constant `1` is not a variable; affine forms carry it
/// in their constant term instead.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarIndex(pub u32);

impl fmt::Display for VarIndex {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "x{}", self.0)
	}
}

/// A sparse affine form `constant + Σ coeff·var` over the variable alphabet.
///
/// Terms are kept sorted by variable index, with unique variables and non-zero coefficients.
/// All constructors and operators preserve this shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinComb {
	/// The constant summand.
	pub constant: Fp,
	/// The variable summands, `(var, coeff)` pairs sorted by `var`.
	pub terms: SmallVec<[(VarIndex, Fp); 2]>,
}

impl LinComb {
	/// The zero form.
	pub fn zero() -> LinComb {
		LinComb {
			constant: Fp::ZERO,
			terms: SmallVec::new(),
		}
	}

	/// A constant form with no variable summands.
	pub fn constant(value: Fp) -> LinComb {
		LinComb {
			constant: value,
			terms: SmallVec::new(),
		}
	}

	/// The form `1·var`.
	pub fn from_var(var: VarIndex) -> LinComb {
		LinComb {
			constant: Fp::ZERO,
			terms: smallvec![(var, Fp::ONE)],
		}
	}

	/// Builds a normalised form from an arbitrary bag of `(var, coeff)` summands: terms are
	/// sorted, duplicates are combined and zero coefficients dropped.
	pub fn from_terms(constant: Fp, terms: impl IntoIterator<Item = (VarIndex, Fp)>) -> LinComb {
		let mut out = LinComb::constant(constant);
		for (var, coeff) in terms {
			out = out.merge_scaled(&LinComb::from_var(var), coeff);
		}
		out
	}

	/// Returns the constant value if the form has no variable summands.
	pub fn as_constant(&self) -> Option<Fp> {
		if self.terms.is_empty() {
			Some(self.constant)
		} else {
			None
		}
	}

	/// Returns the variable if the form is exactly `1·var`.
	pub fn as_var(&self) -> Option<VarIndex> {
		match (&self.terms[..], self.constant) {
			([(var, coeff)], c) if *coeff == Fp::ONE && c == Fp::ZERO => Some(*var),
			_ => None,
		}
	}

	/// The largest variable index mentioned by the form, if any.
	pub fn max_var(&self) -> Option<VarIndex> {
		self.terms.last().map(|(var, _)| *var)
	}

	/// Evaluates the form against a complete assignment. `None` if any mentioned variable is
	/// unassigned.
	pub fn eval(&self, assignment: &Assignment) -> Option<Fp> {
		let mut acc = self.constant;
		for &(var, coeff) in &self.terms {
			acc += coeff * assignment.get(var)?;
		}
		Some(acc)
	}

	/// Merges `other` into `self` with every coefficient of `other` scaled by `k`.
	fn merge_scaled(&self, other: &LinComb, k: Fp) -> LinComb {
		let mut terms = SmallVec::new();
		let mut lhs = self.terms.iter().peekable();
		let mut rhs = other.terms.iter().peekable();
		loop {
			let next = match (lhs.peek(), rhs.peek()) {
				(Some(&&(lv, lc)), Some(&&(rv, rc))) => {
					if lv < rv {
						lhs.next();
						(lv, lc)
					} else if rv < lv {
						rhs.next();
						(rv, rc * k)
					} else {
						lhs.next();
						rhs.next();
						(lv, lc + rc * k)
					}
				}
				(Some(&&(lv, lc)), None) => {
					lhs.next();
					(lv, lc)
				}
				(None, Some(&&(rv, rc))) => {
					rhs.next();
					(rv, rc * k)
				}
				(None, None) => break,
			};
			if !next.1.is_zero() {
				terms.push(next);
			}
		}
		LinComb {
			constant: self.constant + other.constant * k,
			terms,
		}
	}
}

impl Add for &LinComb {
	type Output = LinComb;

	fn add(self, rhs: &LinComb) -> LinComb {
		self.merge_scaled(rhs, Fp::ONE)
	}
}

impl Sub for &LinComb {
	type Output = LinComb;

	fn sub(self, rhs: &LinComb) -> LinComb {
		self.merge_scaled(rhs, -Fp::ONE)
	}
}

impl Neg for &LinComb {
	type Output = LinComb;

	fn neg(self) -> LinComb {
		LinComb::zero().merge_scaled(self, -Fp::ONE)
	}
}

impl Mul<Fp> for &LinComb {
	type Output = LinComb;

	fn mul(self, k: Fp) -> LinComb {
		LinComb::zero().merge_scaled(self, k)
	}
}

impl Add<Fp> for &LinComb {
	type Output = LinComb;

	fn add(self, k: Fp) -> LinComb {
		let mut out = self.clone();
		out.constant += k;
		out
	}
}

impl Sub<Fp> for &LinComb {
	type Output = LinComb;

	fn sub(self, k: Fp) -> LinComb {
		let mut out = self.clone();
		out.constant -= k;
		out
	}
}

/// A single rank-1 constraint `A · B = C` over affine forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
	/// The left multiplicand.
	pub a: LinComb,
	/// The right multiplicand.
	pub b: LinComb,
	/// The product side.
	pub c: LinComb,
}

impl Constraint {
	/// Iterates over the three operands together with their names, for diagnostics.
	pub fn operands(&self) -> [(&'static str, &LinComb); 3] {
		[("A", &self.a), ("B", &self.b), ("C", &self.c)]
	}
}

/// A rank-1 constraint system over [`Fp`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintSystem {
	/// The constraints, in emission order. For circuits produced by the compiler this order is
	/// also a valid propagation order for witness solving.
	pub constraints: Vec<Constraint>,
	/// Total number of variables; every mentioned [`VarIndex`] is below this.
	pub num_vars: usize,
	/// User-supplied variables, in declaration order.
	pub input_vars: Vec<VarIndex>,
	/// Designated result variables. A singleton for scalar programs.
	pub output_vars: Vec<VarIndex>,
}

impl ConstraintSystem {
	/// The number of constraints in the system.
	pub fn n_constraints(&self) -> usize {
		self.constraints.len()
	}

	/// Runs a validation pass ensuring the structural invariants hold: every variable mentioned
	/// by a constraint, input or output is below `num_vars`, and inputs contain no duplicates.
	pub fn validate(&self) -> Result<(), ConstraintSystemError> {
		for (constraint_index, constraint) in self.constraints.iter().enumerate() {
			for (operand_name, operand) in constraint.operands() {
				if let Some(var) = operand.max_var() {
					if var.0 as usize >= self.num_vars {
						return Err(ConstraintSystemError::OutOfRangeVariable {
							constraint_index,
							operand_name,
							var: var.0,
							num_vars: self.num_vars,
						});
					}
				}
			}
		}
		let mut seen = vec![false; self.num_vars];
		for &var in &self.input_vars {
			if var.0 as usize >= self.num_vars {
				return Err(ConstraintSystemError::InputOutOfRange {
					var: var.0,
					num_vars: self.num_vars,
				});
			}
			if seen[var.0 as usize] {
				return Err(ConstraintSystemError::DuplicateInput { var: var.0 });
			}
			seen[var.0 as usize] = true;
		}
		for &var in &self.output_vars {
			if var.0 as usize >= self.num_vars {
				return Err(ConstraintSystemError::OutputOutOfRange {
					var: var.0,
					num_vars: self.num_vars,
				});
			}
		}
		Ok(())
	}
}

/// A (possibly partial) assignment of field values to the variables of a constraint system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
	values: Vec<Option<Fp>>,
}

impl Assignment {
	/// Creates an empty assignment for `num_vars` variables.
	pub fn new(num_vars: usize) -> Assignment {
		Assignment {
			values: vec![None; num_vars],
		}
	}

	/// The number of variable slots.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns `true` if the assignment has no variable slots at all.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// The value of `var`, or `None` while it is unassigned.
	pub fn get(&self, var: VarIndex) -> Option<Fp> {
		self.values[var.0 as usize]
	}

	/// Assigns `value` to `var`, overwriting any previous value.
	pub fn set(&mut self, var: VarIndex, value: Fp) {
		self.values[var.0 as usize] = Some(value);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn lc(constant: u64, terms: &[(u32, u64)]) -> LinComb {
		let mut out = LinComb::constant(Fp::new(constant));
		for &(var, coeff) in terms {
			out = out.merge_scaled(&LinComb::from_var(VarIndex(var)), Fp::new(coeff));
		}
		out
	}

	#[test]
	fn test_lincomb_merge_keeps_terms_sorted() {
		let sum = &lc(1, &[(3, 2), (0, 5)]) + &lc(2, &[(1, 7), (3, 4)]);
		assert_eq!(sum.constant, Fp::new(3));
		assert_eq!(
			sum.terms.as_slice(),
			&[
				(VarIndex(0), Fp::new(5)),
				(VarIndex(1), Fp::new(7)),
				(VarIndex(3), Fp::new(6)),
			]
		);
	}

	#[test]
	fn test_lincomb_cancellation_drops_term() {
		let diff = &lc(0, &[(2, 9)]) - &lc(0, &[(2, 9)]);
		assert_eq!(diff, LinComb::zero());
		assert_eq!(diff.as_constant(), Some(Fp::ZERO));
	}

	#[test]
	fn test_as_var() {
		assert_eq!(lc(0, &[(4, 1)]).as_var(), Some(VarIndex(4)));
		assert_eq!(lc(1, &[(4, 1)]).as_var(), None);
		assert_eq!(lc(0, &[(4, 2)]).as_var(), None);
		assert_eq!(LinComb::zero().as_var(), None);
	}

	#[test]
	fn test_eval_partial_is_none() {
		let form = lc(1, &[(0, 2), (1, 3)]);
		let mut assignment = Assignment::new(2);
		assignment.set(VarIndex(0), Fp::new(10));
		assert_eq!(form.eval(&assignment), None);
		assignment.set(VarIndex(1), Fp::new(100));
		assert_eq!(form.eval(&assignment), Some(Fp::new(321)));
	}

	#[test]
	fn test_validate_out_of_range() {
		let cs = ConstraintSystem {
			constraints: vec![Constraint {
				a: lc(0, &[(5, 1)]),
				b: LinComb::constant(Fp::ONE),
				c: LinComb::zero(),
			}],
			num_vars: 3,
			input_vars: vec![],
			output_vars: vec![],
		};
		assert!(matches!(
			cs.validate(),
			Err(crate::error::ConstraintSystemError::OutOfRangeVariable { var: 5, .. })
		));
	}

	#[test]
	fn test_validate_duplicate_input() {
		let cs = ConstraintSystem {
			constraints: vec![],
			num_vars: 3,
			input_vars: vec![VarIndex(1), VarIndex(1)],
			output_vars: vec![],
		};
		assert!(matches!(
			cs.validate(),
			Err(crate::error::ConstraintSystemError::DuplicateInput { var: 1 })
		));
	}
}
