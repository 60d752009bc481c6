// Copyright 2025 Irreducible Inc.
//! Routines for checking whether the
//! [constraint system][`crate::constraint_system::ConstraintSystem`] is satisfied with the given
//! [assignment][`crate::constraint_system::Assignment`].

use crate::{
	constraint_system::{Assignment, Constraint, ConstraintSystem, LinComb},
	field::Fp,
};

/// Evaluates an affine operand, reporting the operand name on an unassigned variable.
fn eval_operand(assignment: &Assignment, name: &'static str, operand: &LinComb) -> Result<Fp, String> {
	operand
		.eval(assignment)
		.ok_or_else(|| format!("{name} operand mentions an unassigned variable"))
}

/// Verifies that a single rank-1 constraint is satisfied: `A · B = C`.
pub fn verify_constraint(assignment: &Assignment, constraint: &Constraint) -> Result<(), String> {
	let a = eval_operand(assignment, "A", &constraint.a)?;
	let b = eval_operand(assignment, "B", &constraint.b)?;
	let c = eval_operand(assignment, "C", &constraint.c)?;

	if a * b != c {
		Err(format!("rank-1 constraint failed: {a} * {b} = {} (expected {c})", a * b))
	} else {
		Ok(())
	}
}

/// Verifies all constraints in a constraint system are satisfied by the assignment.
pub fn verify_constraints(cs: &ConstraintSystem, assignment: &Assignment) -> Result<(), String> {
	cs.validate()
		.map_err(|e| format!("constraint system validation failed: {e}"))?;

	if assignment.len() != cs.num_vars {
		return Err(format!(
			"assignment length doesn't match the system: expected {}, got {}",
			cs.num_vars,
			assignment.len()
		));
	}
	for (i, constraint) in cs.constraints.iter().enumerate() {
		verify_constraint(assignment, constraint)
			.map_err(|e| format!("constraint {i} failed: {e}"))?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use smallvec::smallvec;

	use super::*;
	use crate::constraint_system::VarIndex;

	fn product_constraint(a: u32, b: u32, c: u32) -> Constraint {
		Constraint {
			a: LinComb::from_var(VarIndex(a)),
			b: LinComb::from_var(VarIndex(b)),
			c: LinComb::from_var(VarIndex(c)),
		}
	}

	#[test]
	fn test_satisfied_product() {
		let cs = ConstraintSystem {
			constraints: vec![product_constraint(0, 1, 2)],
			num_vars: 3,
			input_vars: vec![VarIndex(0), VarIndex(1)],
			output_vars: vec![VarIndex(2)],
		};
		let mut assignment = Assignment::new(3);
		assignment.set(VarIndex(0), Fp::new(6));
		assignment.set(VarIndex(1), Fp::new(7));
		assignment.set(VarIndex(2), Fp::new(42));
		assert!(verify_constraints(&cs, &assignment).is_ok());

		assignment.set(VarIndex(2), Fp::new(41));
		assert!(verify_constraints(&cs, &assignment).is_err());
	}

	#[test]
	fn test_affine_operands() {
		// (2x + 1) * 3 = y
		let cs = ConstraintSystem {
			constraints: vec![Constraint {
				a: LinComb {
					constant: Fp::ONE,
					terms: smallvec![(VarIndex(0), Fp::new(2))],
				},
				b: LinComb::constant(Fp::new(3)),
				c: LinComb::from_var(VarIndex(1)),
			}],
			num_vars: 2,
			input_vars: vec![VarIndex(0)],
			output_vars: vec![VarIndex(1)],
		};
		let mut assignment = Assignment::new(2);
		assignment.set(VarIndex(0), Fp::new(5));
		assignment.set(VarIndex(1), Fp::new(33));
		assert!(verify_constraints(&cs, &assignment).is_ok());
	}

	#[test]
	fn test_unassigned_variable_is_an_error() {
		let cs = ConstraintSystem {
			constraints: vec![product_constraint(0, 1, 2)],
			num_vars: 3,
			input_vars: vec![],
			output_vars: vec![],
		};
		let assignment = Assignment::new(3);
		assert!(verify_constraints(&cs, &assignment).is_err());
	}
}
