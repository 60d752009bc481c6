// Copyright 2025 Irreducible Inc.
//! Lowering of the expression tree to a rank-1 constraint system.
//!
//! The traversal is bottom-up and accumulates sparse affine forms: additions, subtractions,
//! negations and constants never materialise variables or constraints. Only genuinely
//! non-linear nodes (products, divisions, boolean connectives, equalities, dynamic
//! conditionals) allocate a fresh result variable and emit constraints that force it to equal
//! the arithmetic meaning of the node.
//!
//! Two node kinds need more than linear propagation at witness time — the inverse advice of
//! the equality trick and the quotient of a division. For those the lowering records a
//! [`Hint`]: a deterministic prover-side computation, carried by the circuit next to its
//! constraints.

use std::collections::BTreeSet;

use cranelift_entity::EntityRef as _;
use rankone_core::{Constraint, ConstraintSystem, Fp, LinComb, VarIndex};

use super::{Program, circuit::Circuit};
use crate::{
	error::BuildError,
	texp::{Binop, TExp, Unop, Value, Var},
};

/// Prover-side deterministic advice the linear propagation solver cannot derive on its own.
pub(crate) enum Hint {
	/// `out = x⁻¹` when `x ≠ 0`, else `out = 0`.
	InverseOrZero {
		x: LinComb,
		out: VarIndex,
	},
	/// `out = num / den`; witness generation fails with `DivByZero` when `den = 0`.
	Quotient {
		num: LinComb,
		den: LinComb,
		out: VarIndex,
	},
}

fn var_index(var: Var) -> VarIndex {
	VarIndex(var.index() as u32)
}

struct Lowering {
	constraints: Vec<Constraint>,
	hints: Vec<Hint>,
	next_var: u32,
	/// Boolean-typed variables; each gets one `b·(b−1) = 0` range constraint at the end.
	bool_vars: BTreeSet<VarIndex>,
}

impl Lowering {
	fn fresh(&mut self) -> VarIndex {
		let var = VarIndex(self.next_var);
		self.next_var += 1;
		var
	}

	fn emit(&mut self, a: LinComb, b: LinComb, c: LinComb) {
		self.constraints.push(Constraint { a, b, c });
	}

	/// Marks the form as boolean-typed when it is a bare variable.
	fn note_bool(&mut self, form: &LinComb) {
		if let Some(var) = form.as_var() {
			self.bool_vars.insert(var);
		}
	}

	/// The product of two affine forms. Multiplication by a constant stays affine; otherwise
	/// a fresh result variable and one constraint are materialised.
	fn product(&mut self, lhs: &LinComb, rhs: &LinComb) -> LinComb {
		if let Some(k) = lhs.as_constant() {
			return rhs * k;
		}
		if let Some(k) = rhs.as_constant() {
			return lhs * k;
		}
		let out = self.fresh();
		self.emit(lhs.clone(), rhs.clone(), LinComb::from_var(out));
		LinComb::from_var(out)
	}

	/// The standard equality gadget: with `d = lhs − rhs` and an inverse advice variable `w`,
	/// the constraints `d·w = 1 − out` and `d·out = 0` force `out = 1` exactly when `d = 0`.
	fn equality(&mut self, lhs: &LinComb, rhs: &LinComb) -> LinComb {
		let diff = lhs - rhs;
		let out = self.fresh();
		let inverse = self.fresh();
		self.bool_vars.insert(out);
		self.hints.push(Hint::InverseOrZero {
			x: diff.clone(),
			out: inverse,
		});
		let out_form = LinComb::from_var(out);
		self.emit(diff.clone(), LinComb::from_var(inverse), &-&out_form + Fp::ONE);
		self.emit(diff, out_form.clone(), LinComb::zero());
		out_form
	}

	fn binop(&mut self, op: Binop, lhs: LinComb, rhs: LinComb) -> LinComb {
		match op {
			Binop::Add => &lhs + &rhs,
			Binop::Sub => &lhs - &rhs,
			Binop::Mul => self.product(&lhs, &rhs),
			Binop::Div => {
				let out = self.fresh();
				self.hints.push(Hint::Quotient {
					num: lhs.clone(),
					den: rhs.clone(),
					out,
				});
				// den · out = num
				self.emit(rhs, LinComb::from_var(out), lhs);
				LinComb::from_var(out)
			}
			Binop::And => {
				self.note_bool(&lhs);
				self.note_bool(&rhs);
				let out = self.product(&lhs, &rhs);
				self.note_bool(&out);
				out
			}
			Binop::Or => {
				self.note_bool(&lhs);
				self.note_bool(&rhs);
				let out = self.fresh();
				self.bool_vars.insert(out);
				// lhs·rhs = lhs + rhs − out, so out = lhs + rhs − lhs·rhs
				self.emit(
					lhs.clone(),
					rhs.clone(),
					&(&lhs + &rhs) - &LinComb::from_var(out),
				);
				LinComb::from_var(out)
			}
			Binop::Xor => {
				self.note_bool(&lhs);
				self.note_bool(&rhs);
				let out = self.fresh();
				self.bool_vars.insert(out);
				// 2·lhs·rhs = lhs + rhs − out, so out = lhs + rhs − 2·lhs·rhs
				self.emit(
					&lhs * Fp::new(2),
					rhs.clone(),
					&(&lhs + &rhs) - &LinComb::from_var(out),
				);
				LinComb::from_var(out)
			}
			Binop::Eq => self.equality(&lhs, &rhs),
			Binop::BEq => {
				self.note_bool(&lhs);
				self.note_bool(&rhs);
				let out = self.fresh();
				self.bool_vars.insert(out);
				// 2·lhs·rhs = out − 1 + lhs + rhs, so out = 1 − lhs − rhs + 2·lhs·rhs
				self.emit(
					&lhs * Fp::new(2),
					rhs.clone(),
					&(&(&LinComb::from_var(out) - Fp::ONE) + &lhs) + &rhs,
				);
				LinComb::from_var(out)
			}
		}
	}

	fn lower(&mut self, expr: &TExp) -> Result<LinComb, BuildError> {
		match expr {
			TExp::Val(Value::Unit) | TExp::Val(Value::False) => Ok(LinComb::zero()),
			TExp::Val(Value::True) => Ok(LinComb::constant(Fp::ONE)),
			TExp::Val(Value::Field(c)) => Ok(LinComb::constant(*c)),
			TExp::Val(Value::Loc(_)) => Err(BuildError::InternalInvariant(
				"a compound value escaped into the constraint compiler".into(),
			)),
			TExp::Var(var) => Ok(LinComb::from_var(var_index(*var))),
			// Distinguished from zero only during elaboration; emits nothing.
			TExp::Bot => Ok(LinComb::zero()),
			TExp::Unop(Unop::Neg, e) => Ok(-&self.lower(e)?),
			TExp::Unop(Unop::Not, e) => {
				let form = self.lower(e)?;
				self.note_bool(&form);
				Ok(&-&form + Fp::ONE)
			}
			TExp::Binop(op, lhs, rhs) => {
				let lhs = self.lower(lhs)?;
				let rhs = self.lower(rhs)?;
				Ok(self.binop(*op, lhs, rhs))
			}
			TExp::If(cond, then_expr, else_expr) => {
				let cond = self.lower(cond)?;
				self.note_bool(&cond);
				let then_form = self.lower(then_expr)?;
				let else_form = self.lower(else_expr)?;
				// out = cond·then + (1 − cond)·else. The blend aux = cond·(then − else)
				// costs one constraint; adding else back stays affine.
				let aux = self.product(&cond, &(&then_form - &else_form));
				Ok(&aux + &else_form)
			}
			TExp::Assert(var, e) => {
				// An assertion against the undefined value marks unreachable state and
				// constrains nothing.
				if matches!(**e, TExp::Bot) {
					return Ok(LinComb::zero());
				}
				let form = self.lower(e)?;
				let target = LinComb::from_var(var_index(*var));
				self.emit(&form - &target, LinComb::constant(Fp::ONE), LinComb::zero());
				Ok(LinComb::zero())
			}
			TExp::Seq(exprs) => {
				let Some((last, effects)) = exprs.split_last() else {
					return Err(BuildError::InternalInvariant(
						"empty sequence in the expression tree".into(),
					));
				};
				for effect in effects {
					self.lower(effect)?;
				}
				self.lower(last)
			}
		}
	}
}

/// Lowers an elaborated program to a [`Circuit`].
///
/// The returned circuit owns the constraint system (with the program's inputs in declaration
/// order and a singleton output), plus the solver hints needed to generate witnesses.
pub fn compile(program: &Program) -> Result<Circuit, BuildError> {
	let mut lowering = Lowering {
		constraints: Vec::new(),
		hints: Vec::new(),
		next_var: program.num_vars as u32,
		bool_vars: BTreeSet::new(),
	};
	let root = lowering.lower(&program.expr)?;

	// The output must be addressable. Reuse the root variable when there is one, otherwise
	// pin the affine result down with one more constraint.
	let output = match root.as_var() {
		Some(var) => var,
		None => {
			let var = lowering.fresh();
			lowering.emit(root, LinComb::constant(Fp::ONE), LinComb::from_var(var));
			var
		}
	};

	let n_bool_ranges = lowering.bool_vars.len();
	for &var in &lowering.bool_vars {
		let form = LinComb::from_var(var);
		let shifted = &form - Fp::ONE;
		lowering.constraints.push(Constraint {
			a: form,
			b: shifted,
			c: LinComb::zero(),
		});
	}

	let cs = ConstraintSystem {
		constraints: lowering.constraints,
		num_vars: lowering.next_var as usize,
		input_vars: program.inputs.iter().map(|&var| var_index(var)).collect(),
		output_vars: vec![output],
	};
	if cfg!(debug_assertions) {
		// Validate that the resulting constraint system has a good shape.
		cs.validate().unwrap();
	}
	tracing::debug!(
		num_vars = cs.num_vars,
		n_constraints = cs.n_constraints(),
		n_hints = lowering.hints.len(),
		"lowered program to rank-1 constraints"
	);

	Ok(Circuit::new(cs, lowering.hints, n_bool_ranges))
}
