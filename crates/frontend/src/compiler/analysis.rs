// Copyright 2025 Irreducible Inc.
//! Constant-boolean and bottom propagation over expressions.
//!
//! Facts flow into the analysis map when a variable is asserted equal to an expression whose
//! value is statically known. The query predicates are used by `if` elaboration to prune dead
//! branches and by the compound layer to propagate [`TExp::Bot`].

use super::env::{AnalBind, Env};
use crate::texp::{TExp, Value, Var};

impl Env {
	/// Records whatever static fact `Assert(var, expr)` reveals about `var`.
	pub(crate) fn record_assert(&mut self, var: Var, expr: &TExp) {
		let fact = if self.is_bot(expr) {
			Some(AnalBind::Bot)
		} else {
			match expr {
				TExp::Val(Value::True) => Some(AnalBind::Bool(true)),
				TExp::Val(Value::False) => Some(AnalBind::Bool(false)),
				TExp::Val(Value::Field(c)) => Some(AnalBind::Const(*c)),
				TExp::Var(other) => self.anal_map.get(other).copied(),
				_ => None,
			}
		};
		if let Some(fact) = fact {
			self.anal_map.insert(var, fact);
		}
	}

	/// Is the expression statically known to be true? Only literals and recorded variable facts
	/// count; `false` means "unknown", not "provably false".
	pub(crate) fn is_true(&self, expr: &TExp) -> bool {
		match expr {
			TExp::Val(Value::True) => true,
			TExp::Var(var) => matches!(self.anal_map.get(var), Some(AnalBind::Bool(true))),
			_ => false,
		}
	}

	/// Is the expression statically known to be false? See [`Env::is_true`].
	pub(crate) fn is_false(&self, expr: &TExp) -> bool {
		match expr {
			TExp::Val(Value::False) => true,
			TExp::Var(var) => matches!(self.anal_map.get(var), Some(AnalBind::Bool(false))),
			_ => false,
		}
	}

	/// Is the expression statically the undefined value? Unlike truth facts, bottom propagates
	/// through operators and sequences: one undefined operand poisons the whole expression.
	pub(crate) fn is_bot(&self, expr: &TExp) -> bool {
		match expr {
			TExp::Bot => true,
			TExp::Var(var) => matches!(self.anal_map.get(var), Some(AnalBind::Bot)),
			TExp::Unop(_, e) => self.is_bot(e),
			TExp::Binop(_, lhs, rhs) => self.is_bot(lhs) || self.is_bot(rhs),
			TExp::Seq(exprs) => exprs.iter().any(|e| self.is_bot(e)),
			_ => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use rankone_core::Fp;

	use super::*;
	use crate::compiler::env::VarKind;

	fn fresh(env: &mut Env) -> Var {
		env.fresh_var(VarKind::Internal)
	}

	#[test]
	fn test_assert_records_literal_facts() {
		let mut env = Env::new();
		let t = fresh(&mut env);
		let c = fresh(&mut env);
		env.record_assert(t, &TExp::Val(Value::True));
		env.record_assert(c, &TExp::Val(Value::Field(Fp::new(7))));

		assert!(env.is_true(&TExp::Var(t)));
		assert!(!env.is_false(&TExp::Var(t)));
		assert_eq!(env.anal_map.get(&c), Some(&AnalBind::Const(Fp::new(7))));
	}

	#[test]
	fn test_facts_copy_through_variables() {
		let mut env = Env::new();
		let a = fresh(&mut env);
		let b = fresh(&mut env);
		env.record_assert(a, &TExp::Val(Value::False));
		env.record_assert(b, &TExp::Var(a));
		assert!(env.is_false(&TExp::Var(b)));
	}

	#[test]
	fn test_absence_means_unknown() {
		let mut env = Env::new();
		let v = fresh(&mut env);
		assert!(!env.is_true(&TExp::Var(v)));
		assert!(!env.is_false(&TExp::Var(v)));
		assert!(!env.is_bot(&TExp::Var(v)));
	}

	#[test]
	fn test_bot_propagates_through_operators() {
		let mut env = Env::new();
		let v = fresh(&mut env);
		env.record_assert(v, &TExp::Bot);

		let poisoned = TExp::Binop(
			crate::texp::Binop::Add,
			Box::new(TExp::Val(Value::Field(Fp::ONE))),
			Box::new(TExp::Var(v)),
		);
		assert!(env.is_bot(&poisoned));
		assert!(env.is_bot(&TExp::Unop(crate::texp::Unop::Neg, Box::new(TExp::Bot))));

		// Truth predicates stay literal-only.
		let wrapped = TExp::Binop(
			crate::texp::Binop::And,
			Box::new(TExp::Val(Value::True)),
			Box::new(TExp::Val(Value::True)),
		);
		assert!(!env.is_true(&wrapped));
	}
}
