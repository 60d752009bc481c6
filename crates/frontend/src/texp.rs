// Copyright 2025 Irreducible Inc.
//! The expression tree produced by elaborating a user program.
//!
//! Expressions denote both a value and the constraints that pin it down: assertion and
//! sequencing nodes carry the effects a program performed while computing its result.
//! [`compile`][crate::compile] lowers this tree to a rank-1 constraint system.
//!
//! Compound values (arrays and pairs) never appear inline. An expression of compound type is
//! always a [`Value::Loc`] reference into the elaborator's heap; the components live in the
//! heap's object map.

use cranelift_entity::entity_impl;
use rankone_core::Fp;

/// A logic variable.
///
/// An opaque identity, unique within one elaboration. Variables double as the variable alphabet
/// of the compiled constraint system.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Var(u32);
entity_impl!(Var);

/// A heap location naming a compound value (an array or a pair).
///
/// Disjoint from [`Var`]; locations exist only during elaboration and never reach the
/// constraint system.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Loc(u32);
entity_impl!(Loc);

/// A literal value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Value {
	/// The unit value, the result of pure effects such as `set`.
	Unit,
	/// Boolean truth, encoded as `1` in the field.
	True,
	/// Boolean falsehood, encoded as `0` in the field.
	False,
	/// A field constant.
	Field(Fp),
	/// A reference to a compound value on the elaborator's heap.
	Loc(Loc),
}

/// A unary operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Unop {
	/// Field negation.
	Neg,
	/// Boolean negation.
	Not,
}

/// A binary operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Binop {
	/// Field addition.
	Add,
	/// Field subtraction.
	Sub,
	/// Field multiplication.
	Mul,
	/// Field division.
	Div,
	/// Boolean conjunction.
	And,
	/// Boolean disjunction.
	Or,
	/// Boolean exclusive or.
	Xor,
	/// Field equality, producing a boolean.
	Eq,
	/// Boolean equality.
	BEq,
}

/// An expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TExp {
	/// A literal.
	Val(Value),
	/// A logic variable.
	Var(Var),
	/// A unary operation.
	Unop(Unop, Box<TExp>),
	/// A binary operation.
	Binop(Binop, Box<TExp>, Box<TExp>),
	/// A conditional. Both branches are constrained; the condition selects the result.
	If(Box<TExp>, Box<TExp>, Box<TExp>),
	/// Asserts that the variable equals the expression.
	Assert(Var, Box<TExp>),
	/// A sequence of expressions; the last one is the result, the rest are effects.
	///
	/// Built only through [`seq_all`], which guarantees at least two elements, no nested
	/// sequences, and (when pruning is on) no pure expression in a non-final position.
	Seq(Vec<TExp>),
	/// The undefined marker for statically-unreachable values. Absorbing under all operations.
	Bot,
}

impl TExp {
	/// An expression is pure if discarding it cannot change the meaning of a program: it is a
	/// literal, a variable, or an operator applied to pure operands.
	///
	/// Assertions, conditionals and sequences count as effectful, as does [`TExp::Bot`].
	pub fn is_pure(&self) -> bool {
		match self {
			TExp::Val(_) | TExp::Var(_) => true,
			TExp::Unop(_, e) => e.is_pure(),
			TExp::Binop(_, lhs, rhs) => lhs.is_pure() && rhs.is_pure(),
			TExp::If(..) | TExp::Assert(..) | TExp::Seq(_) | TExp::Bot => false,
		}
	}

	/// The heap location this expression denotes, if it is a compound reference.
	pub fn loc(&self) -> Option<Loc> {
		match self {
			TExp::Val(Value::Loc(loc)) => Some(*loc),
			_ => None,
		}
	}
}

fn flatten(expr: TExp, out: &mut Vec<TExp>) {
	match expr {
		TExp::Seq(exprs) => {
			for e in exprs {
				flatten(e, out);
			}
		}
		e => out.push(e),
	}
}

/// The smart sequence constructor.
///
/// Flattens nested sequences and, when `prune_pure` is set, drops pure expressions from every
/// non-final position; the final expression is the result and is always kept. An empty input
/// yields unit.
pub fn seq_all(exprs: Vec<TExp>, prune_pure: bool) -> TExp {
	let mut flat = Vec::with_capacity(exprs.len());
	for e in exprs {
		flatten(e, &mut flat);
	}
	let Some(last) = flat.pop() else {
		return TExp::Val(Value::Unit);
	};
	let mut kept: Vec<TExp> = if prune_pure {
		flat.into_iter().filter(|e| !e.is_pure()).collect()
	} else {
		flat
	};
	if kept.is_empty() {
		last
	} else {
		kept.push(last);
		TExp::Seq(kept)
	}
}

/// [`seq_all`] over exactly two expressions.
pub fn seq(first: TExp, second: TExp, prune_pure: bool) -> TExp {
	seq_all(vec![first, second], prune_pure)
}
