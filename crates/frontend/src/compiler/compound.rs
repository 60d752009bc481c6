// Copyright 2025 Irreducible Inc.
//! Compound values: arrays and pairs on the elaborator's heap.
//!
//! A compound expression is always a location reference; its components live in the
//! environment's object map. Indexing therefore resolves at elaboration time and costs no
//! constraints. Only storing a genuinely new value (neither a variable nor a location)
//! materialises a fresh variable and an assertion.

use super::{
	ProgramBuilder,
	env::{ObjBind, VarKind},
};
use crate::{
	error::BuildError,
	texp::{Loc, TExp, Value},
};

impl ProgramBuilder {
	/// Allocates an array of `len` fresh variables.
	///
	/// Fails with [`BuildError::ZeroSizedArray`] when `len` is zero.
	pub fn arr(&mut self, len: usize) -> Result<TExp, BuildError> {
		self.alloc_arr(len, VarKind::Internal)
	}

	/// Allocates an array of `len` fresh input variables.
	///
	/// The elements join the input list in index order.
	pub fn input_arr(&mut self, len: usize) -> Result<TExp, BuildError> {
		self.alloc_arr(len, VarKind::Input)
	}

	fn alloc_arr(&mut self, len: usize, kind: VarKind) -> Result<TExp, BuildError> {
		if len == 0 {
			return Err(BuildError::ZeroSizedArray);
		}
		let loc = self.env.fresh_loc(len);
		for index in 0..len {
			let var = self.env.fresh_var(kind);
			self.env.bind(loc, index, ObjBind::Var(var));
		}
		Ok(TExp::Val(Value::Loc(loc)))
	}

	fn loc_of(compound: &TExp) -> Result<Loc, BuildError> {
		compound.loc().ok_or(BuildError::NotALocation)
	}

	/// Reads the component at `index`. An undefined array yields the undefined value.
	pub fn get(&mut self, compound: &TExp, index: usize) -> Result<TExp, BuildError> {
		if self.env.is_bot(compound) {
			return Ok(TExp::Bot);
		}
		let loc = Self::loc_of(compound)?;
		match self.env.lookup(loc, index) {
			None => Err(BuildError::UnboundIndex { loc, index }),
			Some(ObjBind::Loc(inner)) => Ok(TExp::Val(Value::Loc(inner))),
			Some(ObjBind::Var(var)) => Ok(TExp::Var(var)),
		}
	}

	/// Stores `value` at `index`.
	///
	/// Variables and locations are rebound without allocating anything; any other expression
	/// is pinned to a fresh variable by an assertion.
	pub fn set(&mut self, compound: &TExp, index: usize, value: &TExp) -> Result<TExp, BuildError> {
		let loc = Self::loc_of(compound)?;
		if index >= self.env.arity(loc) {
			return Err(BuildError::UnboundIndex { loc, index });
		}
		let bind = match value {
			TExp::Var(var) => ObjBind::Var(*var),
			TExp::Val(Value::Loc(inner)) => ObjBind::Loc(*inner),
			other => ObjBind::Var(self.assert_fresh(other.clone())),
		};
		self.env.bind(loc, index, bind);
		Ok(self.unit())
	}

	/// Builds a pair. Location components are stored by reference; scalar components are
	/// pinned to fresh variables by assertions.
	pub fn pair(&mut self, first: &TExp, second: &TExp) -> Result<TExp, BuildError> {
		let loc = self.env.fresh_loc(2);
		for (index, component) in [first, second].into_iter().enumerate() {
			let bind = match component {
				TExp::Val(Value::Loc(inner)) => ObjBind::Loc(*inner),
				other => ObjBind::Var(self.assert_fresh(other.clone())),
			};
			self.env.bind(loc, index, bind);
		}
		Ok(TExp::Val(Value::Loc(loc)))
	}

	/// First projection of a pair. Undefined pairs project to the undefined value.
	pub fn fst(&mut self, pair: &TExp) -> Result<TExp, BuildError> {
		self.get(pair, 0)
	}

	/// Second projection of a pair. Undefined pairs project to the undefined value.
	pub fn snd(&mut self, pair: &TExp) -> Result<TExp, BuildError> {
		self.get(pair, 1)
	}

	/// Allocates a `rows × cols` matrix as an array of row arrays.
	pub fn arr2(&mut self, rows: usize, cols: usize) -> Result<TExp, BuildError> {
		self.alloc_arr2(rows, cols, VarKind::Internal)
	}

	/// Allocates a `rows × cols` matrix of input variables, declared in row-major order.
	pub fn input_arr2(&mut self, rows: usize, cols: usize) -> Result<TExp, BuildError> {
		self.alloc_arr2(rows, cols, VarKind::Input)
	}

	fn alloc_arr2(&mut self, rows: usize, cols: usize, kind: VarKind) -> Result<TExp, BuildError> {
		if rows == 0 || cols == 0 {
			return Err(BuildError::ZeroSizedArray);
		}
		let outer = self.arr(rows)?;
		for row in 0..rows {
			let inner = self.alloc_arr(cols, kind)?;
			self.set(&outer, row, &inner)?;
		}
		Ok(outer)
	}

	/// Reads the component at `(row, col)` of a matrix.
	pub fn get2(&mut self, compound: &TExp, row: usize, col: usize) -> Result<TExp, BuildError> {
		let inner = self.get(compound, row)?;
		self.get(&inner, col)
	}

	/// Stores `value` at `(row, col)` of a matrix.
	pub fn set2(
		&mut self,
		compound: &TExp,
		row: usize,
		col: usize,
		value: &TExp,
	) -> Result<TExp, BuildError> {
		let inner = self.get(compound, row)?;
		self.set(&inner, col, value)
	}
}
