// Copyright 2025 Irreducible Inc.
//! The elaboration environment: identity supplies, the heap object map and the analysis map.

use std::collections::HashMap;

use cranelift_entity::PrimaryMap;
use rankone_core::Fp;

use crate::texp::{Loc, Var};

/// What a heap slot holds: a nested compound or a logic variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ObjBind {
	Loc(Loc),
	Var(Var),
}

/// A static fact about a variable, deduced from assertions during elaboration.
///
/// The map is optimistic: the absence of a fact never implies its negation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum AnalBind {
	Bool(bool),
	Const(Fp),
	Bot,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum VarKind {
	/// A variable allocated by the elaborator for an intermediate value.
	Internal,
	/// A user-supplied input variable.
	Input,
}

pub(crate) struct VarData {
	#[allow(dead_code)] // the kind is recorded for diagnostics; inputs are tracked separately
	pub(crate) kind: VarKind,
}

pub(crate) struct LocData {
	/// How many slots the compound has: the array length, or 2 for a pair.
	pub(crate) arity: usize,
}

/// State threaded through one elaboration.
///
/// Identity counters never go backwards and identities are never reused, so repeated runs of
/// the same program are byte-stable.
pub(crate) struct Env {
	pub(crate) vars: PrimaryMap<Var, VarData>,
	pub(crate) locs: PrimaryMap<Loc, LocData>,
	/// Input variables in declaration order.
	pub(crate) inputs: Vec<Var>,
	/// Slots of compound values: `(location, index) -> binding`.
	pub(crate) obj_map: HashMap<(Loc, usize), ObjBind>,
	/// Static facts per variable.
	pub(crate) anal_map: HashMap<Var, AnalBind>,
}

impl Env {
	pub(crate) fn new() -> Env {
		Env {
			vars: PrimaryMap::new(),
			locs: PrimaryMap::new(),
			inputs: Vec::new(),
			obj_map: HashMap::new(),
			anal_map: HashMap::new(),
		}
	}

	/// Allocates a fresh variable. Input variables are also appended to the input list, so the
	/// list stays duplicate-free and in declaration order by construction.
	pub(crate) fn fresh_var(&mut self, kind: VarKind) -> Var {
		let var = self.vars.push(VarData { kind });
		if kind == VarKind::Input {
			self.inputs.push(var);
		}
		var
	}

	/// Allocates a fresh heap location with the given number of slots.
	pub(crate) fn fresh_loc(&mut self, arity: usize) -> Loc {
		self.locs.push(LocData { arity })
	}

	pub(crate) fn num_vars(&self) -> usize {
		self.vars.len()
	}

	pub(crate) fn arity(&self, loc: Loc) -> usize {
		self.locs[loc].arity
	}

	pub(crate) fn bind(&mut self, loc: Loc, index: usize, bind: ObjBind) {
		self.obj_map.insert((loc, index), bind);
	}

	pub(crate) fn lookup(&self, loc: Loc, index: usize) -> Option<ObjBind> {
		self.obj_map.get(&(loc, index)).copied()
	}
}
