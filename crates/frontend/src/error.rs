// Copyright 2025 Irreducible Inc.
//! Hosts error definitions for the frontend crate.

use rankone_core::{Fp, VarIndex};

use crate::texp::Loc;

/// Error raised while elaborating or compiling a program.
#[allow(missing_docs)] // errors are self-documenting
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
	#[error("cannot allocate an array of length zero")]
	ZeroSizedArray,
	#[error("expected a heap location, found a scalar expression")]
	NotALocation,
	#[error("heap location {loc:?} has no binding at index {index}")]
	UnboundIndex { loc: Loc, index: usize },
	#[error("internal invariant violated: {0}")]
	InternalInvariant(String),
}

/// Error raised while generating a witness for a compiled circuit.
#[allow(missing_docs)] // errors are self-documenting
#[derive(Debug, thiserror::Error)]
pub enum WitnessError {
	#[error("expected {expected} input values, got {actual}")]
	InputArityMismatch { expected: usize, actual: usize },
	#[error("division by zero while solving {var}")]
	DivByZero { var: VarIndex },
	#[error("the constraint system is under-determined: {var} was never assigned")]
	UnderDetermined { var: VarIndex },
	#[error("conflicting assignments for {var}: {existing} vs {computed}")]
	Overdetermined {
		var: VarIndex,
		existing: Fp,
		computed: Fp,
	},
}

/// Any failure of the end-to-end [`check`][crate::check] pipeline.
#[allow(missing_docs)] // errors are self-documenting
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Build(#[from] BuildError),
	#[error(transparent)]
	Witness(#[from] WitnessError),
}
