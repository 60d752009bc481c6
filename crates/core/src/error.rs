// Copyright 2025 Irreducible Inc.
//! Hosts error definitions for the core crate.

/// Constraint system related error.
#[allow(missing_docs)] // errors are self-documenting
#[derive(Debug, thiserror::Error)]
pub enum ConstraintSystemError {
	#[error(
		"constraint #{constraint_index} refers to out-of-range variable x{var} in its {operand_name} operand (num_vars = {num_vars})"
	)]
	OutOfRangeVariable {
		constraint_index: usize,
		operand_name: &'static str,
		var: u32,
		num_vars: usize,
	},
	#[error("input variable x{var} is out of range (num_vars = {num_vars})")]
	InputOutOfRange { var: u32, num_vars: usize },
	#[error("the input variable list mentions x{var} twice")]
	DuplicateInput { var: u32 },
	#[error("output variable x{var} is out of range (num_vars = {num_vars})")]
	OutputOutOfRange { var: u32, num_vars: usize },
}
