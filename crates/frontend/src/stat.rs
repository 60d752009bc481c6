// Copyright 2025 Irreducible Inc.

//! Circuit statistics module for inspecting constraint counts and circuit complexity.

use crate::compiler::circuit::Circuit;

/// Various stats of a circuit that affect the prover performance.
#[derive(Debug, serde::Serialize)]
pub struct CircuitStat {
	/// Total number of variables in the constraint system.
	pub n_vars: usize,
	/// Number of user-supplied input variables.
	pub n_inputs: usize,
	/// Total number of rank-1 constraints.
	pub n_constraints: usize,
	/// Number of boolean range constraints `b·(b−1) = 0` among the total.
	pub n_bool_ranges: usize,
	/// Number of solver hints.
	///
	/// Directly proportional to the amount of non-linear solving during witness generation.
	pub n_hints: usize,
}

impl CircuitStat {
	/// Creates a new `CircuitStat` instance by collecting statistics from the given circuit.
	pub fn collect(circuit: &Circuit) -> Self {
		CircuitStat {
			n_vars: circuit.n_vars(),
			n_inputs: circuit.constraint_system().input_vars.len(),
			n_constraints: circuit.n_constraints(),
			n_bool_ranges: circuit.n_bool_ranges(),
			n_hints: circuit.n_hints(),
		}
	}

	/// Renders the stats as pretty-printed JSON.
	pub fn to_json(&self) -> String {
		serde_json::to_string_pretty(self).unwrap()
	}
}
