// Copyright 2025 Irreducible Inc.
use std::{collections::BTreeSet, fmt};

use rankone_core::{
	Assignment, Constraint, ConstraintSystem, Fp, LinComb, VarIndex, serialize::write_r1cs,
	verify::verify_constraints,
};

use super::{Program, compile, lower::Hint};
use crate::error::{Error, WitnessError};

/// An artifact that represents a compiled program.
///
/// The difference from [`ConstraintSystem`] is that a circuit retains enough information to
/// generate witnesses: the solver hints recorded during lowering and the set of variables the
/// system actually mentions.
pub struct Circuit {
	constraint_system: ConstraintSystem,
	hints: Vec<Hint>,
	n_bool_ranges: usize,
	/// Variables mentioned by any constraint or designated as an output. Witness generation
	/// must determine exactly these; variables the elaborator allocated but nothing ever
	/// constrained stay unassigned.
	used_vars: BTreeSet<VarIndex>,
}

impl Circuit {
	/// Creates a new circuit. Only used by [`compile`].
	pub(super) fn new(
		constraint_system: ConstraintSystem,
		hints: Vec<Hint>,
		n_bool_ranges: usize,
	) -> Self {
		let mut used_vars = BTreeSet::new();
		for constraint in &constraint_system.constraints {
			for (_, operand) in constraint.operands() {
				used_vars.extend(operand.terms.iter().map(|&(var, _)| var));
			}
		}
		used_vars.extend(constraint_system.output_vars.iter().copied());
		Self {
			constraint_system,
			hints,
			n_bool_ranges,
			used_vars,
		}
	}

	/// Returns the constraint system for this circuit.
	pub fn constraint_system(&self) -> &ConstraintSystem {
		&self.constraint_system
	}

	/// Total number of variables.
	pub fn n_vars(&self) -> usize {
		self.constraint_system.num_vars
	}

	/// Number of rank-1 constraints, boolean range constraints included.
	pub fn n_constraints(&self) -> usize {
		self.constraint_system.n_constraints()
	}

	/// Number of boolean range constraints `b·(b−1) = 0` among the total.
	pub fn n_bool_ranges(&self) -> usize {
		self.n_bool_ranges
	}

	/// Number of solver hints.
	pub fn n_hints(&self) -> usize {
		self.hints.len()
	}

	/// The designated output variables. A singleton for scalar programs.
	pub fn output_vars(&self) -> &[VarIndex] {
		&self.constraint_system.output_vars
	}

	/// Generates a witness from the given input values.
	///
	/// Inputs are bound positionally to the declared input variables, then hints and
	/// constraints are propagated to a fixed point: any constraint with exactly one unknown
	/// variable occurring linearly is solved for it. Constraints that end up fully determined
	/// but violated are left for [`verify_constraints`] so that an unsatisfiable-but-complete
	/// witness can still be reported as `sat = false`.
	pub fn witness(&self, inputs: &[Fp]) -> Result<Assignment, WitnessError> {
		let cs = &self.constraint_system;
		if inputs.len() != cs.input_vars.len() {
			return Err(WitnessError::InputArityMismatch {
				expected: cs.input_vars.len(),
				actual: inputs.len(),
			});
		}
		let mut assignment = Assignment::new(cs.num_vars);
		for (&var, &value) in cs.input_vars.iter().zip(inputs) {
			assignment.set(var, value);
		}

		let mut rounds = 0usize;
		loop {
			rounds += 1;
			let mut progress = false;
			for hint in &self.hints {
				progress |= solve_hint(hint, &mut assignment)?;
			}
			for constraint in &cs.constraints {
				progress |= solve_constraint(constraint, &mut assignment)?;
			}
			if !progress {
				break;
			}
		}
		tracing::debug!(rounds, "witness propagation reached a fixed point");

		for &var in &self.used_vars {
			if assignment.get(var).is_none() {
				return Err(WitnessError::UnderDetermined { var });
			}
		}
		Ok(assignment)
	}
}

/// Partial evaluation of an affine form against an incomplete assignment.
enum Partial {
	/// Every variable is assigned; the form evaluates to this value.
	Known(Fp),
	/// Exactly one variable is unassigned; the form is `rest + coeff·var`.
	OneUnknown {
		var: VarIndex,
		coeff: Fp,
		rest: Fp,
	},
	/// Two or more variables are unassigned.
	Opaque,
}

fn partial_eval(form: &LinComb, assignment: &Assignment) -> Partial {
	let mut rest = form.constant;
	let mut unknown = None;
	for &(var, coeff) in &form.terms {
		match assignment.get(var) {
			Some(value) => rest += coeff * value,
			None if unknown.is_none() => unknown = Some((var, coeff)),
			None => return Partial::Opaque,
		}
	}
	match unknown {
		None => Partial::Known(rest),
		Some((var, coeff)) => Partial::OneUnknown { var, coeff, rest },
	}
}

fn assign(assignment: &mut Assignment, var: VarIndex, value: Fp) -> Result<bool, WitnessError> {
	match assignment.get(var) {
		Some(existing) if existing != value => Err(WitnessError::Overdetermined {
			var,
			existing,
			computed: value,
		}),
		Some(_) => Ok(false),
		None => {
			assignment.set(var, value);
			Ok(true)
		}
	}
}

fn solve_hint(hint: &Hint, assignment: &mut Assignment) -> Result<bool, WitnessError> {
	match hint {
		Hint::InverseOrZero { x, out } => {
			let Some(x) = x.eval(assignment) else {
				return Ok(false);
			};
			assign(assignment, *out, x.inv().unwrap_or(Fp::ZERO))
		}
		Hint::Quotient { num, den, out } => {
			let (Some(num), Some(den)) = (num.eval(assignment), den.eval(assignment)) else {
				return Ok(false);
			};
			let value = num
				.checked_div(den)
				.ok_or(WitnessError::DivByZero { var: *out })?;
			assign(assignment, *out, value)
		}
	}
}

/// Solves `known · (rest + coeff·var) = product` for `var`. A zero known factor annihilates
/// the product and determines nothing.
fn solve_factor(
	known: Fp,
	var: VarIndex,
	coeff: Fp,
	rest: Fp,
	product: Fp,
	assignment: &mut Assignment,
) -> Result<bool, WitnessError> {
	let Some(known_inv) = known.inv() else {
		return Ok(false);
	};
	let coeff_inv = coeff.inv().expect("normalised forms carry no zero coefficients");
	assign(assignment, var, (product * known_inv - rest) * coeff_inv)
}

fn solve_constraint(
	constraint: &Constraint,
	assignment: &mut Assignment,
) -> Result<bool, WitnessError> {
	let a = partial_eval(&constraint.a, assignment);
	let b = partial_eval(&constraint.b, assignment);
	let c = partial_eval(&constraint.c, assignment);
	match (a, b, c) {
		(Partial::Known(a), Partial::Known(b), Partial::OneUnknown { var, coeff, rest }) => {
			let coeff_inv = coeff.inv().expect("normalised forms carry no zero coefficients");
			assign(assignment, var, (a * b - rest) * coeff_inv)
		}
		(Partial::Known(a), Partial::OneUnknown { var, coeff, rest }, Partial::Known(c)) => {
			solve_factor(a, var, coeff, rest, c, assignment)
		}
		(Partial::OneUnknown { var, coeff, rest }, Partial::Known(b), Partial::Known(c)) => {
			solve_factor(b, var, coeff, rest, c, assignment)
		}
		_ => Ok(false),
	}
}

/// The result of an end-to-end [`check`].
#[derive(Debug)]
pub struct CheckOutcome {
	/// Whether the generated witness satisfies every constraint.
	pub sat: bool,
	/// Total number of variables in the compiled system.
	pub num_vars: usize,
	/// Total number of constraints in the compiled system.
	pub num_constraints: usize,
	/// The witnessed value of the designated output variable.
	pub result: Fp,
	/// The textual dump of the constraint system, for an external prover.
	pub serialized_r1cs: String,
}

impl CheckOutcome {
	/// The one-line result record printed by test drivers.
	pub fn record(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for CheckOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"sat = {}, vars = {}, constraints = {}, result = {}",
			self.sat, self.num_vars, self.num_constraints, self.result
		)
	}
}

/// Compiles the program, generates a witness from `inputs`, checks satisfiability and renders
/// the serialized constraint system.
pub fn check(program: &Program, inputs: &[Fp]) -> Result<CheckOutcome, Error> {
	let circuit = compile(program)?;
	let assignment = circuit.witness(inputs)?;
	let cs = circuit.constraint_system();
	let sat = verify_constraints(cs, &assignment).is_ok();
	let result = assignment
		.get(cs.output_vars[0])
		.expect("witness generation determines the output variable");
	Ok(CheckOutcome {
		sat,
		num_vars: cs.num_vars,
		num_constraints: cs.n_constraints(),
		result,
		serialized_r1cs: write_r1cs(cs),
	})
}
