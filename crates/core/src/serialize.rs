// Copyright 2025 Irreducible Inc.
//! Line-oriented textual form of a constraint system, for handing off to an external prover.
//!
//! The format is lossless and stable:
//!
//! ```text
//! p <modulus>
//! vars <num_vars>
//! inputs <v>...
//! outputs <v>...
//! constraints <n>
//! <A> & <B> & <C>        (one line per constraint)
//! ```
//!
//! Each operand is a sparse affine form written as `<constant> <nterms> (<var> <coeff>)*` with
//! all coefficients as canonical residues in `[0, p)`. [`parse_r1cs`] round-trips the output of
//! [`write_r1cs`] exactly.

use std::fmt;

use crate::{
	constraint_system::{Constraint, ConstraintSystem, LinComb, VarIndex},
	error::ConstraintSystemError,
	field::{Fp, MODULUS},
};

/// Error raised by [`parse_r1cs`].
#[allow(missing_docs)] // errors are self-documenting
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
	#[error("line {line}: expected a `{expected}` header")]
	MissingHeader { line: usize, expected: &'static str },
	#[error("line {line}: malformed integer")]
	BadInteger { line: usize },
	#[error("the dump was produced for modulus {found}, expected {MODULUS}")]
	WrongModulus { found: u64 },
	#[error("line {line}: malformed constraint: {what}")]
	MalformedConstraint { line: usize, what: &'static str },
	#[error("expected {expected} constraint lines, found {actual}")]
	WrongConstraintCount { expected: usize, actual: usize },
	#[error(transparent)]
	Invalid(#[from] ConstraintSystemError),
}

struct OperandText<'a>(&'a LinComb);

impl fmt::Display for OperandText<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.0.constant.as_u64(), self.0.terms.len())?;
		for &(var, coeff) in &self.0.terms {
			write!(f, " {} {}", var.0, coeff.as_u64())?;
		}
		Ok(())
	}
}

struct SystemText<'a>(&'a ConstraintSystem);

impl fmt::Display for SystemText<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "p {MODULUS}")?;
		writeln!(f, "vars {}", self.0.num_vars)?;
		write!(f, "inputs")?;
		for var in &self.0.input_vars {
			write!(f, " {}", var.0)?;
		}
		writeln!(f)?;
		write!(f, "outputs")?;
		for var in &self.0.output_vars {
			write!(f, " {}", var.0)?;
		}
		writeln!(f)?;
		writeln!(f, "constraints {}", self.0.constraints.len())?;
		for constraint in &self.0.constraints {
			writeln!(
				f,
				"{} & {} & {}",
				OperandText(&constraint.a),
				OperandText(&constraint.b),
				OperandText(&constraint.c)
			)?;
		}
		Ok(())
	}
}

/// Renders the constraint system in the textual form described in the module docs.
pub fn write_r1cs(cs: &ConstraintSystem) -> String {
	SystemText(cs).to_string()
}

fn parse_u64(token: &str, line: usize) -> Result<u64, ParseError> {
	token.parse().map_err(|_| ParseError::BadInteger { line })
}

fn parse_header<'a>(
	text: Option<&'a str>,
	line: usize,
	expected: &'static str,
) -> Result<impl Iterator<Item = &'a str>, ParseError> {
	let mut tokens = text
		.ok_or(ParseError::MissingHeader { line, expected })?
		.split_whitespace();
	if tokens.next() != Some(expected) {
		return Err(ParseError::MissingHeader { line, expected });
	}
	Ok(tokens)
}

fn parse_var_list(
	text: Option<&str>,
	line: usize,
	expected: &'static str,
) -> Result<Vec<VarIndex>, ParseError> {
	parse_header(text, line, expected)?
		.map(|token| Ok(VarIndex(parse_u64(token, line)? as u32)))
		.collect()
}

fn parse_operand<'a>(
	tokens: &mut impl Iterator<Item = &'a str>,
	line: usize,
) -> Result<LinComb, ParseError> {
	let mut next = |tokens: &mut dyn Iterator<Item = &'a str>| {
		let token = tokens.next().ok_or(ParseError::MalformedConstraint {
			line,
			what: "operand is truncated",
		})?;
		parse_u64(token, line)
	};
	let constant = Fp::new(next(tokens)?);
	let n_terms = next(tokens)?;
	let mut terms = Vec::with_capacity(n_terms as usize);
	for _ in 0..n_terms {
		let var = VarIndex(next(tokens)? as u32);
		let coeff = Fp::new(next(tokens)?);
		terms.push((var, coeff));
	}
	Ok(LinComb::from_terms(constant, terms))
}

fn parse_constraint(text: &str, line: usize) -> Result<Constraint, ParseError> {
	let mut sides = text.split('&');
	let mut operand = || -> Result<LinComb, ParseError> {
		let side = sides.next().ok_or(ParseError::MalformedConstraint {
			line,
			what: "expected three `&`-separated operands",
		})?;
		let mut tokens = side.split_whitespace();
		let operand = parse_operand(&mut tokens, line)?;
		if tokens.next().is_some() {
			return Err(ParseError::MalformedConstraint {
				line,
				what: "trailing tokens after operand",
			});
		}
		Ok(operand)
	};
	let a = operand()?;
	let b = operand()?;
	let c = operand()?;
	if sides.next().is_some() {
		return Err(ParseError::MalformedConstraint {
			line,
			what: "more than three operands",
		});
	}
	Ok(Constraint { a, b, c })
}

/// Parses the textual form produced by [`write_r1cs`]. The result is validated.
pub fn parse_r1cs(text: &str) -> Result<ConstraintSystem, ParseError> {
	let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));
	let mut take = || lines.next().unwrap_or((0, ""));

	let (line, header) = take();
	let mut tokens = parse_header(Some(header), line, "p")?;
	let found = parse_u64(tokens.next().unwrap_or(""), line)?;
	if found != MODULUS {
		return Err(ParseError::WrongModulus { found });
	}

	let (line, header) = take();
	let mut tokens = parse_header(Some(header), line, "vars")?;
	let num_vars = parse_u64(tokens.next().unwrap_or(""), line)? as usize;

	let (line, header) = take();
	let input_vars = parse_var_list(Some(header), line, "inputs")?;
	let (line, header) = take();
	let output_vars = parse_var_list(Some(header), line, "outputs")?;

	let (line, header) = take();
	let mut tokens = parse_header(Some(header), line, "constraints")?;
	let expected = parse_u64(tokens.next().unwrap_or(""), line)? as usize;

	let mut constraints = Vec::with_capacity(expected);
	for (line, text) in lines {
		if text.trim().is_empty() {
			continue;
		}
		constraints.push(parse_constraint(text, line)?);
	}
	if constraints.len() != expected {
		return Err(ParseError::WrongConstraintCount {
			expected,
			actual: constraints.len(),
		});
	}

	let cs = ConstraintSystem {
		constraints,
		num_vars,
		input_vars,
		output_vars,
	};
	cs.validate()?;
	Ok(cs)
}
