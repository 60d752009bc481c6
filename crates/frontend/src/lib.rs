// Copyright 2025 Irreducible Inc.

//! Program construction frontend for Rankone.
//!
//! This crate provides the [`ProgramBuilder`] API for writing programs in a small typed
//! arithmetic/boolean language that compiles to rank-1 constraint systems over a prime field.
//! You describe your computation by allocating variables and inputs, building arrays and
//! pairs, and combining expressions with arithmetic, comparison, boolean and conditional
//! operations; iteration helpers unroll loops at elaboration time.
//!
//! # Usage Flow
//!
//! Use [`ProgramBuilder`] to elaborate your program into an expression tree, then call
//! [`finish`](ProgramBuilder::finish) with the result expression to obtain a [`Program`].
//! [`compile`] lowers the program to a [`Circuit`] — the rank-1 constraint system plus
//! everything needed for witness generation. [`Circuit::witness`] turns concrete input values
//! into a complete variable assignment by propagating through the constraints.
//!
//! [`check`] composes the whole pipeline and reports satisfiability, system size, the
//! witnessed output value and the serialized constraint system in one [`CheckOutcome`].
//!
//! Use [`CircuitStat`] to inspect metrics like constraint counts, helpful for optimization
//! and debugging.

#![warn(missing_docs)]

mod compiler;
mod error;
pub mod stat;
pub mod texp;

pub use compiler::{
	Program, ProgramBuilder,
	circuit::{CheckOutcome, Circuit, check},
	compile,
};
pub use error::{BuildError, Error, WitnessError};
pub use stat::CircuitStat;
