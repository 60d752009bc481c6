// Copyright 2025 Irreducible Inc.
//! Core datatypes common to the compiler and witness engine of Rankone.
//!
//! Most importantly it hosts the definition of a [`ConstraintSystem`] — a bag of rank-1
//! constraints `A · B = C` over affine forms in a prime field — together with the
//! [satisfiability check][`verify`] and the [textual dump][`serialize`] consumed by an
//! external prover.

#![warn(missing_docs)]

pub mod constraint_system;
pub mod error;
pub mod field;
pub mod serialize;
pub mod verify;

pub use constraint_system::*;
pub use error::ConstraintSystemError;
pub use field::Fp;
