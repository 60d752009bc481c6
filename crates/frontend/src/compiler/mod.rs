// Copyright 2025 Irreducible Inc.
use rankone_core::Fp;

use crate::{
	error::BuildError,
	texp::{self, Binop, TExp, Unop, Value, Var},
};

mod analysis;
pub mod circuit;
mod compound;
pub(crate) mod env;
mod lower;

use env::{Env, VarKind};
pub use lower::compile;

/// Options for the elaborator.
pub(crate) struct Options {
	/// Whether the smart sequence constructor drops pure subexpressions from non-final
	/// positions. Semantics-neutral; turning it off keeps the full program shape around,
	/// which is occasionally useful when staring at the IR.
	prune_pure_seq: bool,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			prune_pure_seq: true,
		}
	}
}

impl Options {
	fn from_env() -> Self {
		// This is a very temporary solution for now.
		//
		// We do not expect to grow many knobs here, nor for the ones we have to be driven by
		// environment variables for long.
		let mut opts = Self::default();
		if std::env::var("RANKONE_KEEP_PURE_SEQ").is_ok() {
			opts.prune_pure_seq = false;
		}
		opts
	}
}

/// An elaborated program, ready for [`compile`].
pub struct Program {
	/// The program as one expression: the effect prefix glued to the result.
	pub expr: TExp,
	/// Total number of variables the elaborator allocated.
	pub num_vars: usize,
	/// Input variables in declaration order.
	pub inputs: Vec<Var>,
}

/// Program builder for constructing constraint-system programs.
///
/// `ProgramBuilder` provides the primary interface for writing programs in the small typed
/// language this crate compiles. You describe your computation by allocating variables and
/// compound values and combining them with arithmetic, boolean and conditional operations;
/// the builder elaborates this into an expression tree that [`compile`] lowers to rank-1
/// constraints.
///
/// # Program Model
///
/// Combinator methods return expressions ([`TExp`]) and record any constraint-producing
/// effects (assertions from `set` and `pair`) in program order inside the builder. Calling
/// [`finish`] glues the recorded effects and the final result into one expression with the
/// smart sequence constructor, which flattens nested sequences and drops dead pure
/// subexpressions.
///
/// # Values
///
/// **Scalars** — field elements and booleans flow through expressions directly. Booleans are
/// encoded as `1`/`0`; every boolean-typed variable picks up an implicit `b·(b−1) = 0` range
/// constraint during lowering, emitted once per variable.
///
/// **Inputs** — variables declared with [`fresh_input`] or [`input_arr`] are supplied by the
/// caller at witness time, in declaration order.
///
/// **Compounds** — arrays and pairs live on the elaborator's heap and are passed around as
/// location references. Indexing is resolved at elaboration time, so `get`/`set` cost no
/// constraints; only genuinely new values do.
///
/// **Bottom** — [`TExp::Bot`] marks statically-unreachable values. It absorbs every operation
/// it touches and never emits constraints.
///
/// # Branch pruning
///
/// [`if_then_else`] takes its branches as closures. When the condition is statically known
/// (a literal, or a variable with a recorded fact) only the live branch is run: the dead
/// branch's constraints *and* its allocation effects are skipped entirely.
///
/// [`finish`]: Self::finish
/// [`fresh_input`]: Self::fresh_input
/// [`if_then_else`]: Self::if_then_else
/// [`input_arr`]: Self::input_arr
pub struct ProgramBuilder {
	pub(crate) env: Env,
	/// Effect expressions recorded so far, in program order.
	program: Vec<TExp>,
	opts: Options,
}

impl Default for ProgramBuilder {
	fn default() -> Self {
		ProgramBuilder::new()
	}
}

impl ProgramBuilder {
	/// Create a new program builder with default options.
	pub fn new() -> Self {
		let opts = Options::from_env();
		Self::with_opts(opts)
	}

	pub(crate) fn with_opts(opts: Options) -> Self {
		ProgramBuilder {
			env: Env::new(),
			program: Vec::new(),
			opts,
		}
	}

	/// Finishes elaboration, gluing the recorded effects and `result` into the program
	/// expression.
	pub fn finish(mut self, result: TExp) -> Program {
		self.program.push(result);
		let expr = texp::seq_all(self.program, self.opts.prune_pure_seq);
		Program {
			expr,
			num_vars: self.env.num_vars(),
			inputs: self.env.inputs,
		}
	}

	/// Allocates a fresh variable.
	pub fn fresh_var(&mut self) -> TExp {
		TExp::Var(self.env.fresh_var(VarKind::Internal))
	}

	/// Allocates a fresh variable and designates it as a user-supplied input.
	///
	/// Inputs are consumed at witness time in declaration order.
	pub fn fresh_input(&mut self) -> TExp {
		TExp::Var(self.env.fresh_var(VarKind::Input))
	}

	/// The unit literal.
	pub fn unit(&self) -> TExp {
		TExp::Val(Value::Unit)
	}

	/// A boolean literal.
	pub fn boolean(&self, value: bool) -> TExp {
		TExp::Val(if value { Value::True } else { Value::False })
	}

	/// A field constant. Integer and signed literals lower through [`Fp`]'s conversions.
	pub fn field(&self, value: impl Into<Fp>) -> TExp {
		TExp::Val(Value::Field(value.into()))
	}

	fn unop(&self, op: Unop, e: &TExp) -> TExp {
		if self.env.is_bot(e) {
			TExp::Bot
		} else {
			TExp::Unop(op, Box::new(e.clone()))
		}
	}

	fn binop(&self, op: Binop, lhs: &TExp, rhs: &TExp) -> TExp {
		if self.env.is_bot(lhs) || self.env.is_bot(rhs) {
			TExp::Bot
		} else {
			TExp::Binop(op, Box::new(lhs.clone()), Box::new(rhs.clone()))
		}
	}

	/// Field negation.
	///
	/// # Cost
	///
	/// 0 constraints; negation stays affine.
	pub fn neg(&self, e: &TExp) -> TExp {
		self.unop(Unop::Neg, e)
	}

	/// Boolean negation.
	///
	/// # Cost
	///
	/// 0 constraints beyond the operand's range constraint.
	pub fn not(&self, e: &TExp) -> TExp {
		self.unop(Unop::Not, e)
	}

	/// Field addition.
	///
	/// # Cost
	///
	/// 0 constraints; addition stays affine.
	pub fn add(&self, lhs: &TExp, rhs: &TExp) -> TExp {
		self.binop(Binop::Add, lhs, rhs)
	}

	/// Field subtraction.
	///
	/// # Cost
	///
	/// 0 constraints; subtraction stays affine.
	pub fn sub(&self, lhs: &TExp, rhs: &TExp) -> TExp {
		self.binop(Binop::Sub, lhs, rhs)
	}

	/// Field multiplication.
	///
	/// # Cost
	///
	/// 1 rank-1 constraint, or 0 when either operand is a constant.
	pub fn mul(&self, lhs: &TExp, rhs: &TExp) -> TExp {
		self.binop(Binop::Mul, lhs, rhs)
	}

	/// Field division.
	///
	/// Witness generation fails with `DivByZero` whenever the divisor evaluates to zero;
	/// `0/0` is not special-cased.
	///
	/// # Cost
	///
	/// 1 rank-1 constraint plus a solver hint.
	pub fn div(&self, lhs: &TExp, rhs: &TExp) -> TExp {
		self.binop(Binop::Div, lhs, rhs)
	}

	/// Boolean conjunction.
	///
	/// # Cost
	///
	/// 1 rank-1 constraint plus operand range constraints.
	pub fn and(&self, lhs: &TExp, rhs: &TExp) -> TExp {
		self.binop(Binop::And, lhs, rhs)
	}

	/// Boolean disjunction.
	///
	/// # Cost
	///
	/// 1 rank-1 constraint plus operand range constraints.
	pub fn or(&self, lhs: &TExp, rhs: &TExp) -> TExp {
		self.binop(Binop::Or, lhs, rhs)
	}

	/// Boolean exclusive or.
	///
	/// # Cost
	///
	/// 1 rank-1 constraint plus operand range constraints.
	pub fn xor(&self, lhs: &TExp, rhs: &TExp) -> TExp {
		self.binop(Binop::Xor, lhs, rhs)
	}

	/// Field equality, producing a boolean.
	///
	/// # Cost
	///
	/// 2 rank-1 constraints plus an inverse solver hint.
	pub fn eq(&self, lhs: &TExp, rhs: &TExp) -> TExp {
		self.binop(Binop::Eq, lhs, rhs)
	}

	/// Boolean equality.
	///
	/// # Cost
	///
	/// 1 rank-1 constraint plus operand range constraints.
	pub fn beq(&self, lhs: &TExp, rhs: &TExp) -> TExp {
		self.binop(Binop::BEq, lhs, rhs)
	}

	/// Boolean implication, `lhs → rhs`.
	pub fn implies(&self, lhs: &TExp, rhs: &TExp) -> TExp {
		self.or(&self.not(lhs), rhs)
	}

	/// Is the expression zero?
	pub fn zeq(&self, e: &TExp) -> TExp {
		self.eq(e, &self.field(0u64))
	}

	/// Conditional.
	///
	/// The branches are closures so that a statically-decided condition prunes the dead
	/// branch entirely — no constraints are emitted for it and none of its side effects
	/// happen. An undefined condition makes the whole expression undefined.
	///
	/// # Cost
	///
	/// 1 rank-1 constraint when the condition is dynamic, 0 otherwise.
	pub fn if_then_else(
		&mut self,
		cond: &TExp,
		then_branch: impl FnOnce(&mut Self) -> Result<TExp, BuildError>,
		else_branch: impl FnOnce(&mut Self) -> Result<TExp, BuildError>,
	) -> Result<TExp, BuildError> {
		if self.env.is_bot(cond) {
			return Ok(TExp::Bot);
		}
		if self.env.is_true(cond) {
			let taken = then_branch(self)?;
			return Ok(self.seq2(cond.clone(), taken));
		}
		if self.env.is_false(cond) {
			let taken = else_branch(self)?;
			return Ok(self.seq2(cond.clone(), taken));
		}
		let then_expr = self.scoped(then_branch)?;
		let else_expr = self.scoped(else_branch)?;
		Ok(TExp::If(
			Box::new(cond.clone()),
			Box::new(then_expr),
			Box::new(else_expr),
		))
	}

	/// Right fold of `f` over `[0, n]`: `f(0, f(1, ... f(n, init)))`. Unrolled at elaboration
	/// time.
	pub fn iter(
		&mut self,
		n: usize,
		mut f: impl FnMut(&mut Self, usize, &TExp) -> Result<TExp, BuildError>,
		init: &TExp,
	) -> Result<TExp, BuildError> {
		let mut acc = init.clone();
		for i in (0..=n).rev() {
			acc = f(self, i, &acc)?;
		}
		Ok(acc)
	}

	/// The sum of `f(i)` for `i` in `[0, n]`.
	pub fn bigsum(
		&mut self,
		n: usize,
		mut f: impl FnMut(&mut Self, usize) -> Result<TExp, BuildError>,
	) -> Result<TExp, BuildError> {
		let zero = self.field(0u64);
		self.iter(
			n,
			|builder, i, acc| {
				let summand = f(builder, i)?;
				Ok(builder.add(&summand, acc))
			},
			&zero,
		)
	}

	/// Runs the effectful computation `n` times, discarding its results.
	pub fn times(
		&mut self,
		n: usize,
		mut f: impl FnMut(&mut Self) -> Result<TExp, BuildError>,
	) -> Result<TExp, BuildError> {
		for _ in 0..n {
			let effect = f(self)?;
			self.emit(effect);
		}
		Ok(self.unit())
	}

	/// Runs the effectful computation once per item, discarding its results.
	pub fn forall<T>(
		&mut self,
		items: impl IntoIterator<Item = T>,
		mut f: impl FnMut(&mut Self, T) -> Result<TExp, BuildError>,
	) -> Result<TExp, BuildError> {
		for item in items {
			let effect = f(self, item)?;
			self.emit(effect);
		}
		Ok(self.unit())
	}

	/// Runs the effectful computation once per pair drawn from the two slices.
	pub fn forall_pairs<T: Clone, U: Clone>(
		&mut self,
		(xs, ys): (&[T], &[U]),
		mut f: impl FnMut(&mut Self, T, U) -> Result<TExp, BuildError>,
	) -> Result<TExp, BuildError> {
		for x in xs {
			for y in ys {
				let effect = f(self, x.clone(), y.clone())?;
				self.emit(effect);
			}
		}
		Ok(self.unit())
	}

	/// Records an effect expression in program order.
	pub(crate) fn emit(&mut self, effect: TExp) {
		self.program.push(effect);
	}

	/// Allocates a fresh variable asserted equal to `expr`, recording any static fact the
	/// assertion reveals.
	pub(crate) fn assert_fresh(&mut self, expr: TExp) -> Var {
		let var = self.env.fresh_var(VarKind::Internal);
		self.env.record_assert(var, &expr);
		self.emit(TExp::Assert(var, Box::new(expr)));
		var
	}

	/// Runs `f` with its effects collected into the returned expression instead of the
	/// program. This is what lets conditional branches be pruned wholesale.
	fn scoped(
		&mut self,
		f: impl FnOnce(&mut Self) -> Result<TExp, BuildError>,
	) -> Result<TExp, BuildError> {
		let mark = self.program.len();
		let result = f(self)?;
		let mut effects = self.program.split_off(mark);
		effects.push(result);
		Ok(texp::seq_all(effects, self.opts.prune_pure_seq))
	}

	fn seq2(&self, first: TExp, second: TExp) -> TExp {
		texp::seq(first, second, self.opts.prune_pure_seq)
	}
}
