// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Parser combinators over Brzozowski derivatives of context-free
//! languages.
//!
//! A grammar is built by composing small parser terms — [`empty`],
//! [`epsilon`], [`terminal`], [`alt`], [`con`], [`red`], [`rep`], and
//! [`recursion`] for self-reference — into a shared, possibly cyclic term
//! graph. Recognition takes no tables and no lookahead: feeding an input
//! repeatedly replaces the grammar with its *derivative* by the next
//! terminal, and when the input runs out, the values the residual grammar
//! assigns to the empty string are the parse forest.
//!
//! # Design
//!
//! - Terms are shared `Rc` handles; grammars are graphs, not trees, and
//!   cycles through [`recursion`] are expected (left recursion works).
//! - `empty?`, `nullable?`, and the null-parse forest are computed by a
//!   worklist fix-point over the reachable graph, so cyclic attribute
//!   equations converge instead of recursing forever.
//! - Derivatives are memoized per term and terminal with stable identity,
//!   which keeps the derivative graph of a finite grammar finite.
//! - Local compaction rules run during derivative construction, bounding
//!   graph growth by grammar size rather than input length.
//!
//! # Examples
//!
//! ```
//! use residual::{alt, con, epsilon, recursion, red, terminal};
//!
//! // L = ε | L 'a' — a left-recursive list of 'a's.
//! let list = recursion::<char, Vec<char>>();
//! let grow = red(
//!     con(list.parser(), terminal('a')),
//!     |(mut items, a): (Vec<char>, char)| {
//!         items.push(a);
//!         items
//!     },
//! );
//! list.bind(alt([epsilon([Vec::new()]), grow]))?;
//!
//! let forest = list.parser().parse_full(&['a', 'a'])?;
//! assert!(forest.contains(&vec!['a', 'a']));
//! # Ok::<(), residual::Error>(())
//! ```
//!
//! Results are sets ([`indexmap::IndexSet`], deterministic iteration):
//! an empty forest means "not in the language", never an error. The only
//! errors are misused recursion handles; see [`Error`].

mod error;
mod fixpoint;
mod graph;
mod term;

pub use error::{Error, Result};
pub use graph::{Label, TermGraph, TermId, TermNode};
pub use term::{
    alt, con, derivative_future, empty, epsilon, recursion, red, rep, terminal, Parser, Recursion,
    Terminal, Value,
};
