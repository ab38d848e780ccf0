//! Library errors.

use thiserror::Error;

use crate::graph::TermId;

/// Library result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by grammar queries.
///
/// Empty parse results are values, not errors: `parse_full` returning an
/// empty set means "input not in language". The only failure modes are
/// misuse of a recursion handle.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("recursion {0} queried before a body was bound")]
    UnboundRecursion(TermId),

    #[error("recursion {0} already has a body bound")]
    AlreadyBound(TermId),
}
