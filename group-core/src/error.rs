//! Error kinds for every fallible operation in the engine (spec.md §7).

use thiserror::Error;

/// Everything that can go wrong between "a caller hands us matrices" and
/// "the service facade hands back a string".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The generator list itself is malformed: negative tolerance, no
    /// generators, mismatched dimensions, or a non-unit determinant.
    #[error("invalid input: {0}")]
    InputInvalid(String),

    /// The closure loop exceeded `max_order` before the frontier emptied.
    #[error("closure exceeded bound of {max_order} elements")]
    ClosureExceeded {
        /// The bound that was exceeded.
        max_order: usize,
    },

    /// A Cayley-table entry could not be resolved against the element list.
    /// Unreachable given a valid `MatrixClosure` result; checked defensively.
    #[error("group not closed: product of elements {a} and {b} is not in the element list")]
    NotClosed {
        /// Index of the left operand.
        a: usize,
        /// Index of the right operand.
        b: usize,
    },

    /// A command string did not have the `Cmd[Arg]` shape.
    #[error("command string is not of the form Cmd[Arg]")]
    ParseError,

    /// The command name is not in the facade's dictionary.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The argument did not resolve to a known group name.
    #[error("unknown group: {0}")]
    UnknownGroup(String),

    /// Reserved for decompositions that a caller explicitly declines to
    /// compute (kept for interface parity with the original design; the
    /// engine itself always computes `direct_product`/`semidirect_product`).
    #[error("not implemented")]
    NotImplemented,

    /// Any other execution fault the facade should surface rather than
    /// propagate as a panic.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
