//! Self-balancing binary search tree where the heights of the two child subtrees of any node
//! differ by at most one.

mod cursor;
mod node;
mod set;
mod tree;

pub use self::cursor::Cursor;
pub use self::set::{AvlSet, AvlSetIntoIter, AvlSetIter};

use std::error;
use std::fmt;
use std::result;

/// Errors returned when a `Cursor` cannot be used with a set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The cursor is at the end position, which holds no value and has no successor.
    CursorAtEnd,
    /// The cursor is at the minimum value and has no predecessor.
    NoPredecessor,
    /// The value the cursor referenced has been removed from the set.
    StaleCursor,
    /// The cursor was issued by a different set.
    ForeignCursor,
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::CursorAtEnd => write!(f, "cursor is at the end of the set"),
            Error::NoPredecessor => write!(f, "cursor is at the beginning of the set"),
            Error::StaleCursor => write!(f, "cursor references a removed value"),
            Error::ForeignCursor => write!(f, "cursor belongs to a different set"),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
