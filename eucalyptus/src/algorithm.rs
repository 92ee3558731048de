//! Outstanding diff work.
//!
//! A [`Task`] is one obligation the interpreter still has to discharge. Three
//! variants decompose into further tasks; the other three are terminal and
//! resolve directly into a patch.

use core::fmt;

use crate::term::{Term, TermTypes};

/// A unit of pending diff work.
pub enum Task<'a, T: TermTypes> {
    /// Diff two arbitrary terms, deciding how their shapes correspond.
    Diff(&'a Term<T>, &'a Term<T>),
    /// Pair the children of two same-shaped terms by position.
    Zip(&'a Term<T>, &'a Term<T>),
    /// Align two ordered lists of terms.
    Align(&'a [Term<T>], &'a [Term<T>]),
    /// Emit a deletion of an old subtree.
    Delete(&'a Term<T>),
    /// Emit an insertion of a new subtree.
    Insert(&'a Term<T>),
    /// Emit a replacement of an old subtree with an unrelated new one.
    Replace(&'a Term<T>, &'a Term<T>),
}

impl<T: TermTypes> Task<'_, T> {
    /// Whether the task resolves without further decomposition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Task::Delete(_) | Task::Insert(_) | Task::Replace(..))
    }
}

impl<T: TermTypes> Clone for Task<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: TermTypes> Copy for Task<'_, T> {}

impl<T: TermTypes> PartialEq for Task<'_, T> {
    /// Tasks are equal when they refer to the very same terms.
    fn eq(&self, other: &Self) -> bool {
        use core::ptr;
        match (self, other) {
            (Task::Diff(a, b), Task::Diff(c, d))
            | (Task::Zip(a, b), Task::Zip(c, d))
            | (Task::Replace(a, b), Task::Replace(c, d)) => ptr::eq(*a, *c) && ptr::eq(*b, *d),
            (Task::Align(a, b), Task::Align(c, d)) => ptr::eq(*a, *c) && ptr::eq(*b, *d),
            (Task::Delete(a), Task::Delete(b)) | (Task::Insert(a), Task::Insert(b)) => {
                ptr::eq(*a, *b)
            }
            _ => false,
        }
    }
}

impl<T: TermTypes> fmt::Display for Task<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Diff(a, b) => write!(f, "diff({}, {})", a.category(), b.category()),
            Task::Zip(a, b) => write!(f, "zip({}, {})", a.category(), b.category()),
            Task::Align(a, b) => write!(f, "align({} ~ {})", a.len(), b.len()),
            Task::Delete(a) => write!(f, "delete({})", a.category()),
            Task::Insert(b) => write!(f, "insert({})", b.category()),
            Task::Replace(a, b) => write!(f, "replace({}, {})", a.category(), b.category()),
        }
    }
}

impl<T: TermTypes> fmt::Debug for Task<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
