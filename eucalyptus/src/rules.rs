//! Structural correspondence rules.
//!
//! Given two terms, decide how their immediate structure lines up. The table
//! is a match over the closed set of shapes in [`Syntax`]; adding a shape
//! means adding rows here.
//!
//! | old \ new   | rule                                                    |
//! |-------------|---------------------------------------------------------|
//! | sequence    | align the two child lists                               |
//! | container   | diff the slots (or insert/delete a lone slot), align bodies |
//! | anything else | no rule; fall back to [`zip`]                         |
//!
//! Nothing is attempted across categories.

use crate::algorithm::Task;
use crate::term::{Syntax, Term, TermTypes};

/// How the children of a matched pair are to be diffed.
pub enum Children<'a, T: TermTypes> {
    /// Align the two collections with RWS.
    Aligned(&'a [Term<T>], &'a [Term<T>]),
    /// One task per child position.
    Positional(Vec<Task<'a, T>>),
}

/// The decomposition of a matched pair into child work.
pub struct Structure<'a, T: TermTypes> {
    /// Work for the container slot, when either side has one.
    pub slot: Option<Task<'a, T>>,
    /// Work for the remaining children.
    pub children: Children<'a, T>,
}

impl<'a, T: TermTypes> Structure<'a, T> {
    fn aligned(old: &'a [Term<T>], new: &'a [Term<T>]) -> Self {
        Self {
            slot: None,
            children: Children::Aligned(old, new),
        }
    }

    fn positional(old: &'a [Term<T>], new: &'a [Term<T>]) -> Option<Self> {
        (old.len() == new.len()).then(|| Self {
            slot: None,
            children: Children::Positional(
                old.iter().zip(new).map(|(a, b)| Task::Diff(a, b)).collect(),
            ),
        })
    }
}

/// Apply the specific rules of the table.
///
/// Returns `None` when no rule covers the pair; the caller then falls back
/// to [`zip`].
pub fn correspond<'a, T: TermTypes>(
    old: &'a Term<T>,
    new: &'a Term<T>,
) -> Option<Structure<'a, T>> {
    if !old.comparable(new) {
        return None;
    }

    match (old.syntax(), new.syntax()) {
        (Syntax::Sequence(a), Syntax::Sequence(b)) => Some(Structure::aligned(a, b)),
        (
            Syntax::Container {
                slot: slot_a,
                children: a,
            },
            Syntax::Container {
                slot: slot_b,
                children: b,
            },
        ) => {
            let slot = match (slot_a.as_deref(), slot_b.as_deref()) {
                (Some(x), Some(y)) => Some(Task::Diff(x, y)),
                (Some(x), None) => Some(Task::Delete(x)),
                (None, Some(y)) => Some(Task::Insert(y)),
                (None, None) => None,
            };
            Some(Structure {
                slot,
                ..Structure::aligned(a, b)
            })
        }
        (Syntax::Leaf(_), Syntax::Leaf(_)) | (Syntax::Branch(_), Syntax::Branch(_)) => None,
        // Mismatched shapes.
        (
            Syntax::Leaf(_) | Syntax::Sequence(_) | Syntax::Container { .. } | Syntax::Branch(_),
            _,
        ) => None,
    }
}

/// Pair children by position.
///
/// Succeeds only for comparable terms built with the same constructor and the
/// same number of children. Leaves count as the same constructor only when
/// their labels are equal.
pub fn zip<'a, T: TermTypes>(old: &'a Term<T>, new: &'a Term<T>) -> Option<Structure<'a, T>> {
    if !old.comparable(new) {
        return None;
    }

    match (old.syntax(), new.syntax()) {
        (Syntax::Leaf(a), Syntax::Leaf(b)) => (a == b).then(|| Structure {
            slot: None,
            children: Children::Positional(Vec::new()),
        }),
        (Syntax::Sequence(a), Syntax::Sequence(b)) | (Syntax::Branch(a), Syntax::Branch(b)) => {
            Structure::positional(a, b)
        }
        (
            Syntax::Container {
                slot: slot_a,
                children: a,
            },
            Syntax::Container {
                slot: slot_b,
                children: b,
            },
        ) => {
            let slot = match (slot_a.as_deref(), slot_b.as_deref()) {
                (Some(x), Some(y)) => Some(Task::Diff(x, y)),
                (None, None) => None,
                _ => return None,
            };
            Structure::positional(a, b).map(|s| Structure { slot, ..s })
        }
        // Mismatched shapes.
        (
            Syntax::Leaf(_) | Syntax::Sequence(_) | Syntax::Container { .. } | Syntax::Branch(_),
            _,
        ) => None,
    }
}
