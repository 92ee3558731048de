//! The diff tree produced by the interpreter.
//!
//! A [`Diff`] borrows from the two input trees. Merge nodes keep the
//! annotations of both sides and the shape of the syntax they came from, with
//! diffs in place of children; patches hold the subtrees they insert, delete
//! or replace. Every input node is accounted for exactly once.

use core::fmt;

use crate::term::{Annotation, Syntax, Term, TermTypes};

/// A leaf edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<A> {
    /// A subtree only present on the new side.
    Insert(A),
    /// A subtree only present on the old side.
    Delete(A),
    /// An old subtree replaced by an unrelated new one.
    Replace(A, A),
}

impl<A> Patch<A> {
    /// The old side, if any.
    pub fn old(&self) -> Option<&A> {
        match self {
            Patch::Delete(a) | Patch::Replace(a, _) => Some(a),
            Patch::Insert(_) => None,
        }
    }

    /// The new side, if any.
    pub fn new(&self) -> Option<&A> {
        match self {
            Patch::Insert(b) | Patch::Replace(_, b) => Some(b),
            Patch::Delete(_) => None,
        }
    }

    /// Apply `f` to both sides.
    pub fn map<B>(self, mut f: impl FnMut(A) -> B) -> Patch<B> {
        match self {
            Patch::Insert(b) => Patch::Insert(f(b)),
            Patch::Delete(a) => Patch::Delete(f(a)),
            Patch::Replace(a, b) => Patch::Replace(f(a), f(b)),
        }
    }
}

impl<T: TermTypes> fmt::Display for Patch<&Term<T>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Patch::Insert(b) => write!(f, "+{b}"),
            Patch::Delete(a) => write!(f, "-{a}"),
            Patch::Replace(a, b) => write!(f, "{a} → {b}"),
        }
    }
}

/// A node of the diff tree.
pub enum Diff<'a, T: TermTypes> {
    /// Both sides correspond; children are diffed recursively.
    Merge {
        /// Annotation of the old node.
        old: &'a Annotation<T>,
        /// Annotation of the new node.
        new: &'a Annotation<T>,
        /// The shared shape, with diffs as children.
        syntax: Syntax<T::Label, Diff<'a, T>>,
    },
    /// A leaf edit.
    Patch(Patch<&'a Term<T>>),
}

/// Counts of each kind of diff node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiffStats {
    /// Merge nodes.
    pub merges: usize,
    /// Inserted subtrees.
    pub inserts: usize,
    /// Deleted subtrees.
    pub deletes: usize,
    /// Replaced subtree pairs.
    pub replaces: usize,
}

impl DiffStats {
    /// Number of patches of any kind.
    pub fn patches(&self) -> usize {
        self.inserts + self.deletes + self.replaces
    }
}

/// How many input nodes on each side a diff accounts for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    /// Nodes of the old tree.
    pub old: usize,
    /// Nodes of the new tree.
    pub new: usize,
}

impl<'a, T: TermTypes> Diff<'a, T> {
    pub(crate) fn merge(
        old: &'a Term<T>,
        new: &'a Term<T>,
        syntax: Syntax<T::Label, Diff<'a, T>>,
    ) -> Self {
        Diff::Merge {
            old: old.annotation(),
            new: new.annotation(),
            syntax,
        }
    }

    /// The patch, if this node is one.
    pub fn as_patch(&self) -> Option<&Patch<&'a Term<T>>> {
        match self {
            Diff::Patch(patch) => Some(patch),
            Diff::Merge { .. } => None,
        }
    }

    /// The merged syntax, if this node is a merge.
    pub fn as_merge(&self) -> Option<&Syntax<T::Label, Diff<'a, T>>> {
        match self {
            Diff::Merge { syntax, .. } => Some(syntax),
            Diff::Patch(_) => None,
        }
    }

    /// Visit every node, parents before children.
    pub fn walk<'s>(&'s self, visit: &mut impl FnMut(&'s Diff<'a, T>)) {
        visit(self);
        if let Diff::Merge { syntax, .. } = self {
            for child in syntax.iter() {
                child.walk(visit);
            }
        }
    }

    /// All patches in traversal order.
    pub fn patches(&self) -> Vec<&Patch<&'a Term<T>>> {
        let mut out = Vec::new();
        self.walk(&mut |node| {
            if let Diff::Patch(patch) = node {
                out.push(patch);
            }
        });
        out
    }

    /// Whether the diff contains no patches at all.
    pub fn is_merge_only(&self) -> bool {
        match self {
            Diff::Merge { syntax, .. } => syntax.iter().all(Diff::is_merge_only),
            Diff::Patch(_) => false,
        }
    }

    /// Node counts by kind.
    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        self.walk(&mut |node| match node {
            Diff::Merge { .. } => stats.merges += 1,
            Diff::Patch(Patch::Insert(_)) => stats.inserts += 1,
            Diff::Patch(Patch::Delete(_)) => stats.deletes += 1,
            Diff::Patch(Patch::Replace(..)) => stats.replaces += 1,
        });
        stats
    }

    /// Input nodes accounted for on each side. For a diff of `old` against
    /// `new` this equals `(old.size(), new.size())`.
    pub fn coverage(&self) -> Coverage {
        let mut coverage = Coverage::default();
        self.walk(&mut |node| match node {
            Diff::Merge { .. } => {
                coverage.old += 1;
                coverage.new += 1;
            }
            Diff::Patch(patch) => {
                coverage.old += patch.old().map_or(0, |t| t.size());
                coverage.new += patch.new().map_or(0, |t| t.size());
            }
        });
        coverage
    }

    /// Total size of all patched subtrees: zero exactly when the diff is
    /// merge-only.
    pub fn cost(&self) -> usize {
        self.patches()
            .iter()
            .map(|patch| {
                patch.old().map_or(0, |t| t.size()) + patch.new().map_or(0, |t| t.size())
            })
            .sum()
    }
}

impl<T: TermTypes> Clone for Diff<'_, T> {
    fn clone(&self) -> Self {
        match self {
            Diff::Merge { old, new, syntax } => Diff::Merge {
                old: *old,
                new: *new,
                syntax: syntax.clone(),
            },
            Diff::Patch(patch) => Diff::Patch(*patch),
        }
    }
}

impl<T: TermTypes> PartialEq for Diff<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Diff::Merge {
                    old: a,
                    new: b,
                    syntax: x,
                },
                Diff::Merge {
                    old: c,
                    new: d,
                    syntax: y,
                },
            ) => a == c && b == d && x == y,
            (Diff::Patch(p), Diff::Patch(q)) => p == q,
            _ => false,
        }
    }
}

impl<T: TermTypes> fmt::Debug for Diff<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diff::Merge { old, new, syntax } => f
                .debug_struct("Merge")
                .field("old", &old.category)
                .field("new", &new.category)
                .field("syntax", syntax)
                .finish(),
            Diff::Patch(patch) => write!(f, "{patch}"),
        }
    }
}
