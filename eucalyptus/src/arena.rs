//! Building terms from an `indextree` arena.
//!
//! Parsers that already produce a mutable arena tree can hand it over without
//! building nested [`Term`]s themselves. Each arena node carries a
//! [`TermNode`]: its category and which shape it takes. Containers with a slot
//! keep the slot as their first arena child.

use core::fmt;

use facet::Facet;
use indextree::{Arena, NodeId};

use crate::term::{Syntax, Term, TermTypes};

/// What a syntax node looks like in an arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind<L> {
    /// A leaf with its label. Must have no arena children.
    Leaf(L),
    /// An ordered collection.
    Sequence,
    /// A named container. When `has_slot` is set, the first child is the slot.
    Container {
        /// Whether the first child is the identifier or type slot.
        has_slot: bool,
    },
    /// A fixed-arity node.
    Branch,
}

/// Payload of an arena node.
pub struct TermNode<T: TermTypes> {
    /// The syntactic category.
    pub category: T::Category,
    /// The shape of the node.
    pub kind: NodeKind<T::Label>,
}

impl<T: TermTypes> TermNode<T> {
    /// Create a node payload.
    pub fn new(category: T::Category, kind: NodeKind<T::Label>) -> Self {
        Self { category, kind }
    }
}

impl<T: TermTypes> Clone for TermNode<T> {
    fn clone(&self) -> Self {
        Self {
            category: self.category.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl<T: TermTypes> fmt::Debug for TermNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermNode")
            .field("category", &self.category)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Errors that can occur while converting an arena into a term.
#[derive(Facet, Debug)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum TermError {
    /// node {node} was removed from the arena
    Removed { node: usize },

    /// leaf node {node} has {count} children
    LeafWithChildren { node: usize, count: usize },

    /// container node {node} declares a slot but has no children
    MissingSlot { node: usize },
}

impl<T: TermTypes> Term<T> {
    /// Convert the subtree rooted at `root` into a term.
    pub fn from_arena(arena: &Arena<TermNode<T>>, root: NodeId) -> Result<Self, TermError> {
        let node = match arena.get(root) {
            Some(node) if !node.is_removed() => node.get(),
            _ => {
                return Err(TermError::Removed {
                    node: usize::from(root),
                });
            }
        };

        let mut children = root
            .children(arena)
            .map(|child| Term::from_arena(arena, child))
            .collect::<Result<Vec<_>, _>>()?;

        let syntax = match &node.kind {
            NodeKind::Leaf(label) => {
                if !children.is_empty() {
                    return Err(TermError::LeafWithChildren {
                        node: usize::from(root),
                        count: children.len(),
                    });
                }
                Syntax::Leaf(label.clone())
            }
            NodeKind::Sequence => Syntax::Sequence(children),
            NodeKind::Container { has_slot: false } => Syntax::Container {
                slot: None,
                children,
            },
            NodeKind::Container { has_slot: true } => {
                if children.is_empty() {
                    return Err(TermError::MissingSlot {
                        node: usize::from(root),
                    });
                }
                let slot = children.remove(0);
                Syntax::Container {
                    slot: Some(Box::new(slot)),
                    children,
                }
            }
            NodeKind::Branch => Syntax::Branch(children),
        };

        Ok(Term::new(node.category.clone(), syntax))
    }
}
