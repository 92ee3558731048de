//! The annotated syntax trees consumed by the diff engine.
//!
//! Terms are produced by language front-ends and are read-only here: the
//! engine borrows them for the whole diff and never mutates them. Every node
//! carries an [`Annotation`] (its category and an optional feature vector) and
//! a [`Syntax`] describing its children. The set of shapes is closed so that
//! the correspondence rules can match on it exhaustively.

use core::fmt;
use core::hash::Hash;
use core::marker::PhantomData;

use crate::features::FeatureVector;

/// Type-level configuration for terms.
///
/// Front-ends pick the category type (usually a grammar symbol enum) and the
/// label type for leaf text.
pub trait TermTypes {
    /// Syntactic category. Two nodes are only ever compared when their
    /// categories are equal.
    type Category: Clone + Eq + Hash + fmt::Debug + fmt::Display;

    /// Payload of leaf nodes (identifier names, literal text, ...).
    type Label: Clone + Eq + fmt::Debug + fmt::Display;
}

/// Ready-made [`TermTypes`] for categories `C` and labels `L`.
pub struct SimpleTypes<C, L = String>(PhantomData<fn() -> (C, L)>);

impl<C, L> TermTypes for SimpleTypes<C, L>
where
    C: Clone + Eq + Hash + fmt::Debug + fmt::Display,
    L: Clone + Eq + fmt::Debug + fmt::Display,
{
    type Category = C;
    type Label = L;
}

/// The kind of constructor a node was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// No children, only a label.
    Leaf,
    /// Ordered collection of children.
    Sequence,
    /// Optional identifier slot plus a child collection.
    Container,
    /// Children at fixed positions.
    Branch,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Leaf => write!(f, "leaf"),
            Shape::Sequence => write!(f, "sequence"),
            Shape::Container => write!(f, "container"),
            Shape::Branch => write!(f, "branch"),
        }
    }
}

/// The child structure of a node, generic over the label `L` and the child
/// type `R` (terms in the input, diffs in the output).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Syntax<L, R> {
    /// A terminal carrying its source text.
    Leaf(L),

    /// An ordered collection: statement lists, argument lists, array elements.
    Sequence(Vec<R>),

    /// A named container: modules, functions, classes, methods, objects,
    /// switches, arrays, annotated or commented forms.
    Container {
        /// The identifier or type slot, when the construct has one.
        slot: Option<Box<R>>,
        /// The body.
        children: Vec<R>,
    },

    /// Any other constructor, with children at fixed positions.
    Branch(Vec<R>),
}

impl<L, R> Syntax<L, R> {
    /// The constructor shape.
    pub fn shape(&self) -> Shape {
        match self {
            Syntax::Leaf(_) => Shape::Leaf,
            Syntax::Sequence(_) => Shape::Sequence,
            Syntax::Container { .. } => Shape::Container,
            Syntax::Branch(_) => Shape::Branch,
        }
    }

    /// The container slot, if any.
    pub fn slot(&self) -> Option<&R> {
        match self {
            Syntax::Container { slot, .. } => slot.as_deref(),
            _ => None,
        }
    }

    /// The child collection, excluding a container's slot.
    pub fn children(&self) -> &[R] {
        match self {
            Syntax::Leaf(_) => &[],
            Syntax::Sequence(children)
            | Syntax::Container { children, .. }
            | Syntax::Branch(children) => children,
        }
    }

    /// All children in traversal order, slot first.
    pub fn iter(&self) -> impl Iterator<Item = &R> + '_ {
        self.slot().into_iter().chain(self.children())
    }

    /// Number of children, slot included.
    pub fn arity(&self) -> usize {
        usize::from(self.slot().is_some()) + self.children().len()
    }

    /// Rebuild with every child mapped through `f`, in traversal order.
    pub fn map<R2>(self, mut f: impl FnMut(R) -> R2) -> Syntax<L, R2> {
        match self {
            Syntax::Leaf(label) => Syntax::Leaf(label),
            Syntax::Sequence(children) => Syntax::Sequence(children.into_iter().map(f).collect()),
            Syntax::Container { slot, children } => {
                let slot = slot.map(|s| Box::new(f(*s)));
                Syntax::Container {
                    slot,
                    children: children.into_iter().map(f).collect(),
                }
            }
            Syntax::Branch(children) => Syntax::Branch(children.into_iter().map(f).collect()),
        }
    }
}

/// Per-node annotation.
pub struct Annotation<T: TermTypes> {
    /// Syntactic category.
    pub category: T::Category,
    /// Subtree fingerprint, when the front-end computed one.
    pub features: Option<FeatureVector>,
}

impl<T: TermTypes> Annotation<T> {
    /// An annotation without a feature vector.
    pub fn new(category: T::Category) -> Self {
        Self {
            category,
            features: None,
        }
    }
}

impl<T: TermTypes> Clone for Annotation<T> {
    fn clone(&self) -> Self {
        Self {
            category: self.category.clone(),
            features: self.features,
        }
    }
}

impl<T: TermTypes> fmt::Debug for Annotation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotation")
            .field("category", &self.category)
            .field("features", &self.features)
            .finish()
    }
}

impl<T: TermTypes> PartialEq for Annotation<T> {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category && self.features == other.features
    }
}

/// An immutable syntax tree node.
pub struct Term<T: TermTypes> {
    annotation: Annotation<T>,
    size: usize,
    syntax: Syntax<T::Label, Term<T>>,
}

impl<T: TermTypes> Term<T> {
    /// Build a node from its category and syntax.
    pub fn new(category: T::Category, syntax: Syntax<T::Label, Term<T>>) -> Self {
        Self::from_parts(Annotation::new(category), syntax)
    }

    /// Build a node from a full annotation and syntax.
    pub fn from_parts(annotation: Annotation<T>, syntax: Syntax<T::Label, Term<T>>) -> Self {
        let size = 1 + syntax.iter().map(Term::size).sum::<usize>();
        Self {
            annotation,
            size,
            syntax,
        }
    }

    /// A leaf.
    pub fn leaf(category: T::Category, label: T::Label) -> Self {
        Self::new(category, Syntax::Leaf(label))
    }

    /// An ordered collection.
    pub fn sequence(category: T::Category, children: impl IntoIterator<Item = Term<T>>) -> Self {
        Self::new(category, Syntax::Sequence(children.into_iter().collect()))
    }

    /// A named container.
    pub fn container(
        category: T::Category,
        slot: Option<Term<T>>,
        children: impl IntoIterator<Item = Term<T>>,
    ) -> Self {
        Self::new(
            category,
            Syntax::Container {
                slot: slot.map(Box::new),
                children: children.into_iter().collect(),
            },
        )
    }

    /// A fixed-arity node.
    pub fn branch(category: T::Category, children: impl IntoIterator<Item = Term<T>>) -> Self {
        Self::new(category, Syntax::Branch(children.into_iter().collect()))
    }

    /// Attach a feature vector to this node.
    pub fn with_features(mut self, features: FeatureVector) -> Self {
        self.annotation.features = Some(features);
        self
    }

    /// Split into annotation and syntax.
    pub fn into_parts(self) -> (Annotation<T>, Syntax<T::Label, Term<T>>) {
        (self.annotation, self.syntax)
    }

    /// The annotation.
    pub fn annotation(&self) -> &Annotation<T> {
        &self.annotation
    }

    /// The category.
    pub fn category(&self) -> &T::Category {
        &self.annotation.category
    }

    /// The feature vector, if one was computed.
    pub fn features(&self) -> Option<&FeatureVector> {
        self.annotation.features.as_ref()
    }

    /// The child structure.
    pub fn syntax(&self) -> &Syntax<T::Label, Term<T>> {
        &self.syntax
    }

    /// The constructor shape.
    pub fn shape(&self) -> Shape {
        self.syntax.shape()
    }

    /// The leaf label, for leaves.
    pub fn label(&self) -> Option<&T::Label> {
        match &self.syntax {
            Syntax::Leaf(label) => Some(label),
            _ => None,
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the two nodes may be compared at all.
    pub fn comparable(&self, other: &Self) -> bool {
        self.annotation.category == other.annotation.category
    }

    /// Whether the two nodes stand for the same declaration: comparable
    /// containers whose identifier slots are structurally equal.
    pub fn equivalent(&self, other: &Self) -> bool {
        if !self.comparable(other) {
            return false;
        }
        match (&self.syntax, &other.syntax) {
            (
                Syntax::Container { slot: Some(a), .. },
                Syntax::Container { slot: Some(b), .. },
            ) => a == b,
            _ => false,
        }
    }
}

impl<T: TermTypes> Clone for Term<T> {
    fn clone(&self) -> Self {
        Self {
            annotation: self.annotation.clone(),
            size: self.size,
            syntax: self.syntax.clone(),
        }
    }
}

impl<T: TermTypes> fmt::Debug for Term<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Term")
            .field("category", &self.annotation.category)
            .field("features", &self.annotation.features)
            .field("syntax", &self.syntax)
            .finish()
    }
}

/// Structural equality: categories and syntax. Feature vectors are ignored.
impl<T: TermTypes> PartialEq for Term<T> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size
            && self.annotation.category == other.annotation.category
            && self.syntax == other.syntax
    }
}

impl<T: TermTypes> Eq for Term<T> {}

/// Bracket notation: `cat:label`, `[cat ...]`, `{cat slot | ...}`, `(cat ...)`.
impl<T: TermTypes> fmt::Display for Term<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = &self.annotation.category;
        match &self.syntax {
            Syntax::Leaf(label) => write!(f, "{category}:{label}"),
            Syntax::Sequence(children) => {
                write!(f, "[{category}")?;
                for child in children {
                    write!(f, " {child}")?;
                }
                write!(f, "]")
            }
            Syntax::Container { slot, children } => {
                write!(f, "{{{category} ")?;
                match slot {
                    Some(slot) => write!(f, "{slot}")?,
                    None => write!(f, "_")?,
                }
                write!(f, " |")?;
                for child in children {
                    write!(f, " {child}")?;
                }
                write!(f, "}}")
            }
            Syntax::Branch(children) => {
                write!(f, "({category}")?;
                for child in children {
                    write!(f, " {child}")?;
                }
                write!(f, ")")
            }
        }
    }
}
