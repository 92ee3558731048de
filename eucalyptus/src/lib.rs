//! # Eucalyptus
//!
//! Language-agnostic structural diffing of syntax trees.
//!
//! Front-ends hand over two immutable, annotated [`Term`] trees; the engine
//! returns a [`Diff`] tree that mirrors their shared structure, with merge
//! nodes where the two sides correspond and patches (insert, delete, replace)
//! where they don't.
//!
//! ## Algorithm Overview
//!
//! - **Correspondence rules** decide per shape how two nodes line up: ordered
//!   collections and container bodies are aligned, everything else is paired
//!   by position or replaced.
//! - **RWS alignment** pins identical collection members first, then matches
//!   the rest by mutual nearest neighbour, tolerating insertions, deletions
//!   and local reordering.
//! - **Bounded approximate edit distance** ranks alignment candidates while
//!   looking at no more than a fixed number of nodes.
//! - Optional **feature vectors** (pq-gram fingerprints) shortlist candidates
//!   before the cost estimate runs.
//!
//! The work is driven by an explicit task interpreter ([`Algorithm`]) that can
//! run to completion, single-step or stop after a bounded amount of work.
//!
//! ## Usage
//!
//! ```
//! use eucalyptus::{SimpleTypes, Term, diff_terms};
//!
//! type Types = SimpleTypes<&'static str, &'static str>;
//!
//! let old: Term<Types> = Term::sequence(
//!     "statements",
//!     [Term::leaf("identifier", "a"), Term::leaf("identifier", "b")],
//! );
//! let new: Term<Types> = Term::sequence(
//!     "statements",
//!     [Term::leaf("identifier", "a"), Term::leaf("identifier", "c")],
//! );
//!
//! let diff = diff_terms(&old, &new);
//! let stats = diff.stats();
//! assert_eq!(stats.merges, 2);
//! assert_eq!(stats.replaces, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]

pub use indextree;

#[macro_use]
mod tracing_macros;

/// Outstanding diff work
pub mod algorithm;
/// Conversion from `indextree` arenas
pub mod arena;
mod config;
/// Bounded approximate edit distance
pub mod cost;
/// The diff tree
pub mod diff;
/// pq-gram feature vectors
pub mod features;
/// The task interpreter
pub mod interpreter;
/// Structural correspondence rules
pub mod rules;
/// RWS sequence alignment
pub mod rws;
/// Annotated syntax trees
pub mod term;

pub use algorithm::Task;
pub use arena::{NodeKind, TermError, TermNode};
pub use config::{DiffConfig, FeatureConfig};
pub use cost::edit_distance_up_to;
pub use diff::{Coverage, Diff, DiffStats, Patch};
pub use features::{FEATURE_DIMENSIONS, FeatureVector, featurize};
pub use interpreter::{Algorithm, Progress, Step, Steps};
pub use rws::{Correspondence, Matcher, TermMatcher, align_terms, align_with};
pub use term::{Annotation, Shape, SimpleTypes, Syntax, Term, TermTypes};

use rayon::prelude::*;

/// Diff `old` against `new` with the default configuration.
pub fn diff_terms<'a, T: TermTypes>(old: &'a Term<T>, new: &'a Term<T>) -> Diff<'a, T> {
    diff_terms_with_config(old, new, &DiffConfig::default())
}

/// Diff `old` against `new`.
///
/// Every node of both inputs ends up in exactly one place in the result:
/// under a merge node, or inside a patch.
pub fn diff_terms_with_config<'a, T: TermTypes>(
    old: &'a Term<T>,
    new: &'a Term<T>,
    config: &DiffConfig,
) -> Diff<'a, T> {
    debug!(
        old_size = old.size(),
        new_size = new.size(),
        ?config,
        "diff_terms: starting"
    );
    let diff = Algorithm::new(old, new, config).run();
    debug!(stats = ?diff.stats(), "diff_terms: done");
    diff
}

/// Diff many pairs in parallel.
///
/// Results come back in input order.
pub fn diff_all<'a, T>(pairs: &[(&'a Term<T>, &'a Term<T>)], config: &DiffConfig) -> Vec<Diff<'a, T>>
where
    T: TermTypes,
    T::Category: Send + Sync,
    T::Label: Send + Sync,
{
    pairs
        .par_iter()
        .map(|&(old, new)| diff_terms_with_config(old, new, config))
        .collect()
}
