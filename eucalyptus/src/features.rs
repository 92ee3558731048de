//! Feature vectors: fixed-size numeric fingerprints of subtree shape.
//!
//! A node's vector is the sum of one pseudo-random unit vector per node in its
//! subtree, each seeded by the hash of that node's pq-gram (a window of
//! ancestor, own and child categories). Similar subtrees share most of their
//! grams and therefore end up close in Euclidean space, which lets the
//! sequence aligner shortlist likely partners before running the more
//! expensive cost estimator.
//!
//! Vectors only steer matching; nothing depends on their exact values.

use core::hash::{Hash, Hasher};
use core::ops::AddAssign;

use rapidhash::RapidHasher;
use smallvec::SmallVec;

use crate::config::FeatureConfig;
use crate::term::{Annotation, Term, TermTypes};

/// Number of components in a [`FeatureVector`].
pub const FEATURE_DIMENSIONS: usize = 15;

/// Stand-in for missing ancestors or children in a gram.
const PADDING: u64 = 0x2a2a_2a2a_2a2a_2a2a;

/// A subtree fingerprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_DIMENSIONS]);

impl Default for FeatureVector {
    fn default() -> Self {
        Self::zero()
    }
}

impl FeatureVector {
    /// The zero vector.
    pub const fn zero() -> Self {
        Self([0.0; FEATURE_DIMENSIONS])
    }

    /// A vector with the given components.
    pub const fn new(components: [f64; FEATURE_DIMENSIONS]) -> Self {
        Self(components)
    }

    /// A deterministic pseudo-random unit vector derived from `seed`.
    pub fn unit(seed: u64) -> Self {
        let mut components = [0.0; FEATURE_DIMENSIONS];
        for (index, component) in components.iter_mut().enumerate() {
            let mut hasher = RapidHasher::default();
            seed.hash(&mut hasher);
            index.hash(&mut hasher);
            let bits = hasher.finish();
            // Top 53 bits, mapped onto [-1, 1).
            *component = (bits >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0;
        }
        let norm = components.iter().map(|c| c * c).sum::<f64>().sqrt();
        if norm > 0.0 {
            for component in &mut components {
                *component /= norm;
            }
        }
        Self(components)
    }

    /// The components.
    pub fn components(&self) -> &[f64; FEATURE_DIMENSIONS] {
        &self.0
    }

    /// Squared Euclidean distance.
    pub fn distance_squared(&self, other: &Self) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

impl AddAssign for FeatureVector {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}

/// Compute feature vectors for every node of `term`, replacing any that were
/// already present.
pub fn featurize<T: TermTypes>(term: Term<T>, config: &FeatureConfig) -> Term<T> {
    let mut ancestors = Vec::new();
    decorate(term, config, &mut ancestors)
}

fn category_hash<C: Hash>(category: &C) -> u64 {
    let mut hasher = RapidHasher::default();
    category.hash(&mut hasher);
    hasher.finish()
}

fn gram_hash<T: TermTypes>(term: &Term<T>, own: u64, ancestors: &[u64], config: &FeatureConfig) -> u64 {
    let mut hasher = RapidHasher::default();

    let present = ancestors.len().min(config.p);
    for _ in present..config.p {
        PADDING.hash(&mut hasher);
    }
    for ancestor in &ancestors[ancestors.len() - present..] {
        ancestor.hash(&mut hasher);
    }

    own.hash(&mut hasher);

    let children: SmallVec<[u64; 4]> = term
        .syntax()
        .iter()
        .take(config.q)
        .map(|child| category_hash(child.category()))
        .collect();
    for i in 0..config.q {
        children.get(i).copied().unwrap_or(PADDING).hash(&mut hasher);
    }

    hasher.finish()
}

fn decorate<T: TermTypes>(term: Term<T>, config: &FeatureConfig, ancestors: &mut Vec<u64>) -> Term<T> {
    let own = category_hash(term.category());
    let mut vector = FeatureVector::unit(gram_hash(&term, own, ancestors, config));

    let (annotation, syntax) = term.into_parts();
    ancestors.push(own);
    let syntax = syntax.map(|child| {
        let child = decorate(child, config, ancestors);
        if let Some(features) = child.features() {
            vector += *features;
        }
        child
    });
    ancestors.pop();

    Term::from_parts(
        Annotation {
            features: Some(vector),
            ..annotation
        },
        syntax,
    )
}
