//! Tuning knobs for the diff engine.

/// Configuration for the diff algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffConfig {
    /// Number of nodes the approximate edit distance may look at before it
    /// assumes the rest of the structure costs nothing.
    pub cost_budget: usize,

    /// How far past the last matched old element the sequence aligner looks
    /// for a partner. Values below 1 are treated as 1.
    pub move_bound: usize,

    /// How many nearest neighbours (by feature distance) are scored with the
    /// cost estimator when both sides carry feature vectors.
    pub candidates: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            cost_budget: 10,
            move_bound: 8,
            candidates: 3,
        }
    }
}

/// Shape of the pq-grams hashed into feature vectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureConfig {
    /// Number of ancestor categories in each gram.
    pub p: usize,
    /// Number of leading child categories in each gram.
    pub q: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self { p: 0, q: 3 }
    }
}
