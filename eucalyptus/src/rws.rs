//! RWS sequence alignment.
//!
//! Aligns two ordered lists, allowing insertions, deletions and skipping
//! ahead. Alignment runs in two passes:
//!
//! 1. Elements that are identical on both sides are pinned with a longest
//!    common subsequence over equality. Pinned pairs never move.
//! 2. Each gap between pinned pairs is aligned by nearest neighbour. New
//!    elements are visited left to right; each one looks for the best
//!    comparable old element inside a window that starts just past the
//!    previous match and spans `move_bound` elements. The pair is only taken
//!    when the match is mutual: looking back from that old element over the
//!    new elements not yet placed, the same new element must come out best.
//!
//! Old elements skipped over by a match are deleted right before it, new
//! elements without a partner are inserted in place, and whatever is left of
//! an old gap is deleted at its end. Matched pairs are therefore monotone in
//! both lists.
//!
//! Ranking inside a window:
//! 1. an *equivalent* candidate (same declaration) wins outright;
//! 2. when every candidate has a feature distance, only the nearest
//!    `candidates` are kept;
//! 3. the remaining ones are scored by cost, lowest index breaking ties.
//!
//! The procedure is a greedy nearest-neighbour assignment: deterministic, not
//! optimal.

use core::ops::Range;

use smallvec::SmallVec;

use crate::config::DiffConfig;
use crate::cost::edit_distance_up_to;
use crate::term::{Term, TermTypes};

/// How an element of one list relates to the other list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correspondence<A, B = A> {
    /// Only present in the old list.
    Old(A),
    /// Only present in the new list.
    New(B),
    /// Present in both lists.
    Paired(A, B),
}

impl<A, B> Correspondence<A, B> {
    /// The old-side element, if any.
    pub fn old(&self) -> Option<&A> {
        match self {
            Correspondence::Old(a) | Correspondence::Paired(a, _) => Some(a),
            Correspondence::New(_) => None,
        }
    }

    /// The new-side element, if any.
    pub fn new(&self) -> Option<&B> {
        match self {
            Correspondence::New(b) | Correspondence::Paired(_, b) => Some(b),
            Correspondence::Old(_) => None,
        }
    }

    /// Whether both sides are present.
    pub fn is_paired(&self) -> bool {
        matches!(self, Correspondence::Paired(..))
    }
}

/// The judgements the aligner needs about a pair of elements.
pub trait Matcher<A, B = A> {
    /// Whether the two elements may be paired at all.
    fn comparable(&self, old: &A, new: &B) -> bool;

    /// Approximate cost of turning `old` into `new`.
    fn cost(&self, old: &A, new: &B) -> usize;

    /// Whether the two elements are identical. Identical elements are pinned
    /// before any cost is computed.
    fn identical(&self, _old: &A, _new: &B) -> bool {
        false
    }

    /// Whether the two elements stand for the same thing regardless of cost.
    fn equivalent(&self, _old: &A, _new: &B) -> bool {
        false
    }

    /// Feature-space distance, when both elements have a fingerprint.
    fn distance(&self, _old: &A, _new: &B) -> Option<f64> {
        None
    }
}

/// [`Matcher`] for terms: structural equality pins, categories gate
/// comparison, the bounded edit distance estimate ranks candidates.
#[derive(Debug, Clone, Copy)]
pub struct TermMatcher {
    budget: usize,
}

impl TermMatcher {
    /// A matcher whose cost estimate looks at up to `budget` nodes.
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }
}

impl<T: TermTypes> Matcher<Term<T>> for TermMatcher {
    fn comparable(&self, old: &Term<T>, new: &Term<T>) -> bool {
        old.comparable(new)
    }

    fn cost(&self, old: &Term<T>, new: &Term<T>) -> usize {
        edit_distance_up_to(old, new, self.budget)
    }

    fn identical(&self, old: &Term<T>, new: &Term<T>) -> bool {
        old == new
    }

    fn equivalent(&self, old: &Term<T>, new: &Term<T>) -> bool {
        old.equivalent(new)
    }

    fn distance(&self, old: &Term<T>, new: &Term<T>) -> Option<f64> {
        Some(old.features()?.distance_squared(new.features()?))
    }
}

/// Align two lists of terms.
pub fn align_terms<'a, T: TermTypes>(
    old: &'a [Term<T>],
    new: &'a [Term<T>],
    config: &DiffConfig,
) -> Vec<Correspondence<&'a Term<T>>> {
    align_with(old, new, config, &TermMatcher::new(config.cost_budget))
}

/// Align two lists using `matcher`.
///
/// Every element of both lists appears in exactly one correspondence, old
/// elements in their original order and new elements in theirs.
pub fn align_with<'a, 'b, A, B, M>(
    old: &'a [A],
    new: &'b [B],
    config: &DiffConfig,
    matcher: &M,
) -> Vec<Correspondence<&'a A, &'b B>>
where
    M: Matcher<A, B> + ?Sized,
{
    let mut out = Vec::with_capacity(old.len() + new.len());
    let (mut next_old, mut next_new) = (0, 0);

    for (i, j) in pinned(old, new, matcher) {
        align_gap(old, new, next_old..i, next_new..j, config, matcher, &mut out);
        out.push(Correspondence::Paired(&old[i], &new[j]));
        next_old = i + 1;
        next_new = j + 1;
    }
    align_gap(
        old,
        new,
        next_old..old.len(),
        next_new..new.len(),
        config,
        matcher,
        &mut out,
    );

    out
}

/// Index pairs of a longest common subsequence of identical elements, in
/// increasing order. Ties prefer pairing as early as possible.
fn pinned<A, B, M>(old: &[A], new: &[B], matcher: &M) -> Vec<(usize, usize)>
where
    M: Matcher<A, B> + ?Sized,
{
    let prefix = old
        .iter()
        .zip(new)
        .take_while(|(a, b)| matcher.identical(a, b))
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| matcher.identical(a, b))
        .count();

    let mut pairs: Vec<(usize, usize)> = (0..prefix).map(|k| (k, k)).collect();

    let (n, m) = (old.len() - prefix - suffix, new.len() - prefix - suffix);
    if n > 0 && m > 0 {
        let identical: Vec<bool> = (0..n * m)
            .map(|k| matcher.identical(&old[prefix + k / m], &new[prefix + k % m]))
            .collect();

        // lengths[i][j]: LCS length of old[i..n] and new[j..m].
        let width = m + 1;
        let mut lengths = vec![0u32; (n + 1) * width];
        for i in (0..n).rev() {
            for j in (0..m).rev() {
                lengths[i * width + j] = if identical[i * m + j] {
                    lengths[(i + 1) * width + j + 1] + 1
                } else {
                    lengths[(i + 1) * width + j].max(lengths[i * width + j + 1])
                };
            }
        }

        let (mut i, mut j) = (0, 0);
        while i < n && j < m {
            if identical[i * m + j] {
                pairs.push((prefix + i, prefix + j));
                i += 1;
                j += 1;
            } else if lengths[(i + 1) * width + j] >= lengths[i * width + j + 1] {
                i += 1;
            } else {
                j += 1;
            }
        }
    }

    let tail = (old.len() - suffix, new.len() - suffix);
    pairs.extend((0..suffix).map(|k| (tail.0 + k, tail.1 + k)));
    pairs
}

/// Align one gap between pinned pairs by mutual nearest neighbour.
fn align_gap<'a, 'b, A, B, M>(
    old: &'a [A],
    new: &'b [B],
    olds: Range<usize>,
    news: Range<usize>,
    config: &DiffConfig,
    matcher: &M,
    out: &mut Vec<Correspondence<&'a A, &'b B>>,
) where
    M: Matcher<A, B> + ?Sized,
{
    let bound = config.move_bound.max(1);
    let mut next_old = olds.start;

    for j in news.clone() {
        let b = &new[j];
        let window = next_old..olds.end.min(next_old + bound);
        let forward = nearest(
            window.filter(|&i| matcher.comparable(&old[i], b)),
            config,
            |i| matcher.equivalent(&old[i], b),
            |i| matcher.distance(&old[i], b),
            |i| matcher.cost(&old[i], b),
        );

        let Some(i) = forward else {
            trace!(new = j, "rws: no comparable candidate");
            out.push(Correspondence::New(b));
            continue;
        };

        let a = &old[i];
        let backward = nearest(
            (j..news.end.min(j + bound)).filter(|&k| matcher.comparable(a, &new[k])),
            config,
            |k| matcher.equivalent(a, &new[k]),
            |k| matcher.distance(a, &new[k]),
            |k| matcher.cost(a, &new[k]),
        );

        if backward == Some(j) {
            trace!(old = i, new = j, skipped = i - next_old, "rws: paired");
            out.extend(old[next_old..i].iter().map(Correspondence::Old));
            out.push(Correspondence::Paired(a, b));
            next_old = i + 1;
        } else {
            trace!(old = i, new = j, "rws: not mutual");
            out.push(Correspondence::New(b));
        }
    }
    out.extend(old[next_old..olds.end].iter().map(Correspondence::Old));
}

/// Pick the best of `candidates` (already filtered for comparability).
fn nearest(
    candidates: impl Iterator<Item = usize>,
    config: &DiffConfig,
    equivalent: impl Fn(usize) -> bool,
    distance: impl Fn(usize) -> Option<f64>,
    cost: impl Fn(usize) -> usize,
) -> Option<usize> {
    let mut shortlist: SmallVec<[usize; 8]> = candidates.collect();
    if shortlist.is_empty() {
        return None;
    }

    if let Some(&i) = shortlist.iter().find(|&&i| equivalent(i)) {
        return Some(i);
    }

    let ranked: Option<SmallVec<[(f64, usize); 8]>> = shortlist
        .iter()
        .map(|&i| distance(i).map(|d| (d, i)))
        .collect();
    if let Some(mut ranked) = ranked {
        ranked.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));
        ranked.truncate(config.candidates.max(1));
        shortlist = ranked.into_iter().map(|(_, i)| i).collect();
    }

    shortlist.into_iter().min_by_key(|&i| (cost(i), i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureConfig;
    use crate::features::featurize;
    use crate::term::SimpleTypes;
    use facet_testhelpers::test;

    type TestTypes = SimpleTypes<&'static str, &'static str>;

    /// Characters: letters of the same case are comparable, cost is distance
    /// in the alphabet.
    struct Letters;

    impl Matcher<char> for Letters {
        fn comparable(&self, old: &char, new: &char) -> bool {
            old.is_uppercase() == new.is_uppercase()
        }

        fn cost(&self, old: &char, new: &char) -> usize {
            (*old as i64 - *new as i64).unsigned_abs() as usize
        }

        fn identical(&self, old: &char, new: &char) -> bool {
            old == new
        }
    }

    fn render(corrs: &[Correspondence<&char>]) -> String {
        corrs
            .iter()
            .map(|c| match c {
                Correspondence::Old(a) => format!("-{a}"),
                Correspondence::New(b) => format!("+{b}"),
                Correspondence::Paired(a, b) => format!("{a}{b}"),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn align(old: &str, new: &str) -> String {
        let old: Vec<char> = old.chars().collect();
        let new: Vec<char> = new.chars().collect();
        render(&align_with(&old, &new, &DiffConfig::default(), &Letters))
    }

    #[test]
    fn test_identical_lists_pair_positionally() {
        assert_eq!(align("abc", "abc"), "aa bb cc");
    }

    #[test]
    fn test_empty_sides() {
        assert_eq!(align("", "abc"), "+a +b +c");
        assert_eq!(align("abc", ""), "-a -b -c");
        assert_eq!(align("", ""), "");
    }

    #[test]
    fn test_incomparable_elements_are_inserted_and_deleted() {
        assert_eq!(align("aB", "aC"), "aa BC");
        assert_eq!(align("ab", "AB"), "+A +B -a -b");
    }

    #[test]
    fn test_skipping_ahead_deletes_in_between() {
        // `c` is closer to `d` than `a` or `b` are.
        assert_eq!(align("abcz", "dz"), "-a -b cd zz");
    }

    #[test]
    fn test_move_bound_limits_the_window() {
        let old: Vec<char> = "abcdx".chars().collect();
        let new: Vec<char> = vec!['w'];
        let config = DiffConfig {
            move_bound: 2,
            ..Default::default()
        };
        // Only `a` and `b` are in reach, and `b` is cheaper.
        assert_eq!(
            render(&align_with(&old, &new, &config, &Letters)),
            "-a bw -c -d -x"
        );
    }

    #[test]
    fn test_identical_elements_are_pinned_first() {
        // `x` is identical on both sides even though it is far away.
        let old: Vec<char> = "abcdx".chars().collect();
        let new: Vec<char> = vec!['x'];
        let config = DiffConfig {
            move_bound: 2,
            ..Default::default()
        };
        assert_eq!(
            render(&align_with(&old, &new, &config, &Letters)),
            "-a -b -c -d xx"
        );
    }

    #[test]
    fn test_changed_element_keeps_its_position() {
        // `e` is closer to `f` than `c` is, but `f` is identical to the
        // following element and is pinned there.
        assert_eq!(align("acf", "aef"), "aa ce ff");
    }

    #[test]
    fn test_pairs_must_be_mutual() {
        // `a` would pick `c`, but `c` prefers `d`.
        assert_eq!(align("c", "ad"), "+a cd");
    }

    #[test]
    fn test_every_element_is_accounted_for_once() {
        let old: Vec<char> = "aXbYcZd".chars().collect();
        let new: Vec<char> = "YdAqcb".chars().collect();
        let corrs = align_with(&old, &new, &DiffConfig::default(), &Letters);

        let olds: Vec<char> = corrs.iter().filter_map(|c| c.old().map(|a| **a)).collect();
        let news: Vec<char> = corrs.iter().filter_map(|c| c.new().map(|b| **b)).collect();
        assert_eq!(olds, old);
        assert_eq!(news, new);
    }

    #[test]
    fn test_equivalent_containers_win_over_cost() {
        let f = |name: &'static str, body: &[&'static str]| {
            Term::<TestTypes>::container(
                "function",
                Some(Term::leaf("identifier", name)),
                body.iter().map(|s| Term::leaf("statement", *s)),
            )
        };
        // `g` is textually closer to the new `main`, but the old `main` shares
        // its name.
        let old = vec![f("g", &["x", "y"]), f("main", &["p", "q", "r", "s"])];
        let new = vec![f("main", &["x", "y"])];

        let corrs = align_terms(&old, &new, &DiffConfig::default());
        assert_eq!(corrs.len(), 2);
        assert!(matches!(corrs[0], Correspondence::Old(t) if t == &old[0]));
        assert!(matches!(corrs[1], Correspondence::Paired(a, b) if a == &old[1] && b == &new[0]));
    }

    #[test]
    fn test_feature_shortlist_prefers_nearest() {
        let config = FeatureConfig::default();
        let stmt = |children: Vec<Term<TestTypes>>| {
            featurize(Term::branch("statement", children), &config)
        };
        let leaf = |c: &'static str, label: &'static str| Term::<TestTypes>::leaf(c, label);

        let old = vec![
            stmt(vec![leaf("number", "v")]),
            stmt(vec![leaf("string", "v"), leaf("string", "v")]),
            stmt(vec![leaf("call", "v"), leaf("identifier", "v")]),
        ];
        // Same shape as `old[2]` with different labels. By cost alone `old[0]`
        // would win (3 against 4); by feature distance `old[2]` is nearest.
        let new = vec![stmt(vec![leaf("call", "w"), leaf("identifier", "w")])];

        let narrow = DiffConfig {
            candidates: 1,
            ..Default::default()
        };
        let corrs = align_terms(&old, &new, &narrow);
        let paired: Vec<_> = corrs.iter().filter(|c| c.is_paired()).collect();
        assert_eq!(paired.len(), 1);
        assert!(matches!(paired[0], Correspondence::Paired(a, _) if *a == &old[2]));
    }
}
