//! Bounded approximate edit distance between two terms.
//!
//! Children are paired greedily by position; a child without a partner costs
//! its node count, a pair of incomparable or differently shaped nodes costs
//! both node counts, and a comparable pair costs only what its children cost.
//! Every node considered spends one unit of budget, and once the budget is
//! gone the rest of the structure is taken to be free. The result is an
//! estimate used to rank candidates, never a true distance.

use crate::term::{Syntax, Term, TermTypes};

/// Approximate the cost of turning `a` into `b`, looking at no more than
/// `budget` nodes.
pub fn edit_distance_up_to<T: TermTypes>(a: &Term<T>, b: &Term<T>, budget: usize) -> usize {
    let mut remaining = budget;
    approximate(a, b, &mut remaining)
}

fn approximate<T: TermTypes>(a: &Term<T>, b: &Term<T>, remaining: &mut usize) -> usize {
    if *remaining == 0 {
        return 0;
    }
    *remaining -= 1;

    if !a.comparable(b) || a.shape() != b.shape() {
        return a.size() + b.size();
    }

    match (a.syntax(), b.syntax()) {
        (Syntax::Leaf(x), Syntax::Leaf(y)) => {
            if x == y {
                0
            } else {
                2
            }
        }
        (x, y) => {
            let slot = match (x.slot(), y.slot()) {
                (Some(s), Some(t)) => approximate(s, t, remaining),
                (Some(only), None) | (None, Some(only)) => unmatched(only, remaining),
                (None, None) => 0,
            };
            slot + positional(x.children(), y.children(), remaining)
        }
    }
}

fn positional<T: TermTypes>(a: &[Term<T>], b: &[Term<T>], remaining: &mut usize) -> usize {
    let mut cost = 0;
    for i in 0..a.len().max(b.len()) {
        if *remaining == 0 {
            break;
        }
        cost += match (a.get(i), b.get(i)) {
            (Some(x), Some(y)) => approximate(x, y, remaining),
            (Some(only), None) | (None, Some(only)) => unmatched(only, remaining),
            (None, None) => 0,
        };
    }
    cost
}

fn unmatched<T: TermTypes>(term: &Term<T>, remaining: &mut usize) -> usize {
    if *remaining == 0 {
        return 0;
    }
    *remaining -= 1;
    term.size()
}
