//! Interval overlap joiner.

use std::sync::Arc;

use smallvec::smallvec;

use crate::network::{Element, PairPredicate};
use crate::stream::function::{erase, Token, TupleFn};

use super::{Joiner, JoinerPart};

/// Matches when the half-open intervals `[start_a, end_a)` of the left
/// tuple and `[start_b, end_b)` of the right element overlap.
///
/// Intervals that only touch (`end_a == start_b`) do not overlap.
pub fn overlapping<L, R, T, Fsa, Fea, Fsb, Feb>(
    start_a: Fsa,
    end_a: Fea,
    start_b: Fsb,
    end_b: Feb,
) -> Joiner<L, R>
where
    L: 'static,
    R: 'static,
    T: Ord + 'static,
    Fsa: TupleFn<L, T>,
    Fea: TupleFn<L, T>,
    Fsb: TupleFn<(R,), T>,
    Feb: TupleFn<(R,), T>,
{
    let (start_a, end_a) = (erase(start_a), erase(end_a));
    let (start_b, end_b) = (erase(start_b), erase(end_b));
    let tokens = smallvec![
        Token::Const("overlapping"),
        start_a.token,
        end_a.token,
        start_b.token,
        end_b.token,
    ];
    let test: PairPredicate = Arc::new(move |l: &[Element], r: &[Element]| {
        (start_a.func)(l) < (end_b.func)(r) && (start_b.func)(r) < (end_a.func)(l)
    });
    Joiner::from_part(JoinerPart::Filter { test, tokens })
}
