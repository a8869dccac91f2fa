//! Comparison joiners.
//!
//! Unlike [`equal`](super::equal) these are not indexed: they are checked
//! on every candidate pair that survives the equality keys.

use std::sync::Arc;

use smallvec::smallvec;

use crate::network::{Element, PairPredicate};
use crate::stream::function::{erase, Token, TupleFn};

use super::{Joiner, JoinerPart};

fn comparison<L, R, T, Fl, Fr>(
    name: &'static str,
    left: Fl,
    right: Fr,
    accept: fn(&T, &T) -> bool,
) -> Joiner<L, R>
where
    L: 'static,
    R: 'static,
    T: Ord + 'static,
    Fl: TupleFn<L, T>,
    Fr: TupleFn<(R,), T>,
{
    let left = erase(left);
    let right = erase(right);
    let tokens = smallvec![Token::Const(name), left.token, right.token];
    let (left, right) = (left.func, right.func);
    let test: PairPredicate =
        Arc::new(move |l: &[Element], r: &[Element]| accept(&left(l), &right(r)));
    Joiner::from_part(JoinerPart::Filter { test, tokens })
}

/// Matches when `left(tuple) < right(element)`.
pub fn less_than<L, R, T, Fl, Fr>(left: Fl, right: Fr) -> Joiner<L, R>
where
    L: 'static,
    R: 'static,
    T: Ord + 'static,
    Fl: TupleFn<L, T>,
    Fr: TupleFn<(R,), T>,
{
    comparison("less_than", left, right, |a, b| a < b)
}

/// Matches when `left(tuple) <= right(element)`.
pub fn less_than_or_equal<L, R, T, Fl, Fr>(left: Fl, right: Fr) -> Joiner<L, R>
where
    L: 'static,
    R: 'static,
    T: Ord + 'static,
    Fl: TupleFn<L, T>,
    Fr: TupleFn<(R,), T>,
{
    comparison("less_than_or_equal", left, right, |a, b| a <= b)
}

/// Matches when `left(tuple) > right(element)`.
pub fn greater_than<L, R, T, Fl, Fr>(left: Fl, right: Fr) -> Joiner<L, R>
where
    L: 'static,
    R: 'static,
    T: Ord + 'static,
    Fl: TupleFn<L, T>,
    Fr: TupleFn<(R,), T>,
{
    comparison("greater_than", left, right, |a, b| a > b)
}

/// Matches when `left(tuple) >= right(element)`.
pub fn greater_than_or_equal<L, R, T, Fl, Fr>(left: Fl, right: Fr) -> Joiner<L, R>
where
    L: 'static,
    R: 'static,
    T: Ord + 'static,
    Fl: TupleFn<L, T>,
    Fr: TupleFn<(R,), T>,
{
    comparison("greater_than_or_equal", left, right, |a, b| a >= b)
}
