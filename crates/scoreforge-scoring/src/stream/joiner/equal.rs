// Equality joiners. These become hash keys of the join index.

use std::hash::Hash;
use std::sync::Arc;

use scoreforge_core::DomainObject;

use crate::network::{Element, Mapper};
use crate::stream::function::{erase, ErasedFn, TupleFn};

use super::{Joiner, JoinerPart};

// Matches when the same key function yields equal values on both sides.
//
// Used for self-joins and existence checks against the same class:
// `equal(|s: &Shift| s.employee)`.
pub fn equal<A, K, F>(key: F) -> Joiner<(A,), A>
where
    A: 'static,
    K: DomainObject + Eq + Hash,
    F: TupleFn<(A,), K> + Clone,
{
    let left = erase::<(A,), K, F>(key.clone());
    let right = erase::<(A,), K, F>(key);
    equal_part(left, right)
}

// Matches when `left(tuple) == right(element)`.
pub fn equal_bi<L, R, K, Fl, Fr>(left: Fl, right: Fr) -> Joiner<L, R>
where
    L: 'static,
    R: 'static,
    K: DomainObject + Eq + Hash,
    Fl: TupleFn<L, K>,
    Fr: TupleFn<(R,), K>,
{
    equal_part(erase(left), erase(right))
}

fn equal_part<L, R, K>(left: ErasedFn<K>, right: ErasedFn<K>) -> Joiner<L, R>
where
    K: DomainObject + Eq + Hash,
{
    let tokens = [left.token, right.token];
    let left_fn = left.func;
    let right_fn = right.func;
    let left: Mapper = Arc::new(move |facts: &[Element]| Element::value(left_fn(facts)));
    let right: Mapper = Arc::new(move |facts: &[Element]| Element::value(right_fn(facts)));
    Joiner::from_part(JoinerPart::Equal {
        left,
        right,
        tokens,
    })
}
