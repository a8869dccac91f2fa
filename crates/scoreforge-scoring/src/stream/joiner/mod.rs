// Joiners for constraint stream joins and existence checks.
//
// A joiner describes when a left tuple matches a right element. Equality
// joiners become hash keys of the join index; every other joiner is a
// residual predicate evaluated on each candidate pair of a bucket.
//
// Joiners are typed by the left tuple marker `L` (`(A,)`, `(A, B)`, ...)
// and the right element `R`, and compose with `and`.

mod comparison;
mod equal;
mod filtering;
mod overlapping;

#[cfg(test)]
mod tests;

pub use comparison::{greater_than, greater_than_or_equal, less_than, less_than_or_equal};
pub use equal::{equal, equal_bi};
pub use filtering::filtering;
pub use overlapping::overlapping;

use std::sync::Arc;

use smallvec::SmallVec;

use crate::network::{Element, JoinIndexer, Mapper, PairPredicate};

use super::function::{Marker, Token};

// One condition of a joiner.
pub(crate) enum JoinerPart {
    Equal {
        left: Mapper,
        right: Mapper,
        tokens: [Token; 2],
    },
    Filter {
        test: PairPredicate,
        tokens: SmallVec<[Token; 4]>,
    },
}

impl Clone for JoinerPart {
    fn clone(&self) -> Self {
        match self {
            JoinerPart::Equal {
                left,
                right,
                tokens,
            } => JoinerPart::Equal {
                left: Arc::clone(left),
                right: Arc::clone(right),
                tokens: *tokens,
            },
            JoinerPart::Filter { test, tokens } => JoinerPart::Filter {
                test: Arc::clone(test),
                tokens: tokens.clone(),
            },
        }
    }
}

// A matching condition between a left tuple `L` and a right element `R`.
//
// An empty joiner (see [`cross`]) matches every pair.
pub struct Joiner<L, R> {
    parts: Vec<JoinerPart>,
    _phantom: Marker<(L, R)>,
}

impl<L, R> Clone for Joiner<L, R> {
    fn clone(&self) -> Self {
        Self {
            parts: self.parts.clone(),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<L, R> Joiner<L, R> {
    pub(crate) fn from_part(part: JoinerPart) -> Self {
        Self {
            parts: vec![part],
            _phantom: std::marker::PhantomData,
        }
    }

    // Combines this joiner with another; both must match.
    pub fn and(mut self, other: Joiner<L, R>) -> Self {
        self.parts.extend(other.parts);
        self
    }

    pub(crate) fn with_filter(self, test: PairPredicate, token: Token) -> Self {
        self.and(Joiner::from_part(JoinerPart::Filter {
            test,
            tokens: SmallVec::from_elem(token, 1),
        }))
    }

    pub(crate) fn tokens(&self) -> SmallVec<[Token; 4]> {
        let mut tokens = SmallVec::new();
        for part in &self.parts {
            match part {
                JoinerPart::Equal { tokens: pair, .. } => {
                    tokens.push(Token::Const("equal"));
                    tokens.extend_from_slice(pair);
                }
                JoinerPart::Filter { tokens: own, .. } => {
                    tokens.push(Token::Const("filter"));
                    tokens.extend_from_slice(own);
                }
            }
        }
        tokens
    }

    pub(crate) fn indexer(&self) -> JoinIndexer {
        let mut indexer = JoinIndexer::default();
        for part in &self.parts {
            match part {
                JoinerPart::Equal { left, right, .. } => {
                    indexer.left_keys.push(Arc::clone(left));
                    indexer.right_keys.push(Arc::clone(right));
                }
                JoinerPart::Filter { test, .. } => indexer.filters.push(Arc::clone(test)),
            }
        }
        indexer
    }

    // Evaluates the joiner on a left tuple and a right element.
    pub fn matches(&self, left: &[Element], right: &Element) -> bool {
        let indexer = self.indexer();
        let right = std::slice::from_ref(right);
        indexer.left_key(left) == indexer.right_key(right) && indexer.test(left, right)
    }
}

// A joiner without conditions: every pair matches.
pub fn cross<L, R>() -> Joiner<L, R> {
    Joiner {
        parts: Vec::new(),
        _phantom: std::marker::PhantomData,
    }
}

// Matches a tuple with its own first element.
pub(crate) fn identity<A>() -> Joiner<(A,), A> {
    let key: Mapper = Arc::new(|facts: &[Element]| facts[0].clone());
    Joiner::from_part(JoinerPart::Equal {
        left: Arc::clone(&key),
        right: key,
        tokens: [Token::Const("identity"); 2],
    })
}
