//! Filtering joiner for custom predicate matching.

use smallvec::smallvec;

use crate::stream::function::{erase_predicate, JoinPredicate, Token};

use super::{Joiner, JoinerPart};

/// Matches when `predicate(left elements.., right)` holds.
///
/// ```ignore
/// filtering(|a: &Task, b: &Task| a.priority > b.priority)
/// ```
pub fn filtering<L, R, F>(predicate: F) -> Joiner<L, R>
where
    L: 'static,
    R: 'static,
    F: JoinPredicate<L, R>,
{
    let predicate = erase_predicate(predicate);
    Joiner::from_part(JoinerPart::Filter {
        test: predicate.func,
        tokens: smallvec![Token::Const("filtering"), predicate.token],
    })
}
