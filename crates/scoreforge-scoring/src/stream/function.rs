//! Typed tuple functions and their erased, shareable form.
//!
//! Stream operations take ordinary closures. Before a closure reaches the
//! network it is erased to an `Arc<dyn Fn(&[Element]) -> R>` together with
//! a [`Token`] that decides whether two operations are the same node.

use std::any::TypeId;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::network::Element;

/// Identity of a function for node sharing.
///
/// Stateless closures and fn items are identified by their type, so the
/// same closure written once and reused is shared. A closure that captures
/// state is identified by its allocation and never shared unless it is
/// wrapped in [`Shared`] and the wrapper is cloned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Type(TypeId),
    Ptr(usize),
    Fresh(u64),
    Const(&'static str),
}

/// Returns the sharing token of a function of type `F` after it has been
/// erased into `erased`.
pub(crate) fn function_token<F: 'static, T: ?Sized>(erased: &Arc<T>) -> Token {
    if std::mem::size_of::<F>() == 0 {
        Token::Type(TypeId::of::<F>())
    } else {
        Token::Ptr(Arc::as_ptr(erased) as *const () as usize)
    }
}

/// A function explicitly shared between constraints.
///
/// Clones of one `Shared` compare equal for node sharing even when the
/// wrapped closure captures state.
pub struct Shared<F>(Arc<F>);

impl<F> Shared<F> {
    pub fn new(function: F) -> Self {
        Self(Arc::new(function))
    }

    fn token(&self) -> Token {
        Token::Ptr(Arc::as_ptr(&self.0) as *const () as usize)
    }
}

impl<F> Clone for Shared<F> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// A function over the elements of a tuple typed by `L`.
///
/// `L` is a tuple marker: `(A,)` for one element, `(A, B)` for two and so
/// on. Implemented for closures taking the elements by reference.
pub trait TupleFn<L, R>: Send + Sync + 'static {
    fn call(&self, facts: &[Element]) -> R;

    /// Sharing identity when the function carries its own.
    fn identity(&self) -> Option<Token> {
        None
    }
}

impl<A: 'static, R, F> TupleFn<(A,), R> for F
where
    F: Fn(&A) -> R + Send + Sync + 'static,
{
    fn call(&self, facts: &[Element]) -> R {
        self(facts[0].get::<A>())
    }
}

impl<A: 'static, B: 'static, R, F> TupleFn<(A, B), R> for F
where
    F: Fn(&A, &B) -> R + Send + Sync + 'static,
{
    fn call(&self, facts: &[Element]) -> R {
        self(facts[0].get::<A>(), facts[1].get::<B>())
    }
}

impl<A: 'static, B: 'static, C: 'static, R, F> TupleFn<(A, B, C), R> for F
where
    F: Fn(&A, &B, &C) -> R + Send + Sync + 'static,
{
    fn call(&self, facts: &[Element]) -> R {
        self(facts[0].get::<A>(), facts[1].get::<B>(), facts[2].get::<C>())
    }
}

impl<A: 'static, B: 'static, C: 'static, D: 'static, R, F> TupleFn<(A, B, C, D), R> for F
where
    F: Fn(&A, &B, &C, &D) -> R + Send + Sync + 'static,
{
    fn call(&self, facts: &[Element]) -> R {
        self(
            facts[0].get::<A>(),
            facts[1].get::<B>(),
            facts[2].get::<C>(),
            facts[3].get::<D>(),
        )
    }
}

impl<L, R, F> TupleFn<L, R> for Shared<F>
where
    F: TupleFn<L, R>,
{
    fn call(&self, facts: &[Element]) -> R {
        self.0.call(facts)
    }

    fn identity(&self) -> Option<Token> {
        Some(self.token())
    }
}

/// A predicate over a left tuple typed by `L` and one right element `R`.
pub trait JoinPredicate<L, R>: Send + Sync + 'static {
    fn test(&self, left: &[Element], right: &[Element]) -> bool;

    fn identity(&self) -> Option<Token> {
        None
    }
}

impl<A: 'static, R: 'static, F> JoinPredicate<(A,), R> for F
where
    F: Fn(&A, &R) -> bool + Send + Sync + 'static,
{
    fn test(&self, left: &[Element], right: &[Element]) -> bool {
        self(left[0].get::<A>(), right[0].get::<R>())
    }
}

impl<A: 'static, B: 'static, R: 'static, F> JoinPredicate<(A, B), R> for F
where
    F: Fn(&A, &B, &R) -> bool + Send + Sync + 'static,
{
    fn test(&self, left: &[Element], right: &[Element]) -> bool {
        self(left[0].get::<A>(), left[1].get::<B>(), right[0].get::<R>())
    }
}

impl<A: 'static, B: 'static, C: 'static, R: 'static, F> JoinPredicate<(A, B, C), R> for F
where
    F: Fn(&A, &B, &C, &R) -> bool + Send + Sync + 'static,
{
    fn test(&self, left: &[Element], right: &[Element]) -> bool {
        self(
            left[0].get::<A>(),
            left[1].get::<B>(),
            left[2].get::<C>(),
            right[0].get::<R>(),
        )
    }
}

impl<A: 'static, B: 'static, C: 'static, D: 'static, R: 'static, F> JoinPredicate<(A, B, C, D), R>
    for F
where
    F: Fn(&A, &B, &C, &D, &R) -> bool + Send + Sync + 'static,
{
    fn test(&self, left: &[Element], right: &[Element]) -> bool {
        self(
            left[0].get::<A>(),
            left[1].get::<B>(),
            left[2].get::<C>(),
            left[3].get::<D>(),
            right[0].get::<R>(),
        )
    }
}

impl<L, R, F> JoinPredicate<L, R> for Shared<F>
where
    F: JoinPredicate<L, R>,
{
    fn test(&self, left: &[Element], right: &[Element]) -> bool {
        self.0.test(left, right)
    }

    fn identity(&self) -> Option<Token> {
        Some(self.token())
    }
}

/// An erased tuple function and its sharing token.
pub(crate) struct ErasedFn<R> {
    pub(crate) func: Arc<dyn Fn(&[Element]) -> R + Send + Sync>,
    pub(crate) token: Token,
}

impl<R> Clone for ErasedFn<R> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
            token: self.token,
        }
    }
}

pub(crate) fn erase<L: 'static, R: 'static, F: TupleFn<L, R>>(function: F) -> ErasedFn<R> {
    let identity = function.identity();
    let func: Arc<dyn Fn(&[Element]) -> R + Send + Sync> =
        Arc::new(move |facts: &[Element]| function.call(facts));
    let token = identity.unwrap_or_else(|| function_token::<F, _>(&func));
    ErasedFn { func, token }
}

/// An erased join predicate and its sharing token.
pub(crate) struct ErasedPredicate {
    pub(crate) func: Arc<dyn Fn(&[Element], &[Element]) -> bool + Send + Sync>,
    pub(crate) token: Token,
}

pub(crate) fn erase_predicate<L: 'static, R: 'static, F: JoinPredicate<L, R>>(
    predicate: F,
) -> ErasedPredicate {
    let identity = predicate.identity();
    let func: Arc<dyn Fn(&[Element], &[Element]) -> bool + Send + Sync> =
        Arc::new(move |left: &[Element], right: &[Element]| predicate.test(left, right));
    let token = identity.unwrap_or_else(|| function_token::<F, _>(&func));
    ErasedPredicate { func, token }
}

/// Marker carried by typed wrappers around erased functions.
pub(crate) type Marker<L> = PhantomData<fn(L)>;
