//! The node interface shared by every stage of the network.

use std::sync::Arc;

use smallvec::SmallVec;

use super::element::{Element, Facts};
use super::source::SourceNode;
use super::tuple::{Signal, TupleId};

/// Which parent a signal comes from. Single-parent nodes only see `Left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// Where a node's output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Node(usize, Side),
    Sink(usize),
}

/// Predicate over one tuple.
pub type Predicate = Arc<dyn Fn(&[Element]) -> bool + Send + Sync>;

/// Computes one element from a tuple.
pub type Mapper = Arc<dyn Fn(&[Element]) -> Element + Send + Sync>;

/// Predicate over a left tuple and a right tuple.
pub type PairPredicate = Arc<dyn Fn(&[Element], &[Element]) -> bool + Send + Sync>;

/// Expands the last element of a tuple into zero or more elements.
pub type Flattener = Arc<dyn Fn(&Element) -> Vec<Element> + Send + Sync>;

/// Hash key of a join, exists or group bucket.
pub type Key = SmallVec<[Element; 2]>;

/// One stage of the evaluation network.
///
/// Parents call `insert`/`update`/`retract` with their own tuple ids. A
/// node buffers its resulting output changes and announces them in `drain`.
pub trait Node: Send {
    fn insert(&mut self, side: Side, id: TupleId, facts: &Facts);

    fn update(&mut self, side: Side, id: TupleId, facts: &Facts);

    fn retract(&mut self, side: Side, id: TupleId);

    fn drain(&mut self, out: &mut Vec<Signal>);

    /// Returns the node as a fact source, if it is one.
    fn as_source(&mut self) -> Option<&mut SourceNode> {
        None
    }
}

/// Equality keys and residual predicates of a two-parent node.
#[derive(Clone, Default)]
pub struct JoinIndexer {
    pub left_keys: Vec<Mapper>,
    pub right_keys: Vec<Mapper>,
    pub filters: Vec<PairPredicate>,
}

impl JoinIndexer {
    pub fn left_key(&self, facts: &[Element]) -> Key {
        self.left_keys.iter().map(|key| key(facts)).collect()
    }

    pub fn right_key(&self, facts: &[Element]) -> Key {
        self.right_keys.iter().map(|key| key(facts)).collect()
    }

    /// Evaluates the non-indexed conditions of a candidate pair.
    pub fn test(&self, left: &[Element], right: &[Element]) -> bool {
        self.filters.iter().all(|filter| filter(left, right))
    }
}

/// Concatenates two tuples' elements.
pub fn join_facts(left: &[Element], right: &[Element]) -> Facts {
    left.iter().chain(right.iter()).cloned().collect()
}
