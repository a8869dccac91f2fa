//! The incremental evaluation network.
//!
//! A network is a DAG of [`Node`]s stored in topological order: every node
//! is added after its parents. Domain changes enter through per-class
//! [`SourceNode`]s and are buffered in each node's [`OutputTuples`] until
//! [`Network::settle`] drains the nodes front to back, which leaves every
//! node consistent with its inputs in a single pass.

mod concat;
mod distinct;
mod element;
mod exists;
mod filter;
mod group;
mod join;
mod node;
mod source;
mod transform;
mod tuple;

#[cfg(test)]
mod tests;

pub use concat::ConcatNode;
pub use distinct::DistinctNode;
pub use element::{Element, FactHandle, FactId, Facts, ValueObject};
pub use exists::ExistsNode;
pub use filter::FilterNode;
pub use group::{ErasedAccumulator, ErasedCollector, GroupNode};
pub use join::JoinNode;
pub use node::{
    join_facts, Flattener, JoinIndexer, Key, Mapper, Node, PairPredicate, Predicate, Side, Target,
};
pub use source::SourceNode;
pub use transform::{FlattenLastNode, MapNode};
pub use tuple::{IdMap, OutputTuples, Signal, TupleId, TupleState};

/// A compiled, instantiated network of nodes.
pub struct Network {
    nodes: Vec<Box<dyn Node>>,
    children: Vec<Vec<Target>>,
    sources: Vec<Option<usize>>,
    buffer: Vec<Signal>,
}

impl Network {
    /// Creates an empty network for a solution with `class_count` classes.
    pub fn new(class_count: usize) -> Self {
        Self {
            nodes: Vec::new(),
            children: Vec::new(),
            sources: vec![None; class_count],
            buffer: Vec::new(),
        }
    }

    /// Adds the source node of a class, returning its index.
    pub fn add_source(&mut self, class: usize) -> usize {
        let index = self.add_node(Box::new(SourceNode::new()), &[]);
        if class >= self.sources.len() {
            self.sources.resize(class + 1, None);
        }
        self.sources[class] = Some(index);
        index
    }

    /// Adds a node fed by the given parents, returning its index.
    ///
    /// # Panics
    /// Panics if a parent has not been added yet.
    pub fn add_node(&mut self, node: Box<dyn Node>, parents: &[(usize, Side)]) -> usize {
        let index = self.nodes.len();
        for &(parent, side) in parents {
            assert!(parent < index, "Parent node {} must precede node {}", parent, index);
            self.children[parent].push(Target::Node(index, side));
        }
        self.nodes.push(node);
        self.children.push(Vec::new());
        index
    }

    /// Routes the output of `parent` to the sink with the given index.
    pub fn add_sink(&mut self, parent: usize, sink: usize) {
        self.children[parent].push(Target::Sink(sink));
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn has_source(&self, class: usize) -> bool {
        self.sources.get(class).copied().flatten().is_some()
    }

    pub fn insert_fact(&mut self, class: usize, handle: FactHandle) {
        if let Some(source) = self.source_of(class) {
            source.insert_fact(handle);
        }
    }

    pub fn update_fact(&mut self, class: usize, handle: FactHandle) {
        if let Some(source) = self.source_of(class) {
            source.update_fact(handle);
        }
    }

    pub fn retract_fact(&mut self, class: usize, fact_id: FactId) {
        if let Some(source) = self.source_of(class) {
            source.retract_fact(fact_id);
        }
    }

    /// Propagates every buffered change to the sinks.
    pub fn settle(&mut self, mut on_sink: impl FnMut(usize, &Signal)) {
        let mut signals = std::mem::take(&mut self.buffer);
        for index in 0..self.nodes.len() {
            self.nodes[index].drain(&mut signals);
            for signal in &signals {
                for &target in &self.children[index] {
                    match target {
                        Target::Node(child, side) => deliver(&mut *self.nodes[child], side, signal),
                        Target::Sink(sink) => on_sink(sink, signal),
                    }
                }
            }
            signals.clear();
        }
        self.buffer = signals;
    }

    fn source_of(&mut self, class: usize) -> Option<&mut SourceNode> {
        let index = (*self.sources.get(class)?)?;
        self.nodes[index].as_source()
    }
}

fn deliver(node: &mut dyn Node, side: Side, signal: &Signal) {
    match signal {
        Signal::Insert(id, facts) => node.insert(side, *id, facts),
        Signal::Update(id, facts) => node.update(side, *id, facts),
        Signal::Retract(id) => node.retract(side, *id),
    }
}
