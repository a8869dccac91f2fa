// Constraint factory: the entry point of the fluent constraint API.
//
// Streams do not evaluate anything. Every stream operation records a
// `NodeTemplate` in the factory's plan, interned by its parents and the
// identities of its functions, so identical sub-pipelines of different
// constraints resolve to the same node.

use std::any::{type_name, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use scoreforge_core::{ClassKind, PlanningSolution, SolutionDescriptor};
use smallvec::{smallvec, SmallVec};

use crate::network::{
    ConcatNode, DistinctNode, Element, ErasedCollector, ExistsNode, FactHandle, FilterNode,
    FlattenLastNode, Flattener, GroupNode, JoinIndexer, JoinNode, MapNode, Mapper, Node,
    Predicate, Side,
};

use super::function::Token;
use super::joiner::Joiner;
use super::{BiStream, UniStream};

// Recipe of one network node, instantiated once per session.
pub(crate) enum NodeTemplate {
    Source {
        class: usize,
    },
    Filter {
        parent: usize,
        predicate: Predicate,
    },
    Join {
        left: usize,
        right: usize,
        indexer: JoinIndexer,
    },
    Exists {
        left: usize,
        right: usize,
        should_exist: bool,
        indexer: JoinIndexer,
    },
    Group {
        parent: usize,
        keys: Vec<Mapper>,
        collectors: Vec<Arc<dyn ErasedCollector>>,
    },
    Map {
        parent: usize,
        mappers: Vec<Mapper>,
        keep_input: bool,
    },
    FlattenLast {
        parent: usize,
        flattener: Flattener,
    },
    Distinct {
        parent: usize,
    },
    Concat {
        left: usize,
        right: usize,
    },
}

impl NodeTemplate {
    pub(crate) fn parents(&self) -> SmallVec<[(usize, Side); 2]> {
        match *self {
            NodeTemplate::Source { .. } => SmallVec::new(),
            NodeTemplate::Filter { parent, .. }
            | NodeTemplate::Group { parent, .. }
            | NodeTemplate::Map { parent, .. }
            | NodeTemplate::FlattenLast { parent, .. }
            | NodeTemplate::Distinct { parent } => smallvec![(parent, Side::Left)],
            NodeTemplate::Join { left, right, .. }
            | NodeTemplate::Exists { left, right, .. }
            | NodeTemplate::Concat { left, right } => {
                smallvec![(left, Side::Left), (right, Side::Right)]
            }
        }
    }

    // Builds the runtime node. Sources are created by the network itself.
    pub(crate) fn instantiate(&self) -> Option<Box<dyn Node>> {
        let node: Box<dyn Node> = match self {
            NodeTemplate::Source { .. } => return None,
            NodeTemplate::Filter { predicate, .. } => Box::new(FilterNode::new(Arc::clone(predicate))),
            NodeTemplate::Join { indexer, .. } => Box::new(JoinNode::new(indexer.clone())),
            NodeTemplate::Exists {
                should_exist,
                indexer,
                ..
            } => Box::new(ExistsNode::new(*should_exist, indexer.clone())),
            NodeTemplate::Group {
                keys, collectors, ..
            } => Box::new(GroupNode::new(keys.clone(), collectors.clone())),
            NodeTemplate::Map {
                mappers,
                keep_input,
                ..
            } => {
                if *keep_input {
                    Box::new(MapNode::expand(mappers.clone()))
                } else {
                    Box::new(MapNode::map(mappers.clone()))
                }
            }
            NodeTemplate::FlattenLast { flattener, .. } => {
                Box::new(FlattenLastNode::new(Arc::clone(flattener)))
            }
            NodeTemplate::Distinct { .. } => Box::new(DistinctNode::new()),
            NodeTemplate::Concat { .. } => Box::new(ConcatNode::new()),
        };
        Some(node)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TemplateKey {
    op: &'static str,
    parents: SmallVec<[usize; 2]>,
    tokens: SmallVec<[Token; 4]>,
}

// The node templates and build errors collected while constraints are defined.
#[derive(Default)]
pub(crate) struct Plan {
    pub(crate) templates: Vec<NodeTemplate>,
    index: HashMap<TemplateKey, usize>,
    pub(crate) errors: Vec<String>,
    next_fresh: u64,
}

/// Factory for constraint streams over the solution type `S`.
///
/// Handed to a [`ConstraintProvider`](crate::ConstraintProvider) by
/// [`ConstraintSessionFactory`](crate::ConstraintSessionFactory). Streams
/// borrow the factory; all of them record into one shared node plan.
pub struct ConstraintFactory<S: PlanningSolution> {
    descriptor: Arc<SolutionDescriptor<S>>,
    plan: RefCell<Plan>,
}

impl<S: PlanningSolution> ConstraintFactory<S> {
    pub(crate) fn new(descriptor: Arc<SolutionDescriptor<S>>) -> Self {
        Self {
            descriptor,
            plan: RefCell::new(Plan::default()),
        }
    }

    pub fn descriptor(&self) -> &SolutionDescriptor<S> {
        &self.descriptor
    }

    /// The package used by `as_constraint` when none is given.
    pub fn default_package(&self) -> &str {
        &self.descriptor.constraint_package
    }

    /// Streams every instance of `A`.
    ///
    /// Planning entities and list values whose planning variable is unset
    /// are left out; problem facts are always included.
    pub fn for_each<A: 'static>(&self) -> UniStream<'_, S, A> {
        let node = self.class_source::<A>().and_then(|(source, kind)| {
            if kind.is_assignable() {
                self.assigned_filter(source)
            } else {
                Some(source)
            }
        });
        UniStream::at(self, node)
    }

    /// Streams every instance of `A`, assigned or not.
    pub fn for_each_including_unassigned<A: 'static>(&self) -> UniStream<'_, S, A> {
        let node = self.class_source::<A>().map(|(source, _)| source);
        UniStream::at(self, node)
    }

    /// Streams every unordered pair of distinct assigned instances of `A`
    /// that match `joiner`. Each pair appears once, ordered by insertion.
    pub fn for_each_unique_pair<A: 'static>(&self, joiner: Joiner<(A,), A>) -> BiStream<'_, S, A, A> {
        let joiner = joiner.with_filter(
            Arc::new(|left: &[Element], right: &[Element]| fact_id(&left[0]) < fact_id(&right[0])),
            Token::Const("unique_pair"),
        );
        self.for_each::<A>().join_stream(self.for_each::<A>(), joiner)
    }

    fn class_source<A: 'static>(&self) -> Option<(usize, ClassKind)> {
        let Some(class) = self.descriptor.class_index(TypeId::of::<A>()) else {
            self.record_error(format!(
                "The class ({}) is not a registered class of the solution ({}). \
                 It must be assignable from one of the planning entity, problem fact \
                 or list value classes ({}).",
                type_name::<A>(),
                self.descriptor.type_name,
                self.descriptor.class_names()
            ));
            return None;
        };
        let kind = self.descriptor.class(class).kind;
        let source = self.node(
            "source",
            &[],
            smallvec![Token::Type(TypeId::of::<A>())],
            |_| NodeTemplate::Source { class },
        )?;
        Some((source, kind))
    }

    fn assigned_filter(&self, source: usize) -> Option<usize> {
        self.node(
            "filter",
            &[Some(source)],
            smallvec![Token::Const("assigned")],
            |parents| NodeTemplate::Filter {
                parent: parents[0],
                predicate: Arc::new(|facts: &[Element]| {
                    facts[0].as_fact().is_some_and(FactHandle::is_assigned)
                }),
            },
        )
    }

    /// Interns a node. Returns `None` when a parent stream is broken.
    pub(crate) fn node(
        &self,
        op: &'static str,
        parents: &[Option<usize>],
        tokens: SmallVec<[Token; 4]>,
        build: impl FnOnce(&[usize]) -> NodeTemplate,
    ) -> Option<usize> {
        let parents: SmallVec<[usize; 2]> = parents.iter().copied().collect::<Option<_>>()?;
        let key = TemplateKey {
            op,
            parents,
            tokens,
        };
        let mut plan = self.plan.borrow_mut();
        if let Some(&index) = plan.index.get(&key) {
            return Some(index);
        }
        let template = build(&key.parents);
        let index = plan.templates.len();
        plan.templates.push(template);
        plan.index.insert(key, index);
        Some(index)
    }

    /// A token no other operation has.
    pub(crate) fn fresh_token(&self) -> Token {
        let mut plan = self.plan.borrow_mut();
        plan.next_fresh += 1;
        Token::Fresh(plan.next_fresh)
    }

    pub(crate) fn record_error(&self, message: String) {
        self.plan.borrow_mut().errors.push(message);
    }

    pub(crate) fn into_plan(self) -> Plan {
        self.plan.into_inner()
    }
}

pub(crate) fn fact_id(element: &Element) -> u64 {
    element.as_fact().map_or(u64::MAX, FactHandle::id)
}
