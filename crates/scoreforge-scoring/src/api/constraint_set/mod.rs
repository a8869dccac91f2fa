//! Compiled constraint sets.
//!
//! A [`ConstraintSessionFactory`] runs a [`ConstraintProvider`] once,
//! validates the constraints it defines and keeps the resulting node plan.
//! Every [`ConstraintSession`] built from it owns a private network
//! instantiated from that plan.

mod session;

pub use session::ConstraintSession;
pub(crate) use session::{fact_handle, MatchRecord};

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use scoreforge_core::{ConstraintRef, PlanningSolution, Result, SolutionDescriptor, SolverForgeError};
use tracing::{debug, warn};

use crate::api::analysis::ConstraintMatchPolicy;
use crate::api::weight_overrides::{ConstraintWeightOverrides, WeightProvider};
use crate::constraint::{Constraint, ConstraintProvider, ConstraintSink};
use crate::network::Network;
use crate::stream::{ConstraintFactory, NodeTemplate};

/// Validated constraints and the shared node plan they compile to.
pub struct ConstraintSessionFactory<S: PlanningSolution> {
    descriptor: Arc<SolutionDescriptor<S>>,
    templates: Vec<NodeTemplate>,
    reachable: Vec<bool>,
    constraints: Vec<Arc<Constraint<S::Score>>>,
}

impl<S: PlanningSolution> ConstraintSessionFactory<S> {
    /// Compiles the constraints of `provider` with their own weights.
    pub fn new<P>(descriptor: SolutionDescriptor<S>, provider: &P) -> Result<Self>
    where
        P: ConstraintProvider<S> + ?Sized,
    {
        Self::with_weight_overrides(descriptor, provider, &ConstraintWeightOverrides::new())
    }

    /// Compiles the constraints of `provider`, replacing the weight of
    /// every constraint listed in `overrides`.
    ///
    /// Fails when a stream references a class the solution does not
    /// declare, when a constraint is built inconsistently or when two
    /// constraints share an id.
    pub fn with_weight_overrides<P>(
        descriptor: SolutionDescriptor<S>,
        provider: &P,
        overrides: &ConstraintWeightOverrides<S::Score>,
    ) -> Result<Self>
    where
        P: ConstraintProvider<S> + ?Sized,
    {
        let descriptor = Arc::new(descriptor);
        let factory = ConstraintFactory::new(Arc::clone(&descriptor));
        let defined = provider.define_constraints(&factory);
        let plan = factory.into_plan();

        if !plan.errors.is_empty() {
            return Err(SolverForgeError::Config(plan.errors.join("\n")));
        }

        let mut ids = HashSet::with_capacity(defined.len());
        for constraint in &defined {
            let id = constraint.id();
            if !ids.insert(id.clone()) {
                return Err(SolverForgeError::Config(format!(
                    "The constraint id ({id}) is used by more than one constraint. \
                     Give each constraint a unique name within its package."
                )));
            }
        }

        let refs: Vec<&ConstraintRef> = defined.iter().map(Constraint::constraint_ref).collect();
        let unknown = overrides.unknown_ids(&refs);
        if !unknown.is_empty() {
            warn!(
                event = "unknown_weight_overrides",
                ids = ?unknown,
                "Constraint weight overrides reference constraints that do not exist"
            );
        }

        let constraints: Vec<Arc<Constraint<S::Score>>> = defined
            .into_iter()
            .map(|mut constraint| {
                constraint.weight = overrides.weight_or_default(&constraint.id(), constraint.weight);
                Arc::new(constraint)
            })
            .collect();

        // Only nodes feeding an enabled constraint are ever instantiated.
        let mut reachable = vec![false; plan.templates.len()];
        let mut stack: Vec<usize> = constraints
            .iter()
            .filter(|c| c.is_enabled())
            .filter_map(|c| c.node)
            .collect();
        while let Some(index) = stack.pop() {
            if !reachable[index] {
                reachable[index] = true;
                stack.extend(plan.templates[index].parents().iter().map(|&(parent, _)| parent));
            }
        }

        debug!(
            event = "constraint_set_compiled",
            constraints = constraints.len(),
            enabled = constraints.iter().filter(|c| c.is_enabled()).count(),
            nodes = reachable.iter().filter(|r| **r).count(),
        );

        Ok(Self {
            descriptor,
            templates: plan.templates,
            reachable,
            constraints,
        })
    }

    pub fn descriptor(&self) -> &SolutionDescriptor<S> {
        &self.descriptor
    }

    /// Every defined constraint, disabled ones included.
    pub fn constraints(&self) -> &[Arc<Constraint<S::Score>>] {
        &self.constraints
    }

    pub fn constraint(&self, id: &str) -> Option<&Constraint<S::Score>> {
        self.constraints
            .iter()
            .find(|c| c.id() == id)
            .map(|c| c.as_ref())
    }

    /// Number of nodes a session instantiates.
    pub fn node_count(&self) -> usize {
        self.reachable.iter().filter(|r| **r).count()
    }

    /// Instantiates a fresh, empty session.
    pub fn build_session(&self, policy: ConstraintMatchPolicy) -> ConstraintSession<S> {
        let mut network = Network::new(self.descriptor.classes().len());
        let mut mapping: Vec<Option<usize>> = vec![None; self.templates.len()];

        for (index, template) in self.templates.iter().enumerate() {
            if !self.reachable[index] {
                continue;
            }
            let node = match template {
                NodeTemplate::Source { class } => network.add_source(*class),
                _ => {
                    let Some(node) = template.instantiate() else {
                        continue;
                    };
                    let parents: Vec<_> = template
                        .parents()
                        .into_iter()
                        .filter_map(|(parent, side)| mapping[parent].map(|p| (p, side)))
                        .collect();
                    network.add_node(node, &parents)
                }
            };
            mapping[index] = Some(node);
        }

        let mut sinks = Vec::new();
        for constraint in self.constraints.iter().filter(|c| c.is_enabled()) {
            if let Some(node) = constraint.node.and_then(|n| mapping[n]) {
                network.add_sink(node, sinks.len());
                sinks.push(ConstraintSink::new(Arc::clone(constraint), policy.is_enabled()));
            }
        }

        debug!(
            event = "constraint_session_built",
            nodes = network.node_count(),
            constraints = sinks.len(),
        );

        ConstraintSession::new(Arc::clone(&self.descriptor), network, sinks, policy)
    }
}

impl<S: PlanningSolution> fmt::Debug for ConstraintSessionFactory<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSessionFactory")
            .field("solution", &self.descriptor.type_name)
            .field("constraints", &self.constraints.len())
            .field("nodes", &self.node_count())
            .finish()
    }
}
