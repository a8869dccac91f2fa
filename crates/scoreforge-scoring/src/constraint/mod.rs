//! Constraint definitions and their score sinks.
//!
//! A [`Constraint`] is what a stream pipeline becomes once it is given a
//! weight and a name: the network node whose tuples it scores, plus the
//! functions that turn a tuple into a score, a justification and a set
//! of indicted objects.

mod sink;

#[cfg(test)]
mod tests;

pub(crate) use sink::{ConstraintSink, IndictmentIndex};

use std::fmt;
use std::sync::Arc;

use scoreforge_core::{ConstraintRef, ImpactType, PlanningSolution, Score};

use crate::api::analysis::ConstraintJustification;
use crate::network::Element;
use crate::stream::ConstraintFactory;

/// Computes the match weight of one tuple.
pub type Matcher<Sc> = Arc<dyn Fn(&[Element]) -> <Sc as Score>::Multiplier + Send + Sync>;

/// Builds the justification of one tuple given its score impact.
pub type Justifier<Sc> =
    Arc<dyn Fn(&[Element], Sc) -> Arc<dyn ConstraintJustification> + Send + Sync>;

/// Lists the objects one tuple indicts.
pub type Indicter = Arc<dyn Fn(&[Element]) -> Vec<Element> + Send + Sync>;

/// A named, weighted constraint over one stream.
pub struct Constraint<Sc: Score> {
    pub(crate) constraint_ref: ConstraintRef,
    pub(crate) weight: Sc,
    pub(crate) impact: ImpactType,
    pub(crate) node: Option<usize>,
    pub(crate) matcher: Option<Matcher<Sc>>,
    pub(crate) justifier: Option<Justifier<Sc>>,
    pub(crate) indicter: Option<Indicter>,
}

impl<Sc: Score> Constraint<Sc> {
    pub fn constraint_ref(&self) -> &ConstraintRef {
        &self.constraint_ref
    }

    /// Fully qualified id, `package/name`.
    pub fn id(&self) -> String {
        self.constraint_ref.full_name()
    }

    pub fn weight(&self) -> Sc {
        self.weight
    }

    pub fn impact_type(&self) -> ImpactType {
        self.impact
    }

    /// A constraint weighted zero is disabled and never evaluated.
    pub fn is_enabled(&self) -> bool {
        self.weight != Sc::zero()
    }

    /// Index of the plan node this constraint scores, `None` if its stream
    /// could not be built.
    pub fn node(&self) -> Option<usize> {
        self.node
    }

    /// Signed score of one tuple.
    pub(crate) fn impact_of(&self, facts: &[Element]) -> Sc {
        let base = match &self.matcher {
            Some(matcher) => self.weight.multiply_by(matcher(facts)),
            None => self.weight,
        };
        self.impact.apply(base)
    }
}

impl<Sc: Score> fmt::Debug for Constraint<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("id", &self.id())
            .field("weight", &self.weight)
            .field("impact", &self.impact)
            .field("node", &self.node)
            .finish()
    }
}

/// Defines the constraints of a planning problem.
///
/// Implemented for closures taking the factory, so a provider can be a
/// plain function.
pub trait ConstraintProvider<S: PlanningSolution> {
    fn define_constraints(&self, factory: &ConstraintFactory<S>) -> Vec<Constraint<S::Score>>;
}

impl<S, F> ConstraintProvider<S> for F
where
    S: PlanningSolution,
    F: Fn(&ConstraintFactory<S>) -> Vec<Constraint<S::Score>>,
{
    fn define_constraints(&self, factory: &ConstraintFactory<S>) -> Vec<Constraint<S::Score>> {
        self(factory)
    }
}
