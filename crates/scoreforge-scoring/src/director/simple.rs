//! Simple score director with full recalculation.

use std::sync::Arc;

use scoreforge_core::{PlanningSolution, Result, SolutionDescriptor};

use crate::api::analysis::ConstraintMatchPolicy;
use crate::api::constraint_set::ConstraintSessionFactory;
use crate::network::FactId;

use super::change::{Addition, Removal, VariableChange};
use super::traits::ScoreDirector;

/// A score director that rebuilds a session for every score calculation.
///
/// Notifications only mark the score dirty. This is slow but trivially
/// correct, which makes it the reference incremental scoring is tested
/// against.
pub struct SimpleScoreDirector<S: PlanningSolution> {
    factory: Arc<ConstraintSessionFactory<S>>,
    working_solution: S,
    score_dirty: bool,
    cached_score: Option<S::Score>,
    calculation_count: u64,
}

impl<S: PlanningSolution> SimpleScoreDirector<S> {
    pub fn new(factory: Arc<ConstraintSessionFactory<S>>, solution: S) -> Self {
        SimpleScoreDirector {
            factory,
            working_solution: solution,
            score_dirty: true,
            cached_score: None,
            calculation_count: 0,
        }
    }

    fn mark_dirty(&mut self) {
        self.score_dirty = true;
    }
}

impl<S: PlanningSolution> ScoreDirector<S> for SimpleScoreDirector<S> {
    fn working_solution(&self) -> &S {
        &self.working_solution
    }

    fn working_solution_mut(&mut self) -> &mut S {
        self.mark_dirty();
        &mut self.working_solution
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        self.factory.descriptor()
    }

    fn calculate_score(&mut self) -> Result<S::Score> {
        self.calculation_count += 1;
        if !self.score_dirty {
            if let Some(score) = self.cached_score {
                return Ok(score);
            }
        }

        let descriptor = self.factory.descriptor();
        let ids: Vec<Vec<FactId>> = descriptor
            .classes()
            .iter()
            .scan(0, |next: &mut FactId, class| {
                let count = class.count(&self.working_solution) as FactId;
                let ids = (*next..*next + count).collect();
                *next += count;
                Some(ids)
            })
            .collect();
        let mut session = self.factory.build_session(ConstraintMatchPolicy::Disabled);
        session.insert_solution(&self.working_solution, &ids);
        let score = session.calculate_score();

        self.working_solution.set_score(Some(score));
        self.cached_score = Some(score);
        self.score_dirty = false;
        Ok(score)
    }

    fn calculation_count(&self) -> u64 {
        self.calculation_count
    }

    fn before_entity_added(&mut self, class: usize, index: usize) -> Addition {
        self.mark_dirty();
        Addition { class, index }
    }

    fn after_entity_added(&mut self, _change: Addition) {}

    fn before_entity_removed(&mut self, class: usize, index: usize) -> Removal {
        self.mark_dirty();
        Removal {
            class,
            index,
            fact_id: None,
        }
    }

    fn after_entity_removed(&mut self, _change: Removal) {}

    fn before_variable_changed(&mut self, class: usize, index: usize) -> VariableChange {
        self.mark_dirty();
        VariableChange { class, index }
    }

    fn after_variable_changed(&mut self, _change: VariableChange) {
        // Already marked dirty in before_variable_changed
    }
}
