//! Score director factory for creating score directors.

use std::sync::Arc;

use scoreforge_config::EnvironmentMode;
use scoreforge_core::{PlanningSolution, Result, SolutionDescriptor};

use crate::api::analysis::ConstraintMatchPolicy;
use crate::api::constraint_set::ConstraintSessionFactory;
use crate::api::weight_overrides::ConstraintWeightOverrides;
use crate::constraint::ConstraintProvider;

use super::incremental::IncrementalScoreDirector;
use super::simple::SimpleScoreDirector;

/// Builds score directors sharing one compiled constraint set.
///
/// The constraint provider runs once, when the factory is built; every
/// director gets its own session instantiated from the shared plan.
pub struct ScoreDirectorFactory<S: PlanningSolution> {
    session_factory: Arc<ConstraintSessionFactory<S>>,
    environment_mode: EnvironmentMode,
    constraint_match_policy: ConstraintMatchPolicy,
}

impl<S: PlanningSolution> ScoreDirectorFactory<S> {
    /// Creates a new ScoreDirectorFactory.
    pub fn new<P>(descriptor: SolutionDescriptor<S>, provider: &P) -> Result<Self>
    where
        P: ConstraintProvider<S> + ?Sized,
    {
        Ok(Self::from_session_factory(ConstraintSessionFactory::new(
            descriptor, provider,
        )?))
    }

    pub fn with_weight_overrides<P>(
        descriptor: SolutionDescriptor<S>,
        provider: &P,
        overrides: &ConstraintWeightOverrides<S::Score>,
    ) -> Result<Self>
    where
        P: ConstraintProvider<S> + ?Sized,
    {
        Ok(Self::from_session_factory(
            ConstraintSessionFactory::with_weight_overrides(descriptor, provider, overrides)?,
        ))
    }

    pub fn from_session_factory(session_factory: ConstraintSessionFactory<S>) -> Self {
        Self {
            session_factory: Arc::new(session_factory),
            environment_mode: EnvironmentMode::default(),
            constraint_match_policy: ConstraintMatchPolicy::Enabled,
        }
    }

    pub fn with_environment_mode(mut self, environment_mode: EnvironmentMode) -> Self {
        self.environment_mode = environment_mode;
        self
    }

    pub fn with_constraint_match_policy(mut self, policy: ConstraintMatchPolicy) -> Self {
        self.constraint_match_policy = policy;
        self
    }

    /// Creates a new incremental score director for the given solution.
    pub fn build_score_director(&self, solution: S) -> IncrementalScoreDirector<S> {
        IncrementalScoreDirector::with_options(
            Arc::clone(&self.session_factory),
            solution,
            self.environment_mode,
            self.constraint_match_policy,
        )
    }

    /// Creates a director recalculating every score from scratch.
    pub fn build_simple_score_director(&self, solution: S) -> SimpleScoreDirector<S> {
        SimpleScoreDirector::new(Arc::clone(&self.session_factory), solution)
    }

    pub fn session_factory(&self) -> &ConstraintSessionFactory<S> {
        &self.session_factory
    }

    /// Returns a reference to the solution descriptor.
    pub fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        self.session_factory.descriptor()
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }
}

impl<S: PlanningSolution> Clone for ScoreDirectorFactory<S> {
    fn clone(&self) -> Self {
        Self {
            session_factory: Arc::clone(&self.session_factory),
            environment_mode: self.environment_mode,
            constraint_match_policy: self.constraint_match_policy,
        }
    }
}
