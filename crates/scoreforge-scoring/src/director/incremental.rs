//! Incremental score director backed by a constraint session.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use scoreforge_config::EnvironmentMode;
use scoreforge_core::{PlanningSolution, Result, SolutionDescriptor, SolverForgeError};
use tracing::{debug, error};

use crate::api::analysis::{
    ConstraintMatchPolicy, ConstraintMatchTotal, IndictmentMap, ScoreExplanation,
};
use crate::api::constraint_set::{
    fact_handle, ConstraintSession, ConstraintSessionFactory, MatchRecord,
};
use crate::network::{FactHandle, FactId};

use super::change::{Addition, Removal, VariableChange};
use super::traits::ScoreDirector;

/// Maximum number of matches listed per section of a corruption analysis.
const CONSTRAINT_MATCH_DISPLAY_LIMIT: usize = 10;

/// A score director that turns before/after notifications into network
/// changes, so a score calculation only pays for what changed.
///
/// Every instance of the working solution gets a fact id when it is first
/// seen. The director mirrors each class collection with the ids of its
/// instances, which keeps ids stable while instances move around.
///
/// # Example
///
/// ```
/// use scoreforge_core::{PlanningSolution, SimpleScore, SolutionDescriptor};
/// use scoreforge_scoring::{ConstraintFactory, ConstraintSessionFactory, ScoreDirector};
/// use scoreforge_scoring::director::IncrementalScoreDirector;
///
/// #[derive(Clone, Debug)]
/// struct Queen { row: Option<u32> }
///
/// #[derive(Clone, Debug)]
/// struct Board { queens: Vec<Queen>, score: Option<SimpleScore> }
///
/// impl PlanningSolution for Board {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<SimpleScore> { self.score }
///     fn set_score(&mut self, score: Option<SimpleScore>) { self.score = score; }
/// }
///
/// let descriptor = SolutionDescriptor::<Board>::of()
///     .with_entity::<Queen>(|b| &b.queens, |_, q| q.row.is_some());
/// let factory = ConstraintSessionFactory::new(descriptor, &|f: &ConstraintFactory<Board>| {
///     vec![f.for_each::<Queen>()
///         .filter(|q: &Queen| q.row == Some(0))
///         .penalize(SimpleScore::ONE)
///         .as_constraint("Row zero")]
/// })
/// .unwrap();
///
/// let board = Board { queens: vec![Queen { row: Some(0) }, Queen { row: Some(1) }], score: None };
/// let mut director = IncrementalScoreDirector::new(factory.into(), board);
/// assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-1));
///
/// let change = director.before_variable_changed(0, 1);
/// director.working_solution_mut().queens[1].row = Some(0);
/// director.after_variable_changed(change);
/// assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-2));
/// ```
pub struct IncrementalScoreDirector<S: PlanningSolution> {
    factory: Arc<ConstraintSessionFactory<S>>,
    working_solution: S,
    session: ConstraintSession<S>,
    fact_ids: Vec<Vec<FactId>>,
    next_fact_id: FactId,
    environment_mode: EnvironmentMode,
    pending_changes: usize,
    calculation_count: u64,
}

impl<S: PlanningSolution> IncrementalScoreDirector<S> {
    pub fn new(factory: Arc<ConstraintSessionFactory<S>>, solution: S) -> Self {
        Self::with_options(
            factory,
            solution,
            EnvironmentMode::default(),
            ConstraintMatchPolicy::Enabled,
        )
    }

    pub fn with_options(
        factory: Arc<ConstraintSessionFactory<S>>,
        solution: S,
        environment_mode: EnvironmentMode,
        policy: ConstraintMatchPolicy,
    ) -> Self {
        let session = factory.build_session(policy);
        let mut director = Self {
            factory,
            working_solution: solution,
            session,
            fact_ids: Vec::new(),
            next_fact_id: 0,
            environment_mode,
            pending_changes: 0,
            calculation_count: 0,
        };
        director.load_working_solution();
        director
    }

    /// Replaces the working solution and rebuilds the session from scratch.
    pub fn set_working_solution(&mut self, solution: S) {
        self.working_solution = solution;
        self.session = self.factory.build_session(self.session.match_policy());
        self.pending_changes = 0;
        self.load_working_solution();
    }

    fn load_working_solution(&mut self) {
        let factory = Arc::clone(&self.factory);
        let classes = factory.descriptor().classes();
        self.fact_ids = classes
            .iter()
            .map(|class| {
                let count = class.count(&self.working_solution);
                let first = self.next_fact_id;
                self.next_fact_id += count as FactId;
                (first..self.next_fact_id).collect()
            })
            .collect();
        self.session
            .insert_solution(&self.working_solution, &self.fact_ids);
        debug!(
            event = "working_solution_loaded",
            facts = self.fact_ids.iter().map(Vec::len).sum::<usize>(),
            nodes = self.session.node_count(),
        );
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }

    pub fn constraint_match_policy(&self) -> ConstraintMatchPolicy {
        self.session.match_policy()
    }

    pub fn session_factory(&self) -> &ConstraintSessionFactory<S> {
        &self.factory
    }

    /// Fact id of the `index`-th instance of `class`.
    pub fn fact_id(&self, class: usize, index: usize) -> Option<FactId> {
        self.fact_ids.get(class)?.get(index).copied()
    }

    /// Takes the working solution, leaving the director unusable.
    pub fn into_working_solution(self) -> S {
        self.working_solution
    }

    pub fn constraint_match_totals(
        &mut self,
    ) -> Result<BTreeMap<String, ConstraintMatchTotal<S::Score>>> {
        self.session.constraint_match_totals()
    }

    pub fn indictment_map(&mut self) -> Result<IndictmentMap<S::Score>> {
        self.session.indictment_map()
    }

    pub fn explain_score(&mut self) -> Result<ScoreExplanation<S::Score>> {
        self.session.explain()
    }

    /// Recalculates the score and fails when it differs from `expected`.
    pub fn assert_expected_working_score(
        &mut self,
        expected: S::Score,
        completed_action: &str,
    ) -> Result<()> {
        let working = self.session.calculate_score();
        if expected == working {
            return Ok(());
        }
        let message = format!(
            "Score corruption ({}): the expected working score ({expected}) is not the \
             working score ({working}) after completed action ({completed_action}).",
            expected - working,
        );
        error!(event = "score_corruption", expected = %expected, working = %working);
        Err(SolverForgeError::ScoreCorruption(message))
    }

    /// Recalculates the score of the working solution from scratch and
    /// fails with a corruption analysis when it differs from the
    /// incrementally maintained one.
    pub fn assert_working_score_from_scratch(&mut self, completed_action: &str) -> Result<()> {
        let working = self.session.calculate_score();
        let mut uncorrupted_session = self.factory.build_session(ConstraintMatchPolicy::Enabled);
        uncorrupted_session.insert_solution(&self.working_solution, &self.fact_ids);
        let uncorrupted = uncorrupted_session.calculate_score();
        if working == uncorrupted {
            return Ok(());
        }

        let analysis = self.corruption_analysis(&mut uncorrupted_session);
        let message = format!(
            "Score corruption ({}): the working score ({working}) is not the uncorrupted \
             score ({uncorrupted}) after completed action ({completed_action}):\n{analysis}",
            working - uncorrupted,
        );
        error!(
            event = "score_corruption",
            working = %working,
            uncorrupted = %uncorrupted,
            action = completed_action,
        );
        Err(SolverForgeError::ScoreCorruption(message))
    }

    fn corruption_analysis(&mut self, uncorrupted: &mut ConstraintSession<S>) -> String {
        let (Some(mut excess), Some(expected)) =
            (self.session.match_records(), uncorrupted.match_records())
        else {
            return format!(
                "Score corruption analysis could not be generated because the corrupted \
                 constraint match policy ({:?}) is {:?}.\n  Check your score constraints manually.",
                self.session.match_policy(),
                ConstraintMatchPolicy::Disabled,
            );
        };

        let mut missing = Vec::new();
        for record in expected {
            match excess.iter().position(|r| *r == record) {
                Some(position) => {
                    excess.swap_remove(position);
                }
                None => missing.push(record),
            }
        }

        let mut analysis = String::from("Score corruption analysis:\n");
        append_records(&mut analysis, "should not be there", &mut excess);
        append_records(&mut analysis, "are missing", &mut missing);
        if excess.is_empty() && missing.is_empty() {
            let _ = write!(
                analysis,
                "  Impossible state. Maybe this is a bug in the incremental score director."
            );
        } else {
            let _ = write!(
                analysis,
                "  Maybe there is a bug in the score constraints of those matches.\n  \
                 Maybe a constraint does not select all the instances it depends on,\n    \
                 but discovers some through a reference from a selected instance.\n    \
                 Such a constraint is not re-evaluated when that instance changes."
            );
        }
        analysis
    }

    fn handle(&self, class: usize, index: usize, id: FactId) -> Option<FactHandle> {
        let class_descriptor = self.factory.descriptor().classes().get(class)?;
        fact_handle(class_descriptor, &self.working_solution, index, id)
    }

    fn begin(&mut self) {
        self.pending_changes += 1;
    }

    fn complete(&mut self) {
        debug_assert!(
            self.pending_changes > 0,
            "An after_* notification has no matching before_* notification."
        );
        self.pending_changes = self.pending_changes.saturating_sub(1);
    }
}

fn append_records<Sc: fmt::Display>(
    analysis: &mut String,
    suffix: &str,
    records: &mut [MatchRecord<Sc>],
) {
    if records.is_empty() {
        let _ = writeln!(analysis, "  The corrupted session has no matches which {suffix}.");
        return;
    }
    let _ = writeln!(
        analysis,
        "  The corrupted session has {} matches which {suffix}:",
        records.len()
    );
    records.sort_by(|a, b| a.constraint_id.cmp(&b.constraint_id));
    for record in records.iter().take(CONSTRAINT_MATCH_DISPLAY_LIMIT) {
        let _ = writeln!(
            analysis,
            "    {}/{:?}={}",
            record.constraint_id,
            record.facts.as_slice(),
            record.score
        );
    }
    if records.len() > CONSTRAINT_MATCH_DISPLAY_LIMIT {
        let _ = writeln!(
            analysis,
            "    ... {} more",
            records.len() - CONSTRAINT_MATCH_DISPLAY_LIMIT
        );
    }
}

impl<S: PlanningSolution> ScoreDirector<S> for IncrementalScoreDirector<S> {
    fn working_solution(&self) -> &S {
        &self.working_solution
    }

    fn working_solution_mut(&mut self) -> &mut S {
        &mut self.working_solution
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        self.factory.descriptor()
    }

    /// In `FullAssert` mode every calculated score is checked against a
    /// from-scratch calculation.
    fn calculate_score(&mut self) -> Result<S::Score> {
        debug_assert_eq!(
            self.pending_changes, 0,
            "calculate_score() was called while a before_* notification is not completed."
        );
        let score = self.session.calculate_score();
        self.calculation_count += 1;
        if self.environment_mode.is_fully_asserted() {
            self.assert_working_score_from_scratch("calculate_score")?;
        }
        self.working_solution.set_score(Some(score));
        Ok(score)
    }

    fn calculation_count(&self) -> u64 {
        self.calculation_count
    }

    fn before_entity_added(&mut self, class: usize, index: usize) -> Addition {
        self.begin();
        Addition { class, index }
    }

    fn after_entity_added(&mut self, change: Addition) {
        self.complete();
        let Addition { class, index } = change;
        let id = self.next_fact_id;
        self.next_fact_id += 1;
        if let Some(ids) = self.fact_ids.get_mut(class) {
            ids.insert(index.min(ids.len()), id);
        }
        if self.session.is_class_used(class) {
            if let Some(handle) = self.handle(class, index, id) {
                self.session.insert(class, handle);
            }
        }
    }

    fn before_entity_removed(&mut self, class: usize, index: usize) -> Removal {
        self.begin();
        Removal {
            class,
            index,
            fact_id: self.fact_id(class, index),
        }
    }

    fn after_entity_removed(&mut self, change: Removal) {
        self.complete();
        let Removal {
            class,
            index,
            fact_id,
        } = change;
        let Some(id) = fact_id else {
            return;
        };
        if let Some(ids) = self.fact_ids.get_mut(class) {
            ids.remove(index);
        }
        self.session.retract(class, id);
    }

    fn before_variable_changed(&mut self, class: usize, index: usize) -> VariableChange {
        self.begin();
        VariableChange { class, index }
    }

    fn after_variable_changed(&mut self, change: VariableChange) {
        self.complete();
        let VariableChange { class, index } = change;
        if !self.session.is_class_used(class) {
            return;
        }
        let Some(id) = self.fact_id(class, index) else {
            return;
        };
        if let Some(handle) = self.handle(class, index, id) {
            self.session.update(class, handle);
        }
    }

    fn is_incremental(&self) -> bool {
        true
    }
}

impl<S: PlanningSolution> fmt::Debug for IncrementalScoreDirector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalScoreDirector")
            .field("session", &self.session)
            .field("environment_mode", &self.environment_mode)
            .field("calculation_count", &self.calculation_count)
            .finish()
    }
}
