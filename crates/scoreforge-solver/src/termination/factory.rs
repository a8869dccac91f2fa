//! Builds termination trees from [`TerminationConfig`].

use std::marker::PhantomData;
use std::time::Duration;

use scoreforge_config::{
    AdaptiveConfig, DiminishedReturnsConfig, PhaseConfig, SolverConfig,
    TerminationCompositionStyle, TerminationConfig,
};
use scoreforge_core::{ParseableScore, SolverForgeError};
use tracing::debug;

use super::unimproved_best_solution::{
    DEFAULT_FLAT_LINE_DETECTION_RATIO, DEFAULT_NEW_CURVE_DETECTION_RATIO,
};
use super::{
    leaf_kinds, AdaptiveTermination, AndTermination, BasicPlumbingTermination,
    BestScoreFeasibleTermination, BestScoreTermination, DiminishedReturnsTermination,
    MoveCountTermination, OrTermination, ScoreCalculationCountTermination, StepCountTermination,
    TerminateEarlyHandle, Termination, TerminationHierarchy, TimeSpentTermination,
    UnimprovedBestSolutionTermination, UnimprovedStepCountTermination,
    UnimprovedTimeSpentTermination,
};

type BoxedTermination<Sc> = Box<dyn Termination<Sc>>;

/// Turns a [`TerminationConfig`] into a termination tree.
///
/// Every configured limit becomes one leaf. The leaves and the nested
/// `termination_config_list` are combined with the configured composition
/// style, OR by default.
///
/// # Example
///
/// ```
/// use scoreforge_config::TerminationConfig;
/// use scoreforge_core::HardSoftScore;
/// use scoreforge_solver::termination::{TerminationFactory, TerminationKind, leaf_kinds};
///
/// let config = TerminationConfig::new()
///     .with_seconds_spent_limit(30)
///     .with_best_score_limit("0hard/0soft");
/// let termination = TerminationFactory::<HardSoftScore>::create(&config)
///     .build_termination()
///     .unwrap()
///     .unwrap();
/// assert_eq!(
///     leaf_kinds(termination.as_ref()),
///     vec![TerminationKind::TimeMillisSpent, TerminationKind::BestScore],
/// );
/// ```
#[derive(Debug)]
pub struct TerminationFactory<'a, Sc> {
    config: &'a TerminationConfig,
    _score: PhantomData<fn() -> Sc>,
}

impl<'a, Sc: ParseableScore> TerminationFactory<'a, Sc> {
    pub fn create(config: &'a TerminationConfig) -> Self {
        Self {
            config,
            _score: PhantomData,
        }
    }

    /// Builds the configured tree, or `None` if nothing is configured.
    pub fn build_termination(&self) -> Result<Option<BoxedTermination<Sc>>, SolverForgeError> {
        let mut terminations = self.build_leaves()?;
        for child in &self.config.termination_config_list {
            if let Some(termination) = TerminationFactory::<Sc>::create(child).build_termination()? {
                terminations.push(termination);
            }
        }
        Ok(compose(
            terminations,
            self.config.termination_composition_style,
        ))
    }

    /// Builds the solver termination: the configured tree OR'ed with a
    /// [`BasicPlumbingTermination`] observing `handle`.
    pub fn build_solver_termination(
        &self,
        handle: TerminateEarlyHandle,
    ) -> Result<BoxedTermination<Sc>, SolverForgeError> {
        let plumbing: BoxedTermination<Sc> = Box::new(BasicPlumbingTermination::with_handle(handle));
        let termination: BoxedTermination<Sc> = match self.build_termination()? {
            Some(configured) => Box::new(OrTermination(vec![plumbing, configured])),
            None => plumbing,
        };
        debug!(
            event = "termination_built",
            level = "solver",
            leaves = ?leaf_kinds(termination.as_ref())
        );
        Ok(termination)
    }

    /// Builds a phase termination, rejecting leaves that only apply to the
    /// solver as a whole.
    pub fn build_phase_termination(
        &self,
        phase_name: &str,
    ) -> Result<Option<BoxedTermination<Sc>>, SolverForgeError> {
        let Some(termination) = self.build_termination()? else {
            return Ok(None);
        };
        let kinds = leaf_kinds(termination.as_ref());
        let solver_only: Vec<String> = kinds
            .iter()
            .filter(|kind| kind.is_solver_only())
            .map(|kind| kind.to_string())
            .collect();
        if !solver_only.is_empty() {
            return Err(SolverForgeError::Config(format!(
                "The termination of phase ({phase_name}) includes some terminations which are \
                 not applicable on the phase level: [{}]. Move them to the solver termination.",
                solver_only.join(", ")
            )));
        }
        debug!(
            event = "termination_built",
            level = "phase",
            phase = phase_name,
            leaves = ?kinds
        );
        Ok(Some(termination))
    }

    /// Builds the solver termination and every phase termination of
    /// `config`.
    ///
    /// A local search phase only ends through a termination, so one must be
    /// configured on the phase or the solver.
    pub fn build_hierarchy(
        config: &SolverConfig,
    ) -> Result<TerminationHierarchy<Sc>, SolverForgeError> {
        let handle = TerminateEarlyHandle::new();
        let solver_config = config.termination.clone().unwrap_or_default();
        let solver = TerminationFactory::<Sc>::create(&solver_config)
            .build_solver_termination(handle.clone())?;
        let solver_configured = solver_config.is_configured();

        let mut phases = Vec::with_capacity(config.phases.len());
        for (index, phase) in config.phases.iter().enumerate() {
            let phase_name = format!("{} #{index}", phase.type_name());
            let termination = match phase.termination() {
                Some(phase_config) => {
                    TerminationFactory::<Sc>::create(phase_config).build_phase_termination(&phase_name)?
                }
                None => None,
            };
            if matches!(phase, PhaseConfig::LocalSearch(_))
                && termination.is_none()
                && !solver_configured
            {
                return Err(SolverForgeError::Config(format!(
                    "The phase ({phase_name}) has no termination configured and neither has the \
                     solver, so it would never end. Configure a termination on either."
                )));
            }
            phases.push(termination);
        }
        Ok(TerminationHierarchy::new(solver, phases, handle))
    }

    fn build_leaves(&self) -> Result<Vec<BoxedTermination<Sc>>, SolverForgeError> {
        let config = self.config;
        let mut leaves: Vec<BoxedTermination<Sc>> = Vec::new();

        if let Some(millis) = config.calculate_time_millis_spent_limit()? {
            leaves.push(Box::new(TimeSpentTermination::millis(millis)));
        }
        match config.calculate_unimproved_time_millis_spent_limit()? {
            Some(millis) => {
                let mut termination = UnimprovedTimeSpentTermination::millis(millis);
                if let Some(threshold) = &config.unimproved_score_difference_threshold {
                    let threshold = parse_score::<Sc>("unimproved_score_difference_threshold", threshold)?;
                    if threshold <= Sc::zero() {
                        return Err(SolverForgeError::Config(format!(
                            "The termination unimproved_score_difference_threshold ({}) must be \
                             positive.",
                            threshold.to_string_repr()
                        )));
                    }
                    termination = termination.with_score_difference_threshold(threshold);
                }
                leaves.push(Box::new(termination));
            }
            None => {
                if let Some(threshold) = &config.unimproved_score_difference_threshold {
                    return Err(SolverForgeError::Config(format!(
                        "The termination unimproved_score_difference_threshold ({threshold}) \
                         requires an unimproved spent limit."
                    )));
                }
            }
        }
        if let Some(limit) = &config.best_score_limit {
            let target = parse_score::<Sc>("best_score_limit", limit)?;
            leaves.push(Box::new(BestScoreTermination::new(target)));
        }
        match config.best_score_feasible {
            Some(true) if Sc::feasible_levels_count() == 0 => {
                return Err(SolverForgeError::Config(
                    "The termination best_score_feasible (true) requires a score type with \
                     feasibility levels."
                        .to_string(),
                ));
            }
            Some(true) => leaves.push(Box::new(BestScoreFeasibleTermination::new::<Sc>())),
            Some(false) => {
                return Err(SolverForgeError::Config(
                    "The termination best_score_feasible (false) cannot be false; leave it unset \
                     instead."
                        .to_string(),
                ));
            }
            None => {}
        }
        if let Some(limit) = config.step_count_limit {
            leaves.push(Box::new(StepCountTermination::new(limit)));
        }
        if let Some(limit) = config.score_calculation_count_limit {
            leaves.push(Box::new(ScoreCalculationCountTermination::new(limit)));
        }
        if let Some(limit) = config.unimproved_step_count_limit {
            leaves.push(Box::new(UnimprovedStepCountTermination::new(limit)));
        }
        if let Some(limit) = config.move_count_limit {
            leaves.push(Box::new(MoveCountTermination::new(limit)));
        }
        if config.flat_line_detection_ratio.is_some() || config.new_curve_detection_ratio.is_some() {
            let flat_line = config
                .flat_line_detection_ratio
                .unwrap_or(DEFAULT_FLAT_LINE_DETECTION_RATIO);
            let new_curve = config
                .new_curve_detection_ratio
                .unwrap_or(DEFAULT_NEW_CURVE_DETECTION_RATIO);
            check_positive("flat_line_detection_ratio", flat_line)?;
            check_positive("new_curve_detection_ratio", new_curve)?;
            leaves.push(Box::new(UnimprovedBestSolutionTermination::new(flat_line, new_curve)));
        }
        if let Some(diminished) = &config.diminished_returns {
            leaves.push(Box::new(build_diminished_returns::<Sc>(diminished)?));
        }
        if let Some(adaptive) = &config.adaptive {
            leaves.push(Box::new(build_adaptive::<Sc>(adaptive)?));
        }
        Ok(leaves)
    }
}

fn build_diminished_returns<Sc: ParseableScore>(
    config: &DiminishedReturnsConfig,
) -> Result<DiminishedReturnsTermination<Sc>, SolverForgeError> {
    let window = config
        .calculate_sliding_window_millis()?
        .map_or(DiminishedReturnsConfig::DEFAULT_SLIDING_WINDOW, Duration::from_millis);
    if window.is_zero() {
        return Err(SolverForgeError::Config(
            "The termination diminished_returns.sliding_window (0) must be positive.".to_string(),
        ));
    }
    let ratio = config
        .minimum_improvement_ratio
        .unwrap_or(DiminishedReturnsConfig::DEFAULT_MINIMUM_IMPROVEMENT_RATIO);
    check_positive("diminished_returns.minimum_improvement_ratio", ratio)?;
    Ok(DiminishedReturnsTermination::new(window, ratio))
}

fn build_adaptive<Sc: ParseableScore>(
    config: &AdaptiveConfig,
) -> Result<AdaptiveTermination<Sc>, SolverForgeError> {
    let grace_period = config
        .calculate_grace_period_millis()?
        .map_or(AdaptiveConfig::DEFAULT_GRACE_PERIOD, Duration::from_millis);
    let ratio = config
        .minimum_improvement_ratio
        .unwrap_or(AdaptiveConfig::DEFAULT_MINIMUM_IMPROVEMENT_RATIO);
    check_positive("adaptive.minimum_improvement_ratio", ratio)?;
    Ok(AdaptiveTermination::new(grace_period, ratio))
}

fn compose<Sc: ParseableScore>(
    mut terminations: Vec<BoxedTermination<Sc>>,
    style: Option<TerminationCompositionStyle>,
) -> Option<BoxedTermination<Sc>> {
    match terminations.len() {
        0 => None,
        1 => terminations.pop(),
        _ => {
            let composite: BoxedTermination<Sc> =
                match style.unwrap_or(TerminationCompositionStyle::Or) {
                    TerminationCompositionStyle::And => Box::new(AndTermination(terminations)),
                    TerminationCompositionStyle::Or => Box::new(OrTermination(terminations)),
                };
            Some(composite)
        }
    }
}

fn parse_score<Sc: ParseableScore>(field: &str, text: &str) -> Result<Sc, SolverForgeError> {
    Sc::parse(text).map_err(|err| {
        SolverForgeError::Config(format!("The termination {field} ({text}) is not a valid score: {err}"))
    })
}

fn check_positive(field: &str, value: f64) -> Result<(), SolverForgeError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(SolverForgeError::Config(format!(
            "The termination {field} ({value}) must be positive."
        )))
    }
}

