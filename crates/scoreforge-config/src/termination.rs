//! Termination configuration.
//!
//! A [`TerminationConfig`] sets any number of limits; the solver stops as
//! soon as one of them is reached, unless a nested list combines them with
//! an explicit [`TerminationCompositionStyle`].
//!
//! Time limits come in two mutually exclusive forms: one [`Duration`], or
//! granular fields (milliseconds to days) that add up.

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60_000;
const MILLIS_PER_HOUR: u64 = 3_600_000;
const MILLIS_PER_DAY: u64 = 86_400_000;

/// How the terminations of a `termination_config_list` combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationCompositionStyle {
    /// Terminates when every termination is reached.
    And,
    /// Terminates when any termination is reached.
    Or,
}

/// Termination configuration of a solver or of one phase.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Combination of the limits below and `termination_config_list`.
    pub termination_composition_style: Option<TerminationCompositionStyle>,

    pub spent_limit: Option<Duration>,
    pub milliseconds_spent_limit: Option<i64>,
    pub seconds_spent_limit: Option<i64>,
    pub minutes_spent_limit: Option<i64>,
    pub hours_spent_limit: Option<i64>,
    pub days_spent_limit: Option<i64>,

    /// Time allowed without a new best score.
    pub unimproved_spent_limit: Option<Duration>,
    pub unimproved_milliseconds_spent_limit: Option<i64>,
    pub unimproved_seconds_spent_limit: Option<i64>,
    pub unimproved_minutes_spent_limit: Option<i64>,
    pub unimproved_hours_spent_limit: Option<i64>,
    pub unimproved_days_spent_limit: Option<i64>,
    /// Smallest improvement that resets the unimproved clock, as a score
    /// string (e.g. `"0hard/10soft"`).
    pub unimproved_score_difference_threshold: Option<String>,

    /// Best score to reach, as a score string (e.g. `"0hard/-100soft"`).
    pub best_score_limit: Option<String>,
    pub best_score_feasible: Option<bool>,

    pub step_count_limit: Option<u64>,
    pub unimproved_step_count_limit: Option<u64>,
    pub score_calculation_count_limit: Option<u64>,
    pub move_count_limit: Option<u64>,

    pub flat_line_detection_ratio: Option<f64>,
    pub new_curve_detection_ratio: Option<f64>,

    pub diminished_returns: Option<DiminishedReturnsConfig>,
    pub adaptive: Option<AdaptiveConfig>,

    #[serde(default)]
    pub termination_config_list: Vec<TerminationConfig>,
}

impl TerminationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_termination_composition_style(mut self, style: TerminationCompositionStyle) -> Self {
        self.termination_composition_style = Some(style);
        self
    }

    pub fn with_spent_limit(mut self, spent_limit: Duration) -> Self {
        self.spent_limit = Some(spent_limit);
        self
    }

    pub fn with_milliseconds_spent_limit(mut self, milliseconds: i64) -> Self {
        self.milliseconds_spent_limit = Some(milliseconds);
        self
    }

    pub fn with_seconds_spent_limit(mut self, seconds: i64) -> Self {
        self.seconds_spent_limit = Some(seconds);
        self
    }

    pub fn with_minutes_spent_limit(mut self, minutes: i64) -> Self {
        self.minutes_spent_limit = Some(minutes);
        self
    }

    pub fn with_unimproved_spent_limit(mut self, spent_limit: Duration) -> Self {
        self.unimproved_spent_limit = Some(spent_limit);
        self
    }

    pub fn with_unimproved_seconds_spent_limit(mut self, seconds: i64) -> Self {
        self.unimproved_seconds_spent_limit = Some(seconds);
        self
    }

    pub fn with_unimproved_score_difference_threshold(mut self, threshold: impl Into<String>) -> Self {
        self.unimproved_score_difference_threshold = Some(threshold.into());
        self
    }

    pub fn with_best_score_limit(mut self, limit: impl Into<String>) -> Self {
        self.best_score_limit = Some(limit.into());
        self
    }

    pub fn with_best_score_feasible(mut self, feasible: bool) -> Self {
        self.best_score_feasible = Some(feasible);
        self
    }

    pub fn with_step_count_limit(mut self, limit: u64) -> Self {
        self.step_count_limit = Some(limit);
        self
    }

    pub fn with_unimproved_step_count_limit(mut self, limit: u64) -> Self {
        self.unimproved_step_count_limit = Some(limit);
        self
    }

    pub fn with_score_calculation_count_limit(mut self, limit: u64) -> Self {
        self.score_calculation_count_limit = Some(limit);
        self
    }

    pub fn with_move_count_limit(mut self, limit: u64) -> Self {
        self.move_count_limit = Some(limit);
        self
    }

    pub fn with_flat_line_detection_ratio(mut self, ratio: f64) -> Self {
        self.flat_line_detection_ratio = Some(ratio);
        self
    }

    pub fn with_new_curve_detection_ratio(mut self, ratio: f64) -> Self {
        self.new_curve_detection_ratio = Some(ratio);
        self
    }

    pub fn with_diminished_returns(mut self, config: DiminishedReturnsConfig) -> Self {
        self.diminished_returns = Some(config);
        self
    }

    pub fn with_adaptive(mut self, config: AdaptiveConfig) -> Self {
        self.adaptive = Some(config);
        self
    }

    pub fn with_termination_config_list(mut self, list: Vec<TerminationConfig>) -> Self {
        self.termination_config_list = list;
        self
    }

    /// The time spent limit in milliseconds, `None` when unset.
    ///
    /// # Errors
    ///
    /// Fails when `spent_limit` is combined with a granular field, when it
    /// has sub-microsecond precision, or when a granular field is negative.
    pub fn calculate_time_millis_spent_limit(&self) -> Result<Option<u64>, ConfigError> {
        calculate_millis(
            "spent_limit",
            self.spent_limit,
            &[
                ("milliseconds_spent_limit", self.milliseconds_spent_limit),
                ("seconds_spent_limit", self.seconds_spent_limit),
                ("minutes_spent_limit", self.minutes_spent_limit),
                ("hours_spent_limit", self.hours_spent_limit),
                ("days_spent_limit", self.days_spent_limit),
            ],
        )
    }

    /// The unimproved time spent limit in milliseconds, `None` when unset.
    pub fn calculate_unimproved_time_millis_spent_limit(&self) -> Result<Option<u64>, ConfigError> {
        calculate_millis(
            "unimproved_spent_limit",
            self.unimproved_spent_limit,
            &[
                ("unimproved_milliseconds_spent_limit", self.unimproved_milliseconds_spent_limit),
                ("unimproved_seconds_spent_limit", self.unimproved_seconds_spent_limit),
                ("unimproved_minutes_spent_limit", self.unimproved_minutes_spent_limit),
                ("unimproved_hours_spent_limit", self.unimproved_hours_spent_limit),
                ("unimproved_days_spent_limit", self.unimproved_days_spent_limit),
            ],
        )
    }

    /// Replaces every form of the time spent limit by `spent_limit`.
    pub fn overwrite_spent_limit(&mut self, spent_limit: Option<Duration>) {
        self.spent_limit = spent_limit;
        self.milliseconds_spent_limit = None;
        self.seconds_spent_limit = None;
        self.minutes_spent_limit = None;
        self.hours_spent_limit = None;
        self.days_spent_limit = None;
    }

    /// Replaces every form of the unimproved time spent limit.
    pub fn overwrite_unimproved_spent_limit(&mut self, spent_limit: Option<Duration>) {
        self.unimproved_spent_limit = spent_limit;
        self.unimproved_milliseconds_spent_limit = None;
        self.unimproved_seconds_spent_limit = None;
        self.unimproved_minutes_spent_limit = None;
        self.unimproved_hours_spent_limit = None;
        self.unimproved_days_spent_limit = None;
    }

    /// Lowers the time spent limit to `millis` unless it is already lower.
    pub fn shorten_time_millis_spent_limit(&mut self, millis: u64) -> Result<(), ConfigError> {
        let old = self.calculate_time_millis_spent_limit()?;
        if old.map_or(true, |old| millis < old) {
            self.overwrite_spent_limit(None);
            self.milliseconds_spent_limit = Some(i64::try_from(millis).unwrap_or(i64::MAX));
        }
        Ok(())
    }

    /// True if this configuration sets at least one termination condition.
    ///
    /// A configured limit may still never be reached, e.g. an unreachable
    /// best score limit.
    pub fn is_configured(&self) -> bool {
        self.time_spent_limit_is_set()
            || self.unimproved_time_spent_limit_is_set()
            || self.best_score_limit.is_some()
            || self.best_score_feasible.is_some()
            || self.step_count_limit.is_some()
            || self.unimproved_step_count_limit.is_some()
            || self.score_calculation_count_limit.is_some()
            || self.move_count_limit.is_some()
            || self.flat_line_detection_ratio.is_some()
            || self.new_curve_detection_ratio.is_some()
            || self.diminished_returns.is_some()
            || self.adaptive.is_some()
            || self.is_termination_list_configured()
    }

    /// True if the nested list is configured under its composition style:
    /// every child for `And`, some child for `Or`. An empty list, or a list
    /// without a composition style, is not configured.
    pub fn is_termination_list_configured(&self) -> bool {
        if self.termination_config_list.is_empty() {
            return false;
        }
        match self.termination_composition_style {
            Some(TerminationCompositionStyle::And) => self
                .termination_config_list
                .iter()
                .all(TerminationConfig::is_configured),
            Some(TerminationCompositionStyle::Or) => self
                .termination_config_list
                .iter()
                .any(TerminationConfig::is_configured),
            None => false,
        }
    }

    /// Fills every unset property from `inherited`.
    ///
    /// Each time limit is inherited as a whole: when this configuration
    /// sets any form of it, none of the inherited forms are taken.
    /// Inherited list entries come before this configuration's own.
    pub fn inherit(&mut self, inherited: &TerminationConfig) -> &mut Self {
        if !self.time_spent_limit_is_set() {
            self.spent_limit = inherited.spent_limit;
            self.milliseconds_spent_limit = inherited.milliseconds_spent_limit;
            self.seconds_spent_limit = inherited.seconds_spent_limit;
            self.minutes_spent_limit = inherited.minutes_spent_limit;
            self.hours_spent_limit = inherited.hours_spent_limit;
            self.days_spent_limit = inherited.days_spent_limit;
        }
        if !self.unimproved_time_spent_limit_is_set() {
            self.unimproved_spent_limit = inherited.unimproved_spent_limit;
            self.unimproved_milliseconds_spent_limit = inherited.unimproved_milliseconds_spent_limit;
            self.unimproved_seconds_spent_limit = inherited.unimproved_seconds_spent_limit;
            self.unimproved_minutes_spent_limit = inherited.unimproved_minutes_spent_limit;
            self.unimproved_hours_spent_limit = inherited.unimproved_hours_spent_limit;
            self.unimproved_days_spent_limit = inherited.unimproved_days_spent_limit;
        }
        inherit_property(
            &mut self.termination_composition_style,
            &inherited.termination_composition_style,
        );
        inherit_property(
            &mut self.unimproved_score_difference_threshold,
            &inherited.unimproved_score_difference_threshold,
        );
        inherit_property(&mut self.best_score_limit, &inherited.best_score_limit);
        inherit_property(&mut self.best_score_feasible, &inherited.best_score_feasible);
        inherit_property(&mut self.step_count_limit, &inherited.step_count_limit);
        inherit_property(
            &mut self.unimproved_step_count_limit,
            &inherited.unimproved_step_count_limit,
        );
        inherit_property(
            &mut self.score_calculation_count_limit,
            &inherited.score_calculation_count_limit,
        );
        inherit_property(&mut self.move_count_limit, &inherited.move_count_limit);
        inherit_property(
            &mut self.flat_line_detection_ratio,
            &inherited.flat_line_detection_ratio,
        );
        inherit_property(
            &mut self.new_curve_detection_ratio,
            &inherited.new_curve_detection_ratio,
        );
        inherit_property(&mut self.diminished_returns, &inherited.diminished_returns);
        inherit_property(&mut self.adaptive, &inherited.adaptive);
        if !inherited.termination_config_list.is_empty() {
            let own = std::mem::take(&mut self.termination_config_list);
            self.termination_config_list = inherited.termination_config_list.clone();
            self.termination_config_list.extend(own);
        }
        self
    }

    fn time_spent_limit_is_set(&self) -> bool {
        self.spent_limit.is_some()
            || self.milliseconds_spent_limit.is_some()
            || self.seconds_spent_limit.is_some()
            || self.minutes_spent_limit.is_some()
            || self.hours_spent_limit.is_some()
            || self.days_spent_limit.is_some()
    }

    fn unimproved_time_spent_limit_is_set(&self) -> bool {
        self.unimproved_spent_limit.is_some()
            || self.unimproved_milliseconds_spent_limit.is_some()
            || self.unimproved_seconds_spent_limit.is_some()
            || self.unimproved_minutes_spent_limit.is_some()
            || self.unimproved_hours_spent_limit.is_some()
            || self.unimproved_days_spent_limit.is_some()
    }
}

/// Terminates when the improvement within a sliding window drops below a
/// ratio of the improvement of the first window.
///
/// Only applicable to the solver as a whole, not to a single phase.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DiminishedReturnsConfig {
    pub sliding_window_duration: Option<Duration>,
    pub sliding_window_milliseconds: Option<i64>,
    pub sliding_window_seconds: Option<i64>,
    pub sliding_window_minutes: Option<i64>,
    pub sliding_window_hours: Option<i64>,
    pub sliding_window_days: Option<i64>,
    pub minimum_improvement_ratio: Option<f64>,
}

impl DiminishedReturnsConfig {
    /// Window used when none is configured.
    pub const DEFAULT_SLIDING_WINDOW: Duration = Duration::from_secs(30);
    pub const DEFAULT_MINIMUM_IMPROVEMENT_RATIO: f64 = 0.0001;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sliding_window_duration(mut self, duration: Duration) -> Self {
        self.sliding_window_duration = Some(duration);
        self
    }

    pub fn with_sliding_window_seconds(mut self, seconds: i64) -> Self {
        self.sliding_window_seconds = Some(seconds);
        self
    }

    pub fn with_minimum_improvement_ratio(mut self, ratio: f64) -> Self {
        self.minimum_improvement_ratio = Some(ratio);
        self
    }

    /// The sliding window in milliseconds, `None` when unset.
    pub fn calculate_sliding_window_millis(&self) -> Result<Option<u64>, ConfigError> {
        calculate_millis(
            "diminished_returns.sliding_window_duration",
            self.sliding_window_duration,
            &[
                ("diminished_returns.sliding_window_milliseconds", self.sliding_window_milliseconds),
                ("diminished_returns.sliding_window_seconds", self.sliding_window_seconds),
                ("diminished_returns.sliding_window_minutes", self.sliding_window_minutes),
                ("diminished_returns.sliding_window_hours", self.sliding_window_hours),
                ("diminished_returns.sliding_window_days", self.sliding_window_days),
            ],
        )
    }
}

/// Terminates when, after a grace period, the improvement rate drops below
/// a ratio of the rate observed during the grace period.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AdaptiveConfig {
    pub grace_period_duration: Option<Duration>,
    pub grace_period_milliseconds: Option<i64>,
    pub grace_period_seconds: Option<i64>,
    pub grace_period_minutes: Option<i64>,
    pub grace_period_hours: Option<i64>,
    pub grace_period_days: Option<i64>,
    pub minimum_improvement_ratio: Option<f64>,
}

impl AdaptiveConfig {
    pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(30);
    pub const DEFAULT_MINIMUM_IMPROVEMENT_RATIO: f64 = 0.0001;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grace_period_duration(mut self, duration: Duration) -> Self {
        self.grace_period_duration = Some(duration);
        self
    }

    pub fn with_grace_period_seconds(mut self, seconds: i64) -> Self {
        self.grace_period_seconds = Some(seconds);
        self
    }

    pub fn with_minimum_improvement_ratio(mut self, ratio: f64) -> Self {
        self.minimum_improvement_ratio = Some(ratio);
        self
    }

    /// The grace period in milliseconds, `None` when unset.
    pub fn calculate_grace_period_millis(&self) -> Result<Option<u64>, ConfigError> {
        calculate_millis(
            "adaptive.grace_period_duration",
            self.grace_period_duration,
            &[
                ("adaptive.grace_period_milliseconds", self.grace_period_milliseconds),
                ("adaptive.grace_period_seconds", self.grace_period_seconds),
                ("adaptive.grace_period_minutes", self.grace_period_minutes),
                ("adaptive.grace_period_hours", self.grace_period_hours),
                ("adaptive.grace_period_days", self.grace_period_days),
            ],
        )
    }
}

fn inherit_property<T: Clone>(own: &mut Option<T>, inherited: &Option<T>) {
    if own.is_none() {
        own.clone_from(inherited);
    }
}

// Granular fields in order: milliseconds, seconds, minutes, hours, days.
fn calculate_millis(
    duration_name: &str,
    duration: Option<Duration>,
    granular: &[(&str, Option<i64>); 5],
) -> Result<Option<u64>, ConfigError> {
    if granular.iter().all(|(_, value)| value.is_none()) {
        let Some(duration) = duration else {
            return Ok(None);
        };
        if duration.subsec_nanos() % 1_000 != 0 {
            return Err(ConfigError::Invalid(format!(
                "The termination {duration_name} ({duration:?}) cannot use nanoseconds."
            )));
        }
        return Ok(Some(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)));
    }

    if let Some(duration) = duration {
        let mut message = format!("The termination {duration_name} ({duration:?}) cannot be combined with ");
        for (i, (name, value)) in granular.iter().enumerate() {
            let separator = match i {
                0 => "",
                4 => " or ",
                _ => ", ",
            };
            let _ = write!(message, "{separator}{name} ({})", display_optional(*value));
        }
        message.push('.');
        return Err(ConfigError::Invalid(message));
    }

    let multipliers = [1, MILLIS_PER_SECOND, MILLIS_PER_MINUTE, MILLIS_PER_HOUR, MILLIS_PER_DAY];
    let mut millis: u64 = 0;
    for ((name, value), multiplier) in granular.iter().zip(multipliers) {
        let value = require_non_negative(*value, name)?;
        millis = millis.saturating_add(value.saturating_mul(multiplier));
    }
    Ok(Some(millis))
}

fn require_non_negative(value: Option<i64>, name: &str) -> Result<u64, ConfigError> {
    match value {
        None => Ok(0),
        Some(value) if value < 0 => Err(ConfigError::Invalid(format!(
            "The termination {name} ({value}) cannot be negative."
        ))),
        Some(value) => Ok(value as u64),
    }
}

fn display_optional(value: Option<i64>) -> String {
    value.map_or_else(|| String::from("null"), |v| v.to_string())
}
