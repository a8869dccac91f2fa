//! Tests for solver configuration.

use std::time::Duration;

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        environment_mode = "reproducible"

        [termination]
        seconds_spent_limit = 30
        best_score_limit = "0hard/-10soft"

        [[phases]]
        type = "construction_heuristic"

        [[phases]]
        type = "local_search"
        [phases.termination]
        unimproved_step_count_limit = 400
    "#;

    let config = SolverConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::Reproducible);
    let termination = config.termination.as_ref().unwrap();
    assert_eq!(termination.seconds_spent_limit, Some(30));
    assert_eq!(termination.best_score_limit.as_deref(), Some("0hard/-10soft"));
    assert_eq!(config.phases.len(), 2);
    assert!(config.phases[0].termination().is_none());
    assert_eq!(
        config.phases[1].termination().unwrap().unimproved_step_count_limit,
        Some(400)
    );
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        environment_mode: full_assert
        termination:
          termination_composition_style: and
          termination_config_list:
            - seconds_spent_limit: 10
            - best_score_feasible: true
          diminished_returns:
            sliding_window_seconds: 5
            minimum_improvement_ratio: 0.5
        phases:
          - type: custom
            custom_phase_name: warm_start
            termination:
              step_count_limit: 1
          - type: exhaustive_search
    "#;

    let config = SolverConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
    let termination = config.termination.unwrap();
    assert_eq!(
        termination.termination_composition_style,
        Some(TerminationCompositionStyle::And)
    );
    assert_eq!(termination.termination_config_list.len(), 2);
    let diminished = termination.diminished_returns.unwrap();
    assert_eq!(diminished.calculate_sliding_window_millis().unwrap(), Some(5_000));
    assert_eq!(diminished.minimum_improvement_ratio, Some(0.5));
    match &config.phases[0] {
        PhaseConfig::Custom(custom) => {
            assert_eq!(custom.custom_phase_name.as_deref(), Some("warm_start"));
        }
        other => panic!("unexpected phase {other:?}"),
    }
    assert_eq!(config.phases[0].termination().unwrap().step_count_limit, Some(1));
}

#[test]
fn test_invalid_toml_is_reported() {
    let err = SolverConfig::from_toml_str("environment_mode = \"sometimes\"").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = SolverConfig::load("/nonexistent/scoreforge/solver.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_load_picks_format_by_extension() {
    let path = std::env::temp_dir().join(format!("scoreforge-{}.yaml", std::process::id()));
    std::fs::write(
        &path,
        "termination:\n  step_count_limit: 7\nphases:\n  - type: local_search\n",
    )
    .unwrap();
    let loaded = SolverConfig::load(&path);
    std::fs::remove_file(&path).unwrap();

    let config = loaded.unwrap();
    assert_eq!(config.termination.unwrap().step_count_limit, Some(7));
    assert_eq!(config.phases[0].type_name(), "local_search");
    assert!(config.phases[0].termination().is_none());
}

#[test]
fn test_builder() {
    let config = SolverConfig::new()
        .with_environment_mode(EnvironmentMode::FastAssert)
        .with_termination(TerminationConfig::new().with_spent_limit(Duration::from_secs(5)))
        .with_termination_seconds(60)
        .with_phase(PhaseConfig::ConstructionHeuristic(PhaseSettings::default()))
        .with_phase(PhaseConfig::LocalSearch(PhaseSettings::default()));

    let termination = config.termination.as_ref().unwrap();
    assert_eq!(termination.spent_limit, None);
    assert_eq!(termination.calculate_time_millis_spent_limit().unwrap(), Some(60_000));
    assert_eq!(config.phases.len(), 2);
}

#[test]
fn test_environment_mode_flags() {
    assert!(!EnvironmentMode::NonReproducible.is_asserted());
    assert!(!EnvironmentMode::NonReproducible.is_reproducible());
    assert!(!EnvironmentMode::Reproducible.is_asserted());
    assert!(EnvironmentMode::Reproducible.is_reproducible());
    assert!(EnvironmentMode::FastAssert.is_asserted());
    assert!(!EnvironmentMode::FastAssert.is_fully_asserted());
    assert!(EnvironmentMode::FullAssert.is_asserted());
    assert!(EnvironmentMode::FullAssert.is_fully_asserted());
    assert_eq!(EnvironmentMode::default(), EnvironmentMode::NonReproducible);
}

#[test]
fn test_config_error_converts_into_solver_error() {
    let err: SolverForgeError = ConfigError::Invalid("bad".to_string()).into();
    assert!(matches!(err, SolverForgeError::Config(ref message) if message == "bad"));
    assert_eq!(err.to_string(), "Configuration error: bad");
}

#[test]
fn test_override_inherits_from_configured_termination() {
    let mut config = SolverConfig::new().with_termination(
        TerminationConfig::new()
            .with_seconds_spent_limit(30)
            .with_step_count_limit(10),
    );
    SolverConfigOverride::with_termination(TerminationConfig::new().with_minutes_spent_limit(2))
        .apply(&mut config);

    let termination = config.termination.unwrap();
    assert_eq!(termination.calculate_time_millis_spent_limit().unwrap(), Some(120_000));
    assert_eq!(termination.seconds_spent_limit, None);
    assert_eq!(termination.step_count_limit, Some(10));
}

// Time limit calculation

#[test]
fn test_granular_time_fields_add_up() {
    let config = TerminationConfig {
        milliseconds_spent_limit: Some(500),
        seconds_spent_limit: Some(2),
        minutes_spent_limit: Some(1),
        hours_spent_limit: Some(1),
        days_spent_limit: Some(1),
        ..TerminationConfig::default()
    };
    assert_eq!(
        config.calculate_time_millis_spent_limit().unwrap(),
        Some(500 + 2_000 + 60_000 + 3_600_000 + 86_400_000)
    );
}

#[test]
fn test_unset_time_limit_is_none() {
    let config = TerminationConfig::new().with_step_count_limit(5);
    assert_eq!(config.calculate_time_millis_spent_limit().unwrap(), None);
    assert_eq!(config.calculate_unimproved_time_millis_spent_limit().unwrap(), None);
}

#[test]
fn test_duration_limit() {
    let config = TerminationConfig::new()
        .with_spent_limit(Duration::from_millis(1_500))
        .with_unimproved_spent_limit(Duration::from_secs(3));
    assert_eq!(config.calculate_time_millis_spent_limit().unwrap(), Some(1_500));
    assert_eq!(config.calculate_unimproved_time_millis_spent_limit().unwrap(), Some(3_000));
}

#[test]
fn test_duration_cannot_be_combined_with_granular_fields() {
    let config = TerminationConfig::new()
        .with_spent_limit(Duration::from_secs(1))
        .with_seconds_spent_limit(5);
    let err = config.calculate_time_millis_spent_limit().unwrap_err();
    assert_eq!(
        err.to_string(),
        "The termination spent_limit (1s) cannot be combined with \
         milliseconds_spent_limit (null), seconds_spent_limit (5), minutes_spent_limit (null), \
         hours_spent_limit (null) or days_spent_limit (null)."
    );
}

#[test]
fn test_unimproved_duration_cannot_be_combined_with_granular_fields() {
    let config = TerminationConfig::new()
        .with_unimproved_spent_limit(Duration::from_secs(1))
        .with_unimproved_seconds_spent_limit(5);
    let err = config.calculate_unimproved_time_millis_spent_limit().unwrap_err();
    assert!(err
        .to_string()
        .contains("unimproved_spent_limit (1s) cannot be combined with"));
}

#[test]
fn test_nanoseconds_are_rejected() {
    let config = TerminationConfig::new().with_spent_limit(Duration::from_nanos(1_000_000_001));
    let err = config.calculate_time_millis_spent_limit().unwrap_err();
    assert!(err.to_string().contains("spent_limit"));
    assert!(err.to_string().ends_with("cannot use nanoseconds."));

    let micros = TerminationConfig::new().with_spent_limit(Duration::from_micros(2_500));
    assert_eq!(micros.calculate_time_millis_spent_limit().unwrap(), Some(2));
}

#[test]
fn test_negative_fields_are_rejected() {
    let config = TerminationConfig::new().with_minutes_spent_limit(-1);
    let err = config.calculate_time_millis_spent_limit().unwrap_err();
    assert_eq!(
        err.to_string(),
        "The termination minutes_spent_limit (-1) cannot be negative."
    );

    let unimproved = TerminationConfig {
        unimproved_days_spent_limit: Some(-2),
        ..TerminationConfig::default()
    };
    let err = unimproved.calculate_unimproved_time_millis_spent_limit().unwrap_err();
    assert!(err.to_string().contains("unimproved_days_spent_limit (-2)"));
}

#[test]
fn test_adaptive_grace_period_follows_the_same_rules() {
    let adaptive = AdaptiveConfig::new().with_grace_period_seconds(4);
    assert_eq!(adaptive.calculate_grace_period_millis().unwrap(), Some(4_000));

    let both = AdaptiveConfig::new()
        .with_grace_period_duration(Duration::from_secs(1))
        .with_grace_period_seconds(4);
    assert!(both
        .calculate_grace_period_millis()
        .unwrap_err()
        .to_string()
        .contains("adaptive.grace_period_duration (1s) cannot be combined with"));
}

// Overwriting and shortening

#[test]
fn test_overwrite_spent_limit_clears_granular_fields() {
    let mut config = TerminationConfig::new()
        .with_seconds_spent_limit(5)
        .with_minutes_spent_limit(1);
    config.overwrite_spent_limit(Some(Duration::from_secs(2)));
    assert_eq!(config.seconds_spent_limit, None);
    assert_eq!(config.minutes_spent_limit, None);
    assert_eq!(config.calculate_time_millis_spent_limit().unwrap(), Some(2_000));

    let mut unimproved = TerminationConfig::new().with_unimproved_seconds_spent_limit(9);
    unimproved.overwrite_unimproved_spent_limit(None);
    assert_eq!(unimproved.calculate_unimproved_time_millis_spent_limit().unwrap(), None);
}

#[test]
fn test_shorten_only_lowers_the_limit() {
    let mut config = TerminationConfig::new().with_seconds_spent_limit(10);
    config.shorten_time_millis_spent_limit(20_000).unwrap();
    assert_eq!(config.calculate_time_millis_spent_limit().unwrap(), Some(10_000));
    assert_eq!(config.seconds_spent_limit, Some(10));

    config.shorten_time_millis_spent_limit(4_000).unwrap();
    assert_eq!(config.calculate_time_millis_spent_limit().unwrap(), Some(4_000));
    assert_eq!(config.seconds_spent_limit, None);
    assert_eq!(config.milliseconds_spent_limit, Some(4_000));
}

#[test]
fn test_shorten_sets_a_missing_limit() {
    let mut config = TerminationConfig::new();
    config.shorten_time_millis_spent_limit(750).unwrap();
    assert_eq!(config.calculate_time_millis_spent_limit().unwrap(), Some(750));
}

// Configured checks

#[test]
fn test_is_configured() {
    assert!(!TerminationConfig::new().is_configured());
    assert!(TerminationConfig::new().with_seconds_spent_limit(1).is_configured());
    assert!(TerminationConfig::new().with_best_score_feasible(true).is_configured());
    assert!(TerminationConfig::new().with_flat_line_detection_ratio(0.5).is_configured());
    assert!(TerminationConfig::new()
        .with_adaptive(AdaptiveConfig::new())
        .is_configured());
    let unimproved_days = TerminationConfig {
        unimproved_days_spent_limit: Some(1),
        ..TerminationConfig::default()
    };
    assert!(unimproved_days.is_configured());
}

#[test]
fn test_termination_list_configured_follows_composition_style() {
    let configured = TerminationConfig::new().with_step_count_limit(1);
    let empty = TerminationConfig::new();

    let and = TerminationConfig::new()
        .with_termination_composition_style(TerminationCompositionStyle::And)
        .with_termination_config_list(vec![configured.clone(), empty.clone()]);
    assert!(!and.is_termination_list_configured());
    assert!(!and.is_configured());

    let or = TerminationConfig::new()
        .with_termination_composition_style(TerminationCompositionStyle::Or)
        .with_termination_config_list(vec![configured.clone(), empty]);
    assert!(or.is_termination_list_configured());
    assert!(or.is_configured());

    let no_style = TerminationConfig::new().with_termination_config_list(vec![configured]);
    assert!(!no_style.is_termination_list_configured());

    let empty_list = TerminationConfig::new()
        .with_termination_composition_style(TerminationCompositionStyle::Or);
    assert!(!empty_list.is_termination_list_configured());
}

// Inheritance

#[test]
fn test_inherit_fills_unset_properties() {
    let parent = TerminationConfig::new()
        .with_seconds_spent_limit(30)
        .with_step_count_limit(100)
        .with_best_score_limit("0")
        .with_termination_composition_style(TerminationCompositionStyle::Or);
    let mut child = TerminationConfig::new().with_step_count_limit(5);
    child.inherit(&parent);

    assert_eq!(child.seconds_spent_limit, Some(30));
    assert_eq!(child.step_count_limit, Some(5));
    assert_eq!(child.best_score_limit.as_deref(), Some("0"));
    assert_eq!(
        child.termination_composition_style,
        Some(TerminationCompositionStyle::Or)
    );
}

#[test]
fn test_inherit_takes_time_limits_as_a_whole() {
    let parent = TerminationConfig::new()
        .with_seconds_spent_limit(30)
        .with_minutes_spent_limit(1)
        .with_unimproved_seconds_spent_limit(7);
    let mut child = TerminationConfig::new().with_spent_limit(Duration::from_secs(2));
    child.inherit(&parent);

    assert_eq!(child.seconds_spent_limit, None);
    assert_eq!(child.minutes_spent_limit, None);
    assert_eq!(child.calculate_time_millis_spent_limit().unwrap(), Some(2_000));
    assert_eq!(child.calculate_unimproved_time_millis_spent_limit().unwrap(), Some(7_000));
}

#[test]
fn test_inherit_merges_termination_lists() {
    let parent = TerminationConfig::new()
        .with_termination_config_list(vec![TerminationConfig::new().with_step_count_limit(1)]);
    let mut child = TerminationConfig::new()
        .with_termination_config_list(vec![TerminationConfig::new().with_move_count_limit(2)]);
    child.inherit(&parent);

    assert_eq!(child.termination_config_list.len(), 2);
    assert_eq!(child.termination_config_list[0].step_count_limit, Some(1));
    assert_eq!(child.termination_config_list[1].move_count_limit, Some(2));
}
