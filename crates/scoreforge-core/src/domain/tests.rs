use std::any::TypeId;

use super::descriptor::split_type_path;
use super::*;
use crate::score::SimpleScore;

#[derive(Clone, Debug, PartialEq)]
struct Task {
    id: usize,
    worker: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
struct Worker {
    id: usize,
}

#[derive(Clone)]
struct Plan {
    tasks: Vec<Task>,
    workers: Vec<Worker>,
    score: Option<SimpleScore>,
}

impl PlanningSolution for Plan {
    type Score = SimpleScore;

    fn score(&self) -> Option<SimpleScore> {
        self.score
    }

    fn set_score(&mut self, score: Option<SimpleScore>) {
        self.score = score;
    }
}

fn plan() -> Plan {
    Plan {
        tasks: vec![
            Task { id: 0, worker: Some(1) },
            Task { id: 1, worker: None },
        ],
        workers: vec![Worker { id: 0 }, Worker { id: 1 }],
        score: None,
    }
}

fn descriptor() -> SolutionDescriptor<Plan> {
    SolutionDescriptor::<Plan>::of()
        .with_entity::<Task>(|p| &p.tasks, |_, t| t.worker.is_some())
        .with_problem_fact::<Worker>(|p| &p.workers)
}

#[test]
fn test_descriptor_names_from_type_path() {
    let d = descriptor();
    assert_eq!(d.type_name, "Plan");
    assert_eq!(d.constraint_package, "scoreforge_core::domain::tests");
    assert_eq!(d.class_names(), "Task, Worker");
}

#[test]
fn test_class_lookup_by_type() {
    let d = descriptor();
    assert_eq!(d.class_index(TypeId::of::<Task>()), Some(0));
    assert_eq!(d.class_of::<Worker>().map(|c| c.kind), Some(ClassKind::ProblemFact));
    assert!(d.class_of::<String>().is_none());
}

#[test]
fn test_snapshot_and_assignment() {
    let d = descriptor();
    let solution = plan();
    let tasks = d.class(0);

    assert_eq!(tasks.count(&solution), 2);
    assert!(tasks.is_assigned(&solution, 0));
    assert!(!tasks.is_assigned(&solution, 1));

    let snapshot = tasks.snapshot(&solution, 1).unwrap();
    let task = (*snapshot).as_any().downcast_ref::<Task>().unwrap();
    assert_eq!(task.id, 1);
    assert!(tasks.snapshot(&solution, 2).is_none());
}

#[test]
fn test_problem_facts_are_always_assigned() {
    let d = descriptor();
    let workers = d.class_of::<Worker>().unwrap();
    assert!(workers.is_assigned(&plan(), 0));
    assert!(!workers.kind.is_assignable());
}

#[test]
fn test_reregistering_a_class_replaces_it() {
    let d = descriptor().with_list_value::<Task>(|p| &p.tasks, |_, _| true);
    assert_eq!(d.classes().len(), 2);
    assert_eq!(d.class(0).kind, ClassKind::ListValue);
}

#[test]
fn test_split_type_path() {
    assert_eq!(split_type_path("a::b::Type"), ("a::b", "Type"));
    assert_eq!(split_type_path("Type"), ("", "Type"));
    assert_eq!(
        split_type_path("a::Wrapper<b::Inner>"),
        ("a", "Wrapper<b::Inner>")
    );
}

#[test]
fn test_solution_score_roundtrip() {
    let mut solution = plan();
    solution.set_score(Some(SimpleScore::of(-3)));
    assert_eq!(solution.score(), Some(SimpleScore::of(-3)));
}
