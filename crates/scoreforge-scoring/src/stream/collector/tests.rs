use crate::network::Element;

use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Item {
    group: u8,
    value: i32,
}

fn facts(group: u8, value: i32) -> [Element; 1] {
    [Element::value(Item { group, value })]
}

fn run<L: 'static, C: Collector<L>>(collector: &C, add: &[i32], remove: &[i32]) -> C::Result {
    let mut acc = collector.create_accumulator();
    for &value in add {
        acc.accumulate(&collector.extract(&facts(0, value)));
    }
    for &value in remove {
        acc.retract(&collector.extract(&facts(0, value)));
    }
    acc.finish()
}

#[test]
fn count_tracks_retractions() {
    let collector = count::<(Item,)>();
    assert_eq!(run(&collector, &[1, 2, 3], &[2]), 2);
    assert_eq!(run(&collector, &[], &[]), 0);
}

#[test]
fn count_distinct_ignores_duplicates() {
    let collector = count_distinct(|item: &Item| item.value % 2);
    assert_eq!(run(&collector, &[1, 3, 4], &[]), 2);
    assert_eq!(run(&collector, &[1, 3, 4], &[4]), 1);
}

#[test]
fn sum_and_retract() {
    let collector = sum(|item: &Item| item.value);
    assert_eq!(run(&collector, &[5, 3, 7], &[3]), 12);
}

#[test]
fn average_is_exact_and_empty_is_none() {
    let collector = average(|item: &Item| item.value);
    let result = run(&collector, &[1, 2], &[]).unwrap();
    assert_eq!(result, Average { sum: 3, count: 2 });
    assert_eq!(result.value(), 1.5);
    assert_eq!(run(&collector, &[4], &[4]), None);
}

#[test]
fn min_and_max_fall_back_after_retraction() {
    let smallest = min(|item: &Item| item.value);
    let largest = max(|item: &Item| item.value);
    assert_eq!(run(&smallest, &[4, 1, 9], &[]), Some(1));
    assert_eq!(run(&smallest, &[4, 1, 9, 1], &[1]), Some(1));
    assert_eq!(run(&smallest, &[4, 1, 9], &[1]), Some(4));
    assert_eq!(run(&largest, &[4, 1, 9], &[9]), Some(4));
    assert_eq!(run(&largest, &[], &[]), None);
}

#[test]
fn list_keeps_duplicates_and_set_does_not() {
    let list = to_list(|item: &Item| item.value);
    assert_eq!(run(&list, &[2, 1, 2], &[2]), vec![1, 2]);

    let set = to_set(|item: &Item| item.value);
    let result = run(&set, &[2, 1, 2], &[2]);
    assert_eq!(result.into_iter().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn erased_collector_produces_elements() {
    let (erased, tokens) = erase_collector(sum(|item: &Item| item.value));
    assert_eq!(tokens.len(), 2);
    let mut acc = erased.create_accumulator();
    let value = erased.extract(&facts(1, 10));
    acc.accumulate(&*value);
    acc.accumulate(&*erased.extract(&facts(1, 5)));
    acc.retract(&*value);
    assert_eq!(*acc.result().get::<i32>(), 5);
}
