use crate::network::Element;
use crate::stream::function::Shared;

use super::*;

#[derive(Debug, PartialEq, Eq, Hash)]
struct Shift {
    employee: u8,
    start: i64,
    end: i64,
}

fn shift(employee: u8, start: i64, end: i64) -> Element {
    Element::value(Shift {
        employee,
        start,
        end,
    })
}

#[test]
fn equal_matches_on_key() {
    let same_employee = equal(|s: &Shift| s.employee);
    let a = [shift(1, 0, 8)];
    assert!(same_employee.matches(&a, &shift(1, 8, 16)));
    assert!(!same_employee.matches(&a, &shift(2, 8, 16)));
}

#[test]
fn equal_bi_compares_left_tuple_with_right_element() {
    let joiner = equal_bi(|a: &Shift, b: &Shift| a.end.max(b.end), |c: &Shift| c.start);
    let left = [shift(1, 0, 8), shift(2, 4, 12)];
    assert!(joiner.matches(&left, &shift(3, 12, 20)));
    assert!(!joiner.matches(&left, &shift(3, 8, 20)));
}

#[test]
fn comparison_joiners() {
    let left = [shift(1, 0, 10)];
    let before = less_than(|a: &Shift| a.end, |b: &Shift| b.start);
    assert!(before.matches(&left, &shift(1, 11, 20)));
    assert!(!before.matches(&left, &shift(1, 10, 20)));

    let at_or_before = less_than_or_equal(|a: &Shift| a.end, |b: &Shift| b.start);
    assert!(at_or_before.matches(&left, &shift(1, 10, 20)));

    let after = greater_than(|a: &Shift| a.start, |b: &Shift| b.end);
    assert!(after.matches(&[shift(1, 30, 40)], &shift(1, 0, 10)));
    assert!(!after.matches(&[shift(1, 10, 40)], &shift(1, 0, 10)));

    let at_or_after = greater_than_or_equal(|a: &Shift| a.start, |b: &Shift| b.end);
    assert!(at_or_after.matches(&[shift(1, 10, 40)], &shift(1, 0, 10)));
}

#[test]
fn overlapping_uses_half_open_intervals() {
    let overlap = overlapping(
        |s: &Shift| s.start,
        |s: &Shift| s.end,
        |s: &Shift| s.start,
        |s: &Shift| s.end,
    );
    let left = [shift(1, 0, 10)];
    assert!(overlap.matches(&left, &shift(2, 5, 15)));
    assert!(!overlap.matches(&left, &shift(2, 10, 20)));
    assert!(!overlap.matches(&left, &shift(2, 12, 20)));
}

#[test]
fn and_requires_every_condition() {
    let joiner = equal(|s: &Shift| s.employee).and(filtering(|a: &Shift, b: &Shift| a.start < b.start));
    let left = [shift(1, 0, 8)];
    assert!(joiner.matches(&left, &shift(1, 8, 16)));
    assert!(!joiner.matches(&left, &shift(2, 8, 16)));
    assert!(!joiner.matches(&[shift(1, 9, 10)], &shift(1, 8, 16)));
}

#[test]
fn cross_matches_everything() {
    let joiner = cross::<(Shift,), Shift>();
    assert!(joiner.matches(&[shift(1, 0, 1)], &shift(9, 5, 6)));
    assert!(joiner.tokens().is_empty());
}

#[test]
fn stateless_closure_reused_has_one_identity() {
    let key = |s: &Shift| s.employee;
    let first = equal(key);
    let second = equal(key);
    assert_eq!(first.tokens(), second.tokens());

    let other = equal(|s: &Shift| s.employee);
    assert_ne!(first.tokens(), other.tokens());
}

#[test]
fn capturing_closure_is_unique_unless_shared() {
    let offset = 1;
    let key = move |s: &Shift| s.start + offset;
    let first = equal(key);
    let second = equal(key);
    assert_ne!(first.tokens(), second.tokens());

    let shared = Shared::new(move |s: &Shift| s.start + offset);
    let first = equal(shared.clone());
    let second = equal(shared);
    assert_eq!(first.tokens(), second.tokens());
}
