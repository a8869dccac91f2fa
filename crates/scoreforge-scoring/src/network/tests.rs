use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use smallvec::smallvec;

use super::*;

#[derive(Debug, Clone, PartialEq)]
struct Item {
    group: u8,
}

fn fact(id: FactId, group: u8) -> FactHandle {
    FactHandle::new(id, Arc::new(Item { group }), true)
}

fn uni(id: FactId, group: u8) -> Facts {
    smallvec![Element::Fact(fact(id, group))]
}

fn by_group() -> Mapper {
    Arc::new(|facts: &[Element]| Element::value(facts[0].get::<Item>().group))
}

fn drained(node: &mut dyn Node) -> Vec<Signal> {
    let mut out = Vec::new();
    node.drain(&mut out);
    out
}

fn ids_of(facts: &Facts) -> Vec<FactId> {
    facts
        .iter()
        .filter_map(|e| e.as_fact().map(FactHandle::id))
        .collect()
}

struct CountCollector;

struct CountAccumulator(usize);

impl ErasedCollector for CountCollector {
    fn extract(&self, _facts: &[Element]) -> Box<dyn Any + Send + Sync> {
        Box::new(())
    }

    fn create_accumulator(&self) -> Box<dyn ErasedAccumulator> {
        Box::new(CountAccumulator(0))
    }
}

impl ErasedAccumulator for CountAccumulator {
    fn accumulate(&mut self, _value: &(dyn Any + Send + Sync)) {
        self.0 += 1;
    }

    fn retract(&mut self, _value: &(dyn Any + Send + Sync)) {
        self.0 -= 1;
    }

    fn result(&self) -> Element {
        Element::value(self.0)
    }
}

#[test]
fn test_drain_orders_retracts_updates_inserts() {
    let mut tuples = OutputTuples::new();
    let a = tuples.create(uni(1, 0));
    let b = tuples.create(uni(2, 0));
    let mut out = Vec::new();
    tuples.drain(&mut out);
    assert_eq!(out.len(), 2);
    assert!(matches!(out[0], Signal::Insert(id, _) if id == a));
    assert_eq!(tuples.state(a), Some(TupleState::Ok));

    tuples.update(a, uni(1, 1));
    tuples.retract(b);
    let c = tuples.create(uni(3, 0));
    assert_eq!(tuples.state(b), Some(TupleState::Dying));
    assert_eq!(tuples.state(c), Some(TupleState::Creating));

    out.clear();
    tuples.drain(&mut out);
    assert!(matches!(out[0], Signal::Retract(id) if id == b));
    assert!(matches!(out[1], Signal::Update(id, _) if id == a));
    assert!(matches!(out[2], Signal::Insert(id, _) if id == c));
    assert_eq!(tuples.state(b), None);
}

#[test]
fn test_created_then_retracted_tuple_is_never_announced() {
    let mut tuples = OutputTuples::new();
    let a = tuples.create(uni(1, 0));
    tuples.update(a, uni(1, 2));
    tuples.retract(a);
    assert_eq!(tuples.state(a), Some(TupleState::Aborting));

    let mut out = Vec::new();
    tuples.drain(&mut out);
    assert!(out.is_empty());
    assert!(!tuples.has_pending());
}

#[test]
fn test_join_result_does_not_depend_on_arrival_order() {
    let indexer = JoinIndexer {
        left_keys: vec![by_group()],
        right_keys: vec![by_group()],
        filters: Vec::new(),
    };
    let run = |right_first: bool| {
        let mut join = JoinNode::new(indexer.clone());
        let lefts = [(0, uni(1, 7)), (1, uni(2, 8))];
        let rights = [(0, uni(10, 7)), (1, uni(11, 7))];
        let mut deliver = |side: Side, batch: &[(TupleId, Facts)]| {
            for (id, facts) in batch {
                join.insert(side, *id, facts);
            }
        };
        if right_first {
            deliver(Side::Right, &rights);
            deliver(Side::Left, &lefts);
        } else {
            deliver(Side::Left, &lefts);
            deliver(Side::Right, &rights);
        }
        let mut pairs: Vec<Vec<FactId>> = drained(&mut join)
            .iter()
            .map(|signal| match signal {
                Signal::Insert(_, facts) => ids_of(facts),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        pairs.sort();
        pairs
    };
    assert_eq!(run(false), vec![vec![1, 10], vec![1, 11]]);
    assert_eq!(run(true), run(false));
}

#[test]
fn test_join_update_moves_pairs_between_buckets() {
    let indexer = JoinIndexer {
        left_keys: vec![by_group()],
        right_keys: vec![by_group()],
        filters: Vec::new(),
    };
    let mut join = JoinNode::new(indexer);
    join.insert(Side::Left, 0, &uni(1, 1));
    join.insert(Side::Right, 0, &uni(2, 1));
    assert_eq!(drained(&mut join).len(), 1);

    join.update(Side::Right, 0, &uni(2, 2));
    let signals = drained(&mut join);
    assert_eq!(signals.len(), 1);
    assert!(matches!(signals[0], Signal::Retract(_)));

    join.update(Side::Left, 0, &uni(1, 2));
    let signals = drained(&mut join);
    assert!(matches!(signals.as_slice(), [Signal::Insert(_, _)]));
}

#[test]
fn test_exists_follows_counter_transitions() {
    let indexer = JoinIndexer {
        left_keys: vec![by_group()],
        right_keys: vec![by_group()],
        filters: Vec::new(),
    };
    let mut exists = ExistsNode::new(true, indexer.clone());
    let mut not_exists = ExistsNode::new(false, indexer);
    for node in [&mut exists as &mut dyn Node, &mut not_exists] {
        node.insert(Side::Left, 0, &uni(1, 3));
    }
    assert!(drained(&mut exists).is_empty());
    assert_eq!(drained(&mut not_exists).len(), 1);

    for node in [&mut exists as &mut dyn Node, &mut not_exists] {
        node.insert(Side::Right, 0, &uni(2, 3));
        node.insert(Side::Right, 1, &uni(3, 3));
    }
    assert!(matches!(drained(&mut exists).as_slice(), [Signal::Insert(_, _)]));
    assert!(matches!(drained(&mut not_exists).as_slice(), [Signal::Retract(_)]));

    // One of two matches leaving does not change visibility.
    exists.retract(Side::Right, 0);
    assert!(drained(&mut exists).is_empty());

    exists.update(Side::Right, 1, &uni(3, 4));
    assert!(matches!(drained(&mut exists).as_slice(), [Signal::Retract(_)]));
}

#[test]
fn test_group_tuple_lives_while_count_is_positive() {
    let mut group = GroupNode::new(vec![by_group()], vec![Arc::new(CountCollector)]);
    // Three in group 1, two in group 2.
    for (id, g) in [(0, 1), (1, 1), (2, 1), (3, 2), (4, 2)] {
        group.insert(Side::Left, id, &uni(id as FactId, g));
    }
    let mut outputs: HashMap<TupleId, Facts> = HashMap::new();
    for signal in drained(&mut group) {
        if let Signal::Insert(id, facts) = signal {
            outputs.insert(id, facts);
        }
    }
    assert_eq!(outputs.len(), 2);
    let b_group = outputs
        .iter()
        .find(|(_, facts)| *facts[0].get::<u8>() == 2)
        .map(|(id, facts)| {
            assert_eq!(*facts[1].get::<usize>(), 2);
            *id
        })
        .unwrap();

    group.retract(Side::Left, 3);
    let signals = drained(&mut group);
    assert!(matches!(signals.as_slice(), [Signal::Update(id, facts)] if *id == b_group && *facts[1].get::<usize>() == 1));

    group.retract(Side::Left, 4);
    assert!(matches!(drained(&mut group).as_slice(), [Signal::Retract(id)] if *id == b_group));
}

#[test]
fn test_group_forwards_a_newer_snapshot_of_the_same_fact() {
    let itself: Mapper = Arc::new(|facts: &[Element]| facts[0].clone());
    let mut group = GroupNode::new(vec![itself], vec![Arc::new(CountCollector)]);
    group.insert(Side::Left, 0, &uni(7, 1));
    let out_id = match drained(&mut group).as_slice() {
        [Signal::Insert(id, _)] => *id,
        other => panic!("unexpected {:?}", other.len()),
    };

    group.update(Side::Left, 0, &uni(7, 2));
    let signals = drained(&mut group);
    assert!(matches!(
        signals.as_slice(),
        [Signal::Update(id, facts)] if *id == out_id && facts[0].get::<Item>().group == 2
    ));

    // Re-delivering the same snapshot changes nothing.
    let same = uni(7, 3);
    group.update(Side::Left, 0, &same);
    drained(&mut group);
    group.update(Side::Left, 0, &same);
    assert!(drained(&mut group).is_empty());
}

#[test]
fn test_distinct_counts_duplicates() {
    let mut distinct = DistinctNode::new();
    let value: Facts = smallvec![Element::value(5u8)];
    distinct.insert(Side::Left, 0, &value);
    distinct.insert(Side::Left, 1, &value);
    assert_eq!(drained(&mut distinct).len(), 1);

    distinct.retract(Side::Left, 0);
    assert!(drained(&mut distinct).is_empty());
    distinct.retract(Side::Left, 1);
    assert!(matches!(drained(&mut distinct).as_slice(), [Signal::Retract(_)]));
}

#[test]
fn test_network_settles_in_one_pass() {
    let mut network = Network::new(1);
    let source = network.add_source(0);
    let predicate: Predicate = Arc::new(|facts: &[Element]| facts[0].get::<Item>().group > 0);
    let filter = network.add_node(Box::new(FilterNode::new(predicate)), &[(source, Side::Left)]);
    network.add_sink(filter, 0);
    assert!(network.has_source(0));
    assert_eq!(network.node_count(), 2);

    network.insert_fact(0, fact(1, 1));
    network.insert_fact(0, fact(2, 0));
    let mut live = 0i32;
    network.settle(|_, signal| match signal {
        Signal::Insert(..) => live += 1,
        Signal::Retract(_) => live -= 1,
        Signal::Update(..) => {}
    });
    assert_eq!(live, 1);

    network.update_fact(0, fact(1, 0));
    network.update_fact(0, fact(2, 3));
    network.retract_fact(0, 2);
    network.settle(|_, signal| match signal {
        Signal::Insert(..) => live += 1,
        Signal::Retract(_) => live -= 1,
        Signal::Update(..) => {}
    });
    assert_eq!(live, 0);
}
