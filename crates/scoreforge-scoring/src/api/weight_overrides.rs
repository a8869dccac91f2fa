// Overrides are keyed by fully qualified constraint id (`package/name`)
// and replace the weight a constraint was defined with when a session
// factory is built. A zero weight disables the constraint: its nodes are
// not instantiated and it contributes no matches.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use scoreforge_core::{ConstraintRef, Score};

// Replacement weights by constraint id.
#[derive(Clone)]
pub struct ConstraintWeightOverrides<Sc: Score> {
    weights: HashMap<String, Sc>,
}

impl<Sc: Score> Debug for ConstraintWeightOverrides<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintWeightOverrides")
            .field("overridden", &self.weights.len())
            .finish()
    }
}

impl<Sc: Score> Default for ConstraintWeightOverrides<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Sc: Score> ConstraintWeightOverrides<Sc> {
    pub fn new() -> Self {
        Self {
            weights: HashMap::new(),
        }
    }

    pub fn from_pairs<I, N>(iter: I) -> Self
    where
        I: IntoIterator<Item = (N, Sc)>,
        N: Into<String>,
    {
        Self {
            weights: iter
                .into_iter()
                .map(|(constraint_id, weight)| (constraint_id.into(), weight))
                .collect(),
        }
    }

    pub fn put<N: Into<String>>(&mut self, constraint_id: N, weight: Sc) {
        self.weights.insert(constraint_id.into(), weight);
    }

    pub fn remove(&mut self, constraint_id: &str) -> Option<Sc> {
        self.weights.remove(constraint_id)
    }

    pub fn get_or_default(&self, constraint_id: &str, default: Sc) -> Sc {
        self.weights.get(constraint_id).copied().unwrap_or(default)
    }

    pub fn get(&self, constraint_id: &str) -> Option<&Sc> {
        self.weights.get(constraint_id)
    }

    pub fn contains(&self, constraint_id: &str) -> bool {
        self.weights.contains_key(constraint_id)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    // Override ids that match none of the given constraints.
    pub fn unknown_ids<'a>(&'a self, constraints: &[&ConstraintRef]) -> Vec<&'a str> {
        let known: Vec<String> = constraints.iter().map(|c| c.full_name()).collect();
        let mut unknown: Vec<&str> = self
            .weights
            .keys()
            .filter(|id| !known.contains(id))
            .map(String::as_str)
            .collect();
        unknown.sort_unstable();
        unknown
    }
}

// Source of constraint weights looked up when a session factory is built.
pub trait WeightProvider<Sc: Score>: Send + Sync {
    fn weight(&self, constraint_id: &str) -> Option<Sc>;

    fn weight_or_default(&self, constraint_id: &str, default: Sc) -> Sc {
        self.weight(constraint_id).unwrap_or(default)
    }
}

impl<Sc: Score> WeightProvider<Sc> for ConstraintWeightOverrides<Sc> {
    fn weight(&self, constraint_id: &str) -> Option<Sc> {
        self.get(constraint_id).copied()
    }
}

impl<Sc: Score> WeightProvider<Sc> for Arc<ConstraintWeightOverrides<Sc>> {
    fn weight(&self, constraint_id: &str) -> Option<Sc> {
        self.get(constraint_id).copied()
    }
}
