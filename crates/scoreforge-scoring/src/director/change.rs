// Pending change tokens returned by `before_*` notifications.
//
// Each token is consumed by the matching `after_*` call, so a change can
// only be completed once, and only by a notification of the same kind.

use crate::network::FactId;

/// An instance about to be inserted at `index` of its class collection.
#[must_use = "complete the change with the matching after_*_added call"]
#[derive(Debug, PartialEq, Eq)]
pub struct Addition {
    pub(crate) class: usize,
    pub(crate) index: usize,
}

/// An instance about to be removed from `index` of its class collection.
#[must_use = "complete the change with the matching after_*_removed call"]
#[derive(Debug, PartialEq, Eq)]
pub struct Removal {
    pub(crate) class: usize,
    pub(crate) index: usize,
    pub(crate) fact_id: Option<FactId>,
}

/// An instance about to be modified in place.
#[must_use = "complete the change with the matching after_* call"]
#[derive(Debug, PartialEq, Eq)]
pub struct VariableChange {
    pub(crate) class: usize,
    pub(crate) index: usize,
}

/// A planning list about to change between `from` (inclusive) and `to`
/// (exclusive).
#[must_use = "complete the change with after_list_variable_changed"]
#[derive(Debug, PartialEq, Eq)]
pub struct ListVariableChange {
    pub(crate) change: VariableChange,
    pub(crate) from: usize,
    pub(crate) to: usize,
}

impl Addition {
    pub fn class(&self) -> usize {
        self.class
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Removal {
    pub fn class(&self) -> usize {
        self.class
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl VariableChange {
    pub fn class(&self) -> usize {
        self.class
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl ListVariableChange {
    pub fn class(&self) -> usize {
        self.change.class
    }

    pub fn index(&self) -> usize {
        self.change.index
    }

    /// The changed range of the list.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.from..self.to
    }
}
