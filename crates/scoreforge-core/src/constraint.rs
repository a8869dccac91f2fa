//! Constraint identity and impact direction.

use std::fmt;

use crate::score::Score;

/// Identifies a constraint by package and name.
///
/// The fully qualified id joins both with a `/`; an empty package leaves
/// the bare name.
///
/// ```
/// use scoreforge_core::ConstraintRef;
///
/// assert_eq!(ConstraintRef::new("rooms", "Capacity").full_name(), "rooms/Capacity");
/// assert_eq!(ConstraintRef::new("", "Capacity").full_name(), "Capacity");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintRef {
    pub package: String,
    pub name: String,
}

impl ConstraintRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        compose_constraint_id(&self.package, &self.name)
    }
}

impl fmt::Display for ConstraintRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}/{}", self.package, self.name)
        }
    }
}

/// Fully qualified constraint id for `package` and `name`.
pub fn compose_constraint_id(package: &str, name: &str) -> String {
    ConstraintRef::new(package, name).to_string()
}

/// Direction in which a constraint moves the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactType {
    Penalty,
    Reward,
    /// The sign of the weighted match decides.
    Mixed,
}

impl ImpactType {
    /// Signed contribution of a weighted match.
    pub fn apply<Sc: Score>(self, weighted: Sc) -> Sc {
        match self {
            ImpactType::Penalty => -weighted,
            ImpactType::Reward | ImpactType::Mixed => weighted,
        }
    }
}
