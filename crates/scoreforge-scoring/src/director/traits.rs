// Score director trait definition.

use scoreforge_core::{PlanningSolution, Result, SolutionDescriptor};

use super::change::{Addition, ListVariableChange, Removal, VariableChange};

// The score director owns the working solution and keeps its score.
//
// Every mutation of the working solution is wrapped in a `before_*` call,
// which returns a pending change, and the `after_*` call consuming it.
// Classes and instances are addressed by class index in the solution
// descriptor and position in the class collection.
pub trait ScoreDirector<S: PlanningSolution> {
    // Returns a reference to the working solution.
    fn working_solution(&self) -> &S;

    // Returns a mutable reference to the working solution.
    //
    // Mutations must be announced with the before/after notifications.
    fn working_solution_mut(&mut self) -> &mut S;

    // Returns the solution descriptor for this solution type.
    fn solution_descriptor(&self) -> &SolutionDescriptor<S>;

    // Calculates the current score and stores it on the working solution.
    fn calculate_score(&mut self) -> Result<S::Score>;

    // Number of `calculate_score` calls so far.
    fn calculation_count(&self) -> u64;

    // Clones the working solution.
    fn clone_working_solution(&self) -> S {
        self.working_solution().clone()
    }

    // Called before an instance is inserted at `index` of its class.
    fn before_entity_added(&mut self, class: usize, index: usize) -> Addition;

    fn after_entity_added(&mut self, change: Addition);

    // Called before the instance at `index` is removed from its class.
    fn before_entity_removed(&mut self, class: usize, index: usize) -> Removal;

    fn after_entity_removed(&mut self, change: Removal);

    // Called before a planning variable of an instance is changed.
    fn before_variable_changed(&mut self, class: usize, index: usize) -> VariableChange;

    fn after_variable_changed(&mut self, change: VariableChange);

    // Called before the planning list of an entity changes in `from..to`.
    fn before_list_variable_changed(
        &mut self,
        class: usize,
        index: usize,
        from: usize,
        to: usize,
    ) -> ListVariableChange {
        ListVariableChange {
            change: self.before_variable_changed(class, index),
            from,
            to,
        }
    }

    fn after_list_variable_changed(&mut self, change: ListVariableChange) {
        self.after_variable_changed(change.change);
    }

    // Called before a list value is added to some entity's list.
    fn before_list_variable_element_assigned(&mut self, class: usize, index: usize) -> VariableChange {
        self.before_variable_changed(class, index)
    }

    fn after_list_variable_element_assigned(&mut self, change: VariableChange) {
        self.after_variable_changed(change);
    }

    // Called before a list value is removed from every entity's list.
    fn before_list_variable_element_unassigned(
        &mut self,
        class: usize,
        index: usize,
    ) -> VariableChange {
        self.before_variable_changed(class, index)
    }

    fn after_list_variable_element_unassigned(&mut self, change: VariableChange) {
        self.after_variable_changed(change);
    }

    fn before_problem_fact_added(&mut self, class: usize, index: usize) -> Addition {
        self.before_entity_added(class, index)
    }

    fn after_problem_fact_added(&mut self, change: Addition) {
        self.after_entity_added(change);
    }

    fn before_problem_fact_removed(&mut self, class: usize, index: usize) -> Removal {
        self.before_entity_removed(class, index)
    }

    fn after_problem_fact_removed(&mut self, change: Removal) {
        self.after_entity_removed(change);
    }

    // Called before a property of a problem fact is changed.
    fn before_problem_property_changed(&mut self, class: usize, index: usize) -> VariableChange {
        self.before_variable_changed(class, index)
    }

    fn after_problem_property_changed(&mut self, change: VariableChange) {
        self.after_variable_changed(change);
    }

    // Returns the number of instances of a class.
    fn instance_count(&self, class: usize) -> usize {
        self.solution_descriptor()
            .classes()
            .get(class)
            .map_or(0, |c| c.count(self.working_solution()))
    }

    // Returns true if this score director supports incremental scoring.
    fn is_incremental(&self) -> bool {
        false
    }
}
