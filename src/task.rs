//! The grounded planning task consumed by the engine.
//!
//! Everything here arrives fully grounded from the translation collaborator.
//! The engine only reads these structures.

use std::collections::HashMap;

use crate::types::{Atom, Condition, Literal};

/// A conditional effect: when `condition` holds before the operator is
/// applied, the effect's atom is added (or deleted).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Effect {
    pub condition: Condition,
    pub atom: Atom,
}

impl Effect {
    pub fn new(condition: impl Into<Condition>, atom: Atom) -> Self {
        Self {
            condition: condition.into(),
            atom,
        }
    }

    /// An effect that fires whenever the operator is applied.
    pub fn unconditional(atom: Atom) -> Self {
        Self::new(Condition::empty(), atom)
    }
}

/// A ground operator.
///
/// Add effects win over delete effects on the same atom when both fire.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub name: String,
    pub precondition: Condition,
    pub add_effects: Vec<Effect>,
    pub del_effects: Vec<Effect>,
    /// Not used by the engine.
    pub cost: f64,
}

impl Operator {
    pub fn new(name: impl Into<String>, precondition: impl Into<Condition>) -> Self {
        Self {
            name: name.into(),
            precondition: precondition.into(),
            add_effects: Vec::new(),
            del_effects: Vec::new(),
            cost: 1.0,
        }
    }

    pub fn with_add(mut self, effect: Effect) -> Self {
        self.add_effects.push(effect);
        self
    }

    pub fn with_del(mut self, effect: Effect) -> Self {
        self.del_effects.push(effect);
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }
}

/// A ground axiom deriving `effect` whenever `condition` holds.
///
/// The effect must be a positive literal over a derived predicate.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Axiom {
    pub condition: Condition,
    pub effect: Literal,
}

impl Axiom {
    pub fn new(condition: impl Into<Condition>, effect: Literal) -> Self {
        Self {
            condition: condition.into(),
            effect,
        }
    }
}

/// Reachable parameter bindings per action schema, as produced by the
/// grounding collaborator. Accepted alongside the task, not consumed.
pub type ReachableActionParams = HashMap<String, Vec<Vec<String>>>;

/// A grounded task: the atom universe surviving delete-relaxed reachability,
/// the operators and axioms over it, and the initial state.
#[derive(Debug, Clone, Default)]
pub struct GroundedTask {
    /// Positive atoms only; never contains duplicates.
    pub atoms: Vec<Atom>,
    pub operators: Vec<Operator>,
    pub axioms: Vec<Axiom>,
    /// Atoms true in the initial state. All other atoms are false.
    pub init: Vec<Atom>,
    pub reachable_action_params: Option<ReachableActionParams>,
}

impl GroundedTask {
    pub fn new(atoms: Vec<Atom>, init: Vec<Atom>) -> Self {
        Self {
            atoms,
            init,
            ..Default::default()
        }
    }

    pub fn with_operator(mut self, op: Operator) -> Self {
        self.operators.push(op);
        self
    }

    pub fn with_axiom(mut self, axiom: Axiom) -> Self {
        self.axioms.push(axiom);
        self
    }
}
