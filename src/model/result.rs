use crate::solver::SolverState;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// A model entity that produced a solver row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Entity {
    Variable(usize),
    Expression(String),
}

/// Which bound of an entity a row represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundSide {
    /// `entity >= lower`, sent as `-entity <= -lower`
    Lower,
    /// `entity <= upper`
    Upper,
    /// `entity == level`
    Level,
}

/// Origin of one row of the numeric problem
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowOrigin {
    pub entity: Entity,
    pub side: BoundSide,
}

impl RowOrigin {
    pub fn variable(index: usize, side: BoundSide) -> Self {
        Self {
            entity: Entity::Variable(index),
            side,
        }
    }

    pub fn expression(name: impl Into<String>, side: BoundSide) -> Self {
        Self {
            entity: Entity::Expression(name.into()),
            side,
        }
    }
}

/// Outcome of solving a model
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelResult {
    pub state: SolverState,
    /// objective value, when a solution exists
    pub value: Option<Decimal>,
    /// one value per model variable, empty when no solution exists
    pub values: Vec<Decimal>,
    /// multipliers of the constraint rows, keyed by their origin
    pub multipliers: Option<BTreeMap<RowOrigin, Decimal>>,
    pub iterations: u32,
}

impl ModelResult {
    /// A result carrying no solution
    pub fn with_state(state: SolverState) -> Self {
        Self {
            state,
            value: None,
            values: Vec::new(),
            multipliers: None,
            iterations: 0,
        }
    }

    pub fn value_of(&self, variable: usize) -> Option<Decimal> {
        self.values.get(variable).copied()
    }

    pub fn multiplier(&self, origin: &RowOrigin) -> Option<Decimal> {
        self.multipliers.as_ref()?.get(origin).copied()
    }
}
