use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::error::{ModelError, Result};
use super::models::{Objective, VariableId};
use super::program::Program;

/// One solution of a solved program
///
/// Variable values are stored sparsely: a variable without an entry has the
/// value 0.0. The combined and per-objective values are computed on first
/// access and cached.
#[derive(Debug)]
pub struct Solution<'p> {
    program: &'p Program,
    optimal: bool,
    values: BTreeMap<VariableId, f64>,
    bound: Option<f64>,
    objective_value: OnceLock<f64>,
    objective_values: Vec<OnceLock<f64>>,
}

impl<'p> Solution<'p> {
    pub(crate) fn new(program: &'p Program, optimal: bool) -> Self {
        Self {
            program,
            optimal,
            values: BTreeMap::new(),
            bound: None,
            objective_value: OnceLock::new(),
            objective_values: (0..program.objectives_count())
                .map(|_| OnceLock::new())
                .collect(),
        }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn is_optimal(&self) -> bool {
        self.optimal
    }

    pub fn variable_value(&self, variable: VariableId) -> f64 {
        self.values.get(&variable).copied().unwrap_or(0.0)
    }

    pub fn binary_value(&self, variable: VariableId) -> bool {
        self.variable_value(variable) > 0.0
    }

    /// Value rounded to the nearest integer, halves rounding up
    pub fn integer_value(&self, variable: VariableId) -> i64 {
        (self.variable_value(variable) + 0.5).floor() as i64
    }

    /// Nonzero values in variable insertion order
    pub fn values(&self) -> impl Iterator<Item = (VariableId, f64)> + '_ {
        self.values.iter().map(|(&variable, &value)| (variable, value))
    }

    pub fn best_objective_bound(&self) -> Option<f64> {
        self.bound
    }

    /// Combined value of all objectives under the program sense
    pub fn objective_value(&self) -> Result<f64> {
        if let Some(&value) = self.objective_value.get() {
            return Ok(value);
        }

        let sense = self.program.determine_program_objective_sense()?;
        let mut sum = 0.0;
        for objective in self.program.objectives() {
            let value = self.objective_value_of(objective)?;
            if objective.sense() == sense {
                sum += value;
            } else {
                sum -= value;
            }
        }

        Ok(*self.objective_value.get_or_init(|| sum))
    }

    /// Raw value of a single objective in this solution
    pub fn objective_value_of(&self, objective: &Objective) -> Result<f64> {
        let cache = self
            .objective_values
            .get(objective.index())
            .filter(|_| objective.program() == self.program.id())
            .ok_or_else(|| {
                ModelError::InvalidArgument(format!(
                    "Objective '{}' does not belong to program '{}'",
                    objective.name(),
                    self.program.name()
                ))
            })?;

        Ok(*cache.get_or_init(|| {
            objective
                .expression()
                .evaluate(|variable| self.variable_value(variable))
        }))
    }

    /// `|bound - value| / |value|`; +∞ while no bound is known
    pub fn relative_optimality_gap(&self) -> f64 {
        let Some(bound) = self.bound else {
            return f64::INFINITY;
        };

        match self.objective_value() {
            Ok(value) => (bound - value).abs() / value.abs(),
            Err(_) => f64::INFINITY,
        }
    }

    pub(crate) fn set_variable_value(&mut self, variable: VariableId, value: f64) {
        // -0.0 == 0.0, so negative zero is dropped here as well
        if value == 0.0 {
            self.values.remove(&variable);
        } else {
            self.values.insert(variable, value);
        }
        self.reset_caches();
    }

    pub(crate) fn set_best_objective_bound(&mut self, bound: f64) {
        self.bound = Some(bound);
    }

    fn reset_caches(&mut self) {
        self.objective_value = OnceLock::new();
        for cache in &mut self.objective_values {
            *cache = OnceLock::new();
        }
    }
}

impl PartialEq for Solution<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.optimal == other.optimal
            && self.bound.map(f64::to_bits) == other.bound.map(f64::to_bits)
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|((v1, x1), (v2, x2))| v1 == v2 && x1.to_bits() == x2.to_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::VariableSpec;
    use crate::domain::value_objects::ObjectiveSense;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_creation() {
        let program = Program::new("p").unwrap();
        let plain = Solution::new(&program, false);
        let optimal = Solution::new(&program, true);

        assert!(!plain.is_optimal());
        assert!(optimal.is_optimal());
        assert!(plain.best_objective_bound().is_none());
        assert_eq!(plain.relative_optimality_gap(), f64::INFINITY);
        assert_eq!(optimal.relative_optimality_gap(), f64::INFINITY);
    }

    #[test]
    fn test_variable_values() {
        let mut program = Program::new("p").unwrap();
        let v1 = program.add_variable(VariableSpec::default()).unwrap();
        let v2 = program.add_variable(VariableSpec::default()).unwrap();
        let v3 = program.add_variable(VariableSpec::default()).unwrap();

        let mut sol = Solution::new(&program, false);
        assert_eq!(sol.variable_value(v1), 0.0);
        assert_eq!(sol.integer_value(v1), 0);
        assert!(!sol.binary_value(v1));

        sol.set_variable_value(v1, 10.5);
        sol.set_variable_value(v2, 10.4);
        sol.set_variable_value(v3, 0.0);

        assert_eq!(sol.variable_value(v1), 10.5);
        assert_eq!(sol.integer_value(v1), 11);
        assert!(sol.binary_value(v1));

        assert_eq!(sol.variable_value(v2), 10.4);
        assert_eq!(sol.integer_value(v2), 10);
        assert!(sol.binary_value(v2));

        assert_eq!(sol.variable_value(v3), 0.0);
        assert_eq!(sol.integer_value(v3), 0);
        assert!(!sol.binary_value(v3));

        assert_eq!(sol.values().count(), 2);
    }

    #[test]
    fn test_negative_zero_not_stored() {
        let mut program = Program::new("p").unwrap();
        let v = program.add_variable(VariableSpec::default()).unwrap();
        let mut sol = Solution::new(&program, false);

        sol.set_variable_value(v, -0.0);
        assert_eq!(sol.values().count(), 0);
        assert_eq!(sol.variable_value(v).to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn test_objectives_and_gap() {
        let mut program = Program::new("p").unwrap();
        let var1 = program.add_variable(VariableSpec::default()).unwrap();
        let var2 = program.add_variable(VariableSpec::default()).unwrap();
        program
            .add_unnamed_objective(ObjectiveSense::Maximize)
            .expression_mut()
            .add_term(1.0, var1)
            .unwrap()
            .add_term(2.0, var2)
            .unwrap();
        program
            .add_unnamed_objective(ObjectiveSense::Minimize)
            .expression_mut()
            .add_term(2.0, var1)
            .unwrap()
            .add_term(4.0, var2)
            .unwrap();

        let mut sol = Solution::new(&program, false);
        sol.set_variable_value(var1, 10.0);
        sol.set_variable_value(var2, 20.0);

        assert!((sol.objective_value().unwrap() - -50.0).abs() < EPS);
        assert!((sol.objective_value().unwrap() - -50.0).abs() < EPS);

        let obj1 = program.objective(0).unwrap();
        let obj2 = program.objective(1).unwrap();
        assert!((sol.objective_value_of(obj1).unwrap() - 50.0).abs() < EPS);
        assert!((sol.objective_value_of(obj2).unwrap() - 100.0).abs() < EPS);

        sol.set_best_objective_bound(0.0);
        assert!((sol.relative_optimality_gap() - 1.0).abs() < EPS);

        sol.set_best_objective_bound(-50.0);
        assert!(sol.relative_optimality_gap().abs() < EPS);
    }

    #[test]
    fn test_gap_half() {
        let mut program = Program::new("p").unwrap();
        let x = program.add_variable(VariableSpec::continuous("x")).unwrap();
        program
            .add_objective("obj", ObjectiveSense::Minimize)
            .unwrap()
            .expression_mut()
            .add_term(5.0, x)
            .unwrap();

        let mut sol = Solution::new(&program, false);
        sol.set_variable_value(x, 10.0);
        assert_eq!(sol.relative_optimality_gap(), f64::INFINITY);

        sol.set_best_objective_bound(100.0);
        assert!((sol.objective_value().unwrap() - 50.0).abs() < EPS);
        assert!((sol.relative_optimality_gap() - 0.5).abs() < EPS);
    }

    #[test]
    fn test_opposite_sense_is_subtracted() {
        let mut program = Program::new("p").unwrap();
        let x = program.add_variable(VariableSpec::continuous("x")).unwrap();
        program
            .add_objective("min", ObjectiveSense::Minimize)
            .unwrap()
            .expression_mut()
            .add_term(2.0, x)
            .unwrap();
        program
            .add_objective("max", ObjectiveSense::Maximize)
            .unwrap()
            .expression_mut()
            .add_term(4.0, x)
            .unwrap();

        let mut sol = Solution::new(&program, false);
        sol.set_variable_value(x, 10.0);
        assert!((sol.objective_value().unwrap() - -20.0).abs() < EPS);
    }

    #[test]
    fn test_objective_constant_included() {
        let mut program = Program::new("p").unwrap();
        let x = program.add_variable(VariableSpec::continuous("x")).unwrap();
        program
            .add_objective("obj", ObjectiveSense::Minimize)
            .unwrap()
            .expression_mut()
            .add_term(3.0, x)
            .unwrap()
            .add_constant(7.0);

        let mut sol = Solution::new(&program, false);
        sol.set_variable_value(x, 2.0);
        assert!((sol.objective_value().unwrap() - 13.0).abs() < EPS);
    }

    #[test]
    fn test_objective_value_requires_objective() {
        let program = Program::new("p").unwrap();
        let sol = Solution::new(&program, false);
        assert!(matches!(
            sol.objective_value(),
            Err(ModelError::IllegalState { .. })
        ));
    }

    #[test]
    fn test_foreign_objective_rejected() {
        let program = Program::new("p").unwrap();
        let mut other = Program::new("other").unwrap();
        other.add_objective("obj", ObjectiveSense::Minimize).unwrap();

        let sol = Solution::new(&program, false);
        assert!(matches!(
            sol.objective_value_of(other.objective(0).unwrap()),
            Err(ModelError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_equality() {
        let mut program = Program::new("p").unwrap();
        let x = program.add_variable(VariableSpec::continuous("x")).unwrap();

        let mut a = Solution::new(&program, true);
        let mut b = Solution::new(&program, true);
        a.set_variable_value(x, 1.0);
        b.set_variable_value(x, 1.0);
        assert_eq!(a, b);

        b.set_best_objective_bound(1.0);
        assert_ne!(a, b);
        assert_ne!(Solution::new(&program, true), Solution::new(&program, false));
    }
}
