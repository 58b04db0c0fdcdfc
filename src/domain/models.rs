use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use super::error::{ModelError, Result};
use super::expression::LinearExpression;
use super::program::Program;
use super::value_objects::{ObjectiveSense, Operator, VariableType};

static NEXT_PROGRAM_ID: AtomicU64 = AtomicU64::new(1);

/// Identity token of a program; every entity created by a program carries it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgramId(u64);

impl ProgramId {
    pub(crate) fn next() -> Self {
        Self(NEXT_PROGRAM_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a variable, valid only within the program that issued it
///
/// Handles order by insertion position, which is also the column order
/// engines use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableId {
    program: ProgramId,
    index: usize,
}

impl VariableId {
    pub(crate) fn new(program: ProgramId, index: usize) -> Self {
        Self { program, index }
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Position of the variable in its program's insertion order
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Decision variable in an optimization program
#[derive(Debug, Clone)]
pub struct Variable {
    id: VariableId,
    name: String,
    variable_type: VariableType,
    lower_bound: f64,
    upper_bound: f64,
    initial_value: Option<f64>,
}

impl Variable {
    pub(crate) fn new(id: VariableId, name: String, variable_type: VariableType) -> Self {
        let (lower_bound, upper_bound) = variable_type.default_bounds();
        Self {
            id,
            name,
            variable_type,
            lower_bound,
            upper_bound,
            initial_value: None,
        }
    }

    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variable_type(&self) -> VariableType {
        self.variable_type
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn set_lower_bound(&mut self, lower_bound: f64) {
        self.lower_bound = lower_bound;
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    pub fn set_upper_bound(&mut self, upper_bound: f64) {
        self.upper_bound = upper_bound;
    }

    pub fn has_initial_value(&self) -> bool {
        self.initial_value.is_some()
    }

    /// Start value the native adapters hand to their backend as a warm start
    pub fn initial_value(&self) -> Result<f64> {
        self.initial_value
            .ok_or_else(|| ModelError::state(format!("Variable '{}' has no initial value set", self.name)))
    }

    pub fn set_initial_value(&mut self, initial_value: f64) {
        self.initial_value = Some(initial_value);
    }

    pub fn clear_initial_value(&mut self) {
        self.initial_value = None;
    }

    pub fn is_integer(&self) -> bool {
        self.variable_type.is_integer()
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.variable_type == other.variable_type
            && self.lower_bound.to_bits() == other.lower_bound.to_bits()
            && self.upper_bound.to_bits() == other.upper_bound.to_bits()
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.variable_type.hash(state);
        self.lower_bound.to_bits().hash(state);
        self.upper_bound.to_bits().hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.variable_type.cmp(&other.variable_type))
            .then_with(|| self.lower_bound.total_cmp(&other.lower_bound))
            .then_with(|| self.upper_bound.total_cmp(&other.upper_bound))
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Description of a variable to add to a program
#[derive(Debug, Clone)]
pub struct VariableSpec {
    pub name: Option<String>,
    pub variable_type: VariableType,
    pub bounds: Option<(f64, f64)>,
    pub initial_value: Option<f64>,
}

impl VariableSpec {
    /// Unnamed variable; the program assigns `x<N>`
    pub fn new(variable_type: VariableType) -> Self {
        Self {
            name: None,
            variable_type,
            bounds: None,
            initial_value: None,
        }
    }

    pub fn named(name: impl Into<String>, variable_type: VariableType) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(variable_type)
        }
    }

    pub fn continuous(name: impl Into<String>) -> Self {
        Self::named(name, VariableType::Continuous)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::named(name, VariableType::Integer)
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self::named(name, VariableType::Binary)
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.bounds = Some((lower, upper));
        self
    }

    pub fn with_initial_value(mut self, value: f64) -> Self {
        self.initial_value = Some(value);
        self
    }
}

impl Default for VariableSpec {
    fn default() -> Self {
        Self::new(VariableType::Continuous)
    }
}

/// Named linear objective with an optimization sense
#[derive(Debug, Clone)]
pub struct Objective {
    program: ProgramId,
    index: usize,
    name: String,
    sense: ObjectiveSense,
    expression: LinearExpression,
}

impl Objective {
    pub(crate) fn new(program: ProgramId, index: usize, name: String, sense: ObjectiveSense) -> Self {
        Self {
            program,
            index,
            name,
            sense,
            expression: LinearExpression::new(program),
        }
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Position of the objective in its program
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn set_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
    }

    pub fn expression(&self) -> &LinearExpression {
        &self.expression
    }

    pub fn expression_mut(&mut self) -> &mut LinearExpression {
        &mut self.expression
    }
}

impl PartialEq for Objective {
    fn eq(&self, other: &Self) -> bool {
        self.sense == other.sense && self.name == other.name && self.expression == other.expression
    }
}

impl Eq for Objective {}

impl Hash for Objective {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sense.hash(state);
        self.expression.hash(state);
        self.name.hash(state);
    }
}

impl PartialOrd for Objective {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Objective {
    fn cmp(&self, other: &Self) -> Ordering {
        self.expression
            .cmp(&other.expression)
            .then_with(|| self.sense.cmp(&other.sense))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Linear constraint `lhs <operator> rhs`
#[derive(Debug, Clone)]
pub struct Constraint {
    program: ProgramId,
    index: usize,
    name: String,
    operator: Operator,
    lhs: LinearExpression,
    rhs: LinearExpression,
}

impl Constraint {
    pub(crate) fn new(program: ProgramId, index: usize, name: String, operator: Operator) -> Self {
        Self {
            program,
            index,
            name,
            operator,
            lhs: LinearExpression::new(program),
            rhs: LinearExpression::new(program),
        }
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn set_operator(&mut self, operator: Operator) {
        self.operator = operator;
    }

    pub fn lhs(&self) -> &LinearExpression {
        &self.lhs
    }

    pub fn lhs_mut(&mut self) -> &mut LinearExpression {
        &mut self.lhs
    }

    pub fn rhs(&self) -> &LinearExpression {
        &self.rhs
    }

    pub fn rhs_mut(&mut self) -> &mut LinearExpression {
        &mut self.rhs
    }

    /// Folds both sides into `terms <operator> bound`, where `terms` is
    /// `lhs - rhs` without constants and `bound` is `rhs.constant - lhs.constant`
    pub fn normalized(&self) -> (LinearExpression, f64) {
        let mut terms = LinearExpression::new(self.program);
        for term in self.lhs.linear_terms() {
            terms.accumulate(term.variable, term.coefficient);
        }
        for term in self.rhs.linear_terms() {
            terms.accumulate(term.variable, -term.coefficient);
        }
        (terms, self.rhs.constant() - self.lhs.constant())
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.operator == other.operator
            && self.name == other.name
            && self.lhs == other.lhs
            && self.rhs == other.rhs
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.operator.hash(state);
        self.name.hash(state);
        self.lhs.hash(state);
        self.rhs.hash(state);
    }
}

impl PartialOrd for Constraint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Constraint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.operator
            .cmp(&other.operator)
            .then_with(|| self.lhs.cmp(&other.lhs))
            .then_with(|| self.rhs.cmp(&other.rhs))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl Constraint {
    /// Renders `name: lhs <op> rhs` with the variable names of `program`
    pub fn display<'a>(&'a self, program: &'a Program) -> ConstraintDisplay<'a> {
        ConstraintDisplay {
            constraint: self,
            program,
        }
    }
}

pub struct ConstraintDisplay<'a> {
    constraint: &'a Constraint,
    program: &'a Program,
}

impl fmt::Display for ConstraintDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} {}",
            self.constraint.name,
            self.constraint.lhs.display(self.program),
            self.constraint.operator,
            self.constraint.rhs.display(self.program)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str, variable_type: VariableType) -> Variable {
        Variable::new(VariableId::new(ProgramId(0), 0), name.to_string(), variable_type)
    }

    #[test]
    fn test_variable_default_bounds() {
        let binary = variable("b", VariableType::Binary);
        assert_eq!(binary.lower_bound(), 0.0);
        assert_eq!(binary.upper_bound(), 1.0);

        let continuous = variable("c", VariableType::Continuous);
        assert_eq!(continuous.lower_bound(), f64::NEG_INFINITY);
        assert_eq!(continuous.upper_bound(), f64::INFINITY);
    }

    #[test]
    fn test_variable_initial_value() {
        let mut var = variable("x", VariableType::Integer);
        assert!(!var.has_initial_value());
        assert!(matches!(
            var.initial_value(),
            Err(ModelError::IllegalState { .. })
        ));

        var.set_initial_value(3.0);
        assert!(var.has_initial_value());
        assert_eq!(var.initial_value().unwrap(), 3.0);

        var.clear_initial_value();
        assert!(!var.has_initial_value());
    }

    #[test]
    fn test_variable_ordering() {
        let a = variable("a", VariableType::Integer);
        let b = variable("b", VariableType::Continuous);
        assert!(a < b);

        let a_cont = variable("a", VariableType::Continuous);
        assert!(a_cont < a);

        let mut a_low = variable("a", VariableType::Integer);
        a_low.set_lower_bound(-5.0);
        assert!(a_low < a);
        assert_ne!(a_low, a);

        let mut a_high = variable("a", VariableType::Integer);
        a_high.set_lower_bound(f64::NEG_INFINITY);
        a_high.set_upper_bound(10.0);
        assert!(a_high < a);

        assert_eq!(a, variable("a", VariableType::Integer));
        assert_eq!(a.cmp(&variable("a", VariableType::Integer)), Ordering::Equal);
    }

    #[test]
    fn test_variable_equality_ignores_initial_value() {
        let mut a = variable("a", VariableType::Integer);
        let b = variable("a", VariableType::Integer);
        a.set_initial_value(1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_spec_builders() {
        let spec = VariableSpec::binary("item").with_initial_value(1.0);
        assert_eq!(spec.name.as_deref(), Some("item"));
        assert_eq!(spec.variable_type, VariableType::Binary);
        assert_eq!(spec.bounds, None);
        assert_eq!(spec.initial_value, Some(1.0));

        let spec = VariableSpec::new(VariableType::Integer).with_bounds(0.0, 5.0);
        assert!(spec.name.is_none());
        assert_eq!(spec.bounds, Some((0.0, 5.0)));
    }

    #[test]
    fn test_constraint_defaults_and_ordering() {
        let program = ProgramId(0);
        let eq = Constraint::new(program, 0, "c".to_string(), Operator::default());
        let le = Constraint::new(program, 1, "a".to_string(), Operator::LessEquals);
        assert_eq!(eq.operator(), Operator::Equals);
        assert!(eq < le);

        let mut with_rhs = Constraint::new(program, 2, "a".to_string(), Operator::Equals);
        with_rhs.rhs_mut().add_constant(5.0);
        assert!(eq < with_rhs);

        let same_name_b = Constraint::new(program, 3, "b".to_string(), Operator::Equals);
        assert!(same_name_b < eq);
    }

    #[test]
    fn test_constraint_normalized() {
        let program = ProgramId(0);
        let x = VariableId::new(program, 0);
        let y = VariableId::new(program, 1);
        let mut constraint = Constraint::new(program, 0, "c".to_string(), Operator::LessEquals);
        constraint
            .lhs_mut()
            .add_term(2.0, x)
            .unwrap()
            .add_term(1.0, y)
            .unwrap()
            .add_constant(3.0);
        constraint.rhs_mut().add_term(1.0, y).unwrap().add_constant(10.0);

        let (terms, bound) = constraint.normalized();
        assert_eq!(terms.coefficient(x), 2.0);
        assert_eq!(terms.coefficient(y), 0.0);
        assert_eq!(bound, 7.0);
    }

    #[test]
    fn test_objective_ordering() {
        let program = ProgramId(0);
        let x = VariableId::new(program, 0);
        let empty = Objective::new(program, 0, "z".to_string(), ObjectiveSense::Maximize);
        let mut one_term = Objective::new(program, 1, "a".to_string(), ObjectiveSense::Minimize);
        one_term.expression_mut().add_term(1.0, x).unwrap();
        assert!(empty < one_term);

        let min = Objective::new(program, 2, "z".to_string(), ObjectiveSense::Minimize);
        assert!(min < empty);

        let a = Objective::new(program, 3, "a".to_string(), ObjectiveSense::Maximize);
        assert!(a < empty);
    }
}
