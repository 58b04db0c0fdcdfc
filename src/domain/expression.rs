use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::error::{ModelError, Result};
use super::models::{ProgramId, VariableId};
use super::program::Program;

/// One `coefficient * variable` entry of a linear expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTerm {
    pub variable: VariableId,
    pub coefficient: f64,
}

/// Sparse linear expression `Σ coefficient_i * x_i + constant`
///
/// Only variables issued by the same program as the owning objective or
/// constraint may appear in it. A zero coefficient is never inserted, but a
/// term whose coefficient later sums to zero is kept.
#[derive(Debug, Clone)]
pub struct LinearExpression {
    program: ProgramId,
    terms: BTreeMap<VariableId, f64>,
    constant: f64,
}

impl LinearExpression {
    pub(crate) fn new(program: ProgramId) -> Self {
        Self {
            program,
            terms: BTreeMap::new(),
            constant: 0.0,
        }
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Adds `coefficient * variable`, summing into an existing term
    pub fn add_term(&mut self, coefficient: f64, variable: VariableId) -> Result<&mut Self> {
        if coefficient == 0.0 {
            return Ok(self);
        }

        if variable.program() != self.program {
            return Err(ModelError::InvalidArgument(format!(
                "Adding variable #{} from program {} to an expression of program {} is not supported",
                variable.index(),
                variable.program(),
                self.program
            )));
        }

        self.accumulate(variable, coefficient);
        Ok(self)
    }

    pub fn add_constant(&mut self, constant: f64) -> &mut Self {
        if constant != 0.0 {
            self.constant += constant;
        }
        self
    }

    /// Merges all terms and the constant of `other` into this expression
    pub fn add_terms(&mut self, other: &LinearExpression) -> Result<&mut Self> {
        for (&variable, &coefficient) in &other.terms {
            self.add_term(coefficient, variable)?;
        }
        self.add_constant(other.constant);
        Ok(self)
    }

    pub fn remove_linear_term(&mut self, variable: VariableId) -> &mut Self {
        self.terms.remove(&variable);
        self
    }

    pub fn remove_constant(&mut self) -> &mut Self {
        self.constant = 0.0;
        self
    }

    pub fn add_quadratic_term(
        &mut self,
        _coefficient: f64,
        _first: VariableId,
        _second: VariableId,
    ) -> Result<&mut Self> {
        Err(quadratic_unsupported())
    }

    pub fn quadratic_coefficient(&self, _first: VariableId, _second: VariableId) -> Result<f64> {
        Err(quadratic_unsupported())
    }

    pub fn remove_quadratic_term(
        &mut self,
        _first: VariableId,
        _second: VariableId,
    ) -> Result<&mut Self> {
        Err(quadratic_unsupported())
    }

    pub fn coefficient(&self, variable: VariableId) -> f64 {
        self.terms.get(&variable).copied().unwrap_or(0.0)
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Terms in variable insertion order
    pub fn linear_terms(&self) -> impl Iterator<Item = LinearTerm> + '_ {
        self.terms.iter().map(|(&variable, &coefficient)| LinearTerm {
            variable,
            coefficient,
        })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.constant == 0.0
    }

    /// Number of linear terms, plus one for a nonzero constant
    pub fn term_count(&self) -> usize {
        self.terms.len() + usize::from(self.constant != 0.0)
    }

    /// Evaluates the expression with `value_of` supplying variable values
    pub fn evaluate(&self, mut value_of: impl FnMut(VariableId) -> f64) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, (&variable, &coefficient)| {
                acc + coefficient * value_of(variable)
            })
    }

    /// Renders the expression with the variable names of `program`
    pub fn display<'a>(&'a self, program: &'a Program) -> ExpressionDisplay<'a> {
        ExpressionDisplay {
            expression: self,
            program,
        }
    }

    pub(crate) fn accumulate(&mut self, variable: VariableId, coefficient: f64) {
        match self.terms.get_mut(&variable) {
            Some(existing) => *existing += coefficient,
            None if coefficient != 0.0 => {
                self.terms.insert(variable, coefficient);
            }
            None => {}
        }
    }
}

fn quadratic_unsupported() -> ModelError {
    ModelError::Unsupported("Quadratic terms are not supported by linear expressions".to_string())
}

impl PartialEq for LinearExpression {
    fn eq(&self, other: &Self) -> bool {
        self.constant.to_bits() == other.constant.to_bits()
            && self.terms.len() == other.terms.len()
            && self
                .terms
                .iter()
                .zip(&other.terms)
                .all(|((v1, c1), (v2, c2))| v1 == v2 && c1.to_bits() == c2.to_bits())
    }
}

impl Eq for LinearExpression {}

impl Hash for LinearExpression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (variable, coefficient) in &self.terms {
            variable.hash(state);
            coefficient.to_bits().hash(state);
        }
        self.constant.to_bits().hash(state);
    }
}

impl PartialOrd for LinearExpression {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LinearExpression {
    /// Shorter expressions first, then by constant; expressions that tie on
    /// both compare their terms in variable order.
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }

        self.term_count()
            .cmp(&other.term_count())
            .then_with(|| self.constant.total_cmp(&other.constant))
            .then_with(|| {
                let mine = self.terms.iter();
                let theirs = other.terms.iter();
                mine.zip(theirs)
                    .map(|((v1, c1), (v2, c2))| v1.cmp(v2).then_with(|| c1.total_cmp(c2)))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or_else(|| self.terms.len().cmp(&other.terms.len()))
            })
    }
}

/// `Display` adapter produced by [`LinearExpression::display`]
pub struct ExpressionDisplay<'a> {
    expression: &'a LinearExpression,
    program: &'a Program,
}

impl fmt::Display for ExpressionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expression = self.expression;
        if expression.terms.is_empty() {
            return write!(f, "{}", expression.constant);
        }

        for (position, (&variable, &coefficient)) in expression.terms.iter().enumerate() {
            let negative = coefficient < 0.0;
            match (position, negative) {
                (0, false) => {}
                (0, true) => f.write_str("-")?,
                (_, false) => f.write_str(" + ")?,
                (_, true) => f.write_str(" - ")?,
            }

            let magnitude = coefficient.abs();
            if magnitude != 1.0 {
                write!(f, "{} ", magnitude)?;
            }

            match self.program.variable(variable) {
                Ok(var) => f.write_str(var.name())?,
                Err(_) => write!(f, "#{}", variable.index())?,
            }
        }

        if expression.constant < 0.0 {
            write!(f, " - {}", expression.constant.abs())?;
        } else if expression.constant > 0.0 {
            write!(f, " + {}", expression.constant)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::VariableSpec;
    use crate::domain::value_objects::ObjectiveSense;

    fn setup() -> (Program, VariableId, VariableId) {
        let mut program = Program::new("expr").unwrap();
        let x = program.add_variable(VariableSpec::continuous("x")).unwrap();
        let y = program.add_variable(VariableSpec::integer("y")).unwrap();
        (program, x, y)
    }

    fn empty(program: &Program) -> LinearExpression {
        LinearExpression::new(program.id())
    }

    #[test]
    fn test_add_term_sums_coefficients() {
        let (program, x, y) = setup();
        let mut expr = empty(&program);
        expr.add_term(1.5, x).unwrap().add_term(2.5, x).unwrap();
        expr.add_term(-3.0, y).unwrap();

        assert_eq!(expr.coefficient(x), 4.0);
        assert_eq!(expr.coefficient(y), -3.0);
        assert_eq!(expr.len(), 2);
    }

    #[test]
    fn test_zero_coefficient_is_noop() {
        let (program, x, _) = setup();
        let mut expr = empty(&program);
        expr.add_term(0.0, x).unwrap();

        assert_eq!(expr.coefficient(x), 0.0);
        assert_eq!(expr.len(), 0);
        assert_eq!(expr.linear_terms().count(), 0);
    }

    #[test]
    fn test_cancelled_term_stays_stored() {
        let (program, x, _) = setup();
        let mut expr = empty(&program);
        expr.add_term(2.0, x).unwrap().add_term(-2.0, x).unwrap();

        assert_eq!(expr.coefficient(x), 0.0);
        assert_eq!(expr.len(), 1);
        assert_eq!(expr.term_count(), 1);
    }

    #[test]
    fn test_constants() {
        let (program, _, _) = setup();
        let mut expr = empty(&program);
        expr.add_constant(0.0);
        assert_eq!(expr.term_count(), 0);

        expr.add_constant(2.0).add_constant(3.0);
        assert_eq!(expr.constant(), 5.0);
        assert_eq!(expr.term_count(), 1);

        expr.remove_constant();
        assert_eq!(expr.constant(), 0.0);
    }

    #[test]
    fn test_add_terms_merges_expression() {
        let (program, x, y) = setup();
        let mut first = empty(&program);
        first.add_term(1.0, x).unwrap().add_constant(1.0);

        let mut second = empty(&program);
        second.add_term(2.0, x).unwrap().add_term(4.0, y).unwrap().add_constant(-3.0);

        first.add_terms(&second).unwrap();
        assert_eq!(first.coefficient(x), 3.0);
        assert_eq!(first.coefficient(y), 4.0);
        assert_eq!(first.constant(), -2.0);
    }

    #[test]
    fn test_remove_linear_term() {
        let (program, x, y) = setup();
        let mut expr = empty(&program);
        expr.add_term(1.0, x).unwrap();
        expr.remove_linear_term(y);
        assert_eq!(expr.len(), 1);
        expr.remove_linear_term(x);
        assert_eq!(expr.len(), 0);
        assert_eq!(expr.coefficient(x), 0.0);
    }

    #[test]
    fn test_foreign_variable_rejected() {
        let (program, _, _) = setup();
        let mut other = Program::new("other").unwrap();
        let foreign = other.add_variable(VariableSpec::continuous("z")).unwrap();

        let mut expr = empty(&program);
        let err = expr.add_term(1.0, foreign).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArgument(_)));

        // zero coefficients short-circuit before validation
        assert!(expr.add_term(0.0, foreign).is_ok());
    }

    #[test]
    fn test_quadratic_operations_unsupported() {
        let (program, x, y) = setup();
        let mut expr = empty(&program);
        assert!(matches!(
            expr.add_quadratic_term(1.0, x, y),
            Err(ModelError::Unsupported(_))
        ));
        assert!(matches!(
            expr.quadratic_coefficient(x, y),
            Err(ModelError::Unsupported(_))
        ));
        assert!(matches!(
            expr.remove_quadratic_term(x, y),
            Err(ModelError::Unsupported(_))
        ));
    }

    #[test]
    fn test_ordering_by_term_count_then_constant() {
        let (program, x, y) = setup();
        let mut one = empty(&program);
        one.add_term(100.0, x).unwrap();

        let mut two = empty(&program);
        two.add_term(1.0, x).unwrap().add_term(1.0, y).unwrap();

        assert!(one < two);
        assert!(empty(&program) < one);

        let mut low = empty(&program);
        low.add_term(1.0, y).unwrap().add_constant(-1.0);
        let mut high = empty(&program);
        high.add_term(1.0, x).unwrap().add_constant(1.0);
        assert_eq!(low.term_count(), high.term_count());
        assert!(low < high);
    }

    #[test]
    fn test_equal_expressions_compare_equal() {
        let (program, x, y) = setup();
        let mut first = empty(&program);
        first.add_term(1.0, y).unwrap().add_term(2.0, x).unwrap();
        let mut second = empty(&program);
        second.add_term(2.0, x).unwrap().add_term(1.0, y).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.cmp(&second), Ordering::Equal);
    }

    #[test]
    fn test_ties_fall_back_to_terms() {
        let (program, x, y) = setup();
        let mut on_x = empty(&program);
        on_x.add_term(1.0, x).unwrap();
        let mut on_y = empty(&program);
        on_y.add_term(1.0, y).unwrap();

        assert_ne!(on_x, on_y);
        assert_eq!(on_x.cmp(&on_y), Ordering::Less);
        assert_eq!(on_y.cmp(&on_x), Ordering::Greater);
    }

    #[test]
    fn test_evaluate() {
        let (program, x, y) = setup();
        let mut expr = empty(&program);
        expr.add_term(2.0, x).unwrap().add_term(3.0, y).unwrap().add_constant(1.0);
        let value = expr.evaluate(|var| if var == x { 10.0 } else { 1.0 });
        assert_eq!(value, 24.0);
    }

    #[test]
    fn test_display() {
        let (mut program, x, y) = setup();
        let objective = program.add_objective("cost", ObjectiveSense::Minimize).unwrap();
        objective
            .expression_mut()
            .add_term(2.0, x)
            .unwrap()
            .add_term(-1.0, y)
            .unwrap()
            .add_constant(-3.5);
        let expr = program.objective(0).unwrap().expression();
        assert_eq!(expr.display(&program).to_string(), "2 x - y - 3.5");

        let mut negative_first = empty(&program);
        negative_first.add_term(-1.0, x).unwrap().add_constant(4.0);
        assert_eq!(negative_first.display(&program).to_string(), "-x + 4");

        let mut constant_only = empty(&program);
        constant_only.add_constant(7.0);
        assert_eq!(constant_only.display(&program).to_string(), "7");
    }
}
