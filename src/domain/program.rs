use std::collections::HashMap;
use std::fmt;

use super::error::{ModelError, Result};
use super::models::{Constraint, Objective, ProgramId, Variable, VariableId, VariableSpec};
use super::value_objects::{ObjectiveSense, Operator};

/// Per-program counters for naming unnamed entities
#[derive(Debug, Clone, Default)]
struct NameCounters {
    variables: u64,
    objectives: u64,
    constraints: u64,
}

impl NameCounters {
    fn next(counter: &mut u64, prefix: &str) -> String {
        *counter += 1;
        format!("{}{}", prefix, counter)
    }
}

/// Complete optimization program: variables, objectives and constraints
///
/// Variables keep their insertion order and are unique by name. The first
/// objective's sense is the program sense that every other objective is
/// normalized against.
///
/// A program is not `Clone`: its id is what ties issued `VariableId`s to it,
/// and a copy sharing that id would accept the other copy's variables.
///
/// ```compile_fail
/// let program = lpmodel::Program::unnamed();
/// let _copy = program.clone();
/// ```
#[derive(Debug)]
pub struct Program {
    id: ProgramId,
    name: String,
    variables: Vec<Variable>,
    variable_names: HashMap<String, usize>,
    objectives: Vec<Objective>,
    constraints: Vec<Constraint>,
    counters: NameCounters,
}

impl Program {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = require_name(name.into(), "program")?;
        Ok(Self::with_id(ProgramId::next(), name))
    }

    /// Program named `program<N>` after its identity token
    pub fn unnamed() -> Self {
        let id = ProgramId::next();
        Self::with_id(id, format!("program{}", id))
    }

    fn with_id(id: ProgramId, name: String) -> Self {
        Self {
            id,
            name,
            variables: Vec::new(),
            variable_names: HashMap::new(),
            objectives: Vec::new(),
            constraints: Vec::new(),
            counters: NameCounters::default(),
        }
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.name = require_name(name.into(), "program")?;
        Ok(())
    }

    /// Adds a variable; a name that already exists is rejected, never overwritten
    pub fn add_variable(&mut self, spec: VariableSpec) -> Result<VariableId> {
        let name = match spec.name {
            Some(name) => require_name(name, "variable")?,
            None => NameCounters::next(&mut self.counters.variables, "x"),
        };

        if self.variable_names.contains_key(&name) {
            return Err(ModelError::DuplicateEntry(format!(
                "Variable '{}' already exists in program '{}'",
                name, self.name
            )));
        }

        let index = self.variables.len();
        let id = VariableId::new(self.id, index);
        let mut variable = Variable::new(id, name.clone(), spec.variable_type);
        if let Some((lower, upper)) = spec.bounds {
            variable.set_lower_bound(lower);
            variable.set_upper_bound(upper);
        }
        if let Some(value) = spec.initial_value {
            variable.set_initial_value(value);
        }

        self.variables.push(variable);
        self.variable_names.insert(name, index);
        Ok(id)
    }

    pub fn add_objective(
        &mut self,
        name: impl Into<String>,
        sense: ObjectiveSense,
    ) -> Result<&mut Objective> {
        let name = require_name(name.into(), "objective")?;
        Ok(self.push_objective(name, sense))
    }

    /// Adds an objective named `obj<N>`
    pub fn add_unnamed_objective(&mut self, sense: ObjectiveSense) -> &mut Objective {
        let name = NameCounters::next(&mut self.counters.objectives, "obj");
        self.push_objective(name, sense)
    }

    fn push_objective(&mut self, name: String, sense: ObjectiveSense) -> &mut Objective {
        let index = self.objectives.len();
        self.objectives.push(Objective::new(self.id, index, name, sense));
        &mut self.objectives[index]
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        operator: Operator,
    ) -> Result<&mut Constraint> {
        let name = require_name(name.into(), "constraint")?;
        Ok(self.push_constraint(name, operator))
    }

    /// Adds a constraint named `constr<N>`
    pub fn add_unnamed_constraint(&mut self, operator: Operator) -> &mut Constraint {
        let name = NameCounters::next(&mut self.counters.constraints, "constr");
        self.push_constraint(name, operator)
    }

    fn push_constraint(&mut self, name: String, operator: Operator) -> &mut Constraint {
        let index = self.constraints.len();
        self.constraints
            .push(Constraint::new(self.id, index, name, operator));
        &mut self.constraints[index]
    }

    pub fn variable(&self, id: VariableId) -> Result<&Variable> {
        self.check_owned(id)?;
        Ok(&self.variables[id.index()])
    }

    pub fn variable_mut(&mut self, id: VariableId) -> Result<&mut Variable> {
        self.check_owned(id)?;
        Ok(&mut self.variables[id.index()])
    }

    pub fn variable_by_name(&self, name: &str) -> Option<&Variable> {
        self.variable_names
            .get(name)
            .map(|&index| &self.variables[index])
    }

    /// Variables in insertion order
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn objective(&self, index: usize) -> Result<&Objective> {
        self.objectives
            .get(index)
            .ok_or_else(|| out_of_range("objective", index))
    }

    pub fn objective_mut(&mut self, index: usize) -> Result<&mut Objective> {
        self.objectives
            .get_mut(index)
            .ok_or_else(|| out_of_range("objective", index))
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn constraint(&self, index: usize) -> Result<&Constraint> {
        self.constraints
            .get(index)
            .ok_or_else(|| out_of_range("constraint", index))
    }

    pub fn constraint_mut(&mut self, index: usize) -> Result<&mut Constraint> {
        self.constraints
            .get_mut(index)
            .ok_or_else(|| out_of_range("constraint", index))
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn variables_count(&self) -> usize {
        self.variables.len()
    }

    pub fn objectives_count(&self) -> usize {
        self.objectives.len()
    }

    pub fn constraints_count(&self) -> usize {
        self.constraints.len()
    }

    /// Sense of the first objective, against which all others are normalized
    pub fn determine_program_objective_sense(&self) -> Result<ObjectiveSense> {
        self.objectives
            .first()
            .map(Objective::sense)
            .ok_or_else(|| ModelError::state("Program must contain at least one objective"))
    }

    /// Coefficient of `variable` in the single objective an engine optimizes:
    /// objectives with the opposite sense contribute negated.
    pub fn combined_objective_coefficient(&self, variable: VariableId) -> Result<f64> {
        let sense = self.determine_program_objective_sense()?;
        Ok(self
            .objectives
            .iter()
            .map(|objective| {
                let coefficient = objective.expression().coefficient(variable);
                if objective.sense() == sense {
                    coefficient
                } else {
                    -coefficient
                }
            })
            .sum())
    }

    /// Sum of the objective constants, normalized like the coefficients
    pub fn combined_objective_constant(&self) -> Result<f64> {
        let sense = self.determine_program_objective_sense()?;
        Ok(self
            .objectives
            .iter()
            .map(|objective| {
                let constant = objective.expression().constant();
                if objective.sense() == sense {
                    constant
                } else {
                    -constant
                }
            })
            .sum())
    }

    pub fn num_integer_variables(&self) -> usize {
        self.variables.iter().filter(|v| v.is_integer()).count()
    }

    pub fn is_mixed_integer(&self) -> bool {
        self.num_integer_variables() > 0
    }

    /// Checks that the program can be handed to an engine
    pub fn validate(&self) -> Result<()> {
        self.determine_program_objective_sense()?;

        let mut errors: Vec<String> = self
            .variables
            .iter()
            .filter(|var| var.lower_bound() > var.upper_bound())
            .map(|var| {
                format!(
                    "Variable '{}' has lower bound ({}) > upper bound ({})",
                    var.name(),
                    var.lower_bound(),
                    var.upper_bound()
                )
            })
            .collect();

        let expressions = self
            .objectives
            .iter()
            .map(|objective| (objective.name(), objective.expression()))
            .chain(self.constraints.iter().flat_map(|constraint| {
                [
                    (constraint.name(), constraint.lhs()),
                    (constraint.name(), constraint.rhs()),
                ]
            }));
        for (owner, expression) in expressions {
            if let Some(term) = expression
                .linear_terms()
                .find(|term| self.check_owned(term.variable).is_err())
            {
                errors.push(format!(
                    "'{}' references variable #{} of program {}, which is not in program '{}'",
                    owner,
                    term.variable.index(),
                    term.variable.program(),
                    self.name
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ModelError::InvalidArgument(errors.join("; ")))
        }
    }

    fn check_owned(&self, id: VariableId) -> Result<()> {
        if id.program() != self.id || id.index() >= self.variables.len() {
            return Err(ModelError::InvalidArgument(format!(
                "Variable #{} of program {} does not belong to program '{}'",
                id.index(),
                id.program(),
                self.name
            )));
        }
        Ok(())
    }
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.variables == other.variables
            && self.objectives == other.objectives
            && self.constraints == other.constraints
    }
}

impl Eq for Program {}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn require_name(name: String, what: &str) -> Result<String> {
    if name.is_empty() {
        return Err(ModelError::InvalidArgument(format!(
            "Name of a {} is mandatory and may not be empty",
            what
        )));
    }
    Ok(name)
}

fn out_of_range(what: &str, index: usize) -> ModelError {
    ModelError::InvalidArgument(format!("There is no {} with index {}", what, index))
}
