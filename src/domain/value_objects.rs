// Domain value objects representing core modeling concepts

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type of decision variable in the optimization problem
///
/// The declaration order is the ordering used when variables are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VariableType {
    /// Continuous real number between its bounds (x ∈ ℝ)
    Continuous,
    /// Binary variable (x ∈ {0, 1})
    Binary,
    /// Integer number between its bounds (x ∈ ℤ)
    Integer,
    /// Like `Continuous`, but 0 is always allowed even outside the bounds
    SemiContinuous,
    /// Like `Integer`, but 0 is always allowed even outside the bounds
    SemiInteger,
}

impl VariableType {
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            VariableType::Binary | VariableType::Integer | VariableType::SemiInteger
        )
    }

    /// Bounds a freshly created variable of this type starts with
    pub fn default_bounds(&self) -> (f64, f64) {
        match self {
            VariableType::Binary => (0.0, 1.0),
            _ => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableType::Continuous => write!(f, "Continuous"),
            VariableType::Binary => write!(f, "Binary"),
            VariableType::Integer => write!(f, "Integer"),
            VariableType::SemiContinuous => write!(f, "Semi-Continuous"),
            VariableType::SemiInteger => write!(f, "Semi-Integer"),
        }
    }
}

/// Relational operator of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Operator {
    /// Equal (=)
    #[default]
    Equals,
    /// Greater than or equal (≥)
    GreaterEquals,
    /// Less than or equal (≤)
    LessEquals,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::GreaterEquals => ">=",
            Operator::LessEquals => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ObjectiveSense {
    /// Minimize the objective function
    #[default]
    Minimize,
    /// Maximize the objective function
    Maximize,
}

impl fmt::Display for ObjectiveSense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveSense::Minimize => write!(f, "Minimize"),
            ObjectiveSense::Maximize => write!(f, "Maximize"),
        }
    }
}

/// Why a solver run stopped before proving optimality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TerminationReason {
    /// The run was not terminated early
    #[default]
    None,
    /// Reserved for engine adapters that report a stop they cannot classify.
    /// The status table itself never yields it: unrecognized statuses map to
    /// `None`.
    Unknown,
    /// The run was manually interrupted
    InterruptedByUser,
    /// Maximum number of iterations (e.g. simplex iterations) reached
    IterationLimitReached,
    /// Maximum number of branch-and-bound nodes explored
    NodeLimitReached,
    /// Execution time reached its maximum
    TimeLimitReached,
    /// Maximum number of feasible solutions found
    SolutionLimitReached,
    /// Unrecoverable numerical difficulties occurred
    NumericalInstable,
    /// Optimal objective is proven worse than the configured cutoff
    ObjectiveCutoffReached,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::None => write!(f, "None"),
            TerminationReason::Unknown => write!(f, "Unknown"),
            TerminationReason::InterruptedByUser => write!(f, "Interrupted By User"),
            TerminationReason::IterationLimitReached => write!(f, "Iteration Limit Reached"),
            TerminationReason::NodeLimitReached => write!(f, "Node Limit Reached"),
            TerminationReason::TimeLimitReached => write!(f, "Time Limit Reached"),
            TerminationReason::SolutionLimitReached => write!(f, "Solution Limit Reached"),
            TerminationReason::NumericalInstable => write!(f, "Numerical Instable"),
            TerminationReason::ObjectiveCutoffReached => write!(f, "Objective Cutoff Reached"),
        }
    }
}

/// Raw status reported by a solving engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineStatus {
    /// Model is loaded but no solve has run
    Loaded,
    /// A solve is still running
    InProgress,
    /// Proven optimal solution found
    Optimal,
    /// Feasible solution found, optimality not proven
    Suboptimal,
    /// No feasible solution exists
    Infeasible,
    /// Engine could not tell infeasible from unbounded
    InfeasibleOrUnbounded,
    /// Objective can be improved infinitely
    Unbounded,
    /// Optimal objective is worse than the cutoff
    Cutoff,
    /// Iteration limit reached
    IterationLimit,
    /// Node limit reached (MIP)
    NodeLimit,
    /// Time limit reached
    TimeLimit,
    /// Solution-count limit reached
    SolutionLimit,
    /// Solve interrupted by user
    Interrupted,
    /// Stopped on numerical difficulties
    Numeric,
    /// Any engine-specific code without a mapping
    Other(i32),
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineStatus::Loaded => write!(f, "Loaded"),
            EngineStatus::InProgress => write!(f, "In Progress"),
            EngineStatus::Optimal => write!(f, "Optimal"),
            EngineStatus::Suboptimal => write!(f, "Suboptimal"),
            EngineStatus::Infeasible => write!(f, "Infeasible"),
            EngineStatus::InfeasibleOrUnbounded => write!(f, "Infeasible Or Unbounded"),
            EngineStatus::Unbounded => write!(f, "Unbounded"),
            EngineStatus::Cutoff => write!(f, "Cutoff"),
            EngineStatus::IterationLimit => write!(f, "Iteration Limit Reached"),
            EngineStatus::NodeLimit => write!(f, "Node Limit Reached"),
            EngineStatus::TimeLimit => write!(f, "Time Limit Reached"),
            EngineStatus::SolutionLimit => write!(f, "Solution Limit Reached"),
            EngineStatus::Interrupted => write!(f, "Interrupted"),
            EngineStatus::Numeric => write!(f, "Numeric"),
            EngineStatus::Other(code) => write!(f, "Other ({})", code),
        }
    }
}

/// Which value accessor an engine reads a variable from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSource {
    /// The value of the primary (best) solution
    Primary,
    /// The value of the currently selected pool solution
    Pool,
}

/// Solver backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolverBackend {
    /// Automatically select the first available solver
    #[default]
    Auto,
    /// COIN-OR CBC solver
    CoinCbc,
    /// HiGHS solver
    Highs,
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Auto => write!(f, "Auto"),
            SolverBackend::CoinCbc => write!(f, "COIN-OR CBC"),
            SolverBackend::Highs => write!(f, "HiGHS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_defaults_to_unit_bounds() {
        assert_eq!(VariableType::Binary.default_bounds(), (0.0, 1.0));
        assert_eq!(
            VariableType::Integer.default_bounds(),
            (f64::NEG_INFINITY, f64::INFINITY)
        );
    }

    #[test]
    fn test_enum_ordering_follows_declaration() {
        assert!(VariableType::Continuous < VariableType::Binary);
        assert!(VariableType::Integer < VariableType::SemiInteger);
        assert!(Operator::Equals < Operator::GreaterEquals);
        assert!(Operator::GreaterEquals < Operator::LessEquals);
        assert!(ObjectiveSense::Minimize < ObjectiveSense::Maximize);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Operator::default(), Operator::Equals);
        assert_eq!(ObjectiveSense::default(), ObjectiveSense::Minimize);
        assert_eq!(TerminationReason::default(), TerminationReason::None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Operator::LessEquals.to_string(), "<=");
        assert_eq!(EngineStatus::Other(42).to_string(), "Other (42)");
        assert_eq!(TerminationReason::Unknown.to_string(), "Unknown");
        assert_eq!(
            TerminationReason::TimeLimitReached.to_string(),
            "Time Limit Reached"
        );
    }
}
