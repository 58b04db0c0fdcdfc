use crate::domain::{
    engine::{EngineError, EngineErrorKind, EngineResult, SolvingEngine},
    error::{ModelError, Result},
    models::VariableId,
    parameters::SolverParameters,
    program::Program,
    value_objects::{EngineStatus, ObjectiveSense, Operator, ValueSource},
};
use crate::solver::run::{check_supported, column, start_values, SolvedRun};
use good_lp::{
    solvers::coin_cbc, variable, variables, Expression, ResolutionError,
    Solution as GoodLpSolutionTrait, SolutionStatus, SolverModel, Variable as GoodLpVariable,
    WithInitialSolution,
};
use std::time::Instant;
use tracing::debug;

/// COIN-OR CBC through good_lp
#[derive(Debug, Default)]
pub struct CoinCbcEngine {
    run: Option<SolvedRun>,
}

impl CoinCbcEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn run(&self) -> EngineResult<&SolvedRun> {
        self.run.as_ref().ok_or_else(|| {
            EngineError::new(
                EngineErrorKind::DataNotAvailable,
                "CBC has not optimized a program yet",
            )
        })
    }
}

impl SolvingEngine for CoinCbcEngine {
    fn name(&self) -> &str {
        "COIN-OR CBC"
    }

    fn supports_mip(&self) -> bool {
        true
    }

    fn validate(&self, program: &Program) -> Result<()> {
        program.validate()?;
        check_supported(program).map_err(|err| ModelError::Unsupported(err.to_string()))
    }

    fn optimize(
        &mut self,
        program: &Program,
        parameters: &SolverParameters,
    ) -> EngineResult<EngineStatus> {
        self.run = None;
        check_supported(program)?;

        let start_time = Instant::now();
        let invalid =
            |err: ModelError| EngineError::new(EngineErrorKind::InvalidArgument, err.to_string());

        let mut vars = variables!();
        let mut lp_variables: Vec<GoodLpVariable> = Vec::with_capacity(program.variables_count());

        for var_def in program.variables() {
            let definition = variable()
                .min(var_def.lower_bound())
                .max(var_def.upper_bound());
            let var = if var_def.is_integer() {
                vars.add(definition.integer())
            } else {
                vars.add(definition)
            };
            lp_variables.push(var);
        }

        let mut obj_expr: Expression = program
            .combined_objective_constant()
            .map_err(invalid)?
            .into();
        for (var_def, &lp_var) in program.variables().iter().zip(&lp_variables) {
            let coeff = program
                .combined_objective_coefficient(var_def.id())
                .map_err(invalid)?;
            if coeff != 0.0 {
                obj_expr += coeff * lp_var;
            }
        }

        let mut lp_model = match program.determine_program_objective_sense().map_err(invalid)? {
            ObjectiveSense::Maximize => vars.maximise(obj_expr),
            ObjectiveSense::Minimize => vars.minimise(obj_expr),
        }
        .using(coin_cbc::coin_cbc);

        for constraint in program.constraints() {
            let (terms, bound) = constraint.normalized();
            let mut lhs: Expression = 0.into();
            for term in terms.linear_terms() {
                lhs += term.coefficient * column(program, &lp_variables, term.variable)?;
            }

            lp_model = match constraint.operator() {
                Operator::LessEquals => lp_model.with(lhs.leq(bound)),
                Operator::Equals => lp_model.with(lhs.eq(bound)),
                Operator::GreaterEquals => lp_model.with(lhs.geq(bound)),
            };
        }

        if let Some(starts) = start_values(program) {
            lp_model = lp_model.with_initial_solution(lp_variables.iter().copied().zip(starts));
        }
        apply_parameters(&mut lp_model, parameters);

        let (status, values) = match lp_model.solve() {
            Ok(sol) => {
                let status = match sol.status() {
                    SolutionStatus::Optimal => EngineStatus::Optimal,
                    SolutionStatus::TimeLimit => EngineStatus::TimeLimit,
                    _ => EngineStatus::Suboptimal,
                };
                let values = lp_variables.iter().map(|&var| sol.value(var)).collect();
                (status, values)
            }
            Err(ResolutionError::Infeasible) => (EngineStatus::Infeasible, Vec::new()),
            Err(ResolutionError::Unbounded) => (EngineStatus::Unbounded, Vec::new()),
            Err(e) => {
                return Err(EngineError::new(
                    EngineErrorKind::Internal,
                    format!("CBC failed to solve '{}': {}", program.name(), e),
                ))
            }
        };
        let runtime = start_time.elapsed().as_secs_f64();

        debug!(program = program.name(), %status, runtime, "CBC run finished");

        self.run = Some(SolvedRun::new(program, status, values, runtime)?);
        Ok(status)
    }

    fn status(&self) -> EngineResult<EngineStatus> {
        Ok(self
            .run
            .as_ref()
            .map_or(EngineStatus::Loaded, SolvedRun::status))
    }

    fn solution_count(&self) -> EngineResult<usize> {
        Ok(self.run()?.solution_count())
    }

    fn is_mip(&self) -> EngineResult<bool> {
        Ok(self.run()?.is_mip())
    }

    fn objective_bound(&self) -> EngineResult<f64> {
        Ok(self.run()?.objective_bound())
    }

    fn objective_value(&self) -> EngineResult<f64> {
        self.run()?.objective_value()
    }

    fn runtime_seconds(&self) -> EngineResult<f64> {
        Ok(self.run()?.runtime_seconds())
    }

    fn select_solution(&mut self, index: usize) -> EngineResult<()> {
        self.run()?.select_solution(index)
    }

    fn variable_value(&self, variable: VariableId, _source: ValueSource) -> EngineResult<f64> {
        self.run()?.variable_value(variable)
    }
}

// CBC command line parameter names
fn apply_parameters(model: &mut coin_cbc::CoinCbcProblem, parameters: &SolverParameters) {
    model.set_parameter("log", if parameters.verbose { "1" } else { "0" });

    if let Some(seconds) = parameters.time_limit {
        model.set_parameter("sec", &seconds.to_string());
    }
    if let Some(gap) = parameters.gap_tolerance {
        model.set_parameter("ratio", &gap.to_string());
    }
    if let Some(limit) = parameters.node_limit {
        model.set_parameter("maxN", &limit.to_string());
    }
    if let Some(limit) = parameters.solution_limit {
        model.set_parameter("maxSo", &limit.to_string());
    }
    if let Some(cutoff) = parameters.objective_cutoff {
        model.set_parameter("cutoff", &cutoff.to_string());
    }
    if let Some(threads) = parameters.threads {
        model.set_parameter("threads", &threads.to_string());
    }
}
