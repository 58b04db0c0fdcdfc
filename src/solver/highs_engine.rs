// HiGHS Engine Adapter
// Translates a Program into a HiGHS RowProblem and answers engine queries
// from the solved model

use crate::domain::{
    engine::{EngineError, EngineErrorKind, EngineResult, SolvingEngine},
    error::{ModelError, Result},
    models::VariableId,
    parameters::SolverParameters,
    program::Program,
    value_objects::{EngineStatus, ObjectiveSense, Operator, ValueSource},
};
use crate::solver::run::{check_supported, column, start_values, SolvedRun};
use highs::{Col, HighsModelStatus, RowProblem, Sense};
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Default)]
pub struct HighsEngine {
    run: Option<SolvedRun>,
}

impl HighsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn run(&self) -> EngineResult<&SolvedRun> {
        self.run.as_ref().ok_or_else(|| {
            EngineError::new(
                EngineErrorKind::DataNotAvailable,
                "HiGHS has not optimized a program yet",
            )
        })
    }
}

impl SolvingEngine for HighsEngine {
    fn name(&self) -> &str {
        "HiGHS"
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
        let mut pb = RowProblem::default();
        let mut cols: Vec<Col> = Vec::with_capacity(program.variables_count());

        // Columns carry the combined objective
        for variable in program.variables() {
            let coefficient = program
                .combined_objective_coefficient(variable.id())
                .map_err(|err| EngineError::new(EngineErrorKind::InvalidArgument, err.to_string()))?;
            let bounds = variable.lower_bound()..=variable.upper_bound();

            let col = if variable.is_integer() {
                pb.add_integer_column(coefficient, bounds)
            } else {
                pb.add_column(coefficient, bounds)
            };
            cols.push(col);
        }

        for constraint in program.constraints() {
            let (terms, bound) = constraint.normalized();
            let row = terms
                .linear_terms()
                .map(|term| {
                    column(program, &cols, term.variable).map(|col| (col, term.coefficient))
                })
                .collect::<EngineResult<Vec<(Col, f64)>>>()?;

            match constraint.operator() {
                Operator::LessEquals => {
                    pb.add_row(..=bound, &row);
                }
                Operator::GreaterEquals => {
                    pb.add_row(bound.., &row);
                }
                Operator::Equals => {
                    pb.add_row(bound..=bound, &row);
                }
            }
        }

        let sense = match program
            .determine_program_objective_sense()
            .map_err(|err| EngineError::new(EngineErrorKind::InvalidArgument, err.to_string()))?
        {
            ObjectiveSense::Maximize => Sense::Maximise,
            ObjectiveSense::Minimize => Sense::Minimise,
        };

        let mut model = pb.optimise(sense);
        apply_parameters(&mut model, parameters);

        if let Some(starts) = start_values(program) {
            model
                .try_set_solution(Some(&starts), None, None, None)
                .map_err(|status| {
                    EngineError::new(
                        EngineErrorKind::Internal,
                        format!(
                            "HiGHS rejected the start values of '{}': {:?}",
                            program.name(),
                            status
                        ),
                    )
                })?;
        }

        let solved = model.try_solve().map_err(|status| {
            EngineError::new(
                EngineErrorKind::Internal,
                format!("HiGHS failed to solve '{}': {:?}", program.name(), status),
            )
        })?;

        let status = map_status(solved.status());
        let values = solved.get_solution().columns().to_vec();
        let runtime = start_time.elapsed().as_secs_f64();

        debug!(
            program = program.name(),
            native_status = ?solved.status(),
            %status,
            runtime,
            "HiGHS run finished"
        );

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

fn apply_parameters(model: &mut highs::Model, parameters: &SolverParameters) {
    model.set_option("output_flag", parameters.verbose);

    if let Some(seconds) = parameters.time_limit {
        model.set_option("time_limit", seconds);
    }
    if let Some(gap) = parameters.gap_tolerance {
        model.set_option("mip_rel_gap", gap);
    }
    if let Some(limit) = parameters.iteration_limit {
        model.set_option("simplex_iteration_limit", saturate(limit));
    }
    if let Some(limit) = parameters.node_limit {
        model.set_option("mip_max_nodes", saturate(limit));
    }
    if let Some(limit) = parameters.solution_limit {
        model.set_option("mip_max_improving_sols", saturate(limit));
    }
    if let Some(cutoff) = parameters.objective_cutoff {
        model.set_option("objective_bound", cutoff);
    }
    if let Some(threads) = parameters.threads {
        model.set_option("threads", saturate(u64::from(threads)));
    }
}

fn saturate(value: u64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn map_status(status: HighsModelStatus) -> EngineStatus {
    match status {
        HighsModelStatus::NotSet => EngineStatus::Loaded,
        HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => EngineStatus::Optimal,
        HighsModelStatus::Infeasible => EngineStatus::Infeasible,
        HighsModelStatus::UnboundedOrInfeasible => EngineStatus::InfeasibleOrUnbounded,
        HighsModelStatus::Unbounded => EngineStatus::Unbounded,
        HighsModelStatus::ObjectiveBound | HighsModelStatus::ObjectiveTarget => {
            EngineStatus::Cutoff
        }
        HighsModelStatus::ReachedTimeLimit => EngineStatus::TimeLimit,
        HighsModelStatus::ReachedIterationLimit => EngineStatus::IterationLimit,
        other => EngineStatus::Other(other as i32),
    }
}
