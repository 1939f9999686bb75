use super::{BackendError, Budget, Exhaustion, LpBackend, LpSolution};
use crate::LinearProgram;
use clarabel::{algebra::*, solver::*};
use tracing::{Level, event};

/// A backend that hands the relaxation to the Clarabel interior point solver.
pub struct ClarabelBackend(DefaultSettings<f64>);

impl Default for ClarabelBackend {
    fn default() -> Self {
        let mut settings = DefaultSettings::default();
        settings.verbose = false;
        Self(settings)
    }
}

impl ClarabelBackend {
    /// Create a backend with the provided settings
    pub fn new(settings: DefaultSettings<f64>) -> Self {
        Self(settings)
    }
}

impl std::fmt::Debug for ClarabelBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClarabelBackend")
            .field("max_iter", &self.0.max_iter)
            .field("time_limit", &self.0.time_limit)
            .finish()
    }
}

impl LpBackend for ClarabelBackend {
    fn name(&self) -> &'static str {
        "clarabel"
    }

    fn solve(&self, program: &LinearProgram, budget: &Budget) -> Result<LpSolution, BackendError> {
        let n = program.columns();
        let m = program.rows();

        if n == 0 {
            return Ok(LpSolution {
                x: Vec::new(),
                objective: program.offset,
            });
        }

        // Clarabel handles constraints via a cone specification, Ax + s = b with
        // s >= 0. We stack the rows of the program, then -x <= 0, then x <= u,
        // so every column gains two unit entries below the program's rows.
        let mut a_colptr = Vec::with_capacity(n + 1);
        let mut a_rowval = Vec::new();
        let mut a_nzval = Vec::new();
        for j in 0..n {
            a_colptr.push(a_nzval.len());
            for (row, value) in program.column(j) {
                a_rowval.push(row);
                a_nzval.push(value);
            }
            a_rowval.push(m + j);
            a_nzval.push(-1.0);
            a_rowval.push(m + n + j);
            a_nzval.push(1.0);
        }
        a_colptr.push(a_nzval.len());

        let a_matrix = CscMatrix {
            m: m + 2 * n,
            n,
            colptr: a_colptr,
            rowval: a_rowval,
            nzval: a_nzval,
        };

        let mut b = program.rhs.clone();
        b.extend(std::iter::repeat_n(0.0, n));
        b.extend(program.upper.iter().copied());

        let cones = [NonnegativeConeT(m + 2 * n)];

        // There is no quadratic term, and Clarabel minimizes
        let p_matrix = CscMatrix {
            m: n,
            n,
            colptr: vec![0; n + 1],
            rowval: Vec::new(),
            nzval: Vec::new(),
        };
        let q = program.objective.iter().map(|c| -c).collect::<Vec<_>>();

        let mut settings = self.0.clone();
        if let Some(remaining) = budget.remaining() {
            settings.time_limit = settings.time_limit.min(remaining.as_secs_f64());
        }

        let mut solver = DefaultSolver::new(&p_matrix, &q, &a_matrix, &b, &cones, settings)
            .map_err(|error| BackendError::Setup(error.to_string()))?;
        solver.solve();

        let status = solver.solution.status;
        event!(
            Level::DEBUG,
            iterations = solver.solution.iterations,
            ?status,
            "clarabel finished"
        );

        match status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => {
                let x = solver
                    .solution
                    .x
                    .iter()
                    .zip(program.upper.iter())
                    .map(|(x, u)| x.clamp(0.0, *u))
                    .collect::<Vec<_>>();
                Ok(LpSolution {
                    objective: program.objective_value(&x),
                    x,
                })
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                Err(BackendError::Infeasible)
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                Err(BackendError::Unbounded)
            }
            SolverStatus::MaxIterations => Err(BackendError::Limit(Exhaustion::IterationLimit)),
            SolverStatus::MaxTime => Err(BackendError::Limit(Exhaustion::TimeLimit)),
            other => Err(BackendError::Numerical(format!("{other:?}"))),
        }
    }
}
