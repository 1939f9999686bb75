use super::{BackendError, Budget, Exhaustion, LpBackend, LpSolution};
use crate::LinearProgram;
use osqp::{CscMatrix, Problem, Settings, Status};
use tracing::{Level, event};

/// A backend that uses the OSQP (Operator Splitting Quadratic Program) solver.
///
/// OSQP uses the Alternating Direction Method of Multipliers (ADMM), which
/// scales well but converges to lower precision than the other backends;
/// solution polishing is enabled to compensate.
pub struct OsqpBackend(Settings);

impl Default for OsqpBackend {
    fn default() -> Self {
        Self(
            Settings::default()
                .verbose(false)
                .polishing(true)
                .eps_abs(1e-7)
                .eps_rel(1e-7)
                .max_iter(100_000),
        )
    }
}

impl OsqpBackend {
    /// Create a backend with the provided settings
    pub fn new(settings: Settings) -> Self {
        Self(settings)
    }
}

impl std::fmt::Debug for OsqpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsqpBackend").finish_non_exhaustive()
    }
}

impl LpBackend for OsqpBackend {
    fn name(&self) -> &'static str {
        "osqp"
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

        // OSQP handles constraints via a box specification, lb <= Ax <= ub.
        // The program's rows are bounded below by zero (they are sums of
        // non-negative terms), followed by an identity block for 0 <= x <= u.
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
            a_nzval.push(1.0);
        }
        a_colptr.push(a_nzval.len());

        let a_matrix = CscMatrix {
            nrows: m + n,
            ncols: n,
            indptr: a_colptr.into(),
            indices: a_rowval.into(),
            data: a_nzval.into(),
        };

        let lb = vec![0.0; m + n];
        let mut ub = program.rhs.clone();
        ub.extend(program.upper.iter().copied());

        // No quadratic term; OSQP minimizes
        let p_matrix = CscMatrix {
            nrows: n,
            ncols: n,
            indptr: vec![0; n + 1].into(),
            indices: Vec::new().into(),
            data: Vec::new().into(),
        };
        let q = program.objective.iter().map(|c| -c).collect::<Vec<_>>();

        let mut settings = self.0.clone();
        if let Some(remaining) = budget.remaining() {
            settings = settings.time_limit(Some(remaining));
        }

        let mut problem = Problem::new(&p_matrix, &q, &a_matrix, &lb, &ub, &settings)
            .map_err(|error| BackendError::Setup(error.to_string()))?;
        problem.warm_start_x(&vec![0.0; n]);

        let clamp = |x: &[f64]| {
            x.iter()
                .zip(program.upper.iter())
                .map(|(x, u)| x.clamp(0.0, *u))
                .collect::<Vec<_>>()
        };

        let status = problem.solve();
        let iterations = status.iter();
        let x = match status {
            Status::Solved(solution) | Status::SolvedInaccurate(solution) => {
                event!(Level::DEBUG, iterations, "osqp finished");
                clamp(solution.x())
            }
            Status::PrimalInfeasible(_) | Status::PrimalInfeasibleInaccurate(_) => {
                return Err(BackendError::Infeasible);
            }
            Status::DualInfeasible(_) | Status::DualInfeasibleInaccurate(_) => {
                return Err(BackendError::Unbounded);
            }
            Status::MaxIterationsReached(_) => {
                return Err(BackendError::Limit(Exhaustion::IterationLimit));
            }
            Status::TimeLimitReached(_) => {
                return Err(BackendError::Limit(Exhaustion::TimeLimit));
            }
            _ => {
                return Err(BackendError::Numerical("unexpected osqp status".to_owned()));
            }
        };

        Ok(LpSolution {
            objective: program.objective_value(&x),
            x,
        })
    }
}
