use super::{BackendError, Budget, Exhaustion, LpBackend, LpSolution};
use crate::LinearProgram;
use tracing::{Level, event};

/// An in-process dense primal simplex.
///
/// Every program the exchange produces has a non-negative right-hand side,
/// so the slack basis is a feasible start and no phase one is needed. Pivots
/// follow Bland's rule (lowest-index entering and leaving variables), which
/// cannot cycle and makes the result a pure function of the program.
#[derive(Debug, Clone)]
pub struct SimplexBackend {
    max_pivots: usize,
    tolerance: f64,
}

impl Default for SimplexBackend {
    fn default() -> Self {
        Self {
            max_pivots: 100_000,
            tolerance: 1e-9,
        }
    }
}

impl SimplexBackend {
    /// Create a backend with an explicit pivot limit and pivot tolerance
    pub fn new(max_pivots: usize, tolerance: f64) -> Self {
        Self {
            max_pivots,
            tolerance,
        }
    }
}

impl LpBackend for SimplexBackend {
    fn name(&self) -> &'static str {
        "simplex"
    }

    fn solve(&self, program: &LinearProgram, budget: &Budget) -> Result<LpSolution, BackendError> {
        let n = program.columns();
        let m = program.rows();

        if program
            .rhs
            .iter()
            .chain(program.upper.iter())
            .any(|b| !(*b >= 0.0 && b.is_finite()))
        {
            return Err(BackendError::Setup(
                "bounds must be finite and non-negative".to_owned(),
            ));
        }
        if n == 0 {
            return Ok(LpSolution {
                x: Vec::new(),
                objective: program.offset,
            });
        }

        // One row per constraint of A, then one per variable upper bound, each
        // with its own slack. The last column is the right-hand side.
        let rows = m + n;
        let width = n + rows + 1;
        let rhs = width - 1;

        let mut tableau = vec![0.0; rows * width];
        for j in 0..n {
            for (row, value) in program.column(j) {
                tableau[row * width + j] = value;
            }
            tableau[(m + j) * width + j] = 1.0;
        }
        for r in 0..rows {
            tableau[r * width + n + r] = 1.0;
            tableau[r * width + rhs] = if r < m {
                program.rhs[r]
            } else {
                program.upper[r - m]
            };
        }

        let mut cost = vec![0.0; width - 1];
        cost[..n].copy_from_slice(&program.objective);
        let mut basis = (n..n + rows).collect::<Vec<_>>();

        let mut pivots = 0;
        loop {
            if budget.expired() {
                return Err(BackendError::Limit(Exhaustion::TimeLimit));
            }

            let Some(entering) = cost.iter().position(|&c| c > self.tolerance) else {
                break;
            };

            let mut leaving: Option<(usize, f64)> = None;
            for r in 0..rows {
                let a = tableau[r * width + entering];
                if a <= self.tolerance {
                    continue;
                }
                let ratio = tableau[r * width + rhs] / a;
                leaving = match leaving {
                    Some((best, best_ratio))
                        if ratio > best_ratio + self.tolerance
                            || (ratio >= best_ratio - self.tolerance
                                && basis[best] < basis[r]) =>
                    {
                        Some((best, best_ratio))
                    }
                    _ => Some((r, ratio)),
                };
            }
            let Some((leaving, _)) = leaving else {
                return Err(BackendError::Unbounded);
            };

            pivot(&mut tableau, &mut cost, width, leaving, entering, self.tolerance);
            basis[leaving] = entering;

            pivots += 1;
            if pivots > self.max_pivots {
                return Err(BackendError::Limit(Exhaustion::IterationLimit));
            }
        }

        let mut x = vec![0.0; n];
        for (r, &variable) in basis.iter().enumerate() {
            if variable < n {
                x[variable] = tableau[r * width + rhs].clamp(0.0, program.upper[variable]);
            }
        }

        event!(Level::DEBUG, pivots, rows, columns = n, "simplex finished");

        Ok(LpSolution {
            objective: program.objective_value(&x),
            x,
        })
    }
}

fn pivot(
    tableau: &mut [f64],
    cost: &mut [f64],
    width: usize,
    leaving: usize,
    entering: usize,
    tolerance: f64,
) {
    let start = leaving * width;
    let scale = tableau[start + entering];
    for value in tableau[start..start + width].iter_mut() {
        *value /= scale;
    }
    let pivot_row = tableau[start..start + width].to_vec();

    for (r, row) in tableau.chunks_exact_mut(width).enumerate() {
        if r == leaving {
            continue;
        }
        let factor = row[entering];
        if factor == 0.0 {
            continue;
        }
        for (value, p) in row.iter_mut().zip(pivot_row.iter()) {
            *value -= factor * p;
        }
        row[entering] = 0.0;
        // Keep the basis primal feasible in the face of rounding
        let last = width - 1;
        if row[last] < 0.0 && row[last] > -tolerance {
            row[last] = 0.0;
        }
    }

    let factor = cost[entering];
    for (c, p) in cost.iter_mut().zip(pivot_row.iter()) {
        *c -= factor * p;
    }
    cost[entering] = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    // maximize 3x + 2y s.t. x + y <= 4, x + 3y <= 6, x <= 3, y <= 10
    fn program() -> LinearProgram {
        LinearProgram {
            objective: vec![3.0, 2.0],
            offset: 0.0,
            upper: vec![3.0, 10.0],
            rhs: vec![4.0, 6.0],
            colptr: vec![0, 2, 4],
            rowval: vec![0, 1, 0, 1],
            nzval: vec![1.0, 1.0, 1.0, 3.0],
        }
    }

    #[test]
    fn textbook() {
        let solution = SimplexBackend::default()
            .solve(&program(), &Budget::unlimited())
            .unwrap();
        assert!((solution.x[0] - 3.0).abs() < 1e-9);
        assert!((solution.x[1] - 1.0).abs() < 1e-9);
        assert!((solution.objective - 11.0).abs() < 1e-9);
    }

    #[test]
    fn pivot_limit() {
        let backend = SimplexBackend::new(0, 1e-9);
        let result = backend.solve(&program(), &Budget::unlimited());
        assert_eq!(
            result,
            Err(BackendError::Limit(Exhaustion::IterationLimit))
        );
    }

    #[test]
    fn rejects_negative_rhs() {
        let mut program = program();
        program.rhs[0] = -1.0;
        let backend = SimplexBackend::default();
        let result = backend.solve(&program, &Budget::unlimited());
        assert!(matches!(result, Err(BackendError::Setup(_))));
    }
}
