use crate::ExchangeGraph;

/// The linear relaxation of an exchange graph.
///
/// The program reads: maximize `c·x + offset` subject to `A x ≤ b` and
/// `0 ≤ x ≤ u`, with one variable per arc (in arc id order). Every right-hand
/// side is non-negative, so the origin is always feasible. `A` is stored in
/// compressed sparse column form with row indices ascending within a column,
/// which is the layout both Clarabel and OSQP expect.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    /// Objective coefficients (the arc weights)
    pub objective: Vec<f64>,
    /// A constant added to the objective by fixed variables
    pub offset: f64,
    /// Variable upper bounds (the arc max flows)
    pub upper: Vec<f64>,
    /// The right-hand side of each row
    pub rhs: Vec<f64>,
    /// Column pointers into `rowval`/`nzval`, of length `columns() + 1`
    pub colptr: Vec<usize>,
    /// Row index of each nonzero
    pub rowval: Vec<usize>,
    /// Value of each nonzero
    pub nzval: Vec<f64>,
}

impl LinearProgram {
    /// Assemble the program for a graph.
    ///
    /// Each node contributes a capacity row, one row per member, and one row
    /// per constraint, in that order.
    pub fn from_graph(graph: &ExchangeGraph) -> Self {
        // The first row of each node's block
        let mut offsets = Vec::with_capacity(graph.nodes().len());
        let mut rhs = Vec::new();
        for node in graph.nodes() {
            offsets.push(rhs.len());
            rhs.push(node.capacity);
            rhs.extend(node.members.iter().map(|member| member.quantity));
            rhs.extend(node.constraints.iter().map(|constraint| constraint.limit()));
        }

        let mut colptr = Vec::with_capacity(graph.arcs().len() + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();
        let mut column = Vec::new();

        for arc in graph.arcs() {
            colptr.push(nzval.len());
            column.clear();

            for (id, member) in [(arc.request, arc.request_member), (arc.bid, arc.bid_member)] {
                let node = &graph.nodes()[id.0];
                let offset = offsets[id.0];
                column.push((offset, 1.0));
                column.push((offset + 1 + member, 1.0));
                for (k, constraint) in node.constraints.iter().enumerate() {
                    let coefficient = constraint.coefficient(member);
                    if coefficient > 0.0 {
                        column.push((offset + 1 + node.members.len() + k, coefficient));
                    }
                }
            }

            column.sort_by_key(|&(row, _)| row);
            for &(row, value) in column.iter() {
                rowval.push(row);
                nzval.push(value);
            }
        }
        colptr.push(nzval.len());

        Self {
            objective: graph.arcs().iter().map(|arc| arc.weight).collect(),
            offset: 0.0,
            upper: graph.arcs().iter().map(|arc| arc.max_flow).collect(),
            rhs,
            colptr,
            rowval,
            nzval,
        }
    }

    /// The number of variables
    pub fn columns(&self) -> usize {
        self.objective.len()
    }

    /// The number of rows of `A`
    pub fn rows(&self) -> usize {
        self.rhs.len()
    }

    /// The nonzeros of one column as (row, value) pairs
    pub fn column(&self, j: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.colptr[j]..self.colptr[j + 1];
        self.rowval[range.clone()]
            .iter()
            .copied()
            .zip(self.nzval[range].iter().copied())
    }

    /// The objective value of a point, including the offset
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.offset
            + self
                .objective
                .iter()
                .zip(x.iter())
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    /// Fix some variables to either bound, substituting them out.
    ///
    /// `fixed[j] = Some(false)` pins `x_j = 0` and `Some(true)` pins
    /// `x_j = u_j`; in both cases the variable's bound becomes zero in the
    /// returned program, and a pinned-high variable's contribution moves into
    /// the right-hand side and the offset. Returns `None` if the fixings make
    /// the program infeasible (some right-hand side drops below `-tolerance`).
    pub fn restrict(&self, fixed: &[Option<bool>], tolerance: f64) -> Option<Self> {
        let mut program = self.clone();
        for (j, fixing) in fixed.iter().enumerate() {
            match fixing {
                None => {}
                Some(false) => program.upper[j] = 0.0,
                Some(true) => {
                    let value = self.upper[j];
                    for (row, coefficient) in self.column(j) {
                        program.rhs[row] -= coefficient * value;
                    }
                    program.offset += self.objective[j] * value;
                    program.upper[j] = 0.0;
                }
            }
        }

        for rhs in program.rhs.iter_mut() {
            if *rhs < -tolerance {
                return None;
            }
            *rhs = rhs.max(0.0);
        }
        Some(program)
    }

    /// Whether a point satisfies every row and bound within `tolerance`
    pub fn is_feasible(&self, x: &[f64], tolerance: f64) -> bool {
        if x.len() != self.columns() {
            return false;
        }
        let mut lhs = vec![0.0; self.rows()];
        for (j, &value) in x.iter().enumerate() {
            if value < -tolerance || value > self.upper[j] + tolerance {
                return false;
            }
            for (row, coefficient) in self.column(j) {
                lhs[row] += coefficient * value;
            }
        }
        lhs.iter()
            .zip(self.rhs.iter())
            .all(|(lhs, rhs)| *lhs <= rhs + tolerance)
    }
}
