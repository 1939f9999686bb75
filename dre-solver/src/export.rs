use crate::{ExchangeGraph, LinearProgram};
use std::io::Write;

/// Export the optimization program of an exchange graph in `.mps` format.
///
/// Divisible arcs become continuous variables `x_{arc}` bounded by their max
/// flow. All-or-nothing arcs become binary variables `y_{arc}` whose
/// coefficients are scaled by the max flow, so `y = 1` means a full trade.
pub fn export_mps(graph: &ExchangeGraph, buffer: &mut impl Write) -> Result<(), std::io::Error> {
    // MPS is a somewhat archaic format, but is easy enough to generate.
    // https://www.ibm.com/docs/en/icos/22.1.2?topic=standard-records-in-mps-format
    // is a good reference.
    let program = LinearProgram::from_graph(graph);

    // Row names follow the layout of the program: per node, a capacity row,
    // one row per member, and one row per constraint.
    let mut rows = Vec::with_capacity(program.rows());
    for (n, node) in graph.nodes().iter().enumerate() {
        rows.push(format!("cap_{n}"));
        rows.extend((0..node.members.len()).map(|i| format!("m_{n}_{i}")));
        rows.extend((0..node.constraints.len()).map(|k| format!("c_{n}_{k}")));
    }

    writeln!(buffer, "NAME dre_exchange")?;
    writeln!(buffer, "ROWS")?;

    // Our objective is the preference-weighted flow ("flow")
    writeln!(buffer, " N    flow")?;
    for row in rows.iter() {
        writeln!(buffer, " L    {row}")?;
    }

    writeln!(buffer, "COLUMNS")?;
    let mut integral = false;
    for (j, arc) in graph.arcs().iter().enumerate() {
        if arc.exclusive != integral {
            let marker = if arc.exclusive { "INTORG" } else { "INTEND" };
            writeln!(buffer, "    MARKER    'MARKER'    '{marker}'")?;
            integral = arc.exclusive;
        }

        let (name, scale) = if arc.exclusive {
            (format!("y_{j}"), arc.max_flow)
        } else {
            (format!("x_{j}"), 1.0)
        };

        // MPS defaults to minimization
        writeln!(buffer, "    {name}    flow    {}", -arc.weight * scale)?;
        for (row, value) in program.column(j) {
            writeln!(buffer, "    {name}    {}    {}", rows[row], value * scale)?;
        }
    }
    if integral {
        writeln!(buffer, "    MARKER    'MARKER'    'INTEND'")?;
    }

    writeln!(buffer, "RHS")?;
    for (row, rhs) in rows.iter().zip(program.rhs.iter()) {
        writeln!(buffer, "    RHS    {row}    {rhs}")?;
    }

    writeln!(buffer, "BOUNDS")?;
    for (j, arc) in graph.arcs().iter().enumerate() {
        if arc.exclusive {
            writeln!(buffer, " BV BND    y_{j}")?;
        } else {
            writeln!(buffer, " UP BND    x_{j}    {}", arc.max_flow)?;
        }
    }

    writeln!(buffer, "ENDATA")?;
    Ok(())
}
