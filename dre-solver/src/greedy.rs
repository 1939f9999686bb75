use crate::{ExchangeGraph, Ledger};
use tracing::{Level, event};

/// Fill arcs in priority order, each as far as the ledger allows.
///
/// All-or-nothing arcs are only taken when their full flow still fits.
pub(crate) fn fill(graph: &ExchangeGraph) -> Ledger<'_> {
    let mut ledger = Ledger::new(graph);
    for id in graph.priority_order() {
        let arc = &graph.arcs()[id.0];
        if arc.exclusive {
            ledger.commit_exact(id, arc.max_flow);
        } else {
            let admissible = ledger.admissible(id);
            ledger.commit(id, admissible);
        }
    }

    event!(
        Level::DEBUG,
        arcs = graph.arcs().len(),
        score = ledger.score(),
        "greedy fill finished"
    );
    ledger
}
