use dre_core::models::{Commodity, ParticipantId, Side, Step, SubmissionError, Trade};
use dre_solver::SolveStatus;
use serde::{Serialize, Serializer};

/// A submission turned away during collection
#[derive(Debug, PartialEq, Serialize)]
pub struct Rejection {
    /// The submitting participant
    pub participant: ParticipantId,
    /// The commodity of the rejected portfolio
    pub commodity: Commodity,
    /// Which side the portfolio was for
    pub side: Side,
    /// Why it was rejected
    #[serde(serialize_with = "display")]
    pub error: SubmissionError,
}

/// The outcome of one exchange step
#[derive(Debug, PartialEq, Serialize)]
pub struct StepReport {
    /// The step that was cleared
    pub step: Step,
    /// The dispatched trades, in dispatch order
    pub trades: Vec<Trade>,
    /// The quality of the solve
    pub status: SolveStatus,
    /// Submissions that never reached the graph
    pub rejections: Vec<Rejection>,
    /// The sum of all traded quantities
    pub total_quantity: f64,
    /// The preference-weighted sum of all traded quantities
    pub total_score: f64,
}

fn display<S: Serializer>(error: &SubmissionError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
