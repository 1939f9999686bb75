use approx::assert_abs_diff_eq;
use dre_core::{
    models::{
        Bid, BidPortfolio, ConstructionError, ExchangeContext, ParticipantId, Request,
        RequestPortfolio, Role, Side, Step, SubmissionError, Trade,
    },
    ports::{Participant, TransferError},
};
use dre_exchange::{Exchange, ExchangeConfig, ExchangeError};
use dre_solver::{SolveStatus, Strategy};
use rstest::*;
use std::{cell::RefCell, rc::Rc};

type Journal = Rc<RefCell<Vec<(u64, Role, f64)>>>;

/// A facility that may demand and may supply fuel.
#[derive(Default)]
struct Facility {
    id: u64,
    demand: f64,
    stock: f64,
    preference: f64,
    refuses: Option<u64>,
    broken: bool,
    journal: Journal,
}

impl Facility {
    fn consumer(id: u64, demand: f64, journal: &Journal) -> Self {
        Self {
            id,
            demand,
            preference: 1.0,
            journal: journal.clone(),
            ..Default::default()
        }
    }

    fn supplier(id: u64, stock: f64, preference: f64, journal: &Journal) -> Self {
        Self {
            id,
            stock,
            preference,
            journal: journal.clone(),
            ..Default::default()
        }
    }
}

impl Participant for Facility {
    fn id(&self) -> ParticipantId {
        ParticipantId(self.id)
    }

    fn get_requests(&mut self, _step: Step) -> Vec<RequestPortfolio> {
        if self.demand > 0.0 {
            let request = Request::new(self.id(), "fuel", self.demand).unwrap();
            vec![RequestPortfolio::new(self.id(), "fuel").with(request).unwrap()]
        } else {
            Vec::new()
        }
    }

    fn get_bids(&mut self, _step: Step, _context: &ExchangeContext) -> Vec<BidPortfolio> {
        if self.stock > 0.0 {
            let bid = Bid::new(self.id(), "fuel", self.stock)
                .unwrap()
                .with_preference(self.preference)
                .unwrap();
            vec![BidPortfolio::new(self.id(), "fuel").with(bid).unwrap()]
        } else {
            Vec::new()
        }
    }

    fn adjust_preference(&self, _request: &Request, bid: &Bid, preference: f64) -> f64 {
        if self.refuses == Some(bid.bidder().0) {
            -1.0
        } else {
            preference
        }
    }

    fn execute_trade(&mut self, trade: &Trade, role: Role) -> Result<(), TransferError> {
        if self.broken {
            return Err(TransferError::Other("valve stuck".to_owned()));
        }
        match role {
            Role::Bidder => {
                if trade.quantity > self.stock {
                    return Err(TransferError::Insufficient {
                        participant: self.id(),
                        available: self.stock,
                        required: trade.quantity,
                    });
                }
                self.stock -= trade.quantity;
            }
            Role::Requester => self.demand -= trade.quantity,
        }
        self.journal
            .borrow_mut()
            .push((self.id, role, trade.quantity));
        Ok(())
    }
}

/// Sizes its offer to whatever has been requested this step.
struct Responsive {
    id: u64,
}

impl Participant for Responsive {
    fn id(&self) -> ParticipantId {
        ParticipantId(self.id)
    }

    fn get_bids(&mut self, _step: Step, context: &ExchangeContext) -> Vec<BidPortfolio> {
        let commodity = "fuel".into();
        let requested = context
            .requests(&commodity)
            .iter()
            .flat_map(|portfolio| portfolio.members())
            .map(|request| request.quantity())
            .sum::<f64>();
        let bid = Bid::new(self.id(), "fuel", requested).unwrap();
        vec![BidPortfolio::new(self.id(), "fuel").with(bid).unwrap()]
    }

    fn execute_trade(&mut self, _trade: &Trade, _role: Role) -> Result<(), TransferError> {
        Ok(())
    }
}

/// Submits things it should not.
struct Unruly {
    id: u64,
}

impl Participant for Unruly {
    fn id(&self) -> ParticipantId {
        ParticipantId(self.id)
    }

    fn get_requests(&mut self, _step: Step) -> Vec<RequestPortfolio> {
        let own = |quantity| {
            RequestPortfolio::new(self.id(), "fuel")
                .with(Request::new(self.id(), "fuel", quantity).unwrap())
                .unwrap()
        };
        let foreign = RequestPortfolio::new(ParticipantId(99), "water")
            .with(Request::new(ParticipantId(99), "water", 1.0).unwrap())
            .unwrap();
        vec![own(1.0), own(2.0), foreign]
    }

    fn execute_trade(&mut self, _trade: &Trade, _role: Role) -> Result<(), TransferError> {
        Ok(())
    }
}

#[fixture]
fn journal() -> Journal {
    Journal::default()
}

fn market(journal: &Journal) -> Vec<Box<dyn Participant>> {
    // Deliberately out of id order
    vec![
        Box::new(Facility::supplier(3, 60.0, 0.5, journal)),
        Box::new(Facility::consumer(1, 100.0, journal)),
        Box::new(Facility::supplier(2, 60.0, 0.9, journal)),
    ]
}

#[rstest]
fn clears_and_dispatches(journal: Journal) {
    let mut participants = market(&journal);
    let report = Exchange::new(Strategy::Greedy)
        .run_exchange(7, &mut participants)
        .unwrap();

    assert_eq!(report.step, 7);
    assert_eq!(report.status, SolveStatus::Heuristic);
    assert!(report.rejections.is_empty());
    assert_eq!(report.total_quantity, 100.0);

    // bidder first, then requester, in trade order
    assert_eq!(
        *journal.borrow(),
        vec![
            (2, Role::Bidder, 60.0),
            (1, Role::Requester, 60.0),
            (3, Role::Bidder, 40.0),
            (1, Role::Requester, 40.0),
        ]
    );
}

#[rstest]
#[case::greedy(r#"{ "solver": { "strategy": "greedy" } }"#)]
#[case::simplex(r#"{ "solver": { "strategy": "optimization", "backend": "simplex" } }"#)]
#[case::clarabel(r#"{ "solver": { "strategy": "optimization", "backend": "clarabel" } }"#)]
#[case::osqp(r#"{ "solver": { "strategy": "optimization", "backend": "osqp" } }"#)]
fn configured_strategies_agree(journal: Journal, #[case] config: &str) {
    let config: ExchangeConfig = serde_json::from_str(config).unwrap();
    let exchange = Exchange::from_config(&config).unwrap();

    let mut participants = market(&journal);
    let report = exchange.run_exchange(0, &mut participants).unwrap();
    assert_abs_diff_eq!(report.total_quantity, 100.0, epsilon = 1e-6);
    assert_abs_diff_eq!(report.total_score, 87.0, epsilon = 1e-6);
}

#[test]
fn default_matches_default_config() {
    let configured = Exchange::from_config(&ExchangeConfig::default()).unwrap();
    match (Exchange::default().strategy(), configured.strategy()) {
        (Strategy::Optimization(default), Strategy::Optimization(configured)) => {
            assert_eq!(default.backend().name(), configured.backend().name());
            assert_eq!(default.settings(), configured.settings());
        }
        (default, configured) => panic!("{default:?} differs from {configured:?}"),
    }
}

#[rstest]
fn default_exchange_clears(journal: Journal) {
    let mut participants = market(&journal);
    let report = Exchange::default()
        .run_exchange(0, &mut participants)
        .unwrap();
    assert_eq!(report.status, SolveStatus::Optimal);
    assert_abs_diff_eq!(report.total_quantity, 100.0, epsilon = 1e-6);
    assert_abs_diff_eq!(report.total_score, 87.0, epsilon = 1e-6);
}

#[rstest]
fn requester_can_veto(journal: Journal) {
    let mut consumer = Facility::consumer(1, 100.0, &journal);
    consumer.refuses = Some(2);
    let mut participants: Vec<Box<dyn Participant>> = vec![
        Box::new(consumer),
        Box::new(Facility::supplier(2, 60.0, 0.9, &journal)),
        Box::new(Facility::supplier(3, 60.0, 0.5, &journal)),
    ];

    let report = Exchange::new(Strategy::Greedy)
        .run_exchange(0, &mut participants)
        .unwrap();
    assert_eq!(report.trades.len(), 1);
    assert_eq!(report.trades[0].bid.participant, ParticipantId(3));
    assert_eq!(report.total_quantity, 60.0);
}

#[rstest]
fn bidders_see_the_requests(journal: Journal) {
    let mut participants: Vec<Box<dyn Participant>> = vec![
        Box::new(Responsive { id: 5 }),
        Box::new(Facility::consumer(1, 12.5, &journal)),
        Box::new(Facility::consumer(2, 2.5, &journal)),
    ];
    let report = Exchange::new(Strategy::Greedy)
        .run_exchange(0, &mut participants)
        .unwrap();
    assert_eq!(report.total_quantity, 15.0);
}

#[rstest]
fn rejections_do_not_abort(journal: Journal) {
    let mut participants = market(&journal);
    participants.push(Box::new(Unruly { id: 4 }));

    let report = Exchange::new(Strategy::Greedy)
        .run_exchange(0, &mut participants)
        .unwrap();

    let errors = report
        .rejections
        .iter()
        .map(|rejection| (rejection.participant.0, rejection.side, &rejection.error))
        .collect::<Vec<_>>();
    assert_eq!(
        errors,
        vec![
            (
                4,
                Side::Request,
                &SubmissionError::Duplicate {
                    participant: ParticipantId(4),
                    commodity: "fuel".into(),
                    side: Side::Request,
                }
            ),
            (
                4,
                Side::Request,
                &SubmissionError::Construction(ConstructionError::ForeignParticipant {
                    expected: ParticipantId(4),
                    found: ParticipantId(99),
                })
            ),
        ]
    );

    // participant 4's first portfolio was admitted and competes for supply
    assert_eq!(report.total_quantity, 101.0);
}

#[rstest]
fn failed_transfer_aborts(journal: Journal) {
    let mut supplier = Facility::supplier(2, 60.0, 0.9, &journal);
    supplier.broken = true;
    let mut participants: Vec<Box<dyn Participant>> = vec![
        Box::new(Facility::consumer(1, 10.0, &journal)),
        Box::new(supplier),
    ];

    let exchange = Exchange::new(Strategy::Greedy);
    let result = exchange.run_exchange(0, &mut participants);
    match result {
        Err(ExchangeError::Dispatch {
            participant,
            role,
            index,
            dispatched,
            source,
            ..
        }) => {
            assert_eq!(participant, ParticipantId(2));
            assert_eq!(role, Role::Bidder);
            assert_eq!(index, 0);
            assert!(dispatched.is_empty());
            assert!(matches!(source, TransferError::Other(_)));
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert!(journal.borrow().is_empty());
}

#[rstest]
fn failed_requester_leaves_bidder_debited(journal: Journal) {
    let mut consumer = Facility::consumer(1, 10.0, &journal);
    consumer.broken = true;
    let mut participants: Vec<Box<dyn Participant>> = vec![
        Box::new(consumer),
        Box::new(Facility::supplier(2, 60.0, 0.9, &journal)),
    ];

    let exchange = Exchange::new(Strategy::Greedy);
    let result = exchange.run_exchange(0, &mut participants);
    match result {
        Err(ExchangeError::Dispatch {
            participant,
            role,
            index,
            trade,
            dispatched,
            ..
        }) => {
            assert_eq!(participant, ParticipantId(1));
            assert_eq!(role, Role::Requester);
            assert_eq!(index, 0);
            assert_eq!(trade.bid.participant, ParticipantId(2));
            assert_eq!(trade.quantity, 10.0);
            assert!(dispatched.is_empty());
        }
        other => panic!("unexpected result {other:?}"),
    }

    // the bidder's side went through and is the caller's to reconcile
    assert_eq!(*journal.borrow(), vec![(2, Role::Bidder, 10.0)]);
}

#[rstest]
fn later_failure_reports_dispatched_trades(journal: Journal) {
    let mut participants = market(&journal);
    let mut broken = Facility::supplier(3, 60.0, 0.5, &journal);
    broken.broken = true;
    participants[0] = Box::new(broken);

    let exchange = Exchange::new(Strategy::Greedy);
    let result = exchange.run_exchange(0, &mut participants);
    match result {
        Err(ExchangeError::Dispatch {
            participant,
            role,
            index,
            dispatched,
            ..
        }) => {
            assert_eq!(participant, ParticipantId(3));
            assert_eq!(role, Role::Bidder);
            assert_eq!(index, 1);
            assert_eq!(dispatched.len(), 1);
            assert_eq!(dispatched[0].bid.participant, ParticipantId(2));
            assert_eq!(dispatched[0].quantity, 60.0);
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(
        *journal.borrow(),
        vec![(2, Role::Bidder, 60.0), (1, Role::Requester, 60.0)]
    );
}

#[rstest]
fn duplicate_roster_ids(journal: Journal) {
    let mut participants: Vec<Box<dyn Participant>> = vec![
        Box::new(Facility::consumer(1, 10.0, &journal)),
        Box::new(Facility::supplier(1, 10.0, 1.0, &journal)),
    ];
    let exchange = Exchange::new(Strategy::Greedy);
    let result = exchange.run_exchange(0, &mut participants);
    assert!(matches!(
        result,
        Err(ExchangeError::DuplicateParticipant(ParticipantId(1)))
    ));
}

#[rstest]
fn report_serializes(journal: Journal) {
    let mut participants = market(&journal);
    participants.push(Box::new(Unruly { id: 4 }));
    let report = Exchange::new(Strategy::Greedy)
        .run_exchange(3, &mut participants)
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["step"], 3);
    assert_eq!(json["status"], "heuristic");
    assert_eq!(json["rejections"][0]["side"], "request");
    assert_eq!(
        json["rejections"][0]["error"],
        "participant 4 already submitted a request portfolio for fuel"
    );
}
