mod participant;

pub use participant::{Participant, TransferError};
