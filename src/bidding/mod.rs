pub mod gate;
pub mod increment;

pub use gate::{BidLock, EligibilityGate, GateError, LOCK_CONFLICT_MESSAGE};
pub use increment::{increment, next_minimum_bid, HIGH_INCREMENT, LOW_INCREMENT, SILVER_THRESHOLD};
