//! Move ledger and trade certification.
//!
//! A **trade** is not a stored entity but a property of a
//! [`TradeCapture`]: it holds when, per lecture, the applied moves
//! decompose into disjoint cycles. The cycle analyzer both certifies
//! trades and finds the loose ends that drive search expansion.
//!
//! # Submodules
//!
//! - `capture`: `TradeCapture`, the transactional ledger with cached
//!   schedules and rosters
//! - `cycles`: `is_set_of_cycles`, `head_tail_tuples_of_noncycles`
//! - `report`: `TradeReport`, a serializable per-student view of a trade

mod capture;
mod cycles;
mod report;

pub use capture::TradeCapture;
pub use cycles::{head_tail_tuples_of_noncycles, is_set_of_cycles, LooseEnd};
pub use report::TradeReport;
