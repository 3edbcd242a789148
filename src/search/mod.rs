//! Parallel, bounded trade search.
//!
//! # Overview
//!
//! A search starts from a seed [`TradeCapture`](crate::trade::TradeCapture)
//! holding the origin student's moves and repeatedly closes open chains by
//! involving further students, until every move chain forms a cycle and
//! every involved student has a conflict-free timetable.
//!
//! # Bounds
//!
//! - `max_depth`: expansion rounds per branch
//! - `max_lecture_moves_per_student`: moves one newly involved student may
//!   make in a single round
//!
//! # Parallelism
//!
//! Top-level combinations run in batches on a rayon pool sized by
//! [`SearchConfig::threads`]. Workers share only the catalog, the
//! [`CancellationToken`], and the [`TradeSink`].

mod cancel;
mod candidates;
mod config;
mod engine;
mod handle;
mod sink;

pub use cancel::CancellationToken;
pub use candidates::{candidates_for, Candidate};
pub use config::{OriginExemption, SearchConfig, SearchTargets};
pub use engine::{SearchSummary, TradeSearch};
pub use handle::SearchHandle;
pub use sink::{CollectingSink, TradeSink};
