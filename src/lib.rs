//! Timetable trade discovery for the U-Engine ecosystem.
//!
//! Given one student's desired set of sections, finds multi-party
//! **trades**: chains of section reassignments among students that reach
//! the target timetable without creating conflicts or breaking enrollment.
//!
//! # Modules
//!
//! - **`models`**: Domain types (`Section`, `Schedule`, `ClassMove`,
//!   `TimeSlot`, `SectionKey`, `LectureKey`)
//! - **`catalog`**: Read-only lookup of sections and enrollment (`Catalog`)
//! - **`validation`**: Input integrity checks (duplicate sections, double
//!   enrollment, malformed targets)
//! - **`trade`**: The move ledger (`TradeCapture`) and cycle analysis
//! - **`search`**: Parallel, depth- and fan-out-bounded trade search
//! - **`kpi`**: Timetable compactness metrics
//!
//! # Architecture
//!
//! The catalog is an explicit read-only handle (`Arc<dyn Catalog>`) passed
//! to every ledger and search. Each search branch owns its own
//! `TradeCapture`; only the cancellation flag and the result sink are
//! shared between workers.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use u_trade::catalog::{Catalog, InMemoryCatalog};
//! use u_trade::models::{Section, TimeSlot, Weekday};
//! use u_trade::search::{
//!     CancellationToken, CollectingSink, SearchConfig, SearchTargets, TradeSearch,
//! };
//!
//! let catalog = Arc::new(InMemoryCatalog::new(vec![
//!     Section::new("MATH", 1, 1)
//!         .with_slot(TimeSlot::new(Weekday::Mon, 1))
//!         .with_student("A"),
//!     Section::new("MATH", 1, 2)
//!         .with_slot(TimeSlot::new(Weekday::Tue, 1))
//!         .with_student("B"),
//! ]));
//!
//! let search = TradeSearch::new(SearchConfig::default().with_max_depth(1))
//!     .with_catalog(catalog.clone());
//! let desired = catalog.schedule_of("B").unwrap();
//! let capture = search.seed_capture("A", &desired).unwrap();
//!
//! let sink = CollectingSink::new();
//! let targets = SearchTargets::new().with_target("A", desired);
//! let summary = search
//!     .search(targets, capture, &sink, &CancellationToken::new())
//!     .unwrap();
//! assert_eq!(summary.trades_found, 1);
//! ```

pub mod catalog;
pub mod error;
pub mod kpi;
pub mod models;
pub mod search;
pub mod trade;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{InvalidMoveReason, Result, TradeError};
