//! Trade search orchestrator.
//!
//! # Algorithm
//!
//! Each recursive call on a capture:
//! 1. Returns if cancelled.
//! 2. Emits the capture and returns if it is accepted: non-empty, a trade,
//!    every target reached, every involved student conflict-free (the
//!    origin's ignored lectures excepted).
//! 3. Returns if `depth >= max_depth`.
//! 4. Finds loose ends and the candidate extensions of each. Any loose end
//!    without candidates makes the branch infeasible.
//! 5. Tries the Cartesian product of candidates, one per loose end: apply
//!    all moves, recurse at `depth + 1` with the new students' schedules
//!    added to the targets, roll back.
//!
//! At the top level the product is cut into batches that run on a rayon
//! pool, each on its own clone of the capture. Deeper levels run
//! sequentially on the worker that owns the batch.
//!
//! # Failure
//! Rejected move applications abandon the combination silently. Only
//! usage errors surface from `search`.

use log::{debug, info, trace};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::candidates::{candidates_for, Candidate};
use super::{CancellationToken, SearchConfig, SearchHandle, SearchTargets, TradeSink};
use crate::catalog::Catalog;
use crate::error::{Result, TradeError};
use crate::models::{ClassMove, Schedule};
use crate::trade::{head_tail_tuples_of_noncycles, TradeCapture};
use crate::validation::validate_targets;

/// Outcome of a finished search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSummary {
    /// Trades delivered to the sink.
    pub trades_found: usize,
    /// Whether the search stopped because of cancellation.
    pub cancelled: bool,
}

/// Parallel, bounded trade search over a catalog.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use u_trade::catalog::InMemoryCatalog;
/// use u_trade::search::{SearchConfig, TradeSearch};
/// use u_trade::TradeError;
///
/// let search = TradeSearch::new(SearchConfig::default());
/// assert_eq!(search.new_capture().unwrap_err(), TradeError::NoCatalog);
///
/// let search = search.with_catalog(Arc::new(InMemoryCatalog::default()));
/// assert!(search.new_capture().unwrap().is_empty());
/// ```
#[derive(Clone)]
pub struct TradeSearch {
    catalog: Option<Arc<dyn Catalog>>,
    config: SearchConfig,
}

/// Shared, read-only state of one search.
struct SearchContext<'a> {
    config: &'a SearchConfig,
    sink: &'a dyn TradeSink,
    cancel: &'a CancellationToken,
    found: AtomicUsize,
}

/// Candidate lists per loose end, tried as a Cartesian product.
struct Expansion {
    options: Vec<Vec<Candidate>>,
    total: usize,
}

impl TradeSearch {
    /// Creates a search without a catalog.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            catalog: None,
            config,
        }
    }

    /// Supplies the catalog.
    pub fn with_catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// The search configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn catalog(&self) -> Result<&Arc<dyn Catalog>> {
        self.catalog.as_ref().ok_or(TradeError::NoCatalog)
    }

    /// An empty capture over this search's catalog.
    ///
    /// # Errors
    /// `NoCatalog` if no catalog was supplied.
    pub fn new_capture(&self) -> Result<TradeCapture> {
        Ok(TradeCapture::new(Arc::clone(self.catalog()?)))
    }

    /// A capture holding the moves that take `student_id` from their
    /// catalog schedule to `desired`, one per differing lecture.
    ///
    /// # Errors
    /// `NoCatalog`, `UnknownStudent`, `LectureNotHeld` if `desired` holds a
    /// lecture the student doesn't take, or `InvalidMove`.
    pub fn seed_capture(&self, student_id: &str, desired: &Schedule) -> Result<TradeCapture> {
        let mut capture = self.new_capture()?;
        let current = capture.schedule_of(student_id)?;

        let mut moves = Vec::new();
        for wanted in desired.sections() {
            let held = current
                .section_for(&wanted.lecture_code)
                .ok_or_else(|| TradeError::LectureNotHeld {
                    lecture_code: wanted.lecture_code.clone(),
                })?;
            if held.grade != wanted.grade || held.number != wanted.number {
                moves.push(ClassMove::new(
                    student_id,
                    wanted.lecture_code.as_str(),
                    held.grade,
                    held.number,
                    wanted.number,
                ));
            }
        }

        capture.add_all(moves)?;
        Ok(capture)
    }

    /// Searches for trades extending `initial` that reach `targets`.
    ///
    /// Every completed trade is delivered to `sink` as found, in no
    /// particular order. Returns when the bounded search space is
    /// exhausted or `cancel` is signalled.
    ///
    /// A trade holds at least one move: an empty `initial` capture is never
    /// delivered, even when every target already equals the student's
    /// current schedule.
    ///
    /// # Errors
    /// `NoCatalog`, `InvalidTargets`, or `WorkerPool`. Infeasible branches
    /// are never errors.
    pub fn search(
        &self,
        targets: SearchTargets,
        initial: TradeCapture,
        sink: &dyn TradeSink,
        cancel: &CancellationToken,
    ) -> Result<SearchSummary> {
        let catalog = self.catalog()?;
        validate_targets(catalog.as_ref(), &targets).map_err(TradeError::InvalidTargets)?;

        info!(
            "trade search: {} target(s), {} seed move(s), max_depth={}, max_lecture_moves={}",
            targets.len(),
            initial.len(),
            self.config.max_depth,
            self.config.max_lecture_moves_per_student
        );

        let ctx = SearchContext {
            config: &self.config,
            sink,
            cancel,
            found: AtomicUsize::new(0),
        };
        self.explore_root(&ctx, &targets, initial)?;

        let summary = SearchSummary {
            trades_found: ctx.found.load(Ordering::SeqCst),
            cancelled: cancel.is_cancelled(),
        };
        if summary.cancelled {
            info!("trade search cancelled after {} trade(s)", summary.trades_found);
        } else {
            info!("trade search completed, {} trade(s) found", summary.trades_found);
        }
        Ok(summary)
    }

    /// Runs [`search`](Self::search) on a background thread.
    ///
    /// The returned handle cancels, polls, and joins the search.
    pub fn spawn(
        &self,
        targets: SearchTargets,
        initial: TradeCapture,
        sink: Arc<dyn TradeSink>,
    ) -> SearchHandle {
        let search = self.clone();
        SearchHandle::spawn(move |cancel| search.search(targets, initial, sink.as_ref(), cancel))
    }

    /// Top level: like `explore`, but batches run on the worker pool.
    fn explore_root(
        &self,
        ctx: &SearchContext<'_>,
        targets: &SearchTargets,
        capture: TradeCapture,
    ) -> Result<()> {
        if ctx.cancel.is_cancelled() {
            return Ok(());
        }
        if accepts(targets, &capture) {
            emit(ctx, &capture);
            return Ok(());
        }
        if ctx.config.max_depth == 0 {
            return Ok(());
        }
        let Some(expansion) = expand(ctx, &capture, 0) else {
            return Ok(());
        };

        let threads = ctx.config.threads.max(1);
        let batch_size = ctx
            .config
            .batch_size
            .unwrap_or_else(|| expansion.total.div_ceil(threads))
            .max(1);
        let batches = expansion.total.div_ceil(batch_size);
        let threads = threads.min(batches);
        debug!(
            "depth 0: {} combination(s) in {} batch(es) on {} thread(s)",
            expansion.total, batches, threads
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| TradeError::WorkerPool(e.to_string()))?;

        pool.install(|| {
            (0..batches).into_par_iter().for_each(|batch| {
                if ctx.cancel.is_cancelled() {
                    return;
                }
                let mut branch = capture.clone();
                let start = batch * batch_size;
                let end = (start + batch_size).min(expansion.total);
                for index in start..end {
                    if ctx.cancel.is_cancelled() {
                        return;
                    }
                    try_combination(ctx, targets, &mut branch, &expansion, index, 0);
                }
            });
        });

        Ok(())
    }
}

/// One recursive step on a capture owned by the current worker.
fn explore(
    ctx: &SearchContext<'_>,
    targets: &SearchTargets,
    capture: &mut TradeCapture,
    depth: usize,
) {
    if ctx.cancel.is_cancelled() {
        return;
    }
    if accepts(targets, capture) {
        emit(ctx, capture);
        return;
    }
    if depth >= ctx.config.max_depth {
        return;
    }
    let Some(expansion) = expand(ctx, capture, depth) else {
        return;
    };
    for index in 0..expansion.total {
        if ctx.cancel.is_cancelled() {
            return;
        }
        try_combination(ctx, targets, capture, &expansion, index, depth);
    }
}

/// Applies combination `index`, recurses, and rolls back.
fn try_combination(
    ctx: &SearchContext<'_>,
    targets: &SearchTargets,
    capture: &mut TradeCapture,
    expansion: &Expansion,
    index: usize,
    depth: usize,
) {
    let picks = expansion.combination(index);

    // One student can't extend two loose ends at once.
    for (i, a) in picks.iter().enumerate() {
        if picks[i + 1..].iter().any(|b| b.student_id == a.student_id) {
            return;
        }
    }

    let moves: Vec<ClassMove> = picks.iter().flat_map(|c| c.moves.iter().cloned()).collect();
    let applied = moves.len();
    if let Err(e) = capture.add_all(moves) {
        trace!("depth {depth}: abandoning combination {index}: {e}");
        return;
    }

    let next_targets = targets.extended(
        picks
            .iter()
            .map(|c| (c.student_id.clone(), c.schedule.clone())),
    );
    explore(ctx, &next_targets, capture, depth + 1);
    capture.pop(applied);
}

/// Candidate lists for every loose end, or `None` if the branch is
/// infeasible (no loose ends left to extend, or one without candidates).
fn expand(ctx: &SearchContext<'_>, capture: &TradeCapture, depth: usize) -> Option<Expansion> {
    let loose_ends = head_tail_tuples_of_noncycles(capture);
    if loose_ends.is_empty() {
        return None;
    }

    let mut options = Vec::with_capacity(loose_ends.len());
    for end in &loose_ends {
        if ctx.cancel.is_cancelled() {
            return None;
        }
        let candidates = candidates_for(
            capture,
            end,
            ctx.config.max_lecture_moves_per_student,
            ctx.cancel,
        );
        if candidates.is_empty() {
            trace!("depth {depth}: no candidates for tail {}", end.tail);
            return None;
        }
        options.push(candidates);
    }

    let total = options
        .iter()
        .try_fold(1usize, |acc, o| acc.checked_mul(o.len()))
        .unwrap_or(usize::MAX);
    debug!(
        "depth {depth}: {} loose end(s), {total} combination(s)",
        loose_ends.len()
    );
    Some(Expansion { options, total })
}

/// Whether the capture is a completed trade for these targets.
fn accepts(targets: &SearchTargets, capture: &TradeCapture) -> bool {
    if capture.is_empty() || !capture.does_form_trade() {
        return false;
    }

    let reached = targets
        .iter()
        .all(|(student, desired)| capture.schedule_of(student).is_ok_and(|s| s == *desired));
    if !reached {
        return false;
    }

    capture
        .affected_schedules()
        .into_iter()
        .all(|(student, schedule)| match targets.origin() {
            Some(origin) if origin.student_id == student => {
                !schedule.conflicts_ignoring(&origin.ignored_lectures)
            }
            _ => !schedule.conflicts(),
        })
}

fn emit(ctx: &SearchContext<'_>, capture: &TradeCapture) {
    ctx.found.fetch_add(1, Ordering::SeqCst);
    ctx.sink.accept(capture.clone());
}

impl Expansion {
    /// Decodes a flat index into one candidate per loose end (mixed
    /// radix, last loose end fastest).
    fn combination(&self, mut index: usize) -> Vec<&Candidate> {
        let mut picks = Vec::with_capacity(self.options.len());
        for options in self.options.iter().rev() {
            picks.push(&options[index % options.len()]);
            index /= options.len();
        }
        picks.reverse();
        picks
    }
}
