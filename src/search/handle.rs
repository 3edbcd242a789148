//! Background search handle.

use log::warn;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{CancellationToken, SearchSummary};
use crate::error::{Result, TradeError};

/// A search running on its own thread.
///
/// Dropping the handle detaches the thread; it keeps running until the
/// search finishes or its token is cancelled.
#[derive(Debug)]
pub struct SearchHandle {
    cancel: CancellationToken,
    receiver: Receiver<Result<SearchSummary>>,
    thread: Option<JoinHandle<()>>,
}

impl SearchHandle {
    pub(crate) fn spawn<F>(run: F) -> Self
    where
        F: FnOnce(&CancellationToken) -> Result<SearchSummary> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let (sender, receiver) = mpsc::channel();
        let thread = thread::spawn(move || {
            // The receiver may already be gone; nobody is waiting then.
            let _ = sender.send(run(&token));
        });
        Self {
            cancel,
            receiver,
            thread: Some(thread),
        }
    }

    /// The token controlling this search.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Signals cancellation without waiting.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the search thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Blocks until the search ends and returns its outcome.
    ///
    /// # Errors
    /// The search's own error, or `SearchAborted` if the thread died
    /// without reporting.
    pub fn join(mut self) -> Result<SearchSummary> {
        let outcome = self.receiver.recv().unwrap_or(Err(TradeError::SearchAborted));
        self.reap();
        outcome
    }

    /// Cancels, then waits at most `grace` for the search to wind down.
    ///
    /// Returns `None` if the search is still running after the grace
    /// period; the thread is left detached.
    pub fn cancel_and_wait(mut self, grace: Duration) -> Option<Result<SearchSummary>> {
        self.cancel();
        match self.receiver.recv_timeout(grace) {
            Ok(outcome) => {
                self.reap();
                Some(outcome)
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.reap();
                Some(Err(TradeError::SearchAborted))
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!("search did not stop within {grace:?}; detaching");
                None
            }
        }
    }

    fn reap(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("search thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassMove;
    use crate::search::sink::TradeSink;
    use crate::search::{CollectingSink, SearchConfig, SearchTargets, TradeSearch};
    use crate::test_support::{school_catalog, shared};
    use crate::trade::TradeCapture;
    use std::sync::{Arc, OnceLock};
    use std::time::Instant;

    fn summary(trades_found: usize, cancelled: bool) -> SearchSummary {
        SearchSummary {
            trades_found,
            cancelled,
        }
    }

    #[test]
    fn test_join_returns_outcome() {
        let handle = SearchHandle::spawn(|_| Ok(summary(3, false)));
        assert_eq!(handle.join().unwrap(), summary(3, false));
    }

    #[test]
    fn test_cancel_reaches_search() {
        let handle = SearchHandle::spawn(|cancel| {
            while !cancel.is_cancelled() {
                thread::sleep(Duration::from_millis(1));
            }
            Ok(summary(0, true))
        });
        assert!(!handle.cancellation_token().is_cancelled());
        let outcome = handle.cancel_and_wait(Duration::from_secs(10));
        assert_eq!(outcome.unwrap().unwrap(), summary(0, true));
    }

    #[test]
    fn test_cancel_and_wait_times_out() {
        let (release, gate) = mpsc::channel::<()>();
        let handle = SearchHandle::spawn(move |_| {
            let _ = gate.recv();
            Ok(summary(0, true))
        });
        assert!(handle.cancel_and_wait(Duration::from_millis(20)).is_none());
        release.send(()).unwrap();
    }

    #[test]
    fn test_panicking_search_is_aborted() {
        let handle = SearchHandle::spawn(|_| panic!("boom"));
        assert_eq!(handle.join().unwrap_err(), TradeError::SearchAborted);
    }

    #[test]
    fn test_spawned_trade_search() {
        let catalog = shared(school_catalog());
        let search = TradeSearch::new(SearchConfig::default().with_max_depth(2))
            .with_catalog(catalog.clone());
        let desired = catalog
            .schedule_of("A")
            .unwrap()
            .replace_section(catalog.as_ref(), "MATH", 2)
            .unwrap();
        let seed = search.seed_capture("A", &desired).unwrap();
        let sink = Arc::new(CollectingSink::new());

        let handle = search.spawn(
            SearchTargets::new().with_target("A", desired),
            seed,
            sink.clone(),
        );
        let outcome = handle.join().unwrap();
        assert_eq!(outcome, summary(2, false));
        assert!(sink
            .trades()
            .iter()
            .all(|t| t.moves()[0] == ClassMove::new("A", "MATH", 1, 1, 2)));
    }

    #[test]
    fn test_cancel_spawned_trade_search_midway() {
        let catalog = shared(school_catalog());
        let search = TradeSearch::new(SearchConfig::default().with_max_depth(3).with_threads(1))
            .with_catalog(catalog.clone());
        let desired = catalog
            .schedule_of("A")
            .unwrap()
            .replace_section(catalog.as_ref(), "MATH", 3)
            .unwrap();
        let seed = search.seed_capture("A", &desired).unwrap();

        // The sink holds its worker until the caller has cancelled, so the
        // cancellation lands while the search is still running.
        let token: Arc<OnceLock<CancellationToken>> = Arc::new(OnceLock::new());
        let collected = Arc::new(CollectingSink::new());
        let (found_tx, found_rx) = mpsc::channel();
        let sink = {
            let token = Arc::clone(&token);
            let collected = Arc::clone(&collected);
            move |trade: TradeCapture| {
                collected.accept(trade);
                let _ = found_tx.send(());
                let deadline = Instant::now() + Duration::from_secs(10);
                while !token.get().is_some_and(|t| t.is_cancelled()) && Instant::now() < deadline {
                    thread::sleep(Duration::from_millis(1));
                }
            }
        };

        let handle = search.spawn(
            SearchTargets::new().with_target("A", desired.clone()),
            seed,
            Arc::new(sink),
        );
        token.set(handle.cancellation_token().clone()).unwrap();
        found_rx.recv_timeout(Duration::from_secs(10)).unwrap();

        let outcome = handle
            .cancel_and_wait(Duration::from_secs(10))
            .unwrap()
            .unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.trades_found, 1);
        for trade in collected.trades() {
            assert!(trade.does_form_trade());
            assert_eq!(trade.schedule_of("A").unwrap(), desired);
            assert!(trade.affected_schedules().values().all(|s| !s.conflicts()));
        }
    }
}
