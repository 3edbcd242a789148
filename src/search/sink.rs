//! Result sinks for completed trades.

use parking_lot::Mutex;

use crate::trade::{TradeCapture, TradeReport};

/// Receives completed trades as they are found.
///
/// Called concurrently from worker threads; implementations serialize
/// their own state. Closures `Fn(TradeCapture)` are sinks too.
pub trait TradeSink: Send + Sync {
    /// Accepts one completed trade.
    fn accept(&self, trade: TradeCapture);
}

impl<F> TradeSink for F
where
    F: Fn(TradeCapture) + Send + Sync,
{
    fn accept(&self, trade: TradeCapture) {
        self(trade)
    }
}

/// A sink that collects trades in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    trades: Mutex<Vec<TradeCapture>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trades received.
    pub fn len(&self) -> usize {
        self.trades.lock().len()
    }

    /// Whether nothing has been received.
    pub fn is_empty(&self) -> bool {
        self.trades.lock().is_empty()
    }

    /// Copies of the received trades, in arrival order.
    pub fn trades(&self) -> Vec<TradeCapture> {
        self.trades.lock().clone()
    }

    /// Reports of the received trades, in arrival order.
    pub fn reports(&self) -> Vec<TradeReport> {
        self.trades.lock().iter().map(TradeReport::from).collect()
    }

    /// Consumes the sink, returning the received trades.
    pub fn into_trades(self) -> Vec<TradeCapture> {
        self.trades.into_inner()
    }
}

impl TradeSink for CollectingSink {
    fn accept(&self, trade: TradeCapture) {
        self.trades.lock().push(trade);
    }
}
