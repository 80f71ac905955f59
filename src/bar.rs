use std::fmt::Display;

use serde::Serialize;

use crate::{Ohlcv, Price, Timestamp};

/// OHLC data for one fixed-width time bucket.
///
/// Bars are owned by the [`BarAggregator`](crate::BarAggregator); render
/// sinks only ever see borrowed snapshots. The most recent bar is mutated in
/// place by live ticks until a newer bucket supersedes it.
///
/// Serializes as `{"time", "open", "high", "low", "close"}`, the shape
/// candlestick widgets take.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bar {
    time: Timestamp,
    open: Price,
    high: Price,
    low: Price,
    close: Price,
}

impl Bar {
    #[must_use]
    pub fn new(time: Timestamp, open: Price, high: Price, low: Price, close: Price) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }

    /// Copies any [`Ohlcv`] record into a bar keyed by its `open_time`.
    #[must_use]
    pub fn from_ohlcv(record: &impl Ohlcv) -> Self {
        Self::new(
            record.open_time(),
            record.open(),
            record.high(),
            record.low(),
            record.close(),
        )
    }

    /// A bar opened by a tick: `high = low = close = quote`.
    #[must_use]
    pub(crate) fn opened_at(time: Timestamp, open: Price, quote: Price) -> Self {
        Self::new(time, open, quote, quote, quote)
    }

    /// Folds a quote into the bar. `open` is left untouched.
    #[inline]
    pub(crate) fn absorb(&mut self, quote: Price) {
        self.high = self.high.max(quote);
        self.low = self.low.min(quote);
        self.close = quote;
    }

    /// Bucket start time in epoch seconds.
    #[inline]
    #[must_use]
    pub fn time(&self) -> Timestamp {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn open(&self) -> Price {
        self.open
    }

    #[inline]
    #[must_use]
    pub fn high(&self) -> Price {
        self.high
    }

    #[inline]
    #[must_use]
    pub fn low(&self) -> Price {
        self.low
    }

    #[inline]
    #[must_use]
    pub fn close(&self) -> Price {
        self.close
    }
}

impl Ohlcv for Bar {
    fn open(&self) -> Price {
        self.open
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }

    fn open_time(&self) -> Timestamp {
        self.time
    }
}

impl Display for Bar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bar(t: {}, o: {}, h: {}, l: {}, c: {})",
            self.time, self.open, self.high, self.low, self.close
        )
    }
}
