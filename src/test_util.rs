// src/test_util.rs

use std::num::NonZero;

use crate::{
    Bar, BarAggregator, FeedAdapter, FeedError, FeedRequest, RenderSink, Timestamp, WavePoint,
};

/// Asserts that two `f64` values are approximately equal using a
/// relative epsilon of `4 * f64::EPSILON`.
macro_rules! assert_approx {
    ($actual:expr, $expected:expr) => {{
        let (a, e): (f64, f64) = ($actual, $expected);
        assert!(
            (a - e).abs() <= e.abs() * 4.0 * f64::EPSILON,
            "assert_approx failed: actual={a}, expected={e}, diff={}",
            (a - e).abs(),
        );
    }};
}

pub(crate) use assert_approx;

pub fn ohlc(time: Timestamp, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar::new(time, open, high, low, close)
}

/// Convenience: bar with just a close price and timestamp (OHLC all equal to close).
pub fn bar(close: f64, time: Timestamp) -> Bar {
    ohlc(time, close, close, close, close)
}

/// One-minute aggregator holding `closes` at times 0, 60, 120, ...
pub fn history(closes: &[f64]) -> BarAggregator {
    let mut agg = BarAggregator::new(NonZero::new(60).unwrap(), NonZero::new(64).unwrap());
    agg.ingest_history(
        closes
            .iter()
            .zip(0..)
            .map(|(&close, i)| bar(close, i * 60)),
    );
    agg
}

#[derive(Debug, Default)]
pub struct RecordingFeed {
    pub sent: Vec<FeedRequest>,
    pub fail: bool,
}

impl FeedAdapter for RecordingFeed {
    fn send(&mut self, request: FeedRequest) -> Result<(), FeedError> {
        if self.fail {
            return Err(FeedError::Disconnected);
        }
        self.sent.push(request);
        Ok(())
    }
}

/// What a [`RecordingSink`] was asked to draw, reduced to lengths and times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    FullData(usize),
    Bar(Timestamp),
    FullIndicator(usize),
    Point(Timestamp),
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RenderSink for RecordingSink {
    fn set_full_data(&mut self, bars: &[Bar]) {
        self.events.push(SinkEvent::FullData(bars.len()));
    }

    fn append_or_update_bar(&mut self, bar: &Bar) {
        self.events.push(SinkEvent::Bar(bar.time()));
    }

    fn set_full_indicator(&mut self, points: &[WavePoint]) {
        self.events.push(SinkEvent::FullIndicator(points.len()));
    }

    fn append_or_update_point(&mut self, point: &WavePoint) {
        self.events.push(SinkEvent::Point(point.time()));
    }
}
