#![allow(dead_code)]

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use trendwave::{
    Bar, FeedAdapter, FeedError, FeedRequest, Ohlcv, Price, RenderSink, Tick, Timestamp,
    WavePoint,
};

/// One-minute candle parsed from the recorded feed CSV.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RefBar {
    pub open_time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Ohlcv for RefBar {
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
        self.open_time
    }
}

/// Reference wave point with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefWave {
    pub open_time: u64,
    pub expected: f64,
    pub category: String,
    pub line_width: u8,
}

pub const SYMBOL: &str = "stpRNG";
pub const GRANULARITY: Timestamp = 60;

const BARS_PATH: &str = "tests/fixtures/data/stprng-1m.csv";

/// Load the recorded one-minute bars, oldest first.
pub fn load_reference_bars() -> Vec<RefBar> {
    load_records(BARS_PATH, "invalid bar record")
}

/// Load reference wave points (value, category, line width).
pub fn load_ref_waves(path: &str) -> Vec<RefWave> {
    load_records(path, "invalid reference record")
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Assert a computed point agrees with its reference row.
pub fn assert_wave_matches(point: &WavePoint, reference: &RefWave, tolerance: f64) {
    let context = format!("wave at t={}", reference.open_time);
    assert_eq!(point.time(), reference.open_time, "{context}: time");
    assert_near(point.value(), reference.expected, tolerance, &context);
    assert_eq!(point.category().to_string(), reference.category, "{context}: category");
    assert_eq!(point.line_width(), reference.line_width, "{context}: line width");
}

/// Live ticks that rebuild `bar` inside its bucket, assuming the previous
/// bar closed at `bar.open`: high first, then low, then the close at the
/// last second.
pub fn tick_sequence(bar: &RefBar) -> Vec<Tick> {
    let t = bar.open_time;
    vec![
        Tick::new(t + 1, bar.high, SYMBOL),
        Tick::new(t + 17, bar.open.midpoint(bar.close), SYMBOL),
        Tick::new(t + 31, bar.low, SYMBOL),
        Tick::new(t + GRANULARITY - 1, bar.close, SYMBOL),
    ]
}

/// A `candles` frame as the feed sends it, prices encoded as strings.
pub fn candles_frame(bars: &[RefBar]) -> String {
    let candles: Vec<_> = bars
        .iter()
        .map(|b| {
            json!({
                "epoch": b.open_time,
                "open": b.open.to_string(),
                "high": b.high.to_string(),
                "low": b.low.to_string(),
                "close": b.close.to_string(),
            })
        })
        .collect();

    json!({
        "msg_type": "candles",
        "echo_req": { "ticks_history": SYMBOL, "style": "candles" },
        "candles": candles,
    })
    .to_string()
}

pub fn tick_frame(tick: &Tick, subscription: &str) -> String {
    json!({
        "msg_type": "tick",
        "tick": {
            "epoch": tick.epoch(),
            "quote": tick.quote(),
            "symbol": tick.symbol(),
            "id": subscription,
        },
        "subscription": { "id": subscription },
    })
    .to_string()
}

/// Feed double that records every request.
#[derive(Debug, Default)]
pub struct RecordingFeed {
    pub sent: Vec<FeedRequest>,
}

impl FeedAdapter for RecordingFeed {
    fn send(&mut self, request: FeedRequest) -> Result<(), FeedError> {
        self.sent.push(request);
        Ok(())
    }
}

/// Render double that keeps both series the way a chart widget would:
/// wholesale replacement, or replace-last / append by time.
#[derive(Debug, Default)]
pub struct MirrorSink {
    pub bars: Vec<Bar>,
    pub points: Vec<WavePoint>,
    pub repaints: usize,
}

impl RenderSink for MirrorSink {
    fn set_full_data(&mut self, bars: &[Bar]) {
        self.bars = bars.to_vec();
        self.repaints += 1;
    }

    fn append_or_update_bar(&mut self, bar: &Bar) {
        upsert(&mut self.bars, *bar, Bar::time);
    }

    fn set_full_indicator(&mut self, points: &[WavePoint]) {
        self.points = points.to_vec();
    }

    fn append_or_update_point(&mut self, point: &WavePoint) {
        upsert(&mut self.points, *point, WavePoint::time);
    }
}

fn upsert<T>(series: &mut Vec<T>, item: T, time: impl Fn(&T) -> Timestamp) {
    match series.last_mut() {
        Some(last) if time(last) == time(&item) => *last = item,
        Some(last) => {
            assert!(time(last) < time(&item), "series update out of order");
            series.push(item);
        }
        None => series.push(item),
    }
}

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
