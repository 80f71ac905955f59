use std::{fmt::Display, num::NonZero};

use serde::{Serialize, Serializer, ser::SerializeStruct};

use tracing::warn;

use crate::{
    BarAggregator, Momentum, Price, TickOutcome, Timestamp, Trend, Volatility, WaveCategory,
    WaveConfig, ring_buffer::RingBuffer,
};

/// One indicator value, aligned with the bar it was computed for.
///
/// Serializes as `{"time", "value", "color", "lineWidth"}`, the per-point
/// styled line shape chart widgets take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavePoint {
    time: Timestamp,
    value: Price,
    trend: Trend,
    momentum: Momentum,
    volatility: Volatility,
    color: &'static str,
}

impl WavePoint {
    /// Time of the source bar.
    #[inline]
    #[must_use]
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// SMA of closes over the window ending at the source bar.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Price {
        self.value
    }

    #[inline]
    #[must_use]
    pub fn trend(&self) -> Trend {
        self.trend
    }

    #[inline]
    #[must_use]
    pub fn momentum(&self) -> Momentum {
        self.momentum
    }

    #[inline]
    #[must_use]
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }

    #[inline]
    #[must_use]
    pub fn category(&self) -> WaveCategory {
        WaveCategory::of(self.trend, self.momentum)
    }

    /// Palette colour of [`category`](Self::category).
    #[inline]
    #[must_use]
    pub fn color(&self) -> &'static str {
        self.color
    }

    #[inline]
    #[must_use]
    pub fn line_width(&self) -> u8 {
        self.volatility.line_width()
    }
}

impl Serialize for WavePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut point = serializer.serialize_struct("WavePoint", 4)?;
        point.serialize_field("time", &self.time)?;
        point.serialize_field("value", &self.value)?;
        point.serialize_field("color", self.color)?;
        point.serialize_field("lineWidth", &self.line_width())?;
        point.end()
    }
}

impl Display for WavePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Wave(t: {}, v: {}, {}, w: {})",
            self.time,
            self.value,
            self.category(),
            self.line_width()
        )
    }
}

/// Momentum-trend wave indicator over an aggregated bar sequence.
///
/// For every bar index `i ≥ window − 1` the trailing window of closes yields:
///
/// ```text
/// value      = SMA(closes)
/// momentum   = ROC = (last − first) / first against the momentum threshold
/// volatility = σ / SMA against the volatility threshold
/// trend      = SMA vs. SMA of the window one bar earlier
/// ```
///
/// Points are held in a buffer aligned index-for-index with the bars (empty
/// during warm-up) so evictions stay in lockstep.
///
/// A full [`recompute`](Self::recompute) and a run of
/// [`update_last`](Self::update_last) calls evaluate each index with the same
/// arithmetic, so both paths agree exactly on the same bar sequence.
#[derive(Clone, Debug)]
pub struct WaveEngine {
    config: WaveConfig,
    points: RingBuffer<Option<WavePoint>>,
}

impl WaveEngine {
    /// `capacity` must match the bar sequence capacity.
    #[must_use]
    pub fn new(config: WaveConfig, capacity: NonZero<usize>) -> Self {
        Self {
            config,
            points: RingBuffer::new(capacity.get()),
        }
    }

    /// Recomputes every qualifying index from scratch, replacing all held
    /// points. Returns the qualifying points oldest first.
    pub fn recompute(&mut self, bars: &BarAggregator) -> Vec<WavePoint> {
        let points: Vec<_> = (0..bars.len()).map(|i| self.point_at(bars, i)).collect();
        self.points.refill(points);

        self.points.iter().flatten().copied().collect()
    }

    /// Recomputes the newest index after `outcome` came back from
    /// [`BarAggregator::ingest_tick`] on `bars`.
    ///
    /// An appended bar gets a fresh slot, evicting the oldest point if the
    /// bar buffer evicted too. A rejected tick changes nothing. If the held
    /// points are not aligned with `bars`, all points are recomputed first.
    /// Returns the newest point when its index qualifies.
    pub fn update_last(
        &mut self,
        bars: &BarAggregator,
        outcome: &TickOutcome,
    ) -> Option<WavePoint> {
        match outcome {
            TickOutcome::Rejected => return None,
            TickOutcome::Updated(_) => {}
            TickOutcome::Appended { .. } => {
                self.points.push(None);
            }
        }

        let last = bars.len().checked_sub(1)?;
        if !self.is_aligned(bars) {
            warn!(
                points = self.points.len(),
                bars = bars.len(),
                "wave points out of step with bars, recomputing"
            );
            self.recompute(bars);
            return self.get(last).copied();
        }

        let point = self.point_at(bars, last)?;
        self.points.replace_last(Some(point));

        Some(point)
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// Qualifying points, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &WavePoint> {
        self.points.iter().flatten()
    }

    /// Point for bar `index`; `None` during warm-up or out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&WavePoint> {
        self.points.get(index)?.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Same length, and the two newest held points belong to their bars.
    fn is_aligned(&self, bars: &BarAggregator) -> bool {
        let len = bars.len();
        len == self.points.len()
            && (len.saturating_sub(2)..len).all(|i| match self.get(i) {
                Some(point) => bars.get(i).is_some_and(|bar| bar.time() == point.time()),
                None => true,
            })
    }

    fn point_at(&self, bars: &BarAggregator, i: usize) -> Option<WavePoint> {
        let window = self.config.window();
        let time = bars.get(i)?.time();
        let start = (i + 1).checked_sub(window)?;

        let stats = WindowStats::of(bars.closes(start..=i), window);

        let trend = match start.checked_sub(1) {
            Some(prev_start) => {
                let prev_sma = WindowStats::sma(bars.closes(prev_start..=i - 1), window);
                if stats.sma > prev_sma {
                    Trend::Bullish
                } else {
                    Trend::Bearish
                }
            }
            None => Trend::Neutral,
        };

        let momentum_threshold = self.config.momentum_threshold().value();
        let momentum = if stats.roc.abs() > momentum_threshold {
            if stats.roc > 0.0 {
                Momentum::Strong
            } else {
                Momentum::Weak
            }
        } else {
            Momentum::Neutral
        };

        let volatility = if stats.relative_dispersion() > self.config.volatility_threshold().value()
        {
            Volatility::High
        } else {
            Volatility::Low
        };

        Some(WavePoint {
            time,
            value: stats.sma,
            trend,
            momentum,
            volatility,
            color: self
                .config
                .palette()
                .color(WaveCategory::of(trend, momentum)),
        })
    }
}

/// Per-window statistics over closes.
#[derive(Debug, Clone, Copy, PartialEq)]
struct WindowStats {
    sma: Price,
    /// Rate of change across the window. `0` when the first close is `0`.
    roc: f64,
    /// Population standard deviation.
    std_dev: f64,
}

impl WindowStats {
    fn of(closes: impl Iterator<Item = Price> + Clone, len: usize) -> Self {
        let sma = Self::sma(closes.clone(), len);

        let mut first = None;
        let mut last = 0.0;
        let mut squared_deviations = 0.0;
        for close in closes {
            first.get_or_insert(close);
            last = close;
            let deviation = close - sma;
            squared_deviations += deviation * deviation;
        }

        let first = first.unwrap_or_default();
        let roc = if first == 0.0 {
            0.0
        } else {
            (last - first) / first
        };

        Self {
            sma,
            roc,
            std_dev: (squared_deviations / Self::count(len)).sqrt(),
        }
    }

    #[inline]
    fn sma(closes: impl Iterator<Item = Price>, len: usize) -> Price {
        closes.sum::<Price>() / Self::count(len)
    }

    /// `σ / SMA`. `0` when the mean is `0`.
    #[inline]
    fn relative_dispersion(&self) -> f64 {
        if self.sma == 0.0 {
            0.0
        } else {
            self.std_dev / self.sma
        }
    }

    #[inline]
    #[allow(clippy::cast_precision_loss)]
    fn count(len: usize) -> f64 {
        len as f64
    }
}
