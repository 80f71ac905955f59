use std::{
    fmt::Display,
    hash::{Hash, Hasher},
    num::NonZero,
    time::Duration,
};

use crate::{Palette, Timestamp};

/// A fractional cutoff such as `0.008` (0.8%).
///
/// Wraps a finite, non-negative `f64`. The constructor panics otherwise.
///
/// Implements `Eq` and `Hash` via bit-level comparison, which is safe because
/// NaN is rejected at construction.
#[derive(Clone, Copy, Debug)]
pub struct Threshold(f64);

impl Threshold {
    /// # Panics
    ///
    /// Panics if `value` is NaN, infinite or negative.
    #[must_use]
    pub fn new(value: f64) -> Self {
        assert!(value.is_finite(), "threshold must be finite");
        assert!(value >= 0.0, "threshold must not be negative");
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Threshold {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Threshold {}

impl Hash for Threshold {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Configuration for the [`WaveEngine`](crate::WaveEngine).
///
/// # Example
///
/// ```
/// use trendwave::{Threshold, WaveConfig};
/// use std::num::NonZero;
///
/// let config = WaveConfig::builder()
///     .window(NonZero::new(14).unwrap())
///     .momentum_threshold(Threshold::new(0.01))
///     .build();
///
/// assert_eq!(config.window(), 14);
/// assert_eq!(config.volatility_threshold().value(), 0.015);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct WaveConfig {
    window: usize,
    momentum_threshold: Threshold,
    volatility_threshold: Threshold,
    palette: Palette,
}

impl WaveConfig {
    #[must_use]
    pub fn builder() -> WaveConfigBuilder {
        WaveConfigBuilder::new()
    }

    /// Default thresholds and palette with a custom window.
    #[must_use]
    pub fn with_window(window: NonZero<usize>) -> Self {
        Self::builder().window(window).build()
    }

    /// Bars per indicator calculation.
    #[inline]
    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// `|ROC|` above this is strong (up) or weak (down) momentum.
    #[inline]
    #[must_use]
    pub fn momentum_threshold(&self) -> Threshold {
        self.momentum_threshold
    }

    /// `σ / SMA` above this is high volatility.
    #[inline]
    #[must_use]
    pub fn volatility_threshold(&self) -> Threshold {
        self.volatility_threshold
    }

    #[inline]
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Display for WaveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WaveConfig({}, {}, {})",
            self.window,
            self.momentum_threshold.value(),
            self.volatility_threshold.value()
        )
    }
}

/// Builder for [`WaveConfig`].
///
/// Defaults: window = 20, momentum threshold = 0.008,
/// volatility threshold = 0.015, palette = [`Palette::classic`].
pub struct WaveConfigBuilder {
    window: usize,
    momentum_threshold: Threshold,
    volatility_threshold: Threshold,
    palette: Palette,
}

impl WaveConfigBuilder {
    fn new() -> Self {
        Self {
            window: 20,
            momentum_threshold: Threshold(0.008),
            volatility_threshold: Threshold(0.015),
            palette: Palette::classic(),
        }
    }

    #[inline]
    #[must_use]
    pub fn window(mut self, window: NonZero<usize>) -> Self {
        self.window = window.get();
        self
    }

    #[inline]
    #[must_use]
    pub fn momentum_threshold(mut self, threshold: Threshold) -> Self {
        self.momentum_threshold = threshold;
        self
    }

    #[inline]
    #[must_use]
    pub fn volatility_threshold(mut self, threshold: Threshold) -> Self {
        self.volatility_threshold = threshold;
        self
    }

    #[inline]
    #[must_use]
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    #[inline]
    #[must_use]
    pub fn build(self) -> WaveConfig {
        WaveConfig {
            window: self.window,
            momentum_threshold: self.momentum_threshold,
            volatility_threshold: self.volatility_threshold,
            palette: self.palette,
        }
    }
}

/// Configuration for a [`WaveChart`](crate::WaveChart).
///
/// # Example
///
/// ```
/// use trendwave::ChartConfig;
/// use std::{num::NonZero, time::Duration};
///
/// let config = ChartConfig::builder()
///     .granularity(NonZero::new(300).unwrap())
///     .max_bars(NonZero::new(1_000).unwrap())
///     .build();
///
/// assert_eq!(config.granularity(), 300);
/// assert_eq!(config.request_cooldown(), Duration::from_millis(500));
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct ChartConfig {
    granularity: NonZero<Timestamp>,
    max_bars: NonZero<usize>,
    wave: WaveConfig,
    request_cooldown: Duration,
    history_count: u32,
    load_more_edge: u32,
}

impl ChartConfig {
    #[must_use]
    pub fn builder() -> ChartConfigBuilder {
        ChartConfigBuilder::new()
    }

    /// Seconds per bar bucket.
    #[inline]
    #[must_use]
    pub fn granularity(&self) -> Timestamp {
        self.granularity.get()
    }

    /// Bar sequence capacity; the oldest bars are evicted beyond it.
    #[inline]
    #[must_use]
    pub fn max_bars(&self) -> usize {
        self.max_bars.get()
    }

    #[inline]
    #[must_use]
    pub fn wave(&self) -> &WaveConfig {
        &self.wave
    }

    /// Minimum delay between a "load older history" trigger and the request.
    #[inline]
    #[must_use]
    pub fn request_cooldown(&self) -> Duration {
        self.request_cooldown
    }

    /// Candles asked for per history request.
    #[inline]
    #[must_use]
    pub fn history_count(&self) -> u32 {
        self.history_count
    }

    /// Older history is requested once the left edge of the visible logical
    /// range comes within this many bars of the first loaded bar.
    #[inline]
    #[must_use]
    pub fn load_more_edge(&self) -> u32 {
        self.load_more_edge
    }

    pub(crate) fn set_granularity(&mut self, granularity: NonZero<Timestamp>) {
        self.granularity = granularity;
    }

    pub(crate) fn bucket(&self) -> NonZero<Timestamp> {
        self.granularity
    }

    pub(crate) fn capacity(&self) -> NonZero<usize> {
        self.max_bars
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Display for ChartConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ChartConfig({}s, {}, {}, {}ms)",
            self.granularity,
            self.max_bars,
            self.wave,
            self.request_cooldown.as_millis()
        )
    }
}

const DEFAULT_GRANULARITY: NonZero<Timestamp> = NonZero::new(60).unwrap();
const DEFAULT_MAX_BARS: NonZero<usize> = NonZero::new(5_000).unwrap();

/// Builder for [`ChartConfig`].
///
/// Defaults: granularity = 60 s, `max_bars` = 5000,
/// wave = [`WaveConfig::default`], cooldown = 500 ms,
/// `history_count` = 500, `load_more_edge` = 50.
pub struct ChartConfigBuilder {
    granularity: NonZero<Timestamp>,
    max_bars: NonZero<usize>,
    wave: WaveConfig,
    request_cooldown: Duration,
    history_count: u32,
    load_more_edge: u32,
}

impl ChartConfigBuilder {
    fn new() -> Self {
        Self {
            granularity: DEFAULT_GRANULARITY,
            max_bars: DEFAULT_MAX_BARS,
            wave: WaveConfig::default(),
            request_cooldown: Duration::from_millis(500),
            history_count: 500,
            load_more_edge: 50,
        }
    }

    #[inline]
    #[must_use]
    pub fn granularity(mut self, seconds: NonZero<Timestamp>) -> Self {
        self.granularity = seconds;
        self
    }

    #[inline]
    #[must_use]
    pub fn max_bars(mut self, max_bars: NonZero<usize>) -> Self {
        self.max_bars = max_bars;
        self
    }

    #[inline]
    #[must_use]
    pub fn wave(mut self, wave: WaveConfig) -> Self {
        self.wave = wave;
        self
    }

    /// A cooldown too long to add to the current time disables paging.
    #[inline]
    #[must_use]
    pub fn request_cooldown(mut self, cooldown: Duration) -> Self {
        self.request_cooldown = cooldown;
        self
    }

    #[inline]
    #[must_use]
    pub fn history_count(mut self, count: NonZero<u32>) -> Self {
        self.history_count = count.get();
        self
    }

    #[inline]
    #[must_use]
    pub fn load_more_edge(mut self, bars: u32) -> Self {
        self.load_more_edge = bars;
        self
    }

    #[inline]
    #[must_use]
    pub fn build(self) -> ChartConfig {
        ChartConfig {
            granularity: self.granularity,
            max_bars: self.max_bars,
            wave: self.wave,
            request_cooldown: self.request_cooldown,
            history_count: self.history_count,
            load_more_edge: self.load_more_edge,
        }
    }
}
