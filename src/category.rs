use std::fmt::Display;

/// Direction of the moving average relative to the window one bar earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Bullish,
    Bearish,
    /// No prior window exists yet (the first qualifying bar).
    Neutral,
}

/// Rate-of-change class across the window span.
///
/// Note the naming: [`Weak`](Momentum::Weak) is a *strong move down*, not a
/// faint signal. Only [`Neutral`](Momentum::Neutral) means "inside the
/// threshold".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Momentum {
    /// ROC above the threshold.
    Strong,
    /// `|ROC|` within the threshold.
    Neutral,
    /// ROC below the negated threshold.
    Weak,
}

/// Relative dispersion of closes: `σ / SMA` against the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Volatility {
    High,
    Low,
}

impl Volatility {
    /// Line width used to draw a wave segment.
    #[inline]
    #[must_use]
    pub fn line_width(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Low => 1,
        }
    }
}

/// Trend × momentum collapsed to the seven display classes.
///
/// Any bar without a trend yet maps to [`Neutral`](WaveCategory::Neutral)
/// regardless of momentum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaveCategory {
    BullishStrong,
    BullishNeutral,
    BullishWeak,
    BearishStrong,
    BearishNeutral,
    BearishWeak,
    Neutral,
}

impl WaveCategory {
    #[must_use]
    pub fn of(trend: Trend, momentum: Momentum) -> Self {
        match (trend, momentum) {
            (Trend::Bullish, Momentum::Strong) => Self::BullishStrong,
            (Trend::Bullish, Momentum::Neutral) => Self::BullishNeutral,
            (Trend::Bullish, Momentum::Weak) => Self::BullishWeak,
            (Trend::Bearish, Momentum::Strong) => Self::BearishStrong,
            (Trend::Bearish, Momentum::Neutral) => Self::BearishNeutral,
            (Trend::Bearish, Momentum::Weak) => Self::BearishWeak,
            (Trend::Neutral, _) => Self::Neutral,
        }
    }
}

impl Display for WaveCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::BullishStrong => "bullish-strong",
            Self::BullishNeutral => "bullish-neutral",
            Self::BullishWeak => "bullish-weak",
            Self::BearishStrong => "bearish-strong",
            Self::BearishNeutral => "bearish-neutral",
            Self::BearishWeak => "bearish-weak",
            Self::Neutral => "neutral",
        };
        f.write_str(name)
    }
}

/// Colour per [`WaveCategory`], as CSS hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Palette {
    bullish_strong: &'static str,
    bullish_neutral: &'static str,
    bullish_weak: &'static str,
    bearish_strong: &'static str,
    bearish_neutral: &'static str,
    bearish_weak: &'static str,
    neutral: &'static str,
}

impl Palette {
    /// Bright-to-dark greens and reds with a slate neutral.
    #[must_use]
    pub const fn classic() -> Self {
        Self {
            bullish_strong: "#4ade80",
            bullish_neutral: "#22c55e",
            bullish_weak: "#14532d",
            bearish_strong: "#f87171",
            bearish_neutral: "#ef4444",
            bearish_weak: "#7f1d1d",
            neutral: "#94a3b8",
        }
    }

    #[must_use]
    pub const fn dark() -> Self {
        Self {
            bullish_strong: "#10B981",
            bullish_neutral: "#059669",
            bullish_weak: "#065F46",
            bearish_strong: "#EF4444",
            bearish_neutral: "#DC2626",
            bearish_weak: "#7F1D1D",
            neutral: "#4B5563",
        }
    }

    #[must_use]
    pub const fn light() -> Self {
        Self {
            bullish_strong: "#059669",
            bullish_neutral: "#047857",
            bullish_weak: "#065F46",
            bearish_strong: "#DC2626",
            bearish_neutral: "#B91C1C",
            bearish_weak: "#7F1D1D",
            neutral: "#6B7280",
        }
    }

    #[inline]
    #[must_use]
    pub fn color(&self, category: WaveCategory) -> &'static str {
        match category {
            WaveCategory::BullishStrong => self.bullish_strong,
            WaveCategory::BullishNeutral => self.bullish_neutral,
            WaveCategory::BullishWeak => self.bullish_weak,
            WaveCategory::BearishStrong => self.bearish_strong,
            WaveCategory::BearishNeutral => self.bearish_neutral,
            WaveCategory::BearishWeak => self.bearish_weak,
            WaveCategory::Neutral => self.neutral,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::classic()
    }
}
