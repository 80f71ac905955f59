//! Streaming momentum-trend wave indicator over live-aggregated bars.
//!
//! A [`BarAggregator`] keeps a capped, time-ordered bar sequence fed by
//! paged historical batches and live ticks. A [`WaveEngine`] turns that
//! sequence into [`WavePoint`]s: a windowed moving average coloured by
//! trend and momentum and weighted by volatility.
//!
//! [`WaveChart`] ties both to a market data feed ([`FeedAdapter`]) and a
//! renderer ([`RenderSink`]), handling subscriptions, timeframe switches and
//! debounced loading of older history.
//!
//! Bars accept any type implementing [`Ohlcv`]. The crate emits
//! [`tracing`] events and installs no subscriber.

mod aggregator;
mod bar;
mod category;
mod chart;
mod config;
mod feed;
mod ohlcv;
mod pager;
mod ring_buffer;
mod sink;
mod wave;

pub use crate::aggregator::{BarAggregator, HistoryOutcome, Tick, TickOutcome};
pub use crate::bar::Bar;
pub use crate::category::{Momentum, Palette, Trend, Volatility, WaveCategory};
pub use crate::chart::WaveChart;
pub use crate::config::{ChartConfig, ChartConfigBuilder, Threshold, WaveConfig, WaveConfigBuilder};
pub use crate::feed::{
    Candle, FeedAdapter, FeedError, FeedMessage, FeedRequest, HistoryEnd, SubscriptionId,
};
pub use crate::ohlcv::{Ohlcv, Price, Timestamp};
pub use crate::pager::HistoryPager;
pub use crate::sink::RenderSink;
pub use crate::wave::{WaveEngine, WavePoint};

#[cfg(test)]
mod test_util;
