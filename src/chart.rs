use std::{num::NonZero, time::Instant};

use tracing::{debug, trace, warn};

use crate::{
    Bar, BarAggregator, ChartConfig, FeedAdapter, FeedError, FeedMessage, FeedRequest,
    HistoryEnd, HistoryOutcome, HistoryPager, RenderSink, SubscriptionId, Tick, TickOutcome,
    Timestamp, WaveEngine, WavePoint,
    feed::Candle,
};

/// One symbol's chart: owns the bar sequence and the wave indicator, talks
/// to the feed through a [`FeedAdapter`] and pushes every change into a
/// [`RenderSink`].
///
/// The chart is event-driven and never blocks. Feed frames go in through
/// [`handle_text`](Self::handle_text) (or [`ingest`](Self::ingest) when
/// already decoded), scroll events through
/// [`on_visible_range`](Self::on_visible_range), and the caller drives the
/// history pager with [`poll`](Self::poll).
///
/// At most one history request is in flight at a time.
///
/// # Example
///
/// ```
/// use trendwave::{
///     Bar, ChartConfig, FeedAdapter, FeedError, FeedRequest, RenderSink, WaveChart, WavePoint,
/// };
///
/// #[derive(Default)]
/// struct Outbox(Vec<FeedRequest>);
///
/// impl FeedAdapter for Outbox {
///     fn send(&mut self, request: FeedRequest) -> Result<(), FeedError> {
///         self.0.push(request);
///         Ok(())
///     }
/// }
///
/// #[derive(Default)]
/// struct Screen(usize);
///
/// impl RenderSink for Screen {
///     fn set_full_data(&mut self, bars: &[Bar]) {
///         self.0 = bars.len();
///     }
///     fn append_or_update_bar(&mut self, _: &Bar) {}
///     fn set_full_indicator(&mut self, _: &[WavePoint]) {}
///     fn append_or_update_point(&mut self, _: &WavePoint) {}
/// }
///
/// let mut chart = WaveChart::new("R_100", ChartConfig::default(), Outbox::default(), Screen::default());
/// chart.on_open();
/// assert_eq!(chart.feed().0.len(), 2);
///
/// chart.handle_text(r#"{"msg_type":"candles","candles":[
///     {"epoch":0,"open":1,"high":1,"low":1,"close":1},
///     {"epoch":60,"open":1,"high":2,"low":1,"close":2}
/// ]}"#);
/// assert_eq!(chart.sink().0, 2);
/// assert!(!chart.is_loading());
/// ```
#[derive(Debug)]
pub struct WaveChart<F, S> {
    symbol: String,
    config: ChartConfig,
    aggregator: BarAggregator,
    engine: WaveEngine,
    pager: HistoryPager,
    subscription_id: Option<SubscriptionId>,
    loading: bool,
    feed: F,
    sink: S,
}

impl<F: FeedAdapter, S: RenderSink> WaveChart<F, S> {
    #[must_use]
    pub fn new(symbol: impl Into<String>, config: ChartConfig, feed: F, sink: S) -> Self {
        Self {
            symbol: symbol.into(),
            aggregator: BarAggregator::new(config.bucket(), config.capacity()),
            engine: WaveEngine::new(*config.wave(), config.capacity()),
            pager: HistoryPager::new(config.request_cooldown(), config.load_more_edge()),
            config,
            subscription_id: None,
            loading: false,
            feed,
            sink,
        }
    }

    /// The feed connection is up: load the latest history and subscribe to
    /// live ticks.
    pub fn on_open(&mut self) {
        debug!(symbol = %self.symbol, "feed connected");
        self.request_history(HistoryEnd::Latest);
        self.subscribe();
    }

    pub fn on_close(&mut self) {
        debug!(symbol = %self.symbol, loading = self.loading, "feed closed");
        self.loading = false;
    }

    pub fn on_error(&mut self, error: &FeedError) {
        warn!(symbol = %self.symbol, %error, "feed error");
        self.loading = false;
    }

    /// Decodes and applies one raw feed frame. Malformed frames and feed
    /// errors are logged and end any in-flight history request.
    pub fn handle_text(&mut self, text: &str) {
        match FeedMessage::decode(text) {
            Ok(Some(message)) => self.ingest(message),
            Ok(None) => trace!("ignored feed frame"),
            Err(error) => self.on_error(&error),
        }
    }

    pub fn ingest(&mut self, message: FeedMessage) {
        match message {
            FeedMessage::HistoricalBatch {
                candles,
                subscription,
            } => self.ingest_history(candles, subscription),
            FeedMessage::LiveTick { tick, subscription } => self.ingest_tick(&tick, subscription),
        }
    }

    /// Switches to a new bar granularity, discarding everything loaded.
    ///
    /// Returns `false` without doing anything while a history request is in
    /// flight or when the granularity is unchanged.
    pub fn set_timeframe(&mut self, granularity: NonZero<Timestamp>) -> bool {
        if self.loading || granularity == self.config.bucket() {
            return false;
        }

        debug!(
            symbol = %self.symbol,
            from = self.config.granularity(),
            to = granularity.get(),
            "changing timeframe"
        );

        self.forget();
        self.pager.cancel();
        self.config.set_granularity(granularity);
        self.aggregator.reset(granularity);
        self.engine.clear();
        self.sink.set_full_data(&[]);
        self.sink.set_full_indicator(&[]);

        self.request_history(HistoryEnd::Latest);
        self.subscribe();
        true
    }

    /// Feeds the left edge of the visible logical range. Returns `true` when
    /// a request for older history is now scheduled.
    pub fn on_visible_range(&mut self, from: f64, now: Instant) -> bool {
        if self.loading || self.aggregator.is_history_exhausted() {
            return false;
        }

        let scheduled = self.pager.on_visible_range(from, now);
        if scheduled {
            trace!(from, "scheduled history page");
        }
        scheduled
    }

    /// Sends the scheduled history page request once it is due. Returns
    /// `true` when a request went out.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.pager.poll(now) {
            return false;
        }

        if self.aggregator.is_history_exhausted() {
            return false;
        }

        let end = self
            .aggregator
            .earliest_time()
            .map_or(HistoryEnd::Latest, HistoryEnd::At);
        self.request_history(end)
    }

    /// Unsubscribes and drops all loaded data.
    pub fn shutdown(&mut self) {
        debug!(symbol = %self.symbol, bars = self.aggregator.len(), "shutting down");

        self.forget();
        self.pager.cancel();
        self.aggregator.clear();
        self.engine.clear();
        self.loading = false;
    }

    #[inline]
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Bars oldest first.
    pub fn bars(&self) -> impl DoubleEndedIterator<Item = &Bar> + ExactSizeIterator {
        self.aggregator.bars()
    }

    /// Qualifying wave points, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &WavePoint> {
        self.engine.points()
    }

    /// Wave point for bar `index`, if that bar has a full window behind it.
    #[inline]
    #[must_use]
    pub fn point(&self, index: usize) -> Option<&WavePoint> {
        self.engine.get(index)
    }

    #[inline]
    #[must_use]
    pub fn subscription_id(&self) -> Option<&SubscriptionId> {
        self.subscription_id.as_ref()
    }

    /// Whether a history request is in flight.
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[inline]
    #[must_use]
    pub fn is_history_exhausted(&self) -> bool {
        self.aggregator.is_history_exhausted()
    }

    #[inline]
    #[must_use]
    pub fn earliest_time(&self) -> Option<Timestamp> {
        self.aggregator.earliest_time()
    }

    #[inline]
    #[must_use]
    pub fn feed(&self) -> &F {
        &self.feed
    }

    #[inline]
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn ingest_history(&mut self, candles: Vec<Candle>, subscription: Option<SubscriptionId>) {
        self.loading = false;
        self.remember(subscription);

        match self.aggregator.ingest_history(candles) {
            HistoryOutcome::Exhausted => {
                self.pager.cancel();
            }
            HistoryOutcome::Merged { .. } => {
                self.sink.set_full_data(self.aggregator.as_slice());
                let points = self.engine.recompute(&self.aggregator);
                self.sink.set_full_indicator(&points);
            }
        }
    }

    fn ingest_tick(&mut self, tick: &Tick, subscription: Option<SubscriptionId>) {
        if tick.symbol() != self.symbol {
            trace!(symbol = tick.symbol(), "ignored tick for another symbol");
            return;
        }
        self.remember(subscription);

        let outcome = self.aggregator.ingest_tick(tick);
        match outcome {
            TickOutcome::Rejected => return,
            TickOutcome::Updated(bar) | TickOutcome::Appended { bar, .. } => {
                self.sink.append_or_update_bar(&bar);
            }
        }

        if let Some(point) = self.engine.update_last(&self.aggregator, &outcome) {
            self.sink.append_or_update_point(&point);
        }
    }

    fn remember(&mut self, subscription: Option<SubscriptionId>) {
        if let Some(id) = subscription {
            if self.subscription_id.as_ref() != Some(&id) {
                debug!(subscription = %id, "stream subscription");
            }
            self.subscription_id = Some(id);
        }
    }

    fn request_history(&mut self, end: HistoryEnd) -> bool {
        if self.loading {
            debug!(?end, "history request already in flight");
            return false;
        }

        let request = FeedRequest::history(
            &self.symbol,
            self.config.granularity(),
            self.config.history_count(),
            end,
        );

        self.loading = self.send(request);
        self.loading
    }

    fn subscribe(&mut self) {
        let request = FeedRequest::subscribe(&self.symbol);
        self.send(request);
    }

    fn forget(&mut self) {
        if let Some(id) = self.subscription_id.take() {
            self.send(FeedRequest::forget(id));
        }
    }

    fn send(&mut self, request: FeedRequest) -> bool {
        debug!(?request, "sending feed request");
        match self.feed.send(request) {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "feed request failed");
                false
            }
        }
    }
}
