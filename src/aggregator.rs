use std::{collections::BTreeMap, num::NonZero};

use tracing::{debug, trace};

use crate::{Bar, Ohlcv, Price, Timestamp, ring_buffer::RingBuffer};

/// A single live price update.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    epoch: Timestamp,
    quote: Price,
    symbol: String,
}

impl Tick {
    #[must_use]
    pub fn new(epoch: Timestamp, quote: Price, symbol: impl Into<String>) -> Self {
        Self {
            epoch,
            quote,
            symbol: symbol.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn epoch(&self) -> Timestamp {
        self.epoch
    }

    #[inline]
    #[must_use]
    pub fn quote(&self) -> Price {
        self.quote
    }

    #[inline]
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

/// Result of [`BarAggregator::ingest_history`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    /// The batch was empty: no older data exists.
    Exhausted,
    /// The batch was merged. `evicted` bars were truncated from the front to
    /// stay within capacity.
    Merged { received: usize, evicted: usize },
}

/// Result of [`BarAggregator::ingest_tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Non-finite quote, empty sequence, or a bucket older than the last bar.
    Rejected,
    /// The last bar absorbed the quote.
    Updated(Bar),
    /// A new bucket was opened. `evicted` is the bar dropped to stay within
    /// capacity, if any.
    Appended { bar: Bar, evicted: Option<Bar> },
}

/// Maintains the canonical bar sequence: strictly increasing by time,
/// unique per bucket, and never longer than its capacity.
///
/// Historical batches are merged with last-write-wins per bucket and trimmed
/// from the front. Live ticks fold into the newest bar or open a new one,
/// evicting a single oldest bar when full.
///
/// # Example
///
/// ```
/// use trendwave::{Bar, BarAggregator, Tick, TickOutcome};
/// use std::num::NonZero;
///
/// let mut agg = BarAggregator::new(NonZero::new(60).unwrap(), NonZero::new(100).unwrap());
/// agg.ingest_history([Bar::new(0, 10.0, 12.0, 9.0, 11.0)]);
///
/// let outcome = agg.ingest_tick(&Tick::new(75, 11.5, "R_100"));
/// assert!(matches!(outcome, TickOutcome::Appended { .. }));
/// assert_eq!(agg.last().unwrap().open(), 11.0);
/// ```
#[derive(Clone, Debug)]
pub struct BarAggregator {
    granularity: Timestamp,
    bars: RingBuffer<Bar>,
    earliest_time: Option<Timestamp>,
    history_exhausted: bool,
}

impl BarAggregator {
    #[must_use]
    pub fn new(granularity: NonZero<Timestamp>, max_bars: NonZero<usize>) -> Self {
        Self {
            granularity: granularity.get(),
            bars: RingBuffer::new(max_bars.get()),
            earliest_time: None,
            history_exhausted: false,
        }
    }

    /// Merges a historical batch.
    ///
    /// Records may arrive in any order and may overlap held bars; a record
    /// for a held bucket replaces that bar entirely. An empty batch marks
    /// history as exhausted and changes nothing else.
    pub fn ingest_history<I>(&mut self, batch: I) -> HistoryOutcome
    where
        I: IntoIterator,
        I::Item: Ohlcv,
    {
        let mut merged: BTreeMap<Timestamp, Bar> =
            self.bars.iter().map(|bar| (bar.time(), *bar)).collect();

        let mut received = 0;
        for record in batch {
            let bar = Bar::from_ohlcv(&record);
            self.earliest_time = Some(
                self.earliest_time
                    .map_or(bar.time(), |earliest| earliest.min(bar.time())),
            );
            merged.insert(bar.time(), bar);
            received += 1;
        }

        if received == 0 {
            debug!(len = self.bars.len(), "history exhausted");
            self.history_exhausted = true;
            return HistoryOutcome::Exhausted;
        }

        let evicted = self.bars.refill(merged.into_values());

        debug!(
            received,
            evicted,
            len = self.bars.len(),
            earliest = ?self.earliest_time,
            "merged historical batch"
        );

        HistoryOutcome::Merged { received, evicted }
    }

    /// Folds a live tick into the sequence.
    pub fn ingest_tick(&mut self, tick: &Tick) -> TickOutcome {
        let quote = tick.quote();
        if !quote.is_finite() {
            trace!(epoch = tick.epoch(), quote, "rejected non-finite tick");
            return TickOutcome::Rejected;
        }

        let time = self.bucket_start(tick.epoch());

        let Some(last) = self.bars.last().copied() else {
            trace!(epoch = tick.epoch(), "rejected tick without bucket context");
            return TickOutcome::Rejected;
        };

        if time == last.time() {
            let mut bar = last;
            bar.absorb(quote);
            self.bars.replace_last(bar);

            trace!(time, quote, "updated live bar");
            return TickOutcome::Updated(bar);
        }

        if time < last.time() {
            debug!(time, last = last.time(), "rejected stale tick");
            return TickOutcome::Rejected;
        }

        let bar = Bar::opened_at(time, last.close(), quote);
        let evicted = self.bars.push(bar);

        trace!(time, quote, evicted = evicted.is_some(), "opened live bar");
        TickOutcome::Appended { bar, evicted }
    }

    /// Clears all bars and history bookkeeping and adopts a new granularity.
    /// Old bucket boundaries are meaningless at the new granularity, so
    /// nothing is re-bucketed.
    pub fn reset(&mut self, granularity: NonZero<Timestamp>) {
        self.granularity = granularity.get();
        self.clear();
    }

    /// Drops all bars and history bookkeeping, keeping the granularity.
    pub fn clear(&mut self) {
        self.bars.clear();
        self.earliest_time = None;
        self.history_exhausted = false;
    }

    /// `floor(epoch / granularity) * granularity`.
    #[inline]
    #[must_use]
    pub fn bucket_start(&self, epoch: Timestamp) -> Timestamp {
        epoch / self.granularity * self.granularity
    }

    #[inline]
    #[must_use]
    pub fn granularity(&self) -> Timestamp {
        self.granularity
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Bars oldest first.
    pub fn bars(&self) -> impl DoubleEndedIterator<Item = &Bar> + ExactSizeIterator {
        self.bars.iter()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Earliest bucket time seen in any historical batch since the last
    /// reset: the cursor for requesting older data.
    #[inline]
    #[must_use]
    pub fn earliest_time(&self) -> Option<Timestamp> {
        self.earliest_time
    }

    /// Whether an empty historical batch has been received since the last
    /// reset.
    #[inline]
    #[must_use]
    pub fn is_history_exhausted(&self) -> bool {
        self.history_exhausted
    }

    /// Closes of bars `range`, oldest first.
    pub(crate) fn closes(
        &self,
        range: std::ops::RangeInclusive<usize>,
    ) -> impl Iterator<Item = Price> + Clone {
        self.bars.range(range).map(Bar::close)
    }

    /// The whole sequence as one slice, for wholesale hand-off to a sink.
    pub(crate) fn as_slice(&mut self) -> &[Bar] {
        self.bars.make_contiguous()
    }
}
