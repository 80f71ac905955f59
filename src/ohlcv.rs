/// Quote or OHLC price, in the instrument's quote currency.
pub type Price = f64;

/// Bucket start time in epoch seconds.
///
/// Unique key of a [`Bar`](crate::Bar) within a bar sequence.
pub type Timestamp = u64;

/// OHLC record accepted as historical input.
///
/// Implement this on your own candle type to hand historical batches to
/// [`BarAggregator::ingest_history`](crate::BarAggregator::ingest_history)
/// without converting them first.
///
/// # Example
///
/// ```
/// use trendwave::{Ohlcv, Price, Timestamp};
///
/// struct MyCandle {
///     o: f64, h: f64, l: f64, c: f64,
///     epoch: u64,
/// }
///
/// impl Ohlcv for MyCandle {
///     fn open(&self) -> Price { self.o }
///     fn high(&self) -> Price { self.h }
///     fn low(&self) -> Price { self.l }
///     fn close(&self) -> Price { self.c }
///     fn open_time(&self) -> Timestamp { self.epoch }
/// }
/// ```
pub trait Ohlcv {
    /// Opening price of the bucket.
    fn open(&self) -> Price;

    /// Highest price during the bucket.
    fn high(&self) -> Price;

    /// Lowest price during the bucket.
    fn low(&self) -> Price;

    /// Closing (or latest) price of the bucket.
    fn close(&self) -> Price;

    /// Bucket start time in epoch seconds.
    ///
    /// Historical records are keyed by this value: a record whose
    /// `open_time` is already held replaces the held bar.
    fn open_time(&self) -> Timestamp;
}
