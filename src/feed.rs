//! Wire shapes exchanged with the market data feed.
//!
//! The transport itself (connection, auth, reconnects) lives behind
//! [`FeedAdapter`]. This module only knows the JSON frames the chart reads
//! and writes.

use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::{Ohlcv, Price, Tick, Timestamp};

/// Errors surfaced by the feed boundary.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A frame was not valid JSON or did not match the expected shape.
    #[error("malformed feed frame")]
    Decode(#[from] serde_json::Error),

    /// The feed answered with an error object.
    #[error("feed error {code}: {message}")]
    Api { code: String, message: String },

    /// The transport is not connected.
    #[error("feed is not connected")]
    Disconnected,

    /// The transport failed to deliver a request.
    #[error("failed to send request: {0}")]
    Send(String),
}

/// Opaque stream subscription handle, echoed back verbatim to cancel it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One historical record as sent by the feed. Prices may arrive as JSON
/// numbers or numeric strings; `"NaN"` and `"inf"` are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Candle {
    pub epoch: Timestamp,
    #[serde(deserialize_with = "flexible_price")]
    pub open: Price,
    #[serde(deserialize_with = "flexible_price")]
    pub high: Price,
    #[serde(deserialize_with = "flexible_price")]
    pub low: Price,
    #[serde(deserialize_with = "flexible_price")]
    pub close: Price,
}

impl Ohlcv for Candle {
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
        self.epoch
    }
}

/// A decoded inbound frame the chart acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    HistoricalBatch {
        candles: Vec<Candle>,
        subscription: Option<SubscriptionId>,
    },
    LiveTick {
        tick: Tick,
        subscription: Option<SubscriptionId>,
    },
}

impl FeedMessage {
    /// Decodes one text frame.
    ///
    /// Returns `Ok(None)` for message types the chart does not consume.
    ///
    /// # Errors
    ///
    /// [`FeedError::Api`] when the frame carries an `error` object,
    /// [`FeedError::Decode`] when it is not valid JSON, a `candles`/`tick`
    /// frame is missing its payload, or a price is not finite.
    pub fn decode(text: &str) -> Result<Option<Self>, FeedError> {
        let frame: Frame = serde_json::from_str(text)?;

        if let Some(error) = frame.error {
            return Err(FeedError::Api {
                code: error.code,
                message: error.message,
            });
        }

        let subscription = frame.subscription.map(|s| s.id);

        let message = match frame.msg_type.as_deref() {
            Some("candles") => Self::HistoricalBatch {
                candles: frame.candles.ok_or_else(|| missing("candles"))?,
                subscription,
            },
            Some("tick") => {
                let tick = frame.tick.ok_or_else(|| missing("tick"))?;
                Self::LiveTick {
                    tick: Tick::new(tick.epoch, tick.quote, tick.symbol),
                    subscription,
                }
            }
            _ => return Ok(None),
        };

        Ok(Some(message))
    }
}

fn missing(field: &'static str) -> FeedError {
    FeedError::Decode(serde::de::Error::missing_field(field))
}

#[derive(Deserialize)]
struct Frame {
    msg_type: Option<String>,
    error: Option<ApiError>,
    candles: Option<Vec<Candle>>,
    tick: Option<WireTick>,
    subscription: Option<WireSubscription>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct WireTick {
    epoch: Timestamp,
    #[serde(deserialize_with = "flexible_price")]
    quote: Price,
    #[serde(default)]
    symbol: String,
}

#[derive(Deserialize)]
struct WireSubscription {
    id: SubscriptionId,
}

fn flexible_price<'de, D>(deserializer: D) -> Result<Price, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(Price),
        String(String),
    }

    let value: Price = match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => value,
        NumberOrString::String(text) => text.trim().parse().map_err(serde::de::Error::custom)?,
    };

    if !value.is_finite() {
        return Err(serde::de::Error::custom(format_args!(
            "price must be finite, got {value}"
        )));
    }

    Ok(value)
}

/// Where a history request should end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEnd {
    /// The most recent candle.
    Latest,
    /// Candles up to this epoch: used to page further back.
    At(Timestamp),
}

impl Serialize for HistoryEnd {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Latest => serializer.serialize_str("latest"),
            Self::At(epoch) => serializer.serialize_u64(*epoch),
        }
    }
}

/// An outbound request frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FeedRequest {
    /// `{"ticks_history": .., "style": "candles", ..}`
    History {
        ticks_history: String,
        style: &'static str,
        adjust_start_time: u8,
        count: u32,
        granularity: Timestamp,
        end: HistoryEnd,
    },
    /// `{"ticks": .., "subscribe": 1}`
    Subscribe { ticks: String, subscribe: u8 },
    /// `{"forget": ..}`
    Forget { forget: SubscriptionId },
}

impl FeedRequest {
    #[must_use]
    pub fn history(symbol: &str, granularity: Timestamp, count: u32, end: HistoryEnd) -> Self {
        Self::History {
            ticks_history: symbol.to_owned(),
            style: "candles",
            adjust_start_time: 1,
            count,
            granularity,
            end,
        }
    }

    #[must_use]
    pub fn subscribe(symbol: &str) -> Self {
        Self::Subscribe {
            ticks: symbol.to_owned(),
            subscribe: 1,
        }
    }

    #[must_use]
    pub fn forget(subscription: SubscriptionId) -> Self {
        Self::Forget {
            forget: subscription,
        }
    }

    /// # Errors
    ///
    /// Propagates serializer failures; the request shapes themselves always
    /// serialize.
    pub fn to_json(&self) -> Result<String, FeedError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Transport seam. The chart hands every outbound request to its adapter
/// and never manages the connection itself.
pub trait FeedAdapter {
    /// # Errors
    ///
    /// Implementations report a closed transport as
    /// [`FeedError::Disconnected`] and delivery failures as
    /// [`FeedError::Send`].
    fn send(&mut self, request: FeedRequest) -> Result<(), FeedError>;
}
