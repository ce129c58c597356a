//! Decoding for the event stream.
//!
//! Frames are decoded in two passes: parse to a raw value, read the `stream`
//! tag, then deserialize the `data` payload into the matching type.

use crate::stream::events::{
    AuthorizationMessage, EventKind, ListeningMessage, StreamEvent, StreamUpdate,
};

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON decoding failed.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// The `stream` tag named a stream this client does not know.
    #[error("unknown stream tag: {0}")]
    UnknownStream(String),

    /// The frame has no `stream` tag.
    #[error("frame is missing the stream tag")]
    MissingDiscriminator,

    /// The frame has a `stream` tag but no `data` payload.
    #[error("frame is missing the data payload")]
    MissingData,
}

/// A decoded server frame.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// Authentication acknowledgment.
    Authorization(AuthorizationMessage),
    /// Subscription acknowledgment.
    Listening(ListeningMessage),
    /// A dispatchable event.
    Event(StreamUpdate),
}

/// Decode a text frame into a [`StreamMessage`].
///
/// # Errors
///
/// Returns an error if the frame is not valid JSON, carries no `stream` tag,
/// names an unknown stream, or its payload is missing or does not match the
/// stream's shape.
pub fn decode(text: &str) -> Result<StreamMessage, CodecError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    let tag = value
        .get("stream")
        .and_then(|v| v.as_str())
        .ok_or(CodecError::MissingDiscriminator)?;

    match tag {
        "authorization" => {
            let message: AuthorizationMessage = serde_json::from_value(value)?;
            Ok(StreamMessage::Authorization(message))
        }
        "listening" => {
            let message: ListeningMessage = serde_json::from_value(value)?;
            Ok(StreamMessage::Listening(message))
        }
        "trade_updates" => {
            let data = payload(value)?;
            let update = serde_json::from_value(data)?;
            Ok(StreamMessage::Event(StreamUpdate {
                stream: EventKind::TradeUpdates,
                data: StreamEvent::TradeUpdate(Box::new(update)),
            }))
        }
        "account_updates" => {
            let data = payload(value)?;
            let update = serde_json::from_value(data)?;
            Ok(StreamMessage::Event(StreamUpdate {
                stream: EventKind::AccountUpdates,
                data: StreamEvent::AccountUpdate(update),
            }))
        }
        other => Err(CodecError::UnknownStream(other.to_string())),
    }
}

fn payload(mut value: serde_json::Value) -> Result<serde_json::Value, CodecError> {
    match value.get_mut("data") {
        Some(data) => Ok(data.take()),
        None => Err(CodecError::MissingData),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::events::TradeEventType;

    #[test]
    fn decodes_authorization_frame() {
        let frame = r#"{"stream":"authorization","data":{"status":"authorized","action":"authenticate"}}"#;
        match decode(frame).unwrap() {
            StreamMessage::Authorization(message) => assert!(message.is_authorized()),
            other => panic!("expected authorization, got {other:?}"),
        }
    }

    #[test]
    fn decodes_unauthorized_frame() {
        let frame = r#"{"stream":"authorization","data":{"status":"unauthorized","action":"authenticate"}}"#;
        match decode(frame).unwrap() {
            StreamMessage::Authorization(message) => assert!(!message.is_authorized()),
            other => panic!("expected authorization, got {other:?}"),
        }
    }

    #[test]
    fn decodes_listening_frame() {
        let frame = r#"{"stream":"listening","data":{"streams":["trade_updates"]}}"#;
        match decode(frame).unwrap() {
            StreamMessage::Listening(message) => {
                assert_eq!(message.data.streams, vec!["trade_updates"]);
            }
            other => panic!("expected listening, got {other:?}"),
        }
    }

    #[test]
    fn decodes_trade_update_frame() {
        let frame = r#"{
            "stream": "trade_updates",
            "data": {
                "event": "fill",
                "qty": 15,
                "price": 179.08,
                "timestamp": "2018-10-25T15:30:00Z",
                "order": {
                    "id": "904837e3-3b76-47ec-b432-046db621571b",
                    "asset_id": "904837e3-3b76-47ec-b432-046db621571b",
                    "symbol": "AAPL",
                    "filled_qty": "15",
                    "type": "market",
                    "side": "buy",
                    "time_in_force": "day",
                    "status": "filled"
                }
            }
        }"#;
        match decode(frame).unwrap() {
            StreamMessage::Event(update) => {
                assert_eq!(update.stream, EventKind::TradeUpdates);
                match update.data {
                    StreamEvent::TradeUpdate(trade) => {
                        assert_eq!(trade.event, TradeEventType::Fill);
                        assert_eq!(trade.order.symbol, "AAPL");
                    }
                    other => panic!("expected trade update, got {other:?}"),
                }
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn decodes_account_update_frame() {
        let frame = r#"{
            "stream": "account_updates",
            "data": {
                "id": "904837e3-3b76-47ec-b432-046db621571b",
                "status": "ACTIVE",
                "currency": "USD",
                "cash": "1000.00"
            }
        }"#;
        match decode(frame).unwrap() {
            StreamMessage::Event(update) => {
                assert_eq!(update.stream, EventKind::AccountUpdates);
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_stream_tag() {
        let frame = r#"{"stream":"quotes","data":{}}"#;
        assert!(matches!(
            decode(frame).unwrap_err(),
            CodecError::UnknownStream(tag) if tag == "quotes"
        ));
    }

    #[test]
    fn rejects_missing_data_payload() {
        let frame = r#"{"stream":"trade_updates"}"#;
        assert!(matches!(
            decode(frame).unwrap_err(),
            CodecError::MissingData
        ));
    }

    #[test]
    fn rejects_missing_stream_tag() {
        let frame = r#"{"data":{}}"#;
        assert!(matches!(
            decode(frame).unwrap_err(),
            CodecError::MissingDiscriminator
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(decode("not json").unwrap_err(), CodecError::Json(_)));
    }
}
