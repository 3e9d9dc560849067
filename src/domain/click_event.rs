//! Click event model and queue wire contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A click event as it travels through the delivery queue.
///
/// Created by the redirect handler at click time, delivered at-least-once to
/// the consumer after a fixed delay. The `id` is the idempotency key for
/// persistence: duplicate deliveries of the same id must not produce a second
/// stored record.
///
/// # Design
///
/// - Denormalized: carries the resolved destination and both ids so the
///   consumer never has to re-resolve the link
/// - Immutable after creation
/// - Cloneable for sending across async boundaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub link_id: String,
    #[validate(length(min = 1))]
    pub account_id: String,
    #[validate(url)]
    pub destination: String,
    #[validate(length(equal = 2))]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates a new click event with a fresh event id and the current time.
    pub fn new(
        link_id: String,
        account_id: String,
        destination: String,
        country: String,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            link_id,
            account_id,
            destination,
            country,
            latitude,
            longitude,
            timestamp: Utc::now(),
        }
    }
}

/// Envelope of the producer-to-consumer wire contract.
///
/// Serialized as `{"type": "LINK_CLICK", "data": {..}}`. Unknown `type`
/// values fail deserialization and are rejected at the consumer boundary as
/// fatal, never retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum QueueMessage {
    #[serde(rename = "LINK_CLICK")]
    LinkClick(ClickEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> ClickEvent {
        ClickEvent::new(
            "dAd5d".to_string(),
            "acct-7".to_string(),
            "https://example.com/fallback".to_string(),
            "US".to_string(),
            None,
            None,
        )
    }

    #[test]
    fn test_event_creation_assigns_unique_ids() {
        let a = sample_event();
        let b = sample_event();

        assert_ne!(a.id, b.id);
        assert_eq!(a.link_id, "dAd5d");
        assert_eq!(a.country, "US");
    }

    #[test]
    fn test_wire_format_shape() {
        let mut event = sample_event();
        event.latitude = Some(40.7);
        event.longitude = Some(-74.0);

        let json = serde_json::to_value(QueueMessage::LinkClick(event.clone())).unwrap();

        assert_eq!(json["type"], "LINK_CLICK");
        assert_eq!(json["data"]["id"], event.id.as_str());
        assert_eq!(json["data"]["linkId"], "dAd5d");
        assert_eq!(json["data"]["accountId"], "acct-7");
        assert_eq!(json["data"]["destination"], "https://example.com/fallback");
        assert_eq!(json["data"]["country"], "US");
        assert_eq!(json["data"]["latitude"], 40.7);
        assert_eq!(json["data"]["longitude"], -74.0);
        assert!(json["data"]["timestamp"].is_string());
    }

    #[test]
    fn test_optional_coordinates_are_omitted() {
        let json = serde_json::to_value(QueueMessage::LinkClick(sample_event())).unwrap();

        assert!(json["data"].get("latitude").is_none());
        assert!(json["data"].get("longitude").is_none());
    }

    #[test]
    fn test_round_trip() {
        let message = QueueMessage::LinkClick(sample_event());
        let json = serde_json::to_string(&message).unwrap();
        let parsed: QueueMessage = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, message);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let raw = r#"{"type":"LINK_DELETED","data":{}}"#;

        assert!(serde_json::from_str::<QueueMessage>(raw).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_fields() {
        let mut event = sample_event();
        event.destination = "not a url".to_string();
        assert!(event.validate().is_err());

        let mut event = sample_event();
        event.country = "USA".to_string();
        assert!(event.validate().is_err());

        let mut event = sample_event();
        event.latitude = Some(123.0);
        assert!(event.validate().is_err());

        assert!(sample_event().validate().is_ok());
    }
}
