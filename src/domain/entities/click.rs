//! Persisted click record entity.

use chrono::{DateTime, Utc};

use crate::domain::click_event::ClickEvent;

/// Input data for persisting one click record.
///
/// `event_id` is the idempotency key: delivering the same event twice must
/// result in exactly one stored record, so repositories upsert on it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClick {
    pub event_id: String,
    pub link_code: String,
    pub account_id: String,
    pub destination: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub clicked_at: DateTime<Utc>,
}

impl From<&ClickEvent> for NewClick {
    fn from(event: &ClickEvent) -> Self {
        Self {
            event_id: event.id.clone(),
            link_code: event.link_id.clone(),
            account_id: event.account_id.clone(),
            destination: event.destination.clone(),
            country: event.country.clone(),
            latitude: event.latitude,
            longitude: event.longitude,
            clicked_at: event.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_click_from_event() {
        let event = ClickEvent::new(
            "lnk1".to_string(),
            "acct1".to_string(),
            "https://example.com".to_string(),
            "US".to_string(),
            Some(52.52),
            Some(13.405),
        );

        let click = NewClick::from(&event);

        assert_eq!(click.event_id, event.id);
        assert_eq!(click.link_code, "lnk1");
        assert_eq!(click.account_id, "acct1");
        assert_eq!(click.destination, "https://example.com");
        assert_eq!(click.country, "US");
        assert_eq!(click.latitude, Some(52.52));
        assert_eq!(click.longitude, Some(13.405));
        assert_eq!(click.clicked_at, event.timestamp);
    }
}
