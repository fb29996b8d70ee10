//! Order-change events
//!
//! The order back office announces changes over an explicit channel
//! instead of a global listener registry. The event taxonomy mirrors the
//! webhook payloads (`order:updated`, `order:deleted`).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OrderEvent {
    #[serde(rename = "order:updated")]
    Updated { code: String },
    #[serde(rename = "order:deleted")]
    Deleted { code: String },
}

/// Broadcast pub/sub for [`OrderEvent`]. Publishing with no live
/// subscriber is a no-op, not an error.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<OrderEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Returns the number of subscribers the event reached.
    pub fn publish(&self, event: OrderEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let reached = bus.publish(OrderEvent::Updated { code: "ORD-001".into() });
        assert_eq!(reached, 1);
        assert_eq!(rx.recv().await.unwrap(), OrderEvent::Updated { code: "ORD-001".into() });
    }

    #[test]
    fn test_publish_without_subscriber_is_noop() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(OrderEvent::Deleted { code: "X".into() }), 0);
    }

    #[test]
    fn test_webhook_payload_shape() {
        let event: OrderEvent =
            serde_json::from_str(r#"{"type":"order:deleted","code":"ORD-009"}"#).unwrap();
        assert_eq!(event, OrderEvent::Deleted { code: "ORD-009".into() });
    }
}
