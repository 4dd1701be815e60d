//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.
//! Publishing never blocks and never fails the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event names published by the service.
pub mod event_types {
    pub const SUBMISSION_CREATED: &str = "submission.created";
    pub const SUBMISSION_PAID: &str = "submission.paid";
    pub const PAYMENT_LINK_RESENT: &str = "payment_link.resent";
    pub const INVOICE_SENT: &str = "invoice.sent";
    pub const INVOICE_PAID: &str = "invoice.paid";
    pub const INVOICE_OVERDUE: &str = "invoice.overdue";
}

// ---------------------------------------------------------------------------
// WorkflowEvent
// ---------------------------------------------------------------------------

/// Who a notification about this event should reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Something that happened in the onboarding or billing workflow.
///
/// Built with [`WorkflowEvent::new`] and the `with_*` builder methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEvent {
    /// Dot-separated event name, one of [`event_types`].
    pub event_type: String,

    /// Source entity kind, e.g. `"submission"` or `"invoice"`.
    pub source_entity_type: Option<String>,

    /// Source entity id as text (submissions use UUIDs, invoices integers).
    pub source_entity_id: Option<String>,

    /// Client to notify, when the event warrants a notification.
    pub recipient: Option<Recipient>,

    /// Event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl WorkflowEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            recipient: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: impl ToString) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id.to_string());
        self
    }

    pub fn with_recipient(mut self, recipient: Recipient) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// `"<entity_type>:<id>"`, used to correlate delivery logs.
    pub fn correlation(&self) -> String {
        format!(
            "{}:{}",
            self.source_entity_type.as_deref().unwrap_or("unknown"),
            self.source_entity_id.as_deref().unwrap_or("-")
        )
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use clientdesk_events::bus::{EventBus, WorkflowEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(WorkflowEvent::new("submission.created"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<WorkflowEvent>,
}

impl EventBus {
    /// When the buffer is full the oldest events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped if there are none.
    pub fn publish(&self, event: WorkflowEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            WorkflowEvent::new(event_types::INVOICE_SENT)
                .with_source("invoice", 42)
                .with_recipient(Recipient {
                    name: "Silva Dental".into(),
                    email: Some("ana@silva.example".into()),
                    phone: None,
                })
                .with_payload(serde_json::json!({"invoice_number": "INV-2026-00001"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "invoice.sent");
        assert_eq!(received.source_entity_id.as_deref(), Some("42"));
        assert_eq!(received.correlation(), "invoice:42");
        assert_eq!(received.payload["invoice_number"], "INV-2026-00001");
        assert!(received.recipient.is_some());
    }

    #[tokio::test]
    async fn every_subscriber_sees_each_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(WorkflowEvent::new(event_types::SUBMISSION_PAID));

        assert_eq!(rx1.recv().await.unwrap().event_type, "submission.paid");
        assert_eq!(rx2.recv().await.unwrap().event_type, "submission.paid");
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        EventBus::default().publish(WorkflowEvent::new("orphan.event"));
    }

    #[test]
    fn bare_event_has_no_source_or_recipient() {
        let event = WorkflowEvent::new("bare.event");
        assert!(event.source_entity_type.is_none());
        assert!(event.recipient.is_none());
        assert!(event.payload.is_object());
        assert_eq!(event.correlation(), "unknown:-");
    }
}
