//! Event-to-notification dispatch.
//!
//! [`NotificationDispatcher`] subscribes to the event bus and, for each event
//! carrying a [`Recipient`](crate::bus::Recipient), renders messages with
//! [`compose`] and hands each to its channel on a detached task. Delivery
//! failures are logged with the event's correlation reference and never
//! retried. Request handlers only ever publish, so a slow or failing
//! channel can never hold up the workflow.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::bus::{event_types, WorkflowEvent};
use crate::delivery::email::EmailDelivery;
use crate::delivery::sms::SmsDelivery;
use crate::delivery::OutboundMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }
}

/// A message routed to one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: Channel,
    pub message: OutboundMessage,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render minor currency units as `major.minor`, e.g. `9950` → `99.50`.
pub fn format_amount(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

fn text<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(Value::as_str).unwrap_or("")
}

fn amount(payload: &Value, key: &str) -> String {
    payload
        .get(key)
        .and_then(Value::as_i64)
        .map(format_amount)
        .unwrap_or_default()
}

/// Subject and body for an event, plus whether it also goes out by SMS.
fn render(event: &WorkflowEvent, name: &str) -> Option<(String, String, bool)> {
    let p = &event.payload;
    let rendered = match event.event_type.as_str() {
        event_types::SUBMISSION_CREATED | event_types::PAYMENT_LINK_RESENT => (
            format!("Complete your {} signup", text(p, "package_name")),
            format!(
                "Hi {name},\n\nThanks for completing onboarding. Your {} package comes to {}.\n\
                 Pay securely here: {}\n",
                text(p, "package_name"),
                amount(p, "amount"),
                text(p, "payment_url"),
            ),
            event.event_type == event_types::PAYMENT_LINK_RESENT,
        ),
        event_types::SUBMISSION_PAID => (
            "Payment received".to_string(),
            format!(
                "Hi {name},\n\nWe received your payment of {} for the {} package. \
                 Welcome aboard!\n",
                amount(p, "amount"),
                text(p, "package_name"),
            ),
            false,
        ),
        event_types::INVOICE_SENT => (
            format!("Invoice {}", text(p, "invoice_number")),
            format!(
                "Hi {name},\n\nInvoice {} for {} is due on {}.\n{}",
                text(p, "invoice_number"),
                amount(p, "amount_due"),
                text(p, "due_date"),
                pay_line(p),
            ),
            true,
        ),
        event_types::INVOICE_OVERDUE => (
            format!("Invoice {} is overdue", text(p, "invoice_number")),
            format!(
                "Hi {name},\n\nInvoice {} for {} was due on {} and is now overdue.\n{}",
                text(p, "invoice_number"),
                amount(p, "amount_due"),
                text(p, "due_date"),
                pay_line(p),
            ),
            true,
        ),
        event_types::INVOICE_PAID => (
            format!("Receipt for invoice {}", text(p, "invoice_number")),
            format!(
                "Hi {name},\n\nThank you. We received {} for invoice {}.\n",
                amount(p, "amount_paid"),
                text(p, "invoice_number"),
            ),
            false,
        ),
        _ => return None,
    };
    Some(rendered)
}

fn pay_line(payload: &Value) -> String {
    match payload.get("payment_link").and_then(Value::as_str) {
        Some(link) if !link.is_empty() => format!("Pay online: {link}\n"),
        _ => String::new(),
    }
}

/// Messages to send for an event. Empty when the event has no recipient,
/// no reachable address, or is not a client-facing event.
pub fn compose(event: &WorkflowEvent) -> Vec<Notification> {
    let Some(recipient) = &event.recipient else {
        return Vec::new();
    };
    let Some((subject, body, also_sms)) = render(event, &recipient.name) else {
        return Vec::new();
    };
    let reference = event.correlation();

    let mut out = Vec::new();
    if let Some(email) = recipient.email.as_deref().filter(|e| !e.is_empty()) {
        out.push(Notification {
            channel: Channel::Email,
            message: OutboundMessage {
                to: email.to_string(),
                subject: subject.clone(),
                body: body.clone(),
                reference: reference.clone(),
            },
        });
    }
    if also_sms {
        if let Some(phone) = recipient.phone.as_deref().filter(|p| !p.is_empty()) {
            out.push(Notification {
                channel: Channel::Sms,
                message: OutboundMessage {
                    to: phone.to_string(),
                    subject,
                    body,
                    reference,
                },
            });
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Fans workflow events out to the configured delivery channels.
pub struct NotificationDispatcher {
    email: Option<Arc<EmailDelivery>>,
    sms: Option<Arc<SmsDelivery>>,
}

impl NotificationDispatcher {
    /// Either channel may be absent; its messages are then skipped.
    pub fn new(email: Option<EmailDelivery>, sms: Option<SmsDelivery>) -> Self {
        Self {
            email: email.map(Arc::new),
            sms: sms.map(Arc::new),
        }
    }

    /// Run until the [`EventBus`](crate::bus::EventBus) is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<WorkflowEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.dispatch(&event);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Spawn one send per composed notification. Returns the number spawned.
    pub fn dispatch(&self, event: &WorkflowEvent) -> usize {
        let mut spawned = 0;
        for Notification { channel, message } in compose(event) {
            match channel {
                Channel::Email => {
                    let Some(email) = &self.email else {
                        tracing::debug!(reference = %message.reference, "Email disabled, skipping");
                        continue;
                    };
                    let email = Arc::clone(email);
                    tokio::spawn(async move {
                        if let Err(e) = email.send(&message).await {
                            log_failure(channel, &message, &e);
                        }
                    });
                }
                Channel::Sms => {
                    let Some(sms) = &self.sms else {
                        tracing::debug!(reference = %message.reference, "SMS disabled, skipping");
                        continue;
                    };
                    let sms = Arc::clone(sms);
                    tokio::spawn(async move {
                        if let Err(e) = sms.send(&message).await {
                            log_failure(channel, &message, &e);
                        }
                    });
                }
            }
            spawned += 1;
        }
        spawned
    }
}

fn log_failure(channel: Channel, message: &OutboundMessage, error: &dyn std::fmt::Display) {
    tracing::error!(
        channel = channel.as_str(),
        to = %message.to,
        reference = %message.reference,
        error = %error,
        "Notification delivery failed"
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{EventBus, Recipient};

    fn recipient(phone: Option<&str>) -> Recipient {
        Recipient {
            name: "Ana Silva".into(),
            email: Some("ana@silva.example".into()),
            phone: phone.map(str::to_string),
        }
    }

    fn invoice_event(kind: &str, phone: Option<&str>) -> WorkflowEvent {
        WorkflowEvent::new(kind)
            .with_source("invoice", 7)
            .with_recipient(recipient(phone))
            .with_payload(serde_json::json!({
                "invoice_number": "INV-2026-00007",
                "amount_due": 120000,
                "amount_paid": 0,
                "due_date": "2026-11-01",
                "payment_link": "https://pay.example/i/7",
            }))
    }

    #[test]
    fn formats_minor_units() {
        assert_eq!(format_amount(9950), "99.50");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(-120), "-1.20");
    }

    #[test]
    fn event_without_recipient_sends_nothing() {
        let event = WorkflowEvent::new(event_types::INVOICE_SENT).with_source("invoice", 1);
        assert!(compose(&event).is_empty());
    }

    #[test]
    fn unknown_event_sends_nothing() {
        let event = WorkflowEvent::new("invoice.archived").with_recipient(recipient(None));
        assert!(compose(&event).is_empty());
    }

    #[test]
    fn invoice_sent_goes_to_email_and_sms() {
        let out = compose(&invoice_event(event_types::INVOICE_SENT, Some("+15550100")));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].channel, Channel::Email);
        assert_eq!(out[0].message.subject, "Invoice INV-2026-00007");
        assert!(out[0].message.body.contains("1200.00"));
        assert!(out[0].message.body.contains("https://pay.example/i/7"));
        assert_eq!(out[0].message.reference, "invoice:7");
        assert_eq!(out[1].channel, Channel::Sms);
        assert_eq!(out[1].message.to, "+15550100");
    }

    #[test]
    fn receipts_are_email_only() {
        let out = compose(&invoice_event(event_types::INVOICE_PAID, Some("+15550100")));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].channel, Channel::Email);
    }

    #[test]
    fn submission_created_carries_payment_url() {
        let event = WorkflowEvent::new(event_types::SUBMISSION_CREATED)
            .with_source("submission", "abc")
            .with_recipient(recipient(None))
            .with_payload(serde_json::json!({
                "package_name": "Growth",
                "amount": 9950,
                "payment_url": "http://localhost:5173/pay?amount=9950",
            }));
        let out = compose(&event);
        assert_eq!(out.len(), 1);
        assert!(out[0].message.body.contains("amount=9950"));
        assert!(out[0].message.body.contains("99.50"));
        assert_eq!(out[0].message.reference, "submission:abc");
    }

    #[tokio::test]
    async fn disabled_channels_spawn_nothing() {
        let dispatcher = NotificationDispatcher::new(None, None);
        let spawned =
            dispatcher.dispatch(&invoice_event(event_types::INVOICE_OVERDUE, Some("+15550100")));
        assert_eq!(spawned, 0);
    }

    #[tokio::test]
    async fn run_exits_when_bus_is_dropped() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        let handle = tokio::spawn(NotificationDispatcher::new(None, None).run(rx));

        bus.publish(invoice_event(event_types::INVOICE_SENT, None));
        drop(bus);

        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("dispatcher should stop")
            .unwrap();
    }
}
