//! Workflow events and outbound client notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`WorkflowEvent`]: the event envelope published by request handlers
//!   and background jobs.
//! - [`delivery`]: outbound channels (SMTP email, SMS gateway).
//! - [`NotificationDispatcher`]: subscribes to the bus and turns events that
//!   carry a recipient into fire-and-forget email/SMS sends.

pub mod bus;
pub mod delivery;
pub mod dispatcher;

pub use bus::{event_types, EventBus, Recipient, WorkflowEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::sms::{SmsConfig, SmsDelivery};
pub use dispatcher::NotificationDispatcher;
