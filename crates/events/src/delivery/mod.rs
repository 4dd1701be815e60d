//! Outbound notification channels.
//!
//! Each channel makes exactly one attempt per message. Failures are
//! returned to the caller to log; nothing here retries.

pub mod email;
pub mod sms;

/// A rendered message for one recipient on one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// `"<entity_type>:<id>"` of the record the message is about.
    pub reference: String,
}
