//! Builders for the workflow events handlers and jobs publish.
//!
//! The payload keys here are the ones the notification dispatcher renders.

use clientdesk_db::models::invoice::Invoice;
use clientdesk_db::models::submission::OnboardingSubmission;
use clientdesk_events::{Recipient, WorkflowEvent};
use serde_json::json;

/// Client behind a submission.
pub fn submission_recipient(submission: &OnboardingSubmission) -> Recipient {
    let payload = &submission.form_data.0;
    let phone = payload.form().contact.phone.trim();
    Recipient {
        name: payload.client_name(),
        email: Some(submission.email.clone()),
        phone: (!phone.is_empty()).then(|| phone.to_string()),
    }
}

/// Client billed by an invoice.
pub fn invoice_recipient(invoice: &Invoice) -> Recipient {
    Recipient {
        name: invoice.client_name.clone(),
        email: Some(invoice.client_email.clone()),
        phone: invoice.client_phone.clone().filter(|p| !p.trim().is_empty()),
    }
}

/// `submission.*` and `payment_link.resent` events.
pub fn submission_event(
    event_type: &str,
    submission: &OnboardingSubmission,
    payment_url: Option<&str>,
) -> WorkflowEvent {
    WorkflowEvent::new(event_type)
        .with_source("submission", submission.id)
        .with_recipient(submission_recipient(submission))
        .with_payload(json!({
            "package_name": submission.package_name,
            "amount": submission.package_price,
            "payment_url": payment_url,
            "status": submission.status,
        }))
}

/// `invoice.*` events.
pub fn invoice_event(event_type: &str, invoice: &Invoice) -> WorkflowEvent {
    WorkflowEvent::new(event_type)
        .with_source("invoice", invoice.id)
        .with_recipient(invoice_recipient(invoice))
        .with_payload(json!({
            "invoice_number": invoice.invoice_number,
            "amount_due": invoice.amount_due,
            "amount_paid": invoice.amount_paid,
            "due_date": invoice.due_date.to_string(),
            "payment_link": invoice.payment_link,
            "status": invoice.status,
        }))
}
