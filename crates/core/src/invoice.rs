//! Invoice lifecycle and amount rules.
//!
//! ```text
//! draft ──► sent ──► paid
//!   │        │  ╲
//!   │        │   ► overdue ──► paid
//!   ▼        ▼
//!  void     void
//! ```
//!
//! `paid` and `void` are terminal. `sent → overdue` is derived from the due
//! date rather than requested by anyone, and re-applying it is a no-op.
//! Line items are authoritative: every line amount is quantity × unit price
//! and `amount_due` is always their sum.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, FieldErrors};
use crate::types::Amount;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Void,
}

impl InvoiceStatus {
    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            "void" => Ok(Self::Void),
            _ => Err(CoreError::Validation(format!(
                "Invalid invoice status '{s}'. Must be one of: draft, sent, paid, overdue, void"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Void => "void",
        }
    }

    /// Whether the invoice still expects money.
    pub fn is_outstanding(self) -> bool {
        matches!(self, Self::Sent | Self::Overdue)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Draft, Sent)
                | (Draft, Void)
                | (Sent, Paid)
                | (Sent, Overdue)
                | (Sent, Void)
                | (Overdue, Paid)
        )
    }

    /// States from which `next` may be reached. Used for conditional updates.
    pub fn allowed_sources(next: Self) -> &'static [InvoiceStatus] {
        use InvoiceStatus::*;
        match next {
            Draft => &[],
            Sent => &[Draft],
            Paid => &[Sent, Overdue],
            Overdue => &[Sent],
            Void => &[Draft, Sent],
        }
    }
}

/// Reject any transition not in the lifecycle graph.
pub fn validate_transition(from: InvoiceStatus, to: InvoiceStatus) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        return Ok(());
    }
    Err(CoreError::Conflict(format!(
        "Invoice cannot move from '{}' to '{}'",
        from.as_str(),
        to.as_str()
    )))
}

/// The overdue rule: a `sent` invoice whose due date is before `today`.
pub fn is_overdue(status: InvoiceStatus, due_date: NaiveDate, today: NaiveDate) -> bool {
    status == InvoiceStatus::Sent && due_date < today
}

/// Apply the overdue rule, returning the (possibly unchanged) status.
pub fn reclassify(status: InvoiceStatus, due_date: NaiveDate, today: NaiveDate) -> InvoiceStatus {
    if is_overdue(status, due_date, today) {
        InvoiceStatus::Overdue
    } else {
        status
    }
}

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

/// Operator-entered line, before pricing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LineItemInput {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Amount,
}

/// A priced invoice line. `amount` is always `quantity * unit_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Amount,
    pub amount: Amount,
}

/// Validate lines and compute each amount. Field errors are keyed
/// `line_items[i].field`.
pub fn price_line_items(inputs: &[LineItemInput]) -> Result<Vec<LineItem>, CoreError> {
    if inputs.is_empty() {
        return Err(CoreError::field(
            "line_items",
            "An invoice needs at least one line item",
        ));
    }

    let mut errors = FieldErrors::new();
    let mut items = Vec::with_capacity(inputs.len());

    for (i, input) in inputs.iter().enumerate() {
        let description = input.description.trim();
        if description.is_empty() {
            errors.insert(
                format!("line_items[{i}].description"),
                "Description is required".into(),
            );
        }
        if input.quantity <= 0 {
            errors.insert(
                format!("line_items[{i}].quantity"),
                "Quantity must be at least 1".into(),
            );
        }
        if input.unit_price < 0 {
            errors.insert(
                format!("line_items[{i}].unit_price"),
                "Unit price cannot be negative".into(),
            );
        }

        match input.unit_price.checked_mul(Amount::from(input.quantity)) {
            Some(amount) => items.push(LineItem {
                description: description.to_string(),
                quantity: input.quantity,
                unit_price: input.unit_price,
                amount,
            }),
            None => {
                errors.insert(
                    format!("line_items[{i}].unit_price"),
                    "Line amount is too large".into(),
                );
            }
        }
    }

    if !errors.is_empty() {
        return Err(CoreError::InvalidFields(errors));
    }
    total(&items)?;
    Ok(items)
}

/// Sum of line amounts.
pub fn total(items: &[LineItem]) -> Result<Amount, CoreError> {
    items
        .iter()
        .try_fold(0 as Amount, |acc, item| acc.checked_add(item.amount))
        .ok_or_else(|| CoreError::field("line_items", "Invoice total is too large"))
}

/// Amount recorded as paid for a confirmation. Defaults to the full amount due.
pub fn settled_amount(amount_due: Amount, reported: Option<Amount>) -> Result<Amount, CoreError> {
    match reported {
        None => Ok(amount_due),
        Some(paid) if paid < 0 => Err(CoreError::field(
            "amount_paid",
            "Amount paid cannot be negative",
        )),
        Some(paid) => Ok(paid),
    }
}

// ---------------------------------------------------------------------------
// Numbering
// ---------------------------------------------------------------------------

/// Human-facing invoice number, e.g. `INV-2026-00042`.
pub fn format_invoice_number(issued_on: NaiveDate, sequence: i64) -> String {
    format!("INV-{}-{:05}", issued_on.year(), sequence)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
