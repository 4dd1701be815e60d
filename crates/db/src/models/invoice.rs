//! Invoice entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use clientdesk_core::invoice::{LineItem, LineItemInput};
use clientdesk_core::types::{Amount, DbId, Timestamp};

/// A row from the `invoices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: DbId,
    pub invoice_number: String,
    pub submission_id: Option<Uuid>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub line_items: Json<Vec<LineItem>>,
    pub amount_due: Amount,
    pub amount_paid: Amount,
    pub status: String,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub payment_link: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an invoice. Totals are never accepted from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoice {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub line_items: Vec<LineItemInput>,
    pub due_date: NaiveDate,
    pub payment_link: Option<String>,
    pub notes: Option<String>,
}

/// DTO for editing a draft invoice. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInvoice {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub line_items: Option<Vec<LineItemInput>>,
    pub due_date: Option<NaiveDate>,
    pub payment_link: Option<String>,
    pub notes: Option<String>,
}

/// Validated insert values. `amount_due` is the sum of `line_items`.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub submission_id: Option<Uuid>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub line_items: Vec<LineItem>,
    pub amount_due: Amount,
    pub status: String,
    pub due_date: NaiveDate,
    pub payment_link: Option<String>,
    pub notes: Option<String>,
}

/// Validated changes for a draft invoice. Line items and amount move together.
#[derive(Debug, Clone, Default)]
pub struct InvoiceChanges {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub priced_lines: Option<(Vec<LineItem>, Amount)>,
    pub due_date: Option<NaiveDate>,
    pub payment_link: Option<String>,
    pub notes: Option<String>,
}
