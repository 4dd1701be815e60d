//! Billing summary read model for the operator dashboard.

use serde::{Deserialize, Serialize};

use crate::invoice::InvoiceStatus;
use crate::submission::SubmissionStatus;
use crate::types::Amount;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSummary {
    pub submissions_pending_payment: i64,
    pub submissions_paid: i64,
    pub invoices_draft: i64,
    pub invoices_sent: i64,
    pub invoices_overdue: i64,
    pub invoices_paid: i64,
    pub invoices_void: i64,
    /// Amount due across `sent` and `overdue` invoices.
    pub outstanding_total: Amount,
    /// Amount due across `overdue` invoices only.
    pub overdue_total: Amount,
    /// Amount paid across `paid` invoices.
    pub collected_total: Amount,
}

impl BillingSummary {
    pub fn add_submission(&mut self, status: SubmissionStatus, count: i64) {
        match status {
            SubmissionStatus::PendingPayment => self.submissions_pending_payment += count,
            SubmissionStatus::Paid => self.submissions_paid += count,
        }
    }

    /// Fold one status bucket of invoices into the summary.
    pub fn add_invoices(
        &mut self,
        status: InvoiceStatus,
        count: i64,
        amount_due: Amount,
        amount_paid: Amount,
    ) {
        match status {
            InvoiceStatus::Draft => self.invoices_draft += count,
            InvoiceStatus::Sent => self.invoices_sent += count,
            InvoiceStatus::Overdue => {
                self.invoices_overdue += count;
                self.overdue_total += amount_due;
            }
            InvoiceStatus::Paid => {
                self.invoices_paid += count;
                self.collected_total += amount_paid;
            }
            InvoiceStatus::Void => self.invoices_void += count,
        }
        if status.is_outstanding() {
            self.outstanding_total += amount_due;
        }
    }
}
