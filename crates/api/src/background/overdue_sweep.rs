//! Periodic overdue reclassification of invoices.
//!
//! Runs the overdue rule (`sent` and past its due date becomes `overdue`) on
//! a fixed `tokio::time::interval` and publishes `invoice.overdue` for each
//! invoice it changes. Re-running on the same day changes nothing, so a
//! missed or doubled tick is harmless.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use clientdesk_db::models::invoice::Invoice;
use clientdesk_db::store::{InvoiceStore, Store, StoreResult};
use clientdesk_events::{event_types, EventBus};
use tokio_util::sync::CancellationToken;

use crate::notifications::invoice_event;

/// Apply the overdue rule as of `today` and announce each change.
pub async fn sweep_and_notify(
    store: &dyn Store,
    bus: &EventBus,
    today: NaiveDate,
) -> StoreResult<Vec<Invoice>> {
    let changed = store.sweep_overdue(today).await?;
    for invoice in &changed {
        tracing::info!(
            invoice_id = invoice.id,
            invoice_number = %invoice.invoice_number,
            due_date = %invoice.due_date,
            "Invoice overdue",
        );
        bus.publish(invoice_event(event_types::INVOICE_OVERDUE, invoice));
    }
    Ok(changed)
}

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(
    store: Arc<dyn Store>,
    bus: Arc<EventBus>,
    every: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = every.as_secs(), "Overdue sweep job started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Overdue sweep job stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep_and_notify(store.as_ref(), &bus, Utc::now().date_naive()).await {
                    Ok(changed) if !changed.is_empty() => {
                        tracing::info!(
                            reclassified = changed.len(),
                            "Overdue sweep: invoices reclassified",
                        );
                    }
                    Ok(_) => tracing::debug!("Overdue sweep: nothing to reclassify"),
                    Err(e) => tracing::error!(error = %e, "Overdue sweep failed"),
                }
            }
        }
    }
}
