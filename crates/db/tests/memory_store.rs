//! Behaviour of the in-memory store, which shares its contract with the
//! PostgreSQL store.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use uuid::Uuid;

use clientdesk_core::invoice::InvoiceStatus;
use clientdesk_core::onboarding::{OnboardingDraft, OnboardingVariant};
use clientdesk_core::package::DeclineReason;
use clientdesk_core::submission::SubmissionStatus;
use clientdesk_db::store::{
    AccessCodeStore, CampaignCodeStore, DashboardStore, DraftStore, InvoiceStore, MarkPaid,
    MemoryStore, RedeemOutcome, StoreError, SubmissionStore, SubmitOutcome,
};

use common::{access_code, campaign, completed_draft, invoice, today};

// ---------------------------------------------------------------------------
// Access codes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn redeeming_a_single_use_code_twice_declines_the_second() {
    let store = MemoryStore::new();
    store.create_access_code(access_code("PEDRO")).await.unwrap();

    let first = store
        .redeem_access_code("PEDRO", "x@y.com", Utc::now())
        .await
        .unwrap();
    assert_matches!(first, RedeemOutcome::Granted(row) => {
        assert!(row.used);
        assert_eq!(row.used_count, 1);
        assert_eq!(row.redeemed_by_email.as_deref(), Some("x@y.com"));
        assert_eq!(row.client_data().price, 9950);
    });

    let second = store
        .redeem_access_code("PEDRO", "other@y.com", Utc::now())
        .await
        .unwrap();
    assert_matches!(second, RedeemOutcome::Declined(DeclineReason::Exhausted));

    let stored = store.find_access_code("PEDRO").await.unwrap().unwrap();
    assert_eq!(stored.redeemed_by_email.as_deref(), Some("x@y.com"));
}

#[tokio::test]
async fn concurrent_redemptions_grant_exactly_once() {
    let store = Arc::new(MemoryStore::new());
    store.create_access_code(access_code("ONCE")).await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .redeem_access_code("ONCE", &format!("user{i}@example.com"), Utc::now())
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut granted = 0;
    for handle in handles {
        if let RedeemOutcome::Granted(_) = handle.await.unwrap() {
            granted += 1;
        }
    }
    assert_eq!(granted, 1);
}

#[tokio::test]
async fn multi_use_code_allows_up_to_max_uses() {
    let store = MemoryStore::new();
    let mut input = access_code("TEAM");
    input.max_uses = 2;
    store.create_access_code(input).await.unwrap();

    let now = Utc::now();
    assert_matches!(
        store.redeem_access_code("TEAM", "a@x.com", now).await.unwrap(),
        RedeemOutcome::Granted(row) if !row.used
    );
    assert_matches!(
        store.redeem_access_code("TEAM", "b@x.com", now).await.unwrap(),
        RedeemOutcome::Granted(row) if row.used
    );
    assert_matches!(
        store.redeem_access_code("TEAM", "c@x.com", now).await.unwrap(),
        RedeemOutcome::Declined(DeclineReason::Exhausted)
    );
}

#[tokio::test]
async fn expired_and_unknown_codes_decline_without_side_effects() {
    let store = MemoryStore::new();
    let mut input = access_code("OLD");
    input.expires_at = Some(Utc::now() - Duration::hours(1));
    store.create_access_code(input).await.unwrap();

    assert_matches!(
        store.redeem_access_code("OLD", "a@x.com", Utc::now()).await.unwrap(),
        RedeemOutcome::Declined(DeclineReason::Expired)
    );
    assert_matches!(
        store.redeem_access_code("NOPE", "a@x.com", Utc::now()).await.unwrap(),
        RedeemOutcome::Declined(DeclineReason::NotFound)
    );

    let stored = store.find_access_code("OLD").await.unwrap().unwrap();
    assert_eq!(stored.used_count, 0);
    assert!(stored.redeemed_by_email.is_none());
}

#[tokio::test]
async fn duplicate_access_code_is_rejected() {
    let store = MemoryStore::new();
    store.create_access_code(access_code("DUP")).await.unwrap();
    assert_matches!(
        store.create_access_code(access_code("DUP")).await,
        Err(StoreError::Duplicate(_))
    );
}

// ---------------------------------------------------------------------------
// Drafts and submissions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn draft_form_data_round_trips() {
    let store = MemoryStore::new();
    let id = Uuid::new_v4();
    let mut draft = OnboardingDraft::new(OnboardingVariant::BrowsePackages);
    store.create_draft(id, &draft).await.unwrap();

    draft.save_form_data(common::form(Some("SPRING")));
    draft.next().unwrap();
    store.save_draft(id, &draft).await.unwrap().unwrap();

    let reloaded = store.find_draft(id).await.unwrap().unwrap().to_draft().unwrap();
    assert_eq!(reloaded, draft);
}

#[tokio::test]
async fn submitting_deletes_the_draft_and_creates_pending_submission() {
    let store = MemoryStore::new();
    let id = Uuid::new_v4();
    let draft = completed_draft(OnboardingVariant::AccessCode, None);
    store.create_draft(id, &draft).await.unwrap();

    let prepared = draft.prepare_submission().unwrap();
    let outcome = store
        .create_submission(id, prepared.clone(), Utc::now())
        .await
        .unwrap();
    let submission = assert_matches!(outcome, SubmitOutcome::Created(s) => s);
    assert_eq!(submission.status, SubmissionStatus::PendingPayment.as_str());
    assert_eq!(submission.package_price, 9950);
    assert_eq!(submission.email, "ana@silva.example");
    assert!(submission.paid_at.is_none());

    assert!(store.find_draft(id).await.unwrap().is_none());
    assert_matches!(
        store.create_submission(id, prepared, Utc::now()).await.unwrap(),
        SubmitOutcome::DraftMissing
    );
}

#[tokio::test]
async fn campaign_submission_claims_a_use() {
    let store = MemoryStore::new();
    store
        .create_campaign_code(campaign("SPRING", Some(1)))
        .await
        .unwrap();

    let first = Uuid::new_v4();
    let draft = completed_draft(OnboardingVariant::BrowsePackages, Some("spring"));
    store.create_draft(first, &draft).await.unwrap();
    let outcome = store
        .create_submission(first, draft.prepare_submission().unwrap(), Utc::now())
        .await
        .unwrap();
    assert_matches!(outcome, SubmitOutcome::Created(s) if s.package_price == 49900);

    // The code is now exhausted; the second draft survives the decline.
    let second = Uuid::new_v4();
    store.create_draft(second, &draft).await.unwrap();
    let outcome = store
        .create_submission(second, draft.prepare_submission().unwrap(), Utc::now())
        .await
        .unwrap();
    assert_matches!(outcome, SubmitOutcome::CampaignDeclined(DeclineReason::Exhausted));
    assert!(store.find_draft(second).await.unwrap().is_some());
    assert!(store.list_campaign_codes(Some(Utc::now())).await.unwrap().is_empty());
    assert_eq!(store.list_campaign_codes(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn marking_paid_is_idempotent() {
    let store = MemoryStore::new();
    let id = Uuid::new_v4();
    let draft = completed_draft(OnboardingVariant::AccessCode, None);
    store.create_draft(id, &draft).await.unwrap();
    let submission = assert_matches!(
        store.create_submission(id, draft.prepare_submission().unwrap(), Utc::now()).await.unwrap(),
        SubmitOutcome::Created(s) => s
    );

    let paid = assert_matches!(
        store.mark_submission_paid(submission.id, Utc::now()).await.unwrap(),
        MarkPaid::Marked(s) => s
    );
    assert_eq!(paid.status, "paid");
    let paid_at = paid.paid_at;
    assert!(paid_at.is_some());

    let again = assert_matches!(
        store.mark_submission_paid(submission.id, Utc::now()).await.unwrap(),
        MarkPaid::AlreadyPaid(s) => s
    );
    assert_eq!(again.paid_at, paid_at);
}

#[tokio::test]
async fn marking_unknown_submission_paid_creates_nothing() {
    let store = MemoryStore::new();
    assert_matches!(
        store.mark_submission_paid(Uuid::new_v4(), Utc::now()).await.unwrap(),
        MarkPaid::NotFound
    );
    assert!(store.list_submissions(None, 100, 0).await.unwrap().is_empty());
    assert!(store.list_invoices(None, 100, 0).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invoice_numbers_are_sequential() {
    let store = MemoryStore::new();
    let due = today() + Duration::days(14);
    let a = store
        .create_invoice(invoice(InvoiceStatus::Draft, due), today())
        .await
        .unwrap();
    let b = store
        .create_invoice(invoice(InvoiceStatus::Draft, due), today())
        .await
        .unwrap();
    assert!(a.invoice_number.ends_with("-00001"));
    assert!(b.invoice_number.ends_with("-00002"));
    assert_eq!(a.amount_due, 120000);
}

#[tokio::test]
async fn overdue_sweep_reclassifies_only_past_due_sent_invoices() {
    let store = MemoryStore::new();
    let yesterday = today() - Duration::days(1);
    let tomorrow = today() + Duration::days(1);

    let late = store
        .create_invoice(invoice(InvoiceStatus::Sent, yesterday), today())
        .await
        .unwrap();
    let on_time = store
        .create_invoice(invoice(InvoiceStatus::Sent, tomorrow), today())
        .await
        .unwrap();
    let draft = store
        .create_invoice(invoice(InvoiceStatus::Draft, yesterday), today())
        .await
        .unwrap();

    let changed = store.sweep_overdue(today()).await.unwrap();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].id, late.id);

    let status = |id| {
        let store = store.clone();
        async move { store.find_invoice(id).await.unwrap().unwrap().status }
    };
    assert_eq!(status(late.id).await, "overdue");
    assert_eq!(status(on_time.id).await, "sent");
    assert_eq!(status(draft.id).await, "draft");

    // Reapplying is a no-op.
    assert!(store.sweep_overdue(today()).await.unwrap().is_empty());
    assert_eq!(status(late.id).await, "overdue");
}

#[tokio::test]
async fn overdue_sweep_skips_due_today_and_voided_invoices() {
    let store = MemoryStore::new();
    let due_today = store
        .create_invoice(invoice(InvoiceStatus::Sent, today()), today())
        .await
        .unwrap();
    let voided = store
        .create_invoice(invoice(InvoiceStatus::Sent, today() - Duration::days(10)), today())
        .await
        .unwrap();
    store
        .set_invoice_status(voided.id, InvoiceStatus::Void)
        .await
        .unwrap()
        .unwrap();

    assert!(store.sweep_overdue(today()).await.unwrap().is_empty());

    let changed = store.sweep_overdue(today() + Duration::days(1)).await.unwrap();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].id, due_today.id);
    assert_eq!(changed[0].status, "overdue");
}

#[tokio::test]
async fn paid_invoice_is_terminal() {
    let store = MemoryStore::new();
    let inv = store
        .create_invoice(invoice(InvoiceStatus::Draft, today()), today())
        .await
        .unwrap();

    assert!(store.mark_invoice_paid(inv.id, None, today()).await.unwrap().is_none());
    store
        .set_invoice_status(inv.id, InvoiceStatus::Sent)
        .await
        .unwrap()
        .unwrap();

    let paid = store
        .mark_invoice_paid(inv.id, None, today())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(paid.status, "paid");
    assert_eq!(paid.amount_paid, paid.amount_due);
    assert_eq!(paid.paid_date, Some(today()));

    for next in [InvoiceStatus::Sent, InvoiceStatus::Overdue, InvoiceStatus::Void] {
        assert!(store.set_invoice_status(inv.id, next).await.unwrap().is_none());
    }
    assert!(store.mark_invoice_paid(inv.id, Some(1), today()).await.unwrap().is_none());
    assert!(store.sweep_overdue(today() + Duration::days(30)).await.unwrap().is_empty());
}

#[tokio::test]
async fn only_drafts_can_be_edited() {
    let store = MemoryStore::new();
    let inv = store
        .create_invoice(invoice(InvoiceStatus::Sent, today()), today())
        .await
        .unwrap();
    let changes = clientdesk_db::models::invoice::InvoiceChanges {
        notes: Some("late fee waived".into()),
        ..Default::default()
    };
    assert!(store.update_draft_invoice(inv.id, changes).await.unwrap().is_none());
}

#[tokio::test]
async fn billing_summary_buckets_by_status() {
    let store = MemoryStore::new();
    let yesterday = today() - Duration::days(1);
    store
        .create_invoice(invoice(InvoiceStatus::Sent, yesterday), today())
        .await
        .unwrap();
    store
        .create_invoice(invoice(InvoiceStatus::Draft, yesterday), today())
        .await
        .unwrap();
    store.sweep_overdue(today()).await.unwrap();

    let summary = store.billing_summary().await.unwrap();
    assert_eq!(summary.invoices_overdue, 1);
    assert_eq!(summary.invoices_draft, 1);
    assert_eq!(summary.overdue_total, 120000);
    assert_eq!(summary.outstanding_total, 120000);
    assert_eq!(summary.collected_total, 0);
}
