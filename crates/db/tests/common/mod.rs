#![allow(dead_code)]

use chrono::{Duration, NaiveDate, Utc};
use clientdesk_core::campaign::CampaignCodeDraft;
use clientdesk_core::invoice::{price_line_items, total, InvoiceStatus, LineItemInput};
use clientdesk_core::onboarding::{
    Advance, Contact, FormData, Identity, OnboardingDraft, OnboardingVariant,
};
use clientdesk_core::package::SelectedPackage;
use clientdesk_db::models::access_code::NewAccessCode;
use clientdesk_db::models::invoice::NewInvoice;

pub fn access_code(code: &str) -> NewAccessCode {
    NewAccessCode {
        code: code.to_string(),
        client_name: "Pedro Alves".to_string(),
        client_email: Some("pedro@alves.example".to_string()),
        package_name: "Growth".to_string(),
        price: 9950,
        features: vec!["SEO".to_string(), "Google Ads".to_string()],
        max_uses: 1,
        expires_at: None,
    }
}

pub fn campaign(code: &str, max_uses: Option<i32>) -> CampaignCodeDraft {
    CampaignCodeDraft {
        code: code.to_string(),
        display_name: "Spring Launch".to_string(),
        price: 49900,
        features: vec!["Landing page".to_string()],
        max_uses,
        expires_at: Some(Utc::now() + Duration::days(30)),
    }
}

pub fn form(campaign_code: Option<&str>) -> FormData {
    let mut form = FormData {
        identity: Identity {
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            practice_name: "Silva Dental".into(),
            specialty: None,
        },
        contact: Contact {
            email: "ana@silva.example".into(),
            phone: "+1 555 0100".into(),
            preferred_contact: None,
        },
        ..FormData::default()
    };
    form.campaign.campaign_code = campaign_code.map(str::to_string);
    form
}

/// A draft that has walked every step and is ready to submit.
pub fn completed_draft(variant: OnboardingVariant, campaign_code: Option<&str>) -> OnboardingDraft {
    let mut draft = OnboardingDraft::new(variant);
    draft.save_form_data(form(campaign_code));
    if variant == OnboardingVariant::AccessCode {
        draft.apply_redemption("PEDRO".into(), SelectedPackage::new("Growth", 9950));
    }
    while !draft.is_last_step() {
        assert!(matches!(draft.next().unwrap(), Advance::Moved(_)));
    }
    draft
}

pub fn invoice(status: InvoiceStatus, due_date: NaiveDate) -> NewInvoice {
    let line_items = price_line_items(&[LineItemInput {
        description: "Monthly retainer".into(),
        quantity: 1,
        unit_price: 120000,
    }])
    .unwrap();
    NewInvoice {
        submission_id: None,
        client_name: "Silva Dental".into(),
        client_email: "ana@silva.example".into(),
        client_phone: None,
        amount_due: total(&line_items).unwrap(),
        line_items,
        status: status.as_str().to_string(),
        due_date,
        payment_link: None,
        notes: None,
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
