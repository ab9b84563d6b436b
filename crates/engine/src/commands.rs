//! Command structs for engine operations.
//!
//! These types group parameters for write operations (appeal submission,
//! donations, wallet credits), keeping call sites readable and avoiding long
//! argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{AppealCategory, DonationType, LedgerAction, PaymentMethod};

/// Submit a new appeal.
#[derive(Clone, Debug)]
pub struct AppealNew {
    pub title: String,
    pub description: Option<String>,
    pub category: AppealCategory,
    pub amount_minor: i64,
    pub is_monthly: bool,
    pub months_required: Option<i32>,
    pub is_urgent: bool,
    pub beneficiary: String,
    pub created_by: String,
    pub linked_donation_id: Option<Uuid>,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl AppealNew {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        category: AppealCategory,
        amount_minor: i64,
        beneficiary: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            category,
            amount_minor,
            is_monthly: false,
            months_required: None,
            is_urgent: false,
            beneficiary: beneficiary.into(),
            created_by: created_by.into(),
            linked_donation_id: None,
            expiry_date: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the appeal as recurring for `months` months.
    #[must_use]
    pub fn monthly(mut self, months: i32) -> Self {
        self.is_monthly = true;
        self.months_required = Some(months);
        self
    }

    #[must_use]
    pub fn urgent(mut self) -> Self {
        self.is_urgent = true;
        self
    }

    #[must_use]
    pub fn linked_donation(mut self, donation_id: Uuid) -> Self {
        self.linked_donation_id = Some(donation_id);
        self
    }

    #[must_use]
    pub fn expiry(mut self, expiry_date: DateTime<Utc>) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }
}

/// Record a new donation.
#[derive(Clone, Debug)]
pub struct DonationNew {
    pub donor: String,
    pub amount_minor: i64,
    pub donation_type: DonationType,
    pub appeal_id: Option<Uuid>,
    pub note: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_ref: Option<String>,
    pub receipt_url: Option<String>,
}

impl DonationNew {
    #[must_use]
    pub fn new(donor: impl Into<String>, amount_minor: i64) -> Self {
        Self {
            donor: donor.into(),
            amount_minor,
            donation_type: DonationType::default(),
            appeal_id: None,
            note: None,
            payment_method: None,
            transaction_ref: None,
            receipt_url: None,
        }
    }

    #[must_use]
    pub fn donation_type(mut self, donation_type: DonationType) -> Self {
        self.donation_type = donation_type;
        self
    }

    /// Targets a specific appeal; it must be approved at submission time.
    #[must_use]
    pub fn appeal(mut self, appeal_id: Uuid) -> Self {
        self.appeal_id = Some(appeal_id);
        self.donation_type = DonationType::AppealSpecific;
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    #[must_use]
    pub fn transaction_ref(mut self, reference: impl Into<String>) -> Self {
        self.transaction_ref = Some(reference.into());
        self
    }

    #[must_use]
    pub fn receipt_url(mut self, url: impl Into<String>) -> Self {
        self.receipt_url = Some(url.into());
        self
    }
}

/// Credit a recipient wallet.
#[derive(Clone, Debug)]
pub struct CreditCmd {
    pub user: String,
    pub amount_minor: i64,
    pub action: LedgerAction,
    pub appeal_id: Option<Uuid>,
    pub donor: Option<String>,
    pub description: Option<String>,
    pub actor: Option<String>,
}

impl CreditCmd {
    #[must_use]
    pub fn new(user: impl Into<String>, amount_minor: i64, action: LedgerAction) -> Self {
        Self {
            user: user.into(),
            amount_minor,
            action,
            appeal_id: None,
            donor: None,
            description: None,
            actor: None,
        }
    }

    #[must_use]
    pub fn appeal(mut self, appeal_id: Uuid) -> Self {
        self.appeal_id = Some(appeal_id);
        self
    }

    #[must_use]
    pub fn donor(mut self, donor: impl Into<String>) -> Self {
        self.donor = Some(donor.into());
        self
    }

    /// Overrides the generated description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}
