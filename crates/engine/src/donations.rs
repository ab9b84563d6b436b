//! Donation primitives.
//!
//! A donation records money pledged by a donor, optionally targeting an
//! approved appeal. Payment metadata (gateway, reference, receipt) is stored
//! verbatim and never processed here. Donations do **not** credit any wallet
//! on their own; crediting is a separate explicit operation.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, DonationNew, EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationType {
    #[default]
    MawalatAlQurba,
    General,
    AppealSpecific,
}

impl DonationType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MawalatAlQurba => "mawalat_al_qurba",
            Self::General => "general",
            Self::AppealSpecific => "appeal_specific",
        }
    }
}

impl TryFrom<&str> for DonationType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "mawalat_al_qurba" => Ok(Self::MawalatAlQurba),
            "general" => Ok(Self::General),
            "appeal_specific" => Ok(Self::AppealSpecific),
            other => Err(EngineError::validation(
                "donation_type",
                format!("invalid donation type: {other}"),
            )),
        }
    }
}

/// Gateway the donor claims to have paid through. Stored metadata only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Stripe,
    Jazzcash,
    Easypaisa,
    BankTransfer,
    Manual,
}

impl PaymentMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::Jazzcash => "jazzcash",
            Self::Easypaisa => "easypaisa",
            Self::BankTransfer => "bank_transfer",
            Self::Manual => "manual",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "stripe" => Ok(Self::Stripe),
            "jazzcash" => Ok(Self::Jazzcash),
            "easypaisa" => Ok(Self::Easypaisa),
            "bank_transfer" => Ok(Self::BankTransfer),
            "manual" => Ok(Self::Manual),
            other => Err(EngineError::validation(
                "payment_method",
                format!("invalid payment method: {other}"),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub id: Uuid,
    pub donor: String,
    pub amount_minor: i64,
    pub currency: Currency,
    pub donation_type: DonationType,
    pub appeal_id: Option<Uuid>,
    pub note: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_ref: Option<String>,
    pub receipt_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Donation {
    /// Builds a new donation record, enforcing field-level invariants.
    pub fn new(cmd: DonationNew, created_at: DateTime<Utc>) -> ResultEngine<Self> {
        if cmd.amount_minor <= 0 {
            return Err(EngineError::validation(
                "amount",
                "Amount must be greater than zero.",
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            donor: cmd.donor,
            amount_minor: cmd.amount_minor,
            currency: Currency::default(),
            donation_type: cmd.donation_type,
            appeal_id: cmd.appeal_id,
            note: cmd.note,
            payment_method: cmd.payment_method,
            transaction_ref: cmd.transaction_ref,
            receipt_url: cmd.receipt_url,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub donor: String,
    pub amount_minor: i64,
    pub currency: String,
    pub donation_type: String,
    pub appeal_id: Option<String>,
    pub note: Option<String>,
    pub payment_method: Option<String>,
    pub transaction_ref: Option<String>,
    pub receipt_url: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Donation> for ActiveModel {
    fn from(donation: &Donation) -> Self {
        Self {
            id: ActiveValue::Set(donation.id.to_string()),
            donor: ActiveValue::Set(donation.donor.clone()),
            amount_minor: ActiveValue::Set(donation.amount_minor),
            currency: ActiveValue::Set(donation.currency.code().to_string()),
            donation_type: ActiveValue::Set(donation.donation_type.as_str().to_string()),
            appeal_id: ActiveValue::Set(donation.appeal_id.map(|id| id.to_string())),
            note: ActiveValue::Set(donation.note.clone()),
            payment_method: ActiveValue::Set(
                donation.payment_method.map(|m| m.as_str().to_string()),
            ),
            transaction_ref: ActiveValue::Set(donation.transaction_ref.clone()),
            receipt_url: ActiveValue::Set(donation.receipt_url.clone()),
            created_at: ActiveValue::Set(donation.created_at),
        }
    }
}

impl TryFrom<Model> for Donation {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "donation")?,
            donor: model.donor,
            amount_minor: model.amount_minor,
            currency: Currency::try_from(model.currency.as_str()).unwrap_or_default(),
            donation_type: DonationType::try_from(model.donation_type.as_str())?,
            appeal_id: model
                .appeal_id
                .as_deref()
                .map(|s| parse_uuid(s, "appeal"))
                .transpose()?,
            note: model.note,
            payment_method: model
                .payment_method
                .as_deref()
                .map(PaymentMethod::try_from)
                .transpose()?,
            transaction_ref: model.transaction_ref,
            receipt_url: model.receipt_url,
            created_at: model.created_at,
        })
    }
}
