//! Appeal primitives.
//!
//! An `Appeal` is a funding request submitted on behalf of a beneficiary. It
//! moves through a fixed lifecycle; every transition stamps the acting user
//! and a timestamp so the record stays auditable.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppealNew, EngineError, ResultEngine, util::parse_uuid};

/// Appeal funding category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppealCategory {
    HouseRent,
    SchoolFee,
    Medical,
    UtilityBills,
    Debt,
    BusinessSupport,
    DeathSupport,
    Other,
}

impl AppealCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HouseRent => "house_rent",
            Self::SchoolFee => "school_fee",
            Self::Medical => "medical",
            Self::UtilityBills => "utility_bills",
            Self::Debt => "debt",
            Self::BusinessSupport => "business_support",
            Self::DeathSupport => "death_support",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for AppealCategory {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "house_rent" => Ok(Self::HouseRent),
            "school_fee" => Ok(Self::SchoolFee),
            "medical" => Ok(Self::Medical),
            "utility_bills" => Ok(Self::UtilityBills),
            "debt" => Ok(Self::Debt),
            "business_support" => Ok(Self::BusinessSupport),
            "death_support" => Ok(Self::DeathSupport),
            "other" => Ok(Self::Other),
            other => Err(EngineError::validation(
                "category",
                format!("invalid appeal category: {other}"),
            )),
        }
    }
}

/// Appeal lifecycle status.
///
/// `Pending` and `Approved` are the two *active* states: they count against
/// the one-active-appeal-per-month rule. The rest are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppealStatus {
    Pending,
    Approved,
    Rejected,
    Fulfilled,
    Expired,
    Cancelled,
}

impl AppealStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Fulfilled => "fulfilled",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }

    /// Active statuses block a second appeal for the same beneficiary,
    /// category and calendar month.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    /// Legal lifecycle transitions:
    /// `pending -> {approved, rejected, cancelled}`,
    /// `approved -> {fulfilled, expired, cancelled}`.
    #[must_use]
    pub fn can_become(self, next: AppealStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Cancelled)
                | (Self::Approved, Self::Fulfilled)
                | (Self::Approved, Self::Expired)
                | (Self::Approved, Self::Cancelled)
        )
    }
}

impl TryFrom<&str> for AppealStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "fulfilled" => Ok(Self::Fulfilled),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::validation(
                "status",
                format!("invalid appeal status: {other}"),
            )),
        }
    }
}

/// Source funding a fulfilled/approved appeal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentSource {
    Donor,
    Platform,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appeal {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: AppealCategory,
    pub amount_minor: i64,
    pub is_monthly: bool,
    pub months_required: Option<i32>,
    pub status: AppealStatus,
    pub is_urgent: bool,
    pub created_by: String,
    pub beneficiary: String,
    pub linked_donation_id: Option<Uuid>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub fulfilled_at: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appeal {
    /// Builds a new pending appeal, enforcing field-level invariants.
    pub fn new(cmd: AppealNew, created_at: DateTime<Utc>) -> ResultEngine<Self> {
        let title = cmd.title.trim().to_string();
        if title.is_empty() {
            return Err(EngineError::validation("title", "title must not be empty"));
        }
        if cmd.amount_minor <= 0 {
            return Err(EngineError::validation(
                "amount_requested",
                "Amount must be greater than zero.",
            ));
        }
        if cmd.is_monthly {
            match cmd.months_required {
                Some(months) if (1..=6).contains(&months) => {}
                _ => {
                    return Err(EngineError::validation(
                        "months_required",
                        "Must be between 1 and 6 if is_monthly is true.",
                    ));
                }
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            title,
            description: cmd.description,
            category: cmd.category,
            amount_minor: cmd.amount_minor,
            is_monthly: cmd.is_monthly,
            months_required: cmd.months_required,
            status: AppealStatus::Pending,
            is_urgent: cmd.is_urgent,
            created_by: cmd.created_by,
            beneficiary: cmd.beneficiary,
            linked_donation_id: cmd.linked_donation_id,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            fulfilled_at: None,
            expiry_date: cmd.expiry_date,
            created_at,
            updated_at: created_at,
        })
    }

    /// Whether a donor donation is linked to this appeal.
    #[must_use]
    pub fn is_donor_linked(&self) -> bool {
        self.linked_donation_id.is_some()
    }

    /// Who would fund this appeal: a linked donor, or the platform wallet for
    /// approved appeals. `None` for everything else.
    #[must_use]
    pub fn fulfillment_source(&self) -> Option<FulfillmentSource> {
        if self.linked_donation_id.is_some() {
            return Some(FulfillmentSource::Donor);
        }
        if self.status == AppealStatus::Approved {
            return Some(FulfillmentSource::Platform);
        }
        None
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "appeals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub amount_minor: i64,
    pub is_monthly: bool,
    pub months_required: Option<i32>,
    pub status: String,
    pub is_urgent: bool,
    pub created_by: String,
    pub beneficiary: String,
    pub linked_donation_id: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTimeUtc>,
    pub rejected_by: Option<String>,
    pub rejected_at: Option<DateTimeUtc>,
    pub rejection_reason: Option<String>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTimeUtc>,
    pub fulfilled_at: Option<DateTimeUtc>,
    pub expiry_date: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::wallet_transactions::Entity")]
    WalletTransactions,
}

impl Related<super::wallet_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalletTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Appeal> for ActiveModel {
    fn from(appeal: &Appeal) -> Self {
        Self {
            id: ActiveValue::Set(appeal.id.to_string()),
            title: ActiveValue::Set(appeal.title.clone()),
            description: ActiveValue::Set(appeal.description.clone()),
            category: ActiveValue::Set(appeal.category.as_str().to_string()),
            amount_minor: ActiveValue::Set(appeal.amount_minor),
            is_monthly: ActiveValue::Set(appeal.is_monthly),
            months_required: ActiveValue::Set(appeal.months_required),
            status: ActiveValue::Set(appeal.status.as_str().to_string()),
            is_urgent: ActiveValue::Set(appeal.is_urgent),
            created_by: ActiveValue::Set(appeal.created_by.clone()),
            beneficiary: ActiveValue::Set(appeal.beneficiary.clone()),
            linked_donation_id: ActiveValue::Set(
                appeal.linked_donation_id.map(|id| id.to_string()),
            ),
            approved_by: ActiveValue::Set(appeal.approved_by.clone()),
            approved_at: ActiveValue::Set(appeal.approved_at),
            rejected_by: ActiveValue::Set(appeal.rejected_by.clone()),
            rejected_at: ActiveValue::Set(appeal.rejected_at),
            rejection_reason: ActiveValue::Set(appeal.rejection_reason.clone()),
            cancelled_by: ActiveValue::Set(appeal.cancelled_by.clone()),
            cancelled_at: ActiveValue::Set(appeal.cancelled_at),
            fulfilled_at: ActiveValue::Set(appeal.fulfilled_at),
            expiry_date: ActiveValue::Set(appeal.expiry_date),
            created_at: ActiveValue::Set(appeal.created_at),
            updated_at: ActiveValue::Set(appeal.updated_at),
        }
    }
}

impl TryFrom<Model> for Appeal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "appeal")?,
            title: model.title,
            description: model.description,
            category: AppealCategory::try_from(model.category.as_str())?,
            amount_minor: model.amount_minor,
            is_monthly: model.is_monthly,
            months_required: model.months_required,
            status: AppealStatus::try_from(model.status.as_str())?,
            is_urgent: model.is_urgent,
            created_by: model.created_by,
            beneficiary: model.beneficiary,
            linked_donation_id: model
                .linked_donation_id
                .as_deref()
                .map(|s| parse_uuid(s, "donation"))
                .transpose()?,
            approved_by: model.approved_by,
            approved_at: model.approved_at,
            rejected_by: model.rejected_by,
            rejected_at: model.rejected_at,
            rejection_reason: model.rejection_reason,
            cancelled_by: model.cancelled_by,
            cancelled_at: model.cancelled_at,
            fulfilled_at: model.fulfilled_at,
            expiry_date: model.expiry_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::AppealNew;

    fn cmd() -> AppealNew {
        AppealNew::new(
            "Rent for July",
            AppealCategory::HouseRent,
            50_000_00,
            "rafia",
            "rafia",
        )
    }

    #[test]
    fn new_appeal_starts_pending() {
        let appeal = Appeal::new(cmd(), Utc::now()).unwrap();

        assert_eq!(appeal.status, AppealStatus::Pending);
        assert_eq!(appeal.title, "Rent for July");
        assert!(appeal.approved_by.is_none());
        assert!(!appeal.is_donor_linked());
        assert_eq!(appeal.fulfillment_source(), None);
    }

    #[test]
    fn monthly_requires_months_in_range() {
        let err = Appeal::new(cmd().monthly(7), Utc::now()).unwrap_err();
        assert_eq!(err.field(), Some("months_required"));

        let err = Appeal::new(
            AppealNew {
                is_monthly: true,
                months_required: None,
                ..cmd()
            },
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("months_required"));

        let appeal = Appeal::new(cmd().monthly(6), Utc::now()).unwrap();
        assert_eq!(appeal.months_required, Some(6));
    }

    #[test]
    fn amount_must_be_positive() {
        let mut invalid = cmd();
        invalid.amount_minor = 0;
        let err = Appeal::new(invalid, Utc::now()).unwrap_err();
        assert_eq!(err.field(), Some("amount_requested"));
    }

    #[test]
    fn transition_table() {
        use AppealStatus::*;

        assert!(Pending.can_become(Approved));
        assert!(Pending.can_become(Rejected));
        assert!(Pending.can_become(Cancelled));
        assert!(Approved.can_become(Fulfilled));
        assert!(Approved.can_become(Expired));
        assert!(Approved.can_become(Cancelled));

        assert!(!Pending.can_become(Fulfilled));
        assert!(!Approved.can_become(Rejected));
        assert!(!Rejected.can_become(Approved));
        assert!(!Fulfilled.can_become(Cancelled));
        assert!(!Expired.can_become(Approved));
    }

    #[test]
    fn approved_appeal_is_platform_funded() {
        let mut appeal = Appeal::new(cmd(), Utc::now()).unwrap();
        appeal.status = AppealStatus::Approved;
        assert_eq!(appeal.fulfillment_source(), Some(FulfillmentSource::Platform));

        appeal.linked_donation_id = Some(Uuid::new_v4());
        assert_eq!(appeal.fulfillment_source(), Some(FulfillmentSource::Donor));
    }
}
