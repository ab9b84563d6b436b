//! Per-recipient wallet ledger rows.
//!
//! Rows are append-only: they are never updated or deleted in normal
//! operation. The wallet balance and its ledger are written in the same
//! database transaction, which keeps `balance == sum(credits) - sum(debits)`
//! at all times.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// Direction of a ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Credit,
    Debit,
}

impl LedgerKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl TryFrom<&str> for LedgerKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid ledger kind: {other}"
            ))),
        }
    }
}

/// Who initiated a ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferBy {
    Donor,
    Admin,
    System,
}

impl TransferBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Donor => "Donor",
            Self::Admin => "Admin",
            Self::System => "System",
        }
    }
}

impl TryFrom<&str> for TransferBy {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Donor" => Ok(Self::Donor),
            "Admin" => Ok(Self::Admin),
            "System" => Ok(Self::System),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transfer attribution: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub kind: LedgerKind,
    /// Absolute amount of the entry; the direction lives in `kind`.
    pub amount_minor: i64,
    pub appeal_id: Option<Uuid>,
    pub donor_id: Option<String>,
    pub description: String,
    pub transfer_by: TransferBy,
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    /// Signed effect of this entry on the wallet balance.
    #[must_use]
    pub fn signed_amount(&self) -> i64 {
        match self.kind {
            LedgerKind::Credit => self.amount_minor,
            LedgerKind::Debit => -self.amount_minor,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub wallet_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub appeal_id: Option<String>,
    pub donor_id: Option<String>,
    pub description: String,
    pub transfer_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Wallets,
    #[sea_orm(
        belongs_to = "super::appeals::Entity",
        from = "Column::AppealId",
        to = "super::appeals::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Appeals,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl Related<super::appeals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appeals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&WalletTransaction> for ActiveModel {
    fn from(tx: &WalletTransaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            wallet_id: ActiveValue::Set(tx.wallet_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            appeal_id: ActiveValue::Set(tx.appeal_id.map(|id| id.to_string())),
            donor_id: ActiveValue::Set(tx.donor_id.clone()),
            description: ActiveValue::Set(tx.description.clone()),
            transfer_by: ActiveValue::Set(tx.transfer_by.as_str().to_string()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for WalletTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "wallet transaction")?,
            wallet_id: parse_uuid(&model.wallet_id, "wallet")?,
            kind: LedgerKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            appeal_id: model
                .appeal_id
                .as_deref()
                .map(|s| parse_uuid(s, "appeal"))
                .transpose()?,
            donor_id: model.donor_id,
            description: model.description,
            transfer_by: TransferBy::try_from(model.transfer_by.as_str())?,
            created_at: model.created_at,
        })
    }
}
