//! System-wallet ledger rows.
//!
//! The appeal-agnostic ledger used by the fulfillment batch and by system
//! wallet funding. Append-only, like the per-recipient ledger.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, LedgerKind, TransferBy, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemTransaction {
    pub id: Uuid,
    pub kind: LedgerKind,
    pub amount_minor: i64,
    pub description: String,
    pub transfer_by: TransferBy,
    pub related_donation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "system_wallet_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub description: String,
    pub transfer_by: String,
    pub related_donation_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SystemTransaction> for ActiveModel {
    fn from(tx: &SystemTransaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            description: ActiveValue::Set(tx.description.clone()),
            transfer_by: ActiveValue::Set(tx.transfer_by.as_str().to_string()),
            related_donation_id: ActiveValue::Set(
                tx.related_donation_id.map(|id| id.to_string()),
            ),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for SystemTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "system transaction")?,
            kind: LedgerKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            description: model.description,
            transfer_by: TransferBy::try_from(model.transfer_by.as_str())?,
            related_donation_id: model
                .related_donation_id
                .as_deref()
                .map(|s| parse_uuid(s, "donation"))
                .transpose()?,
            created_at: model.created_at,
        })
    }
}
