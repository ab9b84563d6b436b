//! Appeal fulfillment: batch reconciliation of approved appeals against the
//! system wallet.
//!
//! The whole pass runs in one transaction holding the system wallet row
//! lock, so concurrent invocations serialize and a second run cannot
//! double-spend. Appeals the balance cannot cover are skipped silently and
//! stay eligible for a future pass.

use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{
    AppealStatus, EngineError, LedgerAction, LedgerKind, ResultEngine, SystemTransaction,
    TransferBy, appeals,
    ledger::generate_description,
    system_ledger,
    system_wallet::{self, SYSTEM_WALLET_ID},
    util::parse_uuid,
};

use super::{Engine, with_tx};

/// Outcome of one fulfillment pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FulfillmentReport {
    /// Appeals paid out in this pass, in processing order.
    pub fulfilled: Vec<Uuid>,
    /// Approved appeals skipped for insufficient balance.
    pub skipped: Vec<Uuid>,
    pub remaining_balance_minor: i64,
}

impl Engine {
    /// Pays out every approved appeal the system wallet can cover, in
    /// creation order, marking each `fulfilled` and logging a system-ledger
    /// debit. All-or-nothing: a database error aborts the whole pass.
    pub async fn fulfill_approved_appeals(&self) -> ResultEngine<FulfillmentReport> {
        with_tx!(self, |db_tx| {
            let wallet = self.locked_system_wallet(&db_tx).await?;
            let mut balance = wallet.total_balance;

            let due = appeals::Entity::find()
                .filter(appeals::Column::Status.eq(AppealStatus::Approved.as_str()))
                .order_by_asc(appeals::Column::CreatedAt)
                .order_by_asc(appeals::Column::Id)
                .lock_exclusive()
                .all(&db_tx)
                .await?;

            let now = Utc::now();
            let mut report = FulfillmentReport::default();

            for model in due {
                let appeal_id = parse_uuid(&model.id, "appeal")?;
                if balance < model.amount_minor {
                    report.skipped.push(appeal_id);
                    continue;
                }

                balance -= model.amount_minor;

                let active = appeals::ActiveModel {
                    id: ActiveValue::Set(model.id.clone()),
                    status: ActiveValue::Set(AppealStatus::Fulfilled.as_str().to_string()),
                    fulfilled_at: ActiveValue::Set(Some(now)),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                };
                active.update(&db_tx).await?;

                let entry = SystemTransaction {
                    id: Uuid::new_v4(),
                    kind: LedgerKind::Debit,
                    amount_minor: model.amount_minor,
                    description: generate_description(
                        LedgerAction::Withdrawal,
                        Some(appeal_id),
                        None,
                    ),
                    transfer_by: TransferBy::System,
                    related_donation_id: None,
                    created_at: now,
                };
                system_ledger::ActiveModel::from(&entry).insert(&db_tx).await?;

                tracing::info!(
                    appeal = %appeal_id,
                    amount_minor = model.amount_minor,
                    "fulfilled appeal from system wallet"
                );
                report.fulfilled.push(appeal_id);
            }

            if !report.fulfilled.is_empty() {
                let active = system_wallet::ActiveModel {
                    id: ActiveValue::Set(SYSTEM_WALLET_ID),
                    total_balance: ActiveValue::Set(balance),
                    updated_at: ActiveValue::Set(now),
                };
                active.update(&db_tx).await?;
            }

            report.remaining_balance_minor = balance;
            Ok(report)
        })
    }

    /// Credits the system wallet, either by an admin top-up or from a
    /// confirmed donation. Returns the new balance.
    pub async fn fund_system_wallet(
        &self,
        amount_minor: i64,
        actor: Option<&str>,
        related_donation_id: Option<Uuid>,
    ) -> ResultEngine<i64> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "funding amount must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let transfer_by = match actor {
                Some(username) => {
                    self.require_admin(&db_tx, username).await?;
                    TransferBy::Admin
                }
                None => TransferBy::System,
            };
            let action = if related_donation_id.is_some() {
                LedgerAction::Donation
            } else {
                LedgerAction::AdminCredit
            };

            let wallet = self.locked_system_wallet(&db_tx).await?;
            let now = Utc::now();
            let balance = wallet.total_balance + amount_minor;

            let active = system_wallet::ActiveModel {
                id: ActiveValue::Set(SYSTEM_WALLET_ID),
                total_balance: ActiveValue::Set(balance),
                updated_at: ActiveValue::Set(now),
            };
            active.update(&db_tx).await?;

            let entry = SystemTransaction {
                id: Uuid::new_v4(),
                kind: LedgerKind::Credit,
                amount_minor,
                description: generate_description(action, None, None),
                transfer_by,
                related_donation_id,
                created_at: now,
            };
            system_ledger::ActiveModel::from(&entry).insert(&db_tx).await?;

            Ok(balance)
        })
    }

    /// Current pooled balance (0 before the row exists).
    pub async fn system_wallet_balance(&self) -> ResultEngine<i64> {
        with_tx!(self, |db_tx| {
            let balance = system_wallet::Entity::find_by_id(SYSTEM_WALLET_ID)
                .one(&db_tx)
                .await?
                .map(|w| w.total_balance)
                .unwrap_or(0);
            Ok(balance)
        })
    }

    /// Lists system-ledger entries newest-first.
    pub async fn list_system_transactions(
        &self,
        limit: u64,
    ) -> ResultEngine<Vec<SystemTransaction>> {
        with_tx!(self, |db_tx| {
            let models = system_ledger::Entity::find()
                .order_by_desc(system_ledger::Column::CreatedAt)
                .order_by_desc(system_ledger::Column::Id)
                .limit(limit)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(SystemTransaction::try_from(model)?);
            }
            Ok(out)
        })
    }

    /// Takes the system wallet row with an exclusive lock, creating it on
    /// first use.
    async fn locked_system_wallet(
        &self,
        db: &DatabaseTransaction,
    ) -> ResultEngine<system_wallet::Model> {
        let found = system_wallet::Entity::find_by_id(SYSTEM_WALLET_ID)
            .lock_exclusive()
            .one(db)
            .await?;
        if let Some(model) = found {
            return Ok(model);
        }

        let active = system_wallet::ActiveModel {
            id: ActiveValue::Set(SYSTEM_WALLET_ID),
            total_balance: ActiveValue::Set(0),
            updated_at: ActiveValue::Set(Utc::now()),
        };
        active.insert(db).await?;

        system_wallet::Entity::find_by_id(SYSTEM_WALLET_ID)
            .lock_exclusive()
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("system wallet not exists".to_string()))
    }
}
