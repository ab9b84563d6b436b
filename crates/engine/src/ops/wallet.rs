//! Wallet service: the only code path permitted to mutate a balance.
//!
//! Every operation takes the wallet row with an exclusive lock inside a
//! database transaction, mutates the balance, and appends exactly one ledger
//! row. Both writes commit or roll back together, so the balance never
//! diverges from the ledger sum.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};

use crate::{
    AppealStatus, CreditCmd, EngineError, LedgerAction, LedgerKind, ResultEngine, TransferBy,
    Wallet, WalletTransaction, appeals,
    ledger::{generate_description, resolve_transfer_by},
    util::parse_uuid,
    wallet_transactions, wallets,
};

use super::{Engine, with_tx};

/// Wallet statistics for a recipient.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalletStats {
    /// Sum of fulfilled appeal amounts for this beneficiary.
    pub total_credited_minor: i64,
    /// Sum of debit entries on this wallet.
    pub total_withdrawn_minor: i64,
    pub available_minor: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct LedgerCursor {
    created_at: DateTime<Utc>,
    entry_id: String,
}

impl LedgerCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid ledger cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid ledger cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid ledger cursor".to_string()))
    }
}

impl Engine {
    /// Credits a recipient wallet.
    ///
    /// Attribution follows the actor's role; with no actor, a present donor
    /// reference attributes the entry to `Donor`, otherwise `System`.
    pub async fn credit_wallet(&self, cmd: CreditCmd) -> ResultEngine<Wallet> {
        if cmd.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "credit amount must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let actor_role = self.actor_role(&db_tx, cmd.actor.as_deref()).await?;
            self.require_user(&db_tx, &cmd.user).await?;
            if let Some(donor) = cmd.donor.as_deref() {
                self.require_user(&db_tx, donor).await?;
            }

            let transfer_by = match actor_role {
                Some(role) => resolve_transfer_by(Some(role)),
                None if cmd.donor.is_some() => TransferBy::Donor,
                None => TransferBy::System,
            };
            let description = cmd
                .description
                .clone()
                .unwrap_or_else(|| generate_description(cmd.action, cmd.appeal_id, None));

            let wallet_model = self.locked_wallet_for_user(&db_tx, &cmd.user).await?;
            let (wallet, _) = self
                .append_entry(
                    &db_tx,
                    &wallet_model,
                    LedgerKind::Credit,
                    cmd.amount_minor,
                    cmd.appeal_id,
                    cmd.donor.clone(),
                    description,
                    transfer_by,
                )
                .await?;
            Ok(wallet)
        })
    }

    /// Debits a recipient wallet.
    ///
    /// Balance sufficiency is not checked at this layer; the caller owns
    /// that decision, so the balance can go negative.
    pub async fn debit_wallet(
        &self,
        user: &str,
        amount_minor: i64,
        appeal_id: Option<Uuid>,
        actor: Option<&str>,
    ) -> ResultEngine<Wallet> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "debit amount must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let actor_role = self.actor_role(&db_tx, actor).await?;
            self.require_user(&db_tx, user).await?;

            let description = generate_description(LedgerAction::Withdrawal, appeal_id, None);
            let transfer_by = resolve_transfer_by(actor_role);

            let wallet_model = self.locked_wallet_for_user(&db_tx, user).await?;
            let (wallet, _) = self
                .append_entry(
                    &db_tx,
                    &wallet_model,
                    LedgerKind::Debit,
                    amount_minor,
                    appeal_id,
                    None,
                    description,
                    transfer_by,
                )
                .await?;
            Ok(wallet)
        })
    }

    /// Admin-initiated credit.
    pub async fn manual_credit(
        &self,
        user: &str,
        amount_minor: i64,
        actor: &str,
    ) -> ResultEngine<Wallet> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "credit amount must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, actor).await?;
            self.require_user(&db_tx, user).await?;

            let description = generate_description(LedgerAction::AdminCredit, None, None);
            let wallet_model = self.locked_wallet_for_user(&db_tx, user).await?;
            let (wallet, _) = self
                .append_entry(
                    &db_tx,
                    &wallet_model,
                    LedgerKind::Credit,
                    amount_minor,
                    None,
                    None,
                    description,
                    TransferBy::Admin,
                )
                .await?;
            Ok(wallet)
        })
    }

    /// Admin balance adjustment by a signed amount; the ledger row kind
    /// follows the sign and stores the absolute amount.
    pub async fn adjust_balance(
        &self,
        user: &str,
        amount_minor: i64,
        reason: &str,
        actor: &str,
    ) -> ResultEngine<Wallet> {
        if amount_minor == 0 {
            return Err(EngineError::InvalidAmount(
                "adjustment amount must not be 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, actor).await?;
            self.require_user(&db_tx, user).await?;

            let reason = reason.trim();
            let description = generate_description(
                LedgerAction::ManualAdjustment,
                None,
                (!reason.is_empty()).then_some(reason),
            );
            let kind = if amount_minor > 0 {
                LedgerKind::Credit
            } else {
                LedgerKind::Debit
            };

            let wallet_model = self.locked_wallet_for_user(&db_tx, user).await?;
            let (wallet, _) = self
                .append_entry(
                    &db_tx,
                    &wallet_model,
                    kind,
                    amount_minor.abs(),
                    None,
                    None,
                    description,
                    TransferBy::Admin,
                )
                .await?;
            Ok(wallet)
        })
    }

    /// Logs a zero-amount debit entry as an audit trail for a rejected
    /// withdrawal. The balance is not touched.
    pub async fn reject_withdrawal(&self, appeal_id: Uuid, actor: &str) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, actor).await?;
            let appeal_model = self.require_appeal(&db_tx, appeal_id).await?;

            let description =
                generate_description(LedgerAction::RejectedWithdrawal, Some(appeal_id), None);
            let wallet_model = self
                .locked_wallet_for_user(&db_tx, &appeal_model.beneficiary)
                .await?;
            let (wallet, _) = self
                .append_entry(
                    &db_tx,
                    &wallet_model,
                    LedgerKind::Debit,
                    0,
                    Some(appeal_id),
                    None,
                    description,
                    TransferBy::Admin,
                )
                .await?;
            Ok(wallet)
        })
    }

    /// Credits a refund back to a recipient wallet.
    pub async fn issue_refund(
        &self,
        user: &str,
        amount_minor: i64,
        appeal_id: Option<Uuid>,
        actor: Option<&str>,
    ) -> ResultEngine<Wallet> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "refund amount must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let actor_role = self.actor_role(&db_tx, actor).await?;
            self.require_user(&db_tx, user).await?;

            let description = generate_description(LedgerAction::Refund, appeal_id, None);
            let transfer_by = resolve_transfer_by(actor_role);

            let wallet_model = self.locked_wallet_for_user(&db_tx, user).await?;
            let (wallet, _) = self
                .append_entry(
                    &db_tx,
                    &wallet_model,
                    LedgerKind::Credit,
                    amount_minor,
                    appeal_id,
                    None,
                    description,
                    transfer_by,
                )
                .await?;
            Ok(wallet)
        })
    }

    /// Returns (creating on first use) the wallet of a user.
    ///
    /// Authorization: the wallet owner or an admin.
    pub async fn wallet(&self, user: &str, actor: &str) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            self.require_wallet_access(&db_tx, user, actor).await?;
            let model = self.locked_wallet_for_user(&db_tx, user).await?;
            Wallet::try_from(model)
        })
    }

    /// Wallet statistics: credited (fulfilled appeals), withdrawn (debits),
    /// and the available difference.
    pub async fn wallet_stats(&self, user: &str, actor: &str) -> ResultEngine<WalletStats> {
        with_tx!(self, |db_tx| {
            self.require_wallet_access(&db_tx, user, actor).await?;

            let fulfilled = appeals::Entity::find()
                .filter(appeals::Column::Beneficiary.eq(user.to_string()))
                .filter(appeals::Column::Status.eq(AppealStatus::Fulfilled.as_str()))
                .all(&db_tx)
                .await?;
            let total_credited_minor: i64 = fulfilled.iter().map(|a| a.amount_minor).sum();

            let total_withdrawn_minor = match self.find_wallet(&db_tx, user).await? {
                Some(wallet_model) => {
                    let debits = wallet_transactions::Entity::find()
                        .filter(wallet_transactions::Column::WalletId.eq(wallet_model.id))
                        .filter(
                            wallet_transactions::Column::Kind.eq(LedgerKind::Debit.as_str()),
                        )
                        .all(&db_tx)
                        .await?;
                    debits.iter().map(|t| t.amount_minor).sum()
                }
                None => 0,
            };

            Ok(WalletStats {
                total_credited_minor,
                total_withdrawn_minor,
                available_minor: total_credited_minor - total_withdrawn_minor,
            })
        })
    }

    /// Lists ledger entries newest-first with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(created_at DESC, id DESC)`; the
    /// returned cursor fetches the next page when passed back in.
    pub async fn list_wallet_transactions(
        &self,
        user: &str,
        actor: &str,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<(Vec<WalletTransaction>, Option<String>)> {
        with_tx!(self, |db_tx| {
            self.require_wallet_access(&db_tx, user, actor).await?;

            let page = match self.find_wallet(&db_tx, user).await? {
                None => (Vec::new(), None),
                Some(wallet_model) => {
                    let mut query = wallet_transactions::Entity::find()
                        .filter(wallet_transactions::Column::WalletId.eq(wallet_model.id))
                        .order_by_desc(wallet_transactions::Column::CreatedAt)
                        .order_by_desc(wallet_transactions::Column::Id)
                        .limit(limit + 1);

                    if let Some(cursor) = cursor {
                        let cursor = LedgerCursor::decode(cursor)?;
                        query = query.filter(
                            Condition::any()
                                .add(wallet_transactions::Column::CreatedAt.lt(cursor.created_at))
                                .add(
                                    Condition::all()
                                        .add(
                                            wallet_transactions::Column::CreatedAt
                                                .eq(cursor.created_at),
                                        )
                                        .add(wallet_transactions::Column::Id.lt(cursor.entry_id)),
                                ),
                        );
                    }

                    let models = query.all(&db_tx).await?;
                    let has_more = models.len() as u64 > limit;

                    let mut out = Vec::with_capacity(models.len().min(limit as usize));
                    for model in models.into_iter().take(limit as usize) {
                        out.push(WalletTransaction::try_from(model)?);
                    }

                    let next_cursor = if has_more {
                        out.last()
                            .map(|tx| {
                                LedgerCursor {
                                    created_at: tx.created_at,
                                    entry_id: tx.id.to_string(),
                                }
                                .encode()
                            })
                            .transpose()?
                    } else {
                        None
                    };

                    (out, next_cursor)
                }
            };

            Ok(page)
        })
    }

    async fn find_wallet(
        &self,
        db: &DatabaseTransaction,
        user: &str,
    ) -> ResultEngine<Option<wallets::Model>> {
        wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    async fn require_wallet_access(
        &self,
        db: &DatabaseTransaction,
        user: &str,
        actor: &str,
    ) -> ResultEngine<()> {
        if actor == user {
            self.require_user(db, user).await?;
            return Ok(());
        }
        self.require_admin(db, actor).await?;
        self.require_user(db, user).await?;
        Ok(())
    }

    /// Takes the wallet row of a user with an exclusive lock, creating it
    /// (balance 0) on first use.
    pub(super) async fn locked_wallet_for_user(
        &self,
        db: &DatabaseTransaction,
        user: &str,
    ) -> ResultEngine<wallets::Model> {
        let found = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user.to_string()))
            .lock_exclusive()
            .one(db)
            .await?;
        if let Some(model) = found {
            return Ok(model);
        }

        let wallet = Wallet::new(user, Utc::now());
        wallets::ActiveModel::from(&wallet).insert(db).await?;
        wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user.to_string()))
            .lock_exclusive()
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))
    }

    /// Appends a ledger row and persists the new balance in the same
    /// transaction. A zero-amount row leaves the balance write out.
    async fn append_entry(
        &self,
        db: &DatabaseTransaction,
        wallet_model: &wallets::Model,
        kind: LedgerKind,
        amount_minor: i64,
        appeal_id: Option<Uuid>,
        donor_id: Option<String>,
        description: String,
        transfer_by: TransferBy,
    ) -> ResultEngine<(Wallet, WalletTransaction)> {
        let delta = match kind {
            LedgerKind::Credit => amount_minor,
            LedgerKind::Debit => -amount_minor,
        };
        let new_balance = wallet_model.balance + delta;

        if delta != 0 {
            let active = wallets::ActiveModel {
                id: ActiveValue::Set(wallet_model.id.clone()),
                balance: ActiveValue::Set(new_balance),
                ..Default::default()
            };
            active.update(db).await?;
        }

        let tx = WalletTransaction {
            id: Uuid::new_v4(),
            wallet_id: parse_uuid(&wallet_model.id, "wallet")?,
            kind,
            amount_minor,
            appeal_id,
            donor_id,
            description,
            transfer_by,
            created_at: Utc::now(),
        };
        wallet_transactions::ActiveModel::from(&tx).insert(db).await?;

        let wallet = Wallet {
            id: tx.wallet_id,
            user_id: wallet_model.user_id.clone(),
            balance: new_balance,
            created_at: wallet_model.created_at,
        };
        Ok((wallet, tx))
    }
}
