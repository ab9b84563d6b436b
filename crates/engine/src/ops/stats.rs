//! Platform analytics over the wallet ledger.

use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{LedgerKind, ResultEngine, Role, users, wallet_transactions, wallets};

use super::{Engine, with_tx};

/// Platform-wide ledger totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlatformOverview {
    pub total_transactions: u64,
    pub total_credits_minor: i64,
    pub total_debits_minor: i64,
    /// Sum of all recipient wallet balances.
    pub total_balance_minor: i64,
}

/// Per-recipient wallet totals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipientWalletStats {
    pub username: String,
    pub full_name: Option<String>,
    pub total_received_minor: i64,
    pub total_withdrawn_minor: i64,
    pub current_balance_minor: i64,
}

/// One page of recipient wallet stats.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecipientStatsPage {
    pub count: u64,
    pub results: Vec<RecipientWalletStats>,
}

impl Engine {
    /// Totals over the whole recipient ledger. Admin only.
    pub async fn platform_overview(&self, actor: &str) -> ResultEngine<PlatformOverview> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, actor).await?;

            let entries = wallet_transactions::Entity::find().all(&db_tx).await?;
            let mut overview = PlatformOverview {
                total_transactions: entries.len() as u64,
                ..Default::default()
            };
            for entry in &entries {
                if entry.kind == LedgerKind::Credit.as_str() {
                    overview.total_credits_minor += entry.amount_minor;
                } else {
                    overview.total_debits_minor += entry.amount_minor;
                }
            }

            let wallet_rows = wallets::Entity::find().all(&db_tx).await?;
            overview.total_balance_minor = wallet_rows.iter().map(|w| w.balance).sum();

            Ok(overview)
        })
    }

    /// Per-recipient received/withdrawn/balance figures, offset-paged.
    /// Admin only. Pages are 1-based.
    pub async fn recipient_wallet_stats(
        &self,
        page: u64,
        page_size: u64,
        actor: &str,
    ) -> ResultEngine<RecipientStatsPage> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, actor).await?;

            let page = page.max(1);
            let paginator = users::Entity::find()
                .filter(users::Column::Role.eq(Role::Recipient.as_str()))
                .order_by_asc(users::Column::Username)
                .paginate(&db_tx, page_size.max(1));

            let count = paginator.num_items().await?;
            let recipients = paginator.fetch_page(page - 1).await?;

            let mut results = Vec::with_capacity(recipients.len());
            for recipient in recipients {
                let wallet = wallets::Entity::find()
                    .filter(wallets::Column::UserId.eq(recipient.username.clone()))
                    .one(&db_tx)
                    .await?;

                let mut received = 0i64;
                let mut withdrawn = 0i64;
                let mut balance = 0i64;
                if let Some(wallet) = wallet {
                    let entries = wallet_transactions::Entity::find()
                        .filter(wallet_transactions::Column::WalletId.eq(wallet.id.clone()))
                        .all(&db_tx)
                        .await?;
                    for entry in &entries {
                        if entry.kind == LedgerKind::Credit.as_str() {
                            received += entry.amount_minor;
                        } else {
                            withdrawn += entry.amount_minor;
                        }
                    }
                    balance = wallet.balance;
                }

                results.push(RecipientWalletStats {
                    username: recipient.username,
                    full_name: recipient.full_name,
                    total_received_minor: received,
                    total_withdrawn_minor: withdrawn,
                    current_balance_minor: balance,
                });
            }

            Ok(RecipientStatsPage { count, results })
        })
    }
}
