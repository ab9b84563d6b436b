//! Wallet API endpoints: the recipient's own view plus admin operations.

use api_types::wallet::{
    BalanceAdjust, LedgerAmount, LedgerEntryView, LedgerListQuery, LedgerListResponse,
    WalletStatsView, WalletView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn wallet_view(wallet: engine::Wallet) -> WalletView {
    WalletView {
        user: wallet.user_id,
        balance_minor: wallet.balance,
    }
}

fn entry_view(tx: engine::WalletTransaction) -> LedgerEntryView {
    LedgerEntryView {
        id: tx.id,
        kind: tx.kind.as_str().to_string(),
        amount_minor: tx.amount_minor,
        appeal_id: tx.appeal_id,
        donor_id: tx.donor_id,
        description: tx.description,
        transfer_by: tx.transfer_by.as_str().to_string(),
        created_at: tx.created_at,
    }
}

fn stats_view(stats: engine::WalletStats) -> WalletStatsView {
    WalletStatsView {
        total_credited_minor: stats.total_credited_minor,
        total_withdrawn_minor: stats.total_withdrawn_minor,
        available_minor: stats.available_minor,
    }
}

pub async fn own_wallet(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.wallet(&user.username, &user.username).await?;
    Ok(Json(wallet_view(wallet)))
}

pub async fn own_transactions(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<LedgerListQuery>,
) -> Result<Json<LedgerListResponse>, ServerError> {
    let limit = query.limit.unwrap_or(50);
    let (transactions, next_cursor) = state
        .engine
        .list_wallet_transactions(&user.username, &user.username, limit, query.cursor.as_deref())
        .await?;

    Ok(Json(LedgerListResponse {
        transactions: transactions.into_iter().map(entry_view).collect(),
        next_cursor,
    }))
}

pub async fn own_stats(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<WalletStatsView>, ServerError> {
    let stats = state
        .engine
        .wallet_stats(&user.username, &user.username)
        .await?;
    Ok(Json(stats_view(stats)))
}

pub async fn wallet(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.wallet(&username, &user.username).await?;
    Ok(Json(wallet_view(wallet)))
}

/// Admin credit: a donation-backed credit when an appeal is referenced, a
/// plain manual credit otherwise.
pub async fn credit(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
    Json(payload): Json<LedgerAmount>,
) -> Result<Json<WalletView>, ServerError> {
    user::require_admin(&user)?;

    let wallet = match payload.appeal_id {
        Some(appeal_id) => {
            let cmd = engine::CreditCmd::new(
                username,
                payload.amount_minor,
                engine::LedgerAction::Donation,
            )
            .appeal(appeal_id)
            .actor(user.username.clone());
            state.engine.credit_wallet(cmd).await?
        }
        None => {
            state
                .engine
                .manual_credit(&username, payload.amount_minor, &user.username)
                .await?
        }
    };
    Ok(Json(wallet_view(wallet)))
}

pub async fn debit(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
    Json(payload): Json<LedgerAmount>,
) -> Result<Json<WalletView>, ServerError> {
    user::require_admin(&user)?;

    let wallet = state
        .engine
        .debit_wallet(
            &username,
            payload.amount_minor,
            payload.appeal_id,
            Some(&user.username),
        )
        .await?;
    Ok(Json(wallet_view(wallet)))
}

pub async fn adjust(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
    Json(payload): Json<BalanceAdjust>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state
        .engine
        .adjust_balance(
            &username,
            payload.amount_minor,
            &payload.reason,
            &user.username,
        )
        .await?;
    Ok(Json(wallet_view(wallet)))
}

pub async fn refund(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
    Json(payload): Json<LedgerAmount>,
) -> Result<Json<WalletView>, ServerError> {
    user::require_admin(&user)?;

    let wallet = state
        .engine
        .issue_refund(
            &username,
            payload.amount_minor,
            payload.appeal_id,
            Some(&user.username),
        )
        .await?;
    Ok(Json(wallet_view(wallet)))
}

pub async fn reject_withdrawal(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(appeal_id): Path<Uuid>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state
        .engine
        .reject_withdrawal(appeal_id, &user.username)
        .await?;
    Ok(Json(wallet_view(wallet)))
}
