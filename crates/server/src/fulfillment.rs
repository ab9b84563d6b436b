//! Fulfillment and system-wallet API endpoints. Admin only.

use api_types::fulfillment::{
    ExpiredAppealsResponse, FulfillmentReportView, SystemWalletFund, SystemWalletView,
};
use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::{ServerError, server::ServerState, user};

pub async fn run(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<FulfillmentReportView>, ServerError> {
    user::require_admin(&user)?;

    let report = state.engine.fulfill_approved_appeals().await?;
    Ok(Json(FulfillmentReportView {
        fulfilled: report.fulfilled,
        skipped: report.skipped,
        remaining_balance_minor: report.remaining_balance_minor,
    }))
}

pub async fn expire(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ExpiredAppealsResponse>, ServerError> {
    user::require_admin(&user)?;

    let expired = state.engine.expire_due_appeals(Utc::now()).await?;
    Ok(Json(ExpiredAppealsResponse { expired }))
}

pub async fn system_wallet(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<SystemWalletView>, ServerError> {
    user::require_admin(&user)?;

    let total_balance_minor = state.engine.system_wallet_balance().await?;
    Ok(Json(SystemWalletView {
        total_balance_minor,
    }))
}

pub async fn fund(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SystemWalletFund>,
) -> Result<Json<SystemWalletView>, ServerError> {
    let total_balance_minor = state
        .engine
        .fund_system_wallet(
            payload.amount_minor,
            Some(&user.username),
            payload.related_donation_id,
        )
        .await?;
    Ok(Json(SystemWalletView {
        total_balance_minor,
    }))
}
