//! Analytics API endpoints.

use api_types::stats::{
    PlatformOverviewView, RecipientStatsPageView, RecipientStatsQuery, RecipientStatsView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState, user};

pub async fn overview(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<PlatformOverviewView>, ServerError> {
    let overview = state.engine.platform_overview(&user.username).await?;
    Ok(Json(PlatformOverviewView {
        total_transactions: overview.total_transactions,
        total_credits_minor: overview.total_credits_minor,
        total_debits_minor: overview.total_debits_minor,
        total_balance_minor: overview.total_balance_minor,
    }))
}

pub async fn recipients(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<RecipientStatsQuery>,
) -> Result<Json<RecipientStatsPageView>, ServerError> {
    let page = state
        .engine
        .recipient_wallet_stats(
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(10),
            &user.username,
        )
        .await?;

    Ok(Json(RecipientStatsPageView {
        count: page.count,
        results: page
            .results
            .into_iter()
            .map(|stats| RecipientStatsView {
                username: stats.username,
                full_name: stats.full_name,
                total_received_minor: stats.total_received_minor,
                total_withdrawn_minor: stats.total_withdrawn_minor,
                current_balance_minor: stats.current_balance_minor,
            })
            .collect(),
    }))
}
