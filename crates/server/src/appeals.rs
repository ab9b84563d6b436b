//! Appeals API endpoints.

use api_types::appeal::{
    AppealCategory as ApiCategory, AppealListQuery, AppealListResponse, AppealReject,
    AppealStatus as ApiStatus, AppealSubmit, AppealView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_category(category: ApiCategory) -> engine::AppealCategory {
    match category {
        ApiCategory::HouseRent => engine::AppealCategory::HouseRent,
        ApiCategory::SchoolFee => engine::AppealCategory::SchoolFee,
        ApiCategory::Medical => engine::AppealCategory::Medical,
        ApiCategory::UtilityBills => engine::AppealCategory::UtilityBills,
        ApiCategory::Debt => engine::AppealCategory::Debt,
        ApiCategory::BusinessSupport => engine::AppealCategory::BusinessSupport,
        ApiCategory::DeathSupport => engine::AppealCategory::DeathSupport,
        ApiCategory::Other => engine::AppealCategory::Other,
    }
}

fn unmap_category(category: engine::AppealCategory) -> ApiCategory {
    match category {
        engine::AppealCategory::HouseRent => ApiCategory::HouseRent,
        engine::AppealCategory::SchoolFee => ApiCategory::SchoolFee,
        engine::AppealCategory::Medical => ApiCategory::Medical,
        engine::AppealCategory::UtilityBills => ApiCategory::UtilityBills,
        engine::AppealCategory::Debt => ApiCategory::Debt,
        engine::AppealCategory::BusinessSupport => ApiCategory::BusinessSupport,
        engine::AppealCategory::DeathSupport => ApiCategory::DeathSupport,
        engine::AppealCategory::Other => ApiCategory::Other,
    }
}

fn map_status(status: ApiStatus) -> engine::AppealStatus {
    match status {
        ApiStatus::Pending => engine::AppealStatus::Pending,
        ApiStatus::Approved => engine::AppealStatus::Approved,
        ApiStatus::Rejected => engine::AppealStatus::Rejected,
        ApiStatus::Fulfilled => engine::AppealStatus::Fulfilled,
        ApiStatus::Expired => engine::AppealStatus::Expired,
        ApiStatus::Cancelled => engine::AppealStatus::Cancelled,
    }
}

fn unmap_status(status: engine::AppealStatus) -> ApiStatus {
    match status {
        engine::AppealStatus::Pending => ApiStatus::Pending,
        engine::AppealStatus::Approved => ApiStatus::Approved,
        engine::AppealStatus::Rejected => ApiStatus::Rejected,
        engine::AppealStatus::Fulfilled => ApiStatus::Fulfilled,
        engine::AppealStatus::Expired => ApiStatus::Expired,
        engine::AppealStatus::Cancelled => ApiStatus::Cancelled,
    }
}

fn appeal_view(appeal: engine::Appeal) -> AppealView {
    let is_donor_linked = appeal.is_donor_linked();
    let fulfillment_source = appeal.fulfillment_source().map(|source| {
        match source {
            engine::FulfillmentSource::Donor => "donor",
            engine::FulfillmentSource::Platform => "platform",
        }
        .to_string()
    });

    AppealView {
        id: appeal.id,
        title: appeal.title,
        description: appeal.description,
        category: unmap_category(appeal.category),
        amount_minor: appeal.amount_minor,
        is_monthly: appeal.is_monthly,
        months_required: appeal.months_required,
        status: unmap_status(appeal.status),
        is_urgent: appeal.is_urgent,
        created_by: appeal.created_by,
        beneficiary: appeal.beneficiary,
        is_donor_linked,
        fulfillment_source,
        approved_by: appeal.approved_by,
        approved_at: appeal.approved_at,
        rejected_by: appeal.rejected_by,
        rejected_at: appeal.rejected_at,
        rejection_reason: appeal.rejection_reason,
        cancelled_by: appeal.cancelled_by,
        cancelled_at: appeal.cancelled_at,
        fulfilled_at: appeal.fulfilled_at,
        expiry_date: appeal.expiry_date,
        created_at: appeal.created_at,
        updated_at: appeal.updated_at,
    }
}

pub async fn submit(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AppealSubmit>,
) -> Result<(StatusCode, Json<AppealView>), ServerError> {
    let beneficiary = payload
        .beneficiary
        .unwrap_or_else(|| user.username.clone());

    let mut cmd = engine::AppealNew::new(
        payload.title,
        map_category(payload.category),
        payload.amount_minor,
        beneficiary,
        user.username.clone(),
    );
    cmd.description = payload.description;
    cmd.is_monthly = payload.is_monthly;
    cmd.months_required = payload.months_required;
    cmd.is_urgent = payload.is_urgent;
    cmd.expiry_date = payload.expiry_date;

    let appeal = state.engine.create_appeal(cmd, &user.username).await?;
    Ok((StatusCode::CREATED, Json(appeal_view(appeal))))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<AppealListQuery>,
) -> Result<Json<AppealListResponse>, ServerError> {
    let filter = engine::AppealListFilter {
        status: query.status.map(map_status),
        category: query.category.map(map_category),
        beneficiary: query.beneficiary,
        urgent_only: query.urgent_only,
    };

    let appeals = state.engine.list_appeals(filter, &user.username).await?;
    Ok(Json(AppealListResponse {
        appeals: appeals.into_iter().map(appeal_view).collect(),
    }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(appeal_id): Path<Uuid>,
) -> Result<Json<AppealView>, ServerError> {
    let appeal = state.engine.appeal(appeal_id, &user.username).await?;
    Ok(Json(appeal_view(appeal)))
}

pub async fn approve(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(appeal_id): Path<Uuid>,
) -> Result<Json<AppealView>, ServerError> {
    let appeal = state
        .engine
        .approve_appeal(appeal_id, &user.username)
        .await?;
    Ok(Json(appeal_view(appeal)))
}

pub async fn reject(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(appeal_id): Path<Uuid>,
    Json(payload): Json<AppealReject>,
) -> Result<Json<AppealView>, ServerError> {
    let appeal = state
        .engine
        .reject_appeal(appeal_id, &user.username, &payload.reason)
        .await?;
    Ok(Json(appeal_view(appeal)))
}

pub async fn cancel(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(appeal_id): Path<Uuid>,
) -> Result<Json<AppealView>, ServerError> {
    let appeal = state
        .engine
        .cancel_appeal(appeal_id, &user.username)
        .await?;
    Ok(Json(appeal_view(appeal)))
}
