//! Donations API endpoints.

use api_types::donation::{
    DonationListQuery, DonationListResponse, DonationSubmit, DonationType as ApiDonationType,
    DonationView, PaymentMethod as ApiPaymentMethod,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, user};

fn map_donation_type(value: ApiDonationType) -> engine::DonationType {
    match value {
        ApiDonationType::MawalatAlQurba => engine::DonationType::MawalatAlQurba,
        ApiDonationType::General => engine::DonationType::General,
        ApiDonationType::AppealSpecific => engine::DonationType::AppealSpecific,
    }
}

fn unmap_donation_type(value: engine::DonationType) -> ApiDonationType {
    match value {
        engine::DonationType::MawalatAlQurba => ApiDonationType::MawalatAlQurba,
        engine::DonationType::General => ApiDonationType::General,
        engine::DonationType::AppealSpecific => ApiDonationType::AppealSpecific,
    }
}

fn map_payment_method(value: ApiPaymentMethod) -> engine::PaymentMethod {
    match value {
        ApiPaymentMethod::Stripe => engine::PaymentMethod::Stripe,
        ApiPaymentMethod::Jazzcash => engine::PaymentMethod::Jazzcash,
        ApiPaymentMethod::Easypaisa => engine::PaymentMethod::Easypaisa,
        ApiPaymentMethod::BankTransfer => engine::PaymentMethod::BankTransfer,
        ApiPaymentMethod::Manual => engine::PaymentMethod::Manual,
    }
}

fn unmap_payment_method(value: engine::PaymentMethod) -> ApiPaymentMethod {
    match value {
        engine::PaymentMethod::Stripe => ApiPaymentMethod::Stripe,
        engine::PaymentMethod::Jazzcash => ApiPaymentMethod::Jazzcash,
        engine::PaymentMethod::Easypaisa => ApiPaymentMethod::Easypaisa,
        engine::PaymentMethod::BankTransfer => ApiPaymentMethod::BankTransfer,
        engine::PaymentMethod::Manual => ApiPaymentMethod::Manual,
    }
}

fn donation_view(donation: engine::Donation) -> DonationView {
    DonationView {
        id: donation.id,
        donor: donation.donor,
        amount_minor: donation.amount_minor,
        currency: api_types::Currency::Pkr,
        donation_type: unmap_donation_type(donation.donation_type),
        appeal_id: donation.appeal_id,
        note: donation.note,
        payment_method: donation.payment_method.map(unmap_payment_method),
        transaction_ref: donation.transaction_ref,
        receipt_url: donation.receipt_url,
        created_at: donation.created_at,
    }
}

pub async fn submit(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DonationSubmit>,
) -> Result<(StatusCode, Json<DonationView>), ServerError> {
    let mut cmd = engine::DonationNew::new(user.username.clone(), payload.amount_minor);
    if let Some(donation_type) = payload.donation_type {
        cmd = cmd.donation_type(map_donation_type(donation_type));
    }
    if let Some(appeal_id) = payload.appeal_id {
        cmd = cmd.appeal(appeal_id);
    }
    cmd.note = payload.note;
    cmd.payment_method = payload.payment_method.map(map_payment_method);
    cmd.transaction_ref = payload.transaction_ref;
    cmd.receipt_url = payload.receipt_url;

    let donation = state.engine.record_donation(cmd, &user.username).await?;
    Ok((StatusCode::CREATED, Json(donation_view(donation))))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<DonationListQuery>,
) -> Result<Json<DonationListResponse>, ServerError> {
    let donations = state
        .engine
        .list_donations(query.appeal_id, &user.username)
        .await?;
    Ok(Json(DonationListResponse {
        donations: donations.into_iter().map(donation_view).collect(),
    }))
}
