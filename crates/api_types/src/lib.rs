use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Pkr,
}

pub mod appeal {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AppealCategory {
        HouseRent,
        SchoolFee,
        Medical,
        UtilityBills,
        Debt,
        BusinessSupport,
        DeathSupport,
        Other,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AppealStatus {
        Pending,
        Approved,
        Rejected,
        Fulfilled,
        Expired,
        Cancelled,
    }

    /// Request body for submitting an appeal.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AppealSubmit {
        pub title: String,
        pub description: Option<String>,
        pub category: AppealCategory,
        pub amount_minor: i64,
        #[serde(default)]
        pub is_monthly: bool,
        pub months_required: Option<i32>,
        #[serde(default)]
        pub is_urgent: bool,
        /// Defaults to the authenticated user; reviewers may submit on
        /// behalf of another beneficiary.
        pub beneficiary: Option<String>,
        pub expiry_date: Option<DateTime<Utc>>,
    }

    /// Request body for rejecting an appeal.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AppealReject {
        pub reason: String,
    }

    /// Query parameters for listing appeals.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AppealListQuery {
        pub status: Option<AppealStatus>,
        pub category: Option<AppealCategory>,
        pub beneficiary: Option<String>,
        #[serde(default)]
        pub urgent_only: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AppealView {
        pub id: Uuid,
        pub title: String,
        pub description: Option<String>,
        pub category: AppealCategory,
        pub amount_minor: i64,
        pub is_monthly: bool,
        pub months_required: Option<i32>,
        pub status: AppealStatus,
        pub is_urgent: bool,
        pub created_by: String,
        pub beneficiary: String,
        pub is_donor_linked: bool,
        pub fulfillment_source: Option<String>,
        pub approved_by: Option<String>,
        pub approved_at: Option<DateTime<Utc>>,
        pub rejected_by: Option<String>,
        pub rejected_at: Option<DateTime<Utc>>,
        pub rejection_reason: Option<String>,
        pub cancelled_by: Option<String>,
        pub cancelled_at: Option<DateTime<Utc>>,
        pub fulfilled_at: Option<DateTime<Utc>>,
        pub expiry_date: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AppealListResponse {
        pub appeals: Vec<AppealView>,
    }
}

pub mod wallet {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletView {
        pub user: String,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletStatsView {
        pub total_credited_minor: i64,
        pub total_withdrawn_minor: i64,
        pub available_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerEntryView {
        pub id: Uuid,
        pub kind: String,
        pub amount_minor: i64,
        pub appeal_id: Option<Uuid>,
        pub donor_id: Option<String>,
        pub description: String,
        pub transfer_by: String,
        pub created_at: DateTime<Utc>,
    }

    /// Query parameters for listing ledger entries.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LedgerListQuery {
        pub limit: Option<u64>,
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerListResponse {
        pub transactions: Vec<LedgerEntryView>,
        pub next_cursor: Option<String>,
    }

    /// Request body for admin credit/debit/refund operations.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerAmount {
        pub amount_minor: i64,
        pub appeal_id: Option<Uuid>,
    }

    /// Request body for a signed admin balance adjustment.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceAdjust {
        pub amount_minor: i64,
        pub reason: String,
    }
}

pub mod donation {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DonationType {
        MawalatAlQurba,
        General,
        AppealSpecific,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentMethod {
        Stripe,
        Jazzcash,
        Easypaisa,
        BankTransfer,
        Manual,
    }

    /// Request body for recording a donation.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonationSubmit {
        pub amount_minor: i64,
        pub donation_type: Option<DonationType>,
        pub appeal_id: Option<Uuid>,
        pub note: Option<String>,
        pub payment_method: Option<PaymentMethod>,
        pub transaction_ref: Option<String>,
        pub receipt_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonationView {
        pub id: Uuid,
        pub donor: String,
        pub amount_minor: i64,
        pub currency: Currency,
        pub donation_type: DonationType,
        pub appeal_id: Option<Uuid>,
        pub note: Option<String>,
        pub payment_method: Option<PaymentMethod>,
        pub transaction_ref: Option<String>,
        pub receipt_url: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    /// Query parameters for listing donations.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DonationListQuery {
        pub appeal_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonationListResponse {
        pub donations: Vec<DonationView>,
    }
}

pub mod fulfillment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FulfillmentReportView {
        pub fulfilled: Vec<Uuid>,
        pub skipped: Vec<Uuid>,
        pub remaining_balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SystemWalletView {
        pub total_balance_minor: i64,
    }

    /// Request body for funding the system wallet.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SystemWalletFund {
        pub amount_minor: i64,
        pub related_donation_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpiredAppealsResponse {
        pub expired: Vec<Uuid>,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlatformOverviewView {
        pub total_transactions: u64,
        pub total_credits_minor: i64,
        pub total_debits_minor: i64,
        pub total_balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipientStatsView {
        pub username: String,
        pub full_name: Option<String>,
        pub total_received_minor: i64,
        pub total_withdrawn_minor: i64,
        pub current_balance_minor: i64,
    }

    /// Query parameters for the recipient stats page.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RecipientStatsQuery {
        pub page: Option<u64>,
        pub page_size: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipientStatsPageView {
        pub count: u64,
        pub results: Vec<RecipientStatsView>,
    }
}
