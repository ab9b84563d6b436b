//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Mawaddah:
//!
//! - `users`: authentication and roles
//! - `appeals`: funding requests with lifecycle trace fields
//! - `wallets`: per-recipient balances
//! - `wallet_transactions`: append-only per-recipient ledger
//! - `system_wallet`: pooled platform balance (single keyed row)
//! - `system_wallet_transactions`: append-only system ledger
//! - `donations`: donor pledges with stored payment metadata

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Role,
    FullName,
}

#[derive(Iden)]
enum Appeals {
    Table,
    Id,
    Title,
    Description,
    Category,
    AmountMinor,
    IsMonthly,
    MonthsRequired,
    Status,
    IsUrgent,
    CreatedBy,
    Beneficiary,
    LinkedDonationId,
    ApprovedBy,
    ApprovedAt,
    RejectedBy,
    RejectedAt,
    RejectionReason,
    CancelledBy,
    CancelledAt,
    FulfilledAt,
    ExpiryDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Wallets {
    Table,
    Id,
    UserId,
    Balance,
    CreatedAt,
}

#[derive(Iden)]
enum WalletTransactions {
    Table,
    Id,
    WalletId,
    Kind,
    AmountMinor,
    AppealId,
    DonorId,
    Description,
    TransferBy,
    CreatedAt,
}

#[derive(Iden)]
enum SystemWallet {
    Table,
    Id,
    TotalBalance,
    UpdatedAt,
}

#[derive(Iden)]
enum SystemWalletTransactions {
    Table,
    Id,
    Kind,
    AmountMinor,
    Description,
    TransferBy,
    RelatedDonationId,
    CreatedAt,
}

#[derive(Iden)]
enum Donations {
    Table,
    Id,
    Donor,
    AmountMinor,
    Currency,
    DonationType,
    AppealId,
    Note,
    PaymentMethod,
    TransactionRef,
    ReceiptUrl,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("user"),
                    )
                    .col(ColumnDef::new(Users::FullName).string())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Appeals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Appeals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Appeals::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Appeals::Title).string().not_null())
                    .col(ColumnDef::new(Appeals::Description).string())
                    .col(ColumnDef::new(Appeals::Category).string().not_null())
                    .col(
                        ColumnDef::new(Appeals::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Appeals::IsMonthly).boolean().not_null())
                    .col(ColumnDef::new(Appeals::MonthsRequired).integer())
                    .col(
                        ColumnDef::new(Appeals::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Appeals::IsUrgent).boolean().not_null())
                    .col(ColumnDef::new(Appeals::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Appeals::Beneficiary).string().not_null())
                    .col(ColumnDef::new(Appeals::LinkedDonationId).string())
                    .col(ColumnDef::new(Appeals::ApprovedBy).string())
                    .col(ColumnDef::new(Appeals::ApprovedAt).timestamp())
                    .col(ColumnDef::new(Appeals::RejectedBy).string())
                    .col(ColumnDef::new(Appeals::RejectedAt).timestamp())
                    .col(ColumnDef::new(Appeals::RejectionReason).string())
                    .col(ColumnDef::new(Appeals::CancelledBy).string())
                    .col(ColumnDef::new(Appeals::CancelledAt).timestamp())
                    .col(ColumnDef::new(Appeals::FulfilledAt).timestamp())
                    .col(ColumnDef::new(Appeals::ExpiryDate).timestamp())
                    .col(ColumnDef::new(Appeals::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Appeals::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-appeals-created_by")
                            .from(Appeals::Table, Appeals::CreatedBy)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-appeals-beneficiary")
                            .from(Appeals::Table, Appeals::Beneficiary)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-appeals-review-scan")
                    .table(Appeals::Table)
                    .col(Appeals::Category)
                    .col(Appeals::Status)
                    .col(Appeals::Beneficiary)
                    .col(Appeals::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Wallets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Wallets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Wallets::UserId).string().not_null())
                    .col(ColumnDef::new(Wallets::Balance).big_integer().not_null())
                    .col(ColumnDef::new(Wallets::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wallets-user_id")
                            .from(Wallets::Table, Wallets::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wallets-user_id-unique")
                    .table(Wallets::Table)
                    .col(Wallets::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Wallet transactions (per-recipient ledger)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(WalletTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::WalletId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WalletTransactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(WalletTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WalletTransactions::AppealId).string())
                    .col(ColumnDef::new(WalletTransactions::DonorId).string())
                    .col(
                        ColumnDef::new(WalletTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::TransferBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wallet_transactions-wallet_id")
                            .from(WalletTransactions::Table, WalletTransactions::WalletId)
                            .to(Wallets::Table, Wallets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wallet_transactions-appeal_id")
                            .from(WalletTransactions::Table, WalletTransactions::AppealId)
                            .to(Appeals::Table, Appeals::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wallet_transactions-wallet_id-created_at")
                    .table(WalletTransactions::Table)
                    .col(WalletTransactions::WalletId)
                    .col(WalletTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. System wallet (single keyed row, locked on mutation)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SystemWallet::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SystemWallet::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SystemWallet::TotalBalance)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SystemWallet::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. System wallet transactions (system ledger)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SystemWalletTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SystemWalletTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SystemWalletTransactions::Kind)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SystemWalletTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SystemWalletTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SystemWalletTransactions::TransferBy)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SystemWalletTransactions::RelatedDonationId).string())
                    .col(
                        ColumnDef::new(SystemWalletTransactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-system_wallet_transactions-created_at")
                    .table(SystemWalletTransactions::Table)
                    .col(SystemWalletTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Donations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Donations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Donations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Donations::Donor).string().not_null())
                    .col(
                        ColumnDef::new(Donations::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Donations::Currency)
                            .string()
                            .not_null()
                            .default("PKR"),
                    )
                    .col(
                        ColumnDef::new(Donations::DonationType)
                            .string()
                            .not_null()
                            .default("mawalat_al_qurba"),
                    )
                    .col(ColumnDef::new(Donations::AppealId).string())
                    .col(ColumnDef::new(Donations::Note).string())
                    .col(ColumnDef::new(Donations::PaymentMethod).string())
                    .col(ColumnDef::new(Donations::TransactionRef).string())
                    .col(ColumnDef::new(Donations::ReceiptUrl).string())
                    .col(ColumnDef::new(Donations::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-donations-donor")
                            .from(Donations::Table, Donations::Donor)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-donations-appeal_id")
                            .from(Donations::Table, Donations::AppealId)
                            .to(Appeals::Table, Appeals::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-donations-donor-created_at")
                    .table(Donations::Table)
                    .col(Donations::Donor)
                    .col(Donations::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-donations-donation_type")
                    .table(Donations::Table)
                    .col(Donations::DonationType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Donations::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(SystemWalletTransactions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(SystemWallet::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WalletTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wallets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Appeals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}
