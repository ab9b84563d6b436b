//! Domain core of the Mawaddah charitable-giving platform.
//!
//! The engine owns the appeal lifecycle, the per-recipient wallet ledger,
//! the pooled system wallet and the fulfillment batch. All balance
//! mutations run under a row lock inside a database transaction, paired
//! with exactly one appended ledger row.

pub use appeals::{Appeal, AppealCategory, AppealStatus, FulfillmentSource};
pub use commands::{AppealNew, CreditCmd, DonationNew};
pub use currency::Currency;
pub use donations::{Donation, DonationType, PaymentMethod};
pub use error::EngineError;
pub use ledger::LedgerAction;
pub use money::Money;
pub use ops::{
    AppealListFilter, Engine, EngineBuilder, FulfillmentReport, PlatformOverview,
    RecipientStatsPage, RecipientWalletStats, WalletStats,
};
pub use system_ledger::SystemTransaction;
pub use system_wallet::SYSTEM_WALLET_ID;
pub use users::Role;
pub use wallet_transactions::{LedgerKind, TransferBy, WalletTransaction};
pub use wallets::Wallet;

mod appeals;
mod commands;
mod currency;
mod donations;
mod error;
mod ledger;
mod money;
mod ops;
mod system_ledger;
mod system_wallet;
mod users;
mod util;
mod wallet_transactions;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
