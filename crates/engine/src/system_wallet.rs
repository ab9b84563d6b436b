//! The platform-level pooled balance funding platform-approved appeals.
//!
//! Stored as a single keyed row (`id = 1`) so mutation can take a row lock;
//! there is deliberately no language-level singleton. The row is created
//! lazily on first use.

use sea_orm::entity::prelude::*;

/// Key of the one system wallet row.
pub const SYSTEM_WALLET_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "system_wallet")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub total_balance: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
