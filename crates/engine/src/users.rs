//! Users table and the platform role model.
//!
//! The engine stores actors by `username`. A user's `role` drives every
//! capability check: reviewers (shura/admin) act on appeals, admins operate
//! wallets directly, donors create donations.

use sea_orm::entity::prelude::*;

use crate::EngineError;

/// Platform role of a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Donor,
    Recipient,
    Shura,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Donor => "donor",
            Self::Recipient => "recipient",
            Self::Shura => "shura",
            Self::Admin => "admin",
        }
    }

    /// Reviewers may approve/reject appeals and create them on behalf of a
    /// beneficiary.
    #[must_use]
    pub fn is_reviewer(self) -> bool {
        matches!(self, Self::Shura | Self::Admin)
    }

    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    #[must_use]
    pub fn is_donor(self) -> bool {
        matches!(self, Self::Donor)
    }

    #[must_use]
    pub fn is_recipient(self) -> bool {
        matches!(self, Self::Recipient)
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "donor" => Ok(Self::Donor),
            "recipient" => Ok(Self::Recipient),
            "shura" => Ok(Self::Shura),
            "admin" => Ok(Self::Admin),
            other => Err(EngineError::InvalidRole(format!("invalid role: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    pub role: String,
    pub full_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
