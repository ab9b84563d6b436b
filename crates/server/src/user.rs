//! Users table mirror used by the auth middleware and role gates.

use sea_orm::entity::prelude::*;

use crate::ServerError;

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

impl Model {
    /// Parses the stored role string.
    pub fn parsed_role(&self) -> Result<engine::Role, ServerError> {
        engine::Role::try_from(self.role.as_str()).map_err(ServerError::from)
    }
}

/// Gate a handler to admins.
pub fn require_admin(user: &Model) -> Result<(), ServerError> {
    if !user.parsed_role()?.is_admin() {
        return Err(ServerError::Engine(engine::EngineError::Forbidden(
            "only admin may perform this operation".to_string(),
        )));
    }
    Ok(())
}
