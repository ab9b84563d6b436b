//! Capability checks and shared lookup helpers.
//!
//! Authorization is expressed as one capability check per operation:
//! reviewers = {shura, admin} act on appeals, admins = {admin} operate
//! wallets and analytics, donors = {donor} create donations.

use sea_orm::{DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Role, appeals, users};

use super::Engine;

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Loads an actor and parses their role.
    pub(super) async fn require_actor(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<(users::Model, Role)> {
        let model = self.require_user(db, username).await?;
        let role = Role::try_from(model.role.as_str())?;
        Ok((model, role))
    }

    pub(super) async fn require_reviewer(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<Role> {
        let (_, role) = self.require_actor(db, username).await?;
        if !role.is_reviewer() {
            return Err(EngineError::Forbidden(
                "only shura or admin may review appeals".to_string(),
            ));
        }
        Ok(role)
    }

    pub(super) async fn require_admin(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<Role> {
        let (_, role) = self.require_actor(db, username).await?;
        if !role.is_admin() {
            return Err(EngineError::Forbidden(
                "only admin may perform this operation".to_string(),
            ));
        }
        Ok(role)
    }

    /// Role of an optional actor, for ledger attribution.
    pub(super) async fn actor_role(
        &self,
        db: &DatabaseTransaction,
        actor: Option<&str>,
    ) -> ResultEngine<Option<Role>> {
        match actor {
            Some(username) => {
                let (_, role) = self.require_actor(db, username).await?;
                Ok(Some(role))
            }
            None => Ok(None),
        }
    }

    pub(super) async fn require_appeal(
        &self,
        db: &DatabaseTransaction,
        appeal_id: Uuid,
    ) -> ResultEngine<appeals::Model> {
        appeals::Entity::find_by_id(appeal_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("appeal not exists".to_string()))
    }
}
