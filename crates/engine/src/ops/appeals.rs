use chrono::{DateTime, Utc};
use uuid::Uuid;

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Appeal, AppealCategory, AppealNew, AppealStatus, EngineError, ResultEngine, appeals,
    util::same_calendar_month,
};

use super::{Engine, with_tx};

/// Filters for listing appeals.
#[derive(Clone, Debug, Default)]
pub struct AppealListFilter {
    pub status: Option<AppealStatus>,
    pub category: Option<AppealCategory>,
    pub beneficiary: Option<String>,
    pub urgent_only: bool,
}

fn ensure_transition(current: AppealStatus, next: AppealStatus) -> ResultEngine<()> {
    if !current.can_become(next) {
        return Err(EngineError::InvalidTransition(format!(
            "{} -> {}",
            current.as_str(),
            next.as_str()
        )));
    }
    Ok(())
}

impl Engine {
    /// Submits a new appeal.
    ///
    /// Authorization: the beneficiary submitting their own appeal, or a
    /// reviewer creating one on a beneficiary's behalf.
    pub async fn create_appeal(&self, cmd: AppealNew, actor: &str) -> ResultEngine<Appeal> {
        with_tx!(self, |db_tx| {
            let (_, actor_role) = self.require_actor(&db_tx, actor).await?;
            if cmd.beneficiary != actor && !actor_role.is_reviewer() {
                return Err(EngineError::Forbidden(
                    "appeals may be submitted by the beneficiary or a reviewer".to_string(),
                ));
            }
            self.require_user(&db_tx, &cmd.beneficiary).await?;

            let appeal = Appeal::new(cmd, Utc::now())?;
            self.ensure_single_active_appeal(
                &db_tx,
                &appeal.beneficiary,
                appeal.category,
                appeal.created_at,
                None,
            )
            .await?;

            appeals::ActiveModel::from(&appeal).insert(&db_tx).await?;
            Ok(appeal)
        })
    }

    /// Approves a pending appeal. Reviewer only.
    pub async fn approve_appeal(&self, appeal_id: Uuid, actor: &str) -> ResultEngine<Appeal> {
        with_tx!(self, |db_tx| {
            self.require_reviewer(&db_tx, actor).await?;
            let model = self.require_appeal(&db_tx, appeal_id).await?;
            let mut appeal = Appeal::try_from(model)?;
            ensure_transition(appeal.status, AppealStatus::Approved)?;

            let now = Utc::now();
            appeal.status = AppealStatus::Approved;
            appeal.approved_by = Some(actor.to_string());
            appeal.approved_at = Some(now);
            appeal.updated_at = now;

            let active = appeals::ActiveModel {
                id: ActiveValue::Set(appeal.id.to_string()),
                status: ActiveValue::Set(appeal.status.as_str().to_string()),
                approved_by: ActiveValue::Set(appeal.approved_by.clone()),
                approved_at: ActiveValue::Set(appeal.approved_at),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(appeal)
        })
    }

    /// Rejects a pending appeal. Reviewer only; a non-empty reason is
    /// required.
    pub async fn reject_appeal(
        &self,
        appeal_id: Uuid,
        actor: &str,
        reason: &str,
    ) -> ResultEngine<Appeal> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(EngineError::validation(
                "rejection_reason",
                "Rejection reason required if status is rejected.",
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_reviewer(&db_tx, actor).await?;
            let model = self.require_appeal(&db_tx, appeal_id).await?;
            let mut appeal = Appeal::try_from(model)?;
            ensure_transition(appeal.status, AppealStatus::Rejected)?;

            let now = Utc::now();
            appeal.status = AppealStatus::Rejected;
            appeal.rejected_by = Some(actor.to_string());
            appeal.rejected_at = Some(now);
            appeal.rejection_reason = Some(reason.to_string());
            appeal.updated_at = now;

            let active = appeals::ActiveModel {
                id: ActiveValue::Set(appeal.id.to_string()),
                status: ActiveValue::Set(appeal.status.as_str().to_string()),
                rejected_by: ActiveValue::Set(appeal.rejected_by.clone()),
                rejected_at: ActiveValue::Set(appeal.rejected_at),
                rejection_reason: ActiveValue::Set(appeal.rejection_reason.clone()),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(appeal)
        })
    }

    /// Cancels a pending or approved appeal.
    ///
    /// Authorization: the beneficiary or a reviewer.
    pub async fn cancel_appeal(&self, appeal_id: Uuid, actor: &str) -> ResultEngine<Appeal> {
        with_tx!(self, |db_tx| {
            let (_, actor_role) = self.require_actor(&db_tx, actor).await?;
            let model = self.require_appeal(&db_tx, appeal_id).await?;
            let mut appeal = Appeal::try_from(model)?;
            if appeal.beneficiary != actor && !actor_role.is_reviewer() {
                return Err(EngineError::Forbidden(
                    "appeals may be cancelled by the beneficiary or a reviewer".to_string(),
                ));
            }
            ensure_transition(appeal.status, AppealStatus::Cancelled)?;

            let now = Utc::now();
            appeal.status = AppealStatus::Cancelled;
            appeal.cancelled_by = Some(actor.to_string());
            appeal.cancelled_at = Some(now);
            appeal.updated_at = now;

            let active = appeals::ActiveModel {
                id: ActiveValue::Set(appeal.id.to_string()),
                status: ActiveValue::Set(appeal.status.as_str().to_string()),
                cancelled_by: ActiveValue::Set(appeal.cancelled_by.clone()),
                cancelled_at: ActiveValue::Set(appeal.cancelled_at),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(appeal)
        })
    }

    /// Moves approved appeals whose expiry date has passed to `expired`.
    ///
    /// Returns the ids of the appeals that expired in this sweep. Invoked
    /// explicitly (HTTP/admin CLI), never scheduled.
    pub async fn expire_due_appeals(&self, now: DateTime<Utc>) -> ResultEngine<Vec<Uuid>> {
        with_tx!(self, |db_tx| {
            let due = appeals::Entity::find()
                .filter(appeals::Column::Status.eq(AppealStatus::Approved.as_str()))
                .filter(appeals::Column::ExpiryDate.is_not_null())
                .filter(appeals::Column::ExpiryDate.lt(now))
                .all(&db_tx)
                .await?;

            let mut expired = Vec::with_capacity(due.len());
            for model in due {
                let appeal = Appeal::try_from(model)?;
                let active = appeals::ActiveModel {
                    id: ActiveValue::Set(appeal.id.to_string()),
                    status: ActiveValue::Set(AppealStatus::Expired.as_str().to_string()),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                };
                active.update(&db_tx).await?;
                expired.push(appeal.id);
            }
            Ok(expired)
        })
    }

    /// Returns a single appeal.
    ///
    /// Recipients see only appeals they benefit from or submitted; reviewers
    /// see all.
    pub async fn appeal(&self, appeal_id: Uuid, actor: &str) -> ResultEngine<Appeal> {
        with_tx!(self, |db_tx| {
            let (_, actor_role) = self.require_actor(&db_tx, actor).await?;
            let model = self.require_appeal(&db_tx, appeal_id).await?;
            let appeal = Appeal::try_from(model)?;
            if appeal.beneficiary != actor && appeal.created_by != actor && !actor_role.is_reviewer()
            {
                return Err(EngineError::KeyNotFound("appeal not exists".to_string()));
            }
            Ok(appeal)
        })
    }

    /// Lists appeals newest-first.
    ///
    /// Non-reviewers are restricted to their own appeals regardless of the
    /// filter.
    pub async fn list_appeals(
        &self,
        filter: AppealListFilter,
        actor: &str,
    ) -> ResultEngine<Vec<Appeal>> {
        with_tx!(self, |db_tx| {
            let (_, actor_role) = self.require_actor(&db_tx, actor).await?;

            let mut query = appeals::Entity::find();
            if !actor_role.is_reviewer() {
                query = query.filter(appeals::Column::Beneficiary.eq(actor.to_string()));
            } else if let Some(beneficiary) = &filter.beneficiary {
                query = query.filter(appeals::Column::Beneficiary.eq(beneficiary.clone()));
            }
            if let Some(status) = filter.status {
                query = query.filter(appeals::Column::Status.eq(status.as_str()));
            }
            if let Some(category) = filter.category {
                query = query.filter(appeals::Column::Category.eq(category.as_str()));
            }
            if filter.urgent_only {
                query = query.filter(appeals::Column::IsUrgent.eq(true));
            }

            let models = query
                .order_by_desc(appeals::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(Appeal::try_from(model)?);
            }
            Ok(out)
        })
    }

    /// Enforces the one-active-appeal rule: at most one pending/approved
    /// appeal per (beneficiary, category, calendar month).
    async fn ensure_single_active_appeal(
        &self,
        db: &DatabaseTransaction,
        beneficiary: &str,
        category: AppealCategory,
        created_at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> ResultEngine<()> {
        let candidates = appeals::Entity::find()
            .filter(appeals::Column::Beneficiary.eq(beneficiary.to_string()))
            .filter(appeals::Column::Category.eq(category.as_str()))
            .filter(appeals::Column::Status.is_in([
                AppealStatus::Pending.as_str(),
                AppealStatus::Approved.as_str(),
            ]))
            .all(db)
            .await?;

        for model in candidates {
            if exclude.is_some_and(|id| id.to_string() == model.id) {
                continue;
            }
            if same_calendar_month(model.created_at, created_at) {
                return Err(EngineError::ExistingKey(
                    "Only one active appeal per user per category per month is allowed."
                        .to_string(),
                ));
            }
        }
        Ok(())
    }
}
