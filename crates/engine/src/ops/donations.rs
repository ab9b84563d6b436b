use chrono::Utc;
use uuid::Uuid;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{AppealStatus, Donation, DonationNew, EngineError, ResultEngine, donations};

use super::{Engine, with_tx};

impl Engine {
    /// Records a donation.
    ///
    /// The actor must hold the donor role and be the donation's donor. A
    /// targeted appeal must be `approved` at submission time; the status is
    /// not re-checked afterwards. No wallet is credited here.
    pub async fn record_donation(&self, cmd: DonationNew, actor: &str) -> ResultEngine<Donation> {
        with_tx!(self, |db_tx| {
            let (_, actor_role) = self.require_actor(&db_tx, actor).await?;
            if !actor_role.is_donor() {
                return Err(EngineError::Forbidden(
                    "only donors may create donations".to_string(),
                ));
            }
            if cmd.donor != actor {
                return Err(EngineError::Forbidden(
                    "a donation must be created by its donor".to_string(),
                ));
            }

            if let Some(appeal_id) = cmd.appeal_id {
                let appeal_model = self.require_appeal(&db_tx, appeal_id).await?;
                let status = AppealStatus::try_from(appeal_model.status.as_str())?;
                if status != AppealStatus::Approved {
                    return Err(EngineError::validation(
                        "appeal",
                        "appeal must be approved to accept donations",
                    ));
                }
            }

            let donation = Donation::new(cmd, Utc::now())?;
            donations::ActiveModel::from(&donation).insert(&db_tx).await?;
            Ok(donation)
        })
    }

    /// Returns a single donation. Donors see only their own; admins see all.
    pub async fn donation(&self, donation_id: Uuid, actor: &str) -> ResultEngine<Donation> {
        with_tx!(self, |db_tx| {
            let (_, actor_role) = self.require_actor(&db_tx, actor).await?;
            let model = donations::Entity::find_by_id(donation_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("donation not exists".to_string()))?;
            if model.donor != actor && !actor_role.is_admin() {
                return Err(EngineError::KeyNotFound("donation not exists".to_string()));
            }
            Donation::try_from(model)
        })
    }

    /// Lists donations newest-first, optionally narrowed to one appeal.
    ///
    /// Donors are restricted to their own donations; admins see all.
    pub async fn list_donations(
        &self,
        appeal_id: Option<Uuid>,
        actor: &str,
    ) -> ResultEngine<Vec<Donation>> {
        with_tx!(self, |db_tx| {
            let (_, actor_role) = self.require_actor(&db_tx, actor).await?;

            let mut query = donations::Entity::find();
            if !actor_role.is_admin() {
                if !actor_role.is_donor() {
                    return Err(EngineError::Forbidden(
                        "only donors and admins may list donations".to_string(),
                    ));
                }
                query = query.filter(donations::Column::Donor.eq(actor.to_string()));
            }
            if let Some(appeal_id) = appeal_id {
                query = query.filter(donations::Column::AppealId.eq(appeal_id.to_string()));
            }

            let models = query
                .order_by_desc(donations::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(Donation::try_from(model)?);
            }
            Ok(out)
        })
    }
}
