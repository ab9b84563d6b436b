//! Ledger descriptions and attribution.
//!
//! Every ledger row carries a human-readable description drawn from a fixed
//! vocabulary keyed by the action that produced it, and a `transfer_by` tag
//! naming who initiated it. Both are pure functions.

use uuid::Uuid;

use crate::{Role, TransferBy};

/// Action that produced a ledger entry; keys the description vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerAction {
    Donation,
    Withdrawal,
    RejectedWithdrawal,
    AdminCredit,
    ManualAdjustment,
    Refund,
}

/// Renders the ledger description for an action.
pub(crate) fn generate_description(
    action: LedgerAction,
    appeal_id: Option<Uuid>,
    reason: Option<&str>,
) -> String {
    match action {
        LedgerAction::Donation => match appeal_id {
            Some(id) => format!("Donation credited – Appeal #{id}"),
            None => "Donation credited".to_string(),
        },
        LedgerAction::Withdrawal => match appeal_id {
            Some(id) => format!("Funds disbursed – Appeal #{id}"),
            None => "Funds disbursed".to_string(),
        },
        LedgerAction::RejectedWithdrawal => match appeal_id {
            Some(id) => format!("Withdrawal rejected – Appeal #{id}"),
            None => "Withdrawal rejected".to_string(),
        },
        LedgerAction::AdminCredit => "Manual credit added by Admin".to_string(),
        LedgerAction::ManualAdjustment => match reason {
            Some(reason) => format!("Manual balance adjustment – {reason}"),
            None => "Manual balance adjustment".to_string(),
        },
        LedgerAction::Refund => match appeal_id {
            Some(id) => format!("Refund issued – Appeal #{id}"),
            None => "Refund issued".to_string(),
        },
    }
}

/// Resolves ledger attribution from the acting user's role.
///
/// Defaults to `System` when no actor is supplied or the role carries no
/// special attribution.
pub(crate) fn resolve_transfer_by(actor_role: Option<Role>) -> TransferBy {
    match actor_role {
        Some(Role::Donor) => TransferBy::Donor,
        Some(Role::Admin) => TransferBy::Admin,
        _ => TransferBy::System,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_follow_fixed_vocabulary() {
        let id = Uuid::new_v4();

        assert_eq!(
            generate_description(LedgerAction::Donation, Some(id), None),
            format!("Donation credited – Appeal #{id}")
        );
        assert_eq!(
            generate_description(LedgerAction::Withdrawal, None, None),
            "Funds disbursed"
        );
        assert_eq!(
            generate_description(LedgerAction::AdminCredit, Some(id), None),
            "Manual credit added by Admin"
        );
        assert_eq!(
            generate_description(LedgerAction::ManualAdjustment, None, Some("audit fix")),
            "Manual balance adjustment – audit fix"
        );
        assert_eq!(
            generate_description(LedgerAction::Refund, Some(id), None),
            format!("Refund issued – Appeal #{id}")
        );
    }

    #[test]
    fn attribution_follows_actor_role() {
        assert_eq!(resolve_transfer_by(Some(Role::Donor)), TransferBy::Donor);
        assert_eq!(resolve_transfer_by(Some(Role::Admin)), TransferBy::Admin);
        assert_eq!(resolve_transfer_by(Some(Role::Shura)), TransferBy::System);
        assert_eq!(resolve_transfer_by(Some(Role::Recipient)), TransferBy::System);
        assert_eq!(resolve_transfer_by(None), TransferBy::System);
    }
}
