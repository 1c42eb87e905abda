//! User-triggered operations as the view layer calls them.
//!
//! Validation runs locally before any request. Backend failures are logged
//! here and handed back as the typed error the view displays; nothing is
//! retried.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::api::ShiftApi;
use super::store::ShiftListStore;
use crate::error::{ErrorAlert, ErrorType, ShiftError};
use crate::lifecycle;
use crate::models::{
    Compensation, NewAccount, OfferDecision, PickupShiftInput, RespondToOfferInput,
    RespondToOfferResult, Shift, UserRef,
};

pub async fn save_shift(api: &dyn ShiftApi, draft: &Shift, now: DateTime<Utc>) -> Result<Uuid, ShiftError> {
    lifecycle::validate_shift(draft, now)?;

    api.save_shift(draft).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to save shift");
        ShiftError::saving(e.user_message())
    })
}

pub async fn edit_shift(api: &dyn ShiftApi, shift: &Shift, now: DateTime<Utc>) -> Result<(), ShiftError> {
    if shift.pending_offers > 0 {
        return Err(ShiftError::saving(
            "This shift has pending offers and can no longer be edited.",
        ));
    }
    lifecycle::validate_shift(shift, now)?;

    api.edit_shift(shift).await.map_err(|e| {
        tracing::error!(error = %e, shift_id = ?shift.id, "Failed to edit shift");
        ShiftError::saving(e.user_message())
    })
}

/// Removes the shift from `store` right away, then asks the backend to
/// delete it. On failure the shift goes back to the index it came from.
pub async fn delete_shift_optimistic(
    api: &dyn ShiftApi,
    store: &ShiftListStore,
    shift_id: Uuid,
) -> Result<(), ShiftError> {
    let removed = store
        .remove(shift_id)
        .await
        .map_err(|e| ShiftError::saving(e.to_string()))?;

    match api.delete_shift(shift_id).await {
        Ok(()) => {
            tracing::info!(shift_id = %shift_id, "Shift deleted");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, shift_id = %shift_id, "Failed to delete shift, restoring");
            if let Some((index, shift)) = removed {
                store
                    .restore(index, shift)
                    .await
                    .map_err(|closed| ShiftError::saving(closed.to_string()))?;
            }
            Err(ShiftError::saving(e.user_message()))
        }
    }
}

pub async fn pickup_shift(
    api: &dyn ShiftApi,
    shift: &Shift,
    uid: &str,
    compensation: Option<Compensation>,
) -> Result<Uuid, ShiftError> {
    let shift_id = shift
        .id
        .ok_or_else(|| ShiftError::saving("This shift has not been listed yet."))?;
    if shift.is_owned_by(uid) {
        return Err(ShiftError::saving("You cannot pick up your own shift."));
    }

    let input = PickupShiftInput {
        shift_id,
        compensation,
    };
    api.pickup_shift(&input).await.map_err(|e| {
        tracing::error!(error = %e, shift_id = %shift_id, "Failed to submit offer");
        ShiftError::saving(e.user_message())
    })
}

pub async fn respond_to_offer(
    api: &dyn ShiftApi,
    offer_id: Uuid,
    decision: OfferDecision,
    compensation: Option<Compensation>,
) -> Result<RespondToOfferResult, ErrorAlert> {
    let input = RespondToOfferInput {
        offer_id,
        status: decision,
        compensation,
    };

    api.respond_to_offer(&input).await.map_err(|e| {
        tracing::error!(error = %e, offer_id = %offer_id, ?decision, "Failed to respond to offer");
        let title = match decision {
            OfferDecision::Accepted => "Unable to accept offer",
            OfferDecision::Declined => "Unable to decline offer",
        };
        let message = if e.is_conflict() {
            "This offer was already handled. Refresh to see the latest state.".to_string()
        } else {
            e.user_message()
        };
        ErrorAlert::new(title, message)
    })
}

pub async fn create_account(api: &dyn ShiftApi, account: &NewAccount) -> Result<UserRef, ErrorType> {
    account.validate()?;

    api.create_account(account).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to create account");
        ErrorType::UpdateError
    })
}

pub async fn delete_account(api: &dyn ShiftApi, user_id: &str) -> Result<(), ErrorType> {
    if user_id.trim().is_empty() {
        return Err(ErrorType::InvalidUserId);
    }

    api.delete_account(user_id).await.map_err(|e| {
        tracing::error!(error = %e, uid = user_id, "Failed to delete account");
        ErrorType::UpdateError
    })
}
