use chrono::Utc;
use metrics::counter;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::db::ShiftRepository;
use crate::error::ErrorType;
use crate::lifecycle;
use crate::models::{
    LocationOptions, NewAccount, Offer, OfferedShiftRefs, PickupShiftInput, RespondToOfferInput,
    RespondToOfferResult, Shift, UserRef,
};
use crate::negotiation::NegotiationError;
use crate::{AppError, AppResult};

/// Server-side entry point for every shift and offer operation.
///
/// Validation runs before any repository call, so a rejected draft never
/// costs a round trip to the database.
#[derive(Clone)]
pub struct OfferEngine {
    repo: Arc<dyn ShiftRepository>,
    users: Cache<String, UserRef>,
}

impl OfferEngine {
    pub fn new(repo: Arc<dyn ShiftRepository>, user_cache_ttl: Duration) -> Self {
        let users = Cache::builder()
            .time_to_live(user_cache_ttl)
            .max_capacity(10_000)
            .build();
        Self { repo, users }
    }

    pub async fn create_account(&self, uid: &str, account: NewAccount) -> AppResult<UserRef> {
        if uid.trim().is_empty() {
            return Err(ErrorType::InvalidUserId.into());
        }
        account.validate()?;

        let email = account.email.trim().to_string();
        let user = self
            .repo
            .insert_user(account.into_user_ref(uid), &email)
            .await?;

        tracing::info!(uid, "Account created");
        self.users.insert(user.id.clone(), user.clone()).await;
        Ok(user)
    }

    /// Deletes the caller's shifts (declining their offers), withdraws the
    /// caller's pending offers and removes the profile.
    pub async fn delete_account(&self, caller: &str, user_id: &str) -> AppResult<()> {
        if user_id.trim().is_empty() {
            return Err(ErrorType::InvalidUserId.into());
        }
        if caller != user_id {
            return Err(AppError::Forbidden("You can only delete your own account".to_string()));
        }

        for shift in self.repo.list_shifts_by_owner(user_id).await? {
            if let Some(id) = shift.id {
                self.repo.delete_shift(user_id, id).await?;
            }
        }
        let withdrawn = self.repo.withdraw_offers(user_id).await?;
        let existed = self.repo.delete_user(user_id).await?;
        self.users.invalidate(user_id).await;

        tracing::info!(uid = user_id, withdrawn = withdrawn.len(), existed, "Account deleted");
        Ok(())
    }

    pub async fn save_shift(&self, uid: &str, draft: Shift) -> AppResult<Shift> {
        let now = Utc::now();
        lifecycle::validate_shift(&draft, now)?;
        if !draft.compensation.is_well_formed() {
            return Err(AppError::BadRequest("Sale amount must be a non-negative number".to_string()));
        }

        let shift = lifecycle::publish(draft, Uuid::new_v4(), uid, now);
        let shift = self.repo.insert_shift(shift).await?;

        counter!("shifts_created_total").increment(1);
        tracing::info!(
            uid,
            shift_id = ?shift.id,
            compensation = ?shift.compensation.kind(),
            "Shift listed"
        );
        Ok(shift)
    }

    pub async fn edit_shift(&self, uid: &str, edit: Shift) -> AppResult<Shift> {
        let now = Utc::now();
        if edit.id.is_none() {
            return Err(AppError::BadRequest("Shift id is required".to_string()));
        }
        lifecycle::validate_shift(&edit, now)?;
        if !edit.compensation.is_well_formed() {
            return Err(AppError::BadRequest("Sale amount must be a non-negative number".to_string()));
        }

        let shift = self.repo.edit_shift(uid, edit, now).await.map_err(|e| {
            tracing::warn!(error = %e, uid, "Shift edit rejected");
            e
        })?;

        tracing::info!(uid, shift_id = ?shift.id, "Shift edited");
        Ok(shift)
    }

    pub async fn delete_shift(&self, uid: &str, shift_id: Uuid) -> AppResult<Vec<Uuid>> {
        let declined = self.repo.delete_shift(uid, shift_id).await.map_err(|e| {
            tracing::error!(error = %e, uid, shift_id = %shift_id, "Failed to delete shift");
            e
        })?;

        tracing::info!(uid, shift_id = %shift_id, declined = declined.len(), "Shift deleted");
        Ok(declined)
    }

    pub async fn submit_offer(&self, uid: &str, input: PickupShiftInput) -> AppResult<Offer> {
        if let Some(compensation) = &input.compensation {
            if !compensation.is_well_formed() {
                return Err(AppError::BadRequest("Sale amount must be a non-negative number".to_string()));
            }
        }

        let offer = self
            .repo
            .create_offer(input.shift_id, uid, input.compensation, Utc::now())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, uid, shift_id = %input.shift_id, "Offer rejected");
                e
            })?;

        counter!("offers_submitted_total").increment(1);
        tracing::info!(uid, shift_id = %offer.shift_id, offer_id = %offer.id, "Offer submitted");
        Ok(offer)
    }

    pub async fn respond_to_offer(
        &self,
        uid: &str,
        input: RespondToOfferInput,
    ) -> AppResult<RespondToOfferResult> {
        let resolution = self
            .repo
            .respond_to_offer(uid, input.offer_id, input.status, input.compensation, Utc::now())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, uid, offer_id = %input.offer_id, "Offer response rejected");
                e
            })?;

        counter!("offers_resolved_total", "status" => resolution.offer.status.as_str()).increment(1);
        tracing::info!(
            uid,
            offer_id = %resolution.offer.id,
            shift_id = %resolution.offer.shift_id,
            status = %resolution.offer.status,
            declined = resolution.declined_siblings.len(),
            "Offer resolved"
        );

        Ok(RespondToOfferResult {
            success: true,
            offer_id: resolution.offer.id,
            offer_status: resolution.offer.status,
            shift_id: resolution.offer.shift_id,
            shift_status: resolution.shift_status,
            pending_offers: resolution.pending_offers,
            declined_offers: resolution.declined_siblings,
        })
    }

    pub async fn shift(&self, id: Uuid) -> AppResult<Shift> {
        let shift = self
            .repo
            .get_shift(id)
            .await?
            .ok_or(NegotiationError::ShiftNotFound(id))?;
        Ok(lifecycle::with_effective_status(shift, Utc::now()))
    }

    pub async fn my_shifts(&self, uid: &str) -> AppResult<Vec<Shift>> {
        let now = Utc::now();
        Ok(self
            .repo
            .list_shifts_by_owner(uid)
            .await?
            .into_iter()
            .map(|s| lifecycle::with_effective_status(s, now))
            .collect())
    }

    /// Open shifts the caller could pick up: not their own, not yet ended.
    pub async fn pickable_shifts(&self, uid: &str) -> AppResult<Vec<Shift>> {
        let now = Utc::now();
        Ok(self
            .repo
            .list_available_shifts(now)
            .await?
            .into_iter()
            .filter(|s| !s.is_owned_by(uid))
            .map(|s| lifecycle::with_effective_status(s, now))
            .collect())
    }

    pub async fn offered_refs(&self, uid: &str) -> AppResult<OfferedShiftRefs> {
        let refs = self
            .repo
            .list_shifts_by_owner(uid)
            .await?
            .into_iter()
            .filter_map(|s| s.id)
            .collect();
        Ok(OfferedShiftRefs { refs })
    }

    pub async fn offers_for_shift(&self, uid: &str, shift_id: Uuid) -> AppResult<Vec<Offer>> {
        let shift = self
            .repo
            .get_shift(shift_id)
            .await?
            .ok_or(NegotiationError::ShiftNotFound(shift_id))?;
        if !shift.is_owned_by(uid) {
            return Err(NegotiationError::NotOwner(shift_id).into());
        }
        self.repo.list_offers_for_shift(shift_id).await
    }

    /// Visible to the offering user and to the owner of the shift.
    pub async fn offer(&self, uid: &str, offer_id: Uuid) -> AppResult<Offer> {
        let offer = self
            .repo
            .get_offer(offer_id)
            .await?
            .ok_or(NegotiationError::OfferNotFound(offer_id))?;
        if offer.from == uid {
            return Ok(offer);
        }

        match self.repo.get_shift(offer.shift_id).await? {
            Some(shift) if shift.is_owned_by(uid) => Ok(offer),
            _ => Err(AppError::Forbidden(format!("Offer {} is not visible to you", offer_id))),
        }
    }

    pub async fn my_offers(&self, uid: &str) -> AppResult<Vec<Offer>> {
        self.repo.list_offers_by_user(uid).await
    }

    pub async fn user(&self, uid: &str) -> AppResult<UserRef> {
        if let Some(user) = self.users.get(uid).await {
            tracing::debug!(uid, "User resolved from cache");
            return Ok(user);
        }

        let user = self
            .repo
            .get_user(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))?;
        self.users.insert(uid.to_string(), user.clone()).await;
        Ok(user)
    }

    pub async fn locations(&self) -> AppResult<LocationOptions> {
        self.repo.locations().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRepository;
    use crate::error::ShiftErrorType;
    use crate::models::{Compensation, OfferDecision, OfferStatus, ShiftStatus};
    use chrono::Duration as TimeDelta;

    fn engine() -> OfferEngine {
        OfferEngine::new(Arc::new(MemoryRepository::new()), Duration::from_secs(60))
    }

    fn draft(owner: &str) -> Shift {
        let mut shift = lifecycle::new_draft(owner, Utc::now() + TimeDelta::days(1));
        shift.location = "Baggage Hall".to_string();
        shift
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_defaults() {
        let engine = engine();
        let mut d = draft("U1");
        d.pending_offers = 7;
        let shift = engine.save_shift("U1", d).await.unwrap();

        assert!(shift.id.is_some());
        assert_eq!(shift.pending_offers, 0);
        assert_eq!(shift.status, Some(ShiftStatus::Available));
        assert_eq!(shift.created_by.as_deref(), Some("U1"));
    }

    #[tokio::test]
    async fn test_invalid_draft_never_persists() {
        let engine = engine();
        let mut d = draft("U1");
        d.location = String::new();
        let err = engine.save_shift("U1", d).await.unwrap_err();
        assert!(matches!(err, AppError::Shift(ref e) if e.kind == ShiftErrorType::Location));
        assert!(engine.my_shifts("U1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_self_offer_rejected() {
        let engine = engine();
        let shift = engine.save_shift("U1", draft("U1")).await.unwrap();
        let input = PickupShiftInput {
            shift_id: shift.id.unwrap(),
            compensation: None,
        };
        let err = engine.submit_offer("U1", input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_accept_one_of_two_offers() {
        let engine = engine();
        let shift = engine.save_shift("U1", draft("U1")).await.unwrap();
        let shift_id = shift.id.unwrap();

        let a = engine
            .submit_offer("U2", PickupShiftInput { shift_id, compensation: None })
            .await
            .unwrap();
        let b = engine
            .submit_offer(
                "U3",
                PickupShiftInput {
                    shift_id,
                    compensation: Some(Compensation::Sell { amount: 20.0 }),
                },
            )
            .await
            .unwrap();
        assert_eq!(engine.shift(shift_id).await.unwrap().pending_offers, 2);

        let result = engine
            .respond_to_offer(
                "U1",
                RespondToOfferInput {
                    offer_id: a.id,
                    status: OfferDecision::Accepted,
                    compensation: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(result.offer_status, OfferStatus::Accepted);
        assert_eq!(result.shift_status, ShiftStatus::Accepted);
        assert_eq!(result.pending_offers, 0);
        assert_eq!(result.declined_offers, vec![b.id]);
        assert_eq!(engine.offer("U3", b.id).await.unwrap().status, OfferStatus::Declined);
        assert!(engine.pickable_shifts("U4").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_with_pending_offer_conflicts() {
        let engine = engine();
        let shift = engine.save_shift("U1", draft("U1")).await.unwrap();
        let shift_id = shift.id.unwrap();
        engine
            .submit_offer("U2", PickupShiftInput { shift_id, compensation: None })
            .await
            .unwrap();

        let mut edit = shift.clone();
        edit.location = "Gate 4".to_string();
        let err = engine.edit_shift("U1", edit).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_offers_hidden_from_strangers() {
        let engine = engine();
        let shift = engine.save_shift("U1", draft("U1")).await.unwrap();
        let shift_id = shift.id.unwrap();
        let offer = engine
            .submit_offer("U2", PickupShiftInput { shift_id, compensation: None })
            .await
            .unwrap();

        assert!(engine.offer("U1", offer.id).await.is_ok());
        assert!(matches!(engine.offer("U3", offer.id).await, Err(AppError::Forbidden(_))));
        assert!(matches!(engine.offers_for_shift("U2", shift_id).await, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_account_cleans_up() {
        let engine = engine();
        let account = NewAccount {
            first_name: "Sam".to_string(),
            last_name: "Okafor".to_string(),
            email: "sam@example.com".to_string(),
            employee_number: "7781".to_string(),
            phone_number: "5550102030".to_string(),
        };
        engine.create_account("U2", account).await.unwrap();
        assert_eq!(engine.user("U2").await.unwrap().first_name, "Sam");

        let theirs = engine.save_shift("U2", draft("U2")).await.unwrap();
        let other = engine.save_shift("U1", draft("U1")).await.unwrap();
        let other_id = other.id.unwrap();
        engine
            .submit_offer("U2", PickupShiftInput { shift_id: other_id, compensation: None })
            .await
            .unwrap();

        engine.delete_account("U2", "U2").await.unwrap();

        assert!(matches!(engine.shift(theirs.id.unwrap()).await, Err(AppError::NotFound(_))));
        assert_eq!(engine.shift(other_id).await.unwrap().pending_offers, 0);
        assert!(matches!(engine.user("U2").await, Err(AppError::NotFound(_))));
    }
}
