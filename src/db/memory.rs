use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::ShiftRepository;
use crate::lifecycle;
use crate::models::{Compensation, LocationOptions, Offer, OfferDecision, Shift, ShiftStatus, UserRef};
use crate::negotiation::{self, NegotiationError, Resolution};
use crate::{AppError, AppResult};

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, UserRef>,
    shifts: HashMap<Uuid, Shift>,
    offers: HashMap<Uuid, Offer>,
    locations: Vec<String>,
    locations_updated: Option<DateTime<Utc>>,
}

impl MemoryState {
    fn offers_for(&self, shift_id: Uuid) -> Vec<Offer> {
        let mut offers: Vec<Offer> = self
            .offers
            .values()
            .filter(|o| o.shift_id == shift_id)
            .cloned()
            .collect();
        offers.sort_by_key(|o| o.date);
        offers
    }

    fn store_offers(&mut self, offers: Vec<Offer>) {
        for offer in offers {
            self.offers.insert(offer.id, offer);
        }
    }
}

/// Process-local repository used when no database is configured and in
/// tests. A single mutex serializes every mutation.
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
        }
    }

    pub fn with_locations(options: Vec<String>, updated: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                locations: options,
                locations_updated: Some(updated),
                ..MemoryState::default()
            }),
        }
    }

    /// Replace the location options and bump their timestamp.
    pub async fn set_locations(&self, options: Vec<String>, updated: DateTime<Utc>) {
        let mut state = self.state.lock().await;
        state.locations = options;
        state.locations_updated = Some(updated);
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShiftRepository for MemoryRepository {
    async fn insert_user(&self, user: UserRef, _email: &str) -> AppResult<UserRef> {
        let mut state = self.state.lock().await;
        if state.users.contains_key(&user.id) {
            return Err(AppError::Conflict(format!("User {} already exists", user.id)));
        }
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, uid: &str) -> AppResult<Option<UserRef>> {
        Ok(self.state.lock().await.users.get(uid).cloned())
    }

    async fn delete_user(&self, uid: &str) -> AppResult<bool> {
        Ok(self.state.lock().await.users.remove(uid).is_some())
    }

    async fn insert_shift(&self, shift: Shift) -> AppResult<Shift> {
        let id = shift
            .id
            .ok_or_else(|| AppError::Internal("Cannot insert a shift without an id".to_string()))?;
        let mut state = self.state.lock().await;
        state.shifts.insert(id, shift.clone());
        Ok(shift)
    }

    async fn get_shift(&self, id: Uuid) -> AppResult<Option<Shift>> {
        Ok(self.state.lock().await.shifts.get(&id).cloned())
    }

    async fn list_shifts_by_owner(&self, uid: &str) -> AppResult<Vec<Shift>> {
        let state = self.state.lock().await;
        let mut shifts: Vec<Shift> = state
            .shifts
            .values()
            .filter(|s| s.is_owned_by(uid))
            .cloned()
            .collect();
        shifts.sort_by_key(|s| s.offered_date);
        Ok(shifts)
    }

    async fn list_available_shifts(&self, now: DateTime<Utc>) -> AppResult<Vec<Shift>> {
        let state = self.state.lock().await;
        let mut shifts: Vec<Shift> = state
            .shifts
            .values()
            .filter(|s| lifecycle::effective_status(s, now) == ShiftStatus::Available)
            .cloned()
            .collect();
        shifts.sort_by_key(|s| s.start);
        Ok(shifts)
    }

    async fn edit_shift(&self, editor: &str, edit: Shift, now: DateTime<Utc>) -> AppResult<Shift> {
        let id = edit
            .id
            .ok_or_else(|| AppError::BadRequest("Shift id is required".to_string()))?;
        let mut state = self.state.lock().await;
        let current = state
            .shifts
            .get(&id)
            .cloned()
            .ok_or(NegotiationError::ShiftNotFound(id))?;

        negotiation::check_edit(&current, editor, now)?;
        let updated = lifecycle::apply_edit(current, &edit);
        state.shifts.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_shift(&self, owner: &str, id: Uuid) -> AppResult<Vec<Uuid>> {
        let mut state = self.state.lock().await;
        let shift = state
            .shifts
            .get(&id)
            .ok_or(NegotiationError::ShiftNotFound(id))?;
        negotiation::check_delete(shift, owner)?;

        let mut offers = state.offers_for(id);
        let declined = negotiation::cascade_delete(&mut offers);
        state.store_offers(offers);
        state.shifts.remove(&id);
        Ok(declined)
    }

    async fn create_offer(
        &self,
        shift_id: Uuid,
        from: &str,
        compensation: Option<Compensation>,
        now: DateTime<Utc>,
    ) -> AppResult<Offer> {
        let mut state = self.state.lock().await;
        let mut shift = state
            .shifts
            .get(&shift_id)
            .cloned()
            .ok_or(NegotiationError::ShiftNotFound(shift_id))?;
        let existing = state.offers_for(shift_id);

        negotiation::check_pickup(&shift, from, &existing, now)?;
        let offer = negotiation::new_offer(Uuid::new_v4(), shift_id, from, compensation, now);
        negotiation::record_pickup(&mut shift, offer.id);

        state.offers.insert(offer.id, offer.clone());
        state.shifts.insert(shift_id, shift);
        Ok(offer)
    }

    async fn respond_to_offer(
        &self,
        responder: &str,
        offer_id: Uuid,
        decision: OfferDecision,
        compensation: Option<Compensation>,
        now: DateTime<Utc>,
    ) -> AppResult<Resolution> {
        let mut state = self.state.lock().await;
        let shift_id = state
            .offers
            .get(&offer_id)
            .map(|o| o.shift_id)
            .ok_or(NegotiationError::OfferNotFound(offer_id))?;
        let mut shift = state
            .shifts
            .get(&shift_id)
            .cloned()
            .ok_or(NegotiationError::ShiftNotFound(shift_id))?;
        let mut offers = state.offers_for(shift_id);

        let resolution = negotiation::resolve(
            &mut shift,
            &mut offers,
            offer_id,
            decision,
            compensation,
            responder,
            now,
        )?;

        state.store_offers(offers);
        state.shifts.insert(shift_id, shift);
        Ok(resolution)
    }

    async fn withdraw_offers(&self, uid: &str) -> AppResult<Vec<Uuid>> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let mut withdrawn = Vec::new();
        for offer in state.offers.values_mut().filter(|o| o.from == uid) {
            let shift = state.shifts.get_mut(&offer.shift_id);
            if negotiation::withdraw(shift, offer) {
                withdrawn.push(offer.id);
            }
        }
        Ok(withdrawn)
    }

    async fn get_offer(&self, id: Uuid) -> AppResult<Option<Offer>> {
        Ok(self.state.lock().await.offers.get(&id).cloned())
    }

    async fn list_offers_for_shift(&self, shift_id: Uuid) -> AppResult<Vec<Offer>> {
        Ok(self.state.lock().await.offers_for(shift_id))
    }

    async fn list_offers_by_user(&self, uid: &str) -> AppResult<Vec<Offer>> {
        let state = self.state.lock().await;
        let mut offers: Vec<Offer> = state
            .offers
            .values()
            .filter(|o| o.from == uid)
            .cloned()
            .collect();
        offers.sort_by_key(|o| o.date);
        Ok(offers)
    }

    async fn locations(&self) -> AppResult<LocationOptions> {
        let state = self.state.lock().await;
        Ok(LocationOptions {
            options: state.locations.clone(),
            last_updated: state.locations_updated.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        })
    }
}
