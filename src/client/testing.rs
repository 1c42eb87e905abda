use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use super::api::{ClientError, ClientResult, ShiftApi};
use crate::lifecycle;
use crate::models::{
    LocationOptions, NewAccount, Offer, PickupShiftInput, RespondToOfferInput,
    RespondToOfferResult, Shift, ShiftStatus, UserRef,
};

/// In-process `ShiftApi` with switchable failures.
#[derive(Default)]
pub struct FakeApi {
    shifts: Mutex<Vec<Shift>>,
    users: Mutex<HashMap<String, UserRef>>,
    locations: Mutex<Option<LocationOptions>>,
    failing_fetches: Mutex<HashSet<Uuid>>,
    deleted: Mutex<Vec<Uuid>>,
    offline: AtomicBool,
    fail_deletes: AtomicBool,
    saves: AtomicUsize,
    location_fetches: AtomicUsize,
    user_fetches: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists a shift starting `hours_ahead` hours from now and returns its id.
    pub fn add_shift(&self, owner: &str, hours_ahead: i64) -> Uuid {
        let now = Utc::now();
        let mut draft = lifecycle::new_draft(owner, now + Duration::hours(hours_ahead));
        draft.location = "Gate 4".to_string();
        let id = Uuid::new_v4();
        let shift = lifecycle::publish(draft, id, owner, now);
        self.shifts.lock().unwrap().push(shift);
        id
    }

    pub fn shifts_in_order(&self, ids: &[Uuid]) -> Vec<Shift> {
        let shifts = self.shifts.lock().unwrap();
        ids.iter()
            .filter_map(|id| shifts.iter().find(|s| s.id == Some(*id)).cloned())
            .collect()
    }

    pub fn add_user(&self, uid: &str, first_name: &str) {
        let user = UserRef {
            id: uid.to_string(),
            first_name: first_name.to_string(),
            last_name: "Tester".to_string(),
            employee_number: "0001".to_string(),
            phone_number: "5550100".to_string(),
            profile_image_url: None,
        };
        self.users.lock().unwrap().insert(uid.to_string(), user);
    }

    pub fn set_locations(&self, options: Vec<String>, last_updated: DateTime<Utc>) {
        *self.locations.lock().unwrap() = Some(LocationOptions { options, last_updated });
    }

    pub fn fail_fetch(&self, id: Uuid) {
        self.failing_fetches.lock().unwrap().insert(id);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn deleted(&self) -> Vec<Uuid> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn location_fetches(&self) -> usize {
        self.location_fetches.load(Ordering::SeqCst)
    }

    pub fn user_fetches(&self) -> usize {
        self.user_fetches.load(Ordering::SeqCst)
    }

    fn online(&self) -> ClientResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

fn unavailable() -> ClientError {
    ClientError::Status {
        status: 503,
        message: "Service unavailable".to_string(),
    }
}

fn not_found(what: &str) -> ClientError {
    ClientError::Status {
        status: 404,
        message: format!("{} not found", what),
    }
}

#[async_trait]
impl ShiftApi for FakeApi {
    async fn create_account(&self, account: &NewAccount) -> ClientResult<UserRef> {
        self.online()?;
        let user = account.clone().into_user_ref("fake-uid");
        self.users.lock().unwrap().insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn delete_account(&self, user_id: &str) -> ClientResult<()> {
        self.online()?;
        self.users.lock().unwrap().remove(user_id);
        Ok(())
    }

    async fn save_shift(&self, shift: &Shift) -> ClientResult<Uuid> {
        self.online()?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        let id = Uuid::new_v4();
        let owner = shift.created_by.clone().unwrap_or_default();
        let listed = lifecycle::publish(shift.clone(), id, &owner, Utc::now());
        self.shifts.lock().unwrap().push(listed);
        Ok(id)
    }

    async fn edit_shift(&self, shift: &Shift) -> ClientResult<()> {
        self.online()?;
        let mut shifts = self.shifts.lock().unwrap();
        let current = shifts
            .iter_mut()
            .find(|s| s.id.is_some() && s.id == shift.id)
            .ok_or_else(|| not_found("Shift"))?;
        *current = lifecycle::apply_edit(current.clone(), shift);
        Ok(())
    }

    async fn delete_shift(&self, shift_id: Uuid) -> ClientResult<()> {
        self.online()?;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.shifts.lock().unwrap().retain(|s| s.id != Some(shift_id));
        self.deleted.lock().unwrap().push(shift_id);
        Ok(())
    }

    async fn pickup_shift(&self, _input: &PickupShiftInput) -> ClientResult<Uuid> {
        self.online()?;
        Ok(Uuid::new_v4())
    }

    async fn respond_to_offer(&self, input: &RespondToOfferInput) -> ClientResult<RespondToOfferResult> {
        self.online()?;
        Err(not_found(&format!("Offer {}", input.offer_id)))
    }

    async fn shift(&self, id: Uuid) -> ClientResult<Shift> {
        self.online()?;
        if self.failing_fetches.lock().unwrap().contains(&id) {
            return Err(unavailable());
        }
        self.shifts
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == Some(id))
            .cloned()
            .ok_or_else(|| not_found("Shift"))
    }

    async fn my_shifts(&self) -> ClientResult<Vec<Shift>> {
        self.online()?;
        Ok(self.shifts.lock().unwrap().clone())
    }

    async fn pickable_shifts(&self) -> ClientResult<Vec<Shift>> {
        self.online()?;
        Ok(self
            .shifts
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.stored_status() == ShiftStatus::Available)
            .cloned()
            .collect())
    }

    async fn offered_refs(&self, uid: &str) -> ClientResult<Vec<Uuid>> {
        self.online()?;
        Ok(self
            .shifts
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.is_owned_by(uid))
            .filter_map(|s| s.id)
            .collect())
    }

    async fn offer(&self, id: Uuid) -> ClientResult<Offer> {
        self.online()?;
        Err(not_found(&format!("Offer {}", id)))
    }

    async fn offers_for_shift(&self, _shift_id: Uuid) -> ClientResult<Vec<Offer>> {
        self.online()?;
        Ok(Vec::new())
    }

    async fn user(&self, uid: &str) -> ClientResult<UserRef> {
        self.online()?;
        self.user_fetches.fetch_add(1, Ordering::SeqCst);
        self.users
            .lock()
            .unwrap()
            .get(uid)
            .cloned()
            .ok_or_else(|| not_found("User"))
    }

    async fn locations(&self) -> ClientResult<LocationOptions> {
        self.online()?;
        self.location_fetches.fetch_add(1, Ordering::SeqCst);
        self.locations.lock().unwrap().clone().ok_or_else(|| not_found("Locations"))
    }

    async fn locations_last_updated(&self) -> ClientResult<DateTime<Utc>> {
        self.online()?;
        self.locations
            .lock()
            .unwrap()
            .as_ref()
            .map(|l| l.last_updated)
            .ok_or_else(|| not_found("Locations"))
    }
}
