pub mod memory;
pub mod pool;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Compensation, LocationOptions, Offer, OfferDecision, Shift, UserRef};
use crate::negotiation::Resolution;
use crate::AppResult;

pub use memory::MemoryRepository;
pub use pool::{create_pool, ensure_schema};
pub use postgres::PgRepository;

/// Authoritative store for users, shifts and offers.
///
/// Every mutating method runs the negotiation rules while holding an
/// exclusive lock on the affected shift, so callers never see two winners
/// for one shift.
#[async_trait]
pub trait ShiftRepository: Send + Sync {
    async fn insert_user(&self, user: UserRef, email: &str) -> AppResult<UserRef>;
    async fn get_user(&self, uid: &str) -> AppResult<Option<UserRef>>;
    async fn delete_user(&self, uid: &str) -> AppResult<bool>;

    /// `shift` must already carry its id and owner.
    async fn insert_shift(&self, shift: Shift) -> AppResult<Shift>;
    async fn get_shift(&self, id: Uuid) -> AppResult<Option<Shift>>;
    /// Ordered by `offered_date`, oldest first.
    async fn list_shifts_by_owner(&self, uid: &str) -> AppResult<Vec<Shift>>;
    /// Shifts still open for pickup at `now`, soonest first.
    async fn list_available_shifts(&self, now: DateTime<Utc>) -> AppResult<Vec<Shift>>;
    async fn edit_shift(&self, editor: &str, edit: Shift, now: DateTime<Utc>) -> AppResult<Shift>;
    /// Returns the offers that were declined by the cascade.
    async fn delete_shift(&self, owner: &str, id: Uuid) -> AppResult<Vec<Uuid>>;

    async fn create_offer(
        &self,
        shift_id: Uuid,
        from: &str,
        compensation: Option<Compensation>,
        now: DateTime<Utc>,
    ) -> AppResult<Offer>;
    async fn respond_to_offer(
        &self,
        responder: &str,
        offer_id: Uuid,
        decision: OfferDecision,
        compensation: Option<Compensation>,
        now: DateTime<Utc>,
    ) -> AppResult<Resolution>;
    /// Decline every pending offer made by `uid`.
    async fn withdraw_offers(&self, uid: &str) -> AppResult<Vec<Uuid>>;
    async fn get_offer(&self, id: Uuid) -> AppResult<Option<Offer>>;
    async fn list_offers_for_shift(&self, shift_id: Uuid) -> AppResult<Vec<Offer>>;
    async fn list_offers_by_user(&self, uid: &str) -> AppResult<Vec<Offer>>;

    async fn locations(&self) -> AppResult<LocationOptions>;
}
