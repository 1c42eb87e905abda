use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::ShiftRepository;
use crate::lifecycle;
use crate::models::{
    Compensation, LocationOptions, Offer, OfferDecision, OfferStatus, Shift, ShiftStatus, UserRef,
};
use crate::negotiation::{self, NegotiationError, Resolution};
use crate::{AppError, AppResult};

const SHIFT_COLUMNS: &str = r#"
    id, created_by, offered_date, start_at, end_at, location,
    compensation, status, offers_ref, pending_offers
"#;

const OFFER_COLUMNS: &str = "id, shift_id, from_user, created_at, status, compensation";

#[derive(Debug, FromRow)]
struct ShiftRow {
    id: Uuid,
    created_by: String,
    offered_date: DateTime<Utc>,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    location: String,
    compensation: Json<Compensation>,
    status: String,
    offers_ref: Vec<Uuid>,
    pending_offers: i32,
}

impl TryFrom<ShiftRow> for Shift {
    type Error = AppError;

    fn try_from(row: ShiftRow) -> Result<Self, Self::Error> {
        let status: ShiftStatus = row.status.parse().map_err(AppError::Internal)?;
        Ok(Shift {
            id: Some(row.id),
            created_by: Some(row.created_by),
            offered_date: row.offered_date,
            start: row.start_at,
            end: row.end_at,
            location: row.location,
            compensation: row.compensation.0,
            status: Some(status),
            offers_ref: row.offers_ref,
            pending_offers: row.pending_offers,
        })
    }
}

#[derive(Debug, FromRow)]
struct OfferRow {
    id: Uuid,
    shift_id: Uuid,
    from_user: String,
    created_at: DateTime<Utc>,
    status: String,
    compensation: Option<Json<Compensation>>,
}

impl TryFrom<OfferRow> for Offer {
    type Error = AppError;

    fn try_from(row: OfferRow) -> Result<Self, Self::Error> {
        let status: OfferStatus = row.status.parse().map_err(AppError::Internal)?;
        Ok(Offer {
            id: row.id,
            shift_id: row.shift_id,
            from: row.from_user,
            date: row.created_at,
            status,
            compensation: row.compensation.map(|c| c.0),
        })
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    first_name: String,
    last_name: String,
    employee_number: String,
    phone_number: String,
    profile_image_url: Option<String>,
}

impl From<UserRow> for UserRef {
    fn from(row: UserRow) -> Self {
        UserRef {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            employee_number: row.employee_number,
            phone_number: row.phone_number,
            profile_image_url: row.profile_image_url,
        }
    }
}

fn shifts_from_rows(rows: Vec<ShiftRow>) -> AppResult<Vec<Shift>> {
    rows.into_iter().map(Shift::try_from).collect()
}

fn offers_from_rows(rows: Vec<OfferRow>) -> AppResult<Vec<Offer>> {
    rows.into_iter().map(Offer::try_from).collect()
}

/// Postgres-backed repository. Mutations lock the shift row with
/// `SELECT ... FOR UPDATE` before applying the negotiation rules.
#[derive(Clone)]
pub struct PgRepository {
    db: PgPool,
}

impl PgRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn lock_shift(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<Shift> {
        let row = sqlx::query_as::<_, ShiftRow>(&format!(
            "SELECT {} FROM shifts WHERE id = $1 FOR UPDATE",
            SHIFT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(NegotiationError::ShiftNotFound(id))?;

        Shift::try_from(row)
    }

    async fn lock_offers(tx: &mut Transaction<'_, Postgres>, shift_id: Uuid) -> AppResult<Vec<Offer>> {
        let rows = sqlx::query_as::<_, OfferRow>(&format!(
            "SELECT {} FROM offers WHERE shift_id = $1 ORDER BY created_at FOR UPDATE",
            OFFER_COLUMNS
        ))
        .bind(shift_id)
        .fetch_all(&mut **tx)
        .await?;

        offers_from_rows(rows)
    }

    async fn write_counters(tx: &mut Transaction<'_, Postgres>, shift: &Shift) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE shifts
            SET status = $1, offers_ref = $2, pending_offers = $3
            WHERE id = $4
            "#,
        )
        .bind(shift.stored_status().as_str())
        .bind(&shift.offers_ref)
        .bind(shift.pending_offers)
        .bind(shift.id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn decline_offers(tx: &mut Transaction<'_, Postgres>, ids: &[Uuid]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("UPDATE offers SET status = 'declined' WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ShiftRepository for PgRepository {
    async fn insert_user(&self, user: UserRef, email: &str) -> AppResult<UserRef> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, employee_number, phone_number, profile_image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(email)
        .bind(&user.employee_number)
        .bind(&user.phone_number)
        .bind(&user.profile_image_url)
        .execute(&self.db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, uid = %user.id, "Failed to insert user");
            e
        })?;

        if inserted.rows_affected() == 0 {
            return Err(AppError::Conflict(format!("User {} already exists", user.id)));
        }
        Ok(user)
    }

    async fn get_user(&self, uid: &str) -> AppResult<Option<UserRef>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, first_name, last_name, employee_number, phone_number, profile_image_url
            FROM users WHERE id = $1
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(UserRef::from))
    }

    async fn delete_user(&self, uid: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(uid)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_shift(&self, shift: Shift) -> AppResult<Shift> {
        let id = shift
            .id
            .ok_or_else(|| AppError::Internal("Cannot insert a shift without an id".to_string()))?;
        let owner = shift
            .created_by
            .as_deref()
            .ok_or_else(|| AppError::Internal("Cannot insert a shift without an owner".to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO shifts (
                id, created_by, offered_date, start_at, end_at, location,
                compensation, status, offers_ref, pending_offers
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(shift.offered_date)
        .bind(shift.start)
        .bind(shift.end)
        .bind(&shift.location)
        .bind(Json(&shift.compensation))
        .bind(shift.stored_status().as_str())
        .bind(&shift.offers_ref)
        .bind(shift.pending_offers)
        .execute(&self.db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, shift_id = %id, "Failed to insert shift");
            e
        })?;

        Ok(shift)
    }

    async fn get_shift(&self, id: Uuid) -> AppResult<Option<Shift>> {
        let row = sqlx::query_as::<_, ShiftRow>(&format!("SELECT {} FROM shifts WHERE id = $1", SHIFT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.map(Shift::try_from).transpose()
    }

    async fn list_shifts_by_owner(&self, uid: &str) -> AppResult<Vec<Shift>> {
        let rows = sqlx::query_as::<_, ShiftRow>(&format!(
            "SELECT {} FROM shifts WHERE created_by = $1 ORDER BY offered_date",
            SHIFT_COLUMNS
        ))
        .bind(uid)
        .fetch_all(&self.db)
        .await?;

        shifts_from_rows(rows)
    }

    async fn list_available_shifts(&self, now: DateTime<Utc>) -> AppResult<Vec<Shift>> {
        let rows = sqlx::query_as::<_, ShiftRow>(&format!(
            "SELECT {} FROM shifts WHERE status = 'available' AND end_at > $1 ORDER BY start_at",
            SHIFT_COLUMNS
        ))
        .bind(now)
        .fetch_all(&self.db)
        .await?;

        shifts_from_rows(rows)
    }

    async fn edit_shift(&self, editor: &str, edit: Shift, now: DateTime<Utc>) -> AppResult<Shift> {
        let id = edit
            .id
            .ok_or_else(|| AppError::BadRequest("Shift id is required".to_string()))?;

        let mut tx = self.db.begin().await?;
        let current = Self::lock_shift(&mut tx, id).await?;
        negotiation::check_edit(&current, editor, now)?;
        let updated = lifecycle::apply_edit(current, &edit);

        sqlx::query(
            r#"
            UPDATE shifts
            SET start_at = $1, end_at = $2, location = $3, compensation = $4
            WHERE id = $5
            "#,
        )
        .bind(updated.start)
        .bind(updated.end)
        .bind(&updated.location)
        .bind(Json(&updated.compensation))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(|e| {
            tracing::error!(error = %e, shift_id = %id, "Transaction rollback in edit_shift");
            AppError::Internal(format!("Failed to commit edit of shift {}: {}", id, e))
        })?;

        Ok(updated)
    }

    async fn delete_shift(&self, owner: &str, id: Uuid) -> AppResult<Vec<Uuid>> {
        let mut tx = self.db.begin().await?;
        let shift = Self::lock_shift(&mut tx, id).await?;
        negotiation::check_delete(&shift, owner)?;

        let mut offers = Self::lock_offers(&mut tx, id).await?;
        let declined = negotiation::cascade_delete(&mut offers);
        Self::decline_offers(&mut tx, &declined).await?;

        sqlx::query("DELETE FROM shifts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(|e| {
            tracing::error!(error = %e, shift_id = %id, "Transaction rollback in delete_shift");
            AppError::Internal(format!("Failed to commit deletion of shift {}: {}", id, e))
        })?;

        Ok(declined)
    }

    async fn create_offer(
        &self,
        shift_id: Uuid,
        from: &str,
        compensation: Option<Compensation>,
        now: DateTime<Utc>,
    ) -> AppResult<Offer> {
        let mut tx = self.db.begin().await?;
        let mut shift = Self::lock_shift(&mut tx, shift_id).await?;
        let existing = Self::lock_offers(&mut tx, shift_id).await?;

        negotiation::check_pickup(&shift, from, &existing, now)?;
        let offer = negotiation::new_offer(Uuid::new_v4(), shift_id, from, compensation, now);
        negotiation::record_pickup(&mut shift, offer.id);

        sqlx::query(
            r#"
            INSERT INTO offers (id, shift_id, from_user, created_at, status, compensation)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(offer.id)
        .bind(offer.shift_id)
        .bind(&offer.from)
        .bind(offer.date)
        .bind(offer.status.as_str())
        .bind(offer.compensation.as_ref().map(Json))
        .execute(&mut *tx)
        .await?;

        Self::write_counters(&mut tx, &shift).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!(error = %e, shift_id = %shift_id, "Transaction rollback in create_offer");
            AppError::Internal(format!("Failed to commit offer on shift {}: {}", shift_id, e))
        })?;

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
        let shift_id: Uuid = sqlx::query_scalar("SELECT shift_id FROM offers WHERE id = $1")
            .bind(offer_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(NegotiationError::OfferNotFound(offer_id))?;

        // Concurrent responses on one shift serialize on this row lock; the
        // later one sees the shift already accepted.
        let mut tx = self.db.begin().await?;
        let mut shift = Self::lock_shift(&mut tx, shift_id).await?;
        let mut offers = Self::lock_offers(&mut tx, shift_id).await?;

        let resolution = negotiation::resolve(
            &mut shift,
            &mut offers,
            offer_id,
            decision,
            compensation,
            responder,
            now,
        )?;

        sqlx::query("UPDATE offers SET status = $1, compensation = $2 WHERE id = $3")
            .bind(resolution.offer.status.as_str())
            .bind(resolution.offer.compensation.as_ref().map(Json))
            .bind(offer_id)
            .execute(&mut *tx)
            .await?;
        Self::decline_offers(&mut tx, &resolution.declined_siblings).await?;
        Self::write_counters(&mut tx, &shift).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!(
                error = %e,
                offer_id = %offer_id,
                shift_id = %shift_id,
                "Transaction rollback in respond_to_offer"
            );
            AppError::Internal(format!("Failed to commit response to offer {}: {}", offer_id, e))
        })?;

        Ok(resolution)
    }

    async fn withdraw_offers(&self, uid: &str) -> AppResult<Vec<Uuid>> {
        let pending: Vec<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT id, shift_id FROM offers WHERE from_user = $1 AND status = 'pending'",
        )
        .bind(uid)
        .fetch_all(&self.db)
        .await?;

        let mut withdrawn = Vec::with_capacity(pending.len());
        for (offer_id, shift_id) in pending {
            let mut tx = self.db.begin().await?;
            let mut shift = match Self::lock_shift(&mut tx, shift_id).await {
                Ok(shift) => Some(shift),
                Err(AppError::NotFound(_)) => None,
                Err(e) => return Err(e),
            };
            let mut offers = Self::lock_offers(&mut tx, shift_id).await?;
            let Some(offer) = offers.iter_mut().find(|o| o.id == offer_id) else {
                continue;
            };

            if negotiation::withdraw(shift.as_mut(), offer) {
                Self::decline_offers(&mut tx, &[offer_id]).await?;
                if let Some(shift) = &shift {
                    Self::write_counters(&mut tx, shift).await?;
                }
                withdrawn.push(offer_id);
            }
            tx.commit().await?;
        }

        Ok(withdrawn)
    }

    async fn get_offer(&self, id: Uuid) -> AppResult<Option<Offer>> {
        let row = sqlx::query_as::<_, OfferRow>(&format!("SELECT {} FROM offers WHERE id = $1", OFFER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.map(Offer::try_from).transpose()
    }

    async fn list_offers_for_shift(&self, shift_id: Uuid) -> AppResult<Vec<Offer>> {
        let rows = sqlx::query_as::<_, OfferRow>(&format!(
            "SELECT {} FROM offers WHERE shift_id = $1 ORDER BY created_at",
            OFFER_COLUMNS
        ))
        .bind(shift_id)
        .fetch_all(&self.db)
        .await?;

        offers_from_rows(rows)
    }

    async fn list_offers_by_user(&self, uid: &str) -> AppResult<Vec<Offer>> {
        let rows = sqlx::query_as::<_, OfferRow>(&format!(
            "SELECT {} FROM offers WHERE from_user = $1 ORDER BY created_at",
            OFFER_COLUMNS
        ))
        .bind(uid)
        .fetch_all(&self.db)
        .await?;

        offers_from_rows(rows)
    }

    async fn locations(&self) -> AppResult<LocationOptions> {
        let options: Vec<String> = sqlx::query_scalar("SELECT name FROM location_options ORDER BY name")
            .fetch_all(&self.db)
            .await?;

        let last_updated: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT updated_at FROM location_options_stamp WHERE id")
                .fetch_optional(&self.db)
                .await?;

        Ok(LocationOptions {
            options,
            last_updated: last_updated.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        })
    }
}
