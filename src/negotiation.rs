//! Offer negotiation rules.
//!
//! These functions only mutate values handed to them. Repositories call them
//! while holding an exclusive lock on the shift (row lock or mutex), which is
//! what turns "one winner per shift" into a guarantee under concurrency.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::lifecycle;
use crate::models::{Compensation, Offer, OfferDecision, OfferStatus, Shift, ShiftStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NegotiationError {
    #[error("Shift {0} not found")]
    ShiftNotFound(Uuid),

    #[error("Offer {0} not found")]
    OfferNotFound(Uuid),

    #[error("Shift {0} is no longer available")]
    ShiftUnavailable(Uuid),

    #[error("You cannot pick up your own shift")]
    SelfOffer,

    #[error("You already have an open offer on shift {0}")]
    DuplicateOffer(Uuid),

    #[error("Only the owner of shift {0} can do this")]
    NotOwner(Uuid),

    #[error("Offer {0} is already {1}")]
    AlreadyResolved(Uuid, OfferStatus),

    #[error("Shift {0} has {1} pending offers and cannot be edited")]
    HasPendingOffers(Uuid, i32),
}

impl From<NegotiationError> for AppError {
    fn from(e: NegotiationError) -> Self {
        match e {
            NegotiationError::ShiftNotFound(_) | NegotiationError::OfferNotFound(_) => {
                AppError::NotFound(e.to_string())
            }
            NegotiationError::NotOwner(_) => AppError::Forbidden(e.to_string()),
            NegotiationError::SelfOffer => AppError::BadRequest(e.to_string()),
            NegotiationError::ShiftUnavailable(_)
            | NegotiationError::DuplicateOffer(_)
            | NegotiationError::AlreadyResolved(_, _)
            | NegotiationError::HasPendingOffers(_, _) => AppError::Conflict(e.to_string()),
        }
    }
}

/// What a response to an offer changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub offer: Offer,
    pub shift_status: ShiftStatus,
    pub pending_offers: i32,
    /// Siblings forced to `declined` by an acceptance.
    pub declined_siblings: Vec<Uuid>,
}

fn shift_id(shift: &Shift) -> Uuid {
    shift.id.unwrap_or_else(Uuid::nil)
}

/// `offers` are the offers currently recorded against `shift`.
pub fn check_pickup(
    shift: &Shift,
    from: &str,
    offers: &[Offer],
    now: DateTime<Utc>,
) -> Result<(), NegotiationError> {
    let id = shift_id(shift);

    if shift.id.is_none() || lifecycle::effective_status(shift, now) != ShiftStatus::Available {
        return Err(NegotiationError::ShiftUnavailable(id));
    }

    if shift.is_owned_by(from) {
        return Err(NegotiationError::SelfOffer);
    }

    if offers
        .iter()
        .any(|o| o.from == from && o.status != OfferStatus::Declined)
    {
        return Err(NegotiationError::DuplicateOffer(id));
    }

    Ok(())
}

pub fn new_offer(
    id: Uuid,
    shift_id: Uuid,
    from: &str,
    compensation: Option<Compensation>,
    now: DateTime<Utc>,
) -> Offer {
    Offer {
        id,
        shift_id,
        from: from.to_string(),
        date: now,
        status: OfferStatus::Pending,
        compensation,
    }
}

pub fn record_pickup(shift: &mut Shift, offer_id: Uuid) {
    shift.offers_ref.push(offer_id);
    shift.pending_offers += 1;
}

/// Apply the owner's decision on `offer_id`.
///
/// Accepting marks every other pending offer declined, the shift accepted
/// and zeroes the pending counter. Declining touches only that offer and
/// decrements the counter.
pub fn resolve(
    shift: &mut Shift,
    offers: &mut [Offer],
    offer_id: Uuid,
    decision: OfferDecision,
    compensation: Option<Compensation>,
    responder: &str,
    now: DateTime<Utc>,
) -> Result<Resolution, NegotiationError> {
    let id = shift_id(shift);

    if !shift.is_owned_by(responder) {
        return Err(NegotiationError::NotOwner(id));
    }

    let index = offers
        .iter()
        .position(|o| o.id == offer_id && o.shift_id == id)
        .ok_or(NegotiationError::OfferNotFound(offer_id))?;

    if offers[index].status.is_resolved() {
        return Err(NegotiationError::AlreadyResolved(offer_id, offers[index].status));
    }

    let mut declined_siblings = Vec::new();

    match decision {
        OfferDecision::Accepted => {
            if lifecycle::effective_status(shift, now) != ShiftStatus::Available {
                return Err(NegotiationError::ShiftUnavailable(id));
            }

            for (i, offer) in offers.iter_mut().enumerate() {
                if i == index {
                    offer.status = OfferStatus::Accepted;
                    if compensation.is_some() {
                        offer.compensation = compensation.clone();
                    }
                } else if offer.status == OfferStatus::Pending {
                    offer.status = OfferStatus::Declined;
                    declined_siblings.push(offer.id);
                }
            }

            shift.status = Some(ShiftStatus::Accepted);
            shift.pending_offers = 0;
        }
        OfferDecision::Declined => {
            offers[index].status = OfferStatus::Declined;
            shift.pending_offers = (shift.pending_offers - 1).max(0);
        }
    }

    Ok(Resolution {
        offer: offers[index].clone(),
        shift_status: shift.stored_status(),
        pending_offers: shift.pending_offers,
        declined_siblings,
    })
}

pub fn check_edit(shift: &Shift, editor: &str, now: DateTime<Utc>) -> Result<(), NegotiationError> {
    let id = shift_id(shift);

    if !shift.is_owned_by(editor) {
        return Err(NegotiationError::NotOwner(id));
    }

    if lifecycle::effective_status(shift, now) != ShiftStatus::Available {
        return Err(NegotiationError::ShiftUnavailable(id));
    }

    if shift.pending_offers > 0 {
        return Err(NegotiationError::HasPendingOffers(id, shift.pending_offers));
    }

    Ok(())
}

pub fn check_delete(shift: &Shift, owner: &str) -> Result<(), NegotiationError> {
    if !shift.is_owned_by(owner) {
        return Err(NegotiationError::NotOwner(shift_id(shift)));
    }
    Ok(())
}

/// The offering user withdraws a pending offer, e.g. when their account is
/// deleted. Returns false when the offer was already resolved.
pub fn withdraw(shift: Option<&mut Shift>, offer: &mut Offer) -> bool {
    if offer.status != OfferStatus::Pending {
        return false;
    }
    offer.status = OfferStatus::Declined;
    if let Some(shift) = shift {
        shift.pending_offers = (shift.pending_offers - 1).max(0);
    }
    true
}

/// Outstanding offers on a deleted shift are declined rather than left
/// pending forever. Returns the ids that changed.
pub fn cascade_delete(offers: &mut [Offer]) -> Vec<Uuid> {
    offers
        .iter_mut()
        .filter(|o| o.status == OfferStatus::Pending)
        .map(|o| {
            o.status = OfferStatus::Declined;
            o.id
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap()
    }

    fn listed(owner: &str) -> Shift {
        let start = now() + Duration::days(2);
        Shift {
            id: Some(Uuid::new_v4()),
            created_by: Some(owner.to_string()),
            offered_date: now(),
            start,
            end: start + Duration::hours(8),
            location: "Check-in".to_string(),
            compensation: Compensation::Give,
            status: Some(ShiftStatus::Available),
            offers_ref: vec![],
            pending_offers: 0,
        }
    }

    fn pick_up(shift: &mut Shift, offers: &mut Vec<Offer>, from: &str) -> Uuid {
        check_pickup(shift, from, offers, now()).unwrap();
        let offer = new_offer(Uuid::new_v4(), shift.id.unwrap(), from, None, now());
        record_pickup(shift, offer.id);
        let id = offer.id;
        offers.push(offer);
        id
    }

    #[test]
    fn test_self_offer_rejected() {
        let shift = listed("U1");
        assert_eq!(check_pickup(&shift, "U1", &[], now()), Err(NegotiationError::SelfOffer));
    }

    #[test]
    fn test_pickup_increments_pending() {
        let mut shift = listed("U1");
        let mut offers = vec![];
        let a = pick_up(&mut shift, &mut offers, "U2");
        pick_up(&mut shift, &mut offers, "U3");
        assert_eq!(shift.pending_offers, 2);
        assert_eq!(shift.offers_ref[0], a);
    }

    #[test]
    fn test_duplicate_offer_rejected() {
        let mut shift = listed("U1");
        let mut offers = vec![];
        pick_up(&mut shift, &mut offers, "U2");
        assert!(matches!(
            check_pickup(&shift, "U2", &offers, now()),
            Err(NegotiationError::DuplicateOffer(_))
        ));
    }

    #[test]
    fn test_accept_declines_siblings() {
        let mut shift = listed("U1");
        let mut offers = vec![];
        let a = pick_up(&mut shift, &mut offers, "U2");
        let b = pick_up(&mut shift, &mut offers, "U3");

        let resolution = resolve(&mut shift, &mut offers, a, OfferDecision::Accepted, None, "U1", now()).unwrap();

        assert_eq!(resolution.offer.status, OfferStatus::Accepted);
        assert_eq!(resolution.declined_siblings, vec![b]);
        assert_eq!(offers[1].status, OfferStatus::Declined);
        assert_eq!(shift.status, Some(ShiftStatus::Accepted));
        assert_eq!(shift.pending_offers, 0);

        let second = resolve(&mut shift, &mut offers, b, OfferDecision::Accepted, None, "U1", now());
        assert!(matches!(second, Err(NegotiationError::AlreadyResolved(_, OfferStatus::Declined))));
    }

    #[test]
    fn test_decline_only_touches_one_offer() {
        let mut shift = listed("U1");
        let mut offers = vec![];
        let a = pick_up(&mut shift, &mut offers, "U2");
        pick_up(&mut shift, &mut offers, "U3");

        let resolution = resolve(&mut shift, &mut offers, a, OfferDecision::Declined, None, "U1", now()).unwrap();

        assert_eq!(resolution.offer.status, OfferStatus::Declined);
        assert!(resolution.declined_siblings.is_empty());
        assert_eq!(offers[1].status, OfferStatus::Pending);
        assert_eq!(shift.pending_offers, 1);
        assert_eq!(shift.stored_status(), ShiftStatus::Available);
    }

    #[test]
    fn test_only_owner_responds() {
        let mut shift = listed("U1");
        let mut offers = vec![];
        let a = pick_up(&mut shift, &mut offers, "U2");
        let result = resolve(&mut shift, &mut offers, a, OfferDecision::Accepted, None, "U2", now());
        assert!(matches!(result, Err(NegotiationError::NotOwner(_))));
    }

    #[test]
    fn test_accept_records_counter_terms() {
        let mut shift = listed("U1");
        let mut offers = vec![];
        let a = pick_up(&mut shift, &mut offers, "U2");
        let terms = Compensation::Sell { amount: 30.0 };
        let resolution = resolve(&mut shift, &mut offers, a, OfferDecision::Accepted, Some(terms.clone()), "U1", now()).unwrap();
        assert_eq!(resolution.offer.compensation, Some(terms));
    }

    #[test]
    fn test_edit_blocked_with_pending_offers() {
        let mut shift = listed("U1");
        let mut offers = vec![];
        assert!(check_edit(&shift, "U1", now()).is_ok());
        pick_up(&mut shift, &mut offers, "U2");
        assert!(matches!(
            check_edit(&shift, "U1", now()),
            Err(NegotiationError::HasPendingOffers(_, 1))
        ));
    }

    #[test]
    fn test_cascade_declines_pending_only() {
        let mut shift = listed("U1");
        let mut offers = vec![];
        let a = pick_up(&mut shift, &mut offers, "U2");
        let b = pick_up(&mut shift, &mut offers, "U3");
        resolve(&mut shift, &mut offers, a, OfferDecision::Declined, None, "U1", now()).unwrap();

        let declined = cascade_delete(&mut offers);
        assert_eq!(declined, vec![b]);
        assert!(offers.iter().all(|o| o.status == OfferStatus::Declined));
    }

    #[test]
    fn test_pickup_on_past_shift_rejected() {
        let shift = listed("U1");
        let later = shift.end + Duration::minutes(1);
        assert!(matches!(
            check_pickup(&shift, "U2", &[], later),
            Err(NegotiationError::ShiftUnavailable(_))
        ));
    }
}
