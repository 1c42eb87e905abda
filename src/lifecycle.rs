//! Shift lifecycle: `draft -> available -> accepted -> past`, plus deletion.
//!
//! `past` is never written. It is derived from the wall clock whenever a
//! shift is read, so a shift whose end has elapsed reports `past` without a
//! transition event.

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use uuid::Uuid;

use crate::error::{ShiftError, ShiftErrorType};
use crate::models::{Compensation, Shift, ShiftStatus, NO_SELECTION};

const DEFAULT_SHIFT_HOURS: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftPhase {
    Draft,
    Available,
    Accepted,
    Past,
}

pub fn phase(shift: &Shift, now: DateTime<Utc>) -> ShiftPhase {
    if shift.id.is_none() {
        return ShiftPhase::Draft;
    }
    match effective_status(shift, now) {
        ShiftStatus::Available => ShiftPhase::Available,
        ShiftStatus::Accepted => ShiftPhase::Accepted,
        ShiftStatus::Past => ShiftPhase::Past,
    }
}

pub fn effective_status(shift: &Shift, now: DateTime<Utc>) -> ShiftStatus {
    if shift.end <= now {
        ShiftStatus::Past
    } else {
        shift.stored_status()
    }
}

/// Copy of `shift` carrying its effective status, as served to readers.
pub fn with_effective_status(mut shift: Shift, now: DateTime<Utc>) -> Shift {
    shift.status = Some(effective_status(&shift, now));
    shift
}

/// Whole hours between the start and end hour of day, wrapping at midnight.
/// Minutes are ignored, so 06:00-06:45 counts as zero hours.
pub fn compute_duration_hours<Tz: TimeZone>(start: &DateTime<Tz>, end: &DateTime<Tz>) -> u32 {
    (end.hour() as i32 - start.hour() as i32).rem_euclid(24) as u32
}

/// Checks run in a fixed order and the first failure is reported alone.
pub fn validate_shift(shift: &Shift, now: DateTime<Utc>) -> Result<(), ShiftError> {
    if shift.start < now {
        return Err(ShiftError::new(
            ShiftErrorType::Date,
            "The shift cannot start in the past.",
        ));
    }

    if compute_duration_hours(&shift.start, &shift.end) == 0 {
        return Err(ShiftError::new(
            ShiftErrorType::Duration,
            "The shift must be at least one hour long.",
        ));
    }

    let location = shift.location.trim();
    if location.is_empty() || location == NO_SELECTION {
        return Err(ShiftError::new(
            ShiftErrorType::Location,
            "Please select a location.",
        ));
    }

    if let Compensation::Trade { availabilities } = &shift.compensation {
        let today = now.date_naive();
        for availability in availabilities {
            if availability.date < today {
                return Err(ShiftError::new(
                    ShiftErrorType::Availabilities,
                    format!("Availability on {} is in the past.", availability.date),
                ));
            }
            if availability.start_time == availability.end_time {
                return Err(ShiftError::new(
                    ShiftErrorType::Availabilities,
                    format!("Availability on {} has no duration.", availability.date),
                ));
            }
        }
    }

    Ok(())
}

/// Recompute the end after the start moved to another calendar day.
///
/// The end keeps its time of day. It lands on the day after the new start
/// when that time of day is earlier than the new start's (the shift still
/// crosses midnight), otherwise on the new start's day.
pub fn adjust_end_for_new_start<Tz: TimeZone>(
    previous_start: &DateTime<Tz>,
    new_start: &DateTime<Tz>,
    end: DateTime<Tz>,
) -> DateTime<Tz> {
    if previous_start.date_naive() == new_start.date_naive() {
        return end;
    }

    let end_time = end.time();
    let start_time = new_start.time();
    let (end_hm, start_hm) = (
        (end_time.hour(), end_time.minute()),
        (start_time.hour(), start_time.minute()),
    );

    let date = if end_hm < start_hm {
        new_start.date_naive() + Duration::days(1)
    } else {
        new_start.date_naive()
    };

    new_start
        .timezone()
        .from_local_datetime(&date.and_time(end_time))
        .earliest()
        .unwrap_or(end)
}

/// Push an end that is not after the start forward by whole days, so an
/// overnight shift entered as 22:00-06:00 ends on the following morning.
pub fn normalize_end<Tz: TimeZone>(start: &DateTime<Tz>, mut end: DateTime<Tz>) -> DateTime<Tz> {
    while end <= *start {
        end = end + Duration::days(1);
    }
    end
}

/// Default instance the client starts editing from: next whole hour, eight
/// hours long, no location, given away.
pub fn new_draft(owner: &str, now: DateTime<Utc>) -> Shift {
    let start = DateTime::from_timestamp((now.timestamp() / 3600 + 1) * 3600, 0).unwrap_or(now);
    Shift {
        id: None,
        created_by: Some(owner.to_string()),
        offered_date: now,
        start,
        end: start + Duration::hours(DEFAULT_SHIFT_HOURS),
        location: NO_SELECTION.to_string(),
        compensation: Compensation::Give,
        status: None,
        offers_ref: Vec::new(),
        pending_offers: 0,
    }
}

/// Side effects of `draft -> available`.
pub fn publish(mut shift: Shift, id: Uuid, owner: &str, now: DateTime<Utc>) -> Shift {
    shift.end = normalize_end(&shift.start, shift.end);
    shift.id = Some(id);
    shift.created_by = Some(owner.to_string());
    shift.offered_date = now;
    shift.status = Some(ShiftStatus::Available);
    shift.offers_ref = Vec::new();
    shift.pending_offers = 0;
    shift
}

/// Apply an owner's edit: only the schedule, location and terms change.
pub fn apply_edit(mut current: Shift, edit: &Shift) -> Shift {
    current.start = edit.start;
    current.end = normalize_end(&edit.start, edit.end);
    current.location = edit.location.clone();
    current.compensation = edit.compensation.clone();
    current
}
