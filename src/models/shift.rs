use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::compensation::Compensation;

/// Location value used by the client before a real location is picked.
pub const NO_SELECTION: &str = "NO_SELECTION";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ShiftStatus {
    Available,
    Accepted,
    Past,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::Available => "available",
            ShiftStatus::Accepted => "accepted",
            ShiftStatus::Past => "past",
        }
    }
}

impl std::fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShiftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ShiftStatus::Available),
            "accepted" => Ok(ShiftStatus::Accepted),
            "past" => Ok(ShiftStatus::Past),
            _ => Err(format!("Invalid shift status: {}", s)),
        }
    }
}

/// A unit of work being redistributed. Doubles as the `ShiftDict` payload of
/// `saveShift` / `editShift`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub created_by: Option<String>,
    pub offered_date: DateTime<Utc>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: String,
    #[serde(default)]
    pub compensation: Compensation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ShiftStatus>,
    #[serde(default)]
    pub offers_ref: Vec<Uuid>,
    #[serde(default)]
    pub pending_offers: i32,
}

impl Shift {
    /// Stored status; an absent status means available.
    pub fn stored_status(&self) -> ShiftStatus {
        self.status.unwrap_or(ShiftStatus::Available)
    }

    pub fn is_owned_by(&self, uid: &str) -> bool {
        self.created_by.as_deref() == Some(uid)
    }
}

/// Response of `saveShift`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveShiftResponse {
    #[serde(rename = "shiftID")]
    pub shift_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteShiftInput {
    pub shift_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteShiftResponse {
    pub success: bool,
    pub declined_offers: Vec<Uuid>,
}

/// Response for mutations that return nothing but success.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShiftMutationResponse {
    pub success: bool,
    pub message: Option<String>,
}

/// `users/{uid}/shifts/offered`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct OfferedShiftRefs {
    pub refs: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_shift_dict_field_names() {
        let shift = Shift {
            id: None,
            created_by: Some("U1".to_string()),
            offered_date: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            start: Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap(),
            location: "Ramp".to_string(),
            compensation: Compensation::Sell { amount: 50.0 },
            status: None,
            offers_ref: vec![],
            pending_offers: 0,
        };

        let json = serde_json::to_value(&shift).unwrap();
        assert_eq!(json["createdBy"], "U1");
        assert_eq!(json["pendingOffers"], 0);
        assert_eq!(json["compensation"]["type"], "sell");
        assert!(json.get("id").is_none());
        assert!(json.get("status").is_none());
        assert_eq!(shift.stored_status(), ShiftStatus::Available);
    }

    #[test]
    fn test_save_shift_response_key() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(SaveShiftResponse { shift_id: id }).unwrap();
        assert_eq!(json["shiftID"], id.to_string());
    }
}
