use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::compensation::Compensation;
use super::shift::ShiftStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Declined,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Declined => "declined",
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, OfferStatus::Pending)
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OfferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OfferStatus::Pending),
            "accepted" => Ok(OfferStatus::Accepted),
            "declined" => Ok(OfferStatus::Declined),
            _ => Err(format!("Invalid offer status: {}", s)),
        }
    }
}

/// Another user's response proposing to take over a shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub from: String,
    pub date: DateTime<Utc>,
    pub status: OfferStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensation: Option<Compensation>,
}

/// `OfferDict` payload of `pickupShift`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PickupShiftInput {
    pub shift_id: Uuid,
    #[serde(default)]
    pub compensation: Option<Compensation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PickupShiftResponse {
    pub offer_id: Uuid,
}

/// The owner's decision on an offer. `pending` is not a valid response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OfferDecision {
    Accepted,
    Declined,
}

impl From<OfferDecision> for OfferStatus {
    fn from(decision: OfferDecision) -> Self {
        match decision {
            OfferDecision::Accepted => OfferStatus::Accepted,
            OfferDecision::Declined => OfferStatus::Declined,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RespondToOfferInput {
    pub offer_id: Uuid,
    pub status: OfferDecision,
    #[serde(default)]
    pub compensation: Option<Compensation>,
}

/// Result dictionary of `respondToOffer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RespondToOfferResult {
    pub success: bool,
    pub offer_id: Uuid,
    pub offer_status: OfferStatus,
    pub shift_id: Uuid,
    pub shift_status: ShiftStatus,
    pub pending_offers: i32,
    pub declined_offers: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_rejects_pending() {
        let parsed: Result<OfferDecision, _> = serde_json::from_str(r#""pending""#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_respond_input_parses_client_payload() {
        let input: RespondToOfferInput = serde_json::from_value(serde_json::json!({
            "offerId": "6f1c1f8e-4d3f-4b55-9d5e-6a0f7f6d2b11",
            "status": "accepted"
        }))
        .unwrap();
        assert_eq!(input.status, OfferDecision::Accepted);
        assert!(input.compensation.is_none());
    }
}
