use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A date and time window offered as a trade-back option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub date: NaiveDate,
    #[schema(value_type = String, example = "06:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "14:00:00")]
    pub end_time: NaiveTime,
}

/// What the shift owner wants in return. Only the payload of the active
/// kind exists, so "sell with availabilities" is unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Compensation {
    Give,
    Sell {
        #[serde(default)]
        amount: f64,
    },
    Trade {
        #[serde(default)]
        availabilities: Vec<Availability>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CompensationKind {
    Give,
    Sell,
    Trade,
}

impl Default for Compensation {
    fn default() -> Self {
        Compensation::Give
    }
}

impl Compensation {
    pub fn kind(&self) -> CompensationKind {
        match self {
            Compensation::Give => CompensationKind::Give,
            Compensation::Sell { .. } => CompensationKind::Sell,
            Compensation::Trade { .. } => CompensationKind::Trade,
        }
    }

    /// Switch to another kind. Entering a kind starts from its default
    /// payload; switching to the current kind keeps the payload.
    pub fn switch_to(self, kind: CompensationKind) -> Self {
        if self.kind() == kind {
            return self;
        }
        match kind {
            CompensationKind::Give => Compensation::Give,
            CompensationKind::Sell => Compensation::Sell { amount: 0.0 },
            CompensationKind::Trade => Compensation::Trade {
                availabilities: Vec::new(),
            },
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            Compensation::Sell { amount } => Some(*amount),
            _ => None,
        }
    }

    pub fn availabilities(&self) -> Option<&[Availability]> {
        match self {
            Compensation::Trade { availabilities } => Some(availabilities),
            _ => None,
        }
    }

    /// Negative or non-finite sale amounts are not representable on the wire.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Compensation::Sell { amount } => amount.is_finite() && *amount >= 0.0,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_fields_for(c: &Compensation, kind: CompensationKind) -> bool {
        match kind {
            CompensationKind::Give => c.amount().is_none() && c.availabilities().is_none(),
            CompensationKind::Sell => c.amount().is_some() && c.availabilities().is_none(),
            CompensationKind::Trade => c.amount().is_none() && c.availabilities().is_some(),
        }
    }

    #[test]
    fn test_switching_kind_clears_other_payload() {
        let kinds = [CompensationKind::Give, CompensationKind::Sell, CompensationKind::Trade];
        for from in kinds {
            for to in kinds {
                let c = Compensation::Give.switch_to(from).switch_to(to);
                assert_eq!(c.kind(), to);
                assert!(only_fields_for(&c, to), "{:?} -> {:?} left {:?}", from, to, c);
            }
        }
    }

    #[test]
    fn test_entering_sell_defaults_amount_to_zero() {
        let c = Compensation::Give.switch_to(CompensationKind::Sell);
        assert_eq!(c.amount(), Some(0.0));
    }

    #[test]
    fn test_switching_to_same_kind_keeps_payload() {
        let c = Compensation::Sell { amount: 40.0 }.switch_to(CompensationKind::Sell);
        assert_eq!(c.amount(), Some(40.0));
    }

    #[test]
    fn test_wire_format_uses_type_tag() {
        let json = serde_json::to_value(Compensation::Sell { amount: 25.5 }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "sell", "amount": 25.5}));

        let give: Compensation = serde_json::from_str(r#"{"type":"give"}"#).unwrap();
        assert_eq!(give, Compensation::Give);

        let trade: Compensation = serde_json::from_str(r#"{"type":"trade"}"#).unwrap();
        assert_eq!(trade.availabilities(), Some(&[][..]));
    }

    #[test]
    fn test_negative_amount_is_not_well_formed() {
        assert!(!Compensation::Sell { amount: -1.0 }.is_well_formed());
        assert!(Compensation::Sell { amount: 0.0 }.is_well_formed());
    }
}
