use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ErrorType;

/// Minimal identity projection used to render offers without a second
/// round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub employee_number: String,
    pub phone_number: String,
    pub profile_image_url: Option<String>,
}

/// `createAccount` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub employee_number: String,
    #[serde(default)]
    pub phone_number: String,
}

impl NewAccount {
    /// First failing field wins, in form order.
    pub fn validate(&self) -> Result<(), ErrorType> {
        if self.first_name.trim().is_empty() {
            return Err(ErrorType::RequiredFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(ErrorType::RequiredLastName);
        }
        if self.email.trim().is_empty() {
            return Err(ErrorType::RequiredEmail);
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ErrorType::InvalidEmail);
        }
        if self.employee_number.trim().is_empty() {
            return Err(ErrorType::RequiredEmployeeNumber);
        }
        if !is_valid_phone_number(&self.phone_number) {
            return Err(ErrorType::InvalidPhoneNumber);
        }
        Ok(())
    }

    pub fn into_user_ref(self, uid: &str) -> UserRef {
        UserRef {
            id: uid.to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            employee_number: self.employee_number.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            profile_image_url: None,
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

fn is_valid_phone_number(phone: &str) -> bool {
    let phone = phone.trim();
    let allowed = phone
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')') || (c == '+' && i == 0));
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    allowed && (7..=15).contains(&digits)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountInput {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> NewAccount {
        NewAccount {
            first_name: "Ana".to_string(),
            last_name: "Reyes".to_string(),
            email: "ana.reyes@example.com".to_string(),
            employee_number: "004512".to_string(),
            phone_number: "+1 (555) 010-2030".to_string(),
        }
    }

    #[test]
    fn test_valid_account() {
        assert_eq!(account().validate(), Ok(()));
    }

    #[test]
    fn test_first_missing_field_wins() {
        let blank = NewAccount::default();
        assert_eq!(blank.validate(), Err(ErrorType::RequiredFirstName));

        let mut a = account();
        a.last_name = " ".to_string();
        a.email = String::new();
        assert_eq!(a.validate(), Err(ErrorType::RequiredLastName));
    }

    #[test]
    fn test_invalid_email_and_phone() {
        let mut a = account();
        a.email = "ana@localhost".to_string();
        assert_eq!(a.validate(), Err(ErrorType::InvalidEmail));

        let mut a = account();
        a.phone_number = "555-01".to_string();
        assert_eq!(a.validate(), Err(ErrorType::InvalidPhoneNumber));
    }
}
