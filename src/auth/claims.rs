use serde::{Deserialize, Serialize};

/// Session token payload. `sub` is the user id every write is attributed to.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}
