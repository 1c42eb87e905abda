pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{issue_jwt, validate_jwt};
