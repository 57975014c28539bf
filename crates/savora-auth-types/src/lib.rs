//! Token validation and gateway identity types shared between the auth
//! service (issuer) and every other consumer (validators).

pub mod identity;
pub mod token;
