//! Resolution of a request to a user id.
//!
//! Login and token issuance live in the identity service; this service only
//! verifies the JWT it left in the encrypted `auth_token` cookie.

pub mod jwt;
pub mod middleware;

pub use middleware::AuthUser;
