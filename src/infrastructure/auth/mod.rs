//! Authentication infrastructure module
//!
//! Session JWTs, password reset tokens and the authorization gate.

mod gate;
mod jwt;
mod reset_token;

pub use gate::{AuthGate, LOGIN_REQUIRED};
pub use jwt::{JwtClaims, JwtConfig, JwtGenerator, JwtService};
pub use reset_token::{IssuedResetToken, ResetTokenConfig, ResetTokenService, RESET_TOKEN_BYTES};
