//! Credential adapters: Argon2 password hashing and HS256 session tokens.

mod jwt;
mod password;

pub use jwt::JwtTokenIssuer;
pub use password::Argon2PasswordHasher;
