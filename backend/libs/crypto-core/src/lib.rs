//! Shared crypto helpers for blog services.
//!
//! - `jwt`: HS256 bearer token issuing and validation
//! - `password`: Argon2id hashing plus the account password policy

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtError, JwtManager};
pub use password::{hash_password, validate_password_strength, verify_password, PasswordError};
