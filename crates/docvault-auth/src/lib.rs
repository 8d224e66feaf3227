//! # docvault-auth
//!
//! Stateless authentication primitives for DocVault.
//!
//! ## Modules
//!
//! - `jwt`: access/refresh token creation and validation
//! - `password`: Argon2id password hashing and length policy

pub mod jwt;
pub mod password;

pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder, TokenPair, TokenType};
pub use password::{PasswordHasher, PasswordValidator};
