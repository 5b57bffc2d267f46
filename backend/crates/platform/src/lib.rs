//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations used by the domain crates:
//! - Password hashing (Argon2id, NIST SP 800-63B length rules)
//! - Random tokens and constant-time comparison
//! - Cookie building and parsing
//! - Client metadata (IP, User-Agent) extraction

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
