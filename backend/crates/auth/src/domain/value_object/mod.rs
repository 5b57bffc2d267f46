//! Value Object Module

pub mod email;
pub mod membership;
pub mod oauth_provider;
pub mod user_id;
pub mod user_password;
pub mod user_role;
