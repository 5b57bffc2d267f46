//! Entity Module

pub mod oauth_profile;
pub mod session;
pub mod user;
pub mod user_profile;
