//! Shared Kernel
//!
//! Vocabulary that every backend crate agrees on:
//! - Unified error type ([`error::app_error::AppError`]) and its classification
//! - Typed UUID identifiers ([`id::Id`])
//!
//! Only things that are hard to change and mean the same thing in every
//! domain belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
