//! Verification Notifier
//!
//! Delivery of verification tokens is an external concern. Registration
//! hands the recipient and token to whatever notifier is installed and does
//! not fail if delivery does.

use thiserror::Error;

use crate::domain::value_object::email::Email;

#[derive(Debug, Error)]
#[error("verification notice not delivered: {0}")]
pub struct NotifyError(pub String);

pub trait VerificationNotifier: Send + Sync {
    fn notify(&self, recipient: &Email, token: &str) -> Result<(), NotifyError>;
}
