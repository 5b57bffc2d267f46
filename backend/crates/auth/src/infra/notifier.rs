//! Tracing Notifier
//!
//! Default [`VerificationNotifier`] until a mail transport is wired in:
//! records that a notice was due. The token itself is never logged.

use crate::domain::notifier::{NotifyError, VerificationNotifier};
use crate::domain::value_object::email::Email;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl VerificationNotifier for TracingNotifier {
    fn notify(&self, recipient: &Email, _token: &str) -> Result<(), NotifyError> {
        tracing::info!(recipient = %recipient, "Verification notice queued");
        Ok(())
    }
}
