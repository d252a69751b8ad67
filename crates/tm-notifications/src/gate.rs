//! Alert gate
//!
//! Decides whether a notification attempt proceeds to dispatch. Ineligible
//! recipients are a routine skip, not an error: users without an email on
//! file or with an unverified address are silently withheld.

/// Eligibility decision for an alert attempt
pub struct AlertGate;

impl AlertGate {
    /// Check whether an alert may be sent to this recipient
    ///
    /// Rules, in order:
    /// 1. blank address — ineligible
    /// 2. unverified email — ineligible
    /// 3. otherwise — eligible
    ///
    /// The dispatcher performs no verification check of its own; it trusts
    /// this gate.
    pub fn may_send(user_email_verified: bool, to_address: &str) -> bool {
        if to_address.trim().is_empty() {
            tracing::debug!("Alert skipped: recipient has no email address on file");
            return false;
        }

        if !user_email_verified {
            tracing::debug!("Alert skipped: recipient email address not verified");
            return false;
        }

        true
    }
}
