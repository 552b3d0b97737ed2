//! One-time email verification codes.
//!
//! Codes are six ASCII digits stored on the user record next to their
//! expiry. The engine only mutates the in-memory [`User`]; persisting the
//! record and sending the notification is left to the caller.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::models::User;

/// Number of digits in a verification code.
pub const CODE_LENGTH: usize = 6;

/// Outcome of checking a supplied code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    /// Code matched within its lifetime; the user is now verified.
    Success,
    /// No pending code, or the supplied code does not match.
    Invalid,
    /// Code matched but its lifetime has passed.
    Expired,
}

/// Outcome of asking for a new code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResendOutcome {
    /// No account with that email.
    NotFound,
    /// The account needs no code; nothing was changed.
    AlreadyVerified,
    /// A fresh code replaced any previous one.
    Issued { code: String },
}

/// Issues and checks verification codes with a fixed lifetime.
#[derive(Debug, Clone)]
pub struct VerificationCodes {
    ttl: Duration,
}

impl VerificationCodes {
    /// Create an engine whose codes live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Code lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store a fresh code and expiry on `user`, replacing any pending one.
    pub fn issue(&self, user: &mut User, now: DateTime<Utc>) -> (String, DateTime<Utc>) {
        let code = generate_code();
        let expires_at = now + self.ttl;

        user.verification_code = Some(code.clone());
        user.code_expires_at = Some(expires_at);

        (code, expires_at)
    }

    /// Check `supplied` against the pending code.
    ///
    /// A code is still valid at exactly its expiry instant. On success the
    /// code fields are cleared, so the same code can never succeed twice.
    pub fn check(&self, user: &mut User, supplied: &str, now: DateTime<Utc>) -> CodeCheck {
        let Some(stored) = user.verification_code.as_deref() else {
            return CodeCheck::Invalid;
        };
        if stored != supplied {
            return CodeCheck::Invalid;
        }

        // A code without an expiry is treated as already expired.
        match user.code_expires_at {
            Some(expires_at) if now <= expires_at => {}
            _ => return CodeCheck::Expired,
        }

        user.is_verified = true;
        user.verification_code = None;
        user.code_expires_at = None;

        CodeCheck::Success
    }

    /// Re-issue a code for `user` unless they are already verified.
    pub fn resend(&self, user: Option<&mut User>, now: DateTime<Utc>) -> ResendOutcome {
        let Some(user) = user else {
            return ResendOutcome::NotFound;
        };
        if user.is_verified {
            return ResendOutcome::AlreadyVerified;
        }

        let (code, _) = self.issue(user, now);
        ResendOutcome::Issued { code }
    }
}

/// Generate a code of [`CODE_LENGTH`] uniformly random digits.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
