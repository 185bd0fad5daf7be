//! Admin password gate.
//!
//! A plain equality check against a configured secret. This restricts the
//! admin UI only; the store's own access rules decide what is writable.

use std::time::{Duration, Instant};

/// Message shown under the password field after a failed attempt.
pub const WRONG_PASSWORD_MESSAGE: &str = "Wrong password, partner. Try again.";

/// How long the password form shakes after a failed attempt.
pub const SHAKE_DURATION: Duration = Duration::from_millis(500);

pub fn password_matches(candidate: &str, secret: &str) -> bool {
    candidate == secret
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Granted,
    Denied,
}

/// State of the password form for one client session.
#[derive(Debug, Clone)]
pub struct AdminGate {
    secret: String,
    authenticated: bool,
    input: String,
    error: bool,
    shake_until: Option<Instant>,
}

impl AdminGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            authenticated: false,
            input: String::new(),
            error: false,
            shake_until: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    pub fn is_shaking(&self, now: Instant) -> bool {
        self.shake_until.is_some_and(|until| now < until)
    }

    /// Replace the typed password. Typing dismisses a previous error.
    pub fn type_password(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.error = false;
    }

    /// Submit the typed password.
    ///
    /// On a mismatch the input is cleared and the form shakes briefly.
    /// There is no lockout; callers may retry indefinitely.
    pub fn submit(&mut self, now: Instant) -> GateOutcome {
        if password_matches(&self.input, &self.secret) {
            self.authenticated = true;
            self.error = false;
            self.shake_until = None;
            GateOutcome::Granted
        } else {
            self.error = true;
            self.shake_until = Some(now + SHAKE_DURATION);
            self.input.clear();
            GateOutcome::Denied
        }
    }
}
