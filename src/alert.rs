//! Transient form messages. Showing a new alert cancels the pending one, so a
//! single deadline is ever live.

use std::time::{Duration, Instant};

use crate::error::ValidationError;

pub const DEFAULT_ALERT_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    EmptyTitle,
    EmptyAuthor,
    BookAdded,
}

impl AlertKind {
    pub fn message(self) -> &'static str {
        match self {
            AlertKind::EmptyTitle => "Please fill in a title",
            AlertKind::EmptyAuthor => "Please fill in an author",
            AlertKind::BookAdded => "Book Added",
        }
    }

    pub fn is_warning(self) -> bool {
        !matches!(self, AlertKind::BookAdded)
    }
}

impl From<ValidationError> for AlertKind {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyTitle => AlertKind::EmptyTitle,
            ValidationError::EmptyAuthor => AlertKind::EmptyAuthor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub expires_at: Instant,
}

#[derive(Debug)]
pub struct AlertTimer {
    ttl: Duration,
    current: Option<Alert>,
}

impl AlertTimer {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    /// Replace whatever is pending with `kind`, due `ttl` after `now`.
    pub fn show(&mut self, kind: AlertKind, now: Instant) -> &Alert {
        self.current.insert(Alert {
            kind,
            expires_at: now + self.ttl,
        })
    }

    pub fn cancel(&mut self) {
        self.current = None;
    }

    /// Drop the alert once its deadline has passed. Returns whether anything
    /// was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.current {
            Some(alert) if now >= alert.expires_at => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&Alert> {
        self.current.as_ref()
    }
}

impl Default for AlertTimer {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_TTL)
    }
}
