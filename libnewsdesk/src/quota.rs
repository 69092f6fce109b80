//! Per-role publishing quota
//!
//! The user-role count is recomputed from the current listing on every check,
//! so there is no separate counter to drift from the stored items.

use crate::config::DEFAULT_USER_LIMIT;
use crate::types::{NewsItem, Role};

/// Outcome of a quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed,
    Exceeded { current: usize, limit: usize },
}

/// Quota policy: admin unlimited, user capped
#[derive(Debug, Clone, Copy)]
pub struct QuotaPolicy {
    user_limit: usize,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_USER_LIMIT)
    }
}

impl QuotaPolicy {
    pub fn new(user_limit: usize) -> Self {
        Self { user_limit }
    }

    pub fn user_limit(&self) -> usize {
        self.user_limit
    }

    /// Check whether `role` may publish one more item given `existing`
    pub fn check(&self, role: Role, existing: &[NewsItem]) -> QuotaDecision {
        match role {
            Role::Admin => QuotaDecision::Allowed,
            Role::User => {
                let current = existing
                    .iter()
                    .filter(|item| item.publisher_role == Role::User)
                    .count();
                if current >= self.user_limit {
                    QuotaDecision::Exceeded {
                        current,
                        limit: self.user_limit,
                    }
                } else {
                    QuotaDecision::Allowed
                }
            }
        }
    }
}
