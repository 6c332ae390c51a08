//! Promotional-content rotator.
//!
//! One fixed message list, advanced once per outgoing reply. The counter is
//! atomic so the rotator stays correct even though command handlers run as
//! separate tasks on the same runtime.

use std::sync::atomic::{AtomicUsize, Ordering};

pub static DEFAULT_PROMOS: &[&str] = &[
    "Track your book's stats at fiction-analytics.com",
    "New: Rising Stars predictions - try /risingstars",
    "Discover essence combinations with /essence",
    "Authors: cross-promote with /shoutout",
    "See what's hot this week with /ptw",
];

pub struct PromoRotator {
    messages: Vec<String>,
    index: AtomicUsize,
}

impl PromoRotator {
    pub fn new(messages: Vec<String>) -> Self {
        Self {
            messages,
            index: AtomicUsize::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_PROMOS.iter().map(|s| s.to_string()).collect())
    }

    /// Next message in rotation, advancing the counter.
    pub fn next(&self) -> Option<&str> {
        if self.messages.is_empty() {
            return None;
        }
        let i = self.index.fetch_add(1, Ordering::Relaxed);
        Some(self.messages[i % self.messages.len()].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps_around() {
        let rotator = PromoRotator::new(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(rotator.next(), Some("a"));
        assert_eq!(rotator.next(), Some("b"));
        assert_eq!(rotator.next(), Some("c"));
        assert_eq!(rotator.next(), Some("a"));
    }

    #[test]
    fn test_empty_list_yields_nothing() {
        let rotator = PromoRotator::new(vec![]);
        assert_eq!(rotator.next(), None);
        assert_eq!(rotator.next(), None);
    }

    #[test]
    fn test_defaults_are_nonempty() {
        let rotator = PromoRotator::with_defaults();
        assert!(rotator.next().is_some());
    }
}
